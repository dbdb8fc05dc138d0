//! Borsh layout of Anchor accounts and instruction data, driven by the IDL.
//!
//! Decoded values are JSON so callers only need to know field names.
//! Integers outside the range a JSON number represents exactly are
//! carried as decimal strings in both directions.

use std::io::ErrorKind;
use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use borsh::{BorshDeserialize, BorshSerialize};
use gp_ledger_client::AccountRecord;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;

use crate::idl::{Idl, IdlField, IdlInstruction, IdlType, IdlTypeDefTy, Primitive};

pub const DISCRIMINATOR_LEN: usize = 8;

/// Largest integer a JSON number (IEEE double) holds exactly.
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

static NULL: Value = Value::Null;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("unexpected end of data while reading {0}")]
    UnexpectedEnd(String),
    #[error("invalid {0} encoding")]
    Invalid(String),
    #[error("type '{0}' is not defined in the IDL")]
    UndefinedType(String),
    #[error("account discriminator does not match '{0}'")]
    DiscriminatorMismatch(String),
    #[error("expected {expected}, found {found}")]
    Mismatch { expected: String, found: String },
    #[error("expected {expected} arguments, got {got}")]
    ArgumentCount { expected: usize, got: usize },
}

pub fn account_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    sighash("account", name)
}

pub fn instruction_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    sighash("global", &to_snake_case(name))
}

fn sighash(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let digest = Sha256::digest(format!("{namespace}:{name}").as_bytes());
    let mut out = [0_u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
    out
}

/// `startStuffOff` -> `start_stuff_off`; names already in snake case pass through.
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}

/// Decodes raw account data (discriminator included) into a record.
/// Bytes past the declared layout are allocation padding and ignored.
pub fn decode_account(idl: &Idl, account_type: &str, data: &[u8]) -> Result<AccountRecord, CodecError> {
    let def = idl
        .account(account_type)
        .ok_or_else(|| CodecError::UndefinedType(account_type.to_owned()))?;

    if data.len() < DISCRIMINATOR_LEN {
        return Err(CodecError::UnexpectedEnd("discriminator".to_owned()));
    }
    let (discriminator, mut body) = data.split_at(DISCRIMINATOR_LEN);
    if discriminator != account_discriminator(account_type) {
        return Err(CodecError::DiscriminatorMismatch(account_type.to_owned()));
    }

    match &def.ty {
        IdlTypeDefTy::Struct { fields } => {
            Ok(AccountRecord::new(Decoder { idl }.fields(fields, &mut body)?))
        }
        IdlTypeDefTy::Enum { .. } => Err(CodecError::Mismatch {
            expected: "struct account".to_owned(),
            found: "enum".to_owned(),
        }),
    }
}

/// Encodes instruction data: discriminator followed by the arguments in IDL order.
pub fn encode_instruction(idl: &Idl, instruction: &IdlInstruction, args: &[Value]) -> Result<Vec<u8>, CodecError> {
    if args.len() != instruction.args.len() {
        return Err(CodecError::ArgumentCount {
            expected: instruction.args.len(),
            got: args.len(),
        });
    }

    let mut out = instruction_discriminator(&instruction.name).to_vec();
    let encoder = Encoder { idl };
    for (field, value) in instruction.args.iter().zip(args) {
        encoder.value(&field.ty, value, &mut out)?;
    }
    Ok(out)
}

struct Decoder<'a> {
    idl: &'a Idl,
}

impl Decoder<'_> {
    fn fields(&self, fields: &[IdlField], buf: &mut &[u8]) -> Result<Map<String, Value>, CodecError> {
        let mut map = Map::new();
        for field in fields {
            map.insert(field.name.clone(), self.value(&field.ty, buf)?);
        }
        Ok(map)
    }

    fn value(&self, ty: &IdlType, buf: &mut &[u8]) -> Result<Value, CodecError> {
        match ty {
            IdlType::Primitive(primitive) => primitive_value(*primitive, buf),
            IdlType::Vec { vec } => {
                let len = read::<u32>(buf, "vec length")? as usize;
                // Each element takes at least one byte; refuse lengths the data cannot hold.
                if len > buf.len() {
                    return Err(CodecError::UnexpectedEnd("vec elements".to_owned()));
                }
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.value(vec, buf)?);
                }
                Ok(Value::Array(items))
            }
            IdlType::Option { option } => match read::<u8>(buf, "option tag")? {
                0 => Ok(Value::Null),
                1 => self.value(option, buf),
                _ => Err(CodecError::Invalid("option tag".to_owned())),
            },
            IdlType::Array { array: (inner, len) } => {
                let mut items = Vec::with_capacity(*len);
                for _ in 0..*len {
                    items.push(self.value(inner, buf)?);
                }
                Ok(Value::Array(items))
            }
            IdlType::Defined { defined } => {
                let def = self
                    .idl
                    .type_def(defined)
                    .ok_or_else(|| CodecError::UndefinedType(defined.clone()))?;
                match &def.ty {
                    IdlTypeDefTy::Struct { fields } => Ok(Value::Object(self.fields(fields, buf)?)),
                    IdlTypeDefTy::Enum { variants } => {
                        let tag = read::<u8>(buf, "enum tag")? as usize;
                        let variant = variants
                            .get(tag)
                            .ok_or_else(|| CodecError::Invalid(format!("{defined} variant")))?;
                        let mut map = Map::new();
                        map.insert(
                            variant.name.clone(),
                            Value::Object(self.fields(&variant.fields, buf)?),
                        );
                        Ok(Value::Object(map))
                    }
                }
            }
        }
    }
}

fn primitive_value(primitive: Primitive, buf: &mut &[u8]) -> Result<Value, CodecError> {
    Ok(match primitive {
        Primitive::Bool => match read::<u8>(buf, "bool")? {
            0 => Value::Bool(false),
            1 => Value::Bool(true),
            _ => return Err(CodecError::Invalid("bool".to_owned())),
        },
        Primitive::U8 => Value::from(read::<u8>(buf, "u8")?),
        Primitive::I8 => Value::from(read::<i8>(buf, "i8")?),
        Primitive::U16 => Value::from(read::<u16>(buf, "u16")?),
        Primitive::I16 => Value::from(read::<i16>(buf, "i16")?),
        Primitive::U32 => Value::from(read::<u32>(buf, "u32")?),
        Primitive::I32 => Value::from(read::<i32>(buf, "i32")?),
        Primitive::U64 => unsigned_value(read::<u64>(buf, "u64")? as u128),
        Primitive::I64 => signed_value(read::<i64>(buf, "i64")? as i128),
        Primitive::U128 => unsigned_value(read::<u128>(buf, "u128")?),
        Primitive::I128 => signed_value(read::<i128>(buf, "i128")?),
        Primitive::String => Value::String(read::<String>(buf, "string")?),
        Primitive::PublicKey => {
            let bytes = read::<[u8; 32]>(buf, "public key")?;
            Value::String(Pubkey::new_from_array(bytes).to_string())
        }
        Primitive::Bytes => Value::String(STANDARD.encode(read::<Vec<u8>>(buf, "bytes")?)),
    })
}

fn unsigned_value(n: u128) -> Value {
    if n <= MAX_SAFE_INTEGER as u128 {
        Value::from(n as u64)
    } else {
        Value::String(n.to_string())
    }
}

fn signed_value(n: i128) -> Value {
    if n.unsigned_abs() <= MAX_SAFE_INTEGER as u128 {
        Value::from(n as i64)
    } else {
        Value::String(n.to_string())
    }
}

/// Borsh reports short input as `InvalidInput`; malformed content (bad UTF-8) is `InvalidData`.
fn read<T: BorshDeserialize>(buf: &mut &[u8], what: &str) -> Result<T, CodecError> {
    T::deserialize(buf).map_err(|err| match err.kind() {
        ErrorKind::UnexpectedEof | ErrorKind::InvalidInput => CodecError::UnexpectedEnd(what.to_owned()),
        _ => CodecError::Invalid(what.to_owned()),
    })
}

struct Encoder<'a> {
    idl: &'a Idl,
}

impl Encoder<'_> {
    fn value(&self, ty: &IdlType, value: &Value, out: &mut Vec<u8>) -> Result<(), CodecError> {
        match ty {
            IdlType::Primitive(primitive) => encode_primitive(*primitive, value, out),
            IdlType::Vec { vec } => {
                let items = expect_array(value)?;
                write(&(items.len() as u32), out);
                for item in items {
                    self.value(vec, item, out)?;
                }
                Ok(())
            }
            IdlType::Option { option } => {
                if value.is_null() {
                    write(&0_u8, out);
                    Ok(())
                } else {
                    write(&1_u8, out);
                    self.value(option, value, out)
                }
            }
            IdlType::Array { array: (inner, len) } => {
                let items = expect_array(value)?;
                if items.len() != *len {
                    return Err(mismatch(&format!("array of {len}"), value));
                }
                for item in items {
                    self.value(inner, item, out)?;
                }
                Ok(())
            }
            IdlType::Defined { defined } => {
                let def = self
                    .idl
                    .type_def(defined)
                    .ok_or_else(|| CodecError::UndefinedType(defined.clone()))?;
                match &def.ty {
                    IdlTypeDefTy::Struct { fields } => self.fields(fields, value, out),
                    IdlTypeDefTy::Enum { variants } => {
                        let (name, inner) = match value {
                            Value::String(name) => (name.as_str(), &NULL),
                            Value::Object(map) if map.len() == 1 => {
                                let (name, inner) = map.iter().next().ok_or_else(|| mismatch(defined, value))?;
                                (name.as_str(), inner)
                            }
                            _ => return Err(mismatch(defined, value)),
                        };
                        let tag = variants
                            .iter()
                            .position(|variant| variant.name == name)
                            .ok_or_else(|| mismatch(defined, value))?;
                        write(&(tag as u8), out);
                        self.fields(&variants[tag].fields, inner, out)
                    }
                }
            }
        }
    }

    fn fields(&self, fields: &[IdlField], value: &Value, out: &mut Vec<u8>) -> Result<(), CodecError> {
        if fields.is_empty() {
            return Ok(());
        }
        let map = value.as_object().ok_or_else(|| mismatch("object", value))?;
        for field in fields {
            let item = map.get(&field.name).unwrap_or(&NULL);
            self.value(&field.ty, item, out)?;
        }
        Ok(())
    }
}

fn encode_primitive(primitive: Primitive, value: &Value, out: &mut Vec<u8>) -> Result<(), CodecError> {
    match primitive {
        Primitive::Bool => write(&value.as_bool().ok_or_else(|| mismatch("bool", value))?, out),
        Primitive::U8 => write(&int::<u8>(value, "u8")?, out),
        Primitive::I8 => write(&int::<i8>(value, "i8")?, out),
        Primitive::U16 => write(&int::<u16>(value, "u16")?, out),
        Primitive::I16 => write(&int::<i16>(value, "i16")?, out),
        Primitive::U32 => write(&int::<u32>(value, "u32")?, out),
        Primitive::I32 => write(&int::<i32>(value, "i32")?, out),
        Primitive::U64 => write(&int::<u64>(value, "u64")?, out),
        Primitive::I64 => write(&int::<i64>(value, "i64")?, out),
        Primitive::U128 => write(&int::<u128>(value, "u128")?, out),
        Primitive::I128 => write(&int::<i128>(value, "i128")?, out),
        Primitive::String => {
            let s = value.as_str().ok_or_else(|| mismatch("string", value))?;
            write(&s.to_owned(), out)
        }
        Primitive::PublicKey => {
            let s = value.as_str().ok_or_else(|| mismatch("public key", value))?;
            let key = Pubkey::from_str(s).map_err(|_| CodecError::Invalid("public key".to_owned()))?;
            out.extend_from_slice(key.as_ref());
        }
        Primitive::Bytes => {
            let s = value.as_str().ok_or_else(|| mismatch("base64 bytes", value))?;
            let bytes = STANDARD
                .decode(s)
                .map_err(|_| CodecError::Invalid("bytes".to_owned()))?;
            write(&bytes, out)
        }
    }
    Ok(())
}

/// Accepts JSON numbers and decimal strings.
fn int<T: FromStr>(value: &Value, what: &str) -> Result<T, CodecError> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_owned(),
        _ => return Err(mismatch(what, value)),
    };
    text.parse::<T>().map_err(|_| mismatch(what, value))
}

fn expect_array(value: &Value) -> Result<&Vec<Value>, CodecError> {
    value.as_array().ok_or_else(|| mismatch("array", value))
}

fn write<T: BorshSerialize>(value: &T, out: &mut Vec<u8>) {
    // Writing into a Vec cannot fail.
    let _ = value.serialize(out);
}

fn mismatch(expected: &str, found: &Value) -> CodecError {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    CodecError::Mismatch {
        expected: expected.to_owned(),
        found: found.to_owned(),
    }
}
