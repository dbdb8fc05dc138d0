//! [`WalletProvider`] over the Phantom extension's `window.solana` object.

use async_trait::async_trait;
use gp_api_types::WalletAddress;
use gp_wallet::{WalletError, WalletPresence, WalletProvider};
use js_sys::Reflect;
use serde::{Deserialize, Serialize};
use tracing::debug;
use wasm_bindgen::prelude::*;

/// Phantom answers a declined prompt with this EIP-1193 code.
const USER_REJECTED: f64 = 4001.0;

#[wasm_bindgen]
extern "C" {
    pub type SolanaProvider;

    #[wasm_bindgen(method, catch)]
    async fn connect(this: &SolanaProvider, options: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch)]
    async fn request(this: &SolanaProvider, args: JsValue) -> Result<JsValue, JsValue>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConnectOptions {
    only_if_trusted: bool,
}

#[derive(Serialize)]
struct SignTransactionRequest {
    method: &'static str,
    params: SignTransactionParams,
}

#[derive(Serialize)]
struct SignTransactionParams {
    /// Serialized transaction message (no signature section), base58.
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignTransactionResponse {
    /// Base58 signature over the message.
    signature: String,
    public_key: String,
}

/// Looks the provider up on every call; extensions may inject it after the page starts.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhantomWallet;

impl PhantomWallet {
    fn binding() -> Option<JsValue> {
        let value = Reflect::get(&gloo_utils::window(), &JsValue::from_str("solana")).ok()?;
        (!value.is_undefined() && !value.is_null()).then_some(value)
    }

    fn provider() -> Result<SolanaProvider, WalletError> {
        Self::binding()
            .map(|value| value.unchecked_into::<SolanaProvider>())
            .ok_or(WalletError::Absent)
    }

    async fn authorize(&self, only_if_trusted: bool) -> Result<WalletAddress, WalletError> {
        let provider = Self::provider()?;
        let options = serde_wasm_bindgen::to_value(&ConnectOptions { only_if_trusted })
            .map_err(|err| WalletError::Provider(err.to_string()))?;
        let response = provider
            .connect(options)
            .await
            .map_err(|err| match rejection(&err) {
                WalletError::Rejected(_) if only_if_trusted => WalletError::NotTrusted,
                other => other,
            })?;

        let public_key = Reflect::get(&response, &JsValue::from_str("publicKey"))
            .ok()
            .filter(|key| !key.is_undefined() && !key.is_null())
            .ok_or_else(|| WalletError::Provider("connect response carries no public key".to_owned()))?;
        let address = String::from(public_key.unchecked_into::<js_sys::Object>().to_string());
        Ok(WalletAddress(address))
    }
}

#[async_trait(?Send)]
impl WalletProvider for PhantomWallet {
    fn detect(&self) -> WalletPresence {
        let Some(binding) = Self::binding() else {
            return WalletPresence::Absent;
        };
        let is_phantom = Reflect::get(&binding, &JsValue::from_str("isPhantom"))
            .ok()
            .and_then(|flag| flag.as_bool())
            .unwrap_or(false);
        if is_phantom {
            WalletPresence::Recognized
        } else {
            WalletPresence::Unrecognized
        }
    }

    async fn connect(&self) -> Result<WalletAddress, WalletError> {
        self.authorize(false).await
    }

    async fn connect_trusted(&self) -> Result<WalletAddress, WalletError> {
        self.authorize(true).await
    }

    async fn sign_transaction(&self, message: &[u8]) -> Result<[u8; 64], WalletError> {
        let request = SignTransactionRequest {
            method: "signTransaction",
            params: SignTransactionParams {
                message: bs58::encode(message).into_string(),
            },
        };
        let args = serde_wasm_bindgen::to_value(&request).map_err(|err| WalletError::Provider(err.to_string()))?;

        let response = Self::provider()?
            .request(args)
            .await
            .map_err(|err| rejection(&err))?;
        let signed: SignTransactionResponse =
            serde_wasm_bindgen::from_value(response).map_err(|err| WalletError::Provider(err.to_string()))?;

        let signature: [u8; 64] = bs58::decode(&signed.signature)
            .into_vec()
            .map_err(|err| WalletError::Provider(format!("wallet signature is not base58: {err}")))?
            .try_into()
            .map_err(|bytes: Vec<u8>| WalletError::Provider(format!("wallet signature has {} bytes", bytes.len())))?;

        debug!(signer = %signed.public_key, "wallet signed transaction");
        Ok(signature)
    }
}

/// Classifies the value a provider promise rejected with.
fn rejection(err: &JsValue) -> WalletError {
    let code = Reflect::get(err, &JsValue::from_str("code"))
        .ok()
        .and_then(|code| code.as_f64());
    let message = Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    if code == Some(USER_REJECTED) {
        WalletError::Rejected(message)
    } else {
        WalletError::Provider(message)
    }
}
