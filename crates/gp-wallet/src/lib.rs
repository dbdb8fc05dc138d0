use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use ed25519_dalek::SigningKey;
use gp_api_types::WalletAddress;
use zeroize::Zeroizing;

/// What the page finds behind the global wallet binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletPresence {
    Recognized,
    Unrecognized,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("no wallet provider found")]
    Absent,
    #[error("wallet request rejected: {0}")]
    Rejected(String),
    #[error("page is not trusted by the wallet")]
    NotTrusted,
    #[error("wallet provider error: {0}")]
    Provider(String),
}

/// Key custody and transaction signing on the user's behalf.
///
/// The page runs on a single event loop, so implementations are not
/// required to be `Send`.
#[async_trait(?Send)]
pub trait WalletProvider {
    fn detect(&self) -> WalletPresence;

    /// Asks the user to authorize the page.
    async fn connect(&self) -> Result<WalletAddress, WalletError>;

    /// Re-authorizes without prompting; fails unless the page was trusted before.
    async fn connect_trusted(&self) -> Result<WalletAddress, WalletError>;

    /// Signs a serialized transaction message with the connected key and
    /// returns the raw ed25519 signature. Submitting is left to the caller,
    /// which may hold co-signatures the wallet never sees.
    async fn sign_transaction(&self, message: &[u8]) -> Result<[u8; 64], WalletError>;
}

/// The hard-coded storage account every page instance reads and writes.
pub struct FixedAccount {
    signing_key: SigningKey,
}

impl FixedAccount {
    /// Parses a Solana key-pair file: a JSON array of 64 bytes, seed then public key.
    pub fn from_keypair_json(raw: &str) -> Result<Self> {
        let bytes: Zeroizing<Vec<u8>> = Zeroizing::new(
            serde_json::from_str::<Vec<u8>>(raw).context("key-pair file is not a JSON byte array")?,
        );
        Self::from_keypair_bytes(&bytes)
    }

    pub fn from_keypair_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: &[u8; 64] = bytes
            .try_into()
            .map_err(|_| anyhow!("key-pair must be 64 bytes, got {}", bytes.len()))?;
        let signing_key = SigningKey::from_keypair_bytes(bytes)
            .map_err(|_| anyhow!("key-pair public half does not match its secret"))?;
        Ok(Self { signing_key })
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn address(&self) -> WalletAddress {
        WalletAddress(bs58::encode(self.public_key_bytes()).into_string())
    }

    pub fn keypair_bytes(&self) -> Zeroizing<[u8; 64]> {
        Zeroizing::new(self.signing_key.to_keypair_bytes())
    }
}

impl std::fmt::Debug for FixedAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedAccount")
            .field("address", &self.address().0)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 8032 test vector 1.
    const SEED: [u8; 32] = [
        0x9d, 0x61, 0xb1, 0x9d, 0xef, 0xfd, 0x5a, 0x60, 0xba, 0x84, 0x4a, 0xf4, 0x92, 0xec, 0x2c,
        0xc4, 0x44, 0x49, 0xc5, 0x69, 0x7b, 0x32, 0x69, 0x19, 0x70, 0x3b, 0xac, 0x03, 0x1c, 0xae,
        0x7f, 0x60,
    ];
    const PUBLIC: [u8; 32] = [
        0xd7, 0x5a, 0x98, 0x01, 0x82, 0xb1, 0x0a, 0xb7, 0xd5, 0x4b, 0xfe, 0xd3, 0xc9, 0x64, 0x07,
        0x3a, 0x0e, 0xe1, 0x72, 0xf3, 0xda, 0xa6, 0x23, 0x25, 0xaf, 0x02, 0x1a, 0x68, 0xf7, 0x07,
        0x51, 0x1a,
    ];

    fn keypair_json(seed: &[u8], public: &[u8]) -> String {
        let all: Vec<u8> = seed.iter().chain(public.iter()).copied().collect();
        serde_json::to_string(&all).unwrap()
    }

    #[test]
    fn loads_solana_keypair_file() {
        let account = FixedAccount::from_keypair_json(&keypair_json(&SEED, &PUBLIC)).unwrap();
        assert_eq!(account.public_key_bytes(), PUBLIC);
        assert_eq!(
            account.address().0,
            "FVen3X669xLzsi6N2V91DoiyzHzg1uAgqiT8jZ9nS96Z"
        );
        assert_eq!(&account.keypair_bytes()[..32], &SEED);
    }

    #[test]
    fn rejects_mismatched_public_half() {
        let mut public = PUBLIC;
        public[0] ^= 0xff;
        let err = FixedAccount::from_keypair_json(&keypair_json(&SEED, &public)).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn rejects_wrong_length_and_garbage() {
        assert!(FixedAccount::from_keypair_json(&keypair_json(&SEED, &[])).is_err());
        assert!(FixedAccount::from_keypair_json("{\"secret\": 1}").is_err());
    }

    #[test]
    fn keypair_bytes_reload_to_the_same_account() {
        let account = FixedAccount::from_keypair_json(&keypair_json(&SEED, &PUBLIC)).unwrap();
        let reloaded = FixedAccount::from_keypair_bytes(&account.keypair_bytes()[..]).unwrap();
        assert_eq!(account.address(), reloaded.address());
    }
}
