#![allow(dead_code)]

use std::cell::RefCell;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use gp_api_types::WalletAddress;
use gp_wallet::{FixedAccount, WalletError, WalletPresence, WalletProvider};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub fn account(seed: u8) -> FixedAccount {
    FixedAccount::from_keypair_bytes(&SigningKey::from_bytes(&[seed; 32]).to_keypair_bytes()).unwrap()
}

/// Wallet holding a real key; records every message it is asked to sign.
pub struct SigningWallet {
    key: SigningKey,
    reject: bool,
    pub signed: RefCell<Vec<Vec<u8>>>,
}

impl SigningWallet {
    pub fn new(seed: u8) -> Self {
        Self {
            key: SigningKey::from_bytes(&[seed; 32]),
            reject: false,
            signed: RefCell::new(Vec::new()),
        }
    }

    pub fn rejecting(seed: u8) -> Self {
        Self {
            reject: true,
            ..Self::new(seed)
        }
    }

    pub fn address(&self) -> WalletAddress {
        FixedAccount::from_keypair_bytes(&self.key.to_keypair_bytes()).unwrap().address()
    }
}

#[async_trait(?Send)]
impl WalletProvider for SigningWallet {
    fn detect(&self) -> WalletPresence {
        WalletPresence::Recognized
    }

    async fn connect(&self) -> Result<WalletAddress, WalletError> {
        Ok(self.address())
    }

    async fn connect_trusted(&self) -> Result<WalletAddress, WalletError> {
        Ok(self.address())
    }

    async fn sign_transaction(&self, message: &[u8]) -> Result<[u8; 64], WalletError> {
        if self.reject {
            return Err(WalletError::Rejected("User rejected the request.".to_owned()));
        }
        self.signed.borrow_mut().push(message.to_vec());
        Ok(self.key.sign(message).to_bytes())
    }
}

/// JSON-RPC node on a loopback port. Every request gets the `result` the
/// answer function returns for its method, one request per connection.
pub struct StubNode {
    pub url: String,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl StubNode {
    pub async fn start(answer: impl Fn(&str, &Value) -> Value + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let calls = Arc::new(Mutex::new(Vec::new()));

        let log = calls.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let Some(request) = read_request(&mut socket).await else {
                    continue;
                };
                let method = request["method"].as_str().unwrap_or_default().to_owned();
                let params = request["params"].clone();
                let result = answer(&method, &params);
                log.lock().unwrap().push((method, params));

                let body = json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }).to_string();
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self { url, calls }
    }

    /// Params of every call made with `method`, in order.
    pub fn calls(&self, method: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == method)
            .map(|(_, params)| params.clone())
            .collect()
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<Value> {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let length: usize = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0);

    while buf.len() < header_end + length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    serde_json::from_slice(&buf[header_end..header_end + length]).ok()
}

pub fn contextual(value: Value) -> Value {
    json!({ "context": { "slot": 1 }, "value": value })
}
