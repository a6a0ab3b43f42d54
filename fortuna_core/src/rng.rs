use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::error::{CoreError, CoreResult};

// Provably-fair draw: HMAC-SHA256(server_seed, "client_seed:nonce") -> bytes -> floats in [0,1).
// Publishing sha256(server_seed) up front lets players check every spin once the seed is revealed.

pub type HmacSha256 = Hmac<Sha256>;

pub fn derive_hash_hex(input: &[u8]) -> String {
    hex::encode(Sha256::digest(input))
}

pub fn derive_floats(hmac_bytes: &[u8], count: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(count);
    let mut buffer = hmac_bytes.to_vec();
    let mut i = 0usize;
    while out.len() < count {
        if i + 4 > buffer.len() {
            // stretch by hashing the exhausted buffer
            buffer = Sha256::digest(&buffer).to_vec();
            i = 0;
            continue;
        }
        let v = u32::from_be_bytes([buffer[i], buffer[i + 1], buffer[i + 2], buffer[i + 3]]);
        out.push(v as f64 / (u32::MAX as f64 + 1.0));
        i += 4;
    }
    out
}

#[derive(Debug, Clone)]
pub struct ProvablyFairRng {
    pub server_seed: String,
    pub client_seed: String,
    pub nonce: u64,
}

impl ProvablyFairRng {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64) -> Self {
        Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            nonce,
        }
    }

    pub fn server_seed_hash_hex(&self) -> String {
        derive_hash_hex(self.server_seed.as_bytes())
    }

    pub fn hmac_bytes(&self) -> CoreResult<[u8; 32]> {
        let mut mac = HmacSha256::new_from_slice(self.server_seed.as_bytes())
            .map_err(|e| CoreError::Rng(e.to_string()))?;
        mac.update(format!("{}:{}", self.client_seed, self.nonce).as_bytes());
        let res = mac.finalize().into_bytes();
        let mut out = [0u8; 32];
        out.copy_from_slice(&res);
        Ok(out)
    }

    pub fn next_floats(&self, count: usize) -> CoreResult<Vec<f64>> {
        Ok(derive_floats(&self.hmac_bytes()?, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let rng1 = ProvablyFairRng::new("server", "client", 1);
        let rng2 = ProvablyFairRng::new("server", "client", 1);
        assert_eq!(rng1.server_seed_hash_hex(), rng2.server_seed_hash_hex());
        assert_eq!(rng1.hmac_bytes().unwrap(), rng2.hmac_bytes().unwrap());
        assert_eq!(rng1.next_floats(5).unwrap(), rng2.next_floats(5).unwrap());
    }

    #[test]
    fn test_nonce_changes_stream() {
        let a = ProvablyFairRng::new("server", "client", 1).next_floats(3).unwrap();
        let b = ProvablyFairRng::new("server", "client", 2).next_floats(3).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_floats_extend_past_digest() {
        let floats = ProvablyFairRng::new("s", "c", 0).next_floats(20).unwrap();
        assert_eq!(floats.len(), 20);
        assert!(floats.iter().all(|f| (0.0..1.0).contains(f)));
    }

    #[test]
    fn test_known_hash() {
        assert_eq!(
            derive_hash_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
