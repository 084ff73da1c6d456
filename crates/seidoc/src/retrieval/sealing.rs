//! In-memory sealing of portal credentials.
//!
//! Credentials are sealed as soon as they are received and only unsealed
//! right before they are typed into the login form.
//!
//! # Key lifecycle
//!
//! [`EphemeralSealer`] generates a random 256-bit ChaCha20-Poly1305 key at
//! construction and keeps it in memory only. Secrets sealed by one instance
//! cannot be opened by another; there is no persistence and no rotation.

use crate::{Result, SeidocError};
use ring::aead::{Aad, CHACHA20_POLY1305, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use std::fmt;

/// Ciphertext plus the nonce it was sealed with.
#[derive(Clone, PartialEq, Eq)]
pub struct SealedSecret {
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
}

impl fmt::Debug for SealedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SealedSecret(..)")
    }
}

pub trait SecretSealer: Send + Sync {
    fn seal(&self, plaintext: &[u8]) -> Result<SealedSecret>;

    fn unseal(&self, sealed: &SealedSecret) -> Result<Vec<u8>>;
}

pub struct EphemeralSealer {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl EphemeralSealer {
    pub fn new() -> Result<Self> {
        let rng = SystemRandom::new();
        let mut key_bytes = [0u8; 32];
        rng.fill(&mut key_bytes)
            .map_err(|_| SeidocError::Sealing("system random source unavailable".to_string()))?;
        let unbound = UnboundKey::new(&CHACHA20_POLY1305, &key_bytes)
            .map_err(|_| SeidocError::Sealing("cannot build sealing key".to_string()))?;
        key_bytes.fill(0);

        Ok(Self {
            key: LessSafeKey::new(unbound),
            rng,
        })
    }
}

impl fmt::Debug for EphemeralSealer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EphemeralSealer(..)")
    }
}

impl SecretSealer for EphemeralSealer {
    fn seal(&self, plaintext: &[u8]) -> Result<SealedSecret> {
        let mut nonce = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce)
            .map_err(|_| SeidocError::Sealing("system random source unavailable".to_string()))?;

        let mut ciphertext = plaintext.to_vec();
        self.key
            .seal_in_place_append_tag(Nonce::assume_unique_for_key(nonce), Aad::empty(), &mut ciphertext)
            .map_err(|_| SeidocError::Sealing("sealing failed".to_string()))?;

        Ok(SealedSecret { nonce, ciphertext })
    }

    fn unseal(&self, sealed: &SealedSecret) -> Result<Vec<u8>> {
        let mut buffer = sealed.ciphertext.clone();
        let plaintext = self
            .key
            .open_in_place(Nonce::assume_unique_for_key(sealed.nonce), Aad::empty(), &mut buffer)
            .map_err(|_| SeidocError::Sealing("secret was not sealed by this sealer or was tampered with".to_string()))?;
        Ok(plaintext.to_vec())
    }
}

/// Portal login, sealed.
#[derive(Clone)]
pub struct Credentials {
    pub(crate) username: SealedSecret,
    pub(crate) password: SealedSecret,
}

impl Credentials {
    pub fn seal(sealer: &dyn SecretSealer, username: &str, password: &str) -> Result<Self> {
        Ok(Self {
            username: sealer.seal(username.as_bytes())?,
            password: sealer.seal(password.as_bytes())?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let sealer = EphemeralSealer::new().unwrap();
        let sealed = sealer.seal(b"s3nha-secreta").unwrap();
        assert_ne!(sealed.ciphertext.as_slice(), b"s3nha-secreta");
        assert_eq!(sealer.unseal(&sealed).unwrap(), b"s3nha-secreta");
    }

    #[test]
    fn test_fresh_nonce_per_seal() {
        let sealer = EphemeralSealer::new().unwrap();
        let a = sealer.seal(b"same").unwrap();
        let b = sealer.seal(b"same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_other_instance_cannot_unseal() {
        let first = EphemeralSealer::new().unwrap();
        let second = EphemeralSealer::new().unwrap();
        let sealed = first.seal(b"usuario").unwrap();
        assert!(matches!(second.unseal(&sealed), Err(SeidocError::Sealing(_))));
    }

    #[test]
    fn test_tampering_is_detected() {
        let sealer = EphemeralSealer::new().unwrap();
        let mut sealed = sealer.seal(b"usuario").unwrap();
        sealed.ciphertext[0] ^= 0x01;
        assert!(sealer.unseal(&sealed).is_err());
    }

    #[test]
    fn test_debug_redacts() {
        let sealer = EphemeralSealer::new().unwrap();
        let credentials = Credentials::seal(&sealer, "usuario", "senha").unwrap();
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("usuario"));
        assert!(!debug.contains("senha"));
    }
}
