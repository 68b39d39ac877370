//! Actor key material.

use argon2::password_hash::rand_core::OsRng;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;
use thiserror::Error;

pub const DEFAULT_KEY_BITS: usize = 2048;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("RSA key generation failed: {0}")]
    Generate(#[from] rsa::Error),

    #[error("Private key encoding failed: {0}")]
    EncodePrivate(#[from] rsa::pkcs8::Error),

    #[error("Public key encoding failed: {0}")]
    EncodePublic(#[from] rsa::pkcs8::spki::Error),

    #[error("Key generation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// An actor's RSA keypair in its stored encodings.
#[derive(Clone, PartialEq, Eq)]
pub struct ActorKeypair {
    /// SubjectPublicKeyInfo PEM
    pub public_key_pem: String,
    private_key_der: Vec<u8>,
}

impl ActorKeypair {
    /// Generates a fresh keypair. CPU-bound; see [`generate_keypair`].
    pub fn generate(bits: usize) -> Result<Self, KeyError> {
        let private = RsaPrivateKey::new(&mut OsRng, bits)?;
        let public = RsaPublicKey::from(&private);

        Ok(Self {
            public_key_pem: public.to_public_key_pem(LineEnding::LF)?,
            private_key_der: private.to_pkcs8_der()?.as_bytes().to_vec(),
        })
    }

    /// PKCS#8 DER encoding of the private key.
    #[must_use]
    pub fn private_key_der(&self) -> &[u8] {
        &self.private_key_der
    }
}

impl fmt::Debug for ActorKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorKeypair")
            .field("public_key_pem", &self.public_key_pem)
            .field("private_key_der", &"<redacted>")
            .finish()
    }
}

/// Generates a keypair on the blocking pool.
pub async fn generate_keypair(bits: usize) -> Result<ActorKeypair, KeyError> {
    tokio::task::spawn_blocking(move || ActorKeypair::generate(bits)).await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};

    #[tokio::test]
    async fn generated_keys_decode_and_match() {
        let keypair = generate_keypair(1024).await.unwrap();

        assert!(keypair.public_key_pem.starts_with("-----BEGIN PUBLIC KEY-----"));

        let public = RsaPublicKey::from_public_key_pem(&keypair.public_key_pem).unwrap();
        let private = RsaPrivateKey::from_pkcs8_der(keypair.private_key_der()).unwrap();
        assert_eq!(RsaPublicKey::from(&private), public);
    }

    #[test]
    fn debug_hides_private_key() {
        let keypair = ActorKeypair::generate(1024).unwrap();
        let debug = format!("{keypair:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(&format!("{:?}", keypair.private_key_der())));
    }
}
