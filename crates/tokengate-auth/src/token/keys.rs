//! RSA key material for signing and verifying session tokens.
//!
//! The pair is loaded once at startup and never rotated. Both halves are
//! parsed eagerly with the `rsa` crate so a bad or mismatched key fails at
//! boot instead of on the first login.

use std::fmt;
use std::fs;
use std::path::Path;

use jsonwebtoken::{DecodingKey, EncodingKey};
use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use super::jwt::JwtError;
use crate::config::{KeyConfig, KeySource};

/// Size of keys produced by [`SigningKeyPair::generate`].
const GENERATED_KEY_BITS: usize = 2048;

/// An RSA private signing key and its public verification key.
#[derive(Clone)]
pub struct SigningKeyPair {
    kid: String,
    pub(crate) encoding_key: EncodingKey,
    pub(crate) decoding_key: DecodingKey,
    public_pem: String,
}

impl fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("kid", &self.kid)
            .finish_non_exhaustive()
    }
}

impl SigningKeyPair {
    /// Loads a key pair from PEM strings.
    ///
    /// The private key may be PKCS#1 (`RSA PRIVATE KEY`) or PKCS#8
    /// (`PRIVATE KEY`), the public key SPKI (`PUBLIC KEY`) or PKCS#1
    /// (`RSA PUBLIC KEY`).
    ///
    /// # Errors
    /// Returns `JwtError::InvalidKey` if either PEM is unparseable or the
    /// public key does not belong to the private key.
    pub fn from_pem(private_pem: &str, public_pem: &str) -> Result<Self, JwtError> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(private_pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(private_pem))
            .map_err(|e| JwtError::invalid_key(format!("private key: {e}")))?;
        let public_key = RsaPublicKey::from_public_key_pem(public_pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(public_pem))
            .map_err(|e| JwtError::invalid_key(format!("public key: {e}")))?;

        if private_key.to_public_key() != public_key {
            return Err(JwtError::invalid_key(
                "public key does not match private key",
            ));
        }

        Self::from_parsed(&private_key, &public_key)
    }

    /// Loads a key pair from two PEM files.
    ///
    /// # Errors
    /// Returns `JwtError::InvalidKey` if a file cannot be read or its
    /// contents are not a valid key.
    pub fn from_pem_files(
        private_path: impl AsRef<Path>,
        public_path: impl AsRef<Path>,
    ) -> Result<Self, JwtError> {
        let private_pem = read_pem(private_path.as_ref())?;
        let public_pem = read_pem(public_path.as_ref())?;
        Self::from_pem(&private_pem, &public_pem)
    }

    /// Loads the key pair described by configuration.
    ///
    /// # Errors
    /// Returns `JwtError::InvalidKey` if a half has no source, a file cannot
    /// be read, or the key material is invalid.
    pub fn from_config(config: &KeyConfig) -> Result<Self, JwtError> {
        let private_pem = resolve(
            config
                .private_source()
                .map_err(|e| JwtError::invalid_key(e.to_string()))?,
        )?;
        let public_pem = resolve(
            config
                .public_source()
                .map_err(|e| JwtError::invalid_key(e.to_string()))?,
        )?;
        Self::from_pem(&private_pem, &public_pem)
    }

    /// Generates a fresh 2048-bit pair.
    ///
    /// # Errors
    /// Returns `JwtError::InvalidKey` if generation or encoding fails.
    pub fn generate() -> Result<Self, JwtError> {
        let private_key = RsaPrivateKey::new(&mut OsRng, GENERATED_KEY_BITS)
            .map_err(|e| JwtError::invalid_key(e.to_string()))?;
        let public_key = private_key.to_public_key();
        Self::from_parsed(&private_key, &public_key)
    }

    fn from_parsed(private_key: &RsaPrivateKey, public_key: &RsaPublicKey) -> Result<Self, JwtError> {
        let private_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| JwtError::invalid_key(e.to_string()))?;
        let public_pem = public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| JwtError::invalid_key(e.to_string()))?;
        let public_der = public_key
            .to_public_key_der()
            .map_err(|e| JwtError::invalid_key(e.to_string()))?;

        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|e| JwtError::invalid_key(e.to_string()))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes())
            .map_err(|e| JwtError::invalid_key(e.to_string()))?;

        let digest = Sha256::digest(public_der.as_bytes());
        let mut kid = hex::encode(digest);
        kid.truncate(16);

        Ok(Self {
            kid,
            encoding_key,
            decoding_key,
            public_pem,
        })
    }

    /// Returns the key id written into token headers.
    #[must_use]
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Returns the public key as SPKI PEM.
    #[must_use]
    pub fn public_key_pem(&self) -> &str {
        &self.public_pem
    }
}

fn read_pem(path: &Path) -> Result<String, JwtError> {
    fs::read_to_string(path)
        .map_err(|e| JwtError::invalid_key(format!("{}: {e}", path.display())))
}

fn resolve(source: KeySource<'_>) -> Result<String, JwtError> {
    match source {
        KeySource::Pem(pem) => Ok(pem.to_string()),
        KeySource::File(path) => read_pem(path),
    }
}
