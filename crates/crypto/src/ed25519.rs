//! Ed25519 keys and signatures.
//!
//! Used for two things in the bootstrapper: self-signing node identity
//! documents, and the trust root's countersignature over network
//! parameters. Keys and signatures cross module boundaries as lowercase
//! hex strings, matching the on-disk JSON formats.

use crate::error::CryptoError;
use ed25519_consensus::{
    Signature as Ed25519Sig, SigningKey as Ed25519Secret, VerificationKey as Ed25519Pubkey,
};
use rand::{CryptoRng, RngCore};

/// Ed25519 secret key (32-byte seed)
#[derive(Clone)]
pub struct SecretKey(Ed25519Secret);

impl SecretKey {
    /// Generate a new random secret key
    pub fn generate<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        Self::from_seed(&seed)
    }

    /// Create from seed bytes
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self(Ed25519Secret::from(*seed))
    }

    /// Serialize to bytes (32-byte seed)
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Serialize to lowercase hex
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Get the corresponding public key
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verification_key())
    }

    /// Sign a message
    pub fn sign(&self, msg: &[u8]) -> Signature {
        Signature(self.0.sign(msg))
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Ed25519 public key (32 bytes)
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(Ed25519Pubkey);

impl PublicKey {
    /// Load from bytes
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        Ed25519Pubkey::try_from(*bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidPublicKey)
    }

    /// Parse from lowercase hex (64 chars)
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s).map_err(|_| CryptoError::InvalidHex)?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Serialize to lowercase hex
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Verify a signature
    pub fn verify(&self, msg: &[u8], sig: &Signature) -> bool {
        self.0.verify(&sig.0, msg).is_ok()
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes = self.to_bytes();
        write!(f, "PublicKey({})", hex::encode(&bytes[..8]))
    }
}

/// Ed25519 signature (64 bytes)
#[derive(Clone)]
pub struct Signature(Ed25519Sig);

impl Signature {
    /// Load from bytes
    pub fn from_bytes(bytes: &[u8; 64]) -> Self {
        Self(Ed25519Sig::from(*bytes))
    }

    /// Parse from lowercase hex (128 chars)
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s).map_err(|_| CryptoError::InvalidHex)?;
        let bytes: [u8; 64] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidSignature)?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_bytes()
    }

    /// Serialize to lowercase hex
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes = self.to_bytes();
        write!(f, "Signature({})", hex::encode(&bytes[..8]))
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for Signature {}

/// Ed25519 key pair (convenience wrapper)
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        let secret_key = SecretKey::generate(rng);
        let public_key = secret_key.public_key();
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create from a secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = secret_key.public_key();
        Self {
            secret_key,
            public_key,
        }
    }

    /// Sign a message
    pub fn sign(&self, msg: &[u8]) -> Signature {
        self.secret_key.sign(msg)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_generation() {
        let keypair = KeyPair::generate(&mut rand::thread_rng());
        let bytes = keypair.public_key.to_bytes();
        let restored = PublicKey::from_bytes(&bytes).unwrap();
        assert_eq!(keypair.public_key, restored);
    }

    #[test]
    fn test_sign_verify() {
        let keypair = KeyPair::generate(&mut rand::thread_rng());
        let msg = b"identity document";
        let sig = keypair.sign(msg);
        assert!(keypair.public_key.verify(msg, &sig));
    }

    #[test]
    fn test_wrong_message_fails() {
        let keypair = KeyPair::generate(&mut rand::thread_rng());
        let sig = keypair.sign(b"correct message");
        assert!(!keypair.public_key.verify(b"wrong message", &sig));
    }

    #[test]
    fn test_signing_is_deterministic() {
        // Re-signing the same payload with the same key must produce the
        // same bytes; parameter files rely on this for byte-identical
        // re-runs.
        let keypair = KeyPair::generate(&mut rand::thread_rng());
        let a = keypair.sign(b"payload");
        let b = keypair.sign(b"payload");
        assert_eq!(a, b);
    }

    #[test]
    fn test_hex_round_trips() {
        let keypair = KeyPair::generate(&mut rand::thread_rng());
        let sig = keypair.sign(b"msg");

        let pk = PublicKey::from_hex(&keypair.public_key.to_hex()).unwrap();
        assert_eq!(pk, keypair.public_key);

        let restored = Signature::from_hex(&sig.to_hex()).unwrap();
        assert_eq!(sig, restored);
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert_eq!(PublicKey::from_hex("zz"), Err(CryptoError::InvalidHex));
        assert_eq!(
            Signature::from_hex("abcd").unwrap_err(),
            CryptoError::InvalidSignature
        );
    }
}
