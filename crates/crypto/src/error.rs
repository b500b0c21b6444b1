//! Cryptographic error types

use thiserror::Error;

/// Ed25519 and trust-root errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid secret key bytes
    #[error("invalid secret key bytes")]
    InvalidSecretKey,

    /// Invalid public key bytes
    #[error("invalid public key bytes")]
    InvalidPublicKey,

    /// Invalid signature bytes
    #[error("invalid signature bytes")]
    InvalidSignature,

    /// Signature verification failed
    #[error("signature verification failed")]
    VerificationFailed,

    /// Record was signed by a key other than the trust root
    #[error("signer is not the network trust root")]
    UntrustedSigner,

    /// Hex decoding failed
    #[error("invalid hex encoding")]
    InvalidHex,

    /// Signing payload could not be serialized
    #[error("failed to encode signing payload: {0}")]
    Payload(String),
}
