//! The network trust root.
//!
//! Nodes only accept network parameters countersigned by a fixed root
//! key. Development networks share a well-known root derived from a
//! constant seed, mirroring the platform's dev-mode key conventions; a
//! production deployment would load the root from a secured keystore
//! instead.

use crate::ed25519::{KeyPair, PublicKey, SecretKey, Signature};
use crate::error::CryptoError;
use netforge_types::{NetworkParameters, SignedNetworkParameters};

/// Seed of the well-known development trust root.
///
/// Publicly known. DO NOT USE IN PRODUCTION.
const DEV_TRUST_ROOT_SEED: [u8; 32] = *b"netforge-dev-trust-root-seed-001";

/// Signer and verifier for network parameters.
pub struct TrustRoot {
    keypair: KeyPair,
}

impl TrustRoot {
    /// The well-known development trust root.
    pub fn dev() -> Self {
        Self {
            keypair: KeyPair::from_secret_key(SecretKey::from_seed(&DEV_TRUST_ROOT_SEED)),
        }
    }

    /// Create from an externally managed secret key.
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        Self {
            keypair: KeyPair::from_secret_key(secret_key),
        }
    }

    /// The root public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.keypair.public_key
    }

    /// Countersign a parameter set.
    ///
    /// Ed25519 signing is deterministic, so signing an unchanged record
    /// reproduces the previous signature byte for byte.
    pub fn sign_parameters(
        &self,
        parameters: NetworkParameters,
    ) -> Result<SignedNetworkParameters, CryptoError> {
        let payload = parameters
            .canonical_bytes()
            .map_err(|e| CryptoError::Payload(e.to_string()))?;
        let signature = self.keypair.sign(&payload);
        Ok(SignedNetworkParameters {
            parameters,
            signature: signature.to_hex(),
            public_key: self.keypair.public_key.to_hex(),
        })
    }

    /// Verify a signed parameter set against this root.
    ///
    /// Returns the inner parameters on success. Fails if the signer is
    /// not this root or the signature does not cover the record.
    pub fn verify(
        &self,
        signed: &SignedNetworkParameters,
    ) -> Result<NetworkParameters, CryptoError> {
        let signer = PublicKey::from_hex(&signed.public_key)?;
        if signer != self.keypair.public_key {
            return Err(CryptoError::UntrustedSigner);
        }
        let signature = Signature::from_hex(&signed.signature)?;
        let payload = signed
            .parameters
            .canonical_bytes()
            .map_err(|e| CryptoError::Payload(e.to_string()))?;
        if !signer.verify(&payload, &signature) {
            return Err(CryptoError::VerificationFailed);
        }
        Ok(signed.parameters.clone())
    }
}

impl std::fmt::Debug for TrustRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustRoot")
            .field("public_key", &self.keypair.public_key)
            .finish()
    }
}
