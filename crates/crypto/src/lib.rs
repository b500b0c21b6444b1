//! Cryptographic primitives for the netforge bootstrapper.
//!
//! This crate provides:
//! - Ed25519 keys and signatures for node identity documents
//! - The fixed development trust root that countersigns network
//!   parameters, and verification of previously signed parameter files

pub mod ed25519;
pub mod error;
pub mod trust_root;

pub use ed25519::{KeyPair, PublicKey, SecretKey, Signature};
pub use error::CryptoError;
pub use trust_root::TrustRoot;
