//! JWT signing methods delegating RSA and RSA-PSS to a remote KMS.
//!
//! Each method exposes the `sign` / `verify` pair a JWT library expects. The key argument is a
//! [`SigningKey`]: either a [`KmsConfig`] bound to a remote key, or a plain in-memory public key.
//! For a managed key, verification happens either on the remote service or locally against the
//! public key fetched once and kept in the shared [`PublicKeyCache`](crate::PublicKeyCache).

use std::fmt;

use async_trait::async_trait;
use cosmian_jwt_kms_interfaces::{HashingAlgorithm, SigningAlgorithmSpec};
use openssl::pkey::{PKey, Public};

use crate::{config::KmsConfig, error::result::JwtKmsResult};

mod hashing;
mod key_resolution;
mod pss;
mod rsa;

pub use hashing::hash_signing_string;
pub use key_resolution::resolve_public_key;
pub use pss::{LocalPssVerifier, PssSigningMethod};
pub use rsa::RsaSigningMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmFamily {
    Rsa,
    RsaPss,
}

/// Static description of a JWT signing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigningMethodDescriptor {
    pub name: &'static str,
    pub hash: HashingAlgorithm,
    pub family: AlgorithmFamily,
}

impl SigningMethodDescriptor {
    /// The remote algorithm tag, derived from the family and the hash so they cannot disagree.
    #[must_use]
    pub const fn signing_algorithm_spec(&self) -> SigningAlgorithmSpec {
        SigningAlgorithmSpec::from_parts(matches!(self.family, AlgorithmFamily::RsaPss), self.hash)
    }
}

pub const RS256: SigningMethodDescriptor = SigningMethodDescriptor {
    name: "RS256",
    hash: HashingAlgorithm::SHA256,
    family: AlgorithmFamily::Rsa,
};
pub const RS384: SigningMethodDescriptor = SigningMethodDescriptor {
    name: "RS384",
    hash: HashingAlgorithm::SHA384,
    family: AlgorithmFamily::Rsa,
};
pub const RS512: SigningMethodDescriptor = SigningMethodDescriptor {
    name: "RS512",
    hash: HashingAlgorithm::SHA512,
    family: AlgorithmFamily::Rsa,
};
pub const PS256: SigningMethodDescriptor = SigningMethodDescriptor {
    name: "PS256",
    hash: HashingAlgorithm::SHA256,
    family: AlgorithmFamily::RsaPss,
};
pub const PS384: SigningMethodDescriptor = SigningMethodDescriptor {
    name: "PS384",
    hash: HashingAlgorithm::SHA384,
    family: AlgorithmFamily::RsaPss,
};
pub const PS512: SigningMethodDescriptor = SigningMethodDescriptor {
    name: "PS512",
    hash: HashingAlgorithm::SHA512,
    family: AlgorithmFamily::RsaPss,
};

/// Key argument of [`SigningMethod::sign`] and [`SigningMethod::verify`].
#[derive(Clone)]
pub enum SigningKey {
    /// A key held by the remote service
    Managed(KmsConfig),
    /// A plain public key, verified in process without any remote call
    RawKey(PKey<Public>),
}

impl SigningKey {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Managed(_) => "KMS configuration",
            Self::RawKey(_) => "raw public key",
        }
    }
}

impl From<KmsConfig> for SigningKey {
    fn from(config: KmsConfig) -> Self {
        Self::Managed(config)
    }
}

impl From<PKey<Public>> for SigningKey {
    fn from(public_key: PKey<Public>) -> Self {
        Self::RawKey(public_key)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Managed(config) => f.debug_tuple("Managed").field(config).finish(),
            Self::RawKey(key) => f.debug_tuple("RawKey").field(&key.id()).finish(),
        }
    }
}

/// The interface a JWT library calls to sign and verify the `header.claims` signing string.
#[async_trait]
pub trait SigningMethod: Send + Sync {
    /// The JWT `alg` header value
    fn alg(&self) -> &'static str;

    /// Sign the signing string, returning the base64url encoded signature
    async fn sign(&self, signing_string: &str, key: &SigningKey) -> JwtKmsResult<String>;

    /// Verify the base64url encoded `signature` of the signing string
    ///
    /// Any failure, including a mismatching signature, is an error.
    async fn verify(
        &self,
        signing_string: &str,
        signature: &str,
        key: &SigningKey,
    ) -> JwtKmsResult<()>;
}
