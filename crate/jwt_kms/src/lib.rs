pub use cache::PublicKeyCache;
pub use config::{
    DEFAULT_PUBLIC_KEY_CACHE_CAPACITY, KmsConfig, KmsKeyParams, OperationContext,
    PublicKeyCacheConfig,
};
pub use error::{
    JwtKmsError,
    result::{JwtKmsResult, JwtKmsResultHelper},
};
pub use registry::SigningMethods;
pub use signing_method::{
    AlgorithmFamily, LocalPssVerifier, PS256, PS384, PS512, PssSigningMethod, RS256, RS384,
    RS512, RsaSigningMethod, SigningKey, SigningMethod, SigningMethodDescriptor,
    hash_signing_string, resolve_public_key,
};

mod cache;
mod config;
mod error;
mod registry;
pub mod signing_method;
pub mod token;
