//! # Remote Crypto Gateway
//! The gateway interface should be implemented by clients of a key-management service that holds
//! the private half of RSA key pairs. The JWT signing methods only ever hand it pre-computed
//! digests, so the private key never leaves the service.
//!
//! Implementations must be safe to share between concurrent callers. Cancellation and deadlines
//! are enforced by the caller dropping the returned future.
use async_trait::async_trait;

use crate::{GatewayResult, SigningAlgorithmSpec};

#[async_trait]
pub trait RemoteCryptoGateway: Send + Sync {
    /// Fetch the public half of a key pair
    /// # Arguments
    /// * `key_id` - the ID of the key held by the service.
    /// # Returns
    /// * `Vec<u8>` - the public key, DER encoded `SubjectPublicKeyInfo`
    async fn get_public_key(&self, key_id: &str) -> GatewayResult<Vec<u8>>;

    /// Sign a digest
    /// # Arguments
    /// * `key_id` - the ID of the key to sign with.
    /// * `algorithm` - the signing algorithm; its hash must be the one used to compute `digest`.
    /// * `digest` - the message digest.
    /// # Returns
    /// * `Vec<u8>` - the raw signature
    async fn sign(
        &self,
        key_id: &str,
        algorithm: SigningAlgorithmSpec,
        digest: &[u8],
    ) -> GatewayResult<Vec<u8>>;

    /// Verify a signature over a digest
    /// # Returns
    /// * `bool` - whether the signature is valid
    async fn verify(
        &self,
        key_id: &str,
        algorithm: SigningAlgorithmSpec,
        digest: &[u8],
        signature: &[u8],
    ) -> GatewayResult<bool>;
}
