use std::sync::Arc;

use async_trait::async_trait;
use cosmian_jwt_kms_interfaces::SigningAlgorithmSpec;
use tracing::debug;

use super::{
    SigningKey, SigningMethod, SigningMethodDescriptor, hash_signing_string,
    key_resolution::{resolve_public_key, verify_digest_locally},
};
use crate::{
    cache::PublicKeyCache,
    config::KmsConfig,
    error::{JwtKmsError, result::JwtKmsResult},
    token::{decode_segment, encode_segment},
};

/// RSA signing method whose private key lives in the KMS.
///
/// Signing always goes through the KMS. Verification goes through the KMS when the
/// configuration asks for it, and is otherwise done locally with the cached public key.
pub struct RsaSigningMethod {
    descriptor: SigningMethodDescriptor,
    cache: Arc<PublicKeyCache>,
}

impl RsaSigningMethod {
    #[must_use]
    pub const fn new(descriptor: SigningMethodDescriptor, cache: Arc<PublicKeyCache>) -> Self {
        Self { descriptor, cache }
    }

    #[must_use]
    pub const fn descriptor(&self) -> &SigningMethodDescriptor {
        &self.descriptor
    }

    pub(crate) fn cache(&self) -> &PublicKeyCache {
        &self.cache
    }

    pub(crate) fn managed_config<'a>(&self, key: &'a SigningKey) -> JwtKmsResult<&'a KmsConfig> {
        match key {
            SigningKey::Managed(config) => Ok(config),
            SigningKey::RawKey(_) => Err(JwtKmsError::InvalidKeyType(format!(
                "{} expects a KMS configuration, got a {}",
                self.descriptor.name,
                key.kind()
            ))),
        }
    }

    /// Decode, hash and dispatch between the remote and the local verification.
    pub(crate) async fn verify_managed(
        &self,
        signing_string: &str,
        signature: &str,
        config: &KmsConfig,
    ) -> JwtKmsResult<()> {
        let signature = decode_segment(signature)
            .map_err(|e| JwtKmsError::Decode(format!("decoding signature: {e}")))?;
        let digest = hash_signing_string(self.descriptor.hash, signing_string)?;

        if config.verify_with_kms() {
            return verify_with_kms(
                config,
                self.descriptor.signing_algorithm_spec(),
                &digest,
                &signature,
            )
            .await;
        }

        let public_key = resolve_public_key(config, self.cache()).await?;
        verify_digest_locally(
            &public_key,
            self.descriptor.family,
            self.descriptor.hash,
            &digest,
            &signature,
            config.key_id(),
        )
    }
}

/// Ask the KMS to verify `signature` over `digest`; a negative answer is `SignatureInvalid`.
pub(crate) async fn verify_with_kms(
    config: &KmsConfig,
    algorithm: SigningAlgorithmSpec,
    digest: &[u8],
    signature: &[u8],
) -> JwtKmsResult<()> {
    debug!("verifying {algorithm} signature with KMS key {}", config.key_id());
    let valid = config
        .context()
        .run(
            "verifying signature with KMS",
            config
                .gateway()
                .verify(config.key_id(), algorithm, digest, signature),
        )
        .await?;
    if valid {
        Ok(())
    } else {
        Err(JwtKmsError::SignatureInvalid(format!(
            "KMS rejected the {algorithm} signature for key {}",
            config.key_id()
        )))
    }
}

#[async_trait]
impl SigningMethod for RsaSigningMethod {
    fn alg(&self) -> &'static str {
        self.descriptor.name
    }

    async fn sign(&self, signing_string: &str, key: &SigningKey) -> JwtKmsResult<String> {
        let config = self.managed_config(key)?;
        let digest = hash_signing_string(self.descriptor.hash, signing_string)?;
        let algorithm = self.descriptor.signing_algorithm_spec();
        debug!("signing with {algorithm} and KMS key {}", config.key_id());
        let signature = config
            .context()
            .run(
                "signing with KMS",
                config.gateway().sign(config.key_id(), algorithm, &digest),
            )
            .await?;
        Ok(encode_segment(&signature))
    }

    async fn verify(
        &self,
        signing_string: &str,
        signature: &str,
        key: &SigningKey,
    ) -> JwtKmsResult<()> {
        let config = self.managed_config(key)?;
        self.verify_managed(signing_string, signature, config).await
    }
}
