use std::sync::Arc;

use async_trait::async_trait;
use cosmian_jwt_kms_interfaces::HashingAlgorithm;
use openssl::{
    pkey::{Id, PKey, Public},
    rsa::Padding,
    sign::Verifier,
};
use tracing::warn;

use super::{
    AlgorithmFamily, RsaSigningMethod, SigningKey, SigningMethod, SigningMethodDescriptor,
    hashing::message_digest,
    key_resolution::pss_salt_length_auto,
};
use crate::{
    cache::PublicKeyCache,
    error::{JwtKmsError, result::JwtKmsResult},
    jwt_kms_ensure,
    token::decode_segment,
};

/// Standard in-process RSA-PSS verifier for plain public keys.
///
/// It hashes the signing string itself and accepts any salt length,
/// as JWT libraries do for the `PS*` algorithms.
#[derive(Debug, Clone, Copy)]
pub struct LocalPssVerifier {
    hash: HashingAlgorithm,
}

impl LocalPssVerifier {
    #[must_use]
    pub const fn new(hash: HashingAlgorithm) -> Self {
        Self { hash }
    }

    pub fn verify(
        &self,
        signing_string: &str,
        signature: &str,
        public_key: &PKey<Public>,
    ) -> JwtKmsResult<()> {
        jwt_kms_ensure!(
            public_key.id() == Id::RSA,
            JwtKmsError::InvalidKeyType("RSA-PSS verification needs an RSA public key".to_owned())
        );
        let signature = decode_segment(signature)
            .map_err(|e| JwtKmsError::Decode(format!("decoding signature: {e}")))?;

        let mut verifier = Verifier::new(message_digest(self.hash)?, public_key)?;
        verifier.set_rsa_padding(Padding::PKCS1_PSS)?;
        verifier.set_rsa_mgf1_md(message_digest(self.hash)?)?;
        verifier.set_rsa_pss_saltlen(pss_salt_length_auto())?;
        match verifier.verify_oneshot(&signature, signing_string.as_bytes()) {
            Ok(true) => Ok(()),
            Ok(false) => Err(JwtKmsError::SignatureInvalid(
                "verifying signature with the raw public key".to_owned(),
            )),
            Err(e) => {
                warn!("RSA-PSS verification error with a raw public key: {e}");
                Err(JwtKmsError::SignatureInvalid(format!(
                    "verifying signature with the raw public key: {e}"
                )))
            }
        }
    }
}

/// RSA-PSS signing method backed by the KMS.
///
/// Same key and hash handling as [`RsaSigningMethod`] with PSS padding. In addition,
/// verification accepts a [`SigningKey::RawKey`], checked by [`LocalPssVerifier`]
/// without touching the gateway or the cache.
pub struct PssSigningMethod {
    rsa: RsaSigningMethod,
    fallback: LocalPssVerifier,
}

impl PssSigningMethod {
    #[must_use]
    pub fn new(descriptor: SigningMethodDescriptor, cache: Arc<PublicKeyCache>) -> Self {
        debug_assert_eq!(descriptor.family, AlgorithmFamily::RsaPss);
        Self {
            fallback: LocalPssVerifier::new(descriptor.hash),
            rsa: RsaSigningMethod::new(descriptor, cache),
        }
    }

    #[must_use]
    pub const fn descriptor(&self) -> &SigningMethodDescriptor {
        self.rsa.descriptor()
    }
}

#[async_trait]
impl SigningMethod for PssSigningMethod {
    fn alg(&self) -> &'static str {
        self.rsa.alg()
    }

    async fn sign(&self, signing_string: &str, key: &SigningKey) -> JwtKmsResult<String> {
        self.rsa.sign(signing_string, key).await
    }

    async fn verify(
        &self,
        signing_string: &str,
        signature: &str,
        key: &SigningKey,
    ) -> JwtKmsResult<()> {
        match key {
            SigningKey::RawKey(public_key) => {
                self.fallback.verify(signing_string, signature, public_key)
            }
            SigningKey::Managed(config) => {
                self.rsa
                    .verify_managed(signing_string, signature, config)
                    .await
            }
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used)]
mod tests {
    use cosmian_jwt_kms_interfaces::HashingAlgorithm;
    use openssl::{
        hash::MessageDigest,
        pkey::PKey,
        rsa::{Padding, Rsa},
        sign::{RsaPssSaltlen, Signer},
    };

    use super::LocalPssVerifier;
    use crate::{JwtKmsError, token::encode_segment};

    #[test]
    fn test_local_pss_verifier() {
        let private_key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
        let public_key = PKey::public_key_from_der(&private_key.public_key_to_der().unwrap())
            .unwrap();

        let verifier = LocalPssVerifier::new(HashingAlgorithm::SHA384);
        let sign = |salt_length| {
            let mut signer = Signer::new(MessageDigest::sha384(), &private_key).unwrap();
            signer.set_rsa_padding(Padding::PKCS1_PSS).unwrap();
            signer.set_rsa_pss_saltlen(salt_length).unwrap();
            signer.sign_oneshot_to_vec(b"header.claims").unwrap()
        };
        // any salt length is accepted
        for salt_length in [RsaPssSaltlen::MAXIMUM_LENGTH, RsaPssSaltlen::custom(0)] {
            verifier
                .verify("header.claims", &encode_segment(&sign(salt_length)), &public_key)
                .unwrap();
        }

        let signature = sign(RsaPssSaltlen::DIGEST_LENGTH);
        verifier
            .verify("header.claims", &encode_segment(&signature), &public_key)
            .unwrap();

        let err = verifier
            .verify("header.other", &encode_segment(&signature), &public_key)
            .unwrap_err();
        assert!(err.is_signature_invalid());

        let err = verifier
            .verify("header.claims", "not base64!", &public_key)
            .unwrap_err();
        assert!(matches!(err, JwtKmsError::Decode(_)));
    }
}
