use std::sync::Arc;

use cosmian_jwt_kms_interfaces::HashingAlgorithm;
use openssl::{
    pkey::{Id, PKey, Public},
    pkey_ctx::PkeyCtx,
    rsa::Padding,
    sign::RsaPssSaltlen,
};
use tracing::{debug, warn};

use super::{AlgorithmFamily, hashing::md_ref};
use crate::{
    cache::PublicKeyCache,
    config::KmsConfig,
    error::{JwtKmsError, result::JwtKmsResult},
};

/// `RSA_PSS_SALTLEN_AUTO`: the salt length is recovered from the signature on verification
pub(crate) fn pss_salt_length_auto() -> RsaPssSaltlen {
    RsaPssSaltlen::custom(-2)
}

/// Return the RSA public key of the remote key bound to `config`.
///
/// The key is read from the cache, or fetched once from the gateway, parsed and cached.
/// A key which is not RSA is rejected, whether it came from the cache or the gateway.
pub async fn resolve_public_key(
    config: &KmsConfig,
    cache: &PublicKeyCache,
) -> JwtKmsResult<Arc<PKey<Public>>> {
    let key_id = config.key_id();
    let public_key = if let Some(cached) = cache.get(key_id).await {
        cached
    } else {
        debug!("fetching public key {key_id} from the KMS");
        let der = config
            .context()
            .run("getting public key", config.gateway().get_public_key(key_id))
            .await?;
        let public_key = Arc::new(
            PKey::public_key_from_der(&der)
                .map_err(|e| JwtKmsError::KeyParse(format!("parsing public key: {e}")))?,
        );
        cache.insert(key_id.to_owned(), public_key.clone()).await;
        public_key
    };

    if public_key.id() != Id::RSA {
        return Err(JwtKmsError::InvalidKeyType(format!(
            "invalid key type for key {key_id}"
        )));
    }
    Ok(public_key)
}

/// Verify a signature over an already computed digest.
///
/// PKCS#1 v1.5 for [`AlgorithmFamily::Rsa`]; PSS with MGF1 over the same hash
/// and an automatically detected salt length for [`AlgorithmFamily::RsaPss`].
pub(crate) fn verify_digest_locally(
    public_key: &PKey<Public>,
    family: AlgorithmFamily,
    hashing_algorithm: HashingAlgorithm,
    digest: &[u8],
    signature: &[u8],
    key_label: &str,
) -> JwtKmsResult<()> {
    let md = md_ref(hashing_algorithm);
    let mut ctx = PkeyCtx::new(public_key)?;
    ctx.verify_init()?;
    match family {
        AlgorithmFamily::Rsa => {
            ctx.set_rsa_padding(Padding::PKCS1)?;
            ctx.set_signature_md(md)?;
        }
        AlgorithmFamily::RsaPss => {
            ctx.set_rsa_padding(Padding::PKCS1_PSS)?;
            ctx.set_signature_md(md)?;
            ctx.set_rsa_mgf1_md(md)?;
            ctx.set_rsa_pss_saltlen(pss_salt_length_auto())?;
        }
    }
    // openssl reports malformed signatures (e.g. wrong length) as errors; both are a mismatch here
    match ctx.verify(digest, signature) {
        Ok(true) => Ok(()),
        Ok(false) => {
            warn!("local {family:?} verification failed for key {key_label}");
            Err(JwtKmsError::SignatureInvalid(format!(
                "verifying signature locally with key {key_label}"
            )))
        }
        Err(e) => {
            warn!("local {family:?} verification error for key {key_label}: {e}");
            Err(JwtKmsError::SignatureInvalid(format!(
                "verifying signature locally with key {key_label}: {e}"
            )))
        }
    }
}
