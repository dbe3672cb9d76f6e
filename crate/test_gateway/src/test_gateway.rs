use std::{
    collections::HashMap,
    sync::{
        RwLock,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use cosmian_jwt_kms_interfaces::{
    GatewayError, GatewayResult, HashingAlgorithm, RemoteCryptoGateway, SigningAlgorithmSpec,
};
use cosmian_jwt_kms_logger::{debug, trace};
use openssl::{
    ec::{EcGroup, EcKey},
    md::{Md, MdRef},
    nid::Nid,
    pkey::{Id, PKey, Private, Public},
    pkey_ctx::PkeyCtx,
    rsa::{Padding, Rsa},
    sign::RsaPssSaltlen,
};

/// Number of calls received by a [`TestGateway`], per operation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GatewayCalls {
    pub get_public_key: usize,
    pub sign: usize,
    pub verify: usize,
}

impl GatewayCalls {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.get_public_key + self.sign + self.verify
    }
}

/// A remote crypto gateway holding its private keys in memory.
///
/// It behaves like AWS KMS for `DIGEST` messages: PKCS#1 v1.5 or PSS with a salt
/// as long as the digest. Every call is counted, and latency or an outage can be
/// simulated to exercise timeouts and error paths.
#[derive(Default)]
pub struct TestGateway {
    keys: RwLock<HashMap<String, PKey<Private>>>,
    latency: Option<Duration>,
    unavailable: AtomicBool,
    get_public_key_calls: AtomicUsize,
    sign_calls: AtomicUsize,
    verify_calls: AtomicUsize,
}

fn openssl_error(e: openssl::error::ErrorStack) -> GatewayError {
    GatewayError::Default(format!("OpenSSL error: {e}"))
}

fn md(hashing_algorithm: HashingAlgorithm) -> &'static MdRef {
    match hashing_algorithm {
        HashingAlgorithm::SHA256 => Md::sha256(),
        HashingAlgorithm::SHA384 => Md::sha384(),
        HashingAlgorithm::SHA512 => Md::sha512(),
    }
}

impl TestGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// When unavailable, every call fails with `GatewayError::Unavailable`
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    pub fn add_key(&self, key_id: &str, private_key: PKey<Private>) -> GatewayResult<()> {
        self.keys
            .write()
            .map_err(|e| GatewayError::Default(format!("cannot lock keys for write: {e}")))?
            .insert(key_id.to_owned(), private_key);
        Ok(())
    }

    /// Generate an RSA key pair under `key_id` and return its public key
    pub fn generate_rsa_key(&self, key_id: &str, bits: u32) -> GatewayResult<PKey<Public>> {
        let private_key =
            PKey::from_rsa(Rsa::generate(bits).map_err(openssl_error)?).map_err(openssl_error)?;
        self.add_key(key_id, private_key)?;
        self.public_key(key_id)
    }

    /// Generate a P-256 key pair, which the RSA signing methods must refuse
    pub fn generate_ec_key(&self, key_id: &str) -> GatewayResult<PKey<Public>> {
        let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).map_err(openssl_error)?;
        let private_key =
            PKey::from_ec_key(EcKey::generate(&group).map_err(openssl_error)?)
                .map_err(openssl_error)?;
        self.add_key(key_id, private_key)?;
        self.public_key(key_id)
    }

    /// The private key, for tests producing signatures off the gateway
    pub fn private_key(&self, key_id: &str) -> GatewayResult<PKey<Private>> {
        self.keys
            .read()
            .map_err(|e| GatewayError::Default(format!("cannot lock keys for read: {e}")))?
            .get(key_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(key_id.to_owned()))
    }

    pub fn public_key(&self, key_id: &str) -> GatewayResult<PKey<Public>> {
        let der = self
            .private_key(key_id)?
            .public_key_to_der()
            .map_err(openssl_error)?;
        PKey::public_key_from_der(&der).map_err(openssl_error)
    }

    #[must_use]
    pub fn calls(&self) -> GatewayCalls {
        GatewayCalls {
            get_public_key: self.get_public_key_calls.load(Ordering::SeqCst),
            sign: self.sign_calls.load(Ordering::SeqCst),
            verify: self.verify_calls.load(Ordering::SeqCst),
        }
    }

    async fn enter(&self, counter: &AtomicUsize) -> GatewayResult<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("test gateway is down".to_owned()));
        }
        Ok(())
    }

    fn rsa_key(&self, key_id: &str) -> GatewayResult<PKey<Private>> {
        let private_key = self.private_key(key_id)?;
        if private_key.id() != Id::RSA {
            return Err(GatewayError::InvalidRequest(format!(
                "key {key_id} is not an RSA key"
            )));
        }
        Ok(private_key)
    }
}

fn check_digest(algorithm: SigningAlgorithmSpec, digest: &[u8]) -> GatewayResult<()> {
    let expected = algorithm.hashing_algorithm().digest_length();
    if digest.len() != expected {
        return Err(GatewayError::InvalidRequest(format!(
            "{algorithm} expects a {expected} bytes digest, got {}",
            digest.len()
        )));
    }
    Ok(())
}

fn configure<T>(ctx: &mut PkeyCtx<T>, algorithm: SigningAlgorithmSpec) -> GatewayResult<()> {
    let md = md(algorithm.hashing_algorithm());
    if algorithm.is_pss() {
        ctx.set_rsa_padding(Padding::PKCS1_PSS).map_err(openssl_error)?;
        ctx.set_signature_md(md).map_err(openssl_error)?;
        ctx.set_rsa_mgf1_md(md).map_err(openssl_error)?;
        ctx.set_rsa_pss_saltlen(RsaPssSaltlen::DIGEST_LENGTH)
            .map_err(openssl_error)?;
    } else {
        ctx.set_rsa_padding(Padding::PKCS1).map_err(openssl_error)?;
        ctx.set_signature_md(md).map_err(openssl_error)?;
    }
    Ok(())
}

#[async_trait]
impl RemoteCryptoGateway for TestGateway {
    async fn get_public_key(&self, key_id: &str) -> GatewayResult<Vec<u8>> {
        self.enter(&self.get_public_key_calls).await?;
        debug!("test gateway: get public key {key_id}");
        self.private_key(key_id)?
            .public_key_to_der()
            .map_err(openssl_error)
    }

    async fn sign(
        &self,
        key_id: &str,
        algorithm: SigningAlgorithmSpec,
        digest: &[u8],
    ) -> GatewayResult<Vec<u8>> {
        self.enter(&self.sign_calls).await?;
        trace!(
            "test gateway: sign {} with {key_id} ({algorithm})",
            hex::encode(digest)
        );
        check_digest(algorithm, digest)?;
        let private_key = self.rsa_key(key_id)?;
        let mut ctx = PkeyCtx::new(&private_key).map_err(openssl_error)?;
        ctx.sign_init().map_err(openssl_error)?;
        configure(&mut ctx, algorithm)?;
        let mut signature = Vec::new();
        ctx.sign_to_vec(digest, &mut signature)
            .map_err(openssl_error)?;
        Ok(signature)
    }

    async fn verify(
        &self,
        key_id: &str,
        algorithm: SigningAlgorithmSpec,
        digest: &[u8],
        signature: &[u8],
    ) -> GatewayResult<bool> {
        self.enter(&self.verify_calls).await?;
        trace!("test gateway: verify with {key_id} ({algorithm})");
        check_digest(algorithm, digest)?;
        let private_key = self.rsa_key(key_id)?;
        let mut ctx = PkeyCtx::new(&private_key).map_err(openssl_error)?;
        ctx.verify_init().map_err(openssl_error)?;
        configure(&mut ctx, algorithm)?;
        // a malformed signature is an invalid one, as for the real service
        Ok(ctx.verify(digest, signature).unwrap_or(false))
    }
}
