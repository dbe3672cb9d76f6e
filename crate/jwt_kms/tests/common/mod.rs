#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Arc;

use cosmian_jwt_kms::{KmsConfig, SigningKey};
use cosmian_jwt_kms_logger::log_init;
use openssl::{
    hash::MessageDigest,
    pkey::{PKey, Private, Public},
    rsa::Padding,
    sign::{RsaPssSaltlen, Signer},
};
use test_jwt_kms_gateway::TestGateway;

pub(crate) const KEY_ID: &str = "test-key";

pub(crate) const SIGNING_STRING: &str = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiIxMjM0NTY3ODkwIn0";

/// A gateway holding one RSA-2048 key under [`KEY_ID`]
pub(crate) fn gateway() -> (Arc<TestGateway>, PKey<Public>) {
    log_init(option_env!("RUST_LOG"));
    let gateway = Arc::new(TestGateway::new());
    let public_key = gateway.generate_rsa_key(KEY_ID, 2048).unwrap();
    (gateway, public_key)
}

pub(crate) fn managed(gateway: &Arc<TestGateway>, verify_with_kms: bool) -> SigningKey {
    SigningKey::Managed(KmsConfig::new(gateway.clone(), KEY_ID, verify_with_kms))
}

/// Sign the way a JWT library holding the private key would
pub(crate) fn sign_offline(
    private_key: &PKey<Private>,
    digest: MessageDigest,
    pss: bool,
    data: &[u8],
) -> Vec<u8> {
    if pss {
        return sign_pss_offline(private_key, digest, RsaPssSaltlen::DIGEST_LENGTH, data);
    }
    let mut signer = Signer::new(digest, private_key).unwrap();
    signer.set_rsa_padding(Padding::PKCS1).unwrap();
    signer.sign_oneshot_to_vec(data).unwrap()
}

pub(crate) fn sign_pss_offline(
    private_key: &PKey<Private>,
    digest: MessageDigest,
    salt_length: RsaPssSaltlen,
    data: &[u8],
) -> Vec<u8> {
    let mut signer = Signer::new(digest, private_key).unwrap();
    signer.set_rsa_padding(Padding::PKCS1_PSS).unwrap();
    signer.set_rsa_mgf1_md(digest).unwrap();
    signer.set_rsa_pss_saltlen(salt_length).unwrap();
    signer.sign_oneshot_to_vec(data).unwrap()
}
