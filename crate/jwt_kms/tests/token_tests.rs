#![allow(clippy::unwrap_used, clippy::expect_used)]
use std::sync::Arc;

use cosmian_jwt_kms::{
    JwtKmsError, PublicKeyCache, SigningKey, SigningMethods,
    token::{decode_segment, encode_segment, sign_token, verify_token},
};
use serde_json::{Value, json};

mod common;
use common::{gateway, managed};

#[tokio::test]
async fn sign_and_verify_tokens_for_every_algorithm() {
    let (gateway, public_key) = gateway();
    let methods = SigningMethods::new(Arc::new(PublicKeyCache::default()));
    let claims = json!({"sub": "1234567890", "name": "John Doe", "admin": true});

    for alg in methods.algorithms() {
        let method = methods.get(alg).unwrap();
        let token = sign_token(method.as_ref(), &claims, &managed(&gateway, false))
            .await
            .unwrap();
        assert_eq!(token.split('.').count(), 3);

        let header: Value =
            serde_json::from_slice(&decode_segment(token.split('.').next().unwrap()).unwrap())
                .unwrap();
        assert_eq!(header["alg"], alg);
        assert_eq!(header["typ"], "JWT");

        for key in [managed(&gateway, false), managed(&gateway, true)] {
            let verified = verify_token(&methods, &token, &key).await.unwrap();
            assert_eq!(verified, claims);
        }

        // PS tokens also verify against the plain public key
        if alg.starts_with("PS") {
            let verified = verify_token(&methods, &token, &SigningKey::RawKey(public_key.clone()))
                .await
                .unwrap();
            assert_eq!(verified, claims);
        }
    }
    assert_eq!(gateway.calls().get_public_key, 1);
    assert_eq!(methods.cache().len().await, 1);
}

#[tokio::test]
async fn tampered_claims_are_rejected() {
    let (gateway, _) = gateway();
    let methods = SigningMethods::default();
    let method = methods.get("RS256").unwrap();
    let token = sign_token(
        method.as_ref(),
        &json!({"sub": "alice"}),
        &managed(&gateway, false),
    )
    .await
    .unwrap();

    let mut parts: Vec<String> = token.split('.').map(ToOwned::to_owned).collect();
    parts[1] = encode_segment(br#"{"sub":"mallory"}"#);
    let err = verify_token(&methods, &parts.join("."), &managed(&gateway, false))
        .await
        .unwrap_err();
    assert!(err.is_signature_invalid(), "{err}");
}

#[tokio::test]
async fn malformed_tokens() {
    let (gateway, _) = gateway();
    let methods = SigningMethods::default();
    let key = managed(&gateway, false);

    let err = verify_token(&methods, "no-dots-at-all", &key)
        .await
        .unwrap_err();
    assert!(matches!(err, JwtKmsError::Decode(_)), "{err}");

    let err = verify_token(&methods, "only.two", &key).await.unwrap_err();
    assert!(matches!(err, JwtKmsError::Decode(_)), "{err}");

    let header = encode_segment(br#"{"alg":"ES256"}"#);
    let err = verify_token(&methods, &format!("{header}.e30.AAAA"), &key)
        .await
        .unwrap_err();
    assert!(matches!(err, JwtKmsError::NotSupported(_)), "{err}");

    let header = encode_segment(br#"{"typ":"JWT"}"#);
    let err = verify_token(&methods, &format!("{header}.e30.AAAA"), &key)
        .await
        .unwrap_err();
    assert!(matches!(err, JwtKmsError::Decode(_)), "{err}");

    assert_eq!(gateway.calls().total(), 0);
}
