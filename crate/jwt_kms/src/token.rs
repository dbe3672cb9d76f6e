//! Compact JWS plumbing around the signing methods.
//!
//! Only the signature is checked here: claims are returned as JSON for the caller to validate.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::{Value, json};

use crate::{
    error::{
        JwtKmsError,
        result::{JwtKmsResult, JwtKmsResultHelper},
    },
    registry::SigningMethods,
    signing_method::{SigningKey, SigningMethod},
};

/// Base64url encode a JWT segment, without padding
#[must_use]
pub fn encode_segment(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Base64url decode a JWT segment; trailing padding is tolerated
pub fn decode_segment(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(segment.trim_end_matches('='))
}

/// Build and sign a compact JWT carrying `claims`.
pub async fn sign_token(
    method: &dyn SigningMethod,
    claims: &Value,
    key: &SigningKey,
) -> JwtKmsResult<String> {
    let header = json!({ "alg": method.alg(), "typ": "JWT" });
    let signing_string = format!(
        "{}.{}",
        encode_segment(&serde_json::to_vec(&header)?),
        encode_segment(&serde_json::to_vec(claims)?)
    );
    let signature = method.sign(&signing_string, key).await?;
    Ok(format!("{signing_string}.{signature}"))
}

/// Verify the signature of a compact JWT and return its claims.
///
/// The signing method is picked from the `alg` header among `methods`.
pub async fn verify_token(
    methods: &SigningMethods,
    token: &str,
    key: &SigningKey,
) -> JwtKmsResult<Value> {
    let (signing_string, signature) = token
        .rsplit_once('.')
        .ok_or_else(|| JwtKmsError::Decode("token contains no signature".to_owned()))?;
    let Some((header, claims)) = signing_string.split_once('.') else {
        return Err(JwtKmsError::Decode(
            "token must have three segments".to_owned(),
        ));
    };

    let header = serde_json::from_slice::<Value>(
        &decode_segment(header).map_err(|e| JwtKmsError::Decode(format!("token header: {e}")))?,
    )
    .context("parsing token header")?;
    let alg = header
        .get("alg")
        .and_then(Value::as_str)
        .ok_or_else(|| JwtKmsError::Decode("token header has no alg".to_owned()))?;
    let method = methods
        .get(alg)
        .ok_or_else(|| JwtKmsError::NotSupported(format!("signing method {alg}")))?;

    method.verify(signing_string, signature, key).await?;

    let claims = decode_segment(claims)
        .map_err(|e| JwtKmsError::Decode(format!("token claims: {e}")))?;
    Ok(serde_json::from_slice(&claims)?)
}

#[cfg(test)]
#[expect(clippy::unwrap_used)]
mod tests {
    use super::{decode_segment, encode_segment};

    #[test]
    fn test_segments() {
        assert_eq!(encode_segment(b"\xfb\xff"), "-_8");
        assert_eq!(decode_segment("-_8").unwrap(), b"\xfb\xff");
        // padded input, as some producers emit
        assert_eq!(decode_segment("-_8=").unwrap(), b"\xfb\xff");
        assert!(decode_segment("+/8").is_err());
        assert!(decode_segment("a b").is_err());
    }
}
