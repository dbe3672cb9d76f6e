use cosmian_jwt_kms_interfaces::GatewayError;
use thiserror::Error;

pub(crate) mod result;

#[derive(Error, Debug)]
pub enum JwtKmsError {
    #[error("{0}")]
    Default(String),

    #[error("Invalid key type: {0}")]
    InvalidKeyType(String),

    #[error("Decoding error: {0}")]
    Decode(String),

    #[error("Hash unavailable: {0}")]
    HashUnavailable(String),

    #[error("{operation}: {source}")]
    Gateway {
        operation: String,
        #[source]
        source: GatewayError,
    },

    #[error("Key parsing error: {0}")]
    KeyParse(String),

    #[error("Signature is invalid: {0}")]
    SignatureInvalid(String),

    #[error("Not Supported: {0}")]
    NotSupported(String),

    #[error("OpenSSL Error: {0}")]
    OpenSSL(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl JwtKmsError {
    pub(crate) fn gateway(operation: &str, source: GatewayError) -> Self {
        Self::Gateway {
            operation: operation.to_owned(),
            source,
        }
    }

    /// The token was checked and its signature does not match.
    #[must_use]
    pub const fn is_signature_invalid(&self) -> bool {
        matches!(self, Self::SignatureInvalid(_))
    }

    /// The remote service failed, was cancelled or timed out.
    #[must_use]
    pub const fn is_gateway_error(&self) -> bool {
        matches!(self, Self::Gateway { .. })
    }
}

impl From<openssl::error::ErrorStack> for JwtKmsError {
    fn from(e: openssl::error::ErrorStack) -> Self {
        Self::OpenSSL(format!("Error: {e}. Details: {e:?}"))
    }
}

/// Return early with an error if a condition is not satisfied.
///
/// This macro is equivalent to `if !$cond { return Err(From::from($err)); }`.
#[macro_export]
macro_rules! jwt_kms_ensure {
    ($cond:expr, $msg:literal $(,)?) => {
        if !$cond {
            return ::core::result::Result::Err($crate::jwt_kms_error!($msg));
        }
    };
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return ::core::result::Result::Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return ::core::result::Result::Err($crate::jwt_kms_error!($fmt, $($arg)*));
        }
    };
}

/// Construct a default error from a string.
#[macro_export]
macro_rules! jwt_kms_error {
    ($msg:literal) => {
        $crate::JwtKmsError::Default(::core::format_args!($msg).to_string())
    };
    ($err:expr $(,)?) => ({
        $crate::JwtKmsError::Default($err.to_string())
    });
    ($fmt:expr, $($arg:tt)*) => {
        $crate::JwtKmsError::Default(::core::format_args!($fmt, $($arg)*).to_string())
    };
}
