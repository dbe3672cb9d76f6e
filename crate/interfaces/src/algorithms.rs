use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Hash functions a signing method can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum HashingAlgorithm {
    #[strum(serialize = "SHA256")]
    SHA256,
    #[strum(serialize = "SHA384")]
    SHA384,
    #[strum(serialize = "SHA512")]
    SHA512,
}

impl HashingAlgorithm {
    /// Size of the digest in bytes
    #[must_use]
    pub const fn digest_length(self) -> usize {
        match self {
            Self::SHA256 => 32,
            Self::SHA384 => 48,
            Self::SHA512 => 64,
        }
    }
}

/// Signing algorithm requested from the remote service.
///
/// Names follow the AWS KMS `SigningAlgorithmSpec` spelling.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum SigningAlgorithmSpec {
    RSASSA_PKCS1_V1_5_SHA_256,
    RSASSA_PKCS1_V1_5_SHA_384,
    RSASSA_PKCS1_V1_5_SHA_512,
    RSASSA_PSS_SHA_256,
    RSASSA_PSS_SHA_384,
    RSASSA_PSS_SHA_512,
}

impl SigningAlgorithmSpec {
    #[must_use]
    pub const fn from_parts(pss: bool, hashing_algorithm: HashingAlgorithm) -> Self {
        match (pss, hashing_algorithm) {
            (false, HashingAlgorithm::SHA256) => Self::RSASSA_PKCS1_V1_5_SHA_256,
            (false, HashingAlgorithm::SHA384) => Self::RSASSA_PKCS1_V1_5_SHA_384,
            (false, HashingAlgorithm::SHA512) => Self::RSASSA_PKCS1_V1_5_SHA_512,
            (true, HashingAlgorithm::SHA256) => Self::RSASSA_PSS_SHA_256,
            (true, HashingAlgorithm::SHA384) => Self::RSASSA_PSS_SHA_384,
            (true, HashingAlgorithm::SHA512) => Self::RSASSA_PSS_SHA_512,
        }
    }

    #[must_use]
    pub const fn hashing_algorithm(self) -> HashingAlgorithm {
        match self {
            Self::RSASSA_PKCS1_V1_5_SHA_256 | Self::RSASSA_PSS_SHA_256 => HashingAlgorithm::SHA256,
            Self::RSASSA_PKCS1_V1_5_SHA_384 | Self::RSASSA_PSS_SHA_384 => HashingAlgorithm::SHA384,
            Self::RSASSA_PKCS1_V1_5_SHA_512 | Self::RSASSA_PSS_SHA_512 => HashingAlgorithm::SHA512,
        }
    }

    #[must_use]
    pub const fn is_pss(self) -> bool {
        matches!(
            self,
            Self::RSASSA_PSS_SHA_256 | Self::RSASSA_PSS_SHA_384 | Self::RSASSA_PSS_SHA_512
        )
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{HashingAlgorithm, SigningAlgorithmSpec};

    #[test]
    fn test_signing_algorithm_spec_parts() {
        let spec = SigningAlgorithmSpec::from_parts(true, HashingAlgorithm::SHA384);
        assert_eq!(spec, SigningAlgorithmSpec::RSASSA_PSS_SHA_384);
        assert!(spec.is_pss());
        assert_eq!(spec.hashing_algorithm(), HashingAlgorithm::SHA384);

        let spec = SigningAlgorithmSpec::from_parts(false, HashingAlgorithm::SHA256);
        assert!(!spec.is_pss());
        assert_eq!(spec.to_string(), "RSASSA_PKCS1_V1_5_SHA_256");
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(
            SigningAlgorithmSpec::from_str("RSASSA_PSS_SHA_512").ok(),
            Some(SigningAlgorithmSpec::RSASSA_PSS_SHA_512)
        );
        assert!(SigningAlgorithmSpec::from_str("ECDSA_SHA_256").is_err());
        assert_eq!(HashingAlgorithm::SHA512.digest_length(), 64);
    }
}
