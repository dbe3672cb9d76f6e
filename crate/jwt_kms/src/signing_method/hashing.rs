use cosmian_jwt_kms_interfaces::HashingAlgorithm;
use openssl::{
    hash::{MessageDigest, hash},
    md::{Md, MdRef},
    nid::Nid,
};

use crate::error::{JwtKmsError, result::JwtKmsResult};

pub(crate) const fn nid(hashing_algorithm: HashingAlgorithm) -> Nid {
    match hashing_algorithm {
        HashingAlgorithm::SHA256 => Nid::SHA256,
        HashingAlgorithm::SHA384 => Nid::SHA384,
        HashingAlgorithm::SHA512 => Nid::SHA512,
    }
}

/// The openssl digest, or `HashUnavailable` when the linked provider does not offer it
pub(crate) fn message_digest(hashing_algorithm: HashingAlgorithm) -> JwtKmsResult<MessageDigest> {
    MessageDigest::from_nid(nid(hashing_algorithm)).ok_or_else(|| {
        JwtKmsError::HashUnavailable(format!("{hashing_algorithm} is not available"))
    })
}

pub(crate) fn md_ref(hashing_algorithm: HashingAlgorithm) -> &'static MdRef {
    match hashing_algorithm {
        HashingAlgorithm::SHA256 => Md::sha256(),
        HashingAlgorithm::SHA384 => Md::sha384(),
        HashingAlgorithm::SHA512 => Md::sha512(),
    }
}

/// Hash the JWT signing string with the algorithm bound to a signing method.
pub fn hash_signing_string(
    hashing_algorithm: HashingAlgorithm,
    signing_string: &str,
) -> JwtKmsResult<Vec<u8>> {
    let md = message_digest(hashing_algorithm)?;
    let digest = hash(md, signing_string.as_bytes()).map_err(|e| {
        JwtKmsError::HashUnavailable(format!("{hashing_algorithm} digest failed: {e}"))
    })?;
    Ok(digest.to_vec())
}
