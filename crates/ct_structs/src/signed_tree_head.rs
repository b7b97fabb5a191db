// Copyright (c) 2025 Cloudflare, Inc.
// Licensed under the BSD-3-Clause license found in the LICENSE file or at https://opensource.org/licenses/BSD-3-Clause

//! Signed tree heads as returned by the
//! [`get-sth`](https://datatracker.ietf.org/doc/html/rfc6962#section-4.3)
//! endpoint.

use crate::{to_datetime, CtError, SignatureType, UnixTimestamp, Version};
use byteorder::{BigEndian, WriteBytesExt};
use chrono::{DateTime, Utc};
use digitally_signed::{DigitallySigned, KeyHandle, PrivateKey};
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};

/// A `get-sth` response.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetSthResponse {
    pub tree_size: u64,
    pub timestamp: UnixTimestamp,
    #[serde_as(as = "Base64")]
    pub sha256_root_hash: Vec<u8>,
    #[serde_as(as = "Base64")]
    pub tree_head_signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignedTreeHead {
    pub tree_size: u64,
    pub timestamp: UnixTimestamp,
    pub root_hash: [u8; 32],
    pub signature: DigitallySigned,
}

impl SignedTreeHead {
    /// Decodes a `get-sth` response.
    ///
    /// # Errors
    ///
    /// Returns [`CtError::InvalidRootHash`] if the root hash is not 32 bytes,
    /// or any error from [`DigitallySigned::from_bytes`].
    pub fn from_response(response: &GetSthResponse) -> Result<Self, CtError> {
        let root_hash = response
            .sha256_root_hash
            .as_slice()
            .try_into()
            .map_err(|_| CtError::InvalidRootHash(response.sha256_root_hash.len()))?;

        Ok(Self {
            tree_size: response.tree_size,
            timestamp: response.timestamp,
            root_hash,
            signature: DigitallySigned::from_bytes(&response.tree_head_signature)?,
        })
    }

    /// Returns the `get-sth` response for this tree head.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree head has not been signed.
    pub fn to_response(&self) -> Result<GetSthResponse, CtError> {
        Ok(GetSthResponse {
            tree_size: self.tree_size,
            timestamp: self.timestamp,
            sha256_root_hash: self.root_hash.to_vec(),
            tree_head_signature: self.signature.signed_bytes()?,
        })
    }

    /// Parses a `get-sth` document.
    ///
    /// # Errors
    ///
    /// Returns [`CtError::InvalidJson`] if the text does not parse, or any
    /// error from [`SignedTreeHead::from_response`].
    pub fn from_json(json: &str) -> Result<Self, CtError> {
        Self::from_response(&serde_json::from_str(json)?)
    }

    /// Serializes this tree head as a `get-sth` document.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree head has not been signed.
    pub fn to_json(&self) -> Result<String, CtError> {
        Ok(serde_json::to_string(&self.to_response()?)?)
    }

    /// Returns a tree head signed with `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn sign(
        tree_size: u64,
        timestamp: UnixTimestamp,
        root_hash: [u8; 32],
        key: &PrivateKey,
    ) -> Result<Self, CtError> {
        let content = signature_input(timestamp, tree_size, &root_hash);
        let mut signature = DigitallySigned::for_key(KeyHandle::from(key.clone()), content);
        signature.sign()?;

        Ok(Self {
            tree_size,
            timestamp,
            root_hash,
            signature,
        })
    }

    /// Returns the `TreeHeadSignature` content covered by the signature
    /// ([RFC 6962 §3.5](https://datatracker.ietf.org/doc/html/rfc6962#section-3.5)).
    pub fn signed_content(&self) -> Vec<u8> {
        signature_input(self.timestamp, self.tree_size, &self.root_hash)
    }

    /// Returns whether the signature verifies with `key`.
    ///
    /// A well-formed signature that does not verify yields `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns a key-mismatch error if no signature is present.
    pub fn is_valid(&self, key: &KeyHandle) -> Result<bool, CtError> {
        let mut signature = self.signature.clone();
        signature.content = Some(self.signed_content());
        signature.key = Some(key.clone());

        let valid = signature.is_valid()?;
        if !valid {
            log::debug!(
                "tree head signature does not verify: tree_size={} timestamp={}",
                self.tree_size,
                self.timestamp
            );
        }
        Ok(valid)
    }

    /// Returns whether the signature verifies with the DER-encoded key in
    /// `key_der`, either a `SubjectPublicKeyInfo` or a PKCS#8 private key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be imported, or any error from
    /// [`SignedTreeHead::is_valid`].
    pub fn is_valid_with_key_der(&self, key_der: &[u8]) -> Result<bool, CtError> {
        self.is_valid(&KeyHandle::from_der(key_der)?)
    }

    /// Returns the timestamp as a UTC date.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        to_datetime(self.timestamp)
    }
}

/// Serializes the `TreeHeadSignature` struct.
///
/// # Panics
///
/// Panics if writing to the internal buffer fails, which should never happen.
fn signature_input(timestamp: UnixTimestamp, tree_size: u64, root_hash: &[u8; 32]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(2 + 8 + 8 + 32);

    buffer.write_u8(Version::V1.code()).unwrap();
    buffer.write_u8(SignatureType::TreeHash.code()).unwrap();
    buffer.write_u64::<BigEndian>(timestamp).unwrap();
    buffer.write_u64::<BigEndian>(tree_size).unwrap();
    buffer.extend(root_hash);

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use base64::prelude::*;
    use digitally_signed::{DigitallySignedError, PublicKey, SignatureAlgorithm};
    use p256::ecdsa::SigningKey;
    use rand::rngs::OsRng;
    use sha2::{Digest, Sha256};

    const JSON_STH: &str = include_str!("../tests/json_sth");
    const RSA_SIGNED_STH: &str = include_str!("../tests/rsa_signed_sth");

    fn key_der(base64: &str) -> Vec<u8> {
        BASE64_STANDARD.decode(base64.trim()).unwrap()
    }

    fn ec_key() -> KeyHandle {
        KeyHandle::from(PublicKey::from_public_key_der(&key_der(include_str!("../tests/ec_pk"))).unwrap())
    }

    fn rsa_key() -> KeyHandle {
        KeyHandle::from(PublicKey::from_public_key_der(&key_der(include_str!("../tests/rsa_pk"))).unwrap())
    }

    #[test]
    fn test_decode() {
        let sth = SignedTreeHead::from_json(JSON_STH).unwrap();
        assert_eq!(sth.tree_size, 4_967_961);
        assert_eq!(sth.timestamp, 1_432_858_108_748);
        assert_eq!(sth.root_hash, <[u8; 32]>::from(Sha256::digest(b"example root hash")));
        assert_eq!(sth.signature.signature_algorithm, SignatureAlgorithm::Ecdsa);

        let time = sth.time().unwrap();
        assert_eq!(time.timestamp(), 1_432_858_108);
        assert_eq!(time.timestamp_subsec_millis(), 748);
    }

    #[test]
    fn test_signed_content() {
        let sth = SignedTreeHead::from_json(JSON_STH).unwrap();
        let content = sth.signed_content();
        assert_eq!(content.len(), 50);
        assert_eq!(&content[..2], &[0, 1]);
        assert_eq!(&content[2..10], &1_432_858_108_748u64.to_be_bytes());
        assert_eq!(&content[10..18], &4_967_961u64.to_be_bytes());
        assert_eq!(&content[18..], &sth.root_hash);
    }

    #[test]
    fn test_valid_ec() {
        let sth = SignedTreeHead::from_json(JSON_STH).unwrap();
        assert!(sth.is_valid(&ec_key()).unwrap());
        assert!(sth
            .is_valid_with_key_der(&key_der(include_str!("../tests/ec_pk")))
            .unwrap());
    }

    #[test]
    fn test_valid_rsa() {
        let sth = SignedTreeHead::from_json(RSA_SIGNED_STH).unwrap();
        assert_eq!(sth.tree_size, 7_823_441);
        assert_eq!(sth.signature.signature_algorithm, SignatureAlgorithm::Rsa);
        assert!(sth.is_valid(&rsa_key()).unwrap());
        assert!(sth
            .is_valid_with_key_der(&key_der(include_str!("../tests/rsa_pk")))
            .unwrap());
    }

    #[test]
    fn test_valid_with_private_key() {
        let sth = SignedTreeHead::from_json(JSON_STH).unwrap();
        assert!(sth
            .is_valid_with_key_der(include_bytes!("../tests/ec_sk.der"))
            .unwrap());
    }

    #[test]
    fn test_invalid_signature() {
        let mut sth = SignedTreeHead::from_json(JSON_STH).unwrap();
        assert!(!sth.is_valid(&rsa_key()).unwrap());

        sth.tree_size += 1;
        assert!(!sth.is_valid(&ec_key()).unwrap());

        let mut sth = SignedTreeHead::from_json(RSA_SIGNED_STH).unwrap();
        assert!(!sth.is_valid(&ec_key()).unwrap());
        sth.root_hash[0] ^= 1;
        assert!(!sth.is_valid(&rsa_key()).unwrap());
    }

    #[test]
    fn test_garbage_signature_bytes() {
        let mut sth = SignedTreeHead::from_json(JSON_STH).unwrap();
        sth.signature.signature = Some(vec![0x30, 0x02, 0x01]);
        assert!(!sth.is_valid(&ec_key()).unwrap());
    }

    #[test]
    fn test_missing_signature() {
        let mut sth = SignedTreeHead::from_json(JSON_STH).unwrap();
        sth.signature.signature = None;
        let err = sth.is_valid(&ec_key()).unwrap_err();
        assert!(matches!(
            err,
            CtError::DigitallySigned(DigitallySignedError::MissingSignature)
        ));
        assert_eq!(err.kind(), ErrorKind::KeyMismatch);
        assert!(sth.to_json().is_err());
    }

    #[test]
    fn test_unrecognized_key() {
        let sth = SignedTreeHead::from_json(JSON_STH).unwrap();
        let err = sth.is_valid_with_key_der(b"not a key").unwrap_err();
        assert!(matches!(
            err,
            CtError::DigitallySigned(DigitallySignedError::UnrecognizedKeyType)
        ));
        assert_eq!(err.kind(), ErrorKind::UnsupportedValue);
    }

    #[test]
    fn test_round_trip() {
        for json in [JSON_STH, RSA_SIGNED_STH] {
            let sth = SignedTreeHead::from_json(json).unwrap();
            let response: GetSthResponse = serde_json::from_str(json).unwrap();
            assert_eq!(sth.to_response().unwrap(), response);
            assert_eq!(SignedTreeHead::from_json(&sth.to_json().unwrap()).unwrap(), sth);
        }
    }

    #[test]
    fn test_sign_ec() {
        let key = PrivateKey::from(SigningKey::random(&mut OsRng));
        let root_hash = Sha256::digest(b"fresh root").into();
        let sth = SignedTreeHead::sign(10, 1_700_000_000_000, root_hash, &key).unwrap();
        assert_eq!(sth.signature.signature_algorithm, SignatureAlgorithm::Ecdsa);
        assert!(sth.is_valid(&KeyHandle::from(key.public_key())).unwrap());

        let parsed = SignedTreeHead::from_json(&sth.to_json().unwrap()).unwrap();
        assert!(parsed.is_valid(&KeyHandle::from(key)).unwrap());
    }

    #[test]
    fn test_sign_rsa() {
        let key = PrivateKey::from_pkcs8_der(include_bytes!("../tests/rsa_sk.der")).unwrap();
        let sth = SignedTreeHead::from_json(RSA_SIGNED_STH).unwrap();
        let signed = SignedTreeHead::sign(sth.tree_size, sth.timestamp, sth.root_hash, &key).unwrap();
        // PKCS#1 v1.5 signatures are deterministic.
        assert_eq!(signed, sth);
        assert_eq!(signed.to_response().unwrap(), sth.to_response().unwrap());
    }

    #[test]
    fn test_invalid_documents() {
        let cases = [
            ("", ErrorKind::MalformedInput),
            (r#"{"tree_size": 1}"#, ErrorKind::MalformedInput),
            (
                r#"{"tree_size": -1, "timestamp": 0, "sha256_root_hash": "", "tree_head_signature": ""}"#,
                ErrorKind::MalformedInput,
            ),
            (
                r#"{"tree_size": 1, "timestamp": 0, "sha256_root_hash": "AAAA", "tree_head_signature": "BAMAAA=="}"#,
                ErrorKind::MalformedInput,
            ),
            (
                r#"{"tree_size": 1, "timestamp": 0, "sha256_root_hash": "bswM1t0yC38TynW+PE+aadanJ1Z/TRKqVeJCF6PmMxQ=", "tree_head_signature": "AgMAAA=="}"#,
                ErrorKind::UnsupportedValue,
            ),
            (
                r#"{"tree_size": 1, "timestamp": 0, "sha256_root_hash": "bswM1t0yC38TynW+PE+aadanJ1Z/TRKqVeJCF6PmMxQ=", "tree_head_signature": "BAMAAQ=="}"#,
                ErrorKind::MalformedInput,
            ),
        ];
        for (json, kind) in cases {
            assert_eq!(SignedTreeHead::from_json(json).unwrap_err().kind(), kind, "{json}");
        }

        assert!(matches!(
            SignedTreeHead::from_json(
                r#"{"tree_size": 1, "timestamp": 0, "sha256_root_hash": "AAAA", "tree_head_signature": "BAMAAA=="}"#
            ),
            Err(CtError::InvalidRootHash(3))
        ));
    }
}
