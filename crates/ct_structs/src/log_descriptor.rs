// Copyright (c) 2025 Cloudflare, Inc.
// Licensed under the BSD-3-Clause license found in the LICENSE file or at https://opensource.org/licenses/BSD-3-Clause

//! Descriptions of known logs, in the field naming used by public CT log
//! lists.

use crate::{CtError, SignedTreeHead};
use base64::prelude::*;
use digitally_signed::{KeyHandle, PublicKey};
use serde::Deserialize;
use sha2::{Digest, Sha256};

/// A log's public key and metadata.
#[derive(Debug, Clone)]
pub struct LogDescriptor {
    pub description: Option<String>,
    pub url: Option<String>,
    /// Maximum merge delay, in seconds.
    pub mmd: Option<u64>,
    key: KeyHandle,
    log_id: [u8; 32],
}

impl LogDescriptor {
    /// Returns a descriptor for the log whose key is `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be DER-encoded.
    pub fn new(description: Option<String>, key: PublicKey) -> Result<Self, CtError> {
        let log_id = Sha256::digest(key.to_public_key_der()?).into();
        Ok(Self {
            description,
            url: None,
            mmd: None,
            key: KeyHandle::from(key),
            log_id,
        })
    }

    /// Parses a log description such as
    /// `{"description": "...", "key": "<base64 SPKI>", "url": "...", "mmd": 86400}`.
    /// Only `key` is required.
    ///
    /// # Errors
    ///
    /// Returns [`CtError::InvalidJson`] if the document does not parse,
    /// [`CtError::Base64`] if the key is not base64, or a key import error.
    pub fn from_json(json: &str) -> Result<Self, CtError> {
        let raw: RawLogDescriptor = serde_json::from_str(json)?;
        let key_der = BASE64_STANDARD.decode(&raw.key)?;
        let key = PublicKey::from_public_key_der(&key_der)?;

        log::debug!(
            "loaded log '{}'",
            raw.description.as_deref().unwrap_or_default()
        );

        Ok(Self {
            description: raw.description,
            url: raw.url,
            mmd: raw.mmd,
            key: KeyHandle::from(key),
            log_id: Sha256::digest(&key_der).into(),
        })
    }

    pub fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }

    /// Returns the log ID, the SHA-256 hash of the log's DER-encoded
    /// `SubjectPublicKeyInfo` ([RFC 6962 §3.2](https://datatracker.ietf.org/doc/html/rfc6962#section-3.2)).
    pub fn log_id(&self) -> [u8; 32] {
        self.log_id
    }

    /// Returns whether `sth` carries a valid signature from this log.
    ///
    /// # Errors
    ///
    /// Returns any error from [`SignedTreeHead::is_valid`].
    pub fn verify_tree_head(&self, sth: &SignedTreeHead) -> Result<bool, CtError> {
        sth.is_valid(&self.key)
    }
}

#[derive(Debug, Deserialize)]
struct RawLogDescriptor {
    description: Option<String>,
    key: String,
    url: Option<String>,
    mmd: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use digitally_signed::{DigitallySignedError, SignatureAlgorithm};

    const LOG_JSON: &str = include_str!("../tests/log.json");

    #[test]
    fn test_from_json() {
        let log = LogDescriptor::from_json(LOG_JSON).unwrap();
        assert_eq!(log.description.as_deref(), Some("Example Test Log"));
        assert_eq!(log.url.as_deref(), Some("https://ct.example.com/logs/test/"));
        assert_eq!(log.mmd, Some(86400));
        assert_eq!(log.public_key().signature_algorithm(), SignatureAlgorithm::Ecdsa);
        assert_eq!(
            hex::encode(log.log_id()),
            "24a8aefa299cb970c6506d994df8272817b8cace30f5b1351f04c38eea2f57f3"
        );
    }

    #[test]
    fn test_key_only() {
        let json = format!(r#"{{"key": "{}"}}"#, include_str!("../tests/rsa_pk").trim());
        let log = LogDescriptor::from_json(&json).unwrap();
        assert!(log.description.is_none());
        assert!(log.url.is_none());
        assert!(log.mmd.is_none());
        assert_eq!(log.public_key().signature_algorithm(), SignatureAlgorithm::Rsa);
    }

    #[test]
    fn test_new_matches_from_json() {
        let log = LogDescriptor::from_json(LOG_JSON).unwrap();
        let built = LogDescriptor::new(Some("Example Test Log".into()), log.public_key()).unwrap();
        assert_eq!(built.log_id(), log.log_id());
    }

    #[test]
    fn test_verify_tree_head() {
        let log = LogDescriptor::from_json(LOG_JSON).unwrap();
        let sth = SignedTreeHead::from_json(include_str!("../tests/json_sth")).unwrap();
        assert!(log.verify_tree_head(&sth).unwrap());

        let rsa_sth = SignedTreeHead::from_json(include_str!("../tests/rsa_signed_sth")).unwrap();
        assert!(!log.verify_tree_head(&rsa_sth).unwrap());
    }

    #[test]
    fn test_invalid() {
        let err = LogDescriptor::from_json(r#"{"description": "no key"}"#).unwrap_err();
        assert!(matches!(err, CtError::InvalidJson(_)));

        let err = LogDescriptor::from_json(r#"{"key": "not base64!"}"#).unwrap_err();
        assert!(matches!(err, CtError::Base64(_)));
        assert_eq!(err.kind(), ErrorKind::MalformedInput);

        let err = LogDescriptor::from_json(r#"{"key": "AAAA"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);

        // An Ed25519 key.
        let err = LogDescriptor::from_json(
            r#"{"key": "MCowBQYDK2VwAyEARN4KXLGKQrfUUGU1zwbFvEN1AckVY76d4CnuNRc20vI="}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CtError::DigitallySigned(DigitallySignedError::UnrecognizedKeyType)
        ));
    }
}
