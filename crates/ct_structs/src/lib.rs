// Copyright (c) 2025 Cloudflare, Inc.
// Licensed under the BSD-3-Clause license found in the LICENSE file or at https://opensource.org/licenses/BSD-3-Clause

//! Binary and JSON structures from
//! [RFC 6962](https://datatracker.ietf.org/doc/html/rfc6962): Merkle tree
//! leaves, timestamped entries, precertificates, certificate chains, log
//! entries as served by `get-entries`, and signed tree heads as served by
//! `get-sth`.
//!
//! # Examples
//!
//! ## Verifying a signed tree head
//!
//! ```
//! use ct_structs::{LogDescriptor, SignedTreeHead};
//!
//! let log = LogDescriptor::from_json(r#"{
//!   "description": "Example Test Log",
//!   "key": "MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEkaD0uGbXXjbrodMkk6qp4QIPteuC9ir8fPVcuMrpb+X9hjMGpPUyzjLX/UEZwX8IWPuSwL+ah/VLGMrbKtciHQ=="
//! }"#).unwrap();
//!
//! let sth = SignedTreeHead::from_json(r#"{
//!   "tree_size": 4967961,
//!   "timestamp": 1432858108748,
//!   "sha256_root_hash": "cErHIyanSjjj7ErClcuemFpJkHGlOHex3xnsaDjBnE4=",
//!   "tree_head_signature": "BAMARzBFAiEA6Rp0hysRT7tEOaGKdaLO+DzwjOHST7VZVpnZMElPn1sCIEUawGsLiu9ZiB3EjfeQHHCDhG/Grjl9sUC89gdqv/p3"
//! }"#).unwrap();
//!
//! assert!(log.verify_tree_head(&sth).unwrap());
//! ```

pub mod certificate_chain;
pub mod codes;
pub mod log_descriptor;
pub mod log_entry;
pub mod merkle_tree_leaf;
pub mod pre_cert;
pub mod signed_tree_head;
pub mod timestamped_entry;

pub use certificate_chain::*;
pub use codes::*;
pub use digitally_signed::ErrorKind;
pub use log_descriptor::*;
pub use log_entry::*;
pub use merkle_tree_leaf::*;
pub use pre_cert::*;
pub use signed_tree_head::*;
pub use timestamped_entry::*;
pub use x509_util::DerCertificate;

use digitally_signed::DigitallySignedError;
use length_prefixed::LengthPrefixedError;
use x509_util::X509Error;

/// Unix timestamp, measured since the epoch (January 1, 1970, 00:00),
/// ignoring leap seconds, in milliseconds.
/// This can be unsigned as we never deal with negative timestamps.
pub type UnixTimestamp = u64;

/// Converts a [`UnixTimestamp`] into a UTC date, or `None` if it is out of
/// range for [`chrono`].
pub(crate) fn to_datetime(timestamp: UnixTimestamp) -> Option<chrono::DateTime<chrono::Utc>> {
    i64::try_from(timestamp)
        .ok()
        .and_then(chrono::DateTime::from_timestamp_millis)
}

#[derive(thiserror::Error, Debug)]
pub enum CtError {
    #[error(transparent)]
    LengthPrefixed(#[from] LengthPrefixedError),
    #[error(transparent)]
    DigitallySigned(#[from] DigitallySignedError),
    #[error(transparent)]
    Der(#[from] der::Error),
    #[error(transparent)]
    X509(#[from] X509Error),
    #[error(transparent)]
    InvalidJson(#[from] serde_json::Error),
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),

    #[error("trailing data")]
    TrailingData,
    #[error("empty TBSCertificate")]
    EmptyTbsCertificate,
    #[error("root hash has invalid length: {0} (expected 32)")]
    InvalidRootHash(usize),
    #[error("unknown entry type {0}")]
    UnknownEntryType(u16),
    #[error("unsupported leaf type {0}")]
    UnsupportedLeafType(u8),
    #[error("non-empty extensions are not supported")]
    NonEmptyExtensionsUnsupported,
    #[error("invalid {name} value: {value}")]
    InvalidEnumValue { name: &'static str, value: String },
    #[error("{0} must be set before encoding")]
    IncompleteStructure(&'static str),
    #[error("timestamped entry is not set")]
    TimestampedEntryUnset,
    #[error("neither an X.509 entry nor a precertificate entry is set")]
    StructureIncomplete,
    #[error("precertificate entry without a precertificate")]
    MissingPrecertificate,
    #[error("precertificate supplied for an X.509 entry")]
    UnexpectedPrecertificate,
}

impl From<std::io::Error> for CtError {
    fn from(e: std::io::Error) -> Self {
        Self::LengthPrefixed(e.into())
    }
}

impl CtError {
    /// Returns the class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DigitallySigned(e) => e.kind(),
            Self::LengthPrefixed(_)
            | Self::Der(_)
            | Self::X509(_)
            | Self::InvalidJson(_)
            | Self::Base64(_)
            | Self::TrailingData
            | Self::EmptyTbsCertificate
            | Self::InvalidRootHash(_) => ErrorKind::MalformedInput,
            Self::UnknownEntryType(_)
            | Self::UnsupportedLeafType(_)
            | Self::NonEmptyExtensionsUnsupported
            | Self::InvalidEnumValue { .. } => ErrorKind::UnsupportedValue,
            Self::IncompleteStructure(_)
            | Self::TimestampedEntryUnset
            | Self::StructureIncomplete
            | Self::MissingPrecertificate
            | Self::UnexpectedPrecertificate => ErrorKind::IncompleteStructure,
        }
    }
}
