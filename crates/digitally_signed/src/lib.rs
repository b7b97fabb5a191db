// Copyright (c) 2025 Cloudflare, Inc.
// Licensed under the BSD-3-Clause license found in the LICENSE file or at https://opensource.org/licenses/BSD-3-Clause

//! The TLS `DigitallySigned` structure from
//! [RFC 5246 §4.7](https://datatracker.ietf.org/doc/html/rfc5246#section-4.7),
//! restricted to the profile used by
//! [RFC 6962](https://datatracker.ietf.org/doc/html/rfc6962#section-2.1.4):
//! SHA-256 as the only hash algorithm, and either ECDSA over NIST P-256 or
//! RSA (at least 2048 bits, PKCS#1 v1.5) as the signature algorithm.
//!
//! ```text
//! struct {
//!     SignatureAndHashAlgorithm algorithm;
//!     opaque signature<0..2^16-1>;
//! } DigitallySigned;
//! ```
//!
//! The signed content and the key are supplied by the caller and are never
//! part of the wire encoding.
//!
//! # Example
//!
//! ```
//! use digitally_signed::{DigitallySigned, KeyHandle, PrivateKey};
//! use p256::ecdsa::SigningKey;
//! use rand::rngs::OsRng;
//!
//! let key = KeyHandle::from(PrivateKey::Ecdsa(SigningKey::random(&mut OsRng)));
//! let mut ds = DigitallySigned::for_key(key.clone(), b"content".to_vec());
//! let blob = ds.to_bytes().unwrap();
//!
//! let mut parsed = DigitallySigned::from_bytes(&blob).unwrap();
//! parsed.content = Some(b"content".to_vec());
//! parsed.key = Some(KeyHandle::from(key.public_key()));
//! assert!(parsed.is_valid().unwrap());
//! ```

pub mod key;
pub mod signed;

pub use key::*;
pub use signed::*;

use length_prefixed::LengthPrefixedError;

/// Broad classes of failure shared by the RFC 6962 codec crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Truncated buffers, over-long declared lengths, trailing bytes or
    /// unparseable documents.
    MalformedInput,
    /// Well-formed input carrying a value this implementation does not support.
    UnsupportedValue,
    /// Encoding was attempted before all mandatory fields were set.
    IncompleteStructure,
    /// Signing or verification was attempted without suitable key material,
    /// signature or content.
    KeyMismatch,
}

#[derive(thiserror::Error, Debug)]
pub enum DigitallySignedError {
    #[error(transparent)]
    LengthPrefixed(#[from] LengthPrefixedError),
    #[error("unsupported hash algorithm {0}")]
    UnsupportedHashAlgorithm(u8),
    #[error("unsupported signature algorithm {0}")]
    UnsupportedSignatureAlgorithm(u8),
    #[error("trailing data")]
    TrailingData,
    #[error("unrecognized key type")]
    UnrecognizedKeyType,
    #[error("RSA key of {bits} bits is too small")]
    WeakRsaKey { bits: usize },
    #[error(transparent)]
    Der(#[from] der::Error),
    #[error(transparent)]
    Spki(#[from] spki::Error),
    #[error(transparent)]
    Pkcs8(#[from] pkcs8::Error),
    #[error(transparent)]
    Signature(#[from] signature::Error),
    #[error("must have a private key in order to make a signature")]
    SigningRequiresPrivateKey,
    #[error("no key has been supplied")]
    MissingKey,
    #[error("no signature is available")]
    MissingSignature,
    #[error("no content has been supplied")]
    MissingContent,
}

impl From<std::io::Error> for DigitallySignedError {
    fn from(e: std::io::Error) -> Self {
        Self::LengthPrefixed(e.into())
    }
}

impl DigitallySignedError {
    /// Returns the class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LengthPrefixed(_) | Self::TrailingData | Self::Der(_) | Self::Spki(_) | Self::Pkcs8(_) => {
                ErrorKind::MalformedInput
            }
            Self::UnsupportedHashAlgorithm(_)
            | Self::UnsupportedSignatureAlgorithm(_)
            | Self::UnrecognizedKeyType
            | Self::WeakRsaKey { .. } => ErrorKind::UnsupportedValue,
            Self::Signature(_)
            | Self::SigningRequiresPrivateKey
            | Self::MissingKey
            | Self::MissingSignature
            | Self::MissingContent => ErrorKind::KeyMismatch,
        }
    }
}
