// Copyright (c) 2025 Cloudflare, Inc.
// Licensed under the BSD-3-Clause license found in the LICENSE file or at https://opensource.org/licenses/BSD-3-Clause

use crate::{DigitallySignedError, KeyHandle};
use byteorder::ReadBytesExt;
use length_prefixed::{ReadLengthPrefixedBytesExt, WriteLengthPrefixedBytesExt, MAX_OPAQUE_16};

/// `HashAlgorithm` from RFC 5246 §7.4.1.4.1. SHA-256 is the only value
/// accepted by RFC 6962.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha256,
}

impl HashAlgorithm {
    /// Returns the wire code of this algorithm.
    pub fn code(self) -> u8 {
        match self {
            Self::Sha256 => 4,
        }
    }
}

impl TryFrom<u8> for HashAlgorithm {
    type Error = DigitallySignedError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            4 => Ok(Self::Sha256),
            _ => Err(DigitallySignedError::UnsupportedHashAlgorithm(code)),
        }
    }
}

/// `SignatureAlgorithm` from RFC 5246 §7.4.1.4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Anonymous,
    Rsa,
    Dsa,
    Ecdsa,
}

impl SignatureAlgorithm {
    /// Returns the wire code of this algorithm.
    pub fn code(self) -> u8 {
        match self {
            Self::Anonymous => 0,
            Self::Rsa => 1,
            Self::Dsa => 2,
            Self::Ecdsa => 3,
        }
    }
}

impl TryFrom<u8> for SignatureAlgorithm {
    type Error = DigitallySignedError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Anonymous),
            1 => Ok(Self::Rsa),
            2 => Ok(Self::Dsa),
            3 => Ok(Self::Ecdsa),
            _ => Err(DigitallySignedError::UnsupportedSignatureAlgorithm(code)),
        }
    }
}

/// A `DigitallySigned` struct, together with the content and key it is
/// signed with or verified against.
///
/// Equality compares the wire fields only.
#[derive(Clone, Debug)]
pub struct DigitallySigned {
    pub hash_algorithm: HashAlgorithm,
    pub signature_algorithm: SignatureAlgorithm,
    pub signature: Option<Vec<u8>>,
    /// The content covered by the signature. Not serialized.
    pub content: Option<Vec<u8>>,
    /// The key used to sign or verify. Not serialized.
    pub key: Option<KeyHandle>,
}

impl PartialEq for DigitallySigned {
    fn eq(&self, other: &Self) -> bool {
        self.hash_algorithm == other.hash_algorithm
            && self.signature_algorithm == other.signature_algorithm
            && self.signature == other.signature
    }
}

impl DigitallySigned {
    /// Returns an unsigned structure for the given signature algorithm.
    pub fn new(signature_algorithm: SignatureAlgorithm) -> Self {
        Self {
            hash_algorithm: HashAlgorithm::Sha256,
            signature_algorithm,
            signature: None,
            content: None,
            key: None,
        }
    }

    /// Returns an unsigned structure ready to sign `content` with `key`. The
    /// signature algorithm follows the key type.
    pub fn for_key(key: KeyHandle, content: Vec<u8>) -> Self {
        Self {
            hash_algorithm: HashAlgorithm::Sha256,
            signature_algorithm: key.signature_algorithm(),
            signature: None,
            content: Some(content),
            key: Some(key),
        }
    }

    /// Decodes a `DigitallySigned` struct. The whole of `blob` must be consumed.
    ///
    /// # Errors
    ///
    /// Returns [`DigitallySignedError::UnsupportedHashAlgorithm`] unless the
    /// hash algorithm is SHA-256,
    /// [`DigitallySignedError::UnsupportedSignatureAlgorithm`] for codes
    /// outside RFC 5246, and a malformed-input error for truncated or
    /// over-long input.
    pub fn from_bytes(blob: &[u8]) -> Result<Self, DigitallySignedError> {
        let mut s = blob;
        let hash_algorithm = HashAlgorithm::try_from(s.read_u8()?)?;
        let signature_algorithm = SignatureAlgorithm::try_from(s.read_u8()?)?;
        let signature = s.read_length_prefixed(MAX_OPAQUE_16)?;
        if !s.is_empty() {
            return Err(DigitallySignedError::TrailingData);
        }

        Ok(Self {
            hash_algorithm,
            signature_algorithm,
            signature: Some(signature),
            content: None,
            key: None,
        })
    }

    /// Computes the signature over `content` with `key`, unless one is
    /// already present, and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`DigitallySignedError::MissingKey`] or
    /// [`DigitallySignedError::MissingContent`] if either is unset, and
    /// [`DigitallySignedError::SigningRequiresPrivateKey`] if the key is a
    /// public key.
    pub fn sign(&mut self) -> Result<&[u8], DigitallySignedError> {
        if self.signature.is_none() {
            let key = self.key.as_ref().ok_or(DigitallySignedError::MissingKey)?;
            let content = self
                .content
                .as_ref()
                .ok_or(DigitallySignedError::MissingContent)?;
            log::debug!(
                "computing {:?} signature over {} bytes",
                self.signature_algorithm,
                content.len()
            );
            self.signature = Some(key.sign(content)?);
        }
        Ok(self.signature.as_deref().unwrap_or_default())
    }

    /// Returns the encoded structure, signing it first if no signature is
    /// present yet.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`DigitallySigned::sign`], or
    /// [`length_prefixed::LengthPrefixedError::PayloadExceedsBound`] if the
    /// signature is longer than 2^16-1 bytes.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, DigitallySignedError> {
        self.sign()?;
        self.signed_bytes()
    }

    /// Returns the encoding of a structure that already carries a signature.
    ///
    /// # Errors
    ///
    /// Returns [`DigitallySignedError::MissingSignature`] if no signature is present.
    pub fn signed_bytes(&self) -> Result<Vec<u8>, DigitallySignedError> {
        let signature = self
            .signature
            .as_ref()
            .ok_or(DigitallySignedError::MissingSignature)?;
        let mut buffer = vec![self.hash_algorithm.code(), self.signature_algorithm.code()];
        buffer.write_length_prefixed(signature, MAX_OPAQUE_16)?;

        Ok(buffer)
    }

    /// Returns whether the signature verifies over `content` with `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DigitallySignedError::MissingKey`],
    /// [`DigitallySignedError::MissingSignature`] or
    /// [`DigitallySignedError::MissingContent`] if the corresponding field is unset.
    pub fn is_valid(&self) -> Result<bool, DigitallySignedError> {
        let key = self.key.as_ref().ok_or(DigitallySignedError::MissingKey)?;
        let signature = self
            .signature
            .as_ref()
            .ok_or(DigitallySignedError::MissingSignature)?;
        let content = self
            .content
            .as_ref()
            .ok_or(DigitallySignedError::MissingContent)?;

        Ok(key.verify(content, signature))
    }
}
