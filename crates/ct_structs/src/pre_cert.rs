// Copyright (c) 2025 Cloudflare, Inc.
// Licensed under the BSD-3-Clause license found in the LICENSE file or at https://opensource.org/licenses/BSD-3-Clause

use crate::CtError;
use length_prefixed::{ReadLengthPrefixedBytesExt, WriteLengthPrefixedBytesExt, MAX_OPAQUE_24};
use std::io::{Read, Write};
use x509_cert::Certificate;

/// The `PreCert` signed entry of
/// [RFC 6962 §3.2](https://datatracker.ietf.org/doc/html/rfc6962#section-3.2).
///
/// ```text
/// struct {
///     opaque issuer_key_hash[32];
///     TBSCertificate tbs_certificate;
/// } PreCert;
/// ```
///
/// The `TBSCertificate` is carried as `opaque<1..2^24-1>`, so the structure
/// describes its own length. Inside a `TimestampedEntry` it is not wrapped in
/// any further length prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreCert {
    pub issuer_key_hash: [u8; 32],
    pub tbs_certificate: Vec<u8>,
}

impl PreCert {
    pub fn new(issuer_key_hash: [u8; 32], tbs_certificate: Vec<u8>) -> Self {
        Self {
            issuer_key_hash,
            tbs_certificate,
        }
    }

    /// Returns a `PreCert` for a DER-encoded `TBSCertificate` issued by `issuer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the issuer's public key cannot be DER-encoded.
    pub fn from_issuer(issuer: &Certificate, tbs_certificate: Vec<u8>) -> Result<Self, CtError> {
        Ok(Self::new(x509_util::issuer_key_hash(issuer)?, tbs_certificate))
    }

    /// Returns the `PreCert` that a log records for `precert`, a
    /// poisoned precertificate issued by `issuer`.
    ///
    /// # Errors
    ///
    /// Returns an error if `precert` lacks a valid poison extension.
    pub fn from_precertificate(precert: &Certificate, issuer: &Certificate) -> Result<Self, CtError> {
        Self::from_issuer(issuer, x509_util::precert_tbs(precert)?)
    }

    /// Decodes a `PreCert` that must occupy the whole of `blob`.
    ///
    /// # Errors
    ///
    /// Returns [`CtError::TrailingData`] if bytes follow the `TBSCertificate`,
    /// [`CtError::EmptyTbsCertificate`] if it has length zero, and a
    /// malformed-input error if `blob` is truncated or the declared length is
    /// out of bounds.
    pub fn from_bytes(blob: &[u8]) -> Result<Self, CtError> {
        let mut s = blob;
        let pre_cert = Self::read_from(&mut s)?;
        if !s.is_empty() {
            return Err(CtError::TrailingData);
        }

        Ok(pre_cert)
    }

    /// Reads the hash and the self-delimited `TBSCertificate`, leaving the
    /// reader positioned at the first byte after them.
    pub(crate) fn read_from<R: Read>(reader: &mut R) -> Result<Self, CtError> {
        let issuer_key_hash = reader.read_array::<32>()?;
        let tbs_certificate = reader.read_length_prefixed(MAX_OPAQUE_24)?;
        if tbs_certificate.is_empty() {
            return Err(CtError::EmptyTbsCertificate);
        }

        Ok(Self {
            issuer_key_hash,
            tbs_certificate,
        })
    }

    /// Returns the encoded structure.
    ///
    /// # Errors
    ///
    /// Returns [`CtError::IncompleteStructure`] if the `TBSCertificate` is
    /// empty, or a length error if it is longer than 2^24-1 bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CtError> {
        let mut buffer = Vec::with_capacity(32 + 3 + self.tbs_certificate.len());
        self.write_to(&mut buffer)?;
        Ok(buffer)
    }

    pub(crate) fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), CtError> {
        if self.tbs_certificate.is_empty() {
            return Err(CtError::IncompleteStructure("tbs_certificate"));
        }
        writer.write_all(&self.issuer_key_hash)?;
        writer.write_length_prefixed(&self.tbs_certificate, MAX_OPAQUE_24)?;
        Ok(())
    }
}
