// Copyright (c) 2025 Cloudflare, Inc.
// Licensed under the BSD-3-Clause license found in the LICENSE file or at https://opensource.org/licenses/BSD-3-Clause

use crate::{to_datetime, CtError, LogEntryType, PreCert, UnixTimestamp};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use length_prefixed::{ReadLengthPrefixedBytesExt, WriteLengthPrefixedBytesExt, MAX_OPAQUE_16, MAX_OPAQUE_24};
use x509_util::DerCertificate;

/// The entry a log signs over: either a certificate or a precertificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignedEntry {
    X509(DerCertificate),
    PreCert(PreCert),
}

impl SignedEntry {
    pub fn entry_type(&self) -> LogEntryType {
        match self {
            Self::X509(_) => LogEntryType::X509Entry,
            Self::PreCert(_) => LogEntryType::PrecertEntry,
        }
    }
}

/// A `TimestampedEntry` from
/// [RFC 6962 §3.4](https://datatracker.ietf.org/doc/html/rfc6962#section-3.4).
///
/// ```text
/// struct {
///     uint64 timestamp;
///     LogEntryType entry_type;
///     select(entry_type) {
///         case x509_entry: ASN.1Cert;
///         case precert_entry: PreCert;
///     } signed_entry;
///     CtExtensions extensions;
/// } TimestampedEntry;
/// ```
///
/// No extensions are defined, so `extensions` is always encoded empty and
/// rejected on decode when it is not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimestampedEntry {
    pub timestamp: UnixTimestamp,
    signed_entry: Option<SignedEntry>,
}

impl TimestampedEntry {
    pub fn new_x509(timestamp: UnixTimestamp, certificate: DerCertificate) -> Self {
        Self {
            timestamp,
            signed_entry: Some(SignedEntry::X509(certificate)),
        }
    }

    pub fn new_precert(timestamp: UnixTimestamp, pre_cert: PreCert) -> Self {
        Self {
            timestamp,
            signed_entry: Some(SignedEntry::PreCert(pre_cert)),
        }
    }

    /// Returns the type of the entry, or `None` if no entry is set.
    pub fn entry_type(&self) -> Option<LogEntryType> {
        self.signed_entry.as_ref().map(SignedEntry::entry_type)
    }

    pub fn signed_entry(&self) -> Option<&SignedEntry> {
        self.signed_entry.as_ref()
    }

    pub fn x509_entry(&self) -> Option<&DerCertificate> {
        match &self.signed_entry {
            Some(SignedEntry::X509(certificate)) => Some(certificate),
            _ => None,
        }
    }

    pub fn precert_entry(&self) -> Option<&PreCert> {
        match &self.signed_entry {
            Some(SignedEntry::PreCert(pre_cert)) => Some(pre_cert),
            _ => None,
        }
    }

    /// Sets the entry to a certificate, replacing any precertificate.
    pub fn set_x509_entry(&mut self, certificate: DerCertificate) {
        self.signed_entry = Some(SignedEntry::X509(certificate));
    }

    /// Sets the entry to a precertificate, replacing any certificate.
    pub fn set_precert_entry(&mut self, pre_cert: PreCert) {
        self.signed_entry = Some(SignedEntry::PreCert(pre_cert));
    }

    /// Returns the timestamp as a UTC date.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        to_datetime(self.timestamp)
    }

    /// Decodes a `TimestampedEntry` that must occupy the whole of `blob`.
    ///
    /// A precertificate entry has no outer length. The end of the signed entry
    /// is only known after reading the length of its `TBSCertificate`.
    ///
    /// # Errors
    ///
    /// Returns [`CtError::UnknownEntryType`] for entry types other than
    /// `x509_entry` and `precert_entry`,
    /// [`CtError::NonEmptyExtensionsUnsupported`] if extensions are present,
    /// [`CtError::TrailingData`] if bytes follow the extensions, and a
    /// malformed-input error for truncated input or an invalid certificate.
    pub fn from_bytes(blob: &[u8]) -> Result<Self, CtError> {
        let mut s = blob;
        let timestamp = s.read_u64::<BigEndian>()?;
        let entry_type = s.read_u16::<BigEndian>()?;
        let signed_entry = match LogEntryType::from_code(entry_type) {
            Some(LogEntryType::X509Entry) => {
                let der = s.read_length_prefixed(MAX_OPAQUE_24)?;
                SignedEntry::X509(DerCertificate::from_der(der)?)
            }
            Some(LogEntryType::PrecertEntry) => SignedEntry::PreCert(PreCert::read_from(&mut s)?),
            None => return Err(CtError::UnknownEntryType(entry_type)),
        };
        let extensions = s.read_length_prefixed(MAX_OPAQUE_16)?;
        if !extensions.is_empty() {
            return Err(CtError::NonEmptyExtensionsUnsupported);
        }
        if !s.is_empty() {
            return Err(CtError::TrailingData);
        }

        Ok(Self {
            timestamp,
            signed_entry: Some(signed_entry),
        })
    }

    /// Returns the encoded structure. A certificate entry is written with the
    /// bytes it was decoded from.
    ///
    /// # Errors
    ///
    /// Returns [`CtError::StructureIncomplete`] if no entry is set, or an
    /// error if the entry cannot be encoded.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CtError> {
        let signed_entry = self
            .signed_entry
            .as_ref()
            .ok_or(CtError::StructureIncomplete)?;

        let mut buffer = Vec::new();
        buffer.write_u64::<BigEndian>(self.timestamp)?;
        buffer.write_u16::<BigEndian>(signed_entry.entry_type().code())?;
        match signed_entry {
            SignedEntry::X509(certificate) => {
                buffer.write_length_prefixed(certificate.as_der(), MAX_OPAQUE_24)?;
            }
            SignedEntry::PreCert(pre_cert) => pre_cert.write_to(&mut buffer)?,
        }
        buffer.write_length_prefixed(&[], MAX_OPAQUE_16)?;

        Ok(buffer)
    }
}
