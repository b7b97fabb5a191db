// Copyright (c) 2025 Cloudflare, Inc.
// Licensed under the BSD-3-Clause license found in the LICENSE file or at https://opensource.org/licenses/BSD-3-Clause

//! Log entries as returned by the
//! [`get-entries`](https://datatracker.ietf.org/doc/html/rfc6962#section-4.6)
//! endpoint.

use crate::{CertificateChain, CtError, LogEntryType, MerkleTreeLeaf};
use length_prefixed::{ReadLengthPrefixedBytesExt, WriteLengthPrefixedBytesExt, MAX_OPAQUE_24};
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};
use x509_util::DerCertificate;

/// A single element of a `get-entries` response.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetEntriesItem {
    #[serde_as(as = "Base64")]
    pub leaf_input: Vec<u8>,
    #[serde_as(as = "Base64")]
    pub extra_data: Vec<u8>,
}

/// A `get-entries` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetEntriesResponse {
    pub entries: Vec<GetEntriesItem>,
}

/// A decoded log entry: the Merkle tree leaf, plus the precertificate and
/// chain that the log returns alongside it.
///
/// The precertificate is present exactly when the leaf holds a precertificate
/// entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    leaf_input: MerkleTreeLeaf,
    precertificate: Option<DerCertificate>,
    certificate_chain: CertificateChain,
}

impl LogEntry {
    /// Returns a new log entry.
    ///
    /// # Errors
    ///
    /// Returns [`CtError::TimestampedEntryUnset`] if the leaf has no entry,
    /// [`CtError::MissingPrecertificate`] if the leaf holds a precertificate
    /// entry but no precertificate is given, and
    /// [`CtError::UnexpectedPrecertificate`] if the leaf holds a certificate
    /// entry and a precertificate is given.
    pub fn new(
        leaf_input: MerkleTreeLeaf,
        precertificate: Option<DerCertificate>,
        certificate_chain: CertificateChain,
    ) -> Result<Self, CtError> {
        let entry_type = leaf_input
            .timestamped_entry()
            .and_then(|entry| entry.entry_type())
            .ok_or(CtError::TimestampedEntryUnset)?;
        match (entry_type, &precertificate) {
            (LogEntryType::PrecertEntry, None) => return Err(CtError::MissingPrecertificate),
            (LogEntryType::X509Entry, Some(_)) => return Err(CtError::UnexpectedPrecertificate),
            _ => {}
        }

        Ok(Self {
            leaf_input,
            precertificate,
            certificate_chain,
        })
    }

    pub fn leaf_input(&self) -> &MerkleTreeLeaf {
        &self.leaf_input
    }

    pub fn precertificate(&self) -> Option<&DerCertificate> {
        self.precertificate.as_ref()
    }

    pub fn certificate_chain(&self) -> &CertificateChain {
        &self.certificate_chain
    }

    /// Decodes a log entry from its `leaf_input` and `extra_data` fields.
    ///
    /// For precertificate entries, `extra_data` starts with the
    /// precertificate as `opaque<1..2^24-1>`; the rest is the chain.
    ///
    /// # Errors
    ///
    /// Returns any error from [`MerkleTreeLeaf::from_bytes`] or
    /// [`CertificateChain::from_bytes`], or a malformed-input error if the
    /// precertificate is truncated or does not parse.
    pub fn from_item(item: &GetEntriesItem) -> Result<Self, CtError> {
        let leaf_input = MerkleTreeLeaf::from_bytes(&item.leaf_input)?;
        let entry_type = leaf_input
            .timestamped_entry()
            .and_then(|entry| entry.entry_type())
            .ok_or(CtError::TimestampedEntryUnset)?;

        let mut s = item.extra_data.as_slice();
        let precertificate = match entry_type {
            LogEntryType::PrecertEntry => {
                let der = s.read_length_prefixed(MAX_OPAQUE_24)?;
                Some(DerCertificate::from_der(der)?)
            }
            LogEntryType::X509Entry => None,
        };
        let certificate_chain = CertificateChain::from_bytes(s)?;

        Self::new(leaf_input, precertificate, certificate_chain)
    }

    /// Returns the `leaf_input` and `extra_data` fields for this entry.
    ///
    /// # Errors
    ///
    /// Returns an error if any component cannot be encoded.
    pub fn to_item(&self) -> Result<GetEntriesItem, CtError> {
        let mut extra_data = Vec::new();
        if let Some(precertificate) = &self.precertificate {
            extra_data.write_length_prefixed(precertificate.as_der(), MAX_OPAQUE_24)?;
        }
        extra_data.extend(self.certificate_chain.to_bytes()?);

        Ok(GetEntriesItem {
            leaf_input: self.leaf_input.to_bytes()?,
            extra_data,
        })
    }

    /// Parses a single `get-entries` element.
    ///
    /// # Errors
    ///
    /// Returns [`CtError::InvalidJson`] if the text is not a JSON object with
    /// base64 `leaf_input` and `extra_data` fields, or any error from
    /// [`LogEntry::from_item`].
    pub fn from_json(json: &str) -> Result<Self, CtError> {
        Self::from_item(&serde_json::from_str(json)?)
    }

    /// Serializes this entry as a `get-entries` element.
    ///
    /// # Errors
    ///
    /// Returns an error if any component cannot be encoded.
    pub fn to_json(&self) -> Result<String, CtError> {
        Ok(serde_json::to_string(&self.to_item()?)?)
    }

    /// Parses a whole `get-entries` response, failing on the first entry that
    /// does not decode.
    ///
    /// # Errors
    ///
    /// Returns [`CtError::InvalidJson`] if the document does not parse, or the
    /// error of the first entry that fails to decode.
    pub fn from_get_entries_json(json: &str) -> Result<Vec<Self>, CtError> {
        let response: GetEntriesResponse = serde_json::from_str(json)?;
        response
            .entries
            .iter()
            .enumerate()
            .map(|(i, item)| {
                log::trace!("decoding get-entries element {i}");
                Self::from_item(item)
            })
            .collect()
    }
}
