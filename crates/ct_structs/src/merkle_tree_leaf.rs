// Copyright (c) 2025 Cloudflare, Inc.
// Licensed under the BSD-3-Clause license found in the LICENSE file or at https://opensource.org/licenses/BSD-3-Clause

use crate::{CtError, MerkleLeafType, TimestampedEntry, Version};
use length_prefixed::LengthPrefixedError;
use sha2::{Digest, Sha256};

/// A `MerkleTreeLeaf` from
/// [RFC 6962 §3.4](https://datatracker.ietf.org/doc/html/rfc6962#section-3.4).
///
/// ```text
/// struct {
///     Version version;
///     MerkleLeafType leaf_type;
///     select (leaf_type) {
///         case timestamped_entry: TimestampedEntry;
///     }
/// } MerkleTreeLeaf;
/// ```
///
/// The version is kept as the raw byte read from the wire, so leaves with a
/// version this crate does not know still decode. Setting the version only
/// accepts known values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTreeLeaf {
    version: u8,
    leaf_type: MerkleLeafType,
    timestamped_entry: Option<TimestampedEntry>,
}

impl Default for MerkleTreeLeaf {
    fn default() -> Self {
        Self {
            version: Version::V1.code(),
            leaf_type: MerkleLeafType::TimestampedEntry,
            timestamped_entry: None,
        }
    }
}

impl MerkleTreeLeaf {
    /// Returns a `v1` leaf wrapping `timestamped_entry`.
    pub fn new(timestamped_entry: TimestampedEntry) -> Self {
        Self {
            timestamped_entry: Some(timestamped_entry),
            ..Default::default()
        }
    }

    /// Returns the version, or `None` if the leaf was decoded with an unknown
    /// version number.
    pub fn version(&self) -> Option<Version> {
        Version::from_code(self.version)
    }

    pub fn version_code(&self) -> u8 {
        self.version
    }

    pub fn set_version(&mut self, version: Version) {
        self.version = version.code();
    }

    /// Sets the version from its wire code.
    ///
    /// # Errors
    ///
    /// Returns [`CtError::InvalidEnumValue`] if the code is not a known version.
    pub fn set_version_code(&mut self, code: u8) -> Result<(), CtError> {
        self.set_version(Version::try_from(code)?);
        Ok(())
    }

    pub fn leaf_type(&self) -> MerkleLeafType {
        self.leaf_type
    }

    pub fn set_leaf_type(&mut self, leaf_type: MerkleLeafType) {
        self.leaf_type = leaf_type;
    }

    /// Sets the leaf type from its wire code.
    ///
    /// # Errors
    ///
    /// Returns [`CtError::InvalidEnumValue`] if the code is not a known leaf type.
    pub fn set_leaf_type_code(&mut self, code: u8) -> Result<(), CtError> {
        self.set_leaf_type(MerkleLeafType::try_from(code)?);
        Ok(())
    }

    pub fn timestamped_entry(&self) -> Option<&TimestampedEntry> {
        self.timestamped_entry.as_ref()
    }

    pub fn set_timestamped_entry(&mut self, timestamped_entry: TimestampedEntry) {
        self.timestamped_entry = Some(timestamped_entry);
    }

    /// Decodes a `MerkleTreeLeaf` that must occupy the whole of `blob`.
    ///
    /// # Errors
    ///
    /// Returns [`CtError::UnsupportedLeafType`] unless the leaf type is
    /// `timestamped_entry`, or any error from [`TimestampedEntry::from_bytes`].
    pub fn from_bytes(blob: &[u8]) -> Result<Self, CtError> {
        let (version, leaf_type, rest) = match blob {
            [version, leaf_type, rest @ ..] => (*version, *leaf_type, rest),
            _ => return Err(LengthPrefixedError::TruncatedInput.into()),
        };
        let leaf_type =
            MerkleLeafType::from_code(leaf_type).ok_or(CtError::UnsupportedLeafType(leaf_type))?;
        if Version::from_code(version).is_none() {
            log::warn!("decoded Merkle tree leaf with unknown version {version}");
        }

        Ok(Self {
            version,
            leaf_type,
            timestamped_entry: Some(TimestampedEntry::from_bytes(rest)?),
        })
    }

    /// Returns the encoded structure.
    ///
    /// # Errors
    ///
    /// Returns [`CtError::TimestampedEntryUnset`] if no entry is set, or any
    /// error from [`TimestampedEntry::to_bytes`].
    pub fn to_bytes(&self) -> Result<Vec<u8>, CtError> {
        let timestamped_entry = self
            .timestamped_entry
            .as_ref()
            .ok_or(CtError::TimestampedEntryUnset)?;

        let mut buffer = vec![self.version, self.leaf_type.code()];
        buffer.extend(timestamped_entry.to_bytes()?);
        Ok(buffer)
    }

    /// Returns the [RFC 6962 §2.1](https://datatracker.ietf.org/doc/html/rfc6962#section-2.1)
    /// leaf hash, `SHA-256(0x00 || leaf)`.
    ///
    /// # Errors
    ///
    /// Returns any error from [`MerkleTreeLeaf::to_bytes`].
    pub fn leaf_hash(&self) -> Result<[u8; 32], CtError> {
        let mut hasher = Sha256::new();
        hasher.update([0u8]);
        hasher.update(self.to_bytes()?);
        Ok(hasher.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, LogEntryType};

    const LEAF_INPUT: &[u8] = include_bytes!("../tests/leaf_input");
    const LEAF_INPUT_PRECERT: &[u8] = include_bytes!("../tests/leaf_input_precert");

    #[test]
    fn test_decode() {
        let leaf = MerkleTreeLeaf::from_bytes(LEAF_INPUT).unwrap();
        assert_eq!(leaf.version(), Some(Version::V1));
        assert_eq!(leaf.leaf_type(), MerkleLeafType::TimestampedEntry);
        assert_eq!(
            leaf.timestamped_entry(),
            Some(&TimestampedEntry::from_bytes(include_bytes!("../tests/timestamped_entry")).unwrap())
        );

        let leaf = MerkleTreeLeaf::from_bytes(LEAF_INPUT_PRECERT).unwrap();
        assert_eq!(
            leaf.timestamped_entry().unwrap().entry_type(),
            Some(LogEntryType::PrecertEntry)
        );
    }

    #[test]
    fn test_round_trip() {
        for blob in [LEAF_INPUT, LEAF_INPUT_PRECERT] {
            let leaf = MerkleTreeLeaf::from_bytes(blob).unwrap();
            assert_eq!(leaf.to_bytes().unwrap(), blob);
        }
    }

    #[test]
    fn test_leaf_hash() {
        let leaf = MerkleTreeLeaf::from_bytes(LEAF_INPUT).unwrap();
        assert_eq!(
            hex::encode(leaf.leaf_hash().unwrap()),
            "806a76c6b32cc45342c358f46a0d983c8f94fb013acda9c71e05dfb1ccb80e5e"
        );
        let leaf = MerkleTreeLeaf::from_bytes(LEAF_INPUT_PRECERT).unwrap();
        assert_eq!(
            hex::encode(leaf.leaf_hash().unwrap()),
            "02bd118fa75358f1592790c5ddf99da9da1189bd3b78a397457df98fde47896d"
        );
    }

    #[test]
    fn test_unknown_version_is_kept() {
        let mut blob = LEAF_INPUT.to_vec();
        blob[0] = 7;
        let leaf = MerkleTreeLeaf::from_bytes(&blob).unwrap();
        assert_eq!(leaf.version(), None);
        assert_eq!(leaf.version_code(), 7);
        assert_eq!(leaf.to_bytes().unwrap(), blob);
    }

    #[test]
    fn test_unsupported_leaf_type() {
        let mut blob = LEAF_INPUT.to_vec();
        blob[1] = 1;
        let err = MerkleTreeLeaf::from_bytes(&blob).unwrap_err();
        assert!(matches!(err, CtError::UnsupportedLeafType(1)));
        assert_eq!(err.kind(), ErrorKind::UnsupportedValue);
    }

    #[test]
    fn test_truncated() {
        for len in [0, 1, 2, 10] {
            assert_eq!(
                MerkleTreeLeaf::from_bytes(&LEAF_INPUT[..len]).unwrap_err().kind(),
                ErrorKind::MalformedInput
            );
        }
    }

    #[test]
    fn test_setters() {
        let mut leaf = MerkleTreeLeaf::default();
        leaf.set_version("v1".parse().unwrap());
        leaf.set_version_code(0).unwrap();
        leaf.set_leaf_type("timestamped_entry".parse().unwrap());
        leaf.set_leaf_type_code(0).unwrap();

        let err = leaf.set_version_code(1).unwrap_err();
        assert!(matches!(err, CtError::InvalidEnumValue { name: "Version", .. }));
        assert_eq!(err.kind(), ErrorKind::UnsupportedValue);
        assert!(leaf.set_leaf_type_code(2).is_err());
        assert!("v2".parse::<Version>().is_err());
        assert_eq!(leaf.version(), Some(Version::V1));
    }

    #[test]
    fn test_encode_unset() {
        let err = MerkleTreeLeaf::default().to_bytes().unwrap_err();
        assert!(matches!(err, CtError::TimestampedEntryUnset));
        assert_eq!(err.kind(), ErrorKind::IncompleteStructure);
    }

    #[test]
    fn test_new() {
        let entry = TimestampedEntry::from_bytes(include_bytes!("../tests/timestamped_entry")).unwrap();
        assert_eq!(MerkleTreeLeaf::new(entry).to_bytes().unwrap(), LEAF_INPUT);
    }
}
