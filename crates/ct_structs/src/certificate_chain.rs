// Copyright (c) 2025 Cloudflare, Inc.
// Licensed under the BSD-3-Clause license found in the LICENSE file or at https://opensource.org/licenses/BSD-3-Clause

use crate::CtError;
use length_prefixed::{ReadLengthPrefixedBytesExt, WriteLengthPrefixedBytesExt, MAX_OPAQUE_24};
use x509_util::DerCertificate;

/// An ordered certificate chain as carried in `extra_data`:
/// `ASN.1Cert certificate_chain<0..2^24-1>`, where each `ASN.1Cert` is itself
/// `opaque<1..2^24-1>`. Certificates are re-emitted with the bytes they were
/// decoded from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateChain(Vec<DerCertificate>);

impl CertificateChain {
    pub fn new(certificates: Vec<DerCertificate>) -> Self {
        Self(certificates)
    }

    pub fn push(&mut self, certificate: DerCertificate) {
        self.0.push(certificate);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DerCertificate> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&DerCertificate> {
        self.0.first()
    }

    pub fn certificates(&self) -> &[DerCertificate] {
        &self.0
    }

    /// Decodes a chain that must occupy the whole of `blob`.
    ///
    /// # Errors
    ///
    /// Returns [`CtError::TrailingData`] if bytes follow the outer vector, and a
    /// malformed-input error if either vector layer is truncated or a
    /// certificate does not parse.
    pub fn from_bytes(blob: &[u8]) -> Result<Self, CtError> {
        let mut s = blob;
        let chain = s.read_length_prefixed(MAX_OPAQUE_24)?;
        if !s.is_empty() {
            return Err(CtError::TrailingData);
        }

        let mut s = chain.as_slice();
        let mut certificates = Vec::new();
        while !s.is_empty() {
            let der = s.read_length_prefixed(MAX_OPAQUE_24)?;
            certificates.push(DerCertificate::from_der(der)?);
        }

        Ok(Self(certificates))
    }

    /// Returns the encoded chain.
    ///
    /// # Errors
    ///
    /// Returns an error if a certificate or the whole chain is longer than
    /// 2^24-1 bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CtError> {
        let mut chain = Vec::new();
        for certificate in &self.0 {
            chain.write_length_prefixed(certificate.as_der(), MAX_OPAQUE_24)?;
        }

        let mut buffer = Vec::with_capacity(3 + chain.len());
        buffer.write_length_prefixed(&chain, MAX_OPAQUE_24)?;
        Ok(buffer)
    }
}

impl FromIterator<DerCertificate> for CertificateChain {
    fn from_iter<T: IntoIterator<Item = DerCertificate>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for CertificateChain {
    type Item = DerCertificate;
    type IntoIter = std::vec::IntoIter<DerCertificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a CertificateChain {
    type Item = &'a DerCertificate;
    type IntoIter = std::slice::Iter<'a, DerCertificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
