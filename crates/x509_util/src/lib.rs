// Copyright (c) 2025 Cloudflare, Inc.
// Licensed under the BSD-3-Clause license found in the LICENSE file or at https://opensource.org/licenses/BSD-3-Clause

//! Utilities for the X.509 operations needed by the RFC 6962 structures:
//! parsing DER certificate blobs, computing issuer key hashes, and rebuilding
//! the `TBSCertificate` of a precertificate without its poison extension.

use const_oid::{db::rfc6962::CT_PRECERT_POISON, AssociatedOid, ObjectIdentifier};
use der::{asn1::Null, Decode, Encode, Error as DerError};
use sha2::{Digest, Sha256};
use x509_cert::{impl_newtype, Certificate};

#[derive(thiserror::Error, Debug)]
pub enum X509Error {
    #[error(transparent)]
    Der(#[from] DerError),
    #[error("CT poison extension is not critical or invalid")]
    InvalidCTPoison,
    #[error("certificate is not a precertificate")]
    NotAPrecertificate,
}

/// Parses a single DER-encoded certificate.
///
/// # Errors
///
/// Returns an error if the bytes are not a DER-encoded certificate, or if
/// anything follows the certificate.
pub fn parse_certificate(der: &[u8]) -> Result<Certificate, DerError> {
    Certificate::from_der(der)
}

/// A parsed certificate together with the exact bytes it was decoded from.
///
/// Logs hash the certificate bytes they received, so encoders emit
/// [`DerCertificate::as_der`] verbatim rather than re-encoding the parsed
/// form. The two differ for certificates that are not in canonical DER, for
/// example ones that spell out a DEFAULT value. Equality compares the bytes.
#[derive(Debug, Clone)]
pub struct DerCertificate {
    der: Vec<u8>,
    certificate: Certificate,
}

impl DerCertificate {
    /// Parses `der`, keeping it as the certificate's encoding.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`parse_certificate`].
    pub fn from_der(der: Vec<u8>) -> Result<Self, DerError> {
        let certificate = parse_certificate(&der)?;
        Ok(Self { der, certificate })
    }

    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    pub fn into_der(self) -> Vec<u8> {
        self.der
    }

    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }
}

impl TryFrom<Certificate> for DerCertificate {
    type Error = DerError;

    fn try_from(certificate: Certificate) -> Result<Self, Self::Error> {
        Ok(Self {
            der: certificate.to_der()?,
            certificate,
        })
    }
}

impl AsRef<[u8]> for DerCertificate {
    fn as_ref(&self) -> &[u8] {
        &self.der
    }
}

impl AsRef<Certificate> for DerCertificate {
    fn as_ref(&self) -> &Certificate {
        &self.certificate
    }
}

impl PartialEq for DerCertificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for DerCertificate {}

/// Parses a sequence of PEM certificate blocks.
///
/// # Errors
///
/// Returns an error if a block cannot be decoded.
pub fn certs_from_pem(input: &[u8]) -> Result<Vec<DerCertificate>, DerError> {
    // load_pem_chain does not accept an empty input.
    if input.is_empty() {
        return Ok(Vec::new());
    }
    Certificate::load_pem_chain(input)?
        .into_iter()
        .map(DerCertificate::try_from)
        .collect()
}

/// Returns the SHA-256 hash of the certificate's DER-encoded
/// `SubjectPublicKeyInfo`, as used in the `issuer_key_hash` field of a
/// precertificate entry.
///
/// # Errors
///
/// Returns an error if the public key info cannot be DER-encoded.
pub fn issuer_key_hash(cert: &Certificate) -> Result<[u8; 32], DerError> {
    let spki = cert.tbs_certificate.subject_public_key_info.to_der()?;
    Ok(Sha256::digest(spki).into())
}

/// Precertificate poison extension that can be decoded with
/// [`x509_cert::TbsCertificate::get`].
#[derive(Debug)]
struct CTPrecertPoison(Null);

impl AssociatedOid for CTPrecertPoison {
    const OID: ObjectIdentifier = CT_PRECERT_POISON;
}
impl_newtype!(CTPrecertPoison, Null);

/// Returns whether or not the certificate carries the precertificate poison
/// extension.
///
/// # Errors
///
/// Returns an error if the poison extension is present but not critical, or
/// cannot be decoded.
pub fn is_precert(cert: &Certificate) -> Result<bool, X509Error> {
    match cert.tbs_certificate.get::<CTPrecertPoison>()? {
        Some((true, _)) => Ok(true),
        Some((false, _)) => Err(X509Error::InvalidCTPoison),
        None => Ok(false),
    }
}

/// Returns the DER-encoded `TBSCertificate` of a precertificate with the
/// poison extension removed, preserving the order of the other extensions.
///
/// # Errors
///
/// Returns an error if the certificate does not carry exactly one valid poison
/// extension, or on DER encoding issues.
pub fn precert_tbs(cert: &Certificate) -> Result<Vec<u8>, X509Error> {
    if !is_precert(cert)? {
        return Err(X509Error::NotAPrecertificate);
    }
    let mut tbs = cert.tbs_certificate.clone();
    let exts = tbs
        .extensions
        .as_mut()
        .ok_or(X509Error::NotAPrecertificate)?;
    exts.retain(|ext| ext.extn_id != CT_PRECERT_POISON);
    if exts.is_empty() {
        tbs.extensions = None;
    }
    Ok(tbs.to_der()?)
}
