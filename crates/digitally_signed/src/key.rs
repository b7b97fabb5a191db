// Copyright (c) 2025 Cloudflare, Inc.
// Licensed under the BSD-3-Clause license found in the LICENSE file or at https://opensource.org/licenses/BSD-3-Clause

//! Key handles for the two signature algorithms permitted by RFC 6962.
//!
//! Key material is classified by the algorithm identifier in its
//! `SubjectPublicKeyInfo` or PKCS#8 `PrivateKeyInfo`, and anything other than
//! a P-256 EC key or an RSA key of at least [`MIN_RSA_BITS`] bits is rejected.

use crate::{DigitallySignedError, SignatureAlgorithm};
use const_oid::db::rfc5912::{ID_EC_PUBLIC_KEY, RSA_ENCRYPTION, SECP_256_R_1};
use der::Decode;
use p256::ecdsa::{
    signature::{Signer, Verifier},
    Signature as EcdsaSignature, SigningKey as EcdsaSigningKey, VerifyingKey as EcdsaVerifyingKey,
};
use pkcs8::{DecodePrivateKey, PrivateKeyInfo};
use rsa::{
    pkcs1v15::{
        Signature as RsaSignature, SigningKey as RsaSigningKey, VerifyingKey as RsaVerifyingKey,
    },
    signature::SignatureEncoding,
    traits::PublicKeyParts,
    RsaPrivateKey, RsaPublicKey,
};
use sha2::Sha256;
use spki::{AlgorithmIdentifierRef, DecodePublicKey, EncodePublicKey, SubjectPublicKeyInfoRef};

/// The smallest RSA modulus accepted, in bits.
pub const MIN_RSA_BITS: usize = 2048;

/// The family of a key, derived from its algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyFamily {
    P256,
    Rsa,
}

fn classify(algorithm: &AlgorithmIdentifierRef<'_>) -> Result<KeyFamily, DigitallySignedError> {
    if algorithm.oid == ID_EC_PUBLIC_KEY && algorithm.parameters_oid()? == SECP_256_R_1 {
        Ok(KeyFamily::P256)
    } else if algorithm.oid == RSA_ENCRYPTION {
        Ok(KeyFamily::Rsa)
    } else {
        Err(DigitallySignedError::UnrecognizedKeyType)
    }
}

fn check_rsa_size(key: &RsaPublicKey) -> Result<(), DigitallySignedError> {
    let bits = key.size() * 8;
    if bits < MIN_RSA_BITS {
        return Err(DigitallySignedError::WeakRsaKey { bits });
    }
    Ok(())
}

/// A public key able to verify `DigitallySigned` signatures.
#[derive(Clone, Debug, PartialEq)]
pub enum PublicKey {
    Ecdsa(EcdsaVerifyingKey),
    Rsa(RsaPublicKey),
}

impl PublicKey {
    /// Parses a DER-encoded `SubjectPublicKeyInfo`.
    ///
    /// # Errors
    ///
    /// Returns [`DigitallySignedError::UnrecognizedKeyType`] for keys other
    /// than P-256 and RSA, [`DigitallySignedError::WeakRsaKey`] for RSA keys
    /// below [`MIN_RSA_BITS`], and a decoding error if the key is malformed.
    pub fn from_public_key_der(der: &[u8]) -> Result<Self, DigitallySignedError> {
        let spki = SubjectPublicKeyInfoRef::from_der(der)?;
        match classify(&spki.algorithm)? {
            KeyFamily::P256 => Ok(Self::Ecdsa(EcdsaVerifyingKey::from_public_key_der(der)?)),
            KeyFamily::Rsa => {
                let key = RsaPublicKey::from_public_key_der(der)?;
                check_rsa_size(&key)?;
                Ok(Self::Rsa(key))
            }
        }
    }

    /// Returns the DER-encoded `SubjectPublicKeyInfo` of this key.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_public_key_der(&self) -> Result<Vec<u8>, DigitallySignedError> {
        let doc = match self {
            Self::Ecdsa(key) => key.to_public_key_der()?,
            Self::Rsa(key) => key.to_public_key_der()?,
        };
        Ok(doc.to_vec())
    }

    /// Returns the TLS signature algorithm produced by this kind of key.
    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        match self {
            Self::Ecdsa(_) => SignatureAlgorithm::Ecdsa,
            Self::Rsa(_) => SignatureAlgorithm::Rsa,
        }
    }

    /// Verifies `signature` over the SHA-256 digest of `content`. Signatures
    /// that cannot be parsed for this key type do not verify.
    pub fn verify(&self, content: &[u8], signature: &[u8]) -> bool {
        match self {
            Self::Ecdsa(key) => {
                let Ok(sig) = EcdsaSignature::from_der(signature) else {
                    return false;
                };
                key.verify(content, &sig).is_ok()
            }
            Self::Rsa(key) => {
                let Ok(sig) = RsaSignature::try_from(signature) else {
                    return false;
                };
                RsaVerifyingKey::<Sha256>::new(key.clone())
                    .verify(content, &sig)
                    .is_ok()
            }
        }
    }
}

impl From<EcdsaVerifyingKey> for PublicKey {
    fn from(key: EcdsaVerifyingKey) -> Self {
        Self::Ecdsa(key)
    }
}

impl From<RsaPublicKey> for PublicKey {
    fn from(key: RsaPublicKey) -> Self {
        Self::Rsa(key)
    }
}

/// A private key able to produce `DigitallySigned` signatures.
#[derive(Clone, Debug)]
pub enum PrivateKey {
    Ecdsa(EcdsaSigningKey),
    Rsa(RsaPrivateKey),
}

impl PrivateKey {
    /// Parses a DER-encoded PKCS#8 `PrivateKeyInfo`.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`PublicKey::from_public_key_der`].
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self, DigitallySignedError> {
        let info = PrivateKeyInfo::from_der(der)?;
        match classify(&info.algorithm)? {
            KeyFamily::P256 => Ok(Self::Ecdsa(EcdsaSigningKey::from_pkcs8_der(der)?)),
            KeyFamily::Rsa => {
                let key = RsaPrivateKey::from_pkcs8_der(der)?;
                check_rsa_size(&key.to_public_key())?;
                Ok(Self::Rsa(key))
            }
        }
    }

    /// Returns the public half of this key.
    pub fn public_key(&self) -> PublicKey {
        match self {
            Self::Ecdsa(key) => PublicKey::Ecdsa(*key.verifying_key()),
            Self::Rsa(key) => PublicKey::Rsa(key.to_public_key()),
        }
    }

    /// Returns the TLS signature algorithm produced by this key.
    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        match self {
            Self::Ecdsa(_) => SignatureAlgorithm::Ecdsa,
            Self::Rsa(_) => SignatureAlgorithm::Rsa,
        }
    }

    /// Signs the SHA-256 digest of `content`. ECDSA signatures are
    /// deterministic (RFC 6979) and DER-encoded.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying signing operation fails.
    pub fn sign(&self, content: &[u8]) -> Result<Vec<u8>, DigitallySignedError> {
        match self {
            Self::Ecdsa(key) => {
                let sig: EcdsaSignature = key.try_sign(content)?;
                Ok(sig.to_der().as_bytes().to_vec())
            }
            Self::Rsa(key) => {
                let sig = RsaSigningKey::<Sha256>::new(key.clone()).try_sign(content)?;
                Ok(sig.to_vec())
            }
        }
    }
}

impl From<EcdsaSigningKey> for PrivateKey {
    fn from(key: EcdsaSigningKey) -> Self {
        Self::Ecdsa(key)
    }
}

impl From<RsaPrivateKey> for PrivateKey {
    fn from(key: RsaPrivateKey) -> Self {
        Self::Rsa(key)
    }
}

/// Either half of a key pair. Only a [`KeyHandle::Private`] handle can sign.
#[derive(Clone, Debug)]
pub enum KeyHandle {
    Public(PublicKey),
    Private(PrivateKey),
}

impl KeyHandle {
    /// Parses raw key material, either a DER-encoded `SubjectPublicKeyInfo`
    /// or a DER-encoded PKCS#8 `PrivateKeyInfo`. The outer structure decides
    /// which of the two is meant; the algorithm identifier inside it decides
    /// the key family.
    ///
    /// # Errors
    ///
    /// Returns [`DigitallySignedError::UnrecognizedKeyType`] if `der` is
    /// neither structure or names an unsupported algorithm.
    pub fn from_der(der: &[u8]) -> Result<Self, DigitallySignedError> {
        if SubjectPublicKeyInfoRef::from_der(der).is_ok() {
            return Ok(Self::Public(PublicKey::from_public_key_der(der)?));
        }
        if PrivateKeyInfo::from_der(der).is_ok() {
            return Ok(Self::Private(PrivateKey::from_pkcs8_der(der)?));
        }
        Err(DigitallySignedError::UnrecognizedKeyType)
    }

    /// Returns whether this handle holds private key material.
    pub fn can_sign(&self) -> bool {
        matches!(self, Self::Private(_))
    }

    /// Returns the public half of this key.
    pub fn public_key(&self) -> PublicKey {
        match self {
            Self::Public(key) => key.clone(),
            Self::Private(key) => key.public_key(),
        }
    }

    /// Returns the TLS signature algorithm associated with this key.
    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        match self {
            Self::Public(key) => key.signature_algorithm(),
            Self::Private(key) => key.signature_algorithm(),
        }
    }

    /// Verifies `signature` over the SHA-256 digest of `content`.
    pub fn verify(&self, content: &[u8], signature: &[u8]) -> bool {
        match self {
            Self::Public(key) => key.verify(content, signature),
            Self::Private(key) => key.public_key().verify(content, signature),
        }
    }

    /// Signs the SHA-256 digest of `content`.
    ///
    /// # Errors
    ///
    /// Returns [`DigitallySignedError::SigningRequiresPrivateKey`] if this is
    /// a public key.
    pub fn sign(&self, content: &[u8]) -> Result<Vec<u8>, DigitallySignedError> {
        match self {
            Self::Public(_) => Err(DigitallySignedError::SigningRequiresPrivateKey),
            Self::Private(key) => key.sign(content),
        }
    }
}

impl From<PublicKey> for KeyHandle {
    fn from(key: PublicKey) -> Self {
        Self::Public(key)
    }
}

impl From<PrivateKey> for KeyHandle {
    fn from(key: PrivateKey) -> Self {
        Self::Private(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use rand::rngs::OsRng;

    const EC_PUB: &[u8] = include_bytes!("../tests/ec-pub.der");
    const EC_KEY: &[u8] = include_bytes!("../tests/ec-key.der");
    const RSA_PUB: &[u8] = include_bytes!("../tests/rsa-pub.der");
    const RSA_KEY: &[u8] = include_bytes!("../tests/rsa-key.der");

    #[test]
    fn test_public_key_import() {
        let ec = PublicKey::from_public_key_der(EC_PUB).unwrap();
        assert!(matches!(ec, PublicKey::Ecdsa(_)));
        assert_eq!(ec.signature_algorithm(), SignatureAlgorithm::Ecdsa);
        assert_eq!(ec.to_public_key_der().unwrap(), EC_PUB);

        let rsa = PublicKey::from_public_key_der(RSA_PUB).unwrap();
        assert!(matches!(rsa, PublicKey::Rsa(_)));
        assert_eq!(rsa.signature_algorithm(), SignatureAlgorithm::Rsa);
        assert_eq!(rsa.to_public_key_der().unwrap(), RSA_PUB);
    }

    macro_rules! test_rejected_key {
        ($name:ident, $file:expr, $pattern:pat) => {
            #[test]
            fn $name() {
                let err = PublicKey::from_public_key_der(include_bytes!($file)).unwrap_err();
                assert!(matches!(err, $pattern), "unexpected error {err:?}");
                assert_eq!(err.kind(), ErrorKind::UnsupportedValue);
                assert!(KeyHandle::from_der(include_bytes!($file)).is_err());
            }
        };
    }

    test_rejected_key!(
        reject_ed25519,
        "../tests/ed25519-pub.der",
        DigitallySignedError::UnrecognizedKeyType
    );
    test_rejected_key!(
        reject_p384,
        "../tests/p384-pub.der",
        DigitallySignedError::UnrecognizedKeyType
    );
    test_rejected_key!(
        reject_rsa_1024,
        "../tests/rsa-1024-pub.der",
        DigitallySignedError::WeakRsaKey { bits: 1024 }
    );

    #[test]
    fn test_garbage_key() {
        assert!(matches!(
            KeyHandle::from_der(b"not a key"),
            Err(DigitallySignedError::UnrecognizedKeyType)
        ));
        assert_eq!(
            PublicKey::from_public_key_der(b"not a key")
                .unwrap_err()
                .kind(),
            ErrorKind::MalformedInput
        );
    }

    #[test]
    fn test_key_handle_classification() {
        let public = KeyHandle::from_der(EC_PUB).unwrap();
        assert!(!public.can_sign());
        let private = KeyHandle::from_der(EC_KEY).unwrap();
        assert!(private.can_sign());
        assert_eq!(private.public_key(), public.public_key());

        let public = KeyHandle::from_der(RSA_PUB).unwrap();
        assert!(!public.can_sign());
        assert_eq!(public.signature_algorithm(), SignatureAlgorithm::Rsa);
        let private = KeyHandle::from_der(RSA_KEY).unwrap();
        assert!(private.can_sign());
        assert_eq!(private.public_key(), public.public_key());
    }

    #[test]
    fn test_sign_and_verify() {
        for key in [
            KeyHandle::from_der(EC_KEY).unwrap(),
            KeyHandle::from_der(RSA_KEY).unwrap(),
            KeyHandle::from(PrivateKey::from(EcdsaSigningKey::random(&mut OsRng))),
        ] {
            let sig = key.sign(b"message").unwrap();
            assert!(key.verify(b"message", &sig));
            assert!(!key.verify(b"massage", &sig));

            let public = KeyHandle::from(key.public_key());
            assert!(public.verify(b"message", &sig));
            assert!(matches!(
                public.sign(b"message"),
                Err(DigitallySignedError::SigningRequiresPrivateKey)
            ));
        }
    }

    #[test]
    fn test_verify_with_wrong_key_family() {
        let ec = KeyHandle::from_der(EC_KEY).unwrap();
        let rsa = KeyHandle::from_der(RSA_KEY).unwrap();
        assert!(!rsa.verify(b"message", &ec.sign(b"message").unwrap()));
        assert!(!ec.verify(b"message", &rsa.sign(b"message").unwrap()));
        assert!(!ec.verify(b"message", b""));
    }
}
