// Copyright (C) 2020-2026  The Blockhouse Technology Limited (TBTL).
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public
// License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Normalization of the free-form SOD algorithm string into a closed set of
//! supported signature algorithms, and verification of SOD signatures.

use openssl::{ecdsa::EcdsaSig, hash::MessageDigest, pkey::Id, rsa::Padding, sign::Verifier};
use pverror::{traits::ForeignError as _, Error};

use crate::{trust::DsCertificate, EmrtdError, Result};

/// Hash function family used by a [`SignatureAlgorithm`].
///
/// The family also selects the Groth16 verification key a proof is checked
/// against, since the registration circuits are compiled per digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashFamily {
    /// SHA-1.
    Sha1,
    /// SHA-256.
    Sha256,
}

/// The signature algorithms accepted on a document SOD.
///
/// Each variant knows how to verify a signature over the signed attributes,
/// so call sites dispatch by exhaustive match instead of string comparison.
/// RSA-PSS is deliberately not represented; [`SignatureAlgorithm::parse`]
/// rejects it up front.
#[derive(strum_macros::Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// ECDSA (ASN.1/DER encoded signature) over SHA-1.
    #[strum(to_string = "SHA1withECDSA")]
    Sha1WithEcdsa,
    /// RSA PKCS#1 v1.5 over SHA-256.
    #[strum(to_string = "SHA256withRSA")]
    Sha256WithRsa,
    /// ECDSA (ASN.1/DER encoded signature) over SHA-256.
    #[strum(to_string = "SHA256withECDSA")]
    Sha256WithEcdsa,
}

impl SignatureAlgorithm {
    /// Normalize a free-form algorithm string (e.g. an OpenSSL algorithm
    /// name such as `sha256WithRSAEncryption` or `ecdsa-with-SHA1`) against
    /// the closed table of supported algorithms.
    ///
    /// Anything mentioning PSS is rejected as unsupported; anything else
    /// that matches no table entry is rejected as unknown.
    pub fn parse(input: &str) -> Result<Self> {
        let normalized = input.to_uppercase();

        if normalized.contains("PSS") {
            return Err(Error::root(EmrtdError::UnsupportedAlgorithm(
                input.to_owned(),
            )));
        }

        if normalized.contains("SHA1") && normalized.contains("ECDSA") {
            Ok(Self::Sha1WithEcdsa)
        } else if normalized.contains("SHA256") && normalized.contains("RSA") {
            Ok(Self::Sha256WithRsa)
        } else if normalized.contains("SHA256") && normalized.contains("ECDSA") {
            Ok(Self::Sha256WithEcdsa)
        } else {
            Err(Error::root(EmrtdError::UnknownAlgorithm(input.to_owned())))
        }
    }

    /// The digest family this algorithm hashes with.
    pub fn hash_family(&self) -> HashFamily {
        match self {
            Self::Sha1WithEcdsa => HashFamily::Sha1,
            Self::Sha256WithRsa | Self::Sha256WithEcdsa => HashFamily::Sha256,
        }
    }

    /// Hash `data` with this algorithm's digest.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self.hash_family() {
            HashFamily::Sha1 => openssl::sha::sha1(data).to_vec(),
            HashFamily::Sha256 => openssl::sha::sha256(data).to_vec(),
        }
    }

    /// Verify `signature` over `signed_attributes` with the public key of
    /// the document-signer certificate.
    ///
    /// A mismatch between the declared algorithm and the kind of key in the
    /// certificate is a verification failure.
    pub fn verify(
        &self,
        certificate: &DsCertificate,
        signed_attributes: &[u8],
        signature: &[u8],
    ) -> Result<()> {
        let key = certificate.public_key()?;

        match self {
            Self::Sha256WithRsa => {
                if key.id() != Id::RSA {
                    return Err(Error::root(EmrtdError::KeyTypeMismatch)
                        .ctx(format!("expected an RSA key, got {:?}", key.id())));
                }

                let mut verifier = Verifier::new(MessageDigest::sha256(), &key)
                    .foreign_err(|| EmrtdError::CryptoBackend)?;
                verifier
                    .set_rsa_padding(Padding::PKCS1)
                    .foreign_err(|| EmrtdError::CryptoBackend)?;
                verifier
                    .update(signed_attributes)
                    .foreign_err(|| EmrtdError::CryptoBackend)?;

                let valid = verifier
                    .verify(signature)
                    .foreign_err(|| EmrtdError::SignatureInvalid)?;
                if !valid {
                    return Err(Error::root(EmrtdError::SignatureInvalid)
                        .ctx(self.to_string()));
                }
            }
            Self::Sha1WithEcdsa | Self::Sha256WithEcdsa => {
                if key.id() != Id::EC {
                    return Err(Error::root(EmrtdError::KeyTypeMismatch)
                        .ctx(format!("expected an EC key, got {:?}", key.id())));
                }
                let key = key.ec_key().foreign_err(|| EmrtdError::CryptoBackend)?;

                let parsed = EcdsaSig::from_der(signature)
                    .foreign_err(|| EmrtdError::SignatureInvalid)?;
                let valid = parsed
                    .verify(&self.digest(signed_attributes), &key)
                    .foreign_err(|| EmrtdError::CryptoBackend)?;
                if !valid {
                    return Err(Error::root(EmrtdError::SignatureInvalid)
                        .ctx(self.to_string()));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use openssl::{hash::MessageDigest, rsa::Padding, sign::Signer};

    use super::*;
    use crate::test_utils::{ec_certificate, rsa_certificate};

    #[test]
    fn parse_matches_the_closed_table() {
        assert_eq!(
            SignatureAlgorithm::parse("sha256WithRSAEncryption").unwrap(),
            SignatureAlgorithm::Sha256WithRsa
        );
        assert_eq!(
            SignatureAlgorithm::parse("ecdsa-with-SHA1").unwrap(),
            SignatureAlgorithm::Sha1WithEcdsa
        );
        assert_eq!(
            SignatureAlgorithm::parse("ecdsa-with-SHA256").unwrap(),
            SignatureAlgorithm::Sha256WithEcdsa
        );
        // case does not matter
        assert_eq!(
            SignatureAlgorithm::parse("SHA256WITHRSA").unwrap(),
            SignatureAlgorithm::Sha256WithRsa
        );
    }

    #[test]
    fn parse_rejects_pss() {
        let error = SignatureAlgorithm::parse("rsassa-pss").unwrap_err();
        assert_eq!(
            error.error,
            EmrtdError::UnsupportedAlgorithm("rsassa-pss".to_owned())
        );
    }

    #[test]
    fn parse_rejects_unknown_algorithms() {
        for input in ["sha1WithRSAEncryption", "sha512WithRSAEncryption", "ed25519", ""] {
            let error = SignatureAlgorithm::parse(input).unwrap_err();
            assert_eq!(error.error, EmrtdError::UnknownAlgorithm(input.to_owned()));
        }
    }

    #[test]
    fn digest_follows_the_hash_family() {
        assert_eq!(SignatureAlgorithm::Sha1WithEcdsa.digest(b"x").len(), 20);
        assert_eq!(SignatureAlgorithm::Sha256WithRsa.digest(b"x").len(), 32);
        assert_eq!(SignatureAlgorithm::Sha256WithEcdsa.digest(b"x").len(), 32);
    }

    #[test]
    fn rsa_signature_verifies() {
        let (key, certificate) = rsa_certificate();
        let message = b"signed attributes";

        let mut signer = Signer::new(MessageDigest::sha256(), &key).unwrap();
        signer.set_rsa_padding(Padding::PKCS1).unwrap();
        signer.update(message).unwrap();
        let signature = signer.sign_to_vec().unwrap();

        SignatureAlgorithm::Sha256WithRsa
            .verify(&certificate, message, &signature)
            .unwrap();

        // tampered message fails
        let error = SignatureAlgorithm::Sha256WithRsa
            .verify(&certificate, b"other attributes", &signature)
            .unwrap_err();
        assert_eq!(error.error, EmrtdError::SignatureInvalid);
    }

    #[test]
    fn ecdsa_signature_verifies() {
        for algorithm in [
            SignatureAlgorithm::Sha1WithEcdsa,
            SignatureAlgorithm::Sha256WithEcdsa,
        ] {
            let (key, certificate) = ec_certificate();
            let message = b"signed attributes";

            let digest = algorithm.digest(message);
            let signature = EcdsaSig::sign(&digest, &key.ec_key().unwrap())
                .unwrap()
                .to_der()
                .unwrap();

            algorithm.verify(&certificate, message, &signature).unwrap();

            let error = algorithm
                .verify(&certificate, b"other attributes", &signature)
                .unwrap_err();
            assert_eq!(error.error, EmrtdError::SignatureInvalid);
        }
    }

    #[test]
    fn key_kind_must_match_the_algorithm() {
        let (_, ec_certificate) = ec_certificate();
        let (_, rsa_certificate) = rsa_certificate();

        let error = SignatureAlgorithm::Sha256WithRsa
            .verify(&ec_certificate, b"m", b"sig")
            .unwrap_err();
        assert_eq!(error.error, EmrtdError::KeyTypeMismatch);

        let error = SignatureAlgorithm::Sha256WithEcdsa
            .verify(&rsa_certificate, b"m", b"sig")
            .unwrap_err();
        assert_eq!(error.error, EmrtdError::KeyTypeMismatch);
    }

    #[test]
    fn garbage_ecdsa_signature_is_invalid() {
        let (_, certificate) = ec_certificate();
        let error = SignatureAlgorithm::Sha256WithEcdsa
            .verify(&certificate, b"m", &[0u8; 16])
            .unwrap_err();
        assert_eq!(error.error, EmrtdError::SignatureInvalid);
    }
}
