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

//! The service error kinds and their mapping from the library errors.
//!
//! The kinds mirror what the HTTP surface can express: malformed input and
//! failed cryptographic checks render as `bad_request`, system failures as
//! `internal_error`, and the flag-gated re-registration window as
//! `too_many_requests`.

use pv_emrtd::EmrtdError;
use pv_zkid::ZkIdError;

/// The failure kinds of the identity-issuance pipeline.
#[derive(strum_macros::Display, Debug, PartialEq, Clone, Copy)]
pub enum ServiceError {
    /// The request carried undecodable or unrecognized input.
    #[strum(to_string = "Malformed request input")]
    InputMalformed,
    /// A cryptographic check over well-formed input failed.
    #[strum(to_string = "Cryptographic verification failed")]
    CryptoFailed,
    /// A backend (database, issuer, vault, crypto library) failed.
    #[strum(to_string = "Internal system failure")]
    SystemFailed,
    /// A claim for the same document was issued within the configured
    /// re-registration window.
    #[strum(to_string = "Re-registration attempted within the timeout window")]
    RateLimited,
}

impl pverror::PvError for ServiceError {}

impl ServiceError {
    pub(crate) fn from_emrtd(error: &EmrtdError) -> Self {
        match error {
            EmrtdError::InvalidHex
            | EmrtdError::InvalidPem
            | EmrtdError::MalformedAsn1
            | EmrtdError::EmptyAttributes
            | EmrtdError::EmptyDigests
            | EmrtdError::MalformedSecurityObject
            | EmrtdError::UnknownAlgorithm(_)
            | EmrtdError::UnsupportedAlgorithm(_) => Self::InputMalformed,
            EmrtdError::ContentDigestMismatch
            | EmrtdError::KeyTypeMismatch
            | EmrtdError::SignatureInvalid
            | EmrtdError::UntrustedCertificate => Self::CryptoFailed,
            EmrtdError::EmptyMasterList | EmrtdError::CryptoBackend => Self::SystemFailed,
        }
    }

    pub(crate) fn from_zkid(error: &ZkIdError) -> Self {
        match error {
            ZkIdError::InvalidFieldElement
            | ZkIdError::PointNotOnCurve
            | ZkIdError::UnsupportedProtocol(_)
            | ZkIdError::MalformedSignals => Self::InputMalformed,
            ZkIdError::ProofRejected
            | ZkIdError::Dg1Mismatch
            | ZkIdError::DateMismatch
            | ZkIdError::BelowMinimumAge => Self::CryptoFailed,
            ZkIdError::MalformedVerificationKey
            | ZkIdError::VerifierFailure
            | ZkIdError::HashingFailed => Self::SystemFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failures_are_client_errors() {
        assert_eq!(
            ServiceError::from_emrtd(&EmrtdError::UnsupportedAlgorithm("rsassa-pss".into())),
            ServiceError::InputMalformed
        );
        assert_eq!(
            ServiceError::from_emrtd(&EmrtdError::ContentDigestMismatch),
            ServiceError::CryptoFailed
        );
        assert_eq!(
            ServiceError::from_zkid(&ZkIdError::ProofRejected),
            ServiceError::CryptoFailed
        );
        assert_eq!(
            ServiceError::from_zkid(&ZkIdError::MalformedSignals),
            ServiceError::InputMalformed
        );
    }

    #[test]
    fn backend_failures_are_system_errors() {
        assert_eq!(
            ServiceError::from_emrtd(&EmrtdError::CryptoBackend),
            ServiceError::SystemFailed
        );
        assert_eq!(
            ServiceError::from_zkid(&ZkIdError::HashingFailed),
            ServiceError::SystemFailed
        );
    }
}
