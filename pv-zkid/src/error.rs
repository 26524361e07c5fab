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

//! This module defines the error values returned by the crate API.

/// Error type used across the crate API.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum ZkIdError {
    /// A big-integer string of a proof, key or signal failed to parse.
    #[strum(to_string = "Invalid field element encoding")]
    InvalidFieldElement,
    /// A decoded curve point is not on the curve or not in the right
    /// subgroup.
    #[strum(to_string = "Point is not a valid curve point")]
    PointNotOnCurve,
    /// The proof declares a protocol other than `groth16`.
    #[strum(to_string = "{0} is not a supported proof protocol")]
    UnsupportedProtocol(String),
    /// A verification key failed to decode.
    #[strum(to_string = "Malformed verification key")]
    MalformedVerificationKey,
    /// The pairing engine failed while checking a proof.
    #[strum(to_string = "Proof verifier failure")]
    VerifierFailure,
    /// The proof is well-formed but does not verify.
    #[strum(to_string = "Proof verification failed")]
    ProofRejected,
    /// The public signals are missing or not numeric.
    #[strum(to_string = "Malformed public signals")]
    MalformedSignals,
    /// The public signals do not reproduce the DG1 octet string.
    #[strum(to_string = "Public signals do not match the DG1 octet string")]
    Dg1Mismatch,
    /// The public signals encode a date other than the current one.
    #[strum(to_string = "Public signals encode a stale date")]
    DateMismatch,
    /// The proven age is below the configured minimum.
    #[strum(to_string = "Proven age is below the allowed minimum")]
    BelowMinimumAge,
    /// The Poseidon backend failed.
    #[strum(to_string = "Poseidon hashing failure")]
    HashingFailed,
}

impl pverror::PvError for ZkIdError {}

/// Type alias for [`pverror::Result`] values returned by the crate's API.
pub type Result<T> = pverror::Result<T, ZkIdError>;
