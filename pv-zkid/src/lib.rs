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

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Zero-knowledge primitives of the passport registration flow.
//!
//! The crate decodes Groth16 proofs and verification keys from the snark
//! JSON shape produced by the client-side provers, verifies proofs over
//! BN254 against the verification key matching the SOD's hash family,
//! validates the positional public signals against the presented passport
//! data, and derives the Poseidon-based document nullifier, credential hash
//! and document fingerprint.

mod error;
pub mod hash;
mod proof;
mod signals;
#[cfg(any(feature = "test-utils", test))]
pub mod test_support;
mod verifier;

pub use error::{Result, ZkIdError};
pub use proof::{ProofData, VerificationKey, ZkProof};
pub use signals::PubSignals;
pub use verifier::{verify_registration_proof, VerifierKeys};
