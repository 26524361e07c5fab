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

//! The passport-anchored voting identity provider.
//!
//! A client proves possession of a valid electronic passport by submitting
//! its Security Object fragments and a Groth16 registration proof; the
//! service validates the classical PKI chain and the proof, derives the
//! Poseidon document nullifier and fingerprint, revokes any prior claim
//! anchored to the same document and asks the external credential issuer to
//! mint a fresh verifiable credential.  The resulting claim is persisted
//! and returned.

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod identity;
pub mod issuer;
pub mod resources;
pub mod vault;

pub use api::run;
