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

//! Handling of the ICAO 9303 eMRTD Security Object (SOD) fragments a client
//! submits when presenting an electronic passport.
//!
//! The crate covers the classical (non-zero-knowledge) half of passport
//! verification:
//!
//! * decoding the hex-encoded signed attributes and encapsulated content and
//!   checking that the message-digest attribute commits to the content
//!   ([`SecurityObject`]),
//! * normalizing the free-form algorithm string into the closed
//!   [`SignatureAlgorithm`] set and verifying the SOD signature with the
//!   document-signer certificate's public key,
//! * validating that the document-signer certificate chains to a trusted
//!   root from the country-signing master list ([`MasterList`]).

mod algorithm;
mod error;
mod sod;
mod trust;

pub use algorithm::{HashFamily, SignatureAlgorithm};
pub use error::{EmrtdError, Result};
pub use sod::{EncapsulatedData, SecurityObject};
pub use trust::{DsCertificate, MasterList};

#[cfg(test)]
pub(crate) mod test_utils;
