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
pub enum EmrtdError {
    /// A hex-encoded request fragment failed to decode.
    #[strum(to_string = "Invalid hex encoding")]
    InvalidHex,
    /// A PEM block failed to decode.
    #[strum(to_string = "Invalid PEM encoding")]
    InvalidPem,
    /// A DER structure failed to parse.
    #[strum(to_string = "Malformed ASN.1 structure")]
    MalformedAsn1,
    /// The signed attributes decoded to an empty SET.
    #[strum(to_string = "Signed attributes set is empty")]
    EmptyAttributes,
    /// The message-digest attribute holds no digest values.
    #[strum(to_string = "Digest attribute holds no values")]
    EmptyDigests,
    /// The digest attribute does not match the encapsulated content hash.
    #[strum(to_string = "Digest attribute does not match the encapsulated content")]
    ContentDigestMismatch,
    /// The algorithm string matches no entry of the supported table.
    #[strum(to_string = "{0} is not a valid signature algorithm")]
    UnknownAlgorithm(String),
    /// The algorithm string names a scheme we reject (RSA-PSS).
    #[strum(to_string = "{0} is not a supported signature algorithm")]
    UnsupportedAlgorithm(String),
    /// The certificate public key does not match the declared algorithm.
    #[strum(to_string = "Certificate key does not match the declared algorithm")]
    KeyTypeMismatch,
    /// The SOD signature did not verify.
    #[strum(to_string = "Signature validation failed")]
    SignatureInvalid,
    /// The encapsulated content is not a valid LDS security object.
    #[strum(to_string = "Malformed LDS security object")]
    MalformedSecurityObject,
    /// The configured master list contains no certificates.
    #[strum(to_string = "Master list contains no certificates")]
    EmptyMasterList,
    /// The document-signer certificate does not chain to a trusted root.
    #[strum(to_string = "Certificate does not chain to a trusted root")]
    UntrustedCertificate,
    /// The crypto backend failed.
    #[strum(to_string = "Crypto backend failure")]
    CryptoBackend,
}

impl pverror::PvError for EmrtdError {}

/// Type alias for [`pverror::Result`] values returned by the crate's API.
pub type Result<T> = pverror::Result<T, EmrtdError>;
