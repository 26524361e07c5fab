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

//! Decoding of the Security Object fragments submitted with a passport
//! presentation: the signed-attribute SET and the encapsulated LDS security
//! object carrying the data-group octet strings.

use der::{
    asn1::{Any, ObjectIdentifier, OctetString, SetOfVec},
    Decode, Encode, Sequence,
};
use pverror::{
    traits::{ErrorContext as _, ForeignError as _},
    Error,
};

use crate::{EmrtdError, Result, SignatureAlgorithm};

/// An attribute of the signed-attribute SET whose values are digest octet
/// strings.  The message-digest attribute of a SOD has this shape.
#[derive(Sequence)]
struct DigestAttribute {
    kind: ObjectIdentifier,
    values: SetOfVec<OctetString>,
}

/// The LDS security object carried as the encapsulated content, per ICAO
/// 9303 part 10: a version, the digest algorithm identifier and the list of
/// data-group hash entries.
#[derive(Sequence)]
#[allow(dead_code)]
struct LdsSecurityObject {
    version: u8,
    digest_algorithm: Any,
    data_group_hash_values: Vec<DataGroupHash>,
}

#[derive(Sequence)]
#[allow(dead_code)]
struct DataGroupHash {
    data_group_number: u8,
    data_group_hash_value: OctetString,
}

/// The two data-group octet strings a registration proof binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncapsulatedData {
    dg1: Vec<u8>,
    dg2: Vec<u8>,
}

impl EncapsulatedData {
    /// The DG1 octet string (first data-group entry).
    pub fn dg1(&self) -> &[u8] {
        &self.dg1
    }

    /// The DG2 octet string (second data-group entry).
    pub fn dg2(&self) -> &[u8] {
        &self.dg2
    }
}

/// Decoded view over the SOD fragments of a request.
#[derive(Debug)]
pub struct SecurityObject {
    signed_attributes: Vec<u8>,
    attributes: Vec<Any>,
    encapsulated_content: Vec<u8>,
}

impl SecurityObject {
    /// Decode the hex-encoded signed attributes and encapsulated content.
    ///
    /// The signed attributes must parse as a non-empty DER `SET OF`
    /// attributes.
    pub fn from_hex(signed_attributes: &str, encapsulated_content: &str) -> Result<Self> {
        let signed_attributes = hex::decode(signed_attributes)
            .foreign_err(|| EmrtdError::InvalidHex)
            .ctx(|| "signed attributes")?;
        let encapsulated_content = hex::decode(encapsulated_content)
            .foreign_err(|| EmrtdError::InvalidHex)
            .ctx(|| "encapsulated content")?;

        let attributes = SetOfVec::<Any>::from_der(&signed_attributes)
            .foreign_err(|| EmrtdError::MalformedAsn1)
            .ctx(|| "signed attributes")?;
        if attributes.is_empty() {
            return Err(Error::root(EmrtdError::EmptyAttributes));
        }

        Ok(Self {
            signed_attributes,
            attributes: attributes.into_vec(),
            encapsulated_content,
        })
    }

    /// The raw signed-attribute bytes, as signed by the document signer.
    pub fn signed_attributes(&self) -> &[u8] {
        &self.signed_attributes
    }

    /// Check that the digest attribute commits to the encapsulated content.
    ///
    /// The last attribute of the SET is the digest attribute; its first
    /// digest value must equal the hash of the encapsulated content under
    /// the algorithm's digest family.
    pub fn verify_content_digest(&self, algorithm: SignatureAlgorithm) -> Result<()> {
        // non-emptiness is checked at construction
        let last = self.attributes.last().expect("attributes are non-empty");

        let encoded = last.to_der().foreign_err(|| EmrtdError::MalformedAsn1)?;
        let attribute = DigestAttribute::from_der(&encoded)
            .foreign_err(|| EmrtdError::MalformedAsn1)
            .ctx(|| "digest attribute")?;

        let digest = attribute
            .values
            .as_slice()
            .first()
            .ok_or_else(|| Error::root(EmrtdError::EmptyDigests))?;

        if digest.as_bytes() != algorithm.digest(&self.encapsulated_content).as_slice() {
            return Err(Error::root(EmrtdError::ContentDigestMismatch)
                .ctx(format!("attribute {}", attribute.kind)));
        }

        Ok(())
    }

    /// Parse the encapsulated content as an LDS security object and expose
    /// its first two data-group octet strings.
    pub fn encapsulated_data(&self) -> Result<EncapsulatedData> {
        let security_object = LdsSecurityObject::from_der(&self.encapsulated_content)
            .foreign_err(|| EmrtdError::MalformedSecurityObject)?;

        let mut groups = security_object.data_group_hash_values.into_iter();
        let (Some(first), Some(second)) = (groups.next(), groups.next()) else {
            return Err(Error::root(EmrtdError::MalformedSecurityObject)
                .ctx("fewer than two data-group entries"));
        };

        Ok(EncapsulatedData {
            dg1: first.data_group_hash_value.into_bytes(),
            dg2: second.data_group_hash_value.into_bytes(),
        })
    }
}
