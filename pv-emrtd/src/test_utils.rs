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

//! Key, certificate and DER builders shared by the crate's tests.

use der::{
    asn1::{Any, ObjectIdentifier, OctetString, SetOfVec},
    Decode as _, Encode, Sequence,
};
use openssl::{
    asn1::Asn1Time,
    bn::BigNum,
    ec::{EcGroup, EcKey},
    hash::MessageDigest,
    nid::Nid,
    pkey::{PKey, Private},
    rsa::Rsa,
    x509::{extension::BasicConstraints, X509NameBuilder, X509},
};

use crate::DsCertificate;

/// OID of the CMS message-digest attribute.
pub(crate) const MESSAGE_DIGEST_OID: &str = "1.2.840.113549.1.9.4";
/// OID of the CMS content-type attribute.
pub(crate) const CONTENT_TYPE_OID: &str = "1.2.840.113549.1.9.3";

pub(crate) fn ec_key() -> PKey<Private> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
}

pub(crate) fn rsa_key() -> PKey<Private> {
    PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap()
}

/// A freshly generated RSA key and a self-signed certificate over it.
pub(crate) fn rsa_certificate() -> (PKey<Private>, DsCertificate) {
    let key = rsa_key();
    let certificate = build_certificate("rsa document signer", &key, None, false);
    (key, DsCertificate::from_x509(certificate))
}

/// A freshly generated EC key and a self-signed certificate over it.
pub(crate) fn ec_certificate() -> (PKey<Private>, DsCertificate) {
    let key = ec_key();
    let certificate = build_certificate("ec document signer", &key, None, false);
    (key, DsCertificate::from_x509(certificate))
}

/// A self-signed CA certificate with its key.
pub(crate) fn self_signed_ca(common_name: &str) -> (X509, PKey<Private>) {
    let key = ec_key();
    let certificate = build_certificate(common_name, &key, None, true);
    (certificate, key)
}

/// A leaf certificate over `key`, issued and signed by the given CA.
pub(crate) fn certificate_signed_by(
    common_name: &str,
    key: &PKey<Private>,
    issuer: &X509,
    issuer_key: &PKey<Private>,
) -> X509 {
    build_certificate(common_name, key, Some((issuer, issuer_key)), false)
}

fn build_certificate(
    common_name: &str,
    key: &PKey<Private>,
    issuer: Option<(&X509, &PKey<Private>)>,
    is_ca: bool,
) -> X509 {
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", common_name).unwrap();
    let name = name.build();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    match issuer {
        Some((issuer, _)) => builder.set_issuer_name(issuer.subject_name()).unwrap(),
        None => builder.set_issuer_name(&name).unwrap(),
    }
    builder.set_pubkey(key).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(365).unwrap())
        .unwrap();
    if is_ca {
        builder
            .append_extension(BasicConstraints::new().critical().ca().build().unwrap())
            .unwrap();
    }

    let signing_key = issuer.map(|(_, key)| key).unwrap_or(key);
    builder.sign(signing_key, MessageDigest::sha256()).unwrap();
    builder.build()
}

#[derive(Sequence)]
struct TestAttribute {
    kind: ObjectIdentifier,
    values: SetOfVec<OctetString>,
}

/// Encode a DER `SET OF Attribute` where each attribute carries one octet
/// string value.  The SET is sorted per DER, as a real CMS signer would.
pub(crate) fn encode_attribute_set(attributes: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let encoded: Vec<Any> = attributes
        .iter()
        .map(|(oid, value)| {
            let attribute = TestAttribute {
                kind: ObjectIdentifier::new_unwrap(oid),
                values: SetOfVec::try_from(vec![OctetString::new(value.clone()).unwrap()])
                    .unwrap(),
            };
            Any::from_der(&attribute.to_der().unwrap()).unwrap()
        })
        .collect();

    SetOfVec::try_from(encoded).unwrap().to_der().unwrap()
}

#[derive(Sequence)]
struct TestLdsObject {
    version: u8,
    digest_algorithm: Any,
    data_group_hash_values: Vec<TestDataGroupHash>,
}

#[derive(Sequence)]
struct TestDataGroupHash {
    data_group_number: u8,
    data_group_hash_value: OctetString,
}

/// Encode an LDS security object with two data-group entries.
pub(crate) fn encode_lds_object(dg1: &[u8], dg2: &[u8]) -> Vec<u8> {
    encode_lds(&[dg1, dg2])
}

/// Encode an LDS security object with a single data-group entry.
pub(crate) fn encode_lds_object_single(dg1: &[u8]) -> Vec<u8> {
    encode_lds(&[dg1])
}

fn encode_lds(groups: &[&[u8]]) -> Vec<u8> {
    let object = TestLdsObject {
        version: 0,
        // ASN.1 NULL standing in for the digest AlgorithmIdentifier
        digest_algorithm: Any::from_der(&[0x05, 0x00]).unwrap(),
        data_group_hash_values: groups
            .iter()
            .enumerate()
            .map(|(index, value)| TestDataGroupHash {
                data_group_number: index as u8 + 1,
                data_group_hash_value: OctetString::new(*value).unwrap(),
            })
            .collect(),
    };

    object.to_der().unwrap()
}
