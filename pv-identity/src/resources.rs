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

//! The request and response shapes of the identity API.

use pv_zkid::ZkProof;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::IssuedClaim;

/// The request envelope of the create-identity call.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIdentityRequest {
    /// The request payload.
    pub data: CreateIdentityRequestData,
}

/// The create-identity payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIdentityRequestData {
    /// The caller's decentralized identifier.
    pub id: String,
    /// The Groth16 registration proof with its public signals.
    pub zkproof: ZkProof,
    /// Caller-supplied user identifier, opaque to the pipeline.
    pub user_id: Uuid,
    /// The caller's blockchain address.
    pub user_address: UserAddress,
    /// The passport Security Object fragments.
    pub document_sod: DocumentSod,
}

/// The SOD fragments of a passport presentation.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSod {
    /// Hex-encoded signed attributes.
    pub signed_attributes: String,
    /// Free-form algorithm string carrying the hash and signature tokens.
    pub algorithm: String,
    /// Hex-encoded raw signature.
    pub signature: String,
    /// PEM-encoded document-signer certificate.
    pub pem_file: String,
    /// Hex-encoded encapsulated content.
    pub encapsulated_content: String,
}

/// A 20-byte blockchain address, rendered as `0x`-prefixed hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserAddress([u8; 20]);

impl UserAddress {
    /// The raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl std::str::FromStr for UserAddress {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let digits = input
            .strip_prefix("0x")
            .ok_or_else(|| format!("address {input:?} lacks the 0x prefix"))?;
        let bytes = hex::decode(digits).map_err(|error| format!("address {input:?}: {error}"))?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| format!("address {input:?} is not 20 bytes"))?;

        Ok(Self(bytes))
    }
}

impl std::fmt::Display for UserAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for UserAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

impl Serialize for UserAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// The response envelope of a successful issuance.
#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    /// The issued claim resource.
    pub data: ClaimResource,
}

/// The issued claim as a JSON-API style resource.
#[derive(Debug, Serialize)]
pub struct ClaimResource {
    /// Resource identifier, the claim id.
    pub id: String,
    /// Resource type, always `claims`.
    #[serde(rename = "type")]
    pub kind: String,
    /// The claim attributes.
    pub attributes: ClaimAttributes,
}

/// Attributes of an issued claim.
#[derive(Debug, Serialize)]
pub struct ClaimAttributes {
    /// Identifier of the freshly minted claim.
    pub claim_id: String,
    /// DID of the minting issuer.
    pub issuer_did: String,
    /// The requester's user id; present only when a prior claim for the
    /// same document was revoked during this call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl From<IssuedClaim> for ClaimResponse {
    fn from(issued: IssuedClaim) -> Self {
        Self {
            data: ClaimResource {
                id: issued.claim_id.clone(),
                kind: "claims".to_owned(),
                attributes: ClaimAttributes {
                    claim_id: issued.claim_id,
                    issuer_did: issued.issuer_did,
                    user_id: issued.revoked_user_id.map(|id| id.to_string()),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_envelope_deserializes() {
        let request: CreateIdentityRequest = serde_json::from_value(serde_json::json!({
            "data": {
                "id": "did:iden3:user",
                "zkproof": {
                    "proof": {
                        "pi_a": ["1", "2", "1"],
                        "pi_b": [["1", "0"], ["2", "0"], ["1", "0"]],
                        "pi_c": ["1", "2", "1"],
                        "protocol": "groth16"
                    },
                    "pub_signals": ["1", "2", "3"]
                },
                "user_id": "67f3d16a-4c43-4b71-9d67-7c2bf7b1a311",
                "user_address": "0x00112233445566778899aabbccddeeff00112233",
                "document_sod": {
                    "signed_attributes": "3100",
                    "algorithm": "sha256WithRSAEncryption",
                    "signature": "00",
                    "pem_file": "-----BEGIN CERTIFICATE-----",
                    "encapsulated_content": "00"
                }
            }
        }))
        .unwrap();

        assert_eq!(request.data.id, "did:iden3:user");
        assert_eq!(
            request.data.user_address.to_string(),
            "0x00112233445566778899aabbccddeeff00112233"
        );
        assert_eq!(request.data.document_sod.algorithm, "sha256WithRSAEncryption");
    }

    #[test]
    fn bad_addresses_are_rejected() {
        for address in [
            "00112233445566778899aabbccddeeff00112233",   // no prefix
            "0x00112233445566778899aabbccddeeff001122",   // short
            "0x00112233445566778899aabbccddeeff0011223344", // long
            "0xzz112233445566778899aabbccddeeff00112233", // not hex
        ] {
            assert!(address.parse::<UserAddress>().is_err());
        }
    }

    #[test]
    fn user_id_attribute_is_omitted_when_absent() {
        let response = ClaimResponse::from(IssuedClaim {
            claim_id: "b7f1c7b2-3a69-4e86-9f34-1d2f0a3c4d5e".to_owned(),
            issuer_did: "did:iden3:issuer".to_owned(),
            revoked_user_id: None,
        });

        let rendered = serde_json::to_value(&response).unwrap();
        assert_eq!(rendered["data"]["type"], "claims");
        assert!(rendered["data"]["attributes"]
            .as_object()
            .unwrap()
            .get("user_id")
            .is_none());

        let response = ClaimResponse::from(IssuedClaim {
            claim_id: "b7f1c7b2-3a69-4e86-9f34-1d2f0a3c4d5e".to_owned(),
            issuer_did: "did:iden3:issuer".to_owned(),
            revoked_user_id: Some(
                "67f3d16a-4c43-4b71-9d67-7c2bf7b1a311".parse().unwrap(),
            ),
        });
        let rendered = serde_json::to_value(&response).unwrap();
        assert_eq!(
            rendered["data"]["attributes"]["user_id"],
            "67f3d16a-4c43-4b71-9d67-7c2bf7b1a311"
        );
    }
}
