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

//! The RPC client of the external credential issuer.
//!
//! All calls go to `<base>/<issuer_did>` under HTTP basic auth.  Any
//! response status of 299 and above counts as a failure.

use std::future::Future;

use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use pverror::{
    traits::{ErrorContext as _, ForeignError as _},
    Error,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::IssuerConfig, error::ServiceError, resources::UserAddress};

/// The derived values a voting claim is minted from.
#[derive(Debug, Clone, PartialEq)]
pub struct VotingClaim {
    /// The subject's DID.
    pub user_did: String,
    /// The issuing-authority numeric code from the public signals.
    pub issuing_authority: i64,
    /// Adulthood flag; constant `true` in this deployment.
    pub is_adult: bool,
    /// Credential expiration from the public signals.
    pub expiration: DateTime<Utc>,
    /// The Poseidon document nullifier.
    pub document_nullifier: BigUint,
    /// The Poseidon credential hash.
    pub credential_hash: BigUint,
    /// Caller-supplied user id.
    pub user_id: Uuid,
    /// Caller-supplied blockchain address.
    pub user_address: UserAddress,
    /// Decimal document fingerprint keying the claim table.
    pub document_hash: String,
}

/// Trait that defines the interface for the credential issuer.
pub trait CredentialIssuer: Send + Sync {
    /// The DID credentials are minted under.
    fn did(&self) -> &str;

    /// Mint a voting credential; returns the new claim id.
    fn issue_voting_claim(
        &self,
        claim: &VotingClaim,
    ) -> impl Future<Output = Result<String, Error<ServiceError>>> + Send;

    /// Fetch a credential by claim id.
    fn get_credential(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<GetCredentialResponse, Error<ServiceError>>> + Send;

    /// Revoke a credential by its revocation nonce.
    fn revoke_claim(
        &self,
        nonce: i64,
    ) -> impl Future<Output = Result<(), Error<ServiceError>>> + Send;
}

/// The issuer's create-claim request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequest {
    /// Credential schema URL.
    pub credential_schema: String,
    /// Credential type.
    #[serde(rename = "type")]
    pub claim_type: String,
    /// The credential subject.
    pub credential_subject: CredentialSubject,
    /// Optional credential expiration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,
    /// Request a Merkle-tree proof.
    pub mt_proof: bool,
    /// Request a signature proof.
    pub signature_proof: bool,
}

/// The subject part of a [`CredentialRequest`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSubject {
    /// The subject's DID.
    pub id: String,
    /// Adulthood flag.
    pub is_adult: bool,
    /// Issuing-authority numeric code.
    pub issuing_authority: i64,
    /// The document nullifier, as a JSON number.
    pub document_nullifier: serde_json::Number,
    /// The credential hash, as a JSON number.
    pub credential_hash: serde_json::Number,
    /// The caller-supplied user id.
    #[serde(rename = "userid")]
    pub user_id: String,
    /// The document fingerprint.
    #[serde(rename = "f")]
    pub features: String,
    /// The caller's blockchain address.
    #[serde(rename = "pk")]
    pub user_address: String,
    /// Free-form metadata; constant `_` in this deployment.
    pub metadata: String,
}

/// The issuer's create-claim response body.
#[derive(Debug, Deserialize)]
pub struct UuidResponse {
    /// The new claim id.
    pub id: String,
}

/// A credential as returned by the issuer's read endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCredentialResponse {
    /// The claim id.
    pub id: String,
    /// Kinds of proofs the credential carries.
    #[serde(default)]
    pub proof_types: Vec<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Expiration timestamp.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether the credential has expired.
    #[serde(default)]
    pub expired: bool,
    /// Hash of the credential schema.
    #[serde(default)]
    pub schema_hash: String,
    /// Type of the credential schema.
    #[serde(default)]
    pub schema_type: String,
    /// URL of the credential schema.
    #[serde(default)]
    pub schema_url: String,
    /// Whether the credential is revoked.
    #[serde(default)]
    pub revoked: bool,
    /// The revocation status block.
    pub credential_status: CredentialStatus,
    /// The raw credential subject.
    #[serde(default)]
    pub credential_subject: serde_json::Value,
    /// The issuer-side user id.
    #[serde(default, rename = "userID")]
    pub user_id: String,
    /// Human-readable schema description.
    #[serde(default)]
    pub schema_type_description: String,
}

/// Revocation data of a credential.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialStatus {
    /// Nonce passed to the revoke endpoint.
    #[serde(rename = "revocationNonce")]
    pub revocation_nonce: i64,
}

/// [`CredentialIssuer`] implementation over the issuer's HTTP API.
pub struct IssuerClient {
    http: reqwest::Client,
    base_url: String,
    login: String,
    password: String,
    did: String,
    credential_schema: String,
    claim_type: String,
}

impl IssuerClient {
    /// Construct a client for the configured issuer.
    pub fn new(config: &IssuerConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{}/{}", config.base_url.trim_end_matches('/'), config.did),
            login: config.login.clone(),
            password: config.password.clone(),
            did: config.did.clone(),
            credential_schema: config.credential_schema.clone(),
            claim_type: config.claim_type.clone(),
        }
    }

    fn credential_request(
        &self,
        claim: &VotingClaim,
    ) -> Result<CredentialRequest, Error<ServiceError>> {
        Ok(CredentialRequest {
            credential_schema: self.credential_schema.clone(),
            claim_type: self.claim_type.clone(),
            credential_subject: CredentialSubject {
                id: claim.user_did.clone(),
                is_adult: claim.is_adult,
                issuing_authority: claim.issuing_authority,
                document_nullifier: json_number(&claim.document_nullifier)?,
                credential_hash: json_number(&claim.credential_hash)?,
                user_id: claim.user_id.to_string(),
                features: claim.document_hash.clone(),
                user_address: claim.user_address.to_string(),
                metadata: "_".to_owned(),
            },
            expiration: Some(claim.expiration),
            mt_proof: true,
            signature_proof: true,
        })
    }

    async fn check(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, Error<ServiceError>> {
        if response.status().as_u16() >= 299 {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::root(ServiceError::SystemFailed)
                .ctx(format!("issuer responded {status}: {body}")));
        }

        Ok(response)
    }
}

impl CredentialIssuer for IssuerClient {
    fn did(&self) -> &str {
        &self.did
    }

    fn issue_voting_claim(
        &self,
        claim: &VotingClaim,
    ) -> impl Future<Output = Result<String, Error<ServiceError>>> + Send {
        async move {
            let request = self.credential_request(claim)?;

            let response = self
                .http
                .post(format!("{}/claims", self.base_url))
                .basic_auth(&self.login, Some(&self.password))
                .json(&request)
                .send()
                .await
                .foreign_err(|| ServiceError::SystemFailed)
                .ctx(|| "issuer create claim")?;

            let body: UuidResponse = Self::check(response)
                .await?
                .json()
                .await
                .foreign_err(|| ServiceError::SystemFailed)
                .ctx(|| "issuer create claim response")?;

            Ok(body.id)
        }
    }

    fn get_credential(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<GetCredentialResponse, Error<ServiceError>>> + Send {
        async move {
            let response = self
                .http
                .get(format!("{}/claims/{}", self.base_url, id))
                .basic_auth(&self.login, Some(&self.password))
                .send()
                .await
                .foreign_err(|| ServiceError::SystemFailed)
                .ctx(|| "issuer get credential")?;

            Self::check(response)
                .await?
                .json()
                .await
                .foreign_err(|| ServiceError::SystemFailed)
                .ctx(|| "issuer credential response")
        }
    }

    fn revoke_claim(
        &self,
        nonce: i64,
    ) -> impl Future<Output = Result<(), Error<ServiceError>>> + Send {
        async move {
            let response = self
                .http
                .post(format!("{}/claims/revoke/{}", self.base_url, nonce))
                .basic_auth(&self.login, Some(&self.password))
                .send()
                .await
                .foreign_err(|| ServiceError::SystemFailed)
                .ctx(|| "issuer revoke claim")?;

            Self::check(response).await.map(|_| ())
        }
    }
}

fn json_number(value: &BigUint) -> Result<serde_json::Number, Error<ServiceError>> {
    value
        .to_string()
        .parse()
        .foreign_err(|| ServiceError::SystemFailed)
        .ctx(|| "encoding a field element as a JSON number")
}
