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

//! The identity-issuance pipeline.
//!
//! An accepted request passes, in order: SOD decoding, content-digest
//! binding, SOD signature verification, document-signer chain validation,
//! the Groth16 gate, public-signal checks, and hash derivation.  The
//! resulting claim is then issued inside a single database transaction that
//! first revokes every prior claim anchored to the same document
//! fingerprint.  The first failing stage aborts the request.

use chrono::{DateTime, Utc};
use pv_emrtd::{DsCertificate, MasterList, SecurityObject, SignatureAlgorithm};
use pv_zkid::{hash, verify_registration_proof, PubSignals, VerifierKeys};
use pverror::{
    traits::{ErrorContext as _, ForeignError as _, PropagateError as _},
    Error,
};
use uuid::Uuid;

use crate::{
    data::{Claim, ClaimColumn, Claims, ClaimsDb},
    error::ServiceError,
    issuer::{CredentialIssuer, VotingClaim},
    resources::CreateIdentityRequestData,
    vault::BlinderSource,
};

/// The result of a successful issuance.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedClaim {
    /// Identifier of the freshly minted claim.
    pub claim_id: String,
    /// DID of the minting issuer.
    pub issuer_did: String,
    /// Set when a prior claim for the same document was revoked during this
    /// call.
    pub revoked_user_id: Option<Uuid>,
}

/// The identity-issuance service.
///
/// All configuration (master list, verification keys, issuer and vault
/// clients, age and rate-limit policy) is fixed at construction; requests
/// share it without further synchronization.
pub struct IdentityService<I, B> {
    issuer: I,
    blinders: B,
    claims: ClaimsDb,
    master_list: MasterList,
    verifier_keys: VerifierKeys,
    allowed_age: i64,
    registration_timeout: Option<chrono::Duration>,
}

impl<I, B> IdentityService<I, B>
where
    I: CredentialIssuer,
    B: BlinderSource,
{
    /// Assemble the service from its collaborators.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        issuer: I,
        blinders: B,
        claims: ClaimsDb,
        master_list: MasterList,
        verifier_keys: VerifierKeys,
        allowed_age: i64,
        registration_timeout: Option<chrono::Duration>,
    ) -> Self {
        Self {
            issuer,
            blinders,
            claims,
            master_list,
            verifier_keys,
            allowed_age,
            registration_timeout,
        }
    }

    /// Verify a passport presentation and issue the voting identity claim.
    ///
    /// `now` is the server's notion of the current instant; the public
    /// signals must encode its UTC date exactly.
    pub async fn create_identity(
        &self,
        request: &CreateIdentityRequestData,
        now: DateTime<Utc>,
    ) -> Result<IssuedClaim, Error<ServiceError>> {
        let sod = &request.document_sod;

        let algorithm =
            SignatureAlgorithm::parse(&sod.algorithm).match_err(ServiceError::from_emrtd)?;
        let object = SecurityObject::from_hex(&sod.signed_attributes, &sod.encapsulated_content)
            .match_err(ServiceError::from_emrtd)?;
        object
            .verify_content_digest(algorithm)
            .match_err(ServiceError::from_emrtd)?;

        let certificate = DsCertificate::from_pem(sod.pem_file.as_bytes())
            .match_err(ServiceError::from_emrtd)?;
        let signature = hex::decode(&sod.signature)
            .foreign_err(|| ServiceError::InputMalformed)
            .ctx(|| "signature")?;
        algorithm
            .verify(&certificate, object.signed_attributes(), &signature)
            .match_err(ServiceError::from_emrtd)?;
        self.master_list
            .verify(&certificate)
            .match_err(ServiceError::from_emrtd)?;

        let key = self.verifier_keys.for_family(algorithm.hash_family());
        verify_registration_proof(&request.zkproof, key).match_err(ServiceError::from_zkid)?;

        let data = object.encapsulated_data().match_err(ServiceError::from_emrtd)?;
        let signals =
            PubSignals::new(&request.zkproof.pub_signals).match_err(ServiceError::from_zkid)?;
        signals
            .require_dg1_binding(data.dg1())
            .match_err(ServiceError::from_zkid)?;
        signals
            .require_current_date(now)
            .match_err(ServiceError::from_zkid)?;
        signals
            .require_minimum_age(self.allowed_age)
            .match_err(ServiceError::from_zkid)?;
        let expiration = signals.expiration().match_err(ServiceError::from_zkid)?;
        let issuing_authority = signals
            .issuing_authority()
            .match_err(ServiceError::from_zkid)?;

        let blinder = self.blinders.blinder().await?;
        let nullifier = hash::document_nullifier(data.dg2(), &blinder)
            .match_err(ServiceError::from_zkid)?;
        let credential_hash = hash::credential_hash(issuing_authority, &nullifier)
            .match_err(ServiceError::from_zkid)?;
        let document_hash = hash::document_fingerprint(object.signed_attributes(), &blinder)
            .match_err(ServiceError::from_zkid)?
            .to_string();

        let claim = VotingClaim {
            user_did: request.id.clone(),
            issuing_authority,
            is_adult: true,
            expiration,
            document_nullifier: nullifier,
            credential_hash,
            user_id: request.user_id,
            user_address: request.user_address,
            document_hash: document_hash.clone(),
        };

        self.claims
            .transaction(move |db| {
                Box::pin(async move {
                    let stale = db
                        .query()
                        .filter_by(ClaimColumn::DocumentHash, document_hash.clone())
                        .for_update()
                        .select()?;

                    let mut revoked_user_id = None;
                    for prior in stale {
                        if let Some(window) = self.registration_timeout {
                            if now < prior.created_at + window {
                                return Err(Error::root(ServiceError::RateLimited).ctx(
                                    format!(
                                        "claim {} created at {}",
                                        prior.id, prior.created_at
                                    ),
                                ));
                            }
                        }

                        revoked_user_id = Some(claim.user_id);
                        self.revoke_stale_claim(db, &prior).await?;
                    }

                    // A credential minted here but not recorded below stays
                    // minted remotely; the rollback undoes only local rows.
                    let claim_id = self.issuer.issue_voting_claim(&claim).await?;
                    let id = Uuid::parse_str(&claim_id)
                        .foreign_err(|| ServiceError::SystemFailed)
                        .ctx(|| "issuer returned a non-uuid claim id")?;

                    db.insert(&Claim {
                        id,
                        user_id: claim.user_id,
                        user_did: claim.user_did.clone(),
                        issuer_did: self.issuer.did().to_owned(),
                        user_address: claim.user_address,
                        document_hash,
                        created_at: now,
                    })
                    .ctx(|| format!("claim {claim_id} stays minted at the issuer"))?;

                    Ok(IssuedClaim {
                        claim_id,
                        issuer_did: self.issuer.did().to_owned(),
                        revoked_user_id,
                    })
                })
            })
            .await
    }

    /// Revoke a prior claim at the issuer and drop its local row.
    ///
    /// A credential the issuer already reports as revoked is not revoked
    /// again; the row is deleted either way.
    async fn revoke_stale_claim(
        &self,
        db: &mut Claims<'_>,
        prior: &Claim,
    ) -> Result<(), Error<ServiceError>> {
        let credential = self.issuer.get_credential(prior.id).await?;

        if !credential.revoked {
            self.issuer
                .revoke_claim(credential.credential_status.revocation_nonce)
                .await?;
        }

        db.delete_by_id(prior.id)
    }
}
