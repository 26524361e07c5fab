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

//! The HTTP surface: the route table, the error-to-problem mapping and the
//! service bootstrap.

use std::{path::Path, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use pv_emrtd::MasterList;
use pv_zkid::VerifierKeys;
use pverror::{
    traits::{ErrorContext as _, ForeignError as _, PropagateError as _},
    Error,
};
use serde::Serialize;

use crate::{
    config::Config,
    data::ClaimsDb,
    error::ServiceError,
    identity::IdentityService,
    issuer::IssuerClient,
    resources::{ClaimResponse, CreateIdentityRequest},
    vault::VaultClient,
};

/// The service with its production collaborators.
pub type Service = IdentityService<IssuerClient, VaultClient>;

/// Build the route table over the service.
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route("/v1/identities", post(create_identity))
        .with_state(service)
}

async fn create_identity(
    State(service): State<Arc<Service>>,
    Json(request): Json<CreateIdentityRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let issued = service.create_identity(&request.data, Utc::now()).await?;
    Ok(Json(ClaimResponse::from(issued)))
}

/// A failure rendered as an HTTP problem.
pub(crate) struct ApiError(Error<ServiceError>);

impl From<Error<ServiceError>> for ApiError {
    fn from(error: Error<ServiceError>) -> Self {
        Self(error)
    }
}

#[derive(Serialize)]
struct Problem {
    status: u16,
    title: &'static str,
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, title) = match self.0.error {
            ServiceError::InputMalformed | ServiceError::CryptoFailed => {
                (StatusCode::BAD_REQUEST, "bad_request")
            }
            ServiceError::SystemFailed => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
            ServiceError::RateLimited => {
                (StatusCode::TOO_MANY_REQUESTS, "too_many_requests")
            }
        };

        let problem = Problem {
            status: status.as_u16(),
            title,
            detail: self.0.to_string(),
        };

        (status, Json(problem)).into_response()
    }
}

/// Load the configuration, assemble the service and serve until shutdown.
pub async fn run() -> Result<(), Error<ServiceError>> {
    let config = Config::from_env()?;

    let master_list = MasterList::from_pem(&read_file(&config.master_certs)?)
        .match_err(ServiceError::from_emrtd)?;
    let verifier_keys = VerifierKeys::from_json(
        &read_text(&config.verification_key_sha1)?,
        &read_text(&config.verification_key_sha256)?,
    )
    .match_err(ServiceError::from_zkid)?;
    let claims = ClaimsDb::open(&config.database)?;
    let issuer = IssuerClient::new(&config.issuer);
    let vault = VaultClient::new(&config.vault);

    let service = Arc::new(IdentityService::new(
        issuer,
        vault,
        claims,
        master_list,
        verifier_keys,
        config.allowed_age,
        config.registration_timeout,
    ));

    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .foreign_err(|| ServiceError::SystemFailed)
        .ctx(|| config.listen.clone())?;
    tracing::info!("listening on {}", config.listen);

    axum::serve(listener, router(service))
        .await
        .foreign_err(|| ServiceError::SystemFailed)
}

fn read_file(path: &Path) -> Result<Vec<u8>, Error<ServiceError>> {
    std::fs::read(path)
        .foreign_err(|| ServiceError::SystemFailed)
        .ctx(|| path.display().to_string())
}

fn read_text(path: &Path) -> Result<String, Error<ServiceError>> {
    std::fs::read_to_string(path)
        .foreign_err(|| ServiceError::SystemFailed)
        .ctx(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error: ServiceError) -> StatusCode {
        ApiError(Error::root(error)).into_response().status()
    }

    #[test]
    fn error_kinds_map_to_problem_statuses() {
        assert_eq!(status_of(ServiceError::InputMalformed), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ServiceError::CryptoFailed), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(ServiceError::SystemFailed),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(ServiceError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
    }
}
