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

//! The vault-backed source of the secret blinder.
//!
//! The blinder is a process-wide secret scalar mixed into every Poseidon
//! derivation; rotating it invalidates the fingerprint-based uniqueness
//! lookups, which is accepted as a deployment-level concern.

use std::future::Future;

use num_bigint::BigUint;
use pverror::{
    traits::{ErrorContext as _, ForeignError as _},
    Error,
};
use serde::Deserialize;

use crate::{config::VaultConfig, error::ServiceError};

/// Trait that defines the interface for a blinder source.
pub trait BlinderSource: Send + Sync {
    /// Fetches the secret blinder.
    fn blinder(&self)
        -> impl Future<Output = Result<BigUint, Error<ServiceError>>> + Send;
}

/// [`BlinderSource`] implementation reading a KV-v2 secret from a vault.
pub struct VaultClient {
    http: reqwest::Client,
    secret_url: String,
    token: String,
}

impl VaultClient {
    /// Construct a client for the configured vault.
    pub fn new(config: &VaultConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_url: format!(
                "{}/v1/{}",
                config.address.trim_end_matches('/'),
                config.secret_path.trim_start_matches('/')
            ),
            token: config.token.clone(),
        }
    }
}

#[derive(Deserialize)]
struct SecretResponse {
    data: SecretEnvelope,
}

#[derive(Deserialize)]
struct SecretEnvelope {
    data: SecretData,
}

#[derive(Deserialize)]
struct SecretData {
    blinder: String,
}

impl BlinderSource for VaultClient {
    fn blinder(&self)
        -> impl Future<Output = Result<BigUint, Error<ServiceError>>> + Send
    {
        async move {
            let response = self
                .http
                .get(&self.secret_url)
                .header("X-Vault-Token", &self.token)
                .send()
                .await
                .foreign_err(|| ServiceError::SystemFailed)
                .ctx(|| "vault request")?;

            if !response.status().is_success() {
                return Err(Error::root(ServiceError::SystemFailed)
                    .ctx(format!("vault responded {}", response.status())));
            }

            let secret: SecretResponse = response
                .json()
                .await
                .foreign_err(|| ServiceError::SystemFailed)
                .ctx(|| "vault response body")?;

            BigUint::parse_bytes(secret.data.data.blinder.as_bytes(), 10).ok_or_else(|| {
                Error::root(ServiceError::SystemFailed)
                    .ctx("vault blinder is not a decimal integer")
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_v2_response_shape_deserializes() {
        let secret: SecretResponse = serde_json::from_value(serde_json::json!({
            "request_id": "5ed05e6c-6cb7-4b6f-9b1d-2cbed9067f4b",
            "lease_duration": 0,
            "data": {
                "data": {
                    "blinder": "1234567890123456789012345678901234567890"
                },
                "metadata": {
                    "version": 1
                }
            }
        }))
        .unwrap();

        assert_eq!(
            secret.data.data.blinder,
            "1234567890123456789012345678901234567890"
        );
    }
}
