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

//! Environment-based service configuration, gathered once at startup and
//! immutable afterwards.

use std::path::PathBuf;

use pverror::{
    traits::{ErrorContext as _, ForeignError as _},
    Error,
};

use crate::error::ServiceError;

/// The service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP listener binds to.
    pub listen: String,
    /// Path of the SQLite claims database.
    pub database: PathBuf,
    /// Path of the concatenated CSCA master-certificate PEM bundle.
    pub master_certs: PathBuf,
    /// Path of the SHA1-family Groth16 verification key JSON.
    pub verification_key_sha1: PathBuf,
    /// Path of the SHA256-family Groth16 verification key JSON.
    pub verification_key_sha256: PathBuf,
    /// Minimum age a registration proof must demonstrate.
    pub allowed_age: i64,
    /// Optional re-registration window; a prior claim younger than this
    /// rejects the request.  Unset means no rate limit.
    pub registration_timeout: Option<chrono::Duration>,
    /// Credential issuer settings.
    pub issuer: IssuerConfig,
    /// Vault settings for the blinder secret.
    pub vault: VaultConfig,
}

/// Settings of the external credential issuer.
#[derive(Debug, Clone)]
pub struct IssuerConfig {
    /// Base URL of the issuer API, without the issuer DID segment.
    pub base_url: String,
    /// DID of the minting issuer.
    pub did: String,
    /// HTTP basic auth login.
    pub login: String,
    /// HTTP basic auth password.
    pub password: String,
    /// Credential schema URL sent with every claim request.
    pub credential_schema: String,
    /// Credential type sent with every claim request.
    pub claim_type: String,
}

/// Settings of the vault exposing the blinder.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Vault base address.
    pub address: String,
    /// Vault token.
    pub token: String,
    /// Path of the KV secret holding the blinder.
    pub secret_path: String,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, Error<ServiceError>> {
        Ok(Self {
            listen: var("IDP_LISTEN")?,
            database: var("IDP_DATABASE")?.into(),
            master_certs: var("IDP_MASTER_CERTS")?.into(),
            verification_key_sha1: var("IDP_VERIFICATION_KEY_SHA1")?.into(),
            verification_key_sha256: var("IDP_VERIFICATION_KEY_SHA256")?.into(),
            allowed_age: parse(&var("IDP_ALLOWED_AGE")?, "IDP_ALLOWED_AGE")?,
            registration_timeout: var_opt("IDP_REGISTRATION_TIMEOUT")
                .map(|seconds| {
                    parse(&seconds, "IDP_REGISTRATION_TIMEOUT")
                        .map(chrono::Duration::seconds)
                })
                .transpose()?,
            issuer: IssuerConfig {
                base_url: var("ISSUER_BASE_URL")?,
                did: var("ISSUER_DID")?,
                login: var("ISSUER_LOGIN")?,
                password: var("ISSUER_PASSWORD")?,
                credential_schema: var("ISSUER_CREDENTIAL_SCHEMA")?,
                claim_type: var("ISSUER_CLAIM_TYPE")?,
            },
            vault: VaultConfig {
                address: var("VAULT_ADDR")?,
                token: var("VAULT_TOKEN")?,
                secret_path: var("VAULT_SECRET_PATH")?,
            },
        })
    }
}

fn var(name: &str) -> Result<String, Error<ServiceError>> {
    std::env::var(name)
        .foreign_err(|| ServiceError::SystemFailed)
        .ctx(|| name.to_owned())
}

fn var_opt(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse(value: &str, name: &str) -> Result<i64, Error<ServiceError>> {
    value
        .parse()
        .foreign_err(|| ServiceError::SystemFailed)
        .ctx(|| format!("{name}={value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_environment_parses() {
        let variables = [
            ("IDP_LISTEN", "127.0.0.1:8000"),
            ("IDP_DATABASE", "/var/lib/idp/claims.db"),
            ("IDP_MASTER_CERTS", "/etc/idp/masters.pem"),
            ("IDP_VERIFICATION_KEY_SHA1", "/etc/idp/vk_sha1.json"),
            ("IDP_VERIFICATION_KEY_SHA256", "/etc/idp/vk_sha256.json"),
            ("IDP_ALLOWED_AGE", "18"),
            ("IDP_REGISTRATION_TIMEOUT", "3600"),
            ("ISSUER_BASE_URL", "https://issuer.example.com/v1"),
            ("ISSUER_DID", "did:iden3:issuer"),
            ("ISSUER_LOGIN", "login"),
            ("ISSUER_PASSWORD", "password"),
            ("ISSUER_CREDENTIAL_SCHEMA", "https://schemas.example.com/voting.json"),
            ("ISSUER_CLAIM_TYPE", "VotingCredential"),
            ("VAULT_ADDR", "https://vault.example.com"),
            ("VAULT_TOKEN", "token"),
            ("VAULT_SECRET_PATH", "secret/data/idp"),
        ];
        for (name, value) in variables {
            std::env::set_var(name, value);
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.listen, "127.0.0.1:8000");
        assert_eq!(config.allowed_age, 18);
        assert_eq!(
            config.registration_timeout,
            Some(chrono::Duration::seconds(3600))
        );
        assert_eq!(config.issuer.did, "did:iden3:issuer");
        assert_eq!(config.vault.secret_path, "secret/data/idp");

        std::env::remove_var("IDP_REGISTRATION_TIMEOUT");
        let config = Config::from_env().unwrap();
        assert_eq!(config.registration_timeout, None);
    }
}
