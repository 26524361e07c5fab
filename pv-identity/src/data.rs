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

//! The claim repository over SQLite.
//!
//! All writes happen inside [`ClaimsDb::transaction`], which opens an
//! immediate transaction: SQLite takes the database write lock up front, so
//! concurrent issuances for the same document serialize exactly as the
//! row-level `FOR UPDATE` locks of a server database would force them to.
//! Any error inside the scope rolls the transaction back.
//!
//! The scope borrows the [`Claims`] handle, which holds the exclusive
//! connection borrow; that keeps the scope future `Send` while issuer calls
//! are awaited between statements.

use std::{future::Future, path::Path, pin::Pin};

use chrono::{DateTime, NaiveDateTime, Utc};
use pverror::{
    traits::{ErrorContext as _, ForeignError as _},
    Error,
};
use rusqlite::{params_from_iter, Connection, Row};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{error::ServiceError, resources::UserAddress};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS claims (
    id            TEXT PRIMARY KEY,
    user_id       TEXT NOT NULL,
    user_did      TEXT NOT NULL,
    issuer_did    TEXT NOT NULL,
    user_address  TEXT NOT NULL,
    document_hash TEXT NOT NULL,
    created_at    TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
";

const COLUMNS: &str = "id, user_id, user_did, issuer_did, user_address, document_hash, created_at";

/// A persisted claim row.
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    /// Claim id, as returned by the issuer.
    pub id: Uuid,
    /// Caller-supplied user id.
    pub user_id: Uuid,
    /// The subject's DID.
    pub user_did: String,
    /// DID of the minting issuer.
    pub issuer_did: String,
    /// The caller's blockchain address.
    pub user_address: UserAddress,
    /// Decimal document fingerprint.
    pub document_hash: String,
    /// Insertion timestamp; defaulted by the database on insert.
    pub created_at: DateTime<Utc>,
}

/// The filterable columns of the claim table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimColumn {
    /// The claim id.
    Id,
    /// The caller-supplied user id.
    UserId,
    /// The subject DID.
    UserDid,
    /// The issuer DID.
    IssuerDid,
    /// The blockchain address.
    UserAddress,
    /// The document fingerprint.
    DocumentHash,
}

impl ClaimColumn {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::UserId => "user_id",
            Self::UserDid => "user_did",
            Self::IssuerDid => "issuer_did",
            Self::UserAddress => "user_address",
            Self::DocumentHash => "document_hash",
        }
    }
}

/// Boxed future returned by a transaction scope.
pub type ScopedFuture<'c, T> =
    Pin<Box<dyn Future<Output = Result<T, Error<ServiceError>>> + Send + 'c>>;

/// Handle over the claims database.
pub struct ClaimsDb {
    conn: Mutex<Connection>,
}

impl ClaimsDb {
    /// Open (creating if needed) the claims database at `path`.
    pub fn open(path: &Path) -> Result<Self, Error<ServiceError>> {
        let conn = Connection::open(path)
            .foreign_err(|| ServiceError::SystemFailed)
            .ctx(|| path.display().to_string())?;
        Self::initialize(conn)
    }

    /// Open a fresh in-memory database.
    pub fn in_memory() -> Result<Self, Error<ServiceError>> {
        let conn =
            Connection::open_in_memory().foreign_err(|| ServiceError::SystemFailed)?;
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> Result<Self, Error<ServiceError>> {
        conn.execute_batch(SCHEMA)
            .foreign_err(|| ServiceError::SystemFailed)
            .ctx(|| "creating the claims table")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `scope` inside a writer-serializing transaction.
    ///
    /// The transaction commits when the scope returns `Ok` and rolls back on
    /// any error.  No retry is attempted here; a busy database surfaces as a
    /// system failure.
    pub async fn transaction<T, F>(&self, scope: F) -> Result<T, Error<ServiceError>>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut Claims<'_>) -> ScopedFuture<'c, T> + Send,
    {
        let mut conn = self.conn.lock().await;
        conn.execute_batch("BEGIN IMMEDIATE")
            .foreign_err(|| ServiceError::SystemFailed)
            .ctx(|| "opening a claims transaction")?;

        let mut claims = Claims::new(&mut conn);
        let outcome = scope(&mut claims).await;
        drop(claims);

        match outcome {
            Ok(value) => {
                conn.execute_batch("COMMIT")
                    .foreign_err(|| ServiceError::SystemFailed)
                    .ctx(|| "committing a claims transaction")?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback) = conn.execute_batch("ROLLBACK") {
                    tracing::warn!("failed to roll back a claims transaction: {rollback}");
                }
                Err(error)
            }
        }
    }

    #[cfg(test)]
    pub(crate) async fn snapshot(&self) -> Vec<Claim> {
        let mut conn = self.conn.lock().await;
        let mut claims = Claims::new(&mut conn);
        claims.query().select().unwrap()
    }

    #[cfg(test)]
    pub(crate) async fn backdate(&self, id: Uuid, created_at: &str) {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE claims SET created_at = ?1 WHERE id = ?2",
            rusqlite::params![created_at, id.to_string()],
        )
        .unwrap();
    }
}

/// The claim operations available inside a transaction scope.
pub struct Claims<'c> {
    conn: &'c mut Connection,
}

impl<'c> Claims<'c> {
    fn new(conn: &'c mut Connection) -> Self {
        Self { conn }
    }

    /// Start a filterable select over the claim table.
    pub fn query(&mut self) -> ClaimQuery<'_> {
        ClaimQuery {
            conn: &*self.conn,
            filters: Vec::new(),
        }
    }

    /// Insert a claim row.  `created_at` is defaulted by the database.
    pub fn insert(&mut self, claim: &Claim) -> Result<(), Error<ServiceError>> {
        self.conn
            .execute(
                "INSERT INTO claims (id, user_id, user_did, issuer_did, user_address, document_hash)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    claim.id.to_string(),
                    claim.user_id.to_string(),
                    claim.user_did,
                    claim.issuer_did,
                    claim.user_address.to_string(),
                    claim.document_hash,
                ],
            )
            .foreign_err(|| ServiceError::SystemFailed)
            .ctx(|| "inserting a claim")?;

        Ok(())
    }

    /// Delete the claim row with the given id.
    pub fn delete_by_id(&mut self, id: Uuid) -> Result<(), Error<ServiceError>> {
        self.conn
            .execute(
                "DELETE FROM claims WHERE id = ?1",
                rusqlite::params![id.to_string()],
            )
            .foreign_err(|| ServiceError::SystemFailed)
            .ctx(|| "deleting a claim")?;

        Ok(())
    }
}

/// A chainable select over the claim table; filters compose by conjunction.
pub struct ClaimQuery<'q> {
    conn: &'q Connection,
    filters: Vec<(ClaimColumn, String)>,
}

impl ClaimQuery<'_> {
    /// Add an equality filter.
    pub fn filter_by(mut self, column: ClaimColumn, value: impl Into<String>) -> Self {
        self.filters.push((column, value.into()));
        self
    }

    /// Drop all filters accumulated so far.
    pub fn reset_filter(mut self) -> Self {
        self.filters.clear();
        self
    }

    /// Request row-level locking for the rows this select touches.
    ///
    /// The SQLite backend holds the database write lock for the whole
    /// immediate transaction, so no locking clause is emitted; the call
    /// records intent for backends with row-level locks.
    pub fn for_update(self) -> Self {
        self
    }

    /// Fetch all matching rows.
    pub fn select(self) -> Result<Vec<Claim>, Error<ServiceError>> {
        let (sql, values) = self.render();

        let mut statement = self
            .conn
            .prepare(&sql)
            .foreign_err(|| ServiceError::SystemFailed)?;
        let rows = statement
            .query_map(params_from_iter(values.iter()), claim_from_row)
            .foreign_err(|| ServiceError::SystemFailed)?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .foreign_err(|| ServiceError::SystemFailed)
            .ctx(|| "reading claim rows")
    }

    /// Fetch at most one matching row.
    pub fn get(self) -> Result<Option<Claim>, Error<ServiceError>> {
        Ok(self.select()?.into_iter().next())
    }

    fn render(&self) -> (String, Vec<String>) {
        let mut sql = format!("SELECT {COLUMNS} FROM claims");
        let mut values = Vec::with_capacity(self.filters.len());

        for (position, (column, value)) in self.filters.iter().enumerate() {
            sql.push_str(if position == 0 { " WHERE " } else { " AND " });
            sql.push_str(column.as_str());
            sql.push_str(&format!(" = ?{}", position + 1));
            values.push(value.clone());
        }

        (sql, values)
    }
}

fn claim_from_row(row: &Row<'_>) -> rusqlite::Result<Claim> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let user_address: String = row.get(4)?;
    let created_at: String = row.get(6)?;

    Ok(Claim {
        id: Uuid::parse_str(&id).map_err(|error| conversion_error(0, error))?,
        user_id: Uuid::parse_str(&user_id).map_err(|error| conversion_error(1, error))?,
        user_did: row.get(2)?,
        issuer_did: row.get(3)?,
        user_address: user_address
            .parse::<UserAddress>()
            .map_err(|error| conversion_error(4, error))?,
        document_hash: row.get(5)?,
        created_at: NaiveDateTime::parse_from_str(&created_at, "%Y-%m-%d %H:%M:%S")
            .map_err(|error| conversion_error(6, error))?
            .and_utc(),
    })
}

fn conversion_error(
    index: usize,
    error: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, error.into())
}
