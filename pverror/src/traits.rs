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

//! Extension traits for converting and enriching errors on [`Result`] values.

use std::panic::Location;

use crate::{Error, PvError, Result};

/// Converts errors from outside our crates into [`Error`], keeping the
/// original error as the source.
///
/// Do *not* use this for values that are already [`Error`]; use
/// [`PropagateError`] for those so the chain stays typed.
pub trait ForeignError<T, S, E>
where
    S: std::error::Error + Send + Sync + 'static,
    E: PvError,
{
    /// Maps `Result<T, S>` to `Result<T, Error<E>>`, wrapping the foreign
    /// error as the source of `E`.
    fn foreign_err<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> E;
}

impl<T, S, E> ForeignError<T, S, E> for std::result::Result<T, S>
where
    S: std::error::Error + Send + Sync + 'static,
    E: PvError,
{
    #[track_caller]
    fn foreign_err<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> E,
    {
        let location = Location::caller();
        self.map_err(|source| Error::with_source(f(), Box::new(source)).log_warn(location))
    }
}

/// Propagates an [`Error`] of one concrete type as the source of another.
pub trait PropagateError<T, S, E>
where
    S: PvError,
    E: PvError,
{
    /// Maps `Result<T, Error<S>>` to `Result<T, Error<E>>` with a fixed
    /// target error.
    fn with_err<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> E;

    /// Maps `Result<T, Error<S>>` to `Result<T, Error<E>>`, choosing the
    /// target error by inspecting the source variant.
    fn match_err<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce(&S) -> E;
}

impl<T, S, E> PropagateError<T, S, E> for Result<T, S>
where
    S: PvError,
    E: PvError,
{
    fn with_err<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> E,
    {
        self.map_err(|source| Error::with_source(f(), Box::new(source)))
    }

    fn match_err<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce(&S) -> E,
    {
        self.map_err(|source| {
            let error = f(&source.error);
            Error::with_source(error, Box::new(source))
        })
    }
}

/// Attaches context to the error variant of a [`Result`].
pub trait ErrorContext<T, E>
where
    E: PvError,
{
    /// Adds lazily evaluated context to the [`Err`] variant.
    fn ctx<C, F>(self, f: F) -> Result<T, E>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ErrorContext<T, E> for Result<T, E>
where
    E: PvError,
{
    fn ctx<C, F>(self, f: F) -> Result<T, E>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| error.ctx(f()))
    }
}
