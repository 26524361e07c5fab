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

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Error handling shared by the identity-provider crates.
//!
//! Fallible functions return [`Result<T, E>`] where `E` is a concrete error
//! enum implementing the [`PvError`] marker trait.  The enum is wrapped in
//! [`Error<E>`], which carries optional context strings and the source error
//! it was created from, so the full failure chain survives propagation
//! across crate boundaries.
//!
//! Root errors are created with [`Error::root`].  Errors coming from outside
//! our crates are attached as sources with
//! [`ForeignError::foreign_err`][traits::ForeignError::foreign_err]; errors
//! that are already an [`Error`] are translated between layers with
//! [`PropagateError::with_err`][traits::PropagateError::with_err] or
//! [`PropagateError::match_err`][traits::PropagateError::match_err].  Every
//! constructed error is logged as a warning with its caller location.
//!
//! ```
//! use pverror::traits::{ErrorContext, ForeignError};
//!
//! #[derive(Debug)]
//! enum ParseError {
//!     NotANumber,
//! }
//!
//! impl std::fmt::Display for ParseError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "input is not a number")
//!     }
//! }
//!
//! impl pverror::PvError for ParseError {}
//!
//! fn parse(input: &str) -> pverror::Result<u32, ParseError> {
//!     input
//!         .parse()
//!         .foreign_err(|| ParseError::NotANumber)
//!         .ctx(|| format!("parsing {input:?}"))
//! }
//!
//! assert!(parse("12").is_ok());
//! assert!(parse("twelve").is_err());
//! ```

use std::panic::Location;

pub mod traits;

/// Marker trait every concrete error enum must implement to be usable with
/// [`Error`].
pub trait PvError: std::fmt::Display + Send + Sync + 'static {}

/// The [`std::result::Result`] alias wrapping the error into [`Error`].
pub type Result<T, E> = std::result::Result<T, Error<E>>;

/// Error wrapper carrying a concrete [`PvError`], optional context and the
/// source error it was constructed from.
///
/// The [`std::fmt::Display`] implementation prints only the top-level error;
/// [`std::fmt::Debug`] renders the whole chain and is what ends up in the
/// logs.
pub struct Error<E>
where
    E: PvError,
{
    /// The concrete error variant.
    pub error: E,
    context: Vec<Box<dyn std::fmt::Display + Send + Sync>>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl<E> Error<E>
where
    E: PvError,
{
    /// Create an error with no source and log it as a warning.
    ///
    /// Use this where a failure is detected for the first time.  To
    /// propagate an existing error, use the
    /// [`traits::ForeignError`]/[`traits::PropagateError`] extensions
    /// instead, so the source chain is preserved.
    #[track_caller]
    pub fn root(error: E) -> Self {
        Self {
            error,
            context: Vec::new(),
            source: None,
        }
        .log_warn(Location::caller())
    }

    pub(crate) fn with_source(
        error: E,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self {
            error,
            context: Vec::new(),
            source: Some(source),
        }
    }

    /// Attach further context to the error.  May be called repeatedly; all
    /// contexts are kept and rendered in the log output.
    pub fn ctx<C>(mut self, context: C) -> Self
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.context.push(Box::new(context));
        self
    }

    pub(crate) fn log_warn(self, location: &Location<'_>) -> Self {
        log::warn!(target: &location.to_string(), "{:?}", self);
        self
    }
}

impl<E> std::error::Error for Error<E>
where
    E: PvError,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_deref().map(|source| source as _)
    }
}

// Only the top-level error.
impl<E> std::fmt::Display for Error<E>
where
    E: PvError,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

// The whole chain, e.g.:
// `signature verification failed [algorithm SHA256withRSA] <- bad key type`.
impl<E> std::fmt::Debug for Error<E>
where
    E: PvError,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)?;

        if !self.context.is_empty() {
            write!(f, " [")?;
            for (position, context) in self.context.iter().enumerate() {
                if position > 0 {
                    write!(f, "; ")?;
                }
                write!(f, "{}", context)?;
            }
            write!(f, "]")?;
        }

        let mut source = std::error::Error::source(self);
        while let Some(error) = source {
            write!(f, " <- {}", error)?;
            source = error.source();
        }

        Ok(())
    }
}
