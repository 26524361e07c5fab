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

//! Document-signer certificate handling and validation against the
//! country-signing master list.

use openssl::{
    error::ErrorStack,
    pkey::{PKey, Public},
    stack::Stack,
    x509::{store::X509StoreBuilder, X509StoreContext, X509},
};
use pverror::{
    traits::{ErrorContext as _, ForeignError as _},
    Error,
};

use crate::{EmrtdError, Result};

/// The document-signer (DS) certificate offered with a request.
pub struct DsCertificate(X509);

impl DsCertificate {
    /// Decode the certificate from a PEM block.
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let certificate = X509::from_pem(pem).foreign_err(|| EmrtdError::InvalidPem)?;
        Ok(Self(certificate))
    }

    pub(crate) fn public_key(&self) -> Result<PKey<Public>> {
        self.0
            .public_key()
            .foreign_err(|| EmrtdError::CryptoBackend)
            .ctx(|| "certificate public key")
    }

    #[cfg(test)]
    pub(crate) fn from_x509(certificate: X509) -> Self {
        Self(certificate)
    }
}

/// The pool of trusted country-signing (CSCA) root certificates.
pub struct MasterList {
    roots: Vec<X509>,
}

impl MasterList {
    /// Build the root pool from a concatenated PEM bundle.
    pub fn from_pem(bundle: &[u8]) -> Result<Self> {
        let roots = X509::stack_from_pem(bundle).foreign_err(|| EmrtdError::InvalidPem)?;

        if roots.is_empty() {
            return Err(Error::root(EmrtdError::EmptyMasterList));
        }

        Ok(Self { roots })
    }

    /// Verify that the document-signer certificate chains to a root of the
    /// pool.
    ///
    /// Requests carry no intermediates, so the leaf must be issued directly
    /// by one of the trusted roots.  The store is built with default
    /// verification options; master lists routinely contain certificates
    /// that fail strict profile checks.
    pub fn verify(&self, certificate: &DsCertificate) -> Result<()> {
        let mut builder = X509StoreBuilder::new().foreign_err(|| EmrtdError::CryptoBackend)?;
        for root in &self.roots {
            builder
                .add_cert(root.clone())
                .foreign_err(|| EmrtdError::CryptoBackend)?;
        }
        let store = builder.build();

        let untrusted = Stack::new().foreign_err(|| EmrtdError::CryptoBackend)?;

        let mut context = X509StoreContext::new().foreign_err(|| EmrtdError::CryptoBackend)?;
        let valid = context
            .init(&store, &certificate.0, &untrusted, |context| {
                drain_error_stack(|| context.verify_cert())
            })
            .foreign_err(|| EmrtdError::CryptoBackend)?;

        if !valid {
            return Err(Error::root(EmrtdError::UntrustedCertificate).ctx(format!(
                "OpenSSL error on depth {}: {}",
                context.error_depth(),
                context.error()
            )));
        }

        Ok(())
    }
}

/// Run an OpenSSL call and clear whatever it left on the thread-local error
/// stack, so a "soft" failure inside verification does not leak into later
/// unrelated calls.
fn drain_error_stack<T>(
    f: impl FnOnce() -> std::result::Result<T, ErrorStack>,
) -> std::result::Result<T, ErrorStack> {
    let value = f()?;
    drop(ErrorStack::get());
    Ok(value)
}
