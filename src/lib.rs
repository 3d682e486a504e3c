//! Client-side X.509 and PKCS#10 inspection for the Notary dashboard.
//!
//! The dashboard's tables and forms hand raw PEM text to this crate and get
//! back display records and validation verdicts:
//!
//! - [`parse_csr`] / [`csr_is_valid`] decode a certificate signing request
//!   into the fields the request table shows.
//! - [`extract_certificate`] does the same for issued certificates, with
//!   `Ok(None)` standing in for the "no certificate yet" and "rejected"
//!   states.
//! - [`split_bundle`] and [`csr_matches_certificate`] gate the certificate
//!   submission form.
//! - [`validate_bundle`] and [`ChainValidator`] check an uploaded bundle's
//!   internal chain of trust without blocking the caller.
//!
//! All parsing is synchronous and pure; chain validation is the one
//! asynchronous operation.

mod cert;
mod chain;
mod csr;
mod der;
mod error;
mod extensions;
mod oid;
mod pem;
mod x509;

pub use cert::{Certificate, extract_certificate};
pub use chain::{ChainValidator, validate_bundle};
pub use csr::{CertificateSigningRequest, csr_is_valid, csr_matches_certificate, parse_csr};
pub use error::Error;
pub use crate::pem::{pem_to_der, split_bundle};
pub use x509::DistinguishedName;
