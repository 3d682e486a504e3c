//! Certificate record extraction.

use jiff::Zoned;

use crate::{
    csr::CertificateSigningRequest,
    error::Error,
    extensions::{self, ExtensionSummary},
    x509::{DistinguishedName, ParsedCertificate},
};

/// Status value the backend stores in place of a certificate when the
/// request was turned down.
const REJECTED: &str = "rejected";

/// The fields of an issued certificate the CA and request tables display.
///
/// A superset of [`CertificateSigningRequest`]: subject plus issuer,
/// validity window, and the extension summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Certificate {
    pub subject: DistinguishedName,
    pub issuer: DistinguishedName,
    /// Start of the validity window, zone annotation stripped.
    pub not_before: String,
    /// End of the validity window, zone annotation stripped.
    pub not_after: String,
    pub sans_dns: Vec<String>,
    pub sans_ip: Vec<String>,
    pub is_ca: bool,
}

impl Certificate {
    /// The subject fields viewed as a request record, for side-by-side
    /// comparison against the originating CSR.
    #[must_use]
    pub fn as_request(&self) -> CertificateSigningRequest {
        CertificateSigningRequest {
            subject: self.subject.clone(),
            sans_dns: self.sans_dns.clone(),
            sans_ip: self.sans_ip.clone(),
            is_ca: self.is_ca,
        }
    }
}

/// Decodes a PEM certificate into the record the tables display.
///
/// The empty string and the literal `"rejected"` both mean "no certificate
/// exists for this request" and return `Ok(None)`; anything else must parse
/// or the error propagates to the caller.
pub fn extract_certificate(pem: &str) -> Result<Option<Certificate>, Error> {
    if pem.is_empty() || pem == REJECTED {
        return Ok(None);
    }

    let parsed: ParsedCertificate = ParsedCertificate::parse_pem(pem)?;

    let subject: DistinguishedName = parsed.subject.to_fields()?;
    let issuer: DistinguishedName = parsed.issuer.to_fields()?;
    let summary: ExtensionSummary = extensions::parse_extensions(&parsed.extensions)?;

    Ok(Some(Certificate {
        subject,
        issuer,
        not_before: display_timestamp(&parsed.validity.not_before),
        not_after: display_timestamp(&parsed.validity.not_after),
        sans_dns: summary.sans_dns,
        sans_ip: summary.sans_ip,
        is_ca: summary.is_ca,
    }))
}

/// Formats a validity bound for display.
fn display_timestamp(timestamp: &Zoned) -> String {
    strip_zone_annotation(&timestamp.strftime("%Y-%m-%d %H:%M:%S %Z").to_string())
}

/// Removes a trailing parenthesized zone name, e.g.
/// `"... 00:00:00 GMT+0000 (Coordinated Universal Time)"` loses everything
/// from the opening parenthesis on.
fn strip_zone_annotation(timestamp: &str) -> String {
    if let Some(idx) = timestamp.rfind('(')
        && timestamp.ends_with(')')
        && timestamp.len() - idx > 2
    {
        timestamp[..idx].trim_end().to_string()
    } else {
        timestamp.to_string()
    }
}
