//! Object identifier registry.
//!
//! Maps the dotted-decimal OIDs this dashboard encounters to display names.
//! Lookups of an absent OID fail with [`Error::UnknownOid`]; subject-field
//! resolution treats that as fatal, extension resolution catches it and
//! skips the extension (see `extensions.rs`).

use crate::error::Error;

/// Display names for known attribute and extension OIDs.
///
/// Subject attributes per RFC 5280 section 4.1.2.4 and RFC 4519, plus the
/// certificate extensions the dashboard summarizes or deliberately passes
/// over.
const REGISTRY: &[(&str, &str)] = &[
    // X.500 attribute types
    ("2.5.4.3", "Common Name"),
    ("2.5.4.4", "Surname"),
    ("2.5.4.5", "Serial Number"),
    ("2.5.4.6", "Country"),
    ("2.5.4.7", "Locality"),
    ("2.5.4.8", "State or Province"),
    ("2.5.4.9", "Street Address"),
    ("2.5.4.10", "Organization"),
    ("2.5.4.11", "Organizational Unit"),
    ("2.5.4.12", "Title"),
    ("2.5.4.13", "Description"),
    ("2.5.4.15", "Business Category"),
    ("2.5.4.17", "Postal Code"),
    ("2.5.4.42", "Given Name"),
    ("2.5.4.43", "Initials"),
    ("2.5.4.44", "Generation Qualifier"),
    ("2.5.4.46", "DN Qualifier"),
    ("2.5.4.65", "Pseudonym"),
    // PKCS #9
    ("1.2.840.113549.1.9.1", "Email Address"),
    ("1.2.840.113549.1.9.14", "Extension Request"),
    // pilot attribute types (RFC 4519)
    ("0.9.2342.19200300.100.1.1", "User ID"),
    ("0.9.2342.19200300.100.1.25", "Domain Component"),
    // certificate extensions (RFC 5280 section 4.2)
    ("2.5.29.14", "Subject Key Identifier"),
    ("2.5.29.15", "Key Usage"),
    ("2.5.29.17", "Subject Alternative Name"),
    ("2.5.29.19", "Basic Constraint"),
    ("2.5.29.31", "CRL Distribution Points"),
    ("2.5.29.35", "Authority Key Identifier"),
    ("2.5.29.37", "Extended Key Usage"),
];

/// Resolves a dotted-decimal OID to its display name.
pub(crate) fn display_name(oid: &str) -> Result<&'static str, Error> {
    REGISTRY
        .iter()
        .find(|(dotted, _)| *dotted == oid)
        .map(|(_, name)| *name)
        .ok_or_else(|| Error::UnknownOid(oid.to_string()))
}
