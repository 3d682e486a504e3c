use std::fmt;

/// Errors produced by the decode and parse layers.
///
/// A bundle that parses but fails chain validation is not an error: it is
/// reported as a message string by [`validate_bundle`](crate::validate_bundle).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// PEM framing or the base64 payload could not be decoded.
    Decode(String),
    /// DER bytes do not match the expected ASN.1 schema.
    Parse(String),
    /// An object identifier with no registry entry, in dotted-decimal form.
    UnknownOid(String),
}

impl Error {
    pub(crate) fn parse(name: &str, reason: impl fmt::Display) -> Self {
        Self::Parse(format!("{name}: {reason}"))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Decode(reason) => write!(f, "PEM decode failed: {reason}"),
            Error::Parse(reason) => write!(f, "DER parse failed: {reason}"),
            Error::UnknownOid(oid) => write!(f, "unknown object identifier {oid}"),
        }
    }
}

impl std::error::Error for Error {}
