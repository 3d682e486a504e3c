//! PKCS#10 certification request decoding.
//!
//! # References
//!
//! - [RFC 2986](https://datatracker.ietf.org/doc/html/rfc2986)

use crate::{
    der::{Class, Identifier, Tlv},
    error::Error,
    extensions::{self, ExtensionSummary},
    x509::{self, DistinguishedName, Name, ParsedCertificate, RawExtension, SubjectPublicKeyInfo},
};

/// PKCS #9 extensionRequest
const EXTENSION_REQUEST_OID: &str = "1.2.840.113549.1.9.14";

/// The fields of a signing request the request tables display.
///
/// Built fresh on every [`parse_csr`] call and immutable once returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateSigningRequest {
    pub subject: DistinguishedName,
    /// SAN DNS entries in order of appearance.
    pub sans_dns: Vec<String>,
    /// SAN IP entries in order of appearance, octets rendered as dotted
    /// unsigned decimals.
    pub sans_ip: Vec<String>,
    /// Basic Constraint CA flag from the extension request, `false` when
    /// absent.
    pub is_ca: bool,
}

/// A decoded CertificationRequest, before field extraction.
#[derive(Debug, Clone)]
pub(crate) struct ParsedCsr {
    pub(crate) subject: Name,
    pub(crate) spki: SubjectPublicKeyInfo,
    pub(crate) extensions: Vec<RawExtension>,
}

impl ParsedCsr {
    pub fn parse_pem(pem: &str) -> Result<Self, Error> {
        let der: Vec<u8> = crate::pem::pem_to_der(pem)?;
        Self::parse_der(&der)
    }

    /// ```text
    /// CertificationRequest ::= SEQUENCE {
    ///      certificationRequestInfo CertificationRequestInfo,
    ///      signatureAlgorithm       AlgorithmIdentifier,
    ///      signature                BIT STRING }
    ///
    /// CertificationRequestInfo ::= SEQUENCE {
    ///      version       INTEGER { v1(0) },
    ///      subject       Name,
    ///      subjectPKInfo SubjectPublicKeyInfo,
    ///      attributes    [0] IMPLICIT Attributes }
    /// ```
    pub fn parse_der(der: &[u8]) -> Result<Self, Error> {
        let (remain, request) =
            Tlv::read_expected(Identifier::SEQUENCE, "CertificationRequest", der)?;

        if !remain.is_empty() {
            return Err(Error::parse(
                "CertificationRequest",
                format_args!("contains {} bytes of extra data", remain.len()),
            ));
        }

        let (_, info) = Tlv::read_expected(
            Identifier::SEQUENCE,
            "CertificationRequest.certificationRequestInfo",
            &request.content,
        )?;
        // signatureAlgorithm and signature trail the info sequence; the
        // request's own signature is not checked here, matching the rest of
        // the dashboard's read-only treatment of submitted artifacts

        let (b, _version) = Tlv::read_expected(
            Identifier::INTEGER,
            "CertificationRequest.certificationRequestInfo.version",
            &info.content,
        )?;

        let (b, subject) =
            Name::read("CertificationRequest.certificationRequestInfo.subject", b)?;

        let (b, spki) = SubjectPublicKeyInfo::read(
            "CertificationRequest.certificationRequestInfo.subjectPKInfo",
            b,
        )?;

        let extensions: Vec<RawExtension> = if b.is_empty() {
            Vec::new()
        } else {
            let name: &str = "CertificationRequest.certificationRequestInfo.attributes";
            let (extra, attributes) = Tlv::read(name, b)?;

            if !extra.is_empty() {
                return Err(Error::parse(
                    name,
                    format_args!("contains {} bytes of extra data", extra.len()),
                ));
            }

            // attributes [0] IMPLICIT SET OF Attribute
            if attributes.identifier.class != Class::ContextSpecific
                || u8::from(attributes.identifier.tag) != 0
            {
                return Err(Error::parse(
                    name,
                    format_args!("expected [0] got {:?}", attributes.identifier),
                ));
            }

            Self::extension_request(name, &attributes.content)?
        };

        Ok(Self {
            subject,
            spki,
            extensions,
        })
    }

    /// Walks `Attribute ::= SEQUENCE { type OBJECT IDENTIFIER, values SET }`
    /// entries, keeping only the Extension Request payload.
    fn extension_request(name: &str, mut b: &[u8]) -> Result<Vec<RawExtension>, Error> {
        let mut extensions: Vec<RawExtension> = Vec::new();
        let mut n: usize = 0;

        while !b.is_empty() {
            let attr_name: String = format!("{name}[{n}]");
            let (local_b, attribute) = Tlv::read_expected(Identifier::SEQUENCE, &attr_name, b)?;
            b = local_b;
            n += 1;

            let (values_b, attr_oid) =
                crate::der::ObjectIdentifier::read(&format!("{attr_name}.type"), &attribute.content)?;

            let (extra, values) =
                Tlv::read_expected(Identifier::SET, &format!("{attr_name}.values"), values_b)?;

            if !extra.is_empty() {
                return Err(Error::parse(
                    &attr_name,
                    format_args!("contains {} bytes of extra data", extra.len()),
                ));
            }

            if attr_oid.dotted() == EXTENSION_REQUEST_OID {
                extensions = x509::read_extensions(
                    &format!("{attr_name}.extensionRequest"),
                    &values.content,
                )?;
            }
        }

        Ok(extensions)
    }
}

/// Decodes a PEM CSR into the record the request tables display.
///
/// Pure and idempotent; the same input yields a field-for-field identical
/// record every call.
pub fn parse_csr(pem: &str) -> Result<CertificateSigningRequest, Error> {
    let parsed: ParsedCsr = ParsedCsr::parse_pem(pem)?;

    let subject: DistinguishedName = parsed.subject.to_fields()?;
    let summary: ExtensionSummary = extensions::parse_extensions(&parsed.extensions)?;

    Ok(CertificateSigningRequest {
        subject,
        sans_dns: summary.sans_dns,
        sans_ip: summary.sans_ip,
        is_ca: summary.is_ca,
    })
}

/// The form-validation check: does this text decode as a CSR at all?
#[must_use]
pub fn csr_is_valid(pem: &str) -> bool {
    parse_csr(pem).is_ok()
}

/// `true` when the certificate was issued for the CSR's key.
///
/// Compares the raw SubjectPublicKeyInfo bytes of both artifacts. Unparseable
/// input is a mismatch, not an error; submission is blocked either way.
#[must_use]
pub fn csr_matches_certificate(csr_pem: &str, cert_pem: &str) -> bool {
    let csr: ParsedCsr = match ParsedCsr::parse_pem(csr_pem) {
        Ok(csr) => csr,
        Err(_) => return false,
    };

    let certificate: ParsedCertificate = match ParsedCertificate::parse_pem(cert_pem) {
        Ok(certificate) => certificate,
        Err(_) => return false,
    };

    csr.spki.raw == certificate.spki.raw
}
