//! X.509 certificate structures.
//!
//! # References
//!
//! - [RFC 5280](https://datatracker.ietf.org/doc/html/rfc5280)

use jiff::Zoned;
use p256::ecdsa::signature::Verifier as _;
use rsa::{pkcs1::DecodeRsaPublicKey as _, pkcs8::AssociatedOid};
use sha2::Digest;

use crate::{
    der::{Class, Identifier, ObjectIdentifier, Pc, Tlv},
    error::Error,
    oid,
};

/// The UI-facing subject or issuer fields of a certificate or CSR.
///
/// Attribute OIDs are resolved through the registry; an attribute whose OID
/// is unknown fails the whole extraction, while known attributes outside
/// this set (e.g. Serial Number) are accepted and dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    pub common_name: Option<String>,
    pub organization: Option<String>,
    pub organizational_unit: Option<String>,
    pub country: Option<String>,
    pub state_or_province: Option<String>,
    pub locality: Option<String>,
    pub email_address: Option<String>,
}

impl DistinguishedName {
    fn assign(&mut self, display_name: &str, value: String) {
        match display_name {
            "Common Name" => self.common_name = Some(value),
            "Organization" => self.organization = Some(value),
            "Organizational Unit" => self.organizational_unit = Some(value),
            "Country" => self.country = Some(value),
            "State or Province" => self.state_or_province = Some(value),
            "Locality" => self.locality = Some(value),
            "Email Address" => self.email_address = Some(value),
            _ => (),
        }
    }
}

/// # References
///
/// - [RFC 5280 Section 4.1.2.4](https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.2.4)
///
/// ```text
/// AttributeTypeAndValue ::= SEQUENCE {
///   type     AttributeType,
///   value    AttributeValue }
/// ```
#[derive(Debug, Clone)]
pub(crate) struct AttributeTypeAndValue {
    pub(crate) oid: ObjectIdentifier,
    pub(crate) value: String,
}

impl AttributeTypeAndValue {
    pub fn read<'a>(name: &str, b: &'a [u8]) -> Result<(&'a [u8], Self), Error> {
        let (b, oid) = ObjectIdentifier::read(&format!("{name}.type"), b)?;

        let value_name: String = format!("{name}.value");
        let (b, tlv) = Tlv::read(&value_name, b)?;

        if tlv.identifier.class != Class::Universal || tlv.identifier.pc != Pc::Primitive {
            return Err(Error::parse(
                &value_name,
                format_args!("expected a universal primitive string, got {:?}", tlv.identifier),
            ));
        }

        let value: String = tlv.string_value(&value_name)?;

        Ok((b, Self { oid, value }))
    }
}

/// # References
///
/// - [RFC 5280 Section 4.1.2.4](https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.2.4)
///
/// ```text
/// RDNSequence ::= SEQUENCE OF RelativeDistinguishedName
///
/// RelativeDistinguishedName ::=
///   SET SIZE (1..MAX) OF AttributeTypeAndValue
/// ```
#[derive(Debug, Clone)]
pub(crate) struct Name {
    /// Raw bytes of the whole Name TLV, for issuer/subject linkage checks.
    pub(crate) raw: Vec<u8>,
    pub(crate) attributes: Vec<AttributeTypeAndValue>,
}

impl Name {
    pub fn read<'a>(name: &str, b: &'a [u8]) -> Result<(&'a [u8], Self), Error> {
        let (remain, tlv, raw) = Tlv::read_raw(name, b)?;

        if tlv.identifier != Identifier::SEQUENCE {
            return Err(Error::parse(
                name,
                format_args!("expected SEQUENCE got {:?}", tlv.identifier),
            ));
        }

        let mut attributes: Vec<AttributeTypeAndValue> = Vec::new();

        let mut content: &[u8] = tlv.content.as_ref();
        let mut x: usize = 0;

        while !content.is_empty() {
            let rdn_name: String = format!("{name}.rdnSequence[{x}]");
            let (local_b, set) = Tlv::read_expected(Identifier::SET, &rdn_name, content)?;
            content = local_b;

            let mut set_b: &[u8] = set.content.as_ref();
            let mut y: usize = 0;

            while !set_b.is_empty() {
                let atav_name: String = format!("{rdn_name}[{y}]");
                let (local_b, seq) = Tlv::read_expected(Identifier::SEQUENCE, &atav_name, set_b)?;
                set_b = local_b;

                let (extra, atav) = AttributeTypeAndValue::read(&atav_name, &seq.content)?;
                if !extra.is_empty() {
                    return Err(Error::parse(
                        &atav_name,
                        format_args!("contains {} bytes of extra data", extra.len()),
                    ));
                }
                attributes.push(atav);
                y += 1;
            }

            x += 1;
        }

        Ok((
            remain,
            Self {
                raw: raw.to_vec(),
                attributes,
            },
        ))
    }

    /// Resolves every attribute OID through the registry and collects the
    /// record fields. An unknown OID here is fatal, unlike in extension
    /// parsing.
    pub fn to_fields(&self) -> Result<DistinguishedName, Error> {
        let mut fields: DistinguishedName = DistinguishedName::default();

        for atav in &self.attributes {
            let display_name: &str = oid::display_name(atav.oid.dotted())?;
            fields.assign(display_name, atav.value.clone());
        }

        Ok(fields)
    }
}

/// # References
///
/// - [RFC 5280 Section 4.1](https://datatracker.ietf.org/doc/html/rfc5280#section-4.1)
///
/// ```text
/// Validity ::= SEQUENCE {
///      notBefore      Time,
///      notAfter       Time }
/// ```
#[derive(Debug, Clone)]
pub(crate) struct Validity {
    pub(crate) not_before: Zoned,
    pub(crate) not_after: Zoned,
}

impl Validity {
    pub fn read<'a>(name: &str, b: &'a [u8]) -> Result<(&'a [u8], Self), Error> {
        let (remain, validity) = Tlv::read_expected(Identifier::SEQUENCE, name, b)?;

        let (b, not_before) = Tlv::read_time(&format!("{name}.notBefore"), &validity.content)?;
        let (b, not_after) = Tlv::read_time(&format!("{name}.notAfter"), b)?;

        if !b.is_empty() {
            return Err(Error::parse(
                name,
                format_args!("contains {} bytes of extra data", b.len()),
            ));
        }

        Ok((
            remain,
            Self {
                not_before,
                not_after,
            },
        ))
    }
}

/// # References
///
/// - [RFC 5280 Section 4.1.1.2](https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.1.2)
///
/// ```text
/// AlgorithmIdentifier  ::=  SEQUENCE  {
///     algorithm               OBJECT IDENTIFIER,
///     parameters              ANY DEFINED BY algorithm OPTIONAL  }
/// ```
#[derive(Debug, Clone)]
pub(crate) struct AlgorithmIdentifier {
    pub(crate) algorithm: ObjectIdentifier,
    pub(crate) parameters: Option<ObjectIdentifier>,
}

impl AlgorithmIdentifier {
    pub fn read<'a>(name: &str, b: &'a [u8]) -> Result<(&'a [u8], Self), Error> {
        let (remain, seq) = Tlv::read_expected(Identifier::SEQUENCE, name, b)?;

        let (b, algorithm) = ObjectIdentifier::read(&format!("{name}.algorithm"), &seq.content)?;

        let parameters: Option<ObjectIdentifier> = if b.is_empty() {
            None
        } else {
            let params_name: String = format!("{name}.parameters");
            let (b, parameters) = ObjectIdentifier::read_or_null(&params_name, b)?;

            if !b.is_empty() {
                return Err(Error::parse(
                    &params_name,
                    format_args!("contains {} bytes of extra data", b.len()),
                ));
            }

            parameters
        };

        Ok((
            remain,
            Self {
                algorithm,
                parameters,
            },
        ))
    }
}

/// # References
///
/// - [RFC 5280 Section 4.1](https://datatracker.ietf.org/doc/html/rfc5280#section-4.1)
///
/// ```text
/// SubjectPublicKeyInfo  ::=  SEQUENCE  {
///      algorithm            AlgorithmIdentifier,
///      subjectPublicKey     BIT STRING  }
/// ```
#[derive(Debug, Clone)]
pub(crate) struct SubjectPublicKeyInfo {
    /// The whole SubjectPublicKeyInfo TLV as it appeared on the wire.
    ///
    /// A CSR and the certificate issued from it share these bytes exactly;
    /// the key matcher compares them without decoding the key.
    pub(crate) raw: Vec<u8>,
    pub(crate) algorithm: AlgorithmIdentifier,
    /// BIT STRING contents, unused-bits octet included.
    pub(crate) subject_public_key: Vec<u8>,
}

impl SubjectPublicKeyInfo {
    pub fn read<'a>(name: &str, b: &'a [u8]) -> Result<(&'a [u8], Self), Error> {
        let (remain, tlv, raw) = Tlv::read_raw(name, b)?;

        if tlv.identifier != Identifier::SEQUENCE {
            return Err(Error::parse(
                name,
                format_args!("expected SEQUENCE got {:?}", tlv.identifier),
            ));
        }

        let (b, algorithm) = AlgorithmIdentifier::read(&format!("{name}.algorithm"), &tlv.content)?;
        let (b, bitstring) = Tlv::read_expected(
            Identifier::BITSTRING,
            &format!("{name}.subjectPublicKey"),
            b,
        )?;

        if !b.is_empty() {
            return Err(Error::parse(
                name,
                format_args!("contains {} bytes of extra data", b.len()),
            ));
        }

        Ok((
            remain,
            Self {
                raw: raw.to_vec(),
                algorithm,
                subject_public_key: bitstring.content,
            },
        ))
    }
}

/// A decoded public key usable for signature verification.
#[derive(Debug, Clone)]
pub(crate) enum PublicKey {
    Prime256v1(p256::ecdsa::VerifyingKey),
    Secp384r1(p384::ecdsa::VerifyingKey),
    Rsa(rsa::RsaPublicKey),
}

impl PublicKey {
    pub fn from_spki(spki: &SubjectPublicKeyInfo) -> Result<Self, Error> {
        const NAME: &str = "SubjectPublicKeyInfo";

        let key_bytes: &[u8] = spki
            .subject_public_key
            .get(1..)
            .ok_or_else(|| Error::parse(NAME, "subjectPublicKey contains no data"))?;

        match spki.algorithm.algorithm.dotted() {
            // ecPublicKey (ANSI X9.62 public key type)
            "1.2.840.10045.2.1" => match &spki.algorithm.parameters {
                // prime256v1 (ANSI X9.62 named elliptic curve)
                Some(params) if params.dotted() == "1.2.840.10045.3.1.7" => {
                    p256::ecdsa::VerifyingKey::from_sec1_bytes(key_bytes)
                        .map(PublicKey::Prime256v1)
                        .map_err(|e| {
                            Error::parse(NAME, format_args!("invalid prime256v1 key: {e}"))
                        })
                }
                // secp384r1 (SECG named elliptic curve)
                Some(params) if params.dotted() == "1.3.132.0.34" => {
                    p384::ecdsa::VerifyingKey::from_sec1_bytes(key_bytes)
                        .map(PublicKey::Secp384r1)
                        .map_err(|e| {
                            Error::parse(NAME, format_args!("invalid secp384r1 key: {e}"))
                        })
                }
                Some(params) => Err(Error::parse(
                    NAME,
                    format_args!("unrecognized named curve {params}"),
                )),
                None => Err(Error::parse(
                    NAME,
                    "parameters are required with the ecPublicKey algorithm",
                )),
            },
            // rsaEncryption (PKCS #1)
            "1.2.840.113549.1.1.1" => rsa::RsaPublicKey::from_pkcs1_der(key_bytes)
                .map(PublicKey::Rsa)
                .map_err(|e| Error::parse(NAME, format_args!("invalid RSA key: {e}"))),
            other => Err(Error::parse(
                NAME,
                format_args!("unrecognized public key algorithm {other}"),
            )),
        }
    }

    fn verify<D>(&self, to_verify: &[u8], signature: &[u8]) -> Result<(), String>
    where
        D: Digest + AssociatedOid,
    {
        match self {
            PublicKey::Prime256v1(verifying_key) => {
                let signature: p256::ecdsa::Signature = p256::ecdsa::Signature::from_der(signature)
                    .map_err(|_| "signature is not valid DER ECDSA".to_string())?;
                verifying_key
                    .verify(to_verify, &signature)
                    .map_err(|_| "prime256v1 signature verification failed".to_string())
            }
            PublicKey::Secp384r1(verifying_key) => {
                let signature: p384::ecdsa::Signature = p384::ecdsa::Signature::from_der(signature)
                    .map_err(|_| "signature is not valid DER ECDSA".to_string())?;
                verifying_key
                    .verify(to_verify, &signature)
                    .map_err(|_| "secp384r1 signature verification failed".to_string())
            }
            PublicKey::Rsa(public_key) => {
                let signature: rsa::pkcs1v15::Signature =
                    rsa::pkcs1v15::Signature::try_from(signature)
                        .map_err(|_| "signature is not valid RSA PKCS #1 v1.5".to_string())?;
                let verifying_key: rsa::pkcs1v15::VerifyingKey<D> =
                    rsa::pkcs1v15::VerifyingKey::new(public_key.clone());
                verifying_key
                    .verify(to_verify, &signature)
                    .map_err(|_| "RSA signature verification failed".to_string())
            }
        }
    }
}

/// One declared certificate extension, value still encoded.
///
/// # References
///
/// - [RFC 5280 Section 4.2](https://datatracker.ietf.org/doc/html/rfc5280#section-4.2)
///
/// ```text
/// Extension  ::=  SEQUENCE  {
///      extnID      OBJECT IDENTIFIER,
///      critical    BOOLEAN DEFAULT FALSE,
///      extnValue   OCTET STRING }
/// ```
#[derive(Debug, Clone)]
pub(crate) struct RawExtension {
    pub(crate) oid: ObjectIdentifier,
    pub(crate) critical: bool,
    pub(crate) value: Vec<u8>,
}

/// Reads `Extensions ::= SEQUENCE SIZE (1..MAX) OF Extension`.
///
/// Shared by the certificate walker (the `[3]` TBS slot) and the CSR
/// walker (the Extension Request attribute payload).
pub(crate) fn read_extensions(name: &str, b: &[u8]) -> Result<Vec<RawExtension>, Error> {
    let (remain, seq) = Tlv::read_expected(Identifier::SEQUENCE, name, b)?;

    if !remain.is_empty() {
        return Err(Error::parse(
            name,
            format_args!("contains {} bytes of extra data", remain.len()),
        ));
    }

    let mut extensions: Vec<RawExtension> = Vec::new();

    let mut b: &[u8] = &seq.content;
    let mut n: usize = 0;

    while !b.is_empty() {
        let ext_name: String = format!("{name}[{n}]");
        let (local_b, ext) = Tlv::read_expected(Identifier::SEQUENCE, &ext_name, b)?;
        b = local_b;

        let (ext_b, oid) = ObjectIdentifier::read(&format!("{ext_name}.extnID"), &ext.content)?;

        let (ext_b, maybe_bool) = Tlv::read_expected2(
            Identifier::BOOLEAN,
            Identifier::OCTETSTRING,
            &format!("{ext_name}.critical_or_extnValue"),
            ext_b,
        )?;

        let (critical, octetstring): (bool, Vec<u8>) = if maybe_bool.identifier
            == Identifier::BOOLEAN
        {
            let critical: bool = maybe_bool.bool_value(&format!("{ext_name}.critical"))?;

            let (ext_b, value) = Tlv::read_expected(
                Identifier::OCTETSTRING,
                &format!("{ext_name}.extnValue"),
                ext_b,
            )?;

            if !ext_b.is_empty() {
                return Err(Error::parse(
                    &ext_name,
                    format_args!("contains {} bytes of extra data", ext_b.len()),
                ));
            }

            (critical, value.content)
        } else {
            if !ext_b.is_empty() {
                return Err(Error::parse(
                    &ext_name,
                    format_args!("contains {} bytes of extra data", ext_b.len()),
                ));
            }
            (false, maybe_bool.content)
        };

        extensions.push(RawExtension {
            oid,
            critical,
            value: octetstring,
        });

        n += 1;
    }

    Ok(extensions)
}

/// A fully decoded certificate, with the raw byte ranges the key matcher
/// and chain validator need.
///
/// # References
///
/// - [RFC 5280 Section 4.1](https://datatracker.ietf.org/doc/html/rfc5280#section-4.1)
///
/// ```text
/// Certificate  ::=  SEQUENCE  {
///     tbsCertificate       TBSCertificate,
///     signatureAlgorithm   AlgorithmIdentifier,
///     signatureValue       BIT STRING  }
/// ```
#[derive(Debug, Clone)]
pub(crate) struct ParsedCertificate {
    /// Raw TBSCertificate TLV, the byte range the signature covers.
    pub(crate) tbs_raw: Vec<u8>,
    pub(crate) subject: Name,
    pub(crate) issuer: Name,
    pub(crate) validity: Validity,
    pub(crate) spki: SubjectPublicKeyInfo,
    pub(crate) extensions: Vec<RawExtension>,
    pub(crate) signature_algorithm: AlgorithmIdentifier,
    /// signatureValue BIT STRING contents, unused-bits octet included.
    pub(crate) signature_value: Vec<u8>,
}

impl ParsedCertificate {
    pub fn parse_pem(pem: &str) -> Result<Self, Error> {
        let der: Vec<u8> = crate::pem::pem_to_der(pem)?;
        Self::parse_der(&der)
    }

    pub fn parse_der(der: &[u8]) -> Result<Self, Error> {
        let (remain, certificate) = Tlv::read_expected(Identifier::SEQUENCE, "Certificate", der)?;

        if !remain.is_empty() {
            return Err(Error::parse(
                "Certificate",
                format_args!("contains {} bytes of extra data", remain.len()),
            ));
        }

        let (b, tbs, tbs_raw) = Tlv::read_raw("Certificate.tbsCertificate", &certificate.content)?;
        if tbs.identifier != Identifier::SEQUENCE {
            return Err(Error::parse(
                "Certificate.tbsCertificate",
                format_args!("expected SEQUENCE got {:?}", tbs.identifier),
            ));
        }
        let tbs_raw: Vec<u8> = tbs_raw.to_vec();

        let (b, signature_algorithm) =
            AlgorithmIdentifier::read("Certificate.signatureAlgorithm", b)?;

        let (b, signature_value) =
            Tlv::read_expected(Identifier::BITSTRING, "Certificate.signatureValue", b)?;

        if !b.is_empty() {
            return Err(Error::parse(
                "Certificate",
                format_args!("contains {} bytes of data after signatureValue", b.len()),
            ));
        }

        let (subject, issuer, validity, spki, extensions) = Self::parse_tbs(&tbs.content)?;

        Ok(Self {
            tbs_raw,
            subject,
            issuer,
            validity,
            spki,
            extensions,
            signature_algorithm,
            signature_value: signature_value.content,
        })
    }

    /// ```text
    /// TBSCertificate  ::=  SEQUENCE  {
    ///      version         [0]  EXPLICIT Version DEFAULT v1,
    ///      serialNumber         CertificateSerialNumber,
    ///      signature            AlgorithmIdentifier,
    ///      issuer               Name,
    ///      validity             Validity,
    ///      subject              Name,
    ///      subjectPublicKeyInfo SubjectPublicKeyInfo,
    ///      issuerUniqueID  [1]  IMPLICIT UniqueIdentifier OPTIONAL,
    ///      subjectUniqueID [2]  IMPLICIT UniqueIdentifier OPTIONAL,
    ///      extensions      [3]  EXPLICIT Extensions OPTIONAL }
    /// ```
    #[allow(clippy::type_complexity)]
    fn parse_tbs(
        content: &[u8],
    ) -> Result<(Name, Name, Validity, SubjectPublicKeyInfo, Vec<RawExtension>), Error> {
        // version [0] is DEFAULT v1: absent on v1 certificates
        let b: &[u8] = match content.first().copied().map(Identifier::from) {
            Some(id) if id == Identifier::context(0) => {
                let (b, _version) = Tlv::read("Certificate.tbsCertificate.version", content)?;
                b
            }
            _ => content,
        };

        let (b, _serial) = Tlv::read_expected(
            Identifier::INTEGER,
            "Certificate.tbsCertificate.serialNumber",
            b,
        )?;
        let (b, _signature) =
            AlgorithmIdentifier::read("Certificate.tbsCertificate.signature", b)?;
        let (b, issuer) = Name::read("Certificate.tbsCertificate.issuer", b)?;
        let (b, validity) = Validity::read("Certificate.tbsCertificate.validity", b)?;
        let (b, subject) = Name::read("Certificate.tbsCertificate.subject", b)?;
        let (mut b, spki) =
            SubjectPublicKeyInfo::read("Certificate.tbsCertificate.subjectPublicKeyInfo", b)?;

        let mut extensions: Vec<RawExtension> = Vec::new();

        while !b.is_empty() {
            let (local_b, tlv) = Tlv::read("Certificate.tbsCertificate optional", b)?;
            b = local_b;

            if tlv.identifier.class != Class::ContextSpecific {
                return Err(Error::parse(
                    "Certificate.tbsCertificate",
                    format_args!(
                        "unexpected identifier class after subjectPublicKeyInfo: {:?}",
                        tlv.identifier
                    ),
                ));
            }

            match u8::from(tlv.identifier.tag) {
                // issuerUniqueID and subjectUniqueID carry no display value
                1 | 2 => (),
                3 => {
                    extensions = read_extensions(
                        "Certificate.tbsCertificate.extensions",
                        &tlv.content,
                    )?;
                }
                tag => {
                    return Err(Error::parse(
                        "Certificate.tbsCertificate",
                        format_args!("unexpected optional field tag {tag}"),
                    ));
                }
            }
        }

        Ok((subject, issuer, validity, spki, extensions))
    }

    /// Checks that `self` carries a signature made by `issuer`'s key.
    ///
    /// Failures come back as display messages for the validation result,
    /// never as panics or parse errors.
    pub fn verify_issued_by(&self, issuer: &ParsedCertificate) -> Result<(), String> {
        let signature_bytes: &[u8] = self
            .signature_value
            .get(1..)
            .ok_or_else(|| "signature BIT STRING is empty".to_string())?;

        let public_key: PublicKey = PublicKey::from_spki(&issuer.spki).map_err(|_| {
            format!(
                "issuer uses an unsupported public key algorithm {}",
                issuer.spki.algorithm.algorithm
            )
        })?;

        match self.signature_algorithm.algorithm.dotted() {
            // ecdsaWithSHA256 (ANSI X9.62 ECDSA algorithm with SHA256)
            "1.2.840.10045.4.3.2" => {
                public_key.verify::<sha2::Sha256>(&self.tbs_raw, signature_bytes)
            }
            // ecdsaWithSHA384 (ANSI X9.62 ECDSA algorithm with SHA384)
            "1.2.840.10045.4.3.3" => {
                public_key.verify::<sha2::Sha384>(&self.tbs_raw, signature_bytes)
            }
            // sha256WithRSAEncryption (PKCS #1)
            "1.2.840.113549.1.1.11" => {
                public_key.verify::<sha2::Sha256>(&self.tbs_raw, signature_bytes)
            }
            // sha384WithRSAEncryption (PKCS #1)
            "1.2.840.113549.1.1.12" => {
                public_key.verify::<sha2::Sha384>(&self.tbs_raw, signature_bytes)
            }
            // sha512WithRSAEncryption (PKCS #1)
            "1.2.840.113549.1.1.13" => {
                public_key.verify::<sha2::Sha512>(&self.tbs_raw, signature_bytes)
            }
            oid => Err(format!("unrecognized signature algorithm {oid}")),
        }
    }

    /// `true` when issuer and subject encode to the same bytes.
    pub fn is_self_issued(&self) -> bool {
        self.issuer.raw == self.subject.raw
    }

    /// Checks the validity window against `now`.
    pub fn check_validity(&self, now: &Zoned) -> Result<(), String> {
        if &self.validity.not_before > now {
            return Err("is not yet valid".to_string());
        }
        if &self.validity.not_after < now {
            return Err("has expired".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Name, read_extensions};

    /// Builds one TLV with a short-form length.
    fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
        assert!(content.len() < 128);
        let mut out: Vec<u8> = vec![tag, content.len() as u8];
        out.extend_from_slice(content);
        out
    }

    fn atav(oid: &[u8], string_tag: u8, value: &[u8]) -> Vec<u8> {
        let mut inner: Vec<u8> = tlv(0x06, oid);
        inner.extend_from_slice(&tlv(string_tag, value));
        tlv(0x30, &inner)
    }

    #[test]
    fn name_read_collects_attributes() {
        // SEQUENCE { SET { SEQ { 2.5.4.3, UTF8String "example.com" } },
        //            SET { SEQ { 2.5.4.6, PrintableString "US" } } }
        let mut rdns: Vec<u8> = tlv(0x31, &atav(&[0x55, 0x04, 0x03], 0x0C, b"example.com"));
        rdns.extend_from_slice(&tlv(0x31, &atav(&[0x55, 0x04, 0x06], 0x13, b"US")));
        let der: Vec<u8> = tlv(0x30, &rdns);

        let (remain, name) = Name::read("test", &der).unwrap();
        assert!(remain.is_empty());
        assert_eq!(name.raw, der);
        assert_eq!(name.attributes.len(), 2);
        assert_eq!(name.attributes[0].value, "example.com");
        assert_eq!(name.attributes[1].value, "US");

        let fields = name.to_fields().unwrap();
        assert_eq!(fields.common_name.as_deref(), Some("example.com"));
        assert_eq!(fields.country.as_deref(), Some("US"));
        assert_eq!(fields.organization, None);
    }

    #[test]
    fn name_unknown_oid_is_fatal() {
        // 1.3.9999.1 -> 2B CE 0F 01
        let rdn: Vec<u8> = tlv(0x31, &atav(&[0x2B, 0xCE, 0x0F, 0x01], 0x0C, b"x"));
        let der: Vec<u8> = tlv(0x30, &rdn);

        let (_, name) = Name::read("test", &der).unwrap();
        assert!(matches!(
            name.to_fields(),
            Err(crate::error::Error::UnknownOid(_))
        ));
    }

    #[test]
    fn extensions_with_and_without_critical() {
        // basicConstraints, critical, value OCTET STRING { SEQUENCE { BOOLEAN true } }
        let bc_value: Vec<u8> = tlv(0x30, &tlv(0x01, &[0xFF]));
        let mut bc: Vec<u8> = tlv(0x06, &[0x55, 0x1D, 0x13]);
        bc.extend_from_slice(&tlv(0x01, &[0xFF]));
        bc.extend_from_slice(&tlv(0x04, &bc_value));
        let bc: Vec<u8> = tlv(0x30, &bc);

        // subjectKeyIdentifier, critical omitted
        let mut ski: Vec<u8> = tlv(0x06, &[0x55, 0x1D, 0x0E]);
        ski.extend_from_slice(&tlv(0x04, &tlv(0x04, &[0xAB; 20])));
        let ski: Vec<u8> = tlv(0x30, &ski);

        let mut seq: Vec<u8> = bc.clone();
        seq.extend_from_slice(&ski);
        let der: Vec<u8> = tlv(0x30, &seq);

        let extensions = read_extensions("test", &der).unwrap();
        assert_eq!(extensions.len(), 2);
        assert_eq!(extensions[0].oid.dotted(), "2.5.29.19");
        assert!(extensions[0].critical);
        assert_eq!(extensions[1].oid.dotted(), "2.5.29.14");
        assert!(!extensions[1].critical);
    }
}
