//! Certificate extension summarization.
//!
//! Only Subject Alternative Name and Basic Constraint contribute to the
//! summary the tables display. Other registered extensions are passed over
//! silently; an extension whose OID the registry does not know at all is
//! logged and skipped, the one place an unknown OID is not fatal.

use crate::{
    der::{Class, Identifier, Tag, Tlv},
    error::Error,
    oid,
    x509::RawExtension,
};

/// The extension-derived fields of a CSR or certificate record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ExtensionSummary {
    pub(crate) sans_dns: Vec<String>,
    pub(crate) sans_ip: Vec<String>,
    pub(crate) is_ca: bool,
}

pub(crate) fn parse_extensions(extensions: &[RawExtension]) -> Result<ExtensionSummary, Error> {
    let mut summary: ExtensionSummary = ExtensionSummary::default();

    for extension in extensions {
        let display_name: &str = match oid::display_name(extension.oid.dotted()) {
            Ok(name) => name,
            Err(Error::UnknownOid(oid)) => {
                if extension.critical {
                    log::warn!("skipping critical extension with unrecognized OID {oid}");
                } else {
                    log::warn!("skipping extension with unrecognized OID {oid}");
                }
                continue;
            }
            Err(e) => return Err(e),
        };

        match display_name {
            "Subject Alternative Name" => {
                parse_subject_alt_name(&extension.value, &mut summary)?;
            }
            "Basic Constraint" => {
                summary.is_ca = parse_basic_constraint(&extension.value)?;
            }
            // registered, but nothing in it to display
            _ => (),
        }
    }

    Ok(summary)
}

/// # References
///
/// - [RFC 5280 Section 4.2.1.6](https://datatracker.ietf.org/doc/html/rfc5280#section-4.2.1.6)
///
/// ```text
/// SubjectAltName ::= GeneralNames
///
/// GeneralNames ::= SEQUENCE SIZE (1..MAX) OF GeneralName
///
/// GeneralName ::= CHOICE {
///     otherName                       [0]     OtherName,
///     rfc822Name                      [1]     IA5String,
///     dNSName                         [2]     IA5String,
///     x400Address                     [3]     ORAddress,
///     directoryName                   [4]     Name,
///     ediPartyName                    [5]     EDIPartyName,
///     uniformResourceIdentifier       [6]     IA5String,
///     iPAddress                       [7]     OCTET STRING,
///     registeredID                    [8]     OBJECT IDENTIFIER }
/// ```
fn parse_subject_alt_name(b: &[u8], summary: &mut ExtensionSummary) -> Result<(), Error> {
    const NAME: &str = "SubjectAltName";

    let (remain, seq) = Tlv::read_expected(Identifier::SEQUENCE, NAME, b)?;

    if !remain.is_empty() {
        return Err(Error::parse(
            NAME,
            format_args!("contains {} bytes of extra data", remain.len()),
        ));
    }

    let mut b: &[u8] = &seq.content;
    let mut n: usize = 0;

    while !b.is_empty() {
        let entry_name: String = format!("{NAME}.GeneralNames[{n}]");
        let (local_b, entry) = Tlv::read(&entry_name, b)?;
        b = local_b;
        n += 1;

        if entry.identifier.class != Class::ContextSpecific {
            return Err(Error::parse(
                &entry_name,
                format_args!("expected a context-specific tag, got {:?}", entry.identifier),
            ));
        }

        match u8::from(entry.identifier.tag) {
            // dNSName
            2 => {
                let val = String::from_utf8_lossy(&entry.content);
                if !val.is_ascii() {
                    return Err(Error::parse(
                        &entry_name,
                        "dNSName is not a valid IA5String",
                    ));
                }
                summary.sans_dns.push(val.into_owned());
            }
            // iPAddress: raw octets rendered as unsigned decimals joined
            // with dots, matching what the tables show
            7 => {
                let rendered: String = entry
                    .content
                    .iter()
                    .map(|octet| octet.to_string())
                    .collect::<Vec<String>>()
                    .join(".");
                summary.sans_ip.push(rendered);
            }
            // every other GeneralName choice is ignored
            _ => (),
        }
    }

    Ok(())
}

/// # References
///
/// - [RFC 5280 Section 4.2.1.9](https://datatracker.ietf.org/doc/html/rfc5280#section-4.2.1.9)
///
/// ```text
/// BasicConstraints ::= SEQUENCE {
///     cA                      BOOLEAN DEFAULT FALSE,
///     pathLenConstraint       INTEGER (0..MAX) OPTIONAL }
/// ```
fn parse_basic_constraint(b: &[u8]) -> Result<bool, Error> {
    const NAME: &str = "BasicConstraints";

    let (remain, seq) = Tlv::read_expected(Identifier::SEQUENCE, NAME, b)?;

    if !remain.is_empty() {
        return Err(Error::parse(
            NAME,
            format_args!("contains {} bytes of extra data", remain.len()),
        ));
    }

    // both fields are optional; an empty SEQUENCE means cA defaults to false
    match seq.content.first().copied().map(Identifier::from) {
        Some(id) if id.tag == Tag::Boolean => {
            let (_, ca) = Tlv::read_bool(&format!("{NAME}.cA"), &seq.content)?;
            Ok(ca)
        }
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::{ExtensionSummary, parse_extensions};
    use crate::der::Tlv;
    use crate::x509::read_extensions;

    fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
        assert!(content.len() < 128);
        let mut out: Vec<u8> = vec![tag, content.len() as u8];
        out.extend_from_slice(content);
        out
    }

    fn extension(oid: &[u8], value: &[u8]) -> Vec<u8> {
        let mut inner: Vec<u8> = tlv(0x06, oid);
        inner.extend_from_slice(&tlv(0x04, value));
        tlv(0x30, &inner)
    }

    fn parse(der: &[u8]) -> ExtensionSummary {
        let raw = read_extensions("test", der).unwrap();
        parse_extensions(&raw).unwrap()
    }

    #[test]
    fn san_entries_keep_encounter_order() {
        // dNSName a.example.com, dNSName b.example.com, iPAddress 10.0.0.1
        let mut names: Vec<u8> = tlv(0x82, b"a.example.com");
        names.extend_from_slice(&tlv(0x82, b"b.example.com"));
        names.extend_from_slice(&tlv(0x87, &[10, 0, 0, 1]));
        let san_value: Vec<u8> = tlv(0x30, &names);

        let der: Vec<u8> = tlv(0x30, &extension(&[0x55, 0x1D, 0x11], &san_value));

        let summary: ExtensionSummary = parse(&der);
        assert_eq!(summary.sans_dns, vec!["a.example.com", "b.example.com"]);
        assert_eq!(summary.sans_ip, vec!["10.0.0.1"]);
        assert!(!summary.is_ca);
    }

    #[test]
    fn san_other_general_names_are_ignored() {
        // rfc822Name, then dNSName
        let mut names: Vec<u8> = tlv(0x81, b"admin@example.com");
        names.extend_from_slice(&tlv(0x82, b"example.com"));
        let san_value: Vec<u8> = tlv(0x30, &names);

        let der: Vec<u8> = tlv(0x30, &extension(&[0x55, 0x1D, 0x11], &san_value));

        let summary: ExtensionSummary = parse(&der);
        assert_eq!(summary.sans_dns, vec!["example.com"]);
        assert!(summary.sans_ip.is_empty());
    }

    #[test]
    fn basic_constraint_ca_flag() {
        let bc_true: Vec<u8> = tlv(0x30, &tlv(0x01, &[0xFF]));
        let der: Vec<u8> = tlv(0x30, &extension(&[0x55, 0x1D, 0x13], &bc_true));
        assert!(parse(&der).is_ca);

        // empty SEQUENCE: cA defaults to false
        let bc_default: Vec<u8> = tlv(0x30, &[]);
        let der: Vec<u8> = tlv(0x30, &extension(&[0x55, 0x1D, 0x13], &bc_default));
        assert!(!parse(&der).is_ca);
    }

    #[test]
    fn unknown_extension_oid_is_skipped() {
        // 1.3.9999.2 is not in the registry; the SAN after it must still land
        let mut names: Vec<u8> = tlv(0x82, b"example.com");
        names = tlv(0x30, &names);

        let mut seq: Vec<u8> = extension(&[0x2B, 0xCE, 0x0F, 0x02], &tlv(0x04, &[0x00]));
        seq.extend_from_slice(&extension(&[0x55, 0x1D, 0x11], &names));
        let der: Vec<u8> = tlv(0x30, &seq);

        let summary: ExtensionSummary = parse(&der);
        assert_eq!(summary.sans_dns, vec!["example.com"]);
    }

    #[test]
    fn registered_but_unsummarized_extension_is_passed_over() {
        // keyUsage parses as a recognized extension and contributes nothing
        let ku_value: Vec<u8> = tlv(0x03, &[0x07, 0x80]);
        let der: Vec<u8> = tlv(0x30, &extension(&[0x55, 0x1D, 0x0F], &ku_value));

        let summary: ExtensionSummary = parse(&der);
        assert_eq!(summary, ExtensionSummary::default());
        // and the raw TLV is still a readable BIT STRING
        let (_, bits) = Tlv::read("test", &ku_value).unwrap();
        assert_eq!(bits.content, vec![0x07, 0x80]);
    }
}
