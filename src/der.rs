//! ASN.1 DER decoding.
//!
//! # References
//!
//! - [A Warm Welcome to ASN.1 and DER](https://letsencrypt.org/docs/a-warm-welcome-to-asn1-and-der/)
//! - [A Layman's Guide to a Subset of ASN.1, BER, and DER](https://luca.ntop.org/Teaching/Appunti/asn1.html)

use std::fmt;

use jiff::{Zoned, civil::DateTime, tz::TimeZone};

use crate::error::Error;

/// Identifier octet class bits
///
/// # References
///
/// - X.690 Section 8.1.2.2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Class {
    Universal = 0b00,
    Application = 0b01,
    ContextSpecific = 0b10,
    Private = 0b11,
}

/// Primitive or constructed bit.
///
/// # References
///
/// - X.690 Section 8.1.2.5
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Pc {
    Primitive = 0b0,
    Constructed = 0b1,
}

/// Universal tag numbers used by PKCS#10 and X.509 structures.
///
/// # References
///
/// - X.690 Section 8.1.2 Identifier octets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tag {
    /// `BOOLEAN` tag: `1`.
    Boolean,
    /// `INTEGER` tag: `2`.
    Integer,
    /// `BIT STRING` tag: `3`.
    BitString,
    /// `OCTET STRING` tag: `4`.
    OctetString,
    /// `NULL` tag: `5`.
    Null,
    /// `OBJECT IDENTIFIER` tag: `6`.
    ObjectIdentifier,
    /// `UTF8String` tag: `12`.
    Utf8String,
    /// `SEQUENCE` tag: `16`.
    Sequence,
    /// `SET` and `SET OF` tag: `17`.
    Set,
    /// `PrintableString` tag: `19`.
    PrintableString,
    /// `TeletexString` tag: `20`.
    TeletexString,
    /// `IA5String` tag: `22`.
    Ia5String,
    /// `UTCTime` tag: `23`.
    UtcTime,
    /// `GeneralizedTime` tag: `24`.
    GeneralizedTime,
    /// Everything else.
    Unknown(u8),
}

impl From<Tag> for u8 {
    fn from(value: Tag) -> Self {
        match value {
            Tag::Boolean => 1,
            Tag::Integer => 2,
            Tag::BitString => 3,
            Tag::OctetString => 4,
            Tag::Null => 5,
            Tag::ObjectIdentifier => 6,
            Tag::Utf8String => 12,
            Tag::Sequence => 16,
            Tag::Set => 17,
            Tag::PrintableString => 19,
            Tag::TeletexString => 20,
            Tag::Ia5String => 22,
            Tag::UtcTime => 23,
            Tag::GeneralizedTime => 24,
            Tag::Unknown(other) => other,
        }
    }
}

impl From<u8> for Tag {
    fn from(value: u8) -> Self {
        match value {
            1 => Tag::Boolean,
            2 => Tag::Integer,
            3 => Tag::BitString,
            4 => Tag::OctetString,
            5 => Tag::Null,
            6 => Tag::ObjectIdentifier,
            12 => Tag::Utf8String,
            16 => Tag::Sequence,
            17 => Tag::Set,
            19 => Tag::PrintableString,
            20 => Tag::TeletexString,
            22 => Tag::Ia5String,
            23 => Tag::UtcTime,
            24 => Tag::GeneralizedTime,
            other => Tag::Unknown(other),
        }
    }
}

/// Identifier octet
///
/// # References
///
/// - X.690 Section 8.1.2 Identifier octets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Identifier {
    pub(crate) class: Class,
    pub(crate) pc: Pc,
    pub(crate) tag: Tag,
}

impl Identifier {
    pub const SEQUENCE: Self = Self {
        class: Class::Universal,
        pc: Pc::Constructed,
        tag: Tag::Sequence,
    };

    pub const SET: Self = Self {
        class: Class::Universal,
        pc: Pc::Constructed,
        tag: Tag::Set,
    };

    pub const BITSTRING: Self = Self {
        class: Class::Universal,
        pc: Pc::Primitive,
        tag: Tag::BitString,
    };

    pub const OCTETSTRING: Self = Self {
        class: Class::Universal,
        pc: Pc::Primitive,
        tag: Tag::OctetString,
    };

    pub const BOOLEAN: Self = Self {
        class: Class::Universal,
        pc: Pc::Primitive,
        tag: Tag::Boolean,
    };

    pub const INTEGER: Self = Self {
        class: Class::Universal,
        pc: Pc::Primitive,
        tag: Tag::Integer,
    };

    pub const NULL: Self = Self {
        class: Class::Universal,
        pc: Pc::Primitive,
        tag: Tag::Null,
    };

    pub const OBJECTIDENTIFIER: Self = Self {
        class: Class::Universal,
        pc: Pc::Primitive,
        tag: Tag::ObjectIdentifier,
    };

    pub const UTCTIME: Self = Self {
        class: Class::Universal,
        pc: Pc::Primitive,
        tag: Tag::UtcTime,
    };

    pub const GENERALIZEDTIME: Self = Self {
        class: Class::Universal,
        pc: Pc::Primitive,
        tag: Tag::GeneralizedTime,
    };

    /// Context-specific constructed identifier, e.g. the `[0]` wrapping a
    /// certificate version or a CertificationRequest attribute set.
    pub const fn context(tag: u8) -> Self {
        Self {
            class: Class::ContextSpecific,
            pc: Pc::Constructed,
            tag: Tag::Unknown(tag),
        }
    }
}

impl From<u8> for Identifier {
    fn from(val: u8) -> Self {
        let class: Class = match (val >> 6) & 0x3 {
            0b00 => Class::Universal,
            0b01 => Class::Application,
            0b10 => Class::ContextSpecific,
            0b11 => Class::Private,
            _ => unreachable!(),
        };

        let pc: Pc = match (val >> 5) & 0x1 {
            0b0 => Pc::Primitive,
            0b1 => Pc::Constructed,
            _ => unreachable!(),
        };

        Self {
            class,
            pc,
            tag: Tag::from(val & 0x1F),
        }
    }
}

fn take<'a>(name: &str, b: &'a [u8], n: usize) -> Result<(&'a [u8], &'a [u8]), Error> {
    match b.split_at_checked(n) {
        Some((val, remain)) => Ok((remain, val)),
        None => Err(Error::parse(name, "truncated")),
    }
}

/// One decoded type-length-value element.
///
/// # References
///
/// - X.690 Section 8.1.1 Structure of an encoding
#[derive(Debug, Clone)]
pub(crate) struct Tlv {
    pub(crate) identifier: Identifier,
    pub(crate) content: Vec<u8>,
}

impl Tlv {
    pub fn read<'a>(name: &str, b: &'a [u8]) -> Result<(&'a [u8], Self), Error> {
        let (b, id) = take(name, b, 1)?;
        let identifier: Identifier = Identifier::from(id[0]);

        let (b, len_octet) = take(name, b, 1)?;
        let len_octet: u8 = len_octet[0];

        // Section 8.1.3, length octets. The indefinite form is forbidden by
        // DER; 8.1.3.5 forbids the value 0xFF outright.
        if len_octet == 0xFF {
            return Err(Error::parse(name, "forbidden length octet 0xFF"));
        }

        let long_form: bool = len_octet & 0x80 == 0x80;

        let (b, len): (&[u8], usize) = if long_form {
            let len_len: usize = usize::from(len_octet & 0x7F);
            let (b, len_buf) = take(name, b, len_len)?;

            // certificates and CSRs are far below 4 GiB, require the length
            // to fit a u32
            if let Some(high_bytes) = len_buf.len().checked_sub(4).map(|n| &len_buf[..n])
                && high_bytes.iter().any(|&x| x != 0)
            {
                return Err(Error::parse(name, "length exceeds maximum of 2**32"));
            }

            // leading octets are known to be zero at this point
            let mut len: u32 = 0;
            for &byte in len_buf {
                len = (len << 8) | u32::from(byte);
            }

            (b, len as usize)
        } else {
            (b, usize::from(len_octet & 0x7F))
        };

        let (remain, content) = take(name, b, len)?;

        Ok((
            remain,
            Self {
                identifier,
                content: content.into(),
            },
        ))
    }

    /// Reads a TLV and additionally returns the raw bytes it occupied,
    /// identifier and length octets included.
    pub fn read_raw<'a>(name: &str, b: &'a [u8]) -> Result<(&'a [u8], Self, &'a [u8]), Error> {
        let (remain, tlv) = Self::read(name, b)?;
        let raw: &[u8] = &b[..b.len() - remain.len()];
        Ok((remain, tlv, raw))
    }

    pub fn read_expected<'a>(
        identifier: Identifier,
        name: &str,
        b: &'a [u8],
    ) -> Result<(&'a [u8], Self), Error> {
        let (b, tlv) = Tlv::read(name, b)?;

        if tlv.identifier != identifier {
            return Err(Error::parse(
                name,
                format_args!("expected {:?} got {:?}", identifier, tlv.identifier),
            ));
        }

        Ok((b, tlv))
    }

    pub fn read_expected2<'a>(
        identifier1: Identifier,
        identifier2: Identifier,
        name: &str,
        b: &'a [u8],
    ) -> Result<(&'a [u8], Self), Error> {
        let (b, tlv) = Tlv::read(name, b)?;

        if tlv.identifier != identifier1 && tlv.identifier != identifier2 {
            return Err(Error::parse(
                name,
                format_args!(
                    "expected {:?} or {:?} got {:?}",
                    identifier1, identifier2, tlv.identifier
                ),
            ));
        }

        Ok((b, tlv))
    }

    pub fn bool_value(&self, name: &str) -> Result<bool, Error> {
        match self.content.first() {
            Some(0x00) => Ok(false),
            Some(0xFF) => Ok(true),
            Some(val) => Err(Error::parse(
                name,
                format_args!("boolean value must be 0x00 or 0xFF, got 0x{val:02x}"),
            )),
            None => Err(Error::parse(name, "boolean is missing a value byte")),
        }
    }

    pub fn read_bool<'a>(name: &str, b: &'a [u8]) -> Result<(&'a [u8], bool), Error> {
        let (b, tlv) = Self::read_expected(Identifier::BOOLEAN, name, b)?;
        let val: bool = tlv.bool_value(name)?;
        Ok((b, val))
    }

    /// DirectoryString, with the IA5String leniency some CAs require.
    ///
    /// # References
    ///
    /// - [RFC 5280 Section 4.1.2.4](https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.2.4)
    pub fn string_value(&self, name: &str) -> Result<String, Error> {
        match self.identifier.tag {
            Tag::Utf8String => match String::from_utf8(self.content.clone()) {
                Ok(s) => Ok(s),
                Err(e) => Err(Error::parse(name, format_args!("invalid UTF-8: {e}"))),
            },
            Tag::PrintableString | Tag::TeletexString => {
                Ok(String::from_utf8_lossy(&self.content).to_string())
            }
            // RFC 5280 omits IA5String from DirectoryString, some CAs use it anyway
            Tag::Ia5String => {
                log::warn!("{name} uses IA5String for DirectoryString");
                Ok(String::from_utf8_lossy(&self.content).to_string())
            }
            tag => Err(Error::parse(
                name,
                format_args!("unsupported DirectoryString tag {tag:?}"),
            )),
        }
    }

    /// `Time ::= CHOICE { utcTime UTCTime, generalTime GeneralizedTime }`
    ///
    /// # References
    ///
    /// - [RFC 5280 Section 4.1](https://datatracker.ietf.org/doc/html/rfc5280#section-4.1)
    pub fn read_time<'a>(name: &str, b: &'a [u8]) -> Result<(&'a [u8], Zoned), Error> {
        let (b, tlv) =
            Tlv::read_expected2(Identifier::GENERALIZEDTIME, Identifier::UTCTIME, name, b)?;

        let timefmt: &str = match tlv.identifier {
            Identifier::GENERALIZEDTIME => "%Y%m%d%H%M%SZ",
            Identifier::UTCTIME => "%y%m%d%H%M%SZ",
            _ => unreachable!(),
        };

        let content: String = String::from_utf8_lossy(&tlv.content).to_string();

        let datetime: DateTime = DateTime::strptime(timefmt, &content)
            .map_err(|e| Error::parse(name, format_args!("'{content}' is not a valid time: {e}")))?;

        let timestamp: Zoned = datetime
            .to_zoned(TimeZone::UTC)
            .map_err(|e| Error::parse(name, e))?;

        Ok((b, timestamp))
    }
}

/// A decoded `OBJECT IDENTIFIER` in dotted-decimal form.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct ObjectIdentifier {
    repr: String,
}

impl fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.repr)
    }
}

impl ObjectIdentifier {
    pub fn dotted(&self) -> &str {
        &self.repr
    }

    fn decode(name: &str, content: &[u8]) -> Result<Self, Error> {
        let mut repr: String = String::new();

        // first octet packs the two leading nodes as node0 * 40 + node1
        if let Some(byte0) = content.first() {
            let node1: u8 = byte0 % 40;
            let node0: u8 = byte0 / 40;
            repr.push_str(&format!("{node0}.{node1}"));
        } else {
            return Err(Error::parse(name, "object identifier must not be empty"));
        }

        let mut acc: Option<u32> = None;

        for byte in content.iter().skip(1) {
            let is_long: bool = byte & 0x80 == 0x80;
            if let Some(mut val) = acc.take() {
                val <<= 7;
                val |= u32::from(byte & 0x7F);
                if is_long {
                    acc = Some(val);
                } else {
                    repr.push_str(&format!(".{val}"));
                }
            } else if is_long {
                acc = Some(u32::from(byte & 0x7F));
            } else {
                repr.push_str(&format!(".{}", *byte));
            }
        }

        if acc.is_some() {
            return Err(Error::parse(name, "unterminated multi-byte arc"));
        }

        Ok(Self { repr })
    }

    pub fn read<'a>(name: &str, b: &'a [u8]) -> Result<(&'a [u8], Self), Error> {
        let (b, tlv) = Tlv::read_expected(Identifier::OBJECTIDENTIFIER, name, b)?;
        Ok((b, Self::decode(name, &tlv.content)?))
    }

    /// Reads either an `OBJECT IDENTIFIER` or a `NULL` (algorithm parameter
    /// position).
    pub fn read_or_null<'a>(name: &str, b: &'a [u8]) -> Result<(&'a [u8], Option<Self>), Error> {
        let (b, tlv) =
            Tlv::read_expected2(Identifier::OBJECTIDENTIFIER, Identifier::NULL, name, b)?;

        if tlv.identifier == Identifier::NULL {
            if !tlv.content.is_empty() {
                return Err(Error::parse(name, "NULL with non-empty contents"));
            }
            Ok((b, None))
        } else {
            Ok((b, Some(Self::decode(name, &tlv.content)?)))
        }
    }
}
