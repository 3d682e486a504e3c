//! PEM envelope handling: single-block decoding and bundle splitting.

use crate::error::Error;

const BEGIN_CERTIFICATE: &str = "-----BEGIN CERTIFICATE-----";
const END_CERTIFICATE: &str = "-----END CERTIFICATE-----";

/// Decodes a single PEM block into its DER contents.
///
/// The BEGIN/END framing lines and all intervening whitespace are stripped
/// and the remainder is base64-decoded. Any tag is accepted; whether the
/// bytes form a certificate or a CSR is the DER layer's concern.
pub fn pem_to_der(pem: &str) -> Result<Vec<u8>, Error> {
    match ::pem::parse(pem.trim()) {
        Ok(parsed) => Ok(parsed.into_contents()),
        Err(e) => Err(Error::Decode(e.to_string())),
    }
}

/// Splits a multi-certificate PEM blob into its certificate blocks.
///
/// Each returned string is one self-contained
/// `-----BEGIN CERTIFICATE-----` .. `-----END CERTIFICATE-----` block, in
/// order of appearance. Blocks are not decoded; a block with a garbage
/// payload is still returned and fails later, in [`pem_to_der`].
#[must_use]
pub fn split_bundle(text: &str) -> Vec<String> {
    let mut blocks: Vec<String> = Vec::new();
    let mut rest: &str = text;

    while let Some(start) = rest.find(BEGIN_CERTIFICATE) {
        let candidate: &str = &rest[start..];
        match candidate.find(END_CERTIFICATE) {
            Some(end) => {
                let block_len: usize = end + END_CERTIFICATE.len();
                blocks.push(candidate[..block_len].to_string());
                rest = &candidate[block_len..];
            }
            // BEGIN without a matching END, nothing more to split
            None => break,
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::{pem_to_der, split_bundle};
    use crate::error::Error;

    const BLOCK_A: &str =
        "-----BEGIN CERTIFICATE-----\nYWFhYQ==\n-----END CERTIFICATE-----";
    const BLOCK_B: &str =
        "-----BEGIN CERTIFICATE-----\nYmJiYg==\n-----END CERTIFICATE-----";

    #[test]
    fn pem_to_der_decodes_payload() {
        assert_eq!(pem_to_der(BLOCK_A).unwrap(), b"aaaa");
    }

    #[test]
    fn pem_to_der_rejects_bad_base64() {
        let pem: &str =
            "-----BEGIN CERTIFICATE-----\n!!!not base64!!!\n-----END CERTIFICATE-----";
        assert!(matches!(pem_to_der(pem), Err(Error::Decode(_))));
    }

    #[test]
    fn pem_to_der_rejects_missing_framing() {
        assert!(matches!(pem_to_der("YWFhYQ=="), Err(Error::Decode(_))));
    }

    #[test]
    fn split_bundle_preserves_order_and_content() {
        let bundle: String = format!("{BLOCK_A}\n{BLOCK_B}\n");
        let blocks: Vec<String> = split_bundle(&bundle);
        assert_eq!(blocks, vec![BLOCK_A.to_string(), BLOCK_B.to_string()]);

        // concatenating the blocks reproduces the bundle's certificate blocks
        let rejoined: String = blocks.join("\n") + "\n";
        assert_eq!(rejoined, bundle);
    }

    #[test]
    fn split_bundle_empty_and_garbage() {
        assert!(split_bundle("").is_empty());
        assert!(split_bundle("not a cert").is_empty());
    }

    #[test]
    fn split_bundle_ignores_unterminated_block() {
        let text: String = format!("{BLOCK_A}\n-----BEGIN CERTIFICATE-----\ntruncated");
        assert_eq!(split_bundle(&text), vec![BLOCK_A.to_string()]);
    }
}
