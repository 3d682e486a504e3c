//! Bundle chain validation.
//!
//! The check proves internal consistency of the uploaded bundle only: each
//! certificate must be issued by the next one, every validity window must
//! cover the present, and the final certificate (the designated trust root)
//! must carry a valid self-signature. No external trust store is consulted;
//! the bundle's own last entry is the anchor.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use jiff::Zoned;

use crate::{error::Error, pem, x509::ParsedCertificate};

/// Validates a PEM certificate bundle.
///
/// `Ok(String::new())` means the chain is valid; a non-empty string is the
/// human-readable failure reason the form displays. `Err` is reserved for
/// bundles whose members cannot be parsed at all.
///
/// The work runs on the blocking pool so a large chain does not stall the
/// caller's executor.
pub async fn validate_bundle(bundle: &str) -> Result<String, Error> {
    let bundle: String = bundle.to_owned();

    tokio::task::spawn_blocking(move || validate_chain(&bundle))
        .await
        // the validation closure does not panic and is never aborted
        .expect("chain validation task failed")
}

/// Serializes repeated validations of a changing input.
///
/// Form components re-validate on every keystroke; a result is only
/// meaningful for the text that produced it. Each [`validate`] call claims
/// a generation number at call time, and a result whose generation has been
/// passed over settles as `Ok(None)` instead of surfacing stale state.
///
/// [`validate`]: Self::validate
#[derive(Debug, Default)]
pub struct ChainValidator {
    generation: AtomicU64,
}

impl ChainValidator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
        }
    }

    /// Validates `bundle`, discarding the result if a newer call supersedes
    /// this one while it is in flight.
    ///
    /// The generation is claimed synchronously, before the returned future
    /// is first polled, so call order alone decides which validation wins.
    pub fn validate<'a>(
        &'a self,
        bundle: &str,
    ) -> impl Future<Output = Result<Option<String>, Error>> + use<'a> {
        let generation: u64 = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let bundle: String = bundle.to_owned();

        async move {
            let outcome: Result<String, Error> =
                tokio::task::spawn_blocking(move || validate_chain(&bundle))
                    .await
                    // the validation closure does not panic and is never aborted
                    .expect("chain validation task failed");

            if self.generation.load(Ordering::SeqCst) != generation {
                log::debug!("discarding superseded bundle validation result");
                return Ok(None);
            }

            outcome.map(Some)
        }
    }
}

fn validate_chain(bundle: &str) -> Result<String, Error> {
    let blocks: Vec<String> = pem::split_bundle(bundle);

    if blocks.is_empty() {
        return Ok("bundle contains no certificates".to_string());
    }

    let mut chain: Vec<ParsedCertificate> = Vec::with_capacity(blocks.len());
    for (i, block) in blocks.iter().enumerate() {
        let certificate: ParsedCertificate = ParsedCertificate::parse_pem(block)
            .map_err(|e| Error::Parse(format!("certificate {}: {e}", i + 1)))?;
        chain.push(certificate);
    }

    let now: Zoned = Zoned::now();
    for (i, certificate) in chain.iter().enumerate() {
        if let Err(reason) = certificate.check_validity(&now) {
            return Ok(format!("certificate {} {reason}", i + 1));
        }
    }

    // each certificate must chain to its successor
    for i in 0..chain.len() - 1 {
        let child: &ParsedCertificate = &chain[i];
        let parent: &ParsedCertificate = &chain[i + 1];

        if child.issuer.raw != parent.subject.raw {
            return Ok(format!(
                "certificate {} was not issued by certificate {}",
                i + 1,
                i + 2
            ));
        }

        if let Err(reason) = child.verify_issued_by(parent) {
            return Ok(format!("certificate {}: {reason}", i + 1));
        }
    }

    // the last entry anchors the chain and is checked against itself
    let root: &ParsedCertificate = &chain[chain.len() - 1];
    if !root.is_self_issued() {
        return Ok(format!(
            "trust root certificate {} is not self-issued",
            chain.len()
        ));
    }
    if let Err(reason) = root.verify_issued_by(root) {
        return Ok(format!("trust root certificate {}: {reason}", chain.len()));
    }

    log::debug!("bundle of {} certificates validated", chain.len());

    Ok(String::new())
}
