//! End-to-end walk of the certificate submission workflow: extract a CSR,
//! issue a certificate for it, match the keys, and validate the uploaded
//! bundle.
//!
//! Fixtures are generated fresh with rcgen; nothing here leaves the process.

use notary_x509::{
    Certificate, CertificateSigningRequest, ChainValidator, csr_is_valid,
    csr_matches_certificate, extract_certificate, parse_csr, split_bundle, validate_bundle,
};
use rcgen::{BasicConstraints, CertificateParams, DnType, IsCa, KeyPair};

fn init_log() {
    stderrlog::new()
        .verbosity(3)
        .timestamp(stderrlog::Timestamp::Microsecond)
        .init()
        .ok();
}

/// Leaf parameters: CN example.com, C US, two DNS SANs and one IP SAN.
fn leaf_params() -> CertificateParams {
    let mut params: CertificateParams = CertificateParams::new(vec![
        "example.com".to_string(),
        "www.example.com".to_string(),
        "10.0.0.1".to_string(),
    ])
    .expect("valid subject alt names");
    params
        .distinguished_name
        .push(DnType::CommonName, "example.com");
    params.distinguished_name.push(DnType::CountryName, "US");
    params
}

fn root_params(common_name: &str) -> CertificateParams {
    let mut params: CertificateParams =
        CertificateParams::new(Vec::new()).expect("valid CA params");
    params
        .distinguished_name
        .push(DnType::CommonName, common_name);
    params
        .distinguished_name
        .push(DnType::OrganizationName, "Notary");
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params
}

#[test]
fn csr_extraction() {
    init_log();

    let key: KeyPair = KeyPair::generate().expect("key generation");
    let csr_pem: String = leaf_params()
        .serialize_request(&key)
        .expect("CSR serialization")
        .pem()
        .expect("CSR PEM");

    assert!(csr_is_valid(&csr_pem));

    let csr: CertificateSigningRequest = parse_csr(&csr_pem).expect("CSR extraction");
    assert_eq!(csr.subject.common_name.as_deref(), Some("example.com"));
    assert_eq!(csr.subject.country.as_deref(), Some("US"));
    assert_eq!(csr.subject.organization, None);
    assert_eq!(csr.sans_dns, vec!["example.com", "www.example.com"]);
    assert_eq!(csr.sans_ip, vec!["10.0.0.1"]);
    assert!(!csr.is_ca);

    // extraction is pure: a second pass yields an identical record
    assert_eq!(csr, parse_csr(&csr_pem).expect("CSR extraction"));
}

#[test]
fn certificate_extraction() {
    init_log();

    let ca_key: KeyPair = KeyPair::generate().expect("CA key generation");
    let ca_cert: rcgen::Certificate = root_params("Notary Test Root")
        .self_signed(&ca_key)
        .expect("self-signed CA");

    let leaf_key: KeyPair = KeyPair::generate().expect("leaf key generation");
    let leaf_cert: rcgen::Certificate = leaf_params()
        .signed_by(&leaf_key, &ca_cert, &ca_key)
        .expect("issued certificate");

    let certificate: Certificate = extract_certificate(&leaf_cert.pem())
        .expect("certificate extraction")
        .expect("a certificate is present");

    assert_eq!(certificate.subject.common_name.as_deref(), Some("example.com"));
    assert_eq!(certificate.subject.country.as_deref(), Some("US"));
    assert_eq!(
        certificate.issuer.common_name.as_deref(),
        Some("Notary Test Root")
    );
    assert_eq!(certificate.issuer.organization.as_deref(), Some("Notary"));
    assert_eq!(certificate.sans_dns, vec!["example.com", "www.example.com"]);
    assert_eq!(certificate.sans_ip, vec!["10.0.0.1"]);
    assert!(!certificate.is_ca);

    // rcgen's default validity window
    assert!(certificate.not_before.starts_with("1975-01-01"));
    assert!(!certificate.not_after.is_empty());

    let ca: Certificate = extract_certificate(&ca_cert.pem())
        .expect("CA extraction")
        .expect("a certificate is present");
    assert!(ca.is_ca);
    assert_eq!(ca.subject, ca.issuer);
}

#[test]
fn key_matching_gates_submission() {
    init_log();

    let ca_key: KeyPair = KeyPair::generate().expect("CA key generation");
    let ca_cert: rcgen::Certificate = root_params("Notary Test Root")
        .self_signed(&ca_key)
        .expect("self-signed CA");

    let leaf_key: KeyPair = KeyPair::generate().expect("leaf key generation");
    let csr_pem: String = leaf_params()
        .serialize_request(&leaf_key)
        .expect("CSR serialization")
        .pem()
        .expect("CSR PEM");

    let issued: rcgen::Certificate = leaf_params()
        .signed_by(&leaf_key, &ca_cert, &ca_key)
        .expect("issued certificate");
    assert!(csr_matches_certificate(&csr_pem, &issued.pem()));

    // the issued certificate answers to the request it came from
    let request_view: CertificateSigningRequest = extract_certificate(&issued.pem())
        .expect("certificate extraction")
        .expect("a certificate is present")
        .as_request();
    assert_eq!(request_view, parse_csr(&csr_pem).expect("CSR extraction"));

    // a certificate carrying some other key must block submission
    let other_key: KeyPair = KeyPair::generate().expect("key generation");
    let wrong: rcgen::Certificate = leaf_params()
        .signed_by(&other_key, &ca_cert, &ca_key)
        .expect("issued certificate");
    assert!(!csr_matches_certificate(&csr_pem, &wrong.pem()));

    // unparseable input is a mismatch, not a panic
    assert!(!csr_matches_certificate("garbage", &issued.pem()));
    assert!(!csr_matches_certificate(&csr_pem, "garbage"));
}

#[test]
fn bundle_splitting_round_trip() {
    init_log();

    let ca_key: KeyPair = KeyPair::generate().expect("CA key generation");
    let ca_cert: rcgen::Certificate = root_params("Notary Test Root")
        .self_signed(&ca_key)
        .expect("self-signed CA");
    let leaf_key: KeyPair = KeyPair::generate().expect("leaf key generation");
    let leaf_cert: rcgen::Certificate = leaf_params()
        .signed_by(&leaf_key, &ca_cert, &ca_key)
        .expect("issued certificate");

    let bundle: String = format!("{}{}", leaf_cert.pem(), ca_cert.pem());
    let blocks: Vec<String> = split_bundle(&bundle);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0], leaf_cert.pem().trim_end());
    assert_eq!(blocks[1], ca_cert.pem().trim_end());

    // each block is individually extractable
    for block in &blocks {
        assert!(extract_certificate(block).expect("block extraction").is_some());
    }
}

#[tokio::test]
async fn two_certificate_bundle_validates() {
    init_log();

    let ca_key: KeyPair = KeyPair::generate().expect("CA key generation");
    let ca_cert: rcgen::Certificate = root_params("Notary Test Root")
        .self_signed(&ca_key)
        .expect("self-signed CA");
    let leaf_key: KeyPair = KeyPair::generate().expect("leaf key generation");
    let leaf_cert: rcgen::Certificate = leaf_params()
        .signed_by(&leaf_key, &ca_cert, &ca_key)
        .expect("issued certificate");

    let bundle: String = format!("{}{}", leaf_cert.pem(), ca_cert.pem());
    let result: String = validate_bundle(&bundle).await.expect("bundle parses");
    assert_eq!(result, "");
}

#[tokio::test]
async fn broken_signature_chain_is_reported() {
    init_log();

    let ca_key: KeyPair = KeyPair::generate().expect("CA key generation");
    let ca_cert: rcgen::Certificate = root_params("Notary Test Root")
        .self_signed(&ca_key)
        .expect("self-signed CA");
    let leaf_key: KeyPair = KeyPair::generate().expect("leaf key generation");
    let leaf_cert: rcgen::Certificate = leaf_params()
        .signed_by(&leaf_key, &ca_cert, &ca_key)
        .expect("issued certificate");

    // same distinguished name, different key: the issuer/subject linkage
    // holds but the signature does not verify
    let impostor_key: KeyPair = KeyPair::generate().expect("key generation");
    let impostor_cert: rcgen::Certificate = root_params("Notary Test Root")
        .self_signed(&impostor_key)
        .expect("self-signed impostor");

    let bundle: String = format!("{}{}", leaf_cert.pem(), impostor_cert.pem());
    let result: String = validate_bundle(&bundle).await.expect("bundle parses");
    assert!(result.contains("signature"), "unexpected result: {result}");

    // a root with a different name fails the linkage check instead
    let stranger_cert: rcgen::Certificate = root_params("Unrelated Root")
        .self_signed(&impostor_key)
        .expect("self-signed stranger");
    let bundle: String = format!("{}{}", leaf_cert.pem(), stranger_cert.pem());
    let result: String = validate_bundle(&bundle).await.expect("bundle parses");
    assert_eq!(result, "certificate 1 was not issued by certificate 2");
}

#[tokio::test]
async fn superseded_validation_is_discarded() {
    init_log();

    let ca_key: KeyPair = KeyPair::generate().expect("CA key generation");
    let ca_cert: rcgen::Certificate = root_params("Notary Test Root")
        .self_signed(&ca_key)
        .expect("self-signed CA");

    let validator: ChainValidator = ChainValidator::new();
    let bundle: String = ca_cert.pem();

    // started first, awaited last: its result must be discarded
    let stale = validator.validate(&bundle);

    let fresh: Option<String> = validator
        .validate(&bundle)
        .await
        .expect("bundle parses");
    assert_eq!(fresh, Some(String::new()));

    let stale: Option<String> = stale.await.expect("bundle parses");
    assert_eq!(stale, None);
}
