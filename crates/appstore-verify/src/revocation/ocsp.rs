//! Minimal OCSP wire handling: request encoding, HTTP transport, and
//! response status parsing.
//!
//! Only the certificate status is read out of responses; the responder's
//! own signature is not re-verified, matching the best-effort posture of
//! this check. Trust decisions never rest on the status alone.

use std::time::Duration;

use x509_parser::der_parser::asn1_rs::{Any, Class, FromDer, Tag};

use super::{CertStatus, RevocationStatusProvider, StatusError, StatusRequest};

/// DER AlgorithmIdentifier for id-sha256 with NULL parameters.
const ALG_ID_SHA256: &[u8] = &[
    0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01, 0x05, 0x00,
];

fn encode_tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + 4);
    out.push(tag);
    let len = content.len();
    if len < 0x80 {
        out.push(len as u8);
    } else if len <= 0xff {
        out.push(0x81);
        out.push(len as u8);
    } else {
        out.push(0x82);
        out.push((len >> 8) as u8);
        out.push((len & 0xff) as u8);
    }
    out.extend_from_slice(content);
    out
}

fn encode_integer(bytes: &[u8]) -> Vec<u8> {
    let mut trimmed: &[u8] = bytes;
    while trimmed.len() > 1 && trimmed[0] == 0 {
        trimmed = &trimmed[1..];
    }
    let mut content = Vec::with_capacity(trimmed.len() + 1);
    if trimmed.is_empty() || trimmed[0] & 0x80 != 0 {
        content.push(0);
    }
    content.extend_from_slice(trimmed);
    encode_tlv(0x02, &content)
}

/// Encode an OCSPRequest for a single certificate.
///
/// ```text
/// OCSPRequest ::= SEQUENCE {
///   tbsRequest SEQUENCE {
///     requestList SEQUENCE OF Request { reqCert CertID } } }
/// CertID ::= SEQUENCE {
///   hashAlgorithm AlgorithmIdentifier,
///   issuerNameHash OCTET STRING,
///   issuerKeyHash OCTET STRING,
///   serialNumber CertificateSerialNumber }
/// ```
pub(super) fn encode_request(request: &StatusRequest) -> Vec<u8> {
    let mut cert_id = Vec::new();
    cert_id.extend_from_slice(ALG_ID_SHA256);
    cert_id.extend_from_slice(&encode_tlv(0x04, &request.issuer_name_hash));
    cert_id.extend_from_slice(&encode_tlv(0x04, &request.issuer_key_hash));
    cert_id.extend_from_slice(&encode_integer(&request.serial));
    let cert_id = encode_tlv(0x30, &cert_id);
    let single = encode_tlv(0x30, &cert_id);
    let request_list = encode_tlv(0x30, &single);
    let tbs = encode_tlv(0x30, &request_list);
    encode_tlv(0x30, &tbs)
}

fn parse_error(context: &str) -> StatusError {
    StatusError(format!("malformed OCSP response: {context}"))
}

fn parse_any<'a>(input: &'a [u8], context: &str) -> Result<(&'a [u8], Any<'a>), StatusError> {
    Any::from_der(input).map_err(|_| parse_error(context))
}

fn children<'a>(any: &Any<'a>, context: &str) -> Result<Vec<Any<'a>>, StatusError> {
    let mut rest = any.data;
    let mut out = Vec::new();
    while !rest.is_empty() {
        let (next, element) = parse_any(rest, context)?;
        out.push(element);
        rest = next;
    }
    Ok(out)
}

/// Read the certificate status out of a DER OCSPResponse.
pub(super) fn parse_response(bytes: &[u8]) -> Result<CertStatus, StatusError> {
    let (_, outer_any) = parse_any(bytes, "OCSPResponse")?;
    let outer = children(&outer_any, "OCSPResponse")?;

    let status = outer
        .first()
        .ok_or_else(|| parse_error("missing responseStatus"))?;
    if status.data.len() != 1 || status.data[0] != 0 {
        return Err(StatusError(format!(
            "responder refused the request (status {:?})",
            status.data
        )));
    }

    // responseBytes [0] EXPLICIT SEQUENCE { responseType OID, response OCTET STRING }
    let response_bytes = outer
        .get(1)
        .filter(|el| el.class() == Class::ContextSpecific)
        .ok_or_else(|| parse_error("missing responseBytes"))?;
    let (_, response_seq) = parse_any(response_bytes.data, "ResponseBytes")?;
    let response_children = children(&response_seq, "ResponseBytes")?;
    let basic_octets = response_children
        .get(1)
        .ok_or_else(|| parse_error("missing response octets"))?;

    let (_, basic) = parse_any(basic_octets.data, "BasicOCSPResponse")?;
    let basic_children = children(&basic, "BasicOCSPResponse")?;
    let tbs = basic_children
        .first()
        .ok_or_else(|| parse_error("missing tbsResponseData"))?;

    // tbsResponseData leads with tagged version/responderID and a
    // GeneralizedTime; `responses` is its first plain SEQUENCE child.
    let responses = children(tbs, "ResponseData")?
        .into_iter()
        .find(|el| el.class() == Class::Universal && el.tag() == Tag::Sequence)
        .ok_or_else(|| parse_error("missing responses"))?;
    let singles = children(&responses, "responses")?;
    let single = singles
        .first()
        .ok_or_else(|| parse_error("empty responses"))?;

    // SingleResponse ::= SEQUENCE { certID, certStatus CHOICE, ... } where
    // certStatus is context tag 0 (good), 1 (revoked), or 2 (unknown).
    let cert_status = children(single, "SingleResponse")?
        .into_iter()
        .nth(1)
        .filter(|el| el.class() == Class::ContextSpecific)
        .ok_or_else(|| parse_error("missing certStatus"))?;

    match cert_status.tag().0 {
        0 => Ok(CertStatus::Good),
        1 => Ok(CertStatus::Revoked),
        _ => Ok(CertStatus::Unknown),
    }
}

/// HTTP-backed OCSP status provider.
pub struct OcspStatusProvider {
    client: reqwest::blocking::Client,
}

impl OcspStatusProvider {
    pub fn new(timeout: Duration) -> Result<Self, StatusError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StatusError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl RevocationStatusProvider for OcspStatusProvider {
    fn status(&self, request: &StatusRequest) -> Result<CertStatus, StatusError> {
        let url = request
            .responder_url
            .as_deref()
            .ok_or_else(|| StatusError("certificate carries no OCSP responder URL".to_owned()))?;

        let response = self
            .client
            .post(url)
            .header("content-type", "application/ocsp-request")
            .body(encode_request(request))
            .send()
            .map_err(|e| StatusError(format!("status fetch failed: {e}")))?;
        if !response.status().is_success() {
            return Err(StatusError(format!(
                "responder returned HTTP {}",
                response.status()
            )));
        }
        let body = response
            .bytes()
            .map_err(|e| StatusError(format!("failed to read responder body: {e}")))?;
        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> StatusRequest {
        StatusRequest {
            issuer_name_hash: [0xaa; 32],
            issuer_key_hash: [0xbb; 32],
            serial: vec![0x01, 0x02, 0x03],
            responder_url: None,
        }
    }

    /// Build a structurally faithful OCSPResponse carrying the given
    /// certStatus tag.
    fn synthetic_response(status_tag: u8, status_content: &[u8]) -> Vec<u8> {
        let cert_id = encode_tlv(0x30, &[]);
        let mut single = cert_id;
        single.extend_from_slice(&encode_tlv(status_tag, status_content));
        single.extend_from_slice(&encode_tlv(0x18, b"20300101000000Z")); // thisUpdate
        let single = encode_tlv(0x30, &single);
        let responses = encode_tlv(0x30, &single);

        let mut tbs = Vec::new();
        tbs.extend_from_slice(&encode_tlv(0xa1, &encode_tlv(0x30, &[]))); // responderID byName
        tbs.extend_from_slice(&encode_tlv(0x18, b"20300101000000Z")); // producedAt
        tbs.extend_from_slice(&responses);
        let tbs = encode_tlv(0x30, &tbs);

        let mut basic = tbs;
        basic.extend_from_slice(ALG_ID_SHA256);
        basic.extend_from_slice(&encode_tlv(0x03, &[0x00])); // signature
        let basic = encode_tlv(0x30, &basic);

        // id-pkix-ocsp-basic
        let mut rb = encode_tlv(0x06, &[0x2b, 0x06, 0x01, 0x05, 0x05, 0x07, 0x30, 0x01, 0x01]);
        rb.extend_from_slice(&encode_tlv(0x04, &basic));
        let response_bytes = encode_tlv(0xa0, &encode_tlv(0x30, &rb));

        let mut outer = encode_tlv(0x0a, &[0x00]); // responseStatus: successful
        outer.extend_from_slice(&response_bytes);
        encode_tlv(0x30, &outer)
    }

    #[test]
    fn request_is_well_formed_der() {
        let der = encode_request(&request());
        // Outer OCSPRequest is a SEQUENCE wrapping everything.
        assert_eq!(der[0], 0x30);
        let (rest, outer) = Any::from_der(&der).unwrap();
        assert!(rest.is_empty());
        assert_eq!(outer.tag(), Tag::Sequence);
        // The serial survives at the tail of the CertID.
        assert!(der
            .windows(3)
            .any(|w| w == [0x01, 0x02, 0x03]));
    }

    #[test]
    fn integer_encoding_adds_sign_padding() {
        assert_eq!(encode_integer(&[0x80]), vec![0x02, 0x02, 0x00, 0x80]);
        assert_eq!(encode_integer(&[0x00, 0x7f]), vec![0x02, 0x01, 0x7f]);
        assert_eq!(encode_integer(&[]), vec![0x02, 0x01, 0x00]);
    }

    #[test]
    fn parses_good_status() {
        let der = synthetic_response(0x80, &[]);
        assert_eq!(parse_response(&der).unwrap(), CertStatus::Good);
    }

    #[test]
    fn parses_revoked_status() {
        // revoked [1] carries RevokedInfo { revocationTime }.
        let revoked_info = encode_tlv(0x18, b"20250101000000Z");
        let der = synthetic_response(0xa1, &revoked_info);
        assert_eq!(parse_response(&der).unwrap(), CertStatus::Revoked);
    }

    #[test]
    fn parses_unknown_status() {
        let der = synthetic_response(0x82, &[]);
        assert_eq!(parse_response(&der).unwrap(), CertStatus::Unknown);
    }

    #[test]
    fn rejects_unsuccessful_response_status() {
        // responseStatus: internalError(2), no responseBytes.
        let der = encode_tlv(0x30, &encode_tlv(0x0a, &[0x02]));
        assert!(parse_response(&der).is_err());
    }

    #[test]
    fn rejects_truncated_response() {
        let der = synthetic_response(0x80, &[]);
        assert!(parse_response(&der[..der.len() / 2]).is_err());
    }
}
