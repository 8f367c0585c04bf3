//! AWS Signature Version 4 for a body-less `sts:GetCallerIdentity` call.
//!
//! The request is only signed, never sent: Google's STS replays it against
//! AWS to learn who the caller is. Both STS implementations scrutinize it,
//! so the header set is kept minimal and the headers handed back are read
//! out of the canonical request that was actually hashed.
//!
//! References:
//! <https://docs.aws.amazon.com/general/latest/gr/sigv4_signing.html>
//! <https://cloud.google.com/iam/docs/workload-identity-federation-with-other-clouds>

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use http::Method;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use crate::error::WifError;

const LONG_DATETIME: &str = "%Y%m%dT%H%M%SZ";
const SHORT_DATE: &str = "%Y%m%d";
const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "sts";
const HTTP_METHOD: Method = Method::POST;
const AUTHORIZATION_HEADER: &str = "Authorization";
const HOST_HEADER: &str = "host";
const AMAZON_DATE_HEADER: &str = "x-amz-date";
const AMAZON_SECURITY_TOKEN_HEADER: &str = "x-amz-security-token";
const GOOGLE_TARGET_RESOURCE_HEADER: &str = "x-goog-cloud-target-resource";
/// SHA-256 of the empty body.
const EMPTY_PAYLOAD_HASH: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

#[derive(Clone, PartialEq, Eq)]
pub struct AwsSecurityCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for AwsSecurityCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsSecurityCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestHeader {
    pub key: String,
    pub value: String,
}

/// A signed request description, ready to be serialized as a subject token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VirtualRequest {
    pub url: String,
    pub method: String,
    pub headers: Vec<RequestHeader>,
}

/// Sign a GetCallerIdentity request for `region`, stamped with the current time.
pub fn sign_get_caller_identity(
    url: &Url,
    region: &str,
    target_resource: &str,
    credentials: &AwsSecurityCredentials,
) -> Result<VirtualRequest, WifError> {
    sign_get_caller_identity_at(Utc::now(), url, region, target_resource, credentials)
}

pub fn sign_get_caller_identity_at(
    request_time: DateTime<Utc>,
    url: &Url,
    region: &str,
    target_resource: &str,
    credentials: &AwsSecurityCredentials,
) -> Result<VirtualRequest, WifError> {
    let host = host_header_value(url)?;
    let amz_date = request_time.format(LONG_DATETIME).to_string();
    let date = request_time.format(SHORT_DATE).to_string();

    let mut headers: BTreeMap<&str, String> = BTreeMap::new();
    headers.insert(HOST_HEADER, host);
    headers.insert(AMAZON_DATE_HEADER, amz_date.to_owned());
    if let Some(token) = &credentials.session_token {
        headers.insert(AMAZON_SECURITY_TOKEN_HEADER, token.to_owned());
    }
    headers.insert(GOOGLE_TARGET_RESOURCE_HEADER, target_resource.to_owned());

    let canonical_request = canonical_request(url, &headers);
    let credential_scope = format!("{}/{}/{}/aws4_request", date, region, SERVICE);
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        credential_scope,
        hex::encode(Sha256::digest(canonical_request.as_bytes()).as_slice()),
    );

    let key = signing_key(&credentials.secret_access_key, &date, region, SERVICE)?;
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

    let signed_headers = extract_signed_headers(&canonical_request)?;
    let signed_header_names = signed_headers
        .iter()
        .map(|h| h.key.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let authorization = format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, credentials.access_key_id, credential_scope, signed_header_names, signature
    );

    let mut wire_headers = Vec::with_capacity(signed_headers.len() + 1);
    wire_headers.push(RequestHeader {
        key: AUTHORIZATION_HEADER.to_owned(),
        value: authorization,
    });
    wire_headers.extend(signed_headers);

    Ok(VirtualRequest {
        url: url.to_string(),
        method: HTTP_METHOD.as_str().to_owned(),
        headers: wire_headers,
    })
}

fn host_header_value(url: &Url) -> Result<String, WifError> {
    let host = url
        .host_str()
        .ok_or_else(|| WifError::Signing(format!("no host in verification URL {}", url)))?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_owned(),
    })
}

/// Canonical request over an empty body. `headers` is keyed by lowercase
/// name, so iteration order is already the sorted order SigV4 needs.
fn canonical_request(url: &Url, headers: &BTreeMap<&str, String>) -> String {
    let canonical_headers = headers
        .iter()
        .map(|(key, value)| format!("{}:{}", key, value.trim()))
        .collect::<Vec<_>>()
        .join("\n");
    let signed_headers = headers.keys().copied().collect::<Vec<_>>().join(";");

    format!(
        "{}\n{}\n{}\n{}\n\n{}\n{}",
        HTTP_METHOD,
        url.path(),
        canonical_query_string(url),
        canonical_headers,
        signed_headers,
        EMPTY_PAYLOAD_HASH
    )
}

fn canonical_query_string(url: &Url) -> String {
    let mut pairs = url
        .query_pairs()
        .map(|(k, v)| (urlencoding::encode(&k).into_owned(), urlencoding::encode(&v).into_owned()))
        .collect::<Vec<_>>();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Read the header block back out of a canonical request, in signed order.
///
/// Layout: method, path, query, one `name:value` line per header, a blank
/// line, then the `;`-joined signed header names.
pub fn extract_signed_headers(canonical_request: &str) -> Result<Vec<RequestHeader>, WifError> {
    let header_line = Regex::new(r"^([a-z0-9-]+):(.*)$")
        .map_err(|e| WifError::Signing(e.to_string()))?;

    let mut lines = canonical_request.split('\n').skip(3);
    let mut headers = Vec::new();
    for line in lines.by_ref() {
        if line.is_empty() {
            break;
        }
        let caps = header_line
            .captures(line)
            .ok_or_else(|| WifError::Signing(format!("malformed canonical header line '{}'", line)))?;
        headers.push(RequestHeader {
            key: caps[1].to_owned(),
            value: caps[2].to_owned(),
        });
    }

    let declared = lines
        .next()
        .ok_or_else(|| WifError::Signing("canonical request has no signed headers line".into()))?;
    let found = headers.iter().map(|h| h.key.as_str()).collect::<Vec<_>>().join(";");
    if declared != found {
        return Err(WifError::Signing(format!(
            "signed headers '{}' do not match canonical headers '{}'",
            declared, found
        )));
    }
    Ok(headers)
}

/// date -> region -> service -> "aws4_request"
fn signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Result<Vec<u8>, WifError> {
    let date_key = hmac_sha256(format!("AWS4{}", secret_key).as_bytes(), date.as_bytes())?;
    let region_key = hmac_sha256(&date_key, region.as_bytes())?;
    let service_key = hmac_sha256(&region_key, service.as_bytes())?;
    hmac_sha256(&service_key, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, WifError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .map_err(|e| WifError::Signing(format!("failed to construct HMAC: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}
