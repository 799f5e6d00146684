//! # Port Handshake Codec
//!
//! Encodes port requests into TMM URLs and decodes TMM's response URLs.
//!
//! Both directions carry a JSON object, base64-encoded (standard alphabet,
//! padded) as the whole query component of the URL.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use thiserror::Error;

use super::protocol::*;
use crate::error::Result;

/// Why a response URL could not be decoded
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    /// URL has no (or an empty) query component
    #[error("response URL has no query")]
    MissingQuery,

    /// Query is not valid base64
    #[error("response query is not valid base64: {0}")]
    InvalidBase64(String),

    /// Decoded query is not a `{"port": <int>}` object
    #[error("response payload is not a port object: {0}")]
    InvalidJson(String),
}

/// Serialize `value` to compact JSON and base64-encode it
fn encode_payload<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_vec(value)?;
    Ok(STANDARD.encode(json))
}

/// Query component of `url`: the text after the first `?`, up to any `#`
fn query(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once('?')?;
    let query = rest.split_once('#').map_or(rest, |(query, _)| query);
    (!query.is_empty()).then_some(query)
}

/// Build the TMM port request URL
///
/// # Arguments
///
/// * `returl` - URL TMM should open to deliver its response
///
/// # Returns
///
/// * `Result<String>` - `tmmsocketserverport://trimble.TMM.ios?<base64 json>`
///
/// # Examples
///
/// ```
/// use tmm_telemetry::handshake::build_request_url;
///
/// let url = build_request_url("socketport://spp4d.playground.ios")?;
/// assert_eq!(
///     url,
///     "tmmsocketserverport://trimble.TMM.ios?eyJyZXR1cmwiOiJzb2NrZXRwb3J0Oi8vc3BwNGQucGxheWdyb3VuZC5pb3MifQ=="
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn build_request_url(returl: &str) -> Result<String> {
    let request = PortRequest { returl: returl.to_string() };
    let payload = encode_payload(&request)?;
    Ok(format!("{}://{}?{}", TMM_REQUEST_SCHEME, TMM_REQUEST_HOST, payload))
}

/// Build a response URL the way TMM does
///
/// # Arguments
///
/// * `base` - Return URL from the request (without query)
/// * `port` - WebSocket port to announce
pub fn build_response_url(base: &str, port: u64) -> Result<String> {
    let payload = encode_payload(&PortResponse { port })?;
    Ok(format!("{}?{}", base, payload))
}

/// Decode a TMM response URL, reporting why it failed
///
/// Scheme and host are not checked; only the query payload is.
///
/// # Errors
///
/// Returns error if the query is missing, is not base64, or does not decode
/// to a `{"port": <int>}` object
pub fn try_decode_response_url(url: &str) -> std::result::Result<PortResponse, HandshakeError> {
    let query = query(url).ok_or(HandshakeError::MissingQuery)?;

    let data = STANDARD
        .decode(query)
        .map_err(|e| HandshakeError::InvalidBase64(e.to_string()))?;

    serde_json::from_slice(&data).map_err(|e| HandshakeError::InvalidJson(e.to_string()))
}

/// Decode a TMM response URL
///
/// # Returns
///
/// * `Option<PortResponse>` - The announced port, or `None` if the URL could not be decoded
///
/// # Examples
///
/// ```
/// use tmm_telemetry::handshake::decode_response_url;
///
/// let response = decode_response_url("socketport://ting.playground.ios?ewogICJwb3J0IjogOTYzNQp9");
/// assert_eq!(response.map(|r| r.port), Some(9635));
/// ```
pub fn decode_response_url(url: &str) -> Option<PortResponse> {
    try_decode_response_url(url).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_url() {
        let url = build_request_url("socketport://spp4d.playground.ios").unwrap();
        assert_eq!(
            url,
            "tmmsocketserverport://trimble.TMM.ios?eyJyZXR1cmwiOiJzb2NrZXRwb3J0Oi8vc3BwNGQucGxheWdyb3VuZC5pb3MifQ=="
        );
    }

    #[test]
    fn test_build_request_url_is_deterministic() {
        let a = build_request_url("socketport://example.app").unwrap();
        let b = build_request_url("socketport://example.app").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_request_payload_decodes_to_request() {
        let url = build_request_url(DEFAULT_RETURN_URL).unwrap();
        let payload = query(&url).unwrap();
        let json = STANDARD.decode(payload).unwrap();
        let request: PortRequest = serde_json::from_slice(&json).unwrap();
        assert_eq!(request.returl, DEFAULT_RETURN_URL);
    }

    #[test]
    fn test_decode_pretty_printed_response() {
        // {\n  "port": 9635\n}
        let response =
            decode_response_url("socketport://ting.playground.ios?ewogICJwb3J0IjogOTYzNQp9");
        assert_eq!(response, Some(PortResponse { port: 9635 }));
    }

    #[test]
    fn test_decode_padded_response() {
        // { "port": 41296 }
        let response =
            decode_response_url("socketport://spp4d.playground.ios?eyAicG9ydCI6IDQxMjk2IH0=");
        assert_eq!(response.map(|r| r.port), Some(41296));
    }

    #[test]
    fn test_decode_ignores_scheme_and_host() {
        let response = decode_response_url("anything://else?eyAicG9ydCI6IDQxMjk2IH0=");
        assert_eq!(response.map(|r| r.port), Some(41296));
    }

    #[test]
    fn test_decode_stops_at_fragment() {
        let response = decode_response_url("socketport://app?eyAicG9ydCI6IDQxMjk2IH0=#top");
        assert_eq!(response.map(|r| r.port), Some(41296));
    }

    #[test]
    fn test_missing_query() {
        assert_eq!(
            try_decode_response_url("socketport://spp4d.playground.ios"),
            Err(HandshakeError::MissingQuery)
        );
        assert_eq!(
            try_decode_response_url("socketport://spp4d.playground.ios?"),
            Err(HandshakeError::MissingQuery)
        );
        assert!(decode_response_url("socketport://spp4d.playground.ios").is_none());
    }

    #[test]
    fn test_invalid_base64() {
        let result = try_decode_response_url("socketport://app?not*base64!");
        assert!(matches!(result, Err(HandshakeError::InvalidBase64(_))));
        assert!(decode_response_url("socketport://app?not*base64!").is_none());
    }

    #[test]
    fn test_invalid_json() {
        // "hello"
        let result = try_decode_response_url("socketport://app?ImhlbGxvIg==");
        assert!(matches!(result, Err(HandshakeError::InvalidJson(_))));

        // {"port":"9635"}
        let url = format!("socketport://app?{}", STANDARD.encode(r#"{"port":"9635"}"#));
        assert!(matches!(try_decode_response_url(&url), Err(HandshakeError::InvalidJson(_))));

        // {"returl":"x"}
        let url = format!("socketport://app?{}", STANDARD.encode(r#"{"returl":"x"}"#));
        assert!(decode_response_url(&url).is_none());
    }

    #[test]
    fn test_response_round_trip() {
        for port in [0, 1, 80, 9635, 41296, 65535, 1 << 40, u64::MAX] {
            let url = build_response_url(DEFAULT_RETURN_URL, port).unwrap();
            assert!(url.starts_with("socketport://spp4d.playground.ios?"));
            assert_eq!(decode_response_url(&url), Some(PortResponse { port }), "port {}", port);
        }
    }
}
