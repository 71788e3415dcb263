//! HTTP helpers shared by the REST adapters.

use std::time::Duration;

use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::transport::{TransportError, redact};

/// Header carrying the credential. The key never goes into the URL.
pub(crate) const API_KEY_HEADER: &str = "x-goog-api-key";

/// POSTs `body` as JSON and decodes a successful reply into `T`.
///
/// `what` names the endpoint in error text. Every error is mapped with
/// `secret` scrubbed and the URL stripped.
pub(crate) async fn post_json<T: DeserializeOwned>(
    client: &Client,
    url: String,
    secret: &str,
    body: &impl Serialize,
    what: &str,
) -> Result<T, TransportError> {
    let response = client
        .post(url)
        .header(API_KEY_HEADER, secret)
        .json(body)
        .send()
        .await
        .map_err(|err| map_send_error(err, secret))?;

    if !response.status().is_success() {
        let status = response.status();
        let retry_after = parse_retry_after(response.headers().get("retry-after"));
        let body_text = response
            .text()
            .await
            .unwrap_or_else(|_| format!("Failed to read {what} error body"));
        return Err(map_http_error(status, &body_text, retry_after, secret));
    }

    response.json::<T>().await.map_err(|err| {
        TransportError::MalformedPayload(format!(
            "Failed to parse {what} response: {}",
            err.without_url()
        ))
    })
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Maps a non-success response to a [`TransportError`].
///
/// `secret` is scrubbed from the message before it is stored.
pub(crate) fn map_http_error(
    status: StatusCode,
    body: &str,
    retry_after: Option<Duration>,
    secret: &str,
) -> TransportError {
    let (status_text, message) = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            (status_text, msg)
        })
        .unwrap_or_else(|_| (String::new(), body.to_string()));

    let message = if status_text.is_empty() {
        redact(&message, secret)
    } else {
        redact(&format!("{status_text}: {message}"), secret)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => TransportError::RateLimited {
            message,
            retry_after,
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TransportError::Auth(message),
        StatusCode::BAD_REQUEST if status_text == "INVALID_ARGUMENT" && message.contains("API key") => {
            TransportError::Auth(message)
        }
        _ => TransportError::Http {
            status: status.as_u16(),
            message,
        },
    }
}

/// Maps a failed send to a network error.
///
/// The URL is stripped from the error before formatting.
pub(crate) fn map_send_error(err: reqwest::Error, secret: &str) -> TransportError {
    let timed_out = err.is_timeout();
    let message = redact(&err.without_url().to_string(), secret);
    if timed_out {
        TransportError::Network(format!("request timed out: {message}"))
    } else {
        TransportError::Network(message)
    }
}

pub(crate) fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_429_is_rate_limited() {
        let body = r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            body,
            Some(Duration::from_secs(3)),
            "secret",
        );
        assert_eq!(
            err,
            TransportError::RateLimited {
                message: "RESOURCE_EXHAUSTED: Resource has been exhausted".into(),
                retry_after: Some(Duration::from_secs(3)),
            }
        );
    }

    #[test]
    fn test_invalid_key_is_auth_and_redacted() {
        let body = r#"{"error":{"code":400,"message":"API key not valid: AIzaLeaked","status":"INVALID_ARGUMENT"}}"#;
        let err = map_http_error(StatusCode::BAD_REQUEST, body, None, "AIzaLeaked");
        match err {
            TransportError::Auth(message) => {
                assert!(!message.contains("AIzaLeaked"));
                assert!(message.contains("API key not valid"));
            }
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[test]
    fn test_plain_body_is_kept() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream down", None, "k");
        assert_eq!(
            err,
            TransportError::Http {
                status: 502,
                message: "upstream down".into()
            }
        );
    }

    #[test]
    fn test_parse_retry_after_seconds() {
        let value = HeaderValue::from_static("12");
        assert_eq!(parse_retry_after(Some(&value)), Some(Duration::from_secs(12)));
        let date = HeaderValue::from_static("Wed, 21 Oct 2026 07:28:00 GMT");
        assert_eq!(parse_retry_after(Some(&date)), None);
        assert_eq!(parse_retry_after(None), None);
    }

    #[tokio::test]
    async fn test_post_json_reads_retry_after_on_429() {
        use wiremock::matchers::{header, method};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header(API_KEY_HEADER, "k-123"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "7")
                    .set_body_string("slow down"),
            )
            .mount(&server)
            .await;

        let result: Result<serde_json::Value, _> = post_json(
            &Client::new(),
            format!("{}/m:generateContent", server.uri()),
            "k-123",
            &serde_json::json!({}),
            "test",
        )
        .await;

        assert_eq!(
            result.unwrap_err(),
            TransportError::RateLimited {
                message: "slow down".into(),
                retry_after: Some(Duration::from_secs(7)),
            }
        );
    }
}
