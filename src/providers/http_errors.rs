use reqwest::StatusCode;
use std::error::Error as StdError;
use std::io::ErrorKind;

use crate::model::{RemoteError, RemoteErrorKind};

fn error_chain_contains(err: &(dyn StdError + 'static), kind: ErrorKind, needle: &str) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == kind
        {
            return true;
        }

        if source.to_string().to_ascii_lowercase().contains(needle) {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    error_chain_contains(err, ErrorKind::ConnectionRefused, "connection refused")
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    error_chain_contains(err, ErrorKind::TimedOut, "timed out")
}

/// Maps transport-level failures (never reached the API, or no usable
/// response) to an actionable detail message.
pub(crate) fn remote_transport_error(
    err: reqwest::Error,
    api_url: &str,
    timeout_secs: u64,
) -> RemoteError {
    if err.is_timeout() || error_chain_has_timeout(&err) {
        return RemoteError::other(format!(
            "Model request timed out after {timeout_secs}s while calling '{api_url}'. \
             Increase MODEL_TIMEOUT_SECS or check model responsiveness."
        ));
    }

    if err.is_connect() {
        if error_chain_has_connection_refused(&err) {
            return RemoteError::other(format!(
                "Connection refused by model API at '{api_url}'. \
                 Ensure OPENAI_BASE_URL is correct and the endpoint is reachable."
            ));
        }

        return RemoteError::other(format!(
            "Failed to connect to model API at '{api_url}'. \
             Check OPENAI_BASE_URL and network connectivity."
        ));
    }

    RemoteError::other(format!("Failed to call model API at '{api_url}': {err}"))
}

/// Classifies a non-success HTTP response into the closed failure set.
/// Status codes decide first; known substrings in the body break ties for
/// proxies that return generic statuses.
pub(crate) fn classify_response_failure(status: StatusCode, body: &str) -> RemoteError {
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteErrorKind::AuthMissing,
        StatusCode::TOO_MANY_REQUESTS => RemoteErrorKind::RateLimited,
        _ => classify_by_text(body),
    };
    RemoteError::new(
        kind,
        format!("Model request failed with status {status}: {body}"),
    )
}

fn classify_by_text(text: &str) -> RemoteErrorKind {
    let lowered = text.to_ascii_lowercase();
    if lowered.contains("api_key") || lowered.contains("api key") {
        return RemoteErrorKind::AuthMissing;
    }
    if lowered.contains("rate_limit") || lowered.contains("rate limit") {
        return RemoteErrorKind::RateLimited;
    }
    RemoteErrorKind::Other
}
