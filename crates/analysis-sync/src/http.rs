//! Blocking HTTP plumbing shared by the grid and station sources.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use wx_common::{WxError, WxResult};

/// Build the client a source keeps for its lifetime.
pub(crate) fn build_client(timeout: Duration, user_agent: &str) -> WxResult<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(30)))
        .user_agent(user_agent)
        .build()
        .map_err(|e| WxError::Config(format!("Failed to create HTTP client: {e}")))
}

/// GET `url` and return the body, or `None` for an empty (204) response.
///
/// 404 maps to `DataUnavailable`; any other failure status or network
/// problem to `Transport`.
pub(crate) fn get_text(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
) -> WxResult<Option<String>> {
    debug!(url = %url, "GET");
    let response = client
        .get(url)
        .query(query)
        .send()
        .map_err(|e| WxError::Transport(format!("{url}: {e}")))?;

    if !body_expected(url, response.status())? {
        return Ok(None);
    }

    let body = response
        .text()
        .map_err(|e| WxError::Transport(format!("{url}: failed to read body: {e}")))?;
    Ok(non_empty(body))
}

/// GET `url` and decode a JSON body.
pub(crate) fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
) -> WxResult<T> {
    decode_json(url, get_text(client, url, query)?)
}

/// Whether a response with `status` carries a body worth reading.
fn body_expected(url: &str, status: StatusCode) -> WxResult<bool> {
    match status {
        StatusCode::NO_CONTENT => Ok(false),
        StatusCode::NOT_FOUND => Err(WxError::DataUnavailable(format!("{url}: 404 Not Found"))),
        status if !status.is_success() => Err(WxError::Transport(format!("{url}: HTTP {status}"))),
        _ => Ok(true),
    }
}

fn non_empty(body: String) -> Option<String> {
    if body.trim().is_empty() {
        None
    } else {
        Some(body)
    }
}

fn decode_json<T: DeserializeOwned>(url: &str, body: Option<String>) -> WxResult<T> {
    let body = body.ok_or_else(|| WxError::DataUnavailable(format!("{url}: empty response")))?;
    serde_json::from_str(&body).map_err(|e| WxError::Decode(format!("{url}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://localhost:8083/edr/collections/rtma-conus/cube";

    #[test]
    fn test_success_reads_body() {
        assert!(body_expected(URL, StatusCode::OK).unwrap());
    }

    #[test]
    fn test_no_content_is_empty() {
        assert!(!body_expected(URL, StatusCode::NO_CONTENT).unwrap());
    }

    #[test]
    fn test_not_found_is_data_unavailable() {
        let err = body_expected(URL, StatusCode::NOT_FOUND).unwrap_err();
        assert!(matches!(err, WxError::DataUnavailable(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_server_errors_are_transport() {
        for status in [StatusCode::INTERNAL_SERVER_ERROR, StatusCode::SERVICE_UNAVAILABLE] {
            let err = body_expected(URL, status).unwrap_err();
            assert!(matches!(err, WxError::Transport(_)), "{status}");
            assert!(err.to_string().contains(status.as_str()));
        }
    }

    #[test]
    fn test_client_errors_are_transport() {
        let err = body_expected(URL, StatusCode::BAD_REQUEST).unwrap_err();
        assert!(matches!(err, WxError::Transport(_)));
    }

    #[test]
    fn test_blank_body_is_none() {
        assert_eq!(non_empty("  \n".to_string()), None);
        assert_eq!(non_empty("{}".to_string()), Some("{}".to_string()));
    }

    #[test]
    fn test_decode_json_errors() {
        let empty: WxResult<serde_json::Value> = decode_json(URL, None);
        assert!(matches!(empty, Err(WxError::DataUnavailable(_))));

        let garbled: WxResult<serde_json::Value> = decode_json(URL, Some("{\"type\":".into()));
        assert!(matches!(garbled, Err(WxError::Decode(_))));

        let ok: serde_json::Value = decode_json(URL, Some("{\"type\":\"Coverage\"}".into())).unwrap();
        assert_eq!(ok["type"], "Coverage");
    }
}
