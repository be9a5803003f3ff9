// src/transport.rs
//
// One retry policy for every backend call: an ordered list of transport
// variants, first success wins, last failure surfaces.

use crate::errors::{AuraError, AuraResult};
use reqwest::RequestBuilder;

/// A named way of shaping a request. The backend sits on a remote origin,
/// and some deployments only accept the alternate header shape.
#[derive(Debug, Clone, Copy)]
pub struct TransportVariant {
    pub name: &'static str,
    pub headers: &'static [(&'static str, &'static str)],
}

impl TransportVariant {
    pub fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        let mut builder = builder;
        for (key, value) in self.headers {
            builder = builder.header(*key, *value);
        }
        builder
    }
}

/// Direct call first, alternate-header call second.
pub const TRANSPORT_VARIANTS: [TransportVariant; 2] = [
    TransportVariant {
        name: "direct",
        headers: &[("Accept", "application/json")],
    },
    TransportVariant {
        name: "alternate-headers",
        headers: &[
            ("Accept", "*/*"),
            ("X-Requested-With", "XMLHttpRequest"),
            ("Cache-Control", "no-cache"),
        ],
    },
];

/// Tries each variant in order until one returns a 2xx. A fresh request
/// must be built per attempt, so callers hand over a builder closure.
pub async fn send_with_fallback<F>(endpoint: &str, build: F) -> AuraResult<reqwest::Response>
where
    F: Fn(&TransportVariant) -> RequestBuilder,
{
    let mut last_detail = String::new();
    let mut connect_failure = false;

    for variant in &TRANSPORT_VARIANTS {
        log::debug!("{}: trying {} transport", endpoint, variant.name);

        match variant.apply(build(variant)).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }
                let body = response.text().await.unwrap_or_default();
                last_detail = format!("{} returned {} - {}", endpoint, status, body);
                connect_failure = false;
                log::warn!("{} ({} transport)", last_detail, variant.name);
            }
            Err(e) => {
                connect_failure = e.is_connect() || e.is_timeout();
                last_detail = format!("{}: {}", endpoint, e);
                log::warn!("{} ({} transport)", last_detail, variant.name);
            }
        }
    }

    Err(AuraError::transport(last_detail, connect_failure))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_first_variant_success_stops_there() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/ping", mock_server.uri());
        let result = send_with_fallback("/ping", |_| client.post(&url)).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_fallback_variant_used_after_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/ping", mock_server.uri());
        let result = send_with_fallback("/ping", |_| client.post(&url)).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_all_variants_failing_surfaces_transport_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/ping", mock_server.uri());
        let result = send_with_fallback("/ping", |_| client.post(&url)).await;

        match result {
            Err(AuraError::Transport { detail, .. }) => {
                assert!(detail.contains("503"));
            }
            other => panic!("expected transport error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend_flags_connect_failure() {
        // Port 9 is discard; nothing listens there in the test environment.
        let client = reqwest::Client::new();
        let result =
            send_with_fallback("/ping", |_| client.post("http://127.0.0.1:9/ping")).await;

        match result {
            Err(AuraError::Transport {
                connect_failure, ..
            }) => assert!(connect_failure),
            other => panic!("expected transport error, got {:?}", other.map(|_| ())),
        }
    }
}
