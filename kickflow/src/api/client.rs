use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

use super::error::ApiError;

/// Header identifying the caller of the Kickflow API
pub const CALLER_ID_HEADER: &str = "Caller-ID";

/// Kickflow API client
///
/// Cheap to clone: configuration is immutable and shared behind an `Arc`.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    caller_id: String,
    headers: HeaderMap,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url)
            .field("caller_id", &self.inner.caller_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl Client {
    pub fn new(base_url: &str, access_token: &str, caller_id: &str) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)?;

        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", access_token))
            .map_err(|_| ApiError::InvalidHeader {
                header: "Authorization",
            })?;
        authorization.set_sensitive(true);

        let caller = HeaderValue::from_str(caller_id).map_err(|_| ApiError::InvalidHeader {
            header: CALLER_ID_HEADER,
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(HeaderName::from_static("caller-id"), caller);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                caller_id: caller_id.to_string(),
                headers,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn caller_id(&self) -> &str {
        &self.inner.caller_id
    }

    /// Sends a request after setting the authorization, caller and content
    /// type headers. Transport failures are returned as they are.
    pub async fn execute(&self, mut request: reqwest::Request) -> Result<reqwest::Response, ApiError> {
        for (name, value) in &self.inner.headers {
            request.headers_mut().insert(name.clone(), value.clone());
        }

        tracing::debug!("{} request to: {}", request.method(), request.url());

        let response = self.inner.http.execute(request).await?;
        tracing::debug!("Response status: {}", response.status());

        Ok(response)
    }

    /// Execute a GET request with query parameters
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response, ApiError> {
        let mut url = Url::parse(&format!("{}{}", self.inner.base_url, path))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        self.execute(reqwest::Request::new(Method::GET, url)).await
    }

    /// Execute a GET request and decode a `200 OK` JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let response = self.get(path, query).await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::error!("API returned {} for {}", status, path);
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            tracing::error!("Failed to deserialize response from {}: {}", path, e);
            ApiError::Parse(e)
        })
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Ping {
        ok: bool,
    }

    fn test_client(url: &str) -> Client {
        Client::new(url, "secret-token", "terraform").unwrap()
    }

    #[tokio::test]
    async fn every_request_carries_standard_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/ping")
            .match_header("authorization", "Bearer secret-token")
            .match_header("caller-id", "terraform")
            .match_header("content-type", "application/json")
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let ping: Ping = test_client(&server.url()).get_json("/ping", &[]).await.unwrap();
        assert!(ping.ok);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn headers_are_applied_to_every_verb() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/things/1")
            .match_header("authorization", "Bearer secret-token")
            .match_header("caller-id", "terraform")
            .match_header("content-type", "application/json")
            .with_status(204)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let url = Url::parse(&format!("{}/things/1", server.url())).unwrap();
        let response = client
            .execute(reqwest::Request::new(Method::DELETE, url))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn query_parameters_are_encoded() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/lookupByEmail")
            .match_query(Matcher::UrlEncoded(
                "email".into(),
                "jane+ops@example.com".into(),
            ))
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let _: Ping = client
            .get_json("/lookupByEmail", &[("email", "jane+ops@example.com")])
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_ok_status_is_an_api_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/ping")
            .with_status(404)
            .with_body(r#"{"message":"not found"}"#)
            .create_async()
            .await;

        let result: Result<Ping, _> = test_client(&server.url()).get_json("/ping", &[]).await;
        match result {
            Err(ApiError::Status { status }) => assert_eq!(status, 404),
            other => panic!("Expected Status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn other_success_codes_are_not_accepted() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/ping")
            .with_status(202)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let result: Result<Ping, _> = test_client(&server.url()).get_json("/ping", &[]).await;
        assert!(matches!(result, Err(ApiError::Status { status: 202 })));
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/ping")
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let result: Result<Ping, _> = test_client(&server.url()).get_json("/ping", &[]).await;
        assert!(matches!(result, Err(ApiError::Parse(_))));
    }

    #[tokio::test]
    async fn client_strips_trailing_slash_from_endpoint() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/ping")
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let client = test_client(&format!("{}/", server.url()));
        assert_eq!(client.base_url(), server.url());

        let _: Ping = client.get_json("/ping", &[]).await.unwrap();
        mock.assert_async().await;
    }

    // No request timeout is configured, so a slow but successful
    // response still decodes.
    #[tokio::test]
    async fn slow_responses_are_not_cut_off() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    return;
                }
                request.extend_from_slice(&buf[..n]);
            }

            tokio::time::sleep(std::time::Duration::from_secs(32)).await;

            let body = r#"{"ok":true}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        let client = test_client(&format!("http://{}", addr));
        let ping: Ping = client
            .get_json("/users", &[("userId", "u-1")])
            .await
            .unwrap();
        assert!(ping.ok);
    }

    #[tokio::test]
    async fn client_handles_network_errors() {
        let client = test_client("http://127.0.0.1:1");

        let result: Result<Ping, _> = client.get_json("/ping", &[]).await;
        assert!(matches!(result, Err(ApiError::Request(_))));
    }

    #[test]
    fn construction_rejects_bad_inputs() {
        assert!(matches!(
            Client::new("not a url", "token", "caller"),
            Err(ApiError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            Client::new("https://api.kickflow.com", "tok\nen", "caller"),
            Err(ApiError::InvalidHeader {
                header: "Authorization"
            })
        ));
        assert!(matches!(
            Client::new("https://api.kickflow.com", "token", "bad\ncaller"),
            Err(ApiError::InvalidHeader {
                header: CALLER_ID_HEADER
            })
        ));
    }

    #[test]
    fn debug_output_redacts_token() {
        let client = test_client("https://api.kickflow.com");
        let debug = format!("{:?}", client);

        assert!(debug.contains("terraform"));
        assert!(!debug.contains("secret-token"));
    }
}
