//! reqwest-backed [`HttpTransport`].
//!
//! Issues one request per call against the configured API root. Status codes
//! are returned untouched; only failures to get any response at all become
//! [`ApiError::Transport`].

use std::time::Duration;

use fusion_core::api::{ApiRequest, ApiResponse, FormPart, FormValue, HttpTransport, Method, RequestBody};
use fusion_types::error::ApiError;
use reqwest::multipart::{Form, Part};

pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Build a transport rooted at `base_url` (e.g. `http://127.0.0.1:8000/api`).
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("fusion-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn build_form(parts: &[FormPart]) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for part in parts {
        form = match &part.value {
            FormValue::Text(text) => form.text(part.name.clone(), text.clone()),
            FormValue::File(file) => {
                let mut body = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
                if let Some(content_type) = &file.content_type {
                    body = body.mime_str(content_type).map_err(|e| {
                        ApiError::Transport(format!("invalid content type '{content_type}': {e}"))
                    })?;
                }
                form.part(part.name.clone(), body)
            }
        };
    }
    Ok(form)
}

impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse, ApiError> {
        let mut builder = self
            .client
            .request(method(request.method), self.url(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(method = request.method.as_str(), path = %request.path, error = %e, "request failed");
            ApiError::Transport(e.to_string())
        })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("failed to read response body: {e}")))?;

        tracing::debug!(method = request.method.as_str(), path = %request.path, status, "api response");
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusion_types::upload::FileUpload;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned response and hand back the raw request head.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8_lossy(&head).to_string()
        });
        (format!("http://{addr}/api/"), task)
    }

    #[tokio::test]
    async fn sends_bearer_and_query() {
        let (base, server) = serve_once("200 OK", r#"{"count":0,"results":[]}"#).await;
        let transport = ReqwestTransport::new(&base).unwrap();

        let request = ApiRequest::get("/products/").query("page", 2);
        let response = transport.execute(&request, Some("tok-1")).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"count":0,"results":[]}"#);

        let head = server.await.unwrap().to_lowercase();
        assert!(head.starts_with("get /api/products/?page=2 http/1.1"), "{head}");
        assert!(head.contains("authorization: bearer tok-1"));
    }

    #[tokio::test]
    async fn error_statuses_are_responses() {
        let (base, server) = serve_once("404 Not Found", r#"{"detail":"Not found."}"#).await;
        let transport = ReqwestTransport::new(&base).unwrap();

        let response = transport
            .execute(&ApiRequest::get("/products/99/"), None)
            .await
            .unwrap();
        assert_eq!(response.status, 404);
        assert!(!response.is_success());

        let head = server.await.unwrap().to_lowercase();
        assert!(!head.contains("authorization"));
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = ReqwestTransport::new(&format!("http://{addr}/api")).unwrap();
        let err = transport
            .execute(&ApiRequest::get("/categories/"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let transport = ReqwestTransport::new("http://localhost:8000/api/").unwrap();
        assert_eq!(transport.base_url(), "http://localhost:8000/api");
        assert_eq!(transport.url("/orders/"), "http://localhost:8000/api/orders/");
        assert_eq!(transport.url("orders/"), "http://localhost:8000/api/orders/");
    }

    #[test]
    fn bad_content_type_is_rejected() {
        let parts = vec![FormPart::file(
            "image",
            FileUpload::new("mug.png", vec![1, 2, 3]).with_content_type("not a mime"),
        )];
        assert!(matches!(build_form(&parts), Err(ApiError::Transport(_))));
    }

    #[test]
    fn text_and_file_parts_build() {
        let parts = vec![
            FormPart::text("name", "Mug"),
            FormPart::file(
                "image",
                FileUpload::new("mug.png", vec![1, 2, 3]).with_content_type("image/png"),
            ),
        ];
        assert!(build_form(&parts).is_ok());
    }
}
