//! Client for the zhost server's HTTP API.
//!
//! Every failure is reported twice: once as a [`Notice`] on the app event
//! channel, so the user sees it even when the caller drops the result, and
//! once as the returned `Err`.

use std::sync::mpsc::Sender;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::app_event::{AppEvent, Notice};
use crate::codec::{self, CodecError};
use crate::models::{HostEntry, HostList};

const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Parse(#[source] CodecError),

    #[error("failed to encode request: {0}")]
    Encode(#[source] CodecError),

    #[error("server answered HTTP {status}")]
    Status { status: u16 },
}

impl ApiError {
    /// Text shown to the user for this failure.
    pub fn notice_text(&self) -> String {
        match self {
            Self::Network(_) => "Network error".to_string(),
            Self::Body(_) | Self::Parse(_) => "Failed to parse response".to_string(),
            Self::Encode(_) => "Failed to encode request".to_string(),
            Self::Status { status } => format!("Server error (HTTP {status})"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    events: Sender<AppEvent>,
}

impl ApiClient {
    pub fn new(base_url: &str, events: Sender<AppEvent>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("zhost/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            events,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// User-defined entries. The system entry is not part of this list.
    pub async fn fetch_host_list(&self) -> Result<HostList, ApiError> {
        self.get("/api/getHostList").await
    }

    /// The live system hosts file as entry 0.
    pub async fn fetch_system_host(&self) -> Result<HostEntry, ApiError> {
        self.get("/api/sysHost").await
    }

    pub async fn add_host(&self, entry: &HostEntry) -> Result<(), ApiError> {
        self.post("/api/addNewHost", entry).await
    }

    pub async fn update_host(&self, entry: &HostEntry) -> Result<(), ApiError> {
        self.post("/api/updateHost", entry).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let text = self.execute(self.client.get(&url), "GET", &url).await?;
        codec::decode(&text).map_err(|e| self.fail(ApiError::Parse(e)))
    }

    /// The acknowledgement body is read but not interpreted.
    async fn post(&self, path: &str, entry: &HostEntry) -> Result<(), ApiError> {
        let url = self.url(path);
        let body = codec::encode(entry).map_err(|e| self.fail(ApiError::Encode(e)))?;
        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, PLAIN_TEXT)
            .body(body);
        let ack = self.execute(request, "POST", &url).await?;
        tracing::debug!("POST {} acknowledged with {} bytes", url, ack.len());
        Ok(())
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        method: &str,
        url: &str,
    ) -> Result<String, ApiError> {
        tracing::debug!("{} {}", method, url);

        let response = request
            .send()
            .await
            .map_err(|e| self.fail(ApiError::Network(e)))?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        let text = response
            .text()
            .await
            .map_err(|e| self.fail(ApiError::Body(e)))?;

        if !status.is_success() {
            return Err(self.fail(ApiError::Status {
                status: status.as_u16(),
            }));
        }

        Ok(text)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn fail(&self, error: ApiError) -> ApiError {
        tracing::error!("API error: {}", error);
        if self
            .events
            .send(AppEvent::Notice(Notice::error(error.notice_text())))
            .is_err()
        {
            tracing::warn!("Notice dropped, event receiver is gone");
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_event::NoticeLevel;
    use std::sync::mpsc::{self, Receiver};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Accepts one connection, answers with `raw_response` and returns the
    /// request it received.
    async fn serve_once(raw_response: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(raw_response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });
        (format!("http://{addr}"), handle)
    }

    fn ok_response(body: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .map_or(0, |v| v.trim().parse::<usize>().unwrap());
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
        String::from_utf8(buf).unwrap()
    }

    fn client(base_url: &str) -> (ApiClient, Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel();
        (ApiClient::new(base_url, tx).unwrap(), rx)
    }

    fn notices(rx: &Receiver<AppEvent>) -> Vec<Notice> {
        rx.try_iter()
            .filter_map(|event| match event {
                AppEvent::Notice(notice) => Some(notice),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn fetches_the_host_list() {
        let body = r#".{ .hosts = .{ .{ .id = 1, .name = "a", .open = false, .content = "h 1.2.3.4" } } }"#;
        let (url, server) = serve_once(ok_response(body)).await;
        let (api, rx) = client(&url);

        let list = api.fetch_host_list().await.unwrap();
        assert_eq!(list.hosts, vec![HostEntry::new(1, "a", "h 1.2.3.4")]);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/getHostList HTTP/1.1"));
        assert!(notices(&rx).is_empty());
    }

    #[tokio::test]
    async fn fetches_the_system_host_with_escapes() {
        let body = r#".{ .id = 0, .name = "\xe7\xb3\xbb\xe7\xbb\x9f", .open = false, .content = "127.0.0.1 localhost\n::1 localhost" }"#;
        let (url, server) = serve_once(ok_response(body)).await;
        let (api, _rx) = client(&url);

        let system = api.fetch_system_host().await.unwrap();
        assert_eq!(system.name, "系统");
        assert_eq!(system.content, "127.0.0.1 localhost\n::1 localhost");
        assert!(server.await.unwrap().starts_with("GET /api/sysHost "));
    }

    #[tokio::test]
    async fn update_posts_the_encoded_entry() {
        let (url, server) = serve_once(ok_response("ok")).await;
        let (api, rx) = client(&format!("{url}/"));

        let entry = HostEntry::new(1, "a", "h2 5.6.7.8");
        api.update_host(&entry).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/updateHost HTTP/1.1"));
        assert!(request
            .to_lowercase()
            .contains("content-type: text/plain; charset=utf-8"));
        let body = request.split("\r\n\r\n").nth(1).unwrap();
        assert_eq!(body, codec::encode(&entry).unwrap());
        let sent: HostEntry = codec::decode(body).unwrap();
        assert_eq!(sent, entry);
        assert!(notices(&rx).is_empty());
    }

    #[tokio::test]
    async fn add_posts_to_the_add_endpoint() {
        let (url, server) = serve_once(ok_response("")).await;
        let (api, _rx) = client(&url);
        api.add_host(&HostEntry::new(5, "new host", "www.demo.com 127.0.0.1"))
            .await
            .unwrap();
        assert!(server.await.unwrap().starts_with("POST /api/addNewHost "));
    }

    #[tokio::test]
    async fn unreachable_server_gives_one_network_notice() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let (api, rx) = client(&format!("http://{addr}"));

        let err = api.fetch_host_list().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));

        let notices = notices(&rx);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].message, "Network error");
    }

    #[tokio::test]
    async fn truncated_body_gives_one_parse_notice() {
        let raw = "HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\n.{ .id".to_string();
        let (url, _server) = serve_once(raw).await;
        let (api, rx) = client(&url);

        let err = api.fetch_system_host().await.unwrap_err();
        assert!(matches!(err, ApiError::Body(_)));
        let notices = notices(&rx);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Failed to parse response");
    }

    #[tokio::test]
    async fn undecodable_body_gives_one_parse_notice() {
        let (url, _server) = serve_once(ok_response("")).await;
        let (api, rx) = client(&url);

        let err = api.fetch_system_host().await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(CodecError::Empty)));
        let notices = notices(&rx);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Failed to parse response");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let raw = "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 4\r\nConnection: close\r\n\r\noops".to_string();
        let (url, _server) = serve_once(raw).await;
        let (api, rx) = client(&url);

        let err = api.update_host(&HostEntry::new(1, "a", "")).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500 }));
        assert_eq!(notices(&rx)[0].message, "Server error (HTTP 500)");
    }
}
