//! Default `Transport` backed by a blocking `ureq` agent.
//!
//! Each request runs on its own worker thread and the result comes back over
//! a oneshot channel, so the returned future needs no particular executor.
//! Status codes outside 2xx/3xx are turned into `TransportError::Status`;
//! everything else is returned as data.
//!
//! Dropping the future cancels the wait, not the request. A request the
//! worker has already started is carried through to completion and its
//! result discarded, so the service may still apply it. A request whose
//! caller is gone before the worker starts is never sent.

use std::fmt;
use std::thread;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::trace;
use ureq::{Agent, RequestBuilder};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

/// HTTP transport bound to a base URL.
#[derive(Clone)]
pub struct UreqTransport {
    base_url: String,
    agent: Agent,
}

impl UreqTransport {
    pub fn new(base_url: &str) -> Self {
        // Status codes are interpreted below rather than by ureq so the body of
        // an error response is kept.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn execute(agent: &Agent, url: &str, req: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let result = match req.method {
            HttpMethod::Get => prepare(agent.get(url), req).call(),
            HttpMethod::Delete => prepare(agent.delete(url), req).call(),
            HttpMethod::Post => prepare(agent.post(url), req).send_empty(),
        };
        let mut response = result.map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        check_status(HttpResponse { status, headers, body })
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").field("base_url", &self.base_url).finish()
    }
}

fn prepare<B>(builder: RequestBuilder<B>, req: &HttpRequest) -> RequestBuilder<B> {
    let builder = req
        .headers
        .iter()
        .fold(builder, |b, (name, value)| b.header(name.as_str(), value.as_str()));
    match req.timeout {
        Some(timeout) => builder.config().timeout_global(Some(timeout)).build(),
        None => builder,
    }
}

/// Map non-success status codes to `TransportError::Status`.
fn check_status(response: HttpResponse) -> Result<HttpResponse, TransportError> {
    if (200..400).contains(&response.status) {
        return Ok(response);
    }
    Err(TransportError::Status {
        status: response.status,
        body: response.body,
    })
}

#[async_trait]
impl Transport for UreqTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = self.url_for(&request.path);
        trace!(method = request.method.as_str(), %url, "executing request");
        let agent = self.agent.clone();
        let (tx, rx) = oneshot::channel();
        thread::Builder::new()
            .name("ureq-transport".to_string())
            .spawn(move || {
                if tx.is_closed() {
                    trace!(%url, "caller gone before dispatch");
                    return;
                }
                let _ = tx.send(Self::execute(&agent, &url, &request));
            })
            .map_err(|e| TransportError::Network(e.to_string()))?;
        rx.await
            .map_err(|_| TransportError::Network("transport worker exited".to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    /// One-shot HTTP server on a plain thread. Waits `delay`, then reads the
    /// request head, reports it on the channel and answers 204.
    fn raw_server(delay: Duration) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            thread::sleep(delay);
            let head = read_head(&mut stream);
            let _ = tx.send(head);
            let _ = stream.write_all(
                b"HTTP/1.1 204 No Content\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
        });
        (base_url, rx)
    }

    fn read_head(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn request(method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: path.to_string(),
            headers: Vec::new(),
            timeout: None,
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn url_joins_base_and_endpoint() {
        let transport = UreqTransport::new("http://localhost:3000/");
        assert_eq!(transport.base_url(), "http://localhost:3000");
        assert_eq!(transport.url_for("citations/a%2Fb"), "http://localhost:3000/citations/a%2Fb");
        assert_eq!(transport.url_for("/citations"), "http://localhost:3000/citations");
    }

    #[test]
    fn success_and_redirect_statuses_pass_through() {
        for status in [200, 201, 204, 304] {
            assert!(check_status(response(status, "")).is_ok(), "{status}");
        }
    }

    #[test]
    fn error_statuses_keep_the_body() {
        let err = check_status(response(401, "missing bearer token")).unwrap_err();
        assert_eq!(
            err,
            TransportError::Status {
                status: 401,
                body: "missing bearer token".to_string()
            }
        );
    }

    #[tokio::test]
    async fn connection_failure_is_a_network_error() {
        // Port 9 (discard) on loopback is not expected to be listening.
        let transport = UreqTransport::new("http://127.0.0.1:9");
        let err = transport.send(request(HttpMethod::Get, "citations")).await.unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
    }

    #[test]
    fn send_completes_without_a_tokio_runtime() {
        let (base_url, heads) = raw_server(Duration::ZERO);
        let transport = UreqTransport::new(&base_url);

        let response =
            futures::executor::block_on(transport.send(request(HttpMethod::Get, "citations")))
                .unwrap();
        assert_eq!(response.status, 204);
        assert!(heads.recv().unwrap().starts_with("GET /citations HTTP/1.1"));
    }

    #[test]
    fn headers_and_method_reach_the_wire() {
        let (base_url, heads) = raw_server(Duration::ZERO);
        let transport = UreqTransport::new(&base_url);
        let mut req = request(HttpMethod::Post, "citations/a%2Fb");
        req.headers = vec![
            ("Authorization".to_string(), "Bearer tok".to_string()),
            ("x-request-id".to_string(), "42".to_string()),
        ];

        futures::executor::block_on(transport.send(req)).unwrap();
        let head = heads.recv().unwrap().to_ascii_lowercase();
        assert!(head.starts_with("post /citations/a%2fb http/1.1"), "{head}");
        assert!(head.contains("authorization: bearer tok"), "{head}");
        assert!(head.contains("x-request-id: 42"), "{head}");
    }

    #[test]
    fn request_timeout_is_applied() {
        // Accepts the connection and never answers.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        thread::spawn(move || {
            let _held = listener.accept();
            thread::sleep(Duration::from_secs(5));
        });

        let transport = UreqTransport::new(&base_url);
        let mut req = request(HttpMethod::Get, "citations");
        req.timeout = Some(Duration::from_millis(100));

        let started = Instant::now();
        let err = futures::executor::block_on(transport.send(req)).unwrap_err();
        assert!(matches!(err, TransportError::Network(_)), "{err:?}");
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn dropping_the_future_ends_the_wait_only() {
        let (base_url, heads) = raw_server(Duration::from_millis(300));
        let transport = UreqTransport::new(&base_url);

        let started = Instant::now();
        let outcome = tokio::time::timeout(
            Duration::from_millis(50),
            transport.send(request(HttpMethod::Post, "citations/p1")),
        )
        .await;
        assert!(outcome.is_err());
        assert!(started.elapsed() < Duration::from_millis(250));

        // The request already handed to the worker still reaches the service.
        let head = tokio::task::spawn_blocking(move || heads.recv_timeout(Duration::from_secs(5)))
            .await
            .unwrap()
            .unwrap();
        assert!(head.starts_with("POST /citations/p1 HTTP/1.1"));
    }
}
