#![allow(dead_code)]

use std::io::Read;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A request seen by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub authorization: Option<String>,
    pub body: String,
}

/// Loopback HTTP server answering with canned JSON responses, one per request
pub struct MockServer {
    pub base_url: String,
    handle: JoinHandle<Vec<RecordedRequest>>,
}

impl MockServer {
    pub fn start(responses: Vec<(u16, String)>) -> Self {
        Self::start_with_idle(responses, Duration::from_secs(5))
    }

    /// Stops serving after `idle` without a request
    pub fn start_with_idle(responses: Vec<(u16, String)>, idle: Duration) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();

        let handle = thread::spawn(move || {
            let mut recorded = Vec::new();
            for (status, body) in responses {
                let mut request = match server.recv_timeout(idle) {
                    Ok(Some(request)) => request,
                    _ => break,
                };

                let mut content = String::new();
                let _ = request.as_reader().read_to_string(&mut content);
                let authorization = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Authorization"))
                    .map(|h| h.value.as_str().to_string());

                recorded.push(RecordedRequest {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    authorization,
                    body: content,
                });

                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .unwrap();
                let response = tiny_http::Response::from_string(body)
                    .with_status_code(status)
                    .with_header(header);
                let _ = request.respond(response);
            }
            recorded
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            handle,
        }
    }

    /// Wait for the server thread and return what it received
    pub fn requests(self) -> Vec<RecordedRequest> {
        self.handle.join().unwrap()
    }
}
