//! Scripted HTTP/1.1 server for end-to-end tests.
//!
//! Responses are served in the order they were enqueued, one per
//! connection. Every response closes its connection so the client pool
//! never reuses one.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// What the server does once it has read a request.
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Reply with a status line, reason and body.
    Reply {
        status: u16,
        reason: &'static str,
        body: &'static str,
    },
    /// Close the socket without replying.
    Disconnect,
}

impl MockResponse {
    pub fn ok(body: &'static str) -> Self {
        MockResponse::Reply {
            status: 200,
            reason: "OK",
            body,
        }
    }

    pub fn status(status: u16, reason: &'static str, body: &'static str) -> Self {
        MockResponse::Reply {
            status,
            reason,
            body,
        }
    }
}

#[derive(Default)]
struct Shared {
    queue: Mutex<VecDeque<MockResponse>>,
    requests: AtomicUsize,
}

pub struct MockServer {
    addr: SocketAddr,
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl MockServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shared = Arc::new(Shared::default());

        let task = tokio::spawn({
            let shared = shared.clone();
            async move {
                loop {
                    let Ok((socket, _)) = listener.accept().await else {
                        break;
                    };
                    tokio::spawn(serve(socket, shared.clone()));
                }
            }
        });

        Self { addr, shared, task }
    }

    pub fn enqueue(&self, response: MockResponse) {
        self.shared.queue.lock().unwrap().push_back(response);
    }

    /// Number of requests read so far.
    pub fn request_count(&self) -> usize {
        self.shared.requests.load(Ordering::SeqCst)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(mut socket: TcpStream, shared: Arc<Shared>) {
    if read_head(&mut socket).await.is_none() {
        return;
    }
    shared.requests.fetch_add(1, Ordering::SeqCst);

    let response = shared.queue.lock().unwrap().pop_front();
    match response {
        Some(MockResponse::Reply {
            status,
            reason,
            body,
        }) => {
            let reply = format!(
                "HTTP/1.1 {status} {reason}\r\n\
                 Content-Length: {}\r\n\
                 Content-Type: text/plain\r\n\
                 Connection: close\r\n\
                 \r\n\
                 {body}",
                body.len()
            );
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
        Some(MockResponse::Disconnect) | None => drop(socket),
    }
}

/// Read until the end of the request head. Test requests carry no body.
async fn read_head(socket: &mut TcpStream) -> Option<()> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await.ok()?;
        if n == 0 {
            return None;
        }
        head.extend_from_slice(&buf[..n]);
    }
    Some(())
}
