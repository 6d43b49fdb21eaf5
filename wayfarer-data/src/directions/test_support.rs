//! Test utilities for the HTTP directions provider.
//!
//! This module provides [`CannedDirectionsServer`], a loopback HTTP server
//! that answers every request with a fixed status and body, so the provider
//! can be exercised end to end without network access.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Loopback HTTP server replaying one canned response.
///
/// The server handles connections until it is dropped. Request lines are
/// recorded so tests can inspect the query string the provider sent.
///
/// # Example
///
/// ```
/// use wayfarer_data::directions::test_support::CannedDirectionsServer;
///
/// let server = CannedDirectionsServer::json(200, r#"{"status": "ZERO_RESULTS"}"#)?;
/// assert!(server.base_url().starts_with("http://127.0.0.1:"));
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct CannedDirectionsServer {
    address: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<Mutex<bool>>,
}

#[derive(Debug, Clone)]
struct Canned {
    status: u16,
    body: String,
    delay: Duration,
}

impl CannedDirectionsServer {
    /// Serve `body` as JSON with HTTP `status`.
    ///
    /// # Errors
    ///
    /// Returns an error if the loopback listener cannot be bound.
    pub fn json(status: u16, body: impl Into<String>) -> std::io::Result<Self> {
        Self::start(Canned {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        })
    }

    /// Serve `body` after waiting `delay`, to provoke timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the loopback listener cannot be bound.
    pub fn slow(delay: Duration, body: impl Into<String>) -> std::io::Result<Self> {
        Self::start(Canned {
            status: 200,
            body: body.into(),
            delay,
        })
    }

    fn start(canned: Canned) -> std::io::Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        let address = listener.local_addr()?;
        let requests = Arc::new(Mutex::new(Vec::new()));
        let shutdown = Arc::new(Mutex::new(false));
        let handle = {
            let requests = Arc::clone(&requests);
            let shutdown = Arc::clone(&shutdown);
            thread::spawn(move || {
                for stream in listener.incoming() {
                    if *shutdown.lock().unwrap_or_else(PoisonError::into_inner) {
                        break;
                    }
                    if let Ok(stream) = stream {
                        serve(stream, &canned, &requests);
                    }
                }
            })
        };
        Ok(Self {
            address,
            requests,
            handle: Some(handle),
            shutdown,
        })
    }

    /// Base URL to configure the provider with.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.address)
    }

    /// Request lines received so far, e.g. `GET /maps/api/... HTTP/1.1`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for CannedDirectionsServer {
    fn drop(&mut self) {
        *self.shutdown.lock().unwrap_or_else(PoisonError::into_inner) = true;
        // Wake the accept loop so it observes the flag.
        let _wake = TcpStream::connect(self.address);
        if let Some(handle) = self.handle.take() {
            let _joined = handle.join();
        }
    }
}

fn serve(stream: TcpStream, canned: &Canned, requests: &Mutex<Vec<String>>) {
    let mut reader = BufReader::new(&stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) | Err(_) => break,
            Ok(_) if header.trim().is_empty() => break,
            Ok(_) => {}
        }
    }
    requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(request_line.trim_end().to_owned());

    thread::sleep(canned.delay);
    let response = format!(
        "HTTP/1.1 {} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        canned.status,
        canned.body.len(),
        canned.body
    );
    let mut writer = &stream;
    let _written = writer.write_all(response.as_bytes());
    let _flushed = writer.flush();
}
