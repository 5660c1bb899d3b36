//! Test support: a loopback fake RPC server
//!
//! Accepts connections on an ephemeral port, records every request frame
//! and answers calls through a handler closure.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

use kvrpc::keyvalues::{self, document_end};
use kvrpc::protocol::{CallFrame, ResponseFrame};
use kvrpc::{Client, ClientConfig};

/// What the server does after reading a call
pub enum Reply {
    /// Send this response frame
    Frame(ResponseFrame),

    /// Send raw bytes then close
    Raw(Vec<u8>),

    /// Send the frame in pieces of `n` bytes with a pause between them
    Trickle(ResponseFrame, usize),

    /// Close without answering
    Close,

    /// Keep the connection open and never answer
    Silent,
}

type Handler = dyn Fn(&CallFrame) -> Reply + Send + Sync;

pub struct FakeServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<CallFrame>>>,
    received: Receiver<CallFrame>,
}

impl FakeServer {
    /// Start a server answering calls with `handler`
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&CallFrame) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = unbounded();
        let handler: Arc<Handler> = Arc::new(handler);

        let shared = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let handler = Arc::clone(&handler);
                let requests = Arc::clone(&shared);
                let tx = tx.clone();
                thread::spawn(move || serve(stream, handler, requests, tx));
            }
        });

        Self {
            addr,
            requests,
            received: rx,
        }
    }

    /// A server that echoes each call's params back as its result
    pub fn echo() -> Self {
        Self::start(|frame| Reply::Frame(ResponseFrame::success(frame.params.clone())))
    }

    pub fn addr(&self) -> String {
        self.addr.to_string()
    }

    /// Client pointed at this server with short timeouts
    pub fn client(&self) -> Client {
        Client::new(self.config().build()).unwrap()
    }

    pub fn config(&self) -> kvrpc::config::ClientConfigBuilder {
        ClientConfig::builder().server_addr(self.addr()).timeout_ms(2000)
    }

    /// Wait for the next request frame the server reads
    pub fn next_request(&self) -> CallFrame {
        self.received
            .recv_timeout(Duration::from_secs(5))
            .expect("server did not receive a request")
    }

    /// Every request frame read so far
    pub fn requests(&self) -> Vec<CallFrame> {
        self.requests.lock().clone()
    }
}

fn serve(
    mut stream: TcpStream,
    handler: Arc<Handler>,
    requests: Arc<Mutex<Vec<CallFrame>>>,
    tx: Sender<CallFrame>,
) {
    let Some(frame) = read_request(&mut stream) else {
        return;
    };
    requests.lock().push(frame.clone());
    let _ = tx.send(frame.clone());

    // Notifications are never answered
    if frame.is_notification() {
        return;
    }

    match handler(&frame) {
        Reply::Frame(response) => {
            let _ = stream.write_all(&encode(&response));
        }
        Reply::Raw(bytes) => {
            let _ = stream.write_all(&bytes);
        }
        Reply::Trickle(response, step) => {
            for piece in encode(&response).chunks(step.max(1)) {
                if stream.write_all(piece).is_err() {
                    return;
                }
                let _ = stream.flush();
                thread::sleep(Duration::from_millis(1));
            }
        }
        Reply::Close => {}
        Reply::Silent => {
            let mut sink = [0u8; 64];
            while matches!(stream.read(&mut sink), Ok(n) if n > 0) {}
        }
    }
}

fn read_request(stream: &mut TcpStream) -> Option<CallFrame> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).ok()?;
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = document_end(&buf) {
            buf.truncate(end);
            break;
        }
        if n == 0 {
            break;
        }
    }
    let text = String::from_utf8(buf).ok()?;
    let envelope = keyvalues::parse(&text).ok()?;
    CallFrame::from_envelope(envelope).ok()
}

pub fn encode(response: &ResponseFrame) -> Vec<u8> {
    keyvalues::to_string(&response.to_envelope()).into_bytes()
}

/// An address nothing is listening on
pub fn dead_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}
