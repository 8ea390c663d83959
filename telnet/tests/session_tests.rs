//
// Copyright 2024-2026 The ioflux Authors. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! End-to-end telnet session tests over a live reactor

use ioflux_reactor::{Reactor, ReactorConfig, ReactorHandle, WorkerHandler};
use ioflux_telnet::{SessionHandler, SessionOutput, TelnetSession};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

/// Records completed lines and answers each one; "quit" ends the session
struct LineRecorder {
    lines: Arc<Mutex<Vec<String>>>,
}

impl SessionHandler for LineRecorder {
    fn on_connected(&mut self, output: &mut SessionOutput<'_>) {
        output.send_line("ready");
    }

    fn on_line(&mut self, output: &mut SessionOutput<'_>, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
        if line == "quit" {
            output.close();
        } else {
            output.send_line(&format!("echo: {line}"));
        }
    }
}

async fn start_server() -> (ReactorHandle, SocketAddr, Arc<Mutex<Vec<String>>>) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
    let config = ReactorConfig::default().with_poll_interval(Duration::from_millis(20));
    let (reactor, handle) = Reactor::new(config);
    tokio::spawn(reactor.run());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let lines = Arc::new(Mutex::new(Vec::new()));
    let lines_factory = Arc::clone(&lines);
    handle
        .listen_on(listener, move |_peer, _handle| {
            Box::new(TelnetSession::new(
                TelnetSession::server_policy(),
                LineRecorder {
                    lines: Arc::clone(&lines_factory),
                },
            )) as Box<dyn WorkerHandler>
        })
        .unwrap();
    (handle, addr, lines)
}

/// Read until `needle` shows up in the accumulated stream
async fn read_until(client: &mut TcpStream, needle: &[u8]) -> Vec<u8> {
    let mut seen = Vec::new();
    let mut buffer = [0u8; 256];
    loop {
        let n = timeout(Duration::from_secs(2), client.read(&mut buffer))
            .await
            .expect("read timed out")
            .unwrap();
        assert!(n > 0, "connection closed while waiting for {needle:?}");
        seen.extend_from_slice(&buffer[..n]);
        if seen.windows(needle.len()).any(|w| w == needle) {
            return seen;
        }
    }
}

#[tokio::test]
async fn test_session_negotiates_then_answers_lines() {
    let (handle, addr, lines) = start_server().await;
    let mut client = TcpStream::connect(addr).await.unwrap();

    let seen = read_until(&mut client, b"ready\r\n").await;
    // the session leads with WILL ECHO and WILL SUPPRESS-GO-AHEAD
    assert!(seen.starts_with(&[255, 251, 1, 255, 251, 3]));

    // refuse echo so the server does not mirror our keystrokes
    client.write_all(&[255, 254, 1]).await.unwrap();
    client.write_all(b"hello\r\n").await.unwrap();
    read_until(&mut client, b"echo: hello\r\n").await;

    assert_eq!(lines.lock().unwrap().clone(), vec!["hello".to_string()]);
    handle.stop().unwrap();
}

#[tokio::test]
async fn test_session_line_editing_with_echo() {
    let (handle, addr, lines) = start_server().await;
    let mut client = TcpStream::connect(addr).await.unwrap();
    read_until(&mut client, b"ready\r\n").await;

    // accept echo, then type with two typos corrected by backspace
    client.write_all(&[255, 253, 1]).await.unwrap();
    client
        .write_all(b"helxx\x7f\x7flo\r\n")
        .await
        .unwrap();
    read_until(&mut client, b"echo: hello\r\n").await;

    assert_eq!(lines.lock().unwrap().clone(), vec!["hello".to_string()]);
    handle.stop().unwrap();
}

#[tokio::test]
async fn test_session_quit_closes_connection() {
    let (handle, addr, lines) = start_server().await;
    let mut client = TcpStream::connect(addr).await.unwrap();
    read_until(&mut client, b"ready\r\n").await;

    client.write_all(&[255, 254, 1]).await.unwrap();
    client.write_all(b"quit\r\n").await.unwrap();

    // the server finishes pending output and hangs up
    let mut rest = Vec::new();
    timeout(Duration::from_secs(2), client.read_to_end(&mut rest))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(lines.lock().unwrap().clone(), vec!["quit".to_string()]);
    handle.stop().unwrap();
}

#[tokio::test]
async fn test_session_survives_embedded_iac_data() {
    let (handle, addr, lines) = start_server().await;
    let mut client = TcpStream::connect(addr).await.unwrap();
    read_until(&mut client, b"ready\r\n").await;

    client.write_all(&[255, 254, 1]).await.unwrap();
    // IAC NOP spliced into the middle of a line must be transparent
    client.write_all(b"he").await.unwrap();
    client.write_all(&[255, 241]).await.unwrap();
    client.write_all(b"llo\r\n").await.unwrap();
    read_until(&mut client, b"echo: hello\r\n").await;

    assert_eq!(lines.lock().unwrap().clone(), vec!["hello".to_string()]);
    handle.stop().unwrap();
}
