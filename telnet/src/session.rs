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

//! Line-mode telnet sessions on top of reactor workers

use crate::machine::{TelnetEvent, TelnetMachine};
use crate::option::TelnetOption;
use crate::qstate::{NegotiationPolicy, TelnetSide};
use bytes::BytesMut;
use ioflux_lineedit::{EditOutcome, KeyDecoder, LineEditor};
use ioflux_reactor::{Worker, WorkerHandler};
use tracing::trace;

const BS_SPACE_BS: &[u8] = b"\x08 \x08";
const BELL: &[u8] = b"\x07";

/// Outgoing side of a session, handed to [`SessionHandler`] callbacks.
pub struct SessionOutput<'a> {
    machine: &'a mut TelnetMachine,
    close: &'a mut bool,
}

impl SessionOutput<'_> {
    /// Send text followed by a newline
    pub fn send_line(&mut self, line: &str) {
        self.machine.send_text(line);
        self.machine.send_text("\n");
    }

    /// Send text as-is (with NVT newline conversion)
    pub fn send_text(&mut self, text: &str) {
        self.machine.send_text(text);
    }

    /// Send raw bytes, escaped for the wire
    pub fn send_data(&mut self, data: &[u8]) {
        self.machine.send_data(data);
    }

    /// Send a subnegotiation frame
    pub fn send_subnegotiation(&mut self, option: TelnetOption, payload: &[u8]) {
        self.machine.send_subnegotiation(option, payload);
    }

    /// End the session after pending output drains
    pub fn close(&mut self) {
        *self.close = true;
    }
}

/// Application callbacks for a line-mode session.
///
/// All callbacks run on the reactor task. Output queued on the
/// [`SessionOutput`] is flushed when the callback returns.
pub trait SessionHandler: Send + 'static {
    /// The session is up and option negotiation has been initiated
    fn on_connected(&mut self, output: &mut SessionOutput<'_>) {
        let _ = output;
    }

    /// The user completed a line of input
    fn on_line(&mut self, output: &mut SessionOutput<'_>, line: &str);

    /// An option changed its operative state
    fn on_option(
        &mut self,
        output: &mut SessionOutput<'_>,
        side: TelnetSide,
        option: TelnetOption,
        enabled: bool,
    ) {
        let _ = (output, side, option, enabled);
    }

    /// The peer sent a subnegotiation payload
    fn on_subnegotiation(
        &mut self,
        output: &mut SessionOutput<'_>,
        option: TelnetOption,
        data: &[u8],
    ) {
        let _ = (output, option, data);
    }

    /// The connection ended
    fn on_close(&mut self) {}
}

/// A [`WorkerHandler`] that runs a full interactive telnet session:
/// option negotiation, local echo, and line editing with history.
///
/// Echo rendering is the classic naive kind: correct for typing at the end
/// of the line, approximate for edits in the middle.
pub struct TelnetSession {
    machine: TelnetMachine,
    keys: KeyDecoder,
    editor: LineEditor,
    handler: Box<dyn SessionHandler>,
    close_requested: bool,
}

impl TelnetSession {
    pub fn new<H: SessionHandler>(policy: NegotiationPolicy, handler: H) -> Self {
        Self {
            machine: TelnetMachine::new(policy),
            keys: KeyDecoder::new(),
            editor: LineEditor::default(),
            handler: Box::new(handler),
            close_requested: false,
        }
    }

    /// The usual server-side policy: we drive echo and suppress go-ahead.
    pub fn server_policy() -> NegotiationPolicy {
        NegotiationPolicy::new()
            .allow_local(TelnetOption::Echo)
            .allow_local(TelnetOption::SuppressGoAhead)
            .allow_remote(TelnetOption::SuppressGoAhead)
    }

    fn echoing(&self) -> bool {
        self.machine.local_enabled(TelnetOption::Echo)
    }

    fn render(&mut self, outcome: &EditOutcome) {
        if !self.echoing() {
            return;
        }
        match outcome {
            EditOutcome::None => {}
            EditOutcome::Inserted(c) => {
                let mut buf = [0u8; 4];
                self.machine.send_data(c.encode_utf8(&mut buf).as_bytes());
            }
            EditOutcome::Erased(n) => {
                for _ in 0..*n {
                    self.machine.send_data(BS_SPACE_BS);
                }
            }
            EditOutcome::Truncated(n) => {
                // blank the tail in place, then step back over it
                for _ in 0..*n {
                    self.machine.send_data(b" ");
                }
                for _ in 0..*n {
                    self.machine.send_data(b"\x08");
                }
            }
            EditOutcome::Completed(_) => {
                self.machine.send_data(b"\r\n");
            }
            EditOutcome::Recalled { erased, line } => {
                for _ in 0..*erased {
                    self.machine.send_data(BS_SPACE_BS);
                }
                self.machine.send_data(line.as_bytes());
            }
            EditOutcome::Bell => {
                self.machine.send_data(BELL);
            }
        }
    }

    fn flush(&mut self, worker: &mut Worker) {
        if let Some(reply) = self.machine.take_reply() {
            worker.send(&reply);
        }
        if self.close_requested {
            worker.close();
        }
    }
}

impl WorkerHandler for TelnetSession {
    fn on_connect(&mut self, worker: &mut Worker) {
        self.machine.ask_to(TelnetOption::Echo);
        self.machine.ask_to(TelnetOption::SuppressGoAhead);
        let mut output = SessionOutput {
            machine: &mut self.machine,
            close: &mut self.close_requested,
        };
        self.handler.on_connected(&mut output);
        self.flush(worker);
    }

    fn on_receive(&mut self, worker: &mut Worker) {
        let mut src = BytesMut::from(&worker.read_all()[..]);
        while let Some(event) = self.machine.decode(&mut src) {
            match event {
                TelnetEvent::Data(byte) => {
                    let Some(action) = self.keys.feed(byte) else {
                        continue;
                    };
                    let outcome = self.editor.apply(action);
                    self.render(&outcome);
                    if let EditOutcome::Completed(line) = outcome {
                        let mut output = SessionOutput {
                            machine: &mut self.machine,
                            close: &mut self.close_requested,
                        };
                        self.handler.on_line(&mut output, &line);
                    }
                }
                TelnetEvent::Option {
                    side,
                    option,
                    enabled,
                } => {
                    let mut output = SessionOutput {
                        machine: &mut self.machine,
                        close: &mut self.close_requested,
                    };
                    self.handler.on_option(&mut output, side, option, enabled);
                }
                TelnetEvent::Subnegotiation(option, data) => {
                    let mut output = SessionOutput {
                        machine: &mut self.machine,
                        close: &mut self.close_requested,
                    };
                    self.handler.on_subnegotiation(&mut output, option, &data);
                }
                TelnetEvent::Command(byte) => trace!(byte, "ignoring simple command"),
            }
        }
        self.flush(worker);
    }

    fn on_close(&mut self, _worker: &mut Worker) -> bool {
        self.handler.on_close();
        true
    }
}
