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

//! Stream decoder tying the wire format to option negotiation

use crate::consts::command;
use crate::error::TelnetError;
use crate::frame::{self, TelnetFrame};
use crate::option::TelnetOption;
use crate::qstate::{NegotiationPolicy, OptionNegotiator, Reaction, TelnetSide};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::{trace, warn};

/// One decoded occurrence the layer above cares about
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TelnetEvent {
    /// A plain data byte (IAC IAC already collapsed)
    Data(u8),
    /// An option changed its operative state on one side
    Option {
        side: TelnetSide,
        option: TelnetOption,
        enabled: bool,
    },
    /// A complete, un-escaped subnegotiation payload
    Subnegotiation(TelnetOption, Bytes),
    /// A simple single-byte command (NOP, AYT, GA, ...)
    Command(u8),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Verb {
    Will,
    Wont,
    Do,
    Dont,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum DecodeState {
    /// Plain data flow
    Data,
    /// Saw IAC, the command byte follows
    Command,
    /// Saw IAC WILL/WONT/DO/DONT, the option byte follows
    Negotiate(Verb),
    /// Saw IAC SB, the option byte follows
    SubnegotiateOption,
    /// Collecting subnegotiation payload for this option
    SubnegotiateData(u8),
    /// Saw IAC inside a subnegotiation payload
    SubnegotiateIac(u8),
}

/// Decodes an inbound telnet stream byte by byte, drives the
/// [`OptionNegotiator`], and accumulates everything that must go back on
/// the wire in a reply buffer the caller drains with [`take_reply`].
///
/// A protocol violation (an IAC followed by a byte that names no command)
/// permanently kills the decoder: the error is recorded, all further input
/// is discarded, and the connection goes silent rather than being dropped.
///
/// An unterminated subnegotiation never corrupts state; decoding simply
/// stalls until more bytes arrive.
///
/// [`take_reply`]: TelnetMachine::take_reply
pub struct TelnetMachine {
    negotiator: OptionNegotiator,
    state: DecodeState,
    subnegotiation: BytesMut,
    reply: BytesMut,
    dead: Option<TelnetError>,
}

impl TelnetMachine {
    pub fn new(policy: NegotiationPolicy) -> Self {
        Self {
            negotiator: OptionNegotiator::new(policy),
            state: DecodeState::Data,
            subnegotiation: BytesMut::new(),
            reply: BytesMut::new(),
            dead: None,
        }
    }

    /// Decode the next event out of `src`, consuming only the bytes it
    /// needed. Returns `None` when `src` holds no complete event yet.
    pub fn decode(&mut self, src: &mut BytesMut) -> Option<TelnetEvent> {
        if self.dead.is_some() {
            src.clear();
            return None;
        }
        while src.has_remaining() {
            let byte = src.get_u8();
            match (self.state, byte) {
                (DecodeState::Data, command::IAC) => self.state = DecodeState::Command,
                (DecodeState::Data, byte) => return Some(TelnetEvent::Data(byte)),

                (DecodeState::Command, command::IAC) => {
                    self.state = DecodeState::Data;
                    return Some(TelnetEvent::Data(command::IAC));
                }
                (DecodeState::Command, command::WILL) => {
                    self.state = DecodeState::Negotiate(Verb::Will)
                }
                (DecodeState::Command, command::WONT) => {
                    self.state = DecodeState::Negotiate(Verb::Wont)
                }
                (DecodeState::Command, command::DO) => {
                    self.state = DecodeState::Negotiate(Verb::Do)
                }
                (DecodeState::Command, command::DONT) => {
                    self.state = DecodeState::Negotiate(Verb::Dont)
                }
                (DecodeState::Command, command::SB) => {
                    self.state = DecodeState::SubnegotiateOption
                }
                (DecodeState::Command, byte @ command::NOP..=command::GA) => {
                    self.state = DecodeState::Data;
                    return Some(TelnetEvent::Command(byte));
                }
                (DecodeState::Command, byte) => {
                    warn!(byte, "unknown command after IAC, decoder is now dead");
                    self.dead = Some(TelnetError::UnknownCommand(byte));
                    src.clear();
                    return None;
                }

                (DecodeState::Negotiate(verb), byte) => {
                    self.state = DecodeState::Data;
                    let option = TelnetOption::from_u8(byte);
                    let reaction = self.negotiate(verb, option);
                    if let Some(frame) = reaction.reply {
                        frame.encode_into(&mut self.reply);
                    }
                    if let Some((side, enabled)) = reaction.status {
                        return Some(TelnetEvent::Option {
                            side,
                            option,
                            enabled,
                        });
                    }
                }

                (DecodeState::SubnegotiateOption, byte) => {
                    self.subnegotiation.clear();
                    self.state = DecodeState::SubnegotiateData(byte);
                }
                (DecodeState::SubnegotiateData(option), command::IAC) => {
                    self.state = DecodeState::SubnegotiateIac(option);
                }
                (DecodeState::SubnegotiateData(_), byte) => {
                    self.subnegotiation.put_u8(byte);
                }
                (DecodeState::SubnegotiateIac(option), command::IAC) => {
                    self.subnegotiation.put_u8(command::IAC);
                    self.state = DecodeState::SubnegotiateData(option);
                }
                (DecodeState::SubnegotiateIac(option), command::SE) => {
                    self.state = DecodeState::Data;
                    let payload = self.subnegotiation.split().freeze();
                    return Some(TelnetEvent::Subnegotiation(
                        TelnetOption::from_u8(option),
                        payload,
                    ));
                }
                (DecodeState::SubnegotiateIac(option), byte) => {
                    // tolerated: drop the stray byte, keep collecting
                    warn!(byte, "unexpected byte after IAC in subnegotiation");
                    self.state = DecodeState::SubnegotiateData(option);
                }
            }
        }
        None
    }

    /// Ask to enable an option on our side; the WILL lands in the reply
    /// buffer if one is due.
    pub fn ask_to(&mut self, option: TelnetOption) {
        let frame = self.negotiator.ask_to(option);
        self.push_reply(frame);
    }

    /// Ask to disable an option on our side
    pub fn ask_to_not(&mut self, option: TelnetOption) {
        let frame = self.negotiator.ask_to_not(option);
        self.push_reply(frame);
    }

    /// Ask the peer to enable an option
    pub fn ask_for(&mut self, option: TelnetOption) {
        let frame = self.negotiator.ask_for(option);
        self.push_reply(frame);
    }

    /// Ask the peer to disable an option
    pub fn ask_for_not(&mut self, option: TelnetOption) {
        let frame = self.negotiator.ask_for_not(option);
        self.push_reply(frame);
    }

    /// Queue raw application bytes, escaping IAC
    pub fn send_data(&mut self, data: &[u8]) {
        frame::encode_data(data, &mut self.reply);
    }

    /// Queue text, converting `\n` to the NVT `\r\n` sequence
    pub fn send_text(&mut self, text: &str) {
        for chunk in text.split_inclusive('\n') {
            match chunk.strip_suffix('\n') {
                Some(body) => {
                    frame::encode_data(body.as_bytes(), &mut self.reply);
                    self.reply.extend_from_slice(b"\r\n");
                }
                None => frame::encode_data(chunk.as_bytes(), &mut self.reply),
            }
        }
    }

    /// Queue a subnegotiation frame for the peer
    pub fn send_subnegotiation(&mut self, option: TelnetOption, payload: &[u8]) {
        TelnetFrame::Subnegotiate(option, payload.to_vec()).encode_into(&mut self.reply);
    }

    /// Drain everything queued for the wire
    pub fn take_reply(&mut self) -> Option<Bytes> {
        if self.reply.is_empty() {
            None
        } else {
            Some(self.reply.split().freeze())
        }
    }

    /// Whether our side has the option operatively enabled
    pub fn local_enabled(&self, option: TelnetOption) -> bool {
        self.negotiator.local_enabled(option)
    }

    /// Whether the peer has the option operatively enabled
    pub fn remote_enabled(&self, option: TelnetOption) -> bool {
        self.negotiator.remote_enabled(option)
    }

    /// Requests still awaiting a peer acknowledgement
    pub fn outstanding(&self) -> usize {
        self.negotiator.outstanding()
    }

    /// The violation that killed this decoder, if any
    pub fn dead(&self) -> Option<&TelnetError> {
        self.dead.as_ref()
    }

    fn negotiate(&mut self, verb: Verb, option: TelnetOption) -> Reaction {
        trace!(?verb, %option, "negotiation verb received");
        match verb {
            Verb::Will => self.negotiator.receive_will(option),
            Verb::Wont => self.negotiator.receive_wont(option),
            Verb::Do => self.negotiator.receive_do(option),
            Verb::Dont => self.negotiator.receive_dont(option),
        }
    }

    fn push_reply(&mut self, frame: Option<TelnetFrame>) {
        if let Some(frame) = frame {
            frame.encode_into(&mut self.reply);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_machine() -> TelnetMachine {
        TelnetMachine::new(
            NegotiationPolicy::new()
                .allow_local(TelnetOption::Echo)
                .allow_remote(TelnetOption::Echo),
        )
    }

    fn decode_all(machine: &mut TelnetMachine, bytes: &[u8]) -> Vec<TelnetEvent> {
        let mut src = BytesMut::from(bytes);
        let mut events = Vec::new();
        while let Some(event) = machine.decode(&mut src) {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_plain_data_passes_through() {
        let mut machine = echo_machine();
        let events = decode_all(&mut machine, b"hi");
        assert_eq!(events, vec![TelnetEvent::Data(b'h'), TelnetEvent::Data(b'i')]);
        assert!(machine.take_reply().is_none());
    }

    #[test]
    fn test_escaped_iac_is_one_data_byte() {
        let mut machine = echo_machine();
        let events = decode_all(&mut machine, &[255, 255]);
        assert_eq!(events, vec![TelnetEvent::Data(255)]);
    }

    #[test]
    fn test_will_echo_gets_do_and_status() {
        let mut machine = echo_machine();
        let events = decode_all(&mut machine, &[255, 251, 1]);
        assert_eq!(events, vec![TelnetEvent::Option {
            side: TelnetSide::Remote,
            option: TelnetOption::Echo,
            enabled: true,
        }]);
        assert_eq!(machine.take_reply().unwrap().as_ref(), &[255, 253, 1]);
    }

    #[test]
    fn test_unsupported_will_gets_dont_and_no_event() {
        let mut machine = echo_machine();
        let events = decode_all(&mut machine, &[255, 251, 34]);
        assert!(events.is_empty());
        assert_eq!(machine.take_reply().unwrap().as_ref(), &[255, 254, 34]);
    }

    #[test]
    fn test_subnegotiation_with_escaped_iac() {
        let mut machine = echo_machine();
        let events = decode_all(&mut machine, &[255, 250, 31, 0, 255, 255, 80, 255, 240]);
        assert_eq!(events, vec![TelnetEvent::Subnegotiation(
            TelnetOption::WindowSize,
            Bytes::from_static(&[0, 255, 80]),
        )]);
    }

    #[test]
    fn test_unterminated_subnegotiation_stalls() {
        let mut machine = echo_machine();
        assert!(decode_all(&mut machine, &[255, 250, 31, 0, 80]).is_empty());
        // the rest arrives later and completes the frame
        let events = decode_all(&mut machine, &[255, 240, b'x']);
        assert_eq!(events, vec![
            TelnetEvent::Subnegotiation(
                TelnetOption::WindowSize,
                Bytes::from_static(&[0, 80])
            ),
            TelnetEvent::Data(b'x'),
        ]);
    }

    #[test]
    fn test_unknown_command_kills_decoder() {
        let mut machine = echo_machine();
        let events = decode_all(&mut machine, &[255, 100, b'a', b'b']);
        assert!(events.is_empty());
        assert_eq!(machine.dead(), Some(&TelnetError::UnknownCommand(100)));
        // everything after the violation is discarded forever
        assert!(decode_all(&mut machine, b"more").is_empty());
    }

    #[test]
    fn test_simple_commands_surface() {
        let mut machine = echo_machine();
        let events = decode_all(&mut machine, &[255, 241, 255, 246]);
        assert_eq!(events, vec![
            TelnetEvent::Command(241),
            TelnetEvent::Command(246)
        ]);
    }

    #[test]
    fn test_send_text_converts_newlines() {
        let mut machine = echo_machine();
        machine.send_text("a\nb");
        assert_eq!(machine.take_reply().unwrap().as_ref(), b"a\r\nb");
    }

    #[test]
    fn test_byte_at_a_time_matches_whole_feed() {
        let stream: &[u8] = &[b'x', 255, 251, 1, 255, 250, 1, 9, 255, 240, b'y'];

        let mut whole = echo_machine();
        let whole_events = decode_all(&mut whole, stream);
        let whole_reply = whole.take_reply();

        let mut split = echo_machine();
        let mut split_events = Vec::new();
        for &byte in stream {
            split_events.extend(decode_all(&mut split, &[byte]));
        }
        let split_reply = split.take_reply();

        assert_eq!(whole_events, split_events);
        assert_eq!(whole_reply, split_reply);
    }
}
