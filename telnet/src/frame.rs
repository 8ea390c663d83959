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

//! Telnet wire frames and their encoding

use crate::consts::command;
use crate::option::TelnetOption;
use bytes::{BufMut, BytesMut};

/// One decoded unit of the Telnet stream.
///
/// Negotiation frames carry the option they concern; subnegotiation carries
/// an already un-escaped payload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TelnetFrame {
    /// A single data byte
    Data(u8),
    /// IAC NOP
    NoOperation,
    /// IAC DM
    DataMark,
    /// IAC BRK
    Break,
    /// IAC IP
    InterruptProcess,
    /// IAC AO
    AbortOutput,
    /// IAC AYT
    AreYouThere,
    /// IAC EC
    EraseCharacter,
    /// IAC EL
    EraseLine,
    /// IAC GA
    GoAhead,
    /// IAC WILL option
    Will(TelnetOption),
    /// IAC WONT option
    Wont(TelnetOption),
    /// IAC DO option
    Do(TelnetOption),
    /// IAC DONT option
    Dont(TelnetOption),
    /// IAC SB option payload IAC SE
    Subnegotiate(TelnetOption, Vec<u8>),
}

impl TelnetFrame {
    /// Encode this frame onto the wire, escaping IAC where the protocol
    /// requires it.
    pub fn encode_into(&self, dst: &mut BytesMut) {
        match self {
            TelnetFrame::Data(byte) => {
                if *byte == command::IAC {
                    dst.put_u8(command::IAC);
                }
                dst.put_u8(*byte);
            }
            TelnetFrame::NoOperation => put_command(dst, command::NOP),
            TelnetFrame::DataMark => put_command(dst, command::DM),
            TelnetFrame::Break => put_command(dst, command::BRK),
            TelnetFrame::InterruptProcess => put_command(dst, command::IP),
            TelnetFrame::AbortOutput => put_command(dst, command::AO),
            TelnetFrame::AreYouThere => put_command(dst, command::AYT),
            TelnetFrame::EraseCharacter => put_command(dst, command::EC),
            TelnetFrame::EraseLine => put_command(dst, command::EL),
            TelnetFrame::GoAhead => put_command(dst, command::GA),
            TelnetFrame::Will(option) => put_negotiation(dst, command::WILL, *option),
            TelnetFrame::Wont(option) => put_negotiation(dst, command::WONT, *option),
            TelnetFrame::Do(option) => put_negotiation(dst, command::DO, *option),
            TelnetFrame::Dont(option) => put_negotiation(dst, command::DONT, *option),
            TelnetFrame::Subnegotiate(option, payload) => {
                dst.put_u8(command::IAC);
                dst.put_u8(command::SB);
                dst.put_u8(option.to_u8());
                encode_data(payload, dst);
                dst.put_u8(command::IAC);
                dst.put_u8(command::SE);
            }
        }
    }
}

fn put_command(dst: &mut BytesMut, cmd: u8) {
    dst.put_u8(command::IAC);
    dst.put_u8(cmd);
}

fn put_negotiation(dst: &mut BytesMut, verb: u8, option: TelnetOption) {
    dst.put_u8(command::IAC);
    dst.put_u8(verb);
    dst.put_u8(option.to_u8());
}

/// Append raw bytes with every 0xFF doubled
pub fn encode_data(data: &[u8], dst: &mut BytesMut) {
    dst.reserve(data.len());
    for &byte in data {
        if byte == command::IAC {
            dst.put_u8(command::IAC);
        }
        dst.put_u8(byte);
    }
}
