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

//! Byte-at-a-time decoding of terminal keystrokes

use crate::action::EditAction;
use tracing::trace;

const ESC: u8 = 0x1B;
const DEL: u8 = 0x7F;

#[derive(Debug, Clone, PartialEq, Eq)]
enum DecodeState {
    /// Plain characters and control bytes
    Plain,
    /// Saw ESC, waiting for the introducer
    Escape,
    /// Inside a CSI sequence, collecting parameter bytes
    Csi(Vec<u8>),
    /// Saw ESC O, a single SS3 final byte follows
    Ss3,
    /// Saw CR; a following LF or NUL belongs to the same Enter
    AfterReturn,
}

/// Decodes a terminal byte stream into [`EditAction`]s.
///
/// Handles NVT ASCII, the usual readline-style control characters, and the
/// CSI/SS3 arrow and navigation sequences. Bytes that decode to nothing
/// (unknown escapes, non-ASCII) are dropped.
#[derive(Debug)]
pub struct KeyDecoder {
    state: DecodeState,
}

impl Default for KeyDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self {
            state: DecodeState::Plain,
        }
    }

    /// Feed one byte; returns the action it completes, if any.
    pub fn feed(&mut self, byte: u8) -> Option<EditAction> {
        if self.state == DecodeState::AfterReturn {
            self.state = DecodeState::Plain;
            // CR LF and CR NUL both mean the single Enter already emitted
            if byte == b'\n' || byte == 0 {
                return None;
            }
        }
        match std::mem::replace(&mut self.state, DecodeState::Plain) {
            DecodeState::Plain => self.feed_plain(byte),
            DecodeState::Escape => match byte {
                b'[' => {
                    self.state = DecodeState::Csi(Vec::new());
                    None
                }
                b'O' => {
                    self.state = DecodeState::Ss3;
                    None
                }
                other => {
                    trace!(byte = other, "ignoring unknown escape");
                    None
                }
            },
            DecodeState::Csi(mut params) => {
                if (0x30..=0x3F).contains(&byte) {
                    params.push(byte);
                    self.state = DecodeState::Csi(params);
                    None
                } else {
                    Self::finish_csi(&params, byte)
                }
            }
            DecodeState::Ss3 => Self::navigation(byte),
            DecodeState::AfterReturn => unreachable!("handled above"),
        }
    }

    fn feed_plain(&mut self, byte: u8) -> Option<EditAction> {
        match byte {
            b'\r' => {
                self.state = DecodeState::AfterReturn;
                Some(EditAction::Enter)
            }
            b'\n' => Some(EditAction::Enter),
            0x08 | DEL => Some(EditAction::Backspace),
            0x01 => Some(EditAction::Home),      // ^A
            0x02 => Some(EditAction::MoveLeft),  // ^B
            0x04 => Some(EditAction::Delete),    // ^D
            0x05 => Some(EditAction::End),       // ^E
            0x06 => Some(EditAction::MoveRight), // ^F
            0x0B => Some(EditAction::KillToEnd), // ^K
            0x0E => Some(EditAction::HistoryNext), // ^N
            0x10 => Some(EditAction::HistoryPrev), // ^P
            0x15 => Some(EditAction::KillLine),  // ^U
            0x17 => Some(EditAction::WordErase), // ^W
            ESC => {
                self.state = DecodeState::Escape;
                None
            }
            0x20..=0x7E => Some(EditAction::Insert(byte as char)),
            _ => None,
        }
    }

    fn finish_csi(params: &[u8], terminator: u8) -> Option<EditAction> {
        match terminator {
            b'~' => match params {
                b"1" | b"7" => Some(EditAction::Home),
                b"3" => Some(EditAction::Delete),
                b"4" | b"8" => Some(EditAction::End),
                _ => None,
            },
            _ if params.is_empty() => Self::navigation(terminator),
            _ => None,
        }
    }

    fn navigation(byte: u8) -> Option<EditAction> {
        match byte {
            b'A' => Some(EditAction::HistoryPrev),
            b'B' => Some(EditAction::HistoryNext),
            b'C' => Some(EditAction::MoveRight),
            b'D' => Some(EditAction::MoveLeft),
            b'H' => Some(EditAction::Home),
            b'F' => Some(EditAction::End),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(bytes: &[u8]) -> Vec<EditAction> {
        let mut decoder = KeyDecoder::new();
        bytes.iter().filter_map(|&b| decoder.feed(b)).collect()
    }

    #[test]
    fn test_plain_text_and_enter() {
        assert_eq!(
            decode_all(b"hi\r\n"),
            vec![
                EditAction::Insert('h'),
                EditAction::Insert('i'),
                EditAction::Enter,
            ]
        );
    }

    #[test]
    fn test_cr_nul_is_one_enter() {
        assert_eq!(decode_all(b"a\r\0b"), vec![
            EditAction::Insert('a'),
            EditAction::Enter,
            EditAction::Insert('b'),
        ]);
    }

    #[test]
    fn test_bare_cr_and_bare_lf_each_enter() {
        assert_eq!(decode_all(b"\r\r"), vec![EditAction::Enter, EditAction::Enter]);
        assert_eq!(decode_all(b"\n"), vec![EditAction::Enter]);
    }

    #[test]
    fn test_control_characters() {
        assert_eq!(decode_all(&[0x01]), vec![EditAction::Home]);
        assert_eq!(decode_all(&[0x0B]), vec![EditAction::KillToEnd]);
        assert_eq!(decode_all(&[0x15]), vec![EditAction::KillLine]);
        assert_eq!(decode_all(&[0x17]), vec![EditAction::WordErase]);
        assert_eq!(decode_all(&[0x7F]), vec![EditAction::Backspace]);
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(decode_all(b"\x1b[A"), vec![EditAction::HistoryPrev]);
        assert_eq!(decode_all(b"\x1b[D"), vec![EditAction::MoveLeft]);
        assert_eq!(decode_all(b"\x1bOC"), vec![EditAction::MoveRight]);
    }

    #[test]
    fn test_csi_tilde_sequences() {
        assert_eq!(decode_all(b"\x1b[3~"), vec![EditAction::Delete]);
        assert_eq!(decode_all(b"\x1b[1~"), vec![EditAction::Home]);
        assert_eq!(decode_all(b"\x1b[4~"), vec![EditAction::End]);
    }

    #[test]
    fn test_unknown_escape_does_not_poison_stream() {
        assert_eq!(decode_all(b"\x1bXa"), vec![EditAction::Insert('a')]);
        assert_eq!(decode_all(b"\x1b[99za"), vec![EditAction::Insert('a')]);
    }

    #[test]
    fn test_split_escape_sequence() {
        let mut decoder = KeyDecoder::new();
        assert_eq!(decoder.feed(0x1B), None);
        assert_eq!(decoder.feed(b'['), None);
        assert_eq!(decoder.feed(b'A'), Some(EditAction::HistoryPrev));
    }
}
