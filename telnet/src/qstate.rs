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

//! Option negotiation per [RFC1143](https://tools.ietf.org/html/rfc1143),
//! the Q method.
//!
//! Every option carries one [`QState`] per side. A side never has more than
//! one negotiation request in flight; a desire that arises while a request
//! is outstanding is queued in the `WANT*` state's [`Pending`] slot instead
//! of being sent, which is the property that makes negotiation loops
//! impossible.
//!
//! The transitions live in two pure functions, [`step_receive`] and
//! [`step_request`], keyed only by state and input. [`OptionNegotiator`]
//! wraps them with a fixed 256-entry table and a support policy.

use crate::frame::TelnetFrame;
use crate::option::TelnetOption;
use std::fmt;
use tracing::{debug, warn};

/// Negotiation state of one option on one side
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum QState {
    /// The option is disabled and nothing is in flight
    #[default]
    No,
    /// The option is enabled
    Yes,
    /// We sent a disable request and await the acknowledgement
    WantNo(Pending),
    /// We sent an enable request and await the acknowledgement
    WantYes(Pending),
}

/// The single queued opposite request a `WANT*` state may carry
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Pending {
    /// Nothing queued behind the in-flight request
    #[default]
    Empty,
    /// Once the in-flight request resolves, negotiate the opposite
    Opposite,
}

/// Which endpoint an option state describes: `Local` is RFC 1143's "us"
/// (our WILL/WONT), `Remote` is "him" (their WILL, our DO/DONT).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TelnetSide {
    Local,
    Remote,
}

impl fmt::Display for TelnetSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelnetSide::Local => write!(f, "local"),
            TelnetSide::Remote => write!(f, "remote"),
        }
    }
}

/// A negotiation verb stripped of its side: WILL and DO are positive,
/// WONT and DONT negative.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Sign {
    Positive,
    Negative,
}

/// Result of one transition: the next state, an optional reply to emit,
/// and a diagnostic when the input was a protocol violation the state
/// machine absorbs rather than escalates.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Step {
    pub next: QState,
    pub reply: Option<Sign>,
    pub diagnostic: Option<&'static str>,
}

impl Step {
    fn to(next: QState) -> Self {
        Self {
            next,
            reply: None,
            diagnostic: None,
        }
    }

    fn replying(next: QState, reply: Sign) -> Self {
        Self {
            next,
            reply: Some(reply),
            diagnostic: None,
        }
    }

    fn flagged(mut self, diagnostic: &'static str) -> Self {
        self.diagnostic = Some(diagnostic);
        self
    }
}

/// Transition for a received negotiation verb.
///
/// `positive` is true for WILL/DO, false for WONT/DONT. `accept` says
/// whether policy allows enabling the option when the peer proposes it;
/// it is only consulted from the `No` state.
pub fn step_receive(state: QState, positive: bool, accept: bool) -> Step {
    use Pending::{Empty, Opposite};
    if positive {
        match state {
            QState::No if accept => Step::replying(QState::Yes, Sign::Positive),
            QState::No => Step::replying(QState::No, Sign::Negative),
            QState::Yes => Step::to(QState::Yes),
            QState::WantNo(Empty) => {
                Step::to(QState::No).flagged("disable request answered by enable")
            }
            QState::WantNo(Opposite) => {
                Step::to(QState::Yes).flagged("disable request answered by enable")
            }
            QState::WantYes(Empty) => Step::to(QState::Yes),
            QState::WantYes(Opposite) => {
                Step::replying(QState::WantNo(Empty), Sign::Negative)
            }
        }
    } else {
        match state {
            QState::No => Step::to(QState::No),
            QState::Yes => Step::replying(QState::No, Sign::Negative),
            QState::WantNo(Empty) => Step::to(QState::No),
            QState::WantNo(Opposite) => {
                Step::replying(QState::WantYes(Empty), Sign::Positive)
            }
            QState::WantYes(Empty) => Step::to(QState::No),
            QState::WantYes(Opposite) => Step::to(QState::No),
        }
    }
}

/// Transition for a locally initiated request.
///
/// `enable` is true when the caller wants the option on. A reply of
/// `Some(sign)` means a verb goes on the wire; a request that must wait
/// for the in-flight one is queued in the pending slot instead.
pub fn step_request(state: QState, enable: bool) -> Step {
    use Pending::{Empty, Opposite};
    if enable {
        match state {
            QState::No => Step::replying(QState::WantYes(Empty), Sign::Positive),
            QState::Yes => Step::to(QState::Yes).flagged("already enabled"),
            QState::WantNo(Empty) => Step::to(QState::WantNo(Opposite)),
            QState::WantNo(Opposite) => {
                Step::to(QState::WantNo(Opposite)).flagged("enable already queued")
            }
            QState::WantYes(Empty) => {
                Step::to(QState::WantYes(Empty)).flagged("enable already in flight")
            }
            QState::WantYes(Opposite) => Step::to(QState::WantYes(Empty)),
        }
    } else {
        match state {
            QState::No => Step::to(QState::No).flagged("already disabled"),
            QState::Yes => Step::replying(QState::WantNo(Empty), Sign::Negative),
            QState::WantNo(Empty) => {
                Step::to(QState::WantNo(Empty)).flagged("disable already in flight")
            }
            QState::WantNo(Opposite) => Step::to(QState::WantNo(Empty)),
            QState::WantYes(Empty) => Step::to(QState::WantYes(Opposite)),
            QState::WantYes(Opposite) => {
                Step::to(QState::WantYes(Opposite)).flagged("disable already queued")
            }
        }
    }
}

/// Which options each side may enable.
///
/// Everything defaults to refused; a peer proposing an option that is not
/// allowed gets the matching refusal verb and the state stays `No`.
#[derive(Clone)]
pub struct NegotiationPolicy {
    local: [bool; 256],
    remote: [bool; 256],
}

impl Default for NegotiationPolicy {
    fn default() -> Self {
        Self {
            local: [false; 256],
            remote: [false; 256],
        }
    }
}

impl NegotiationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow this side to enable `option` (we may answer DO with WILL)
    pub fn allow_local(mut self, option: TelnetOption) -> Self {
        self.local[option.to_u8() as usize] = true;
        self
    }

    /// Allow the peer to enable `option` (we may answer WILL with DO)
    pub fn allow_remote(mut self, option: TelnetOption) -> Self {
        self.remote[option.to_u8() as usize] = true;
        self
    }

    fn accepts(&self, side: TelnetSide, option: TelnetOption) -> bool {
        match side {
            TelnetSide::Local => self.local[option.to_u8() as usize],
            TelnetSide::Remote => self.remote[option.to_u8() as usize],
        }
    }
}

/// Per-option state for both sides
#[derive(Clone, Copy, Debug, Default)]
struct PairState {
    us: QState,
    him: QState,
}

/// What a received negotiation verb produced: at most one reply frame and
/// at most one observable enable/disable change.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Reaction {
    pub reply: Option<TelnetFrame>,
    pub status: Option<(TelnetSide, bool)>,
}

/// Tracks negotiation state for all 256 options on both sides.
pub struct OptionNegotiator {
    policy: NegotiationPolicy,
    table: [PairState; 256],
}

impl OptionNegotiator {
    pub fn new(policy: NegotiationPolicy) -> Self {
        Self {
            policy,
            table: [PairState::default(); 256],
        }
    }

    /// State of the option on our side
    pub fn local_state(&self, option: TelnetOption) -> QState {
        self.table[option.to_u8() as usize].us
    }

    /// State of the option on the peer's side
    pub fn remote_state(&self, option: TelnetOption) -> QState {
        self.table[option.to_u8() as usize].him
    }

    /// Whether the option is operatively enabled on our side. A disable
    /// still in flight counts as enabled until the peer acknowledges it.
    pub fn local_enabled(&self, option: TelnetOption) -> bool {
        matches!(self.local_state(option), QState::Yes | QState::WantNo(_))
    }

    /// Whether the option is operatively enabled on the peer's side
    pub fn remote_enabled(&self, option: TelnetOption) -> bool {
        matches!(self.remote_state(option), QState::Yes | QState::WantNo(_))
    }

    /// Number of (option, side) pairs with a request still in flight.
    /// Zero once a negotiation exchange has quiesced.
    pub fn outstanding(&self) -> usize {
        self.table
            .iter()
            .flat_map(|pair| [pair.us, pair.him])
            .filter(|state| matches!(state, QState::WantNo(_) | QState::WantYes(_)))
            .count()
    }

    /// Peer sent WILL: it wants to enable `option` on its side.
    pub fn receive_will(&mut self, option: TelnetOption) -> Reaction {
        self.receive(TelnetSide::Remote, option, true)
    }

    /// Peer sent WONT: it refuses or disables `option` on its side.
    pub fn receive_wont(&mut self, option: TelnetOption) -> Reaction {
        self.receive(TelnetSide::Remote, option, false)
    }

    /// Peer sent DO: it wants us to enable `option`.
    pub fn receive_do(&mut self, option: TelnetOption) -> Reaction {
        self.receive(TelnetSide::Local, option, true)
    }

    /// Peer sent DONT: it wants us to disable `option`.
    pub fn receive_dont(&mut self, option: TelnetOption) -> Reaction {
        self.receive(TelnetSide::Local, option, false)
    }

    /// Ask to enable the option on our side (leads with WILL)
    pub fn ask_to(&mut self, option: TelnetOption) -> Option<TelnetFrame> {
        self.request(TelnetSide::Local, option, true)
    }

    /// Ask to disable the option on our side (leads with WONT)
    pub fn ask_to_not(&mut self, option: TelnetOption) -> Option<TelnetFrame> {
        self.request(TelnetSide::Local, option, false)
    }

    /// Ask the peer to enable the option (leads with DO)
    pub fn ask_for(&mut self, option: TelnetOption) -> Option<TelnetFrame> {
        self.request(TelnetSide::Remote, option, true)
    }

    /// Ask the peer to disable the option (leads with DONT)
    pub fn ask_for_not(&mut self, option: TelnetOption) -> Option<TelnetFrame> {
        self.request(TelnetSide::Remote, option, false)
    }

    fn receive(&mut self, side: TelnetSide, option: TelnetOption, positive: bool) -> Reaction {
        let state = self.state_of(side, option);
        let accept = self.policy.accepts(side, option);
        let step = step_receive(state, positive, accept);
        if let Some(diagnostic) = step.diagnostic {
            warn!(%option, %side, diagnostic, "negotiation violation");
        }
        let was_enabled = Self::operative(state);
        *self.state_of_mut(side, option) = step.next;
        let now_enabled = Self::operative(step.next);
        Reaction {
            reply: step.reply.map(|sign| Self::frame(side, sign, option)),
            status: (was_enabled != now_enabled).then_some((side, now_enabled)),
        }
    }

    fn request(
        &mut self,
        side: TelnetSide,
        option: TelnetOption,
        enable: bool,
    ) -> Option<TelnetFrame> {
        if enable && !self.policy.accepts(side, option) {
            debug!(%option, %side, "refusing to request unsupported option");
            return None;
        }
        let state = self.state_of(side, option);
        let step = step_request(state, enable);
        if let Some(diagnostic) = step.diagnostic {
            debug!(%option, %side, diagnostic, "redundant request");
        }
        *self.state_of_mut(side, option) = step.next;
        step.reply.map(|sign| Self::frame(side, sign, option))
    }

    fn operative(state: QState) -> bool {
        matches!(state, QState::Yes | QState::WantNo(_))
    }

    fn state_of(&self, side: TelnetSide, option: TelnetOption) -> QState {
        let pair = &self.table[option.to_u8() as usize];
        match side {
            TelnetSide::Local => pair.us,
            TelnetSide::Remote => pair.him,
        }
    }

    fn state_of_mut(&mut self, side: TelnetSide, option: TelnetOption) -> &mut QState {
        let pair = &mut self.table[option.to_u8() as usize];
        match side {
            TelnetSide::Local => &mut pair.us,
            TelnetSide::Remote => &mut pair.him,
        }
    }

    /// Map a side and sign to the concrete verb: our side speaks
    /// WILL/WONT, the peer's side is driven with DO/DONT.
    fn frame(side: TelnetSide, sign: Sign, option: TelnetOption) -> TelnetFrame {
        match (side, sign) {
            (TelnetSide::Local, Sign::Positive) => TelnetFrame::Will(option),
            (TelnetSide::Local, Sign::Negative) => TelnetFrame::Wont(option),
            (TelnetSide::Remote, Sign::Positive) => TelnetFrame::Do(option),
            (TelnetSide::Remote, Sign::Negative) => TelnetFrame::Dont(option),
        }
    }
}
