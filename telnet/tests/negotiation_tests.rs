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

//! Negotiation behavior tests for the ioflux-telnet crate

use bytes::BytesMut;
use ioflux_telnet::{NegotiationPolicy, TelnetEvent, TelnetMachine, TelnetOption, TelnetSide};
use proptest::prelude::*;

fn echo_machine() -> TelnetMachine {
    TelnetMachine::new(
        NegotiationPolicy::new()
            .allow_local(TelnetOption::Echo)
            .allow_remote(TelnetOption::Echo),
    )
}

fn drain(machine: &mut TelnetMachine, bytes: &[u8]) -> Vec<TelnetEvent> {
    let mut src = BytesMut::from(bytes);
    let mut events = Vec::new();
    while let Some(event) = machine.decode(&mut src) {
        events.push(event);
    }
    events
}

/// Move replies between two machines until both go quiet. Returns the
/// total bytes exchanged; panics if the exchange fails to settle, which is
/// exactly what a negotiation loop would look like.
fn pump(a: &mut TelnetMachine, b: &mut TelnetMachine) -> usize {
    let mut exchanged = 0;
    for _ in 0..32 {
        let from_a = a.take_reply();
        let from_b = b.take_reply();
        if from_a.is_none() && from_b.is_none() {
            return exchanged;
        }
        if let Some(bytes) = from_a {
            exchanged += bytes.len();
            drain(b, &bytes);
        }
        if let Some(bytes) = from_b {
            exchanged += bytes.len();
            drain(a, &bytes);
        }
    }
    panic!("negotiation did not quiesce");
}

// The scenario from RFC 857 echo negotiation: ask, confirm, repeat.
#[test]
fn test_echo_enable_scenario() {
    let mut machine = echo_machine();

    machine.ask_to(TelnetOption::Echo);
    assert_eq!(machine.take_reply().unwrap().as_ref(), &[255, 251, 1]);

    // peer agrees: state becomes YES with no further reply
    let events = drain(&mut machine, &[255, 253, 1]);
    assert_eq!(events, vec![TelnetEvent::Option {
        side: TelnetSide::Local,
        option: TelnetOption::Echo,
        enabled: true,
    }]);
    assert!(machine.take_reply().is_none());
    assert!(machine.local_enabled(TelnetOption::Echo));

    // peer repeats the DO: ignored entirely
    let events = drain(&mut machine, &[255, 253, 1]);
    assert!(events.is_empty());
    assert!(machine.take_reply().is_none());
    assert_eq!(machine.outstanding(), 0);
}

#[test]
fn test_two_machines_converge_on_echo() {
    let mut server = echo_machine();
    let mut client = echo_machine();

    server.ask_to(TelnetOption::Echo);
    pump(&mut server, &mut client);

    assert!(server.local_enabled(TelnetOption::Echo));
    assert!(client.remote_enabled(TelnetOption::Echo));
    assert_eq!(server.outstanding(), 0);
    assert_eq!(client.outstanding(), 0);
}

#[test]
fn test_simultaneous_requests_converge() {
    let mut server = echo_machine();
    let mut client = echo_machine();

    // both sides ask for the same thing at the same time
    server.ask_to(TelnetOption::Echo);
    client.ask_for(TelnetOption::Echo);
    pump(&mut server, &mut client);

    assert!(server.local_enabled(TelnetOption::Echo));
    assert!(client.remote_enabled(TelnetOption::Echo));
    assert_eq!(server.outstanding(), 0);
    assert_eq!(client.outstanding(), 0);
}

#[test]
fn test_subnegotiation_round_trip_with_iac_payload() {
    let mut machine = echo_machine();
    let payload = [1u8, 255, 2, 255, 255, 3];

    machine.send_subnegotiation(TelnetOption::TerminalType, &payload);
    let wire = machine.take_reply().unwrap();

    let mut peer = echo_machine();
    let events = drain(&mut peer, &wire);
    assert_eq!(events.len(), 1);
    match &events[0] {
        TelnetEvent::Subnegotiation(option, data) => {
            assert_eq!(*option, TelnetOption::TerminalType);
            assert_eq!(&data[..], &payload);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

proptest! {
    // Replay random request/response traffic and require quiescence: no
    // outstanding request may survive once the wire goes quiet, and the
    // exchange must settle in a bounded number of round trips.
    #[test]
    fn prop_negotiation_never_loops(ops in prop::collection::vec(0u8..8, 1..40)) {
        let mut a = echo_machine();
        let mut b = echo_machine();
        let option = TelnetOption::Echo;

        for op in ops {
            match op {
                0 => a.ask_to(option),
                1 => a.ask_to_not(option),
                2 => a.ask_for(option),
                3 => a.ask_for_not(option),
                4 => b.ask_to(option),
                5 => b.ask_to_not(option),
                6 => b.ask_for(option),
                7 => b.ask_for_not(option),
                _ => unreachable!(),
            }
            pump(&mut a, &mut b);
        }

        prop_assert_eq!(a.outstanding(), 0);
        prop_assert_eq!(b.outstanding(), 0);
        // both sides agree about both directions
        prop_assert_eq!(a.local_enabled(option), b.remote_enabled(option));
        prop_assert_eq!(a.remote_enabled(option), b.local_enabled(option));
    }

    // Splitting the stream at arbitrary points must not change what is
    // decoded or what is sent back.
    #[test]
    fn prop_chunking_is_irrelevant(
        stream in prop::collection::vec(any::<u8>(), 0..200),
        splits in prop::collection::vec(any::<prop::sample::Index>(), 0..8),
    ) {
        let mut whole = echo_machine();
        let whole_events = drain(&mut whole, &stream);
        let whole_reply = whole.take_reply();

        let mut cuts: Vec<usize> = splits.iter().map(|i| i.index(stream.len().max(1))).collect();
        cuts.push(0);
        cuts.push(stream.len());
        cuts.sort_unstable();

        let mut chunked = echo_machine();
        let mut chunked_events = Vec::new();
        for window in cuts.windows(2) {
            chunked_events.extend(drain(&mut chunked, &stream[window[0]..window[1]]));
        }
        let chunked_reply = chunked.take_reply();

        prop_assert_eq!(whole_events, chunked_events);
        prop_assert_eq!(whole_reply, chunked_reply);
    }
}
