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

//! Reconnect policies for persistent workers

use std::time::Duration;

/// How a worker behaves when its connection is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// Never reconnect; the worker is torn down on close
    Never,
    /// Reconnect after the same fixed delay every time
    Fixed(Duration),
    /// Double the delay on each consecutive failure, capped at `max`.
    /// A successful connection resets the delay back to `initial`.
    Backoff { initial: Duration, max: Duration },
}

impl ReconnectPolicy {
    /// Whether this policy ever schedules a reconnect
    pub fn reconnects(&self) -> bool {
        !matches!(self, ReconnectPolicy::Never)
    }

    /// Compute the delay before the next attempt given the previous delay
    /// (`None` for the first attempt after a working connection).
    pub fn next_delay(&self, previous: Option<Duration>) -> Option<Duration> {
        match *self {
            ReconnectPolicy::Never => None,
            ReconnectPolicy::Fixed(delay) => Some(delay),
            ReconnectPolicy::Backoff { initial, max } => match previous {
                None => Some(initial.min(max)),
                Some(prev) => Some(prev.saturating_mul(2).min(max)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_yields_no_delay() {
        assert!(!ReconnectPolicy::Never.reconnects());
        assert_eq!(ReconnectPolicy::Never.next_delay(None), None);
    }

    #[test]
    fn test_fixed_delay_is_constant() {
        let policy = ReconnectPolicy::Fixed(Duration::from_millis(250));
        assert!(policy.reconnects());
        assert_eq!(policy.next_delay(None), Some(Duration::from_millis(250)));
        assert_eq!(
            policy.next_delay(Some(Duration::from_millis(250))),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = ReconnectPolicy::Backoff {
            initial: Duration::from_millis(100),
            max: Duration::from_millis(750),
        };
        let d1 = policy.next_delay(None).unwrap();
        let d2 = policy.next_delay(Some(d1)).unwrap();
        let d3 = policy.next_delay(Some(d2)).unwrap();
        let d4 = policy.next_delay(Some(d3)).unwrap();
        assert_eq!(d1, Duration::from_millis(100));
        assert_eq!(d2, Duration::from_millis(200));
        assert_eq!(d3, Duration::from_millis(400));
        assert_eq!(d4, Duration::from_millis(750));
        // stays pinned at the cap
        assert_eq!(policy.next_delay(Some(d4)), Some(d4));
    }

    #[test]
    fn test_backoff_reset_after_success() {
        let policy = ReconnectPolicy::Backoff {
            initial: Duration::from_millis(100),
            max: Duration::from_secs(5),
        };
        // a successful connection clears the previous delay, so the next
        // failure starts over at the floor
        assert_eq!(policy.next_delay(None), Some(Duration::from_millis(100)));
    }
}
