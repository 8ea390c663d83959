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

//! Reactor configuration

use std::time::Duration;

/// Reactor configuration
///
/// The loop blocks at most `poll_interval` per iteration so cross-thread
/// commands make progress even when no socket is active.
#[derive(Debug, Clone)]
pub struct ReactorConfig {
    /// Upper bound on one multiplex wait
    pub poll_interval: Duration,
    /// Size of the scratch buffer used to drain readable sockets
    pub read_chunk_size: usize,
    /// Max time for one connect attempt before it counts as failed
    pub connect_timeout: Duration,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            read_chunk_size: 4096,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ReactorConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bound on one multiplex wait
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the read scratch buffer size
    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size.max(1);
        self
    }

    /// Set the connect attempt timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ReactorConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.read_chunk_size, 4096);
    }

    #[test]
    fn test_config_builder() {
        let config = ReactorConfig::new()
            .with_poll_interval(Duration::from_millis(50))
            .with_read_chunk_size(0)
            .with_connect_timeout(Duration::from_secs(1));
        assert_eq!(config.poll_interval, Duration::from_millis(50));
        // chunk size is clamped to at least one byte
        assert_eq!(config.read_chunk_size, 1);
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
    }
}
