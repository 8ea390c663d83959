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

//! Error types for the reactor

use thiserror::Error;

/// Result type for reactor operations
pub type Result<T> = std::result::Result<T, ReactorError>;

/// Reactor error types
#[derive(Debug, Error)]
pub enum ReactorError {
    /// I/O error from the underlying socket machinery
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The reactor loop has stopped; the command was not delivered
    #[error("reactor is stopped")]
    Stopped,
}

impl ReactorError {
    /// Check if the error indicates the reactor itself is gone.
    ///
    /// Individual worker failures never surface through this type; they are
    /// logged and isolated inside the loop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ReactorError::Stopped)
    }
}
