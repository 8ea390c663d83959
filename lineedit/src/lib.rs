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

//! Terminal key decoding and line-buffer editing.
//!
//! [`KeyDecoder`] turns a raw terminal byte stream into [`EditAction`]s;
//! [`LineEditor`] applies those actions to a line buffer with cursor
//! motion, kill commands, word erase, and a bounded history. Both are pure
//! state machines with no I/O, so a caller that echoes can render each
//! [`EditOutcome`] however its transport requires.

mod action;
mod decoder;
mod editor;

pub use crate::action::EditAction;
pub use crate::decoder::KeyDecoder;
pub use crate::editor::{EditOutcome, LineEditor};
