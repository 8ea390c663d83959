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

//! Editing actions decoded from terminal input

/// A single editing action, produced by [`KeyDecoder`](crate::KeyDecoder)
/// and consumed by [`LineEditor`](crate::LineEditor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    /// Insert a printable character at the cursor
    Insert(char),
    /// Complete the current line
    Enter,
    /// Erase the character before the cursor
    Backspace,
    /// Erase the character under the cursor
    Delete,
    /// Move the cursor one position left
    MoveLeft,
    /// Move the cursor one position right
    MoveRight,
    /// Move the cursor to the start of the line
    Home,
    /// Move the cursor to the end of the line
    End,
    /// Erase from the cursor to the end of the line
    KillToEnd,
    /// Erase from the start of the line to the cursor
    KillLine,
    /// Erase the word before the cursor
    WordErase,
    /// Recall the previous history entry
    HistoryPrev,
    /// Recall the next history entry
    HistoryNext,
}
