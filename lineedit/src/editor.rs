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

//! Line buffer with cursor, kill commands, and bounded history

use crate::action::EditAction;
use std::collections::VecDeque;

/// What an applied action did to the visible line, for callers that echo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Nothing visible changed (cursor motion, ignored input)
    None,
    /// A character was inserted at the cursor
    Inserted(char),
    /// `n` characters before the cursor were erased
    Erased(usize),
    /// `n` characters at or after the cursor were erased
    Truncated(usize),
    /// The line was completed and reset
    Completed(String),
    /// A history entry replaced the visible line
    Recalled {
        /// Characters that were visible before the recall
        erased: usize,
        /// The recalled line now in the buffer
        line: String,
    },
    /// The action could not be applied
    Bell,
}

/// An editable line with readline-style commands and a bounded history.
#[derive(Debug)]
pub struct LineEditor {
    buffer: Vec<char>,
    cursor: usize,
    history: VecDeque<String>,
    history_limit: usize,
    /// Index into history while browsing with prev/next
    browse: Option<usize>,
    /// The in-progress line stashed while browsing
    stash: Vec<char>,
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new(100)
    }
}

impl LineEditor {
    pub fn new(history_limit: usize) -> Self {
        Self {
            buffer: Vec::new(),
            cursor: 0,
            history: VecDeque::new(),
            history_limit,
            browse: None,
            stash: Vec::new(),
        }
    }

    /// Current line contents
    pub fn line(&self) -> String {
        self.buffer.iter().collect()
    }

    /// Current cursor position in characters
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Apply one action and report what changed on screen.
    pub fn apply(&mut self, action: EditAction) -> EditOutcome {
        match action {
            EditAction::Insert(c) => {
                self.browse = None;
                self.buffer.insert(self.cursor, c);
                self.cursor += 1;
                EditOutcome::Inserted(c)
            }
            EditAction::Enter => {
                let line: String = self.buffer.drain(..).collect();
                self.cursor = 0;
                self.browse = None;
                if !line.is_empty() {
                    self.history.push_back(line.clone());
                    while self.history.len() > self.history_limit {
                        self.history.pop_front();
                    }
                }
                EditOutcome::Completed(line)
            }
            EditAction::Backspace => {
                if self.cursor == 0 {
                    return EditOutcome::Bell;
                }
                self.browse = None;
                self.cursor -= 1;
                self.buffer.remove(self.cursor);
                EditOutcome::Erased(1)
            }
            EditAction::Delete => {
                if self.cursor >= self.buffer.len() {
                    return EditOutcome::Bell;
                }
                self.browse = None;
                self.buffer.remove(self.cursor);
                EditOutcome::Truncated(1)
            }
            EditAction::MoveLeft => {
                if self.cursor == 0 {
                    return EditOutcome::Bell;
                }
                self.cursor -= 1;
                EditOutcome::None
            }
            EditAction::MoveRight => {
                if self.cursor >= self.buffer.len() {
                    return EditOutcome::Bell;
                }
                self.cursor += 1;
                EditOutcome::None
            }
            EditAction::Home => {
                self.cursor = 0;
                EditOutcome::None
            }
            EditAction::End => {
                self.cursor = self.buffer.len();
                EditOutcome::None
            }
            EditAction::KillToEnd => {
                let n = self.buffer.len() - self.cursor;
                if n == 0 {
                    return EditOutcome::None;
                }
                self.browse = None;
                self.buffer.truncate(self.cursor);
                EditOutcome::Truncated(n)
            }
            EditAction::KillLine => {
                let n = self.cursor;
                if n == 0 {
                    return EditOutcome::None;
                }
                self.browse = None;
                self.buffer.drain(..n);
                self.cursor = 0;
                EditOutcome::Erased(n)
            }
            EditAction::WordErase => {
                let start = self.word_start();
                let n = self.cursor - start;
                if n == 0 {
                    return EditOutcome::Bell;
                }
                self.browse = None;
                self.buffer.drain(start..self.cursor);
                self.cursor = start;
                EditOutcome::Erased(n)
            }
            EditAction::HistoryPrev => self.recall_prev(),
            EditAction::HistoryNext => self.recall_next(),
        }
    }

    /// Index of the start of the word before the cursor: skip trailing
    /// spaces, then the word itself.
    fn word_start(&self) -> usize {
        let mut i = self.cursor;
        while i > 0 && self.buffer[i - 1] == ' ' {
            i -= 1;
        }
        while i > 0 && self.buffer[i - 1] != ' ' {
            i -= 1;
        }
        i
    }

    fn recall_prev(&mut self) -> EditOutcome {
        let index = match self.browse {
            None if self.history.is_empty() => return EditOutcome::Bell,
            None => {
                // keep the buffer visible so load() can report what it erased
                self.stash = self.buffer.clone();
                self.history.len() - 1
            }
            Some(0) => return EditOutcome::Bell,
            Some(i) => i - 1,
        };
        self.browse = Some(index);
        self.load(self.history[index].clone())
    }

    fn recall_next(&mut self) -> EditOutcome {
        match self.browse {
            None => EditOutcome::Bell,
            Some(i) if i + 1 < self.history.len() => {
                self.browse = Some(i + 1);
                self.load(self.history[i + 1].clone())
            }
            Some(_) => {
                // walked past the newest entry: restore the stashed line
                self.browse = None;
                let line: String = self.stash.iter().collect();
                let erased = self.visible_len();
                self.buffer = std::mem::take(&mut self.stash);
                self.cursor = self.buffer.len();
                EditOutcome::Recalled { erased, line }
            }
        }
    }

    fn visible_len(&self) -> usize {
        self.buffer.len()
    }

    fn load(&mut self, line: String) -> EditOutcome {
        let erased = self.visible_len();
        self.buffer = line.chars().collect();
        self.cursor = self.buffer.len();
        EditOutcome::Recalled { erased, line }
    }
}
