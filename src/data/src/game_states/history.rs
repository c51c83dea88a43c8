// Copyright © moonhollow 2024-present
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// One engine-observable event in a game's chronological record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub at_unix_ms: u64,
    pub day: u32,
    pub message: String,
}

/// Append-only action log, truncated from the head at a configured bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    entries: VecDeque<LogEntry>,
    max_entries: usize,
}

impl ActionLog {
    pub fn new(max_entries: usize) -> Self {
        Self { entries: VecDeque::new(), max_entries }
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_from_the_head() {
        let mut log = ActionLog::new(3);
        for day in 0..5 {
            log.push(LogEntry { at_unix_ms: day as u64, day, message: format!("entry {day}") });
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.entries().next().unwrap().message, "entry 2");
        assert_eq!(log.latest().unwrap().message, "entry 4");
    }
}
