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

pub mod outcome;

/// Halts the current mutation with an internal error.
///
/// This indicates a bug in the engine, not a user mistake. Prefer
/// [require] for user-caused precondition failures.
#[macro_export]
macro_rules! fail {
    ($($arg:tt)*) => {
        return Err($crate::outcome::StopCondition::Error(
            ::color_eyre::eyre::eyre!($($arg)*),
        ))
    };
}

/// Halts the current mutation with an internal error unless `condition` is
/// true. Invariant checks inside mutators use this.
#[macro_export]
macro_rules! verify {
    ($condition:expr, $($arg:tt)*) => {
        if !($condition) {
            $crate::fail!($($arg)*);
        }
    };
    ($condition:expr) => {
        $crate::verify!($condition, "verification failed: {}", stringify!($condition))
    };
}

/// Rejects the current intent with the given [outcome::Reject] code unless
/// `condition` is true. No state change, no journal entry, no events.
#[macro_export]
macro_rules! require {
    ($condition:expr, $reject:expr) => {
        if !($condition) {
            return Err($crate::outcome::StopCondition::Reject($reject));
        }
    };
}

/// Rejects the current intent unconditionally.
#[macro_export]
macro_rules! reject {
    ($reject:expr) => {
        return Err($crate::outcome::StopCondition::Reject($reject))
    };
}
