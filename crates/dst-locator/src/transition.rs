//! The located transition and its classification.

use chrono::{DateTime, Duration, Utc};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use crate::offset::UtcOffset;

/// Which way local clocks move at a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The new offset is greater: local clocks jump ahead and lose wall-clock time.
    SpringForward,
    /// The new offset is smaller: local clocks step back and repeat wall-clock time.
    FallBack,
}

impl Direction {
    /// Classify a change from `previous` to `new`.
    ///
    /// Equal offsets are not a transition; they classify as `FallBack` but the
    /// locator never produces an event for them.
    pub fn between(previous: UtcOffset, new: UtcOffset) -> Self {
        if new > previous {
            Direction::SpringForward
        } else {
            Direction::FallBack
        }
    }

    /// Human label, e.g. for a status line.
    pub fn label(self) -> &'static str {
        match self {
            Direction::SpringForward => "Move Forward",
            Direction::FallBack => "Move Backward",
        }
    }

    /// Stable machine key.
    pub fn key(self) -> &'static str {
        match self {
            Direction::SpringForward => "move_forward",
            Direction::FallBack => "move_back",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::SpringForward => Direction::FallBack,
            Direction::FallBack => Direction::SpringForward,
        }
    }
}

/// The next change in UTC offset after a reference instant.
///
/// `moment` is the first second at which the new offset applies: the offset
/// one second earlier is `previous_offset`. Serializes with a derived
/// `magnitude_seconds` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionEvent {
    pub moment: DateTime<Utc>,
    pub previous_offset: UtcOffset,
    pub new_offset: UtcOffset,
    pub direction: Direction,
}

impl TransitionEvent {
    /// Build an event, or `None` if the offsets are equal (no transition).
    pub fn new(
        moment: DateTime<Utc>,
        previous_offset: UtcOffset,
        new_offset: UtcOffset,
    ) -> Option<Self> {
        if previous_offset == new_offset {
            return None;
        }
        Some(TransitionEvent {
            moment,
            previous_offset,
            new_offset,
            direction: Direction::between(previous_offset, new_offset),
        })
    }

    /// The absolute size of the change (normally one hour).
    pub fn magnitude(&self) -> Duration {
        let delta = self.new_offset.seconds() - self.previous_offset.seconds();
        Duration::seconds(i64::from(delta.unsigned_abs()))
    }

    /// The signed change, `new_offset - previous_offset`.
    pub fn delta(&self) -> Duration {
        Duration::seconds(i64::from(
            self.new_offset.seconds() - self.previous_offset.seconds(),
        ))
    }

    /// The last second still governed by `previous_offset`.
    pub fn last_instant_before(&self) -> DateTime<Utc> {
        self.moment - Duration::seconds(1)
    }
}

impl Serialize for TransitionEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TransitionEvent", 5)?;
        state.serialize_field("moment", &self.moment)?;
        state.serialize_field("previous_offset", &self.previous_offset)?;
        state.serialize_field("new_offset", &self.new_offset)?;
        state.serialize_field("direction", &self.direction)?;
        state.serialize_field("magnitude_seconds", &self.magnitude().num_seconds())?;
        state.end()
    }
}
