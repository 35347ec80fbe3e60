use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Represents the direction of a vote.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// A vote for the voteable. Contributes positive points.
    Up,
    /// A vote against the voteable. Contributes negative points.
    Down,
}

impl Direction {
    /// Returns the signed value stored for this direction (+1 or -1).
    pub fn as_i16(self) -> i16 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }

    /// Decodes a stored signed value back into a direction.
    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            1 => Some(Direction::Up),
            -1 => Some(Direction::Down),
            _ => None,
        }
    }

    /// Applies this direction's sign to an unsigned point magnitude.
    pub fn signed_points(self, magnitude: u32) -> i64 {
        i64::from(magnitude) * i64::from(self.as_i16())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// Raised when a raw direction is neither `up` nor `down`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected up or down, got {0:?}")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// Selects which votes a count or sum covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteFilter {
    #[default]
    All,
    Up,
    Down,
}

impl VoteFilter {
    /// The direction this filter restricts to, or `None` for every vote.
    pub fn direction(self) -> Option<Direction> {
        match self {
            VoteFilter::All => None,
            VoteFilter::Up => Some(Direction::Up),
            VoteFilter::Down => Some(Direction::Down),
        }
    }
}

impl From<Direction> for VoteFilter {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => VoteFilter::Up,
            Direction::Down => VoteFilter::Down,
        }
    }
}
