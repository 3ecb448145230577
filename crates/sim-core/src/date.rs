//! Calendar derived from the turn counter: one turn per quarter.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameDate {
    pub year: i32,
    /// 1..=4
    pub quarter: u8,
}

impl GameDate {
    pub fn from_turn(start_year: i32, turn: u32) -> Self {
        Self {
            year: start_year + (turn / 4) as i32,
            quarter: (turn % 4 + 1) as u8,
        }
    }

    /// First calendar day of the quarter.
    pub fn first_day(&self) -> Option<NaiveDate> {
        let month = u32::from(self.quarter.saturating_sub(1)) * 3 + 1;
        NaiveDate::from_ymd_opt(self.year, month, 1)
    }
}

impl fmt::Display for GameDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Q{}", self.year, self.quarter)
    }
}
