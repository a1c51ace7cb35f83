//! Running average of star votes.
//!
//! Individual votes are not stored, only the current mean and the number of votes
//! it was computed from. A vote therefore cannot be retracted later.

use serde::{Deserialize, Serialize};

use crate::Error;

pub const MIN_STARS: i64 = 0;
pub const MAX_STARS: i64 = 5;

/// Single vote, an integer number of stars in `0..=5`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Stars(u8);

impl Stars {
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Stars {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (MIN_STARS..=MAX_STARS).contains(&value) {
            Ok(Stars(value as u8))
        } else {
            Err(Error::InvalidRating(value))
        }
    }
}

impl From<Stars> for i64 {
    fn from(value: Stars) -> Self {
        value.0 as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningAverage {
    pub rating: f64,
    pub vote_count: i64,
}

impl RunningAverage {
    pub const MIN: f64 = MIN_STARS as f64;
    pub const MAX: f64 = MAX_STARS as f64;

    pub fn new(rating: f64, vote_count: i64) -> Self {
        Self { rating, vote_count }
    }

    pub fn with_vote(&self, stars: Stars) -> Self {
        let vote_count = self.vote_count + 1;
        let total = self.rating * self.vote_count as f64 + stars.value() as f64;
        let rating = (total / vote_count as f64).clamp(Self::MIN, Self::MAX);
        Self { rating, vote_count }
    }
}

impl Default for RunningAverage {
    fn default() -> Self {
        Self::new(0.0, 0)
    }
}
