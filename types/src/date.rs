use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A calendar day in the game's fixed civil timezone, serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CivilDate(NaiveDate);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid civil date {0:?}, expected YYYY-MM-DD")]
pub struct DateParseError(pub String);

impl CivilDate {
    const FORMAT: &'static str = "%Y-%m-%d";

    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    #[must_use]
    pub const fn naive(self) -> NaiveDate {
        self.0
    }

    /// Day of year, January 1st is 1.
    #[must_use]
    pub fn day_of_year(self) -> u16 {
        self.0.ordinal() as u16
    }

    #[must_use]
    pub fn next_day(self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }
}

impl fmt::Display for CivilDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for CivilDate {
    type Err = DateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), Self::FORMAT)
            .map(Self)
            .map_err(|_| DateParseError(s.to_string()))
    }
}

impl TryFrom<String> for CivilDate {
    type Error = DateParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CivilDate> for String {
    fn from(value: CivilDate) -> Self {
        value.to_string()
    }
}
