//! Version identity and its storage unit name encoding
use super::error::InvalidVersionName;
use chrono::{DateTime, SubsecRound, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

/// A creation instant with whole-second resolution, the resolution versions are stored with.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct TimeStamp(DateTime<Utc>);

/// One immutable snapshot of a group's submission, keyed by author and creation instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    author: String,
    creation_time: TimeStamp,
}

impl TimeStamp {
    pub fn new() -> Self {
        Utc::now().into()
    }
    pub fn from_epoch_seconds(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(TimeStamp)
    }
    pub fn new_with(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .map(TimeStamp::from)
    }
    pub fn epoch_seconds(&self) -> i64 {
        self.0.timestamp()
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for TimeStamp {
    fn default() -> Self {
        Self::new()
    }
}

// sub-second precision is dropped, it cannot survive the unit name anyway
impl From<DateTime<Utc>> for TimeStamp {
    fn from(value: DateTime<Utc>) -> Self {
        TimeStamp(value.trunc_subsecs(0))
    }
}

impl Version {
    pub fn new(author: impl Into<String>, creation_time: impl Into<TimeStamp>) -> Self {
        Self {
            author: author.into(),
            creation_time: creation_time.into(),
        }
    }
    pub fn author(&self) -> &str {
        &self.author
    }
    pub fn creation_time(&self) -> TimeStamp {
        self.creation_time
    }
    pub fn epoch_seconds(&self) -> i64 {
        self.creation_time.epoch_seconds()
    }

    /// Encodes this version as `<epochSeconds>_<author>`, the name of its storage unit.
    pub fn to_unit_name(&self) -> String {
        format!("{}_{}", self.epoch_seconds(), self.author)
    }

    /// Inverse of [`Version::to_unit_name`].
    ///
    /// Splits at the first `_` only, authors may contain further underscores.
    pub fn from_unit_name(name: &str) -> Result<Self, InvalidVersionName> {
        let Some((secs, author)) = name.split_once('_') else {
            return Err(InvalidVersionName::MissingSeparator(name.to_owned()));
        };
        if author.is_empty() {
            return Err(InvalidVersionName::NoAuthor(name.to_owned()));
        }

        // only the form to_unit_name writes, so `+5` and `05` never alias `5`
        let creation_time = secs
            .parse::<i64>()
            .ok()
            .filter(|parsed| parsed.to_string() == secs)
            .and_then(TimeStamp::from_epoch_seconds)
            .ok_or_else(|| InvalidVersionName::InvalidTimestamp(name.to_owned()))?;

        Ok(Version::new(author, creation_time))
    }

    /// Prefix shared by every unit created within the same second as this version.
    pub(crate) fn unit_name_prefix(&self) -> String {
        format!("{}_", self.epoch_seconds())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_unit_name())
    }
}

impl FromStr for Version {
    type Err = InvalidVersionName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::from_unit_name(s)
    }
}
