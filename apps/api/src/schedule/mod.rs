//! Interview scheduling log. In-memory and append-only; it lives as long as the process.

pub mod handlers;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_time", deserialize_with = "deserialize_time")]
    pub time: NaiveTime,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Default)]
pub struct ScheduleLog {
    entries: Vec<ScheduleEntry>,
}

impl ScheduleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: ScheduleEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }
}

fn serialize_time<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.format(TIME_FORMAT).to_string())
}

/// Only "HH:MM" is accepted; seconds could not be echoed back.
fn deserialize_time<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    NaiveTime::parse_from_str(&raw, TIME_FORMAT).map_err(serde::de::Error::custom)
}
