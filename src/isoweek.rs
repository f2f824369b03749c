//! ISO-8601 week codec.
//!
//! Times are encoded as `YYYY-WW`, the ISO week-numbering year and the zero-padded week
//! number. Weeks run Monday through Sunday and week 1 is the week containing the year's
//! first Thursday.
//!
//! Decoding has two anchors, see [WeekAnchor].
use std::sync::OnceLock;

use chrono::{Datelike, Days, NaiveDate, NaiveTime, Weekday};
use regex::Regex;
use tracing::trace;

use crate::codec::{Instant, TimeDecoder, TimeEncoder};
use crate::error::{Error, Result};

fn isoweek_rx() -> &'static Regex {
    static RX: OnceLock<Regex> = OnceLock::new();
    RX.get_or_init(|| Regex::new(r"^([0-9]{4})-([0-9]{2})$").expect("valid ISO week pattern"))
}

/// How a decoded `YYYY-WW` is turned into a date.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WeekAnchor {
    /// Rewind from the day before January 1st to the Sunday on or before it, then add
    /// `(week + 1) * 7` days.
    ///
    /// This lands on the Sunday closing the requested week only when January 1st falls on
    /// a Friday, Saturday or Sunday. In other years the result is one week later.
    #[default]
    Sunday,
    /// The Monday starting the requested ISO week. Week 53 is rejected for years with 52
    /// ISO weeks.
    Monday,
}

/// Encodes times as `YYYY-WW` ISO weeks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IsoWeekCodec {
    anchor: WeekAnchor,
}

/// Process-wide [IsoWeekCodec] using the [WeekAnchor::Sunday] anchor.
pub static ISO_WEEK_CODEC: IsoWeekCodec = IsoWeekCodec::new();

impl IsoWeekCodec {
    pub const fn new() -> Self {
        Self {
            anchor: WeekAnchor::Sunday,
        }
    }

    /// Codec decoding to the Monday starting each week.
    pub const fn canonical() -> Self {
        Self {
            anchor: WeekAnchor::Monday,
        }
    }

    pub const fn with_anchor(anchor: WeekAnchor) -> Self {
        Self { anchor }
    }

    pub fn anchor(&self) -> WeekAnchor {
        self.anchor
    }

    /// Split `value` into year and week, checking only the week is within 1 to 53.
    fn parse(value: &str) -> Result<(i32, u32)> {
        let Some(caps) = isoweek_rx().captures(value) else {
            trace!(value, "not an ISO week string");
            return Err(Error::IsoWeekString(value.to_string()));
        };
        let year: i32 = caps[1]
            .parse()
            .map_err(|_| Error::IsoWeekString(value.to_string()))?;
        let week: u32 = caps[2]
            .parse()
            .map_err(|_| Error::IsoWeekString(value.to_string()))?;
        if !(1..=53).contains(&week) {
            trace!(value, week, "week number out of range");
            return Err(Error::WeekNumber(week));
        }
        Ok((year, week))
    }

    fn sunday_anchor(year: i32, week: u32) -> Option<NaiveDate> {
        // January 0th, ie. December 31st of the previous year
        let jan0 = NaiveDate::from_ymd_opt(year, 1, 1)?.pred_opt()?;
        let sunday = jan0.checked_sub_days(Days::new(u64::from(
            jan0.weekday().num_days_from_sunday(),
        )))?;
        sunday.checked_add_days(Days::new(u64::from(week + 1) * 7))
    }
}

impl TimeEncoder for IsoWeekCodec {
    fn marshal_time(&self, t: &Instant) -> String {
        let week = t.iso_week();
        format!("{}-{:02}", week.year(), week.week())
    }
}

impl TimeDecoder for IsoWeekCodec {
    fn unmarshal_time(&self, value: &str) -> Result<Instant> {
        let (year, week) = Self::parse(value)?;
        let date = match self.anchor {
            WeekAnchor::Sunday => Self::sunday_anchor(year, week).ok_or(Error::OutOfRange)?,
            WeekAnchor::Monday => NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
                .ok_or(Error::WeekNumber(week))?,
        };
        Ok(date.and_time(NaiveTime::MIN).and_utc().fixed_offset())
    }
}
