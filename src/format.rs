use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::TimeCodec;
use crate::epoch::{MillisCodec, UnixCodec, UnixMillisCodec};
use crate::error::Result;
use crate::isoweek::{IsoWeekCodec, WeekAnchor};
use crate::layout::LayoutCodec;

/// Time codec configuration.
///
/// Serialized with a `codec` tag, e.g. `{"codec": "unix", "step_secs": 3600}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "codec", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Format {
    /// strftime layout.
    Layout { pattern: String },
    /// Layout written against the reference date `Mon Jan 2 15:04:05 MST 2006`.
    Reference { layout: String },
    /// `YYYY-WW` ISO weeks. When `canonical` weeks decode to their Monday rather than the
    /// default Sunday anchor.
    IsoWeek {
        #[serde(default)]
        canonical: bool,
    },
    /// Milliseconds since the epoch.
    Millis,
    /// Milliseconds since the epoch truncated to `step_millis`.
    UnixMillis {
        #[serde(default)]
        step_millis: i64,
    },
    /// Seconds since the epoch truncated to `step_secs`.
    Unix {
        #[serde(default)]
        step_secs: i64,
    },
}

/// Steps beyond the range of [Duration] saturate; negative ones are clamped by the codec.
fn saturate(step: Option<Duration>, value: i64) -> Duration {
    match step {
        Some(step) => step,
        None if value > 0 => Duration::max_value(),
        None => Duration::zero(),
    }
}

impl Format {
    /// Construct the codec described by this format.
    ///
    /// # Errors
    /// [crate::Error::InvalidLayout] if a layout pattern is not supported.
    pub fn codec(&self) -> Result<Box<dyn TimeCodec + Send + Sync>> {
        debug!(format = ?self, "building time codec");
        let codec: Box<dyn TimeCodec + Send + Sync> = match self {
            Format::Layout { pattern } => Box::new(LayoutCodec::new(pattern.as_str())?),
            Format::Reference { layout } => Box::new(LayoutCodec::reference(layout)?),
            Format::IsoWeek { canonical } => {
                let anchor = if *canonical {
                    WeekAnchor::Monday
                } else {
                    WeekAnchor::Sunday
                };
                Box::new(IsoWeekCodec::with_anchor(anchor))
            }
            Format::Millis => Box::new(MillisCodec),
            Format::UnixMillis { step_millis } => {
                let step = saturate(Duration::try_milliseconds(*step_millis), *step_millis);
                Box::new(UnixMillisCodec::new(step))
            }
            Format::Unix { step_secs } => {
                let step = saturate(Duration::try_seconds(*step_secs), *step_secs);
                Box::new(UnixCodec::new(step))
            }
        };
        Ok(codec)
    }
}
