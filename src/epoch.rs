//! Codecs encoding time as a decimal offset from the Unix epoch.
//!
//! [UnixMillisCodec] and [UnixCodec] truncate to a configurable step before encoding, so all
//! times within a step share one encoding. Truncation always floors, including for times
//! before the epoch.
use chrono::{DateTime, Duration};
use tracing::trace;
use typed_builder::TypedBuilder;

use crate::codec::{Instant, TimeDecoder, TimeEncoder};
use crate::error::{Error, Result};
use crate::round::{round, unix_millis};

fn parse_epoch(value: &str) -> Result<i64> {
    value.parse::<i64>().map_err(|err| {
        trace!(value, "not an integer timestamp");
        Error::Number(err)
    })
}

fn from_timestamp(secs: i64, nsecs: u32) -> Result<Instant> {
    DateTime::from_timestamp(secs, nsecs)
        .map(|t| t.fixed_offset())
        .ok_or(Error::OutOfRange)
}

/// Whole milliseconds since the epoch, without any further truncation.
///
/// Sub-millisecond remainders are truncated toward zero, as with [unix_millis].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MillisCodec;

/// Process-wide [MillisCodec].
pub static MILLIS_CODEC: MillisCodec = MillisCodec;

impl TimeEncoder for MillisCodec {
    fn marshal_time(&self, t: &Instant) -> String {
        unix_millis(t).to_string()
    }
}

impl TimeDecoder for MillisCodec {
    fn unmarshal_time(&self, value: &str) -> Result<Instant> {
        let millis = parse_epoch(value)?;
        DateTime::from_timestamp_millis(millis)
            .map(|t| t.fixed_offset())
            .ok_or(Error::OutOfRange)
    }
}

/// Milliseconds since the epoch, truncated to a multiple of `step`.
///
/// `step` is clamped to a minimum of 1 millisecond.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TypedBuilder)]
pub struct UnixMillisCodec {
    #[builder(
        default = UnixMillisCodec::min_step(),
        setter(transform = |step: Duration| step.max(UnixMillisCodec::min_step()))
    )]
    step: Duration,
}

impl UnixMillisCodec {
    /// Codec truncating to `step`, clamped to at least one millisecond.
    pub fn new(step: Duration) -> Self {
        Self::builder().step(step).build()
    }

    /// Smallest step, one millisecond.
    pub fn min_step() -> Duration {
        Duration::milliseconds(1)
    }

    /// Step after clamping.
    pub fn step(&self) -> Duration {
        self.step
    }
}

impl Default for UnixMillisCodec {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TimeEncoder for UnixMillisCodec {
    fn marshal_time(&self, t: &Instant) -> String {
        let millis = unix_millis(&round(t, Self::min_step()));
        let step = self.step.num_milliseconds();
        (millis - millis.rem_euclid(step)).to_string()
    }
}

impl TimeDecoder for UnixMillisCodec {
    fn unmarshal_time(&self, value: &str) -> Result<Instant> {
        let millis = parse_epoch(value)?;
        let secs = millis.div_euclid(1000);
        // 0..1000, so the nanoseconds always fit
        let nsecs = (millis.rem_euclid(1000) * 1_000_000) as u32;
        from_timestamp(secs, nsecs)
    }
}

/// Seconds since the epoch, truncated to a multiple of `step`.
///
/// `step` is clamped to a minimum of 1 second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TypedBuilder)]
pub struct UnixCodec {
    #[builder(
        default = UnixCodec::min_step(),
        setter(transform = |step: Duration| step.max(UnixCodec::min_step()))
    )]
    step: Duration,
}

impl UnixCodec {
    /// Codec truncating to `step`, clamped to at least one second.
    pub fn new(step: Duration) -> Self {
        Self::builder().step(step).build()
    }

    /// Smallest step, one second.
    pub fn min_step() -> Duration {
        Duration::seconds(1)
    }

    /// Step after clamping.
    pub fn step(&self) -> Duration {
        self.step
    }
}

impl Default for UnixCodec {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TimeEncoder for UnixCodec {
    fn marshal_time(&self, t: &Instant) -> String {
        let secs = round(t, Self::min_step()).timestamp();
        let step = self.step.num_seconds();
        (secs - secs.rem_euclid(step)).to_string()
    }
}

impl TimeDecoder for UnixCodec {
    fn unmarshal_time(&self, value: &str) -> Result<Instant> {
        from_timestamp(parse_epoch(value)?, 0)
    }
}

#[cfg(test)]
mod test {
    use chrono::{FixedOffset, NaiveDate};

    use super::*;

    fn instant(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32, milli: u32) -> Instant {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_milli_opt(h, mi, s, milli)
            .unwrap()
            .and_utc()
            .fixed_offset()
    }

    #[test]
    fn test_millis_codec() {
        let t = DateTime::from_timestamp_nanos(1_488_708_672_345_678_901).fixed_offset();

        let s = MILLIS_CODEC.marshal_time(&t);
        assert_eq!(s, "1488708672345");

        let got = MILLIS_CODEC.unmarshal_time(&s).unwrap();
        assert_eq!(unix_millis(&got), unix_millis(&t));
        assert_eq!(got, instant(2017, 3, 5, 10, 11, 12, 345));
    }

    #[test]
    fn test_millis_codec_negative() {
        let t = DateTime::from_timestamp_nanos(-1_500_000).fixed_offset();
        assert_eq!(MILLIS_CODEC.marshal_time(&t), "-1");
        assert_eq!(
            MILLIS_CODEC.unmarshal_time("-1").unwrap(),
            DateTime::from_timestamp_nanos(-1_000_000)
        );
    }

    #[test]
    fn test_millis_codec_invalid() {
        assert!(matches!(
            MILLIS_CODEC.unmarshal_time("foo"),
            Err(Error::Number(_))
        ));
        assert!(matches!(MILLIS_CODEC.unmarshal_time(""), Err(Error::Number(_))));
        assert!(matches!(
            MILLIS_CODEC.unmarshal_time("1,000"),
            Err(Error::Number(_))
        ));
        assert_eq!(
            MILLIS_CODEC.unmarshal_time(&i64::MAX.to_string()),
            Err(Error::OutOfRange)
        );
    }

    #[test]
    fn test_unix_millis_codec_step() {
        let codec = UnixMillisCodec::new(Duration::minutes(1));
        let t = instant(2017, 3, 5, 10, 11, 12, 345);

        let s = codec.marshal_time(&t);
        assert_eq!(s, "1488708660000");
        assert_eq!(
            codec.unmarshal_time(&s).unwrap(),
            instant(2017, 3, 5, 10, 11, 0, 0)
        );
    }

    #[test]
    fn test_unix_millis_codec_keeps_millis() {
        let codec = UnixMillisCodec::default();
        let t = instant(2017, 3, 5, 10, 11, 12, 345);

        assert_eq!(codec.marshal_time(&t), "1488708672345");
        assert_eq!(codec.unmarshal_time("1488708672345").unwrap(), t);
    }

    #[test]
    fn test_unix_millis_codec_floors_before_epoch() {
        let codec = UnixMillisCodec::new(Duration::seconds(1));
        let t = instant(1969, 12, 31, 23, 59, 59, 500);

        assert_eq!(codec.marshal_time(&t), "-1000");
        assert_eq!(
            codec.unmarshal_time("-1500").unwrap(),
            instant(1969, 12, 31, 23, 59, 58, 500)
        );

        // sub-millisecond remainders floor too
        let t = DateTime::from_timestamp_nanos(-1_500_000).fixed_offset();
        assert_eq!(UnixMillisCodec::default().marshal_time(&t), "-2");
    }

    #[test]
    fn test_unix_millis_codec_clamps_step() {
        let min = UnixMillisCodec::new(Duration::milliseconds(1));
        assert_eq!(UnixMillisCodec::new(Duration::zero()), min);
        assert_eq!(UnixMillisCodec::new(Duration::microseconds(10)), min);
        assert_eq!(UnixMillisCodec::new(Duration::hours(-1)), min);
        assert_eq!(UnixMillisCodec::default(), min);
        assert_eq!(min.step(), Duration::milliseconds(1));
    }

    #[test]
    fn test_unix_codec_step() {
        let codec = UnixCodec::builder().step(Duration::hours(1)).build();
        let t = instant(2017, 3, 5, 10, 11, 12, 345);

        let s = codec.marshal_time(&t);
        assert_eq!(s, "1488708000");
        assert_eq!(codec.marshal_time(&instant(2017, 3, 5, 10, 59, 59, 999)), s);
        assert_eq!(
            codec.unmarshal_time(&s).unwrap(),
            instant(2017, 3, 5, 10, 0, 0, 0)
        );
    }

    #[test]
    fn test_unix_codec_drops_subseconds() {
        let codec = UnixCodec::default();
        let tz = FixedOffset::west_opt(7 * 3600).unwrap();
        let t = instant(2017, 3, 5, 10, 11, 12, 999).with_timezone(&tz);

        assert_eq!(codec.marshal_time(&t), "1488708672");
        assert_eq!(
            codec.unmarshal_time("1488708672").unwrap(),
            instant(2017, 3, 5, 10, 11, 12, 0)
        );
    }

    #[test]
    fn test_unix_codec_floors_before_epoch() {
        let codec = UnixCodec::new(Duration::minutes(1));
        let t = instant(1969, 12, 31, 23, 59, 30, 0);
        assert_eq!(codec.marshal_time(&t), "-60");
    }

    #[test]
    fn test_unix_codec_clamps_step() {
        let min = UnixCodec::new(Duration::seconds(1));
        assert_eq!(UnixCodec::new(Duration::zero()), min);
        assert_eq!(UnixCodec::new(Duration::milliseconds(999)), min);
        assert_eq!(UnixCodec::new(Duration::seconds(-30)), min);
        assert_eq!(UnixCodec::builder().build(), min);
    }

    #[test]
    fn test_unix_codec_invalid() {
        let codec = UnixCodec::default();
        assert!(matches!(codec.unmarshal_time("12.5"), Err(Error::Number(_))));
        assert!(matches!(codec.unmarshal_time(" 12"), Err(Error::Number(_))));
        assert_eq!(
            codec.unmarshal_time(&i64::MIN.to_string()),
            Err(Error::OutOfRange)
        );
    }
}
