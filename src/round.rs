use chrono::{DateTime, Duration, TimeZone};
use tracing::warn;

const NANOS_PER_SEC: i128 = 1_000_000_000;
const NANOS_PER_MILLI: i128 = 1_000_000;

/// Nanoseconds since the Unix epoch. Wide enough for the full range of [DateTime].
fn epoch_nanos<Tz: TimeZone>(t: &DateTime<Tz>) -> i128 {
    i128::from(t.timestamp()) * NANOS_PER_SEC + i128::from(t.timestamp_subsec_nanos())
}

fn duration_nanos(d: Duration) -> i128 {
    // subsec_nanos carries the sign of the duration
    i128::from(d.num_seconds()) * NANOS_PER_SEC + i128::from(d.subsec_nanos())
}

/// Whole milliseconds since the Unix epoch.
///
/// Any sub-millisecond remainder is truncated toward zero, so an instant 1.5ms before the
/// epoch is `-1`.
pub fn unix_millis<Tz: TimeZone>(t: &DateTime<Tz>) -> i64 {
    // |millis| is bounded by the range of DateTime, well inside i64
    (epoch_nanos(t) / NANOS_PER_MILLI) as i64
}

/// Truncate `t` to the closest multiple of `unit` at or before it, measured from the Unix
/// epoch. The time zone of `t` is preserved.
///
/// Truncation always floors, including for instants before the epoch. A `unit` of one
/// nanosecond or less returns `t` unchanged.
pub fn round<Tz: TimeZone>(t: &DateTime<Tz>, unit: Duration) -> DateTime<Tz> {
    let unit = duration_nanos(unit);
    if unit <= 1 {
        return t.clone();
    }
    let nanos = epoch_nanos(t);
    let floored = nanos - nanos.rem_euclid(unit);

    let secs = i64::try_from(floored.div_euclid(NANOS_PER_SEC)).ok();
    let nsecs = floored.rem_euclid(NANOS_PER_SEC) as u32;
    match secs.and_then(|secs| DateTime::from_timestamp(secs, nsecs)) {
        Some(utc) => utc.with_timezone(&t.timezone()),
        None => {
            warn!(unit_nanos = %unit, "rounded time out of range; returning time unchanged");
            t.clone()
        }
    }
}
