//! Layout codec.
//!
//! A [LayoutCodec] formats and parses times with a strftime pattern (see
//! [chrono::format::strftime]). Layouts written against the reference date
//! `Mon Jan 2 15:04:05 MST 2006` are accepted via [LayoutCodec::reference], which
//! translates them to the equivalent chrono format items.
use chrono::format::{self, Fixed, Item, ParseErrorKind, ParseResult, Parsed, StrftimeItems};
use chrono::{FixedOffset, Offset, Utc};
use tracing::trace;

use crate::codec::{Instant, TimeDecoder, TimeEncoder};
use crate::error::{Error, Result};

/// What a reference layout chunk translates to.
enum Directive {
    Strftime(&'static str),
    /// Offset printed as `Z` for UTC.
    Zulu(Fixed),
}

/// Reference layout chunks and their translations.
///
/// Chunks sharing a prefix are ordered longest first; the first match wins.
const REFERENCE_CHUNKS: &[(&str, Directive)] = &[
    ("January", Directive::Strftime("%B")),
    ("Jan", Directive::Strftime("%b")),
    ("Monday", Directive::Strftime("%A")),
    ("Mon", Directive::Strftime("%a")),
    ("MST", Directive::Strftime("%Z")),
    ("2006", Directive::Strftime("%Y")),
    ("002", Directive::Strftime("%j")),
    ("01", Directive::Strftime("%m")),
    ("02", Directive::Strftime("%d")),
    ("03", Directive::Strftime("%I")),
    ("04", Directive::Strftime("%M")),
    ("05", Directive::Strftime("%S")),
    ("06", Directive::Strftime("%y")),
    ("_2", Directive::Strftime("%e")),
    ("15", Directive::Strftime("%H")),
    ("-07:00", Directive::Strftime("%:z")),
    ("-0700", Directive::Strftime("%z")),
    ("Z07:00", Directive::Zulu(Fixed::TimezoneOffsetColonZ)),
    ("Z0700", Directive::Zulu(Fixed::TimezoneOffsetZ)),
    (".000000000", Directive::Strftime("%.9f")),
    (".999999999", Directive::Strftime("%.f")),
    (".000000", Directive::Strftime("%.6f")),
    (".000", Directive::Strftime("%.3f")),
    ("PM", Directive::Strftime("%p")),
    ("pm", Directive::Strftime("%P")),
    ("1", Directive::Strftime("%-m")),
    ("2", Directive::Strftime("%-d")),
    ("3", Directive::Strftime("%-I")),
    ("4", Directive::Strftime("%-M")),
    ("5", Directive::Strftime("%-S")),
    ("%", Directive::Strftime("%%")),
];

fn into_owned(item: Item<'_>) -> Item<'static> {
    match item {
        Item::Literal(s) => Item::OwnedLiteral(s.into()),
        Item::OwnedLiteral(s) => Item::OwnedLiteral(s),
        Item::Space(s) => Item::OwnedSpace(s.into()),
        Item::OwnedSpace(s) => Item::OwnedSpace(s),
        Item::Numeric(numeric, pad) => Item::Numeric(numeric, pad),
        Item::Fixed(fixed) => Item::Fixed(fixed),
        Item::Error => Item::Error,
    }
}

fn strftime_items(pattern: &str) -> impl Iterator<Item = Item<'static>> + '_ {
    StrftimeItems::new(pattern).map(into_owned)
}

/// Translate a reference-date layout to chrono format items.
///
/// `Z07:00` and `Z0700` become offsets that print UTC as `Z`.
pub fn translate_reference(layout: &str) -> Vec<Item<'static>> {
    let mut items = Vec::new();
    let mut pattern = String::with_capacity(layout.len() * 2);
    let mut rest = layout;
    'outer: while !rest.is_empty() {
        for (chunk, directive) in REFERENCE_CHUNKS {
            if let Some(tail) = rest.strip_prefix(chunk) {
                match directive {
                    Directive::Strftime(spec) => pattern.push_str(spec),
                    Directive::Zulu(fixed) => {
                        items.extend(strftime_items(&pattern));
                        pattern.clear();
                        items.push(Item::Fixed(fixed.clone()));
                    }
                }
                rest = tail;
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            pattern.push(ch);
        }
        rest = chars.as_str();
    }
    items.extend(strftime_items(&pattern));
    items
}

/// Fill what the layout left out: year 0, January, the 1st, midnight.
fn fill_defaults(parsed: &mut Parsed) -> ParseResult<()> {
    if parsed.timestamp().is_some() {
        return Ok(());
    }

    let has_year = parsed.year().is_some()
        || parsed.year_div_100().is_some()
        || parsed.year_mod_100().is_some()
        || parsed.isoyear().is_some()
        || parsed.isoyear_div_100().is_some()
        || parsed.isoyear_mod_100().is_some();
    let has_week = parsed.week_from_sun().is_some()
        || parsed.week_from_mon().is_some()
        || parsed.isoweek().is_some();
    let has_day_of_year = has_week || parsed.ordinal().is_some();

    if !has_year {
        parsed.set_year(0)?;
    }
    if parsed.month().is_none() && !has_day_of_year {
        parsed.set_month(1)?;
    }
    if parsed.day().is_none() && !has_day_of_year {
        parsed.set_day(1)?;
    }

    // 12 is hour 0 on the 12-hour clock
    if parsed.hour_mod_12().is_none() {
        parsed.set_hour12(12)?;
    }
    if parsed.hour_div_12().is_none() {
        parsed.set_ampm(false)?;
    }
    if parsed.minute().is_none() {
        parsed.set_minute(0)?;
    }
    Ok(())
}

/// Formats and parses times according to a sequence of chrono format items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutCodec {
    items: Vec<Item<'static>>,
}

impl LayoutCodec {
    /// Create a codec for the strftime `pattern`.
    ///
    /// # Errors
    /// [Error::InvalidLayout] if `pattern` contains an unsupported specifier.
    pub fn new<S: Into<String>>(pattern: S) -> Result<Self> {
        let pattern = pattern.into();
        Self::from_items(strftime_items(&pattern).collect())
            .ok_or(Error::InvalidLayout(pattern))
    }

    /// Create a codec from a layout written against the reference date
    /// `Mon Jan 2 15:04:05 MST 2006`.
    ///
    /// # Errors
    /// [Error::InvalidLayout] if the translated layout is not supported.
    pub fn reference(layout: &str) -> Result<Self> {
        Self::from_items(translate_reference(layout))
            .ok_or_else(|| Error::InvalidLayout(layout.to_string()))
    }

    fn from_items(items: Vec<Item<'static>>) -> Option<Self> {
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return None;
        }
        Some(Self { items })
    }

    pub fn items(&self) -> &[Item<'static>] {
        &self.items
    }
}

impl TimeEncoder for LayoutCodec {
    fn marshal_time(&self, t: &Instant) -> String {
        t.format_with_items(self.items.iter()).to_string()
    }
}

impl TimeDecoder for LayoutCodec {
    /// Parse `value`. Fields missing from the layout are zero, or one where zero is not
    /// a valid value (January, the 1st), and a missing offset is UTC.
    fn unmarshal_time(&self, value: &str) -> Result<Instant> {
        let mut parsed = Parsed::new();
        format::parse(&mut parsed, value, self.items.iter()).map_err(|err| {
            trace!(value, "time does not match layout");
            err
        })?;
        fill_defaults(&mut parsed)?;

        let date = parsed.to_naive_date()?;
        let time = parsed.to_naive_time()?;
        let offset: FixedOffset = match parsed.to_fixed_offset() {
            Ok(offset) => offset,
            Err(err) if err.kind() == ParseErrorKind::NotEnough => Utc.fix(),
            Err(err) => return Err(err.into()),
        };

        date.and_time(time)
            .and_local_timezone(offset)
            .single()
            .ok_or(Error::OutOfRange)
    }
}
