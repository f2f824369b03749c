use std::fmt;

use chrono::{DateTime, FixedOffset};

use crate::error::Result;

/// A point in time with nanosecond resolution and a UTC offset.
pub type Instant = DateTime<FixedOffset>;

/// Encodes an [Instant] as text.
pub trait TimeEncoder {
    fn marshal_time(&self, t: &Instant) -> String;
}

/// Decodes an [Instant] from text.
pub trait TimeDecoder {
    /// Decode `value` into an [Instant].
    ///
    /// # Errors
    /// If `value` is not in the format produced by the matching [TimeEncoder]. A value that
    /// fails to decode will never succeed on a later attempt.
    fn unmarshal_time(&self, value: &str) -> Result<Instant>;
}

/// A paired [TimeEncoder] and [TimeDecoder].
///
/// Implemented for anything implementing both halves, so codecs are used as trait objects
/// (`Box<dyn TimeCodec>`) or generic parameters interchangeably.
pub trait TimeCodec: TimeEncoder + TimeDecoder {}

impl<T: TimeEncoder + TimeDecoder + ?Sized> TimeCodec for T {}

impl<T: TimeEncoder + ?Sized> TimeEncoder for Box<T> {
    fn marshal_time(&self, t: &Instant) -> String {
        (**self).marshal_time(t)
    }
}

impl<T: TimeDecoder + ?Sized> TimeDecoder for Box<T> {
    fn unmarshal_time(&self, value: &str) -> Result<Instant> {
        (**self).unmarshal_time(value)
    }
}

impl<T: TimeEncoder + ?Sized> TimeEncoder for &T {
    fn marshal_time(&self, t: &Instant) -> String {
        (**self).marshal_time(t)
    }
}

impl<T: TimeDecoder + ?Sized> TimeDecoder for &T {
    fn unmarshal_time(&self, value: &str) -> Result<Instant> {
        (**self).unmarshal_time(value)
    }
}

/// A codec composed from an encode function and a decode function.
#[derive(Clone)]
pub struct FnCodec<E, D> {
    enc: E,
    dec: D,
}

impl<E, D> FnCodec<E, D>
where
    E: Fn(&Instant) -> String,
    D: Fn(&str) -> Result<Instant>,
{
    pub fn new(enc: E, dec: D) -> Self {
        Self { enc, dec }
    }

    /// Compose a codec from functions that may not have been provided.
    ///
    /// # Panics
    /// If either `enc` or `dec` is `None`. A codec missing either half is a programming
    /// error, so no codec is ever returned for it.
    pub fn from_parts(enc: Option<E>, dec: Option<D>) -> Self {
        let Some(enc) = enc else {
            panic!("invalid time encoder");
        };
        let Some(dec) = dec else {
            panic!("invalid time decoder");
        };
        Self::new(enc, dec)
    }
}

impl<E, D> TimeEncoder for FnCodec<E, D>
where
    E: Fn(&Instant) -> String,
{
    fn marshal_time(&self, t: &Instant) -> String {
        (self.enc)(t)
    }
}

impl<E, D> TimeDecoder for FnCodec<E, D>
where
    D: Fn(&str) -> Result<Instant>,
{
    fn unmarshal_time(&self, value: &str) -> Result<Instant> {
        (self.dec)(value)
    }
}

impl<E, D> fmt::Debug for FnCodec<E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCodec").finish_non_exhaustive()
    }
}
