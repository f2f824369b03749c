#![doc = include_str!("../README.md")]

mod codec;
mod epoch;
mod error;
mod format;
mod isoweek;
mod layout;
mod round;

pub use codec::{FnCodec, Instant, TimeCodec, TimeDecoder, TimeEncoder};
pub use epoch::{MillisCodec, UnixCodec, UnixMillisCodec, MILLIS_CODEC};
pub use error::{Error, Result};
pub use format::Format;
pub use isoweek::{IsoWeekCodec, WeekAnchor, ISO_WEEK_CODEC};
pub use layout::{translate_reference, LayoutCodec};
pub use round::{round, unix_millis};
