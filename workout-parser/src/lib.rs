mod clock;
mod error;
mod link;
mod parser;
mod selection;
mod structs;
mod vocabulary;

#[cfg(feature = "ics")]
mod ics;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::Error;
#[cfg(feature = "ics")]
pub use crate::ics::{file_name, IcsConfig, IcsSerializer};
pub use link::google_calendar_link;
pub use parser::{ParserConfig, ScheduleParser, EXAMPLE_SCHEDULE};
pub use selection::Selection;
pub use structs::{
    iso_index, next_occurrence, weekday_from_ordinal, WeekdayInfo, WorkoutEvent, WorkoutKind,
    DEFAULT_DURATION_MINUTES,
};
pub use vocabulary::{Cue, KindRule, Vocabulary};
