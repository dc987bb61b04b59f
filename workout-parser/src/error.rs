use crate::WorkoutKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("weekday ordinal {0} is outside of 0..=6")]
    InvalidOrdinal(u8),
    #[error("vocabulary does not define any weekdays")]
    NoWeekdays,
    #[error("vocabulary contains an empty weekday token")]
    EmptyToken,
    #[error("vocabulary has no display name for {0:?}")]
    MissingLabel(WorkoutKind),
    #[error("failed to compile weekday pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("failed to build calendar link: {0}")]
    Link(#[from] url::ParseError),
}
