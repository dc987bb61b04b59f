use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

#[cfg(feature = "serde")]
use chrono::Timelike;
#[cfg(feature = "serde")]
use serde::{Serialize, Serializer};

use crate::Error;

/// Every workout is booked for this long unless configured otherwise.
pub const DEFAULT_DURATION_MINUTES: i64 = 90;

pub(crate) const COMPACT_FORMAT: &str = "%Y%m%dT%H%M%S";

#[cfg(feature = "serde")]
fn serialize_naive_time<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    let formatted_time = format!("{:02}:{:02}", time.hour(), time.minute());
    serializer.serialize_str(&formatted_time)
}

const ISO_WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Converts a schedule ordinal (0 = Sunday ..= 6 = Saturday) into an ISO
/// index (0 = Monday ..= 6 = Sunday).
#[must_use]
pub fn iso_index(ordinal: u8) -> Option<u8> {
    (ordinal < 7).then(|| (ordinal + 6) % 7)
}

#[must_use]
pub fn weekday_from_ordinal(ordinal: u8) -> Option<Weekday> {
    iso_index(ordinal).map(|index| ISO_WEEK[usize::from(index)])
}

/// First date strictly after `today` that falls on `weekday`.
#[must_use]
pub fn next_occurrence(weekday: Weekday, today: NaiveDate) -> NaiveDate {
    let target = weekday.num_days_from_monday();
    let current = today.weekday().num_days_from_monday();

    let delta = match (7 + target - current) % 7 {
        0 => 7,
        delta => delta,
    };

    today + Duration::days(i64::from(delta))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum WorkoutKind {
    Running,
    Swimming,
    Cycling,
    Combined,
}

impl WorkoutKind {
    pub const ALL: [WorkoutKind; 4] = [
        WorkoutKind::Running,
        WorkoutKind::Swimming,
        WorkoutKind::Cycling,
        WorkoutKind::Combined,
    ];

    #[must_use]
    pub fn glyph(self) -> &'static str {
        match self {
            WorkoutKind::Running => "🏃",
            WorkoutKind::Swimming => "🏊",
            WorkoutKind::Cycling => "🚴",
            WorkoutKind::Combined => "🏃🏊",
        }
    }

    /// ASCII name used inside identifiers and file names.
    #[must_use]
    pub fn canonical_name(self) -> &'static str {
        match self {
            WorkoutKind::Running => "Running",
            WorkoutKind::Swimming => "Swimming",
            WorkoutKind::Cycling => "Cycling",
            WorkoutKind::Combined => "Run+Swim",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct WeekdayInfo {
    token: String,
    display: String,
    #[cfg_attr(feature = "serde", serde(skip))]
    weekday: Weekday,
}

impl WeekdayInfo {
    pub fn new<T: Into<String>, D: Into<String>>(token: T, display: D, weekday: Weekday) -> Self {
        Self {
            token: token.into().to_lowercase(),
            display: display.into(),
            weekday,
        }
    }

    pub fn from_ordinal<T: Into<String>, D: Into<String>>(
        token: T,
        display: D,
        ordinal: u8,
    ) -> Result<Self, Error> {
        let weekday = weekday_from_ordinal(ordinal).ok_or(Error::InvalidOrdinal(ordinal))?;
        Ok(Self::new(token, display, weekday))
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }

    #[must_use]
    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    /// Schedule ordinal, 0 = Sunday ..= 6 = Saturday.
    #[must_use]
    pub fn ordinal(&self) -> u8 {
        self.weekday.num_days_from_sunday() as u8
    }
}

/// A single workout recognized in a schedule.
///
/// The calendar date is resolved once from the weekday and the moment of
/// construction and cannot be set from outside. Only `selected` is meant to
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct WorkoutEvent {
    weekday: WeekdayInfo,
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_naive_time"))]
    time: NaiveTime,
    kind: WorkoutKind,
    description: String,
    location: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    waze_link: Option<String>,
    pub selected: bool,
    occurs_on: NaiveDate,
}

impl WorkoutEvent {
    pub fn new(
        weekday: WeekdayInfo,
        time: NaiveTime,
        kind: WorkoutKind,
        description: String,
        location: String,
        waze_link: Option<String>,
        now: NaiveDateTime,
    ) -> Self {
        let occurs_on = next_occurrence(weekday.weekday(), now.date());

        Self {
            weekday,
            time,
            kind,
            description,
            location,
            waze_link,
            selected: true,
            occurs_on,
        }
    }

    #[must_use]
    pub fn weekday(&self) -> &WeekdayInfo {
        &self.weekday
    }

    #[must_use]
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    #[must_use]
    pub fn kind(&self) -> WorkoutKind {
        self.kind
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn waze_link(&self) -> Option<&str> {
        self.waze_link.as_deref()
    }

    #[must_use]
    pub fn occurs_on(&self) -> NaiveDate {
        self.occurs_on
    }

    #[must_use]
    pub fn start(&self) -> NaiveDateTime {
        self.occurs_on.and_time(self.time)
    }

    #[must_use]
    pub fn end(&self, duration: Duration) -> NaiveDateTime {
        self.start() + duration
    }

    #[must_use]
    pub fn summary(&self) -> String {
        format!("{} {}", self.kind.glyph(), self.description)
    }

    /// Free-text details: the description followed by the Waze link, if any.
    #[must_use]
    pub fn details(&self) -> String {
        match &self.waze_link {
            Some(link) => format!("{}\nWaze: {link}", self.description),
            None => self.description.clone(),
        }
    }

    /// Stable for a given start and kind, independent of when it is computed.
    #[must_use]
    pub fn uid(&self, domain: &str) -> String {
        format!(
            "training-{}-{}@{domain}",
            self.start().format(COMPACT_FORMAT),
            self.kind.canonical_name()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn iso_index_covers_the_whole_week() {
        let expected = [
            (0, 6), // Sunday
            (1, 0),
            (2, 1),
            (3, 2),
            (4, 3),
            (5, 4),
            (6, 5), // Saturday
        ];

        for (ordinal, iso) in expected {
            assert_eq!(iso_index(ordinal), Some(iso), "ordinal {ordinal}");
        }
        assert_eq!(iso_index(7), None);
        assert_eq!(iso_index(u8::MAX), None);
    }

    #[test]
    fn weekday_from_ordinal_matches_chrono() {
        for ordinal in 0..7 {
            let weekday = weekday_from_ordinal(ordinal).unwrap();
            assert_eq!(weekday.num_days_from_sunday(), u32::from(ordinal));
        }
        assert_eq!(weekday_from_ordinal(0), Some(Weekday::Sun));
        assert_eq!(weekday_from_ordinal(1), Some(Weekday::Mon));
        assert_eq!(weekday_from_ordinal(7), None);
    }

    #[test]
    fn from_ordinal_rejects_out_of_range() {
        assert!(matches!(
            WeekdayInfo::from_ordinal("x", "X", 9),
            Err(Error::InvalidOrdinal(9))
        ));

        let sunday = WeekdayInfo::from_ordinal("Воскресенье", "Воскресенье", 0).unwrap();
        assert_eq!(sunday.token(), "воскресенье");
        assert_eq!(sunday.weekday(), Weekday::Sun);
        assert_eq!(sunday.ordinal(), 0);
    }

    #[test]
    fn next_occurrence_is_strictly_in_the_future() {
        // 2026-10-19 is a Monday
        let monday = date(2026, 10, 19);

        assert_eq!(next_occurrence(Weekday::Tue, monday), date(2026, 10, 20));
        assert_eq!(next_occurrence(Weekday::Sun, monday), date(2026, 10, 25));
        assert_eq!(next_occurrence(Weekday::Mon, monday), date(2026, 10, 26));

        for weekday in ISO_WEEK {
            let resolved = next_occurrence(weekday, monday);
            assert!(resolved > monday);
            assert!(resolved <= monday + Duration::days(7));
            assert_eq!(resolved.weekday(), weekday);
        }
    }

    #[test]
    fn event_identity_depends_on_start_and_kind() {
        let now = date(2026, 10, 19).and_hms_opt(8, 0, 0).unwrap();
        let event = WorkoutEvent::new(
            WeekdayInfo::new("среда", "Среда", Weekday::Wed),
            NaiveTime::from_hms_opt(7, 5, 0).unwrap(),
            WorkoutKind::Combined,
            "Интервалы".into(),
            "Пляж".into(),
            None,
            now,
        );

        assert!(event.selected);
        assert_eq!(event.occurs_on(), date(2026, 10, 21));
        assert_eq!(
            event.uid("example.org"),
            "training-20261021T070500-Run+Swim@example.org"
        );
        assert_eq!(
            event.end(Duration::minutes(DEFAULT_DURATION_MINUTES)),
            date(2026, 10, 21).and_hms_opt(8, 35, 0).unwrap()
        );
        assert_eq!(event.summary(), "🏃🏊 Интервалы");
        assert_eq!(event.details(), "Интервалы");
    }
}
