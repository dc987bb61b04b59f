use chrono::{Duration, Utc};
use ics::{
    escape_text,
    properties::{Description, DtEnd, DtStart, Location, Summary},
    ICalendar,
};

use crate::structs::COMPACT_FORMAT;
use crate::{Clock, SystemClock, WorkoutEvent, DEFAULT_DURATION_MINUTES};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcsConfig {
    pub duration: Duration,
    pub uid_domain: String,
    pub product_id: String,
}

impl Default for IcsConfig {
    fn default() -> Self {
        Self {
            duration: Duration::minutes(DEFAULT_DURATION_MINUTES),
            uid_domain: "workout-calendar".into(),
            product_id: "-//Workout Calendar//EN".into(),
        }
    }
}

/// Renders workouts as iCalendar text. Times are written as floating local
/// times, only DTSTAMP is in UTC.
#[derive(Debug, Clone, Default)]
pub struct IcsSerializer<C = SystemClock> {
    clock: C,
    config: IcsConfig,
}

impl<C: Clock> IcsSerializer<C> {
    pub fn new(clock: C, config: IcsConfig) -> Self {
        Self { clock, config }
    }

    #[must_use]
    pub fn config(&self) -> &IcsConfig {
        &self.config
    }

    #[must_use]
    pub fn event(&self, event: &WorkoutEvent) -> ics::Event<'static> {
        let stamp = self
            .clock
            .now()
            .with_timezone(&Utc)
            .format("%Y%m%dT%H%M%SZ")
            .to_string();

        let start = event.start().format(COMPACT_FORMAT).to_string();
        let end = event
            .end(self.config.duration)
            .format(COMPACT_FORMAT)
            .to_string();

        let mut ics_event = ics::Event::new(event.uid(&self.config.uid_domain), stamp);

        ics_event.push(DtStart::new(start));
        ics_event.push(DtEnd::new(end));
        ics_event.push(Summary::new(escape(event.summary())));
        ics_event.push(Location::new(escape(event.location().to_string())));
        ics_event.push(Description::new(escape(event.details())));

        ics_event
    }

    /// A calendar holding every selected event.
    pub fn calendar<'e, I>(&self, events: I) -> ICalendar<'static>
    where
        I: IntoIterator<Item = &'e WorkoutEvent>,
    {
        let mut icalendar = ICalendar::new("2.0", self.config.product_id.clone());

        for event in events.into_iter().filter(|event| event.selected) {
            icalendar.add_event(self.event(event));
        }

        icalendar
    }

    /// A complete calendar file for a single event, selected or not.
    #[must_use]
    pub fn calendar_block(&self, event: &WorkoutEvent) -> String {
        let mut icalendar = ICalendar::new("2.0", self.config.product_id.clone());
        icalendar.add_event(self.event(event));
        icalendar.to_string()
    }
}

/// TEXT escaping with line breaks always written as a literal `\n`.
fn escape(text: String) -> String {
    escape_text(text)
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', "\\n")
}

#[must_use]
pub fn file_name(event: &WorkoutEvent) -> String {
    format!(
        "workout-{}-{}.ics",
        event.start().format("%Y%m%d-%H%M"),
        event.kind().canonical_name().to_lowercase().replace('+', "-")
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{FixedClock, ParserConfig, ScheduleParser, Vocabulary};

    fn clock(hour: u32) -> FixedClock {
        let now = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        FixedClock::at(now)
    }

    fn parse(text: &str) -> Vec<WorkoutEvent> {
        ScheduleParser::new(Vocabulary::russian(), clock(12), ParserConfig::default()).parse(text)
    }

    fn serializer(hour: u32) -> IcsSerializer<FixedClock> {
        IcsSerializer::new(clock(hour), IcsConfig::default())
    }

    #[test]
    fn block_contains_the_event() {
        let events = parse("🏃 Воскресенье, бег: техника, 19:30, Бат-Ям.");
        let block = serializer(12).calendar_block(&events[0]);

        assert!(block.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(block.contains("VERSION:2.0"));
        assert!(block.contains("PRODID:-//Workout Calendar//EN"));
        assert!(block.contains("BEGIN:VEVENT"));
        assert!(block.contains("UID:training-20261025T193000-Running@workout-calendar"));
        assert!(block.contains("DTSTAMP:20261019T120000Z"));
        assert!(block.contains("DTSTART:20261025T193000"));
        assert!(block.contains("DTEND:20261025T210000"));
        assert!(block.contains("SUMMARY:🏃 бег: техника"));
        assert!(block.contains("LOCATION:Бат-Ям"));
        assert!(block.trim_end().ends_with("END:VCALENDAR"));
    }

    #[test]
    fn end_crosses_midnight() {
        let events = parse("Вторник бег 23:00");
        let block = serializer(12).calendar_block(&events[0]);

        assert!(block.contains("DTSTART:20261020T230000"));
        assert!(block.contains("DTEND:20261021T003000"));
    }

    #[test]
    fn text_values_are_escaped() {
        let events = parse("Вторник, темп; отрезки, 7:00, стадион; северная трибуна\nhttps://waze.com/ul/x");
        let block = serializer(12).calendar_block(&events[0]);

        assert!(block.contains(r"SUMMARY:🏃 темп\; отрезки"));
        assert!(block.contains(r"LOCATION:стадион\; северная трибуна"));
        assert!(block.contains(r"DESCRIPTION:темп\; отрезки\nWaze: https://waze.com/ul/x"));
    }

    #[test]
    fn line_breaks_never_reach_the_output() {
        let events = parse("Вторник бег 7:00, парк\nhttps://waze.com/ul/x");
        let block = serializer(12).calendar_block(&events[0]);

        assert!(block.contains(r"DESCRIPTION:бег\nWaze: https://waze.com/ul/x"));
        assert!(block.split("\r\n").all(|line| !line.contains('\n')));
    }

    #[test]
    fn serialization_is_stable_apart_from_the_stamp() {
        let events = parse("🏊 Четверг море 6:30, Гордон");

        let first = serializer(12).calendar_block(&events[0]);
        let again = serializer(12).calendar_block(&events[0]);
        assert_eq!(first, again);

        let later = serializer(18).calendar_block(&events[0]);
        let differing = first
            .lines()
            .zip(later.lines())
            .filter(|(a, b)| a != b)
            .collect::<Vec<_>>();

        assert_eq!(differing.len(), 1);
        assert!(differing[0].0.starts_with("DTSTAMP:"));
    }

    #[test]
    fn calendar_only_includes_selected_events() {
        let mut events = parse("Вторник 7:00\nСреда 7:00\nЧетверг 7:00");
        events[1].selected = false;

        let calendar = serializer(12).calendar(&events).to_string();

        assert_eq!(calendar.matches("BEGIN:VEVENT").count(), 2);
        assert!(calendar.contains("DTSTART:20261020T070000"));
        assert!(!calendar.contains("DTSTART:20261021T070000"));
        assert!(calendar.contains("DTSTART:20261022T070000"));
    }

    #[test]
    fn custom_duration_and_domain() {
        let events = parse("🚴 Суббота вело 6:00, Латрун");
        let config = IcsConfig {
            duration: Duration::hours(3),
            uid_domain: "example.org".into(),
            ..IcsConfig::default()
        };
        let block = IcsSerializer::new(clock(12), config).calendar_block(&events[0]);

        assert!(block.contains("UID:training-20261024T060000-Cycling@example.org"));
        assert!(block.contains("DTEND:20261024T090000"));
    }

    #[test]
    fn file_names() {
        let events = parse("Среда бег и плавание 6:30\nПятница бег 18:05");

        assert_eq!(file_name(&events[0]), "workout-20261021-0630-run-swim.ics");
        assert_eq!(file_name(&events[1]), "workout-20261023-1805-running.ics");
    }
}
