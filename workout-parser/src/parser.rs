use std::ops::Range;

use chrono::{NaiveDateTime, NaiveTime};
use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Clock, SystemClock, Vocabulary, WeekdayInfo, WorkoutEvent};

macro_rules! regex {
    ($pattern:expr) => {{
        static REGEX: Lazy<Regex> = Lazy::new(|| Regex::new($pattern).unwrap());
        &REGEX
    }};
}

/// A schedule the parser is known to understand, shown when nothing was found.
pub const EXAMPLE_SCHEDULE: &str = "\
🏃 Вторник, бег: интервалы, 07:00, парк Яркон.
https://waze.com/ul/hsv8wrvjg4
🏊 Четверг, плавание 06:30, Гордон.
🚴 Суббота, вело 6:00, Латрун.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// How many lines after an entry may carry its Waze link.
    pub link_lookahead: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { link_lookahead: 1 }
    }
}

/// Best-effort extraction of workouts from free-form schedule text.
#[derive(Debug, Clone)]
pub struct ScheduleParser<C = SystemClock> {
    vocabulary: Vocabulary,
    clock: C,
    config: ParserConfig,
}

impl Default for ScheduleParser {
    fn default() -> Self {
        Self::new(Vocabulary::default(), SystemClock, ParserConfig::default())
    }
}

struct Entry<'a> {
    weekday: &'a WeekdayInfo,
    /// Entry text with leading decorations removed.
    text: String,
    /// Entry text as written, used for glyph cues.
    raw: String,
    /// Number of lines the entry spans.
    consumed: usize,
}

impl<C: Clock> ScheduleParser<C> {
    pub fn new(vocabulary: Vocabulary, clock: C, config: ParserConfig) -> Self {
        Self {
            vocabulary,
            clock,
            config,
        }
    }

    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Lines that do not describe a workout are skipped.
    pub fn parse<S: AsRef<str>>(&self, text: S) -> Vec<WorkoutEvent> {
        let lines = text.as_ref().lines().collect::<Vec<_>>();
        let now = self.clock.now().naive_local();

        let mut events = Vec::new();
        let mut index = 0;

        while index < lines.len() {
            match self.parse_entry(&lines, index, now) {
                Some((event, consumed)) => {
                    events.push(event);
                    index += consumed;
                }
                None => index += 1,
            }
        }

        debug!("Parsed {} workouts from {} lines", events.len(), lines.len());
        events
    }

    fn parse_entry(
        &self,
        lines: &[&str],
        index: usize,
        now: NaiveDateTime,
    ) -> Option<(WorkoutEvent, usize)> {
        let entry = self.locate_entry(lines, index)?;
        let (time, span) = find_time(&entry.text)?;

        let kind = self.vocabulary.classify(&entry.raw);

        let location = extract_location(&entry.text[span.end..])
            .unwrap_or_else(|| self.vocabulary.location_placeholder().to_string());

        let description = self
            .extract_description(&entry.text[..span.start])
            .unwrap_or_else(|| self.vocabulary.label(kind).to_string());

        let waze_link = self.find_waze_link(&lines[index + entry.consumed..]);

        debug!(
            "Found {} workout on {} at {}",
            kind.canonical_name(),
            entry.weekday.token(),
            time.format("%H:%M")
        );

        let event = WorkoutEvent::new(
            entry.weekday.clone(),
            time,
            kind,
            description,
            location,
            waze_link,
            now,
        );

        Some((event, entry.consumed))
    }

    fn locate_entry<'a>(&'a self, lines: &[&str], index: usize) -> Option<Entry<'a>> {
        let raw = lines[index].trim();
        let line = strip_decorations(raw);
        let weekday = self.vocabulary.find_weekday(&line.to_lowercase())?;

        if find_time(line).is_some() {
            return Some(Entry {
                weekday,
                text: line.to_string(),
                raw: raw.to_string(),
                consumed: 1,
            });
        }

        // A following entry keeps its own time.
        let next = lines
            .get(index + 1)
            .map(|next| next.trim())
            .filter(|next| find_time(next).is_some())
            .filter(|next| {
                let lowered = strip_decorations(next).to_lowercase();
                self.vocabulary.find_weekday(&lowered).is_none()
            });

        let Some(next) = next else {
            trace!("Skipping {} entry without a time", weekday.token());
            return None;
        };

        Some(Entry {
            weekday,
            text: format!("{line} {}", strip_decorations(next)),
            raw: format!("{raw} {next}"),
            consumed: 2,
        })
    }

    fn extract_description(&self, before: &str) -> Option<String> {
        let without_days = self.vocabulary.strip_weekdays(before);
        let glyphs = regex!(
            r"[\x{1F3C3}\x{1F3CA}\x{1F6B4}\x{1F6DF}][\p{Emoji_Modifier}\x{200D}\x{2640}\x{2642}\x{FE0F}]*"
        );
        let without_glyphs = glyphs.replace_all(&without_days, "");

        let description = without_glyphs
            .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ':' | '-'));

        (!description.is_empty()).then(|| description.to_string())
    }

    fn find_waze_link(&self, following: &[&str]) -> Option<String> {
        following
            .iter()
            .take(self.config.link_lookahead)
            .take_while(|line| self.vocabulary.find_weekday(&line.to_lowercase()).is_none())
            .find_map(|line| regex!(r"https?://waze\.com/\S+").find(*line))
            .map(|link| link.as_str().to_string())
    }
}

/// Drops the icons schedule authors put in front of lines.
fn strip_decorations(line: &str) -> &str {
    let decorations =
        regex!(r"^(?:[\p{Extended_Pictographic}\p{So}\p{Emoji_Modifier}][\x{FE0F}\x{200D}]*\s*)+");

    match decorations.find(line) {
        Some(found) => &line[found.end()..],
        None => line,
    }
}

/// First `H:MM` or `HH:MM` token that is a valid time of day.
fn find_time(text: &str) -> Option<(NaiveTime, Range<usize>)> {
    regex!(r"([0-9]{1,2}):([0-9]{2})")
        .captures_iter(text)
        .find_map(|captures| {
            let hour = captures[1].parse().ok()?;
            let minute = captures[2].parse().ok()?;
            let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
            Some((time, captures.get(0)?.range()))
        })
}

/// The venue follows the first comma after the time, up to the first period.
fn extract_location(after: &str) -> Option<String> {
    let venue = after.split('.').next().unwrap_or_default();
    let captures = regex!(r",\s*(.+)$").captures(venue)?;
    let location = captures[1].trim();

    (!location.is_empty()).then(|| location.to_string())
}
