use std::collections::HashMap;

use chrono::Weekday;
use regex::Regex;

use crate::{Error, WeekdayInfo, WorkoutKind};

const DEFAULT_LOCATION: &str = "Training location";

/// A group of keywords and glyphs that hint at one sport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    keywords: Vec<String>,
    glyphs: Vec<String>,
}

impl Cue {
    pub fn new<K, G>(keywords: K, glyphs: G) -> Self
    where
        K: IntoIterator,
        K::Item: Into<String>,
        G: IntoIterator,
        G::Item: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|keyword| keyword.into().to_lowercase())
                .collect(),
            glyphs: glyphs.into_iter().map(Into::into).collect(),
        }
    }

    fn matches(&self, lowered: &str, raw: &str) -> bool {
        self.keywords.iter().any(|keyword| lowered.contains(keyword.as_str()))
            || self.glyphs.iter().any(|glyph| raw.contains(glyph.as_str()))
    }
}

/// Assigns `kind` to a line on which every cue in `requires` is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindRule {
    pub kind: WorkoutKind,
    pub requires: Vec<Cue>,
}

impl KindRule {
    pub fn new(kind: WorkoutKind, requires: Vec<Cue>) -> Self {
        Self { kind, requires }
    }

    /// Matches any line.
    pub fn fallback(kind: WorkoutKind) -> Self {
        Self::new(kind, Vec::new())
    }

    fn matches(&self, lowered: &str, raw: &str) -> bool {
        self.requires.iter().all(|cue| cue.matches(lowered, raw))
    }
}

/// Words and symbols the parser recognizes.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    weekdays: Vec<WeekdayInfo>,
    rules: Vec<KindRule>,
    labels: HashMap<WorkoutKind, String>,
    location_placeholder: String,
    weekday_pattern: Regex,
}

impl Vocabulary {
    pub fn new<P: Into<String>>(
        weekdays: Vec<WeekdayInfo>,
        rules: Vec<KindRule>,
        labels: HashMap<WorkoutKind, String>,
        location_placeholder: P,
    ) -> Result<Self, Error> {
        if weekdays.is_empty() {
            return Err(Error::NoWeekdays);
        }

        if weekdays.iter().any(|day| day.token().trim().is_empty()) {
            return Err(Error::EmptyToken);
        }

        if let Some(kind) = WorkoutKind::ALL
            .into_iter()
            .find(|kind| !labels.contains_key(kind))
        {
            return Err(Error::MissingLabel(kind));
        }

        let alternatives = weekdays
            .iter()
            .map(|day| regex::escape(day.token()))
            .collect::<Vec<_>>()
            .join("|");
        let weekday_pattern = Regex::new(&format!("(?i){alternatives}"))?;

        Ok(Self {
            weekdays,
            rules,
            labels,
            location_placeholder: location_placeholder.into(),
            weekday_pattern,
        })
    }

    #[must_use]
    pub fn russian() -> Self {
        let weekdays = [
            ("понедельник", "Понедельник", Weekday::Mon),
            ("вторник", "Вторник", Weekday::Tue),
            ("среда", "Среда", Weekday::Wed),
            ("четверг", "Четверг", Weekday::Thu),
            ("пятница", "Пятница", Weekday::Fri),
            ("суббота", "Суббота", Weekday::Sat),
            ("воскресенье", "Воскресенье", Weekday::Sun),
        ]
        .into_iter()
        .map(|(token, display, weekday)| WeekdayInfo::new(token, display, weekday))
        .collect();

        let running = Cue::new(["бег"], ["🏃"]);
        let swimming = Cue::new(["плаван", "море"], ["🏊", "🛟"]);
        let cycling = Cue::new(["вело"], ["🚴"]);

        let rules = vec![
            KindRule::new(WorkoutKind::Combined, vec![running, swimming.clone()]),
            KindRule::new(WorkoutKind::Swimming, vec![swimming]),
            KindRule::new(WorkoutKind::Cycling, vec![cycling]),
            KindRule::fallback(WorkoutKind::Running),
        ];

        let labels = [
            (WorkoutKind::Running, "Бег"),
            (WorkoutKind::Swimming, "Плавание"),
            (WorkoutKind::Cycling, "Велосипед"),
            (WorkoutKind::Combined, "Бег+Плавание"),
        ]
        .into_iter()
        .map(|(kind, label)| (kind, label.to_string()))
        .collect();

        Self::new(weekdays, rules, labels, DEFAULT_LOCATION)
            .expect("built-in vocabulary is valid")
    }

    #[must_use]
    pub fn weekdays(&self) -> &[WeekdayInfo] {
        &self.weekdays
    }

    /// The weekday whose token occurs leftmost in an already lowercased line.
    #[must_use]
    pub fn find_weekday(&self, lowered: &str) -> Option<&WeekdayInfo> {
        self.weekdays
            .iter()
            .filter_map(|day| lowered.find(day.token()).map(|position| (position, day)))
            .min_by_key(|(position, _)| *position)
            .map(|(_, day)| day)
    }

    /// Removes every weekday token regardless of case.
    #[must_use]
    pub fn strip_weekdays(&self, text: &str) -> String {
        self.weekday_pattern.replace_all(text, "").into_owned()
    }

    /// First rule that matches wins, lines matching none count as running.
    #[must_use]
    pub fn classify(&self, raw: &str) -> WorkoutKind {
        let lowered = raw.to_lowercase();

        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered, raw))
            .map_or(WorkoutKind::Running, |rule| rule.kind)
    }

    #[must_use]
    pub fn label(&self, kind: WorkoutKind) -> &str {
        // presence of every kind is checked in `new`
        self.labels.get(&kind).map_or("", String::as_str)
    }

    #[must_use]
    pub fn location_placeholder(&self) -> &str {
        &self.location_placeholder
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::russian()
    }
}
