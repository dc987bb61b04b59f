use chrono::Duration;
use url::Url;

use crate::structs::COMPACT_FORMAT;
use crate::{Error, WorkoutEvent};

const GOOGLE_CALENDAR: &str = "https://calendar.google.com/calendar/render";

/// Link that opens Google Calendar's "new event" form prefilled with the
/// workout.
pub fn google_calendar_link(event: &WorkoutEvent, duration: Duration) -> Result<Url, Error> {
    let dates = format!(
        "{}/{}",
        event.start().format(COMPACT_FORMAT),
        event.end(duration).format(COMPACT_FORMAT)
    );

    let summary = event.summary();
    let details = event.details();

    let url = Url::parse_with_params(
        GOOGLE_CALENDAR,
        &[
            ("action", "TEMPLATE"),
            ("text", summary.as_str()),
            ("dates", dates.as_str()),
            ("details", details.as_str()),
            ("location", event.location()),
        ],
    )?;

    Ok(url)
}
