use crate::WorkoutEvent;

/// Picking which parsed workouts get exported.
pub trait Selection {
    /// Flips one event. Returns `false` when `index` is out of range.
    fn toggle(&mut self, index: usize) -> bool;

    /// Deselects everything when all events are selected, otherwise selects
    /// everything.
    fn toggle_all(&mut self);

    fn deselect_all(&mut self);

    fn selected(&self) -> Vec<&WorkoutEvent>;
}

impl Selection for [WorkoutEvent] {
    fn toggle(&mut self, index: usize) -> bool {
        match self.get_mut(index) {
            Some(event) => {
                event.selected = !event.selected;
                true
            }
            None => false,
        }
    }

    fn toggle_all(&mut self) {
        let select = !self.iter().all(|event| event.selected);
        for event in self.iter_mut() {
            event.selected = select;
        }
    }

    fn deselect_all(&mut self) {
        for event in self.iter_mut() {
            event.selected = false;
        }
    }

    fn selected(&self) -> Vec<&WorkoutEvent> {
        self.iter().filter(|event| event.selected).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{FixedClock, ParserConfig, ScheduleParser, Vocabulary};

    fn events() -> Vec<WorkoutEvent> {
        let now = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        ScheduleParser::new(Vocabulary::russian(), FixedClock::at(now), ParserConfig::default())
            .parse("Вторник 7:00\nСреда 7:00\nЧетверг 7:00")
    }

    #[test]
    fn everything_starts_selected() {
        assert_eq!(events().selected().len(), 3);
    }

    #[test]
    fn toggle_one() {
        let mut events = events();

        assert!(events.toggle(1));
        assert!(!events[1].selected);
        assert_eq!(events.selected().len(), 2);

        assert!(events.toggle(1));
        assert!(events[1].selected);

        assert!(!events.toggle(3));
    }

    #[test]
    fn toggle_all_flips_between_all_and_none() {
        let mut events = events();

        events.toggle_all();
        assert!(events.selected().is_empty());

        events.toggle_all();
        assert_eq!(events.selected().len(), 3);

        events.toggle(0);
        events.toggle_all();
        assert_eq!(events.selected().len(), 3);
    }

    #[test]
    fn deselect_all() {
        let mut events = events();
        events.deselect_all();
        assert!(events.selected().is_empty());
    }
}
