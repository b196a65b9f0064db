//! In-memory `HabitStore`.

use std::cell::RefCell;
use std::collections::BTreeMap;

use chrono::Utc;

use super::store::HabitStore;
use crate::error::StoreError;
use crate::habit::{CheckEvent, Habit, HabitId, Periodicity};
use crate::streak::CheckInOutcome;

#[derive(Debug, Default)]
struct Inner {
    next_habit_id: i64,
    next_event_id: i64,
    habits: BTreeMap<HabitId, Habit>,
    events: Vec<CheckEvent>,
}

/// Volatile store with the same semantics as `HabitDb`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RefCell<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HabitStore for MemoryStore {
    fn create(&self, name: &str, periodicity: Periodicity) -> Result<HabitId, StoreError> {
        let mut inner = self.inner.borrow_mut();
        inner.next_habit_id += 1;
        let id = HabitId(inner.next_habit_id);
        inner
            .habits
            .insert(id, Habit::new(id, name.to_string(), periodicity, Utc::now()));
        Ok(id)
    }

    fn get(&self, id: HabitId) -> Result<Habit, StoreError> {
        self.inner
            .borrow()
            .habits
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn list(&self) -> Result<Vec<Habit>, StoreError> {
        Ok(self.inner.borrow().habits.values().cloned().collect())
    }

    fn list_by_periodicity(&self, periodicity: Periodicity) -> Result<Vec<Habit>, StoreError> {
        Ok(self
            .inner
            .borrow()
            .habits
            .values()
            .filter(|habit| habit.periodicity == periodicity)
            .cloned()
            .collect())
    }

    fn delete(&self, id: HabitId) -> Result<(), StoreError> {
        self.inner
            .borrow_mut()
            .habits
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    fn apply_check_in(&self, id: HabitId, outcome: &CheckInOutcome) -> Result<(), StoreError> {
        if !outcome.applied {
            return Ok(());
        }
        let date = outcome
            .last_checked
            .ok_or(StoreError::MissingCheckInDate(id))?;

        let mut inner = self.inner.borrow_mut();
        let habit = inner.habits.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        habit.streak = outcome.streak;
        habit.longest_streak = outcome.longest_streak;
        habit.last_checked = Some(date);

        inner.next_event_id += 1;
        let event_id = inner.next_event_id;
        inner.events.push(CheckEvent {
            id: event_id,
            habit_id: id,
            date,
        });
        Ok(())
    }

    fn check_events(&self, id: HabitId) -> Result<Vec<CheckEvent>, StoreError> {
        Ok(self
            .inner
            .borrow()
            .events
            .iter()
            .filter(|event| event.habit_id == id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streak::StreakState;
    use chrono::NaiveDate;

    #[test]
    fn ids_are_assigned_in_order() {
        let store = MemoryStore::new();
        let a = store.create("A", Periodicity::Daily).unwrap();
        let b = store.create("B", Periodicity::Weekly).unwrap();
        assert!(a < b);
        let names: Vec<_> = store.list().unwrap().into_iter().map(|h| h.name).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn check_in_and_delete_mirror_sqlite_semantics() {
        let store = MemoryStore::new();
        let id = store.create("Read", Periodicity::Daily).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let outcome = StreakState::initial().check_in(Periodicity::Daily, today);

        store.apply_check_in(id, &outcome).unwrap();
        assert_eq!(store.get(id).unwrap().streak, 1);

        store.delete(id).unwrap();
        assert!(matches!(store.get(id), Err(StoreError::NotFound(_))));
        assert_eq!(store.check_events(id).unwrap().len(), 1);
        assert!(matches!(
            store.apply_check_in(id, &outcome),
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(store.check_events(id).unwrap().len(), 1);
    }
}
