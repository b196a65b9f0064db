use crate::error::StoreError;
use crate::habit::{CheckEvent, Habit, HabitId, Periodicity};
use crate::streak::CheckInOutcome;

/// Persistence boundary for habits and their check-in log.
///
/// Implementations assume a single writer. `apply_check_in` is the only
/// operation that must be atomic: the habit fields and the appended
/// `CheckEvent` are written together or not at all.
pub trait HabitStore {
    /// Insert a never-checked habit and return its new id.
    fn create(&self, name: &str, periodicity: Periodicity) -> Result<HabitId, StoreError>;

    fn get(&self, id: HabitId) -> Result<Habit, StoreError>;

    /// All habits, ordered by id.
    fn list(&self) -> Result<Vec<Habit>, StoreError>;

    /// Habits with the given periodicity, ordered by id.
    fn list_by_periodicity(&self, periodicity: Periodicity) -> Result<Vec<Habit>, StoreError>;

    /// Remove a habit. Its check events stay in the log.
    fn delete(&self, id: HabitId) -> Result<(), StoreError>;

    /// Persist an engine outcome and append one check event.
    ///
    /// Unapplied outcomes write nothing.
    fn apply_check_in(&self, id: HabitId, outcome: &CheckInOutcome) -> Result<(), StoreError>;

    /// Check events recorded for `id`, oldest first.
    fn check_events(&self, id: HabitId) -> Result<Vec<CheckEvent>, StoreError>;
}
