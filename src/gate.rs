use crate::clock::{Clock, date_key};
use crate::storage::EntryStore;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Today is open while it has no entry. The date is read from the clock on
/// every call.
pub fn is_open(store: &EntryStore, clock: &dyn Clock) -> bool {
    is_open_on(store, &date_key(clock.today()))
}

pub fn is_open_on(store: &EntryStore, date: &str) -> bool {
    !store.contains(date)
}

/// At most one upload may be between its gate check and its store write.
#[derive(Debug, Clone, Default)]
pub struct UploadSlot {
    busy: Arc<AtomicBool>,
}

impl UploadSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<UploadPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| UploadPermit {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn in_progress(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Frees the slot when dropped, whether the upload succeeded or not.
#[derive(Debug)]
pub struct UploadPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for UploadPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::JournalEntry;
    use chrono::NaiveDate;

    fn entry() -> JournalEntry {
        JournalEntry {
            photo: "p".to_string(),
            note: String::new(),
        }
    }

    #[test]
    fn open_until_today_has_an_entry() {
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let mut store = EntryStore::in_memory();
        assert!(is_open(&store, &clock));

        store.put("2024-01-01", &entry()).unwrap();
        assert!(!is_open(&store, &clock));

        store.delete("2024-01-01").unwrap();
        assert!(is_open(&store, &clock));
    }

    #[test]
    fn reopens_when_the_day_rolls_over() {
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let mut store = EntryStore::in_memory();
        store.put("2024-01-01", &entry()).unwrap();
        assert!(!is_open(&store, &clock));

        clock.set_date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert!(is_open(&store, &clock));
    }

    #[test]
    fn slot_admits_one_holder_at_a_time() {
        let slot = UploadSlot::new();
        let permit = slot.try_acquire().expect("first acquire");
        assert!(slot.in_progress());
        assert!(slot.try_acquire().is_none());

        drop(permit);
        assert!(!slot.in_progress());
        assert!(slot.try_acquire().is_some());
    }
}
