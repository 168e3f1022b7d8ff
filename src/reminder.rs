use crate::clock::Clock;
use crate::journal::Journal;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{error, info, warn};

pub const REMINDER_TITLE: &str = "Gratitude Reminder";
pub const REMINDER_BODY: &str = "Hey! Upload your daily positive photo before the day ends.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Not decided yet. Asking again later is allowed.
    Default,
    Granted,
    Denied,
}

#[derive(Debug, Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

pub trait Notifier: Send + Sync {
    fn request_permission(&self) -> Permission;
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Raises reminders as log events. Permission comes from configuration and
/// is granted when nothing was configured.
#[derive(Debug, Default)]
pub struct LogNotifier {
    permission: Option<Permission>,
}

impl LogNotifier {
    pub fn new(permission: Option<Permission>) -> Self {
        Self { permission }
    }
}

impl Notifier for LogNotifier {
    fn request_permission(&self) -> Permission {
        self.permission.unwrap_or(Permission::Granted)
    }

    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        info!(target: "reminder", "{title}: {body}");
        Ok(())
    }
}

/// Keeps every notification it was asked to raise.
#[derive(Debug)]
pub struct RecordingNotifier {
    permission: Permission,
    fail: bool,
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new(permission: Permission) -> Self {
        Self {
            permission,
            fail: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(permission: Permission) -> Self {
        Self {
            fail: true,
            ..Self::new(permission)
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn request_permission(&self) -> Permission {
        self.permission
    }

    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError("notifications unavailable".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderState {
    /// Permission has not been decided.
    Armed,
    /// Permission was granted or denied.
    Active(Permission),
}

/// Hourly check that nags once per tick after `reminder_hour` while today is
/// still open. Never writes to the journal.
pub struct ReminderScheduler {
    journal: Arc<Journal>,
    notifier: Arc<dyn Notifier>,
    reminder_hour: u32,
    state: ReminderState,
}

impl ReminderScheduler {
    pub fn new(journal: Arc<Journal>, notifier: Arc<dyn Notifier>, reminder_hour: u32) -> Self {
        Self {
            journal,
            notifier,
            reminder_hour,
            state: ReminderState::Armed,
        }
    }

    pub fn state(&self) -> ReminderState {
        self.state
    }

    pub fn arm(&mut self) {
        if self.state != ReminderState::Armed {
            return;
        }
        match self.notifier.request_permission() {
            Permission::Default => {}
            Permission::Denied => {
                warn!("notification permission denied, reminders disabled");
                self.state = ReminderState::Active(Permission::Denied);
            }
            Permission::Granted => self.state = ReminderState::Active(Permission::Granted),
        }
    }

    /// Returns whether a notification was raised.
    pub async fn tick(&mut self) -> bool {
        self.arm();
        if self.state != ReminderState::Active(Permission::Granted) {
            return false;
        }
        if self.journal.clock().hour() < self.reminder_hour {
            return false;
        }
        if !self.journal.is_open().await {
            return false;
        }

        match self.notifier.notify(REMINDER_TITLE, REMINDER_BODY) {
            Ok(()) => {
                info!("reminder raised for {}", self.journal.today());
                true
            }
            Err(err) => {
                error!("{err}");
                false
            }
        }
    }

    /// Ticks every `every`, first one after a full period, until `shutdown`
    /// flips to true or its sender goes away.
    pub async fn run(mut self, every: Duration, mut shutdown: watch::Receiver<bool>) {
        self.arm();
        let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("reminder scheduler shutting down");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::JournalEntry;
    use crate::photo::ResizeConfig;
    use crate::storage::EntryStore;
    use chrono::NaiveDate;

    fn setup(
        permission: Permission,
    ) -> (ReminderScheduler, Arc<FixedClock>, Arc<RecordingNotifier>, Arc<Journal>) {
        let clock = Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        let journal = Arc::new(Journal::new(
            EntryStore::in_memory(),
            clock.clone(),
            ResizeConfig::default(),
        ));
        let notifier = Arc::new(RecordingNotifier::new(permission));
        let scheduler = ReminderScheduler::new(journal.clone(), notifier.clone(), 20);
        (scheduler, clock, notifier, journal)
    }

    #[tokio::test]
    async fn notifies_after_eight_when_open() {
        let (mut scheduler, clock, notifier, _journal) = setup(Permission::Granted);
        clock.set_hour(21);
        assert!(scheduler.tick().await);
        assert_eq!(
            notifier.sent(),
            vec![(REMINDER_TITLE.to_string(), REMINDER_BODY.to_string())]
        );

        clock.set_hour(19);
        assert!(!scheduler.tick().await);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn one_notification_per_tick_through_the_evening() {
        let (mut scheduler, clock, notifier, _journal) = setup(Permission::Granted);
        for hour in 20..24 {
            clock.set_hour(hour);
            assert!(scheduler.tick().await);
        }
        assert_eq!(notifier.sent().len(), 4);
    }

    #[tokio::test]
    async fn silent_once_today_has_an_entry() {
        let (mut scheduler, clock, notifier, journal) = setup(Permission::Granted);
        clock.set_hour(22);
        {
            let mut store = journal.store.lock().await;
            store
                .put(
                    "2024-01-01",
                    &JournalEntry {
                        photo: "p".to_string(),
                        note: String::new(),
                    },
                )
                .unwrap();
        }
        assert!(!scheduler.tick().await);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn permission_gates_notifications() {
        let (mut denied, clock, notifier, _journal) = setup(Permission::Denied);
        clock.set_hour(21);
        assert!(!denied.tick().await);
        assert_eq!(denied.state(), ReminderState::Active(Permission::Denied));
        assert!(notifier.sent().is_empty());

        let (mut undecided, clock, notifier, _journal) = setup(Permission::Default);
        clock.set_hour(21);
        assert!(!undecided.tick().await);
        assert_eq!(undecided.state(), ReminderState::Armed);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn failing_notifier_is_not_fatal() {
        let clock = Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        clock.set_hour(21);
        let journal = Arc::new(Journal::new(
            EntryStore::in_memory(),
            clock,
            ResizeConfig::default(),
        ));
        let notifier = Arc::new(RecordingNotifier::failing(Permission::Granted));
        let mut scheduler = ReminderScheduler::new(journal.clone(), notifier, 20);
        assert!(!scheduler.tick().await);
        assert!(journal.is_open().await);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let (scheduler, _clock, _notifier, _journal) = setup(Permission::Granted);
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(scheduler.run(Duration::from_secs(3600), rx));
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
