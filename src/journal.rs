use crate::clock::{Clock, date_key};
use crate::gallery::build_gallery;
use crate::gate::{UploadSlot, is_open, is_open_on};
use crate::models::{GalleryItem, JournalEntry};
use crate::photo::{ProcessError, ResizeConfig, process_photo};
use crate::storage::{EntryStore, StorageError, is_date_key};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("Please select a photo!")]
    MissingPhoto,
    #[error("You already uploaded today!")]
    AlreadyUploaded { date: String },
    #[error("An upload is already in progress.")]
    UploadInProgress,
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error(transparent)]
    Photo(#[from] ProcessError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("background worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub removed: bool,
    /// The deleted date was today, so a new upload is possible again.
    pub reopened_today: bool,
}

/// Owns the entry store and sequences uploads and deletes against the daily gate.
pub struct Journal {
    pub(crate) store: Arc<Mutex<EntryStore>>,
    clock: Arc<dyn Clock>,
    resize: ResizeConfig,
    uploads: UploadSlot,
}

impl Journal {
    pub fn new(store: EntryStore, clock: Arc<dyn Clock>, resize: ResizeConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            clock,
            resize,
            uploads: UploadSlot::new(),
        }
    }

    pub fn today(&self) -> String {
        date_key(self.clock.today())
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub async fn is_open(&self) -> bool {
        let store = self.store.lock().await;
        is_open(&store, self.clock.as_ref())
    }

    /// Stores today's entry. Rejected without touching the store when today
    /// already has one, when no photo was supplied, or while another upload is
    /// still being processed.
    pub async fn upload(
        &self,
        photo: Option<Vec<u8>>,
        note: String,
    ) -> Result<(String, JournalEntry), JournalError> {
        let date = self.today();
        if !self.is_open().await {
            warn!("upload rejected, {date} already has an entry");
            return Err(JournalError::AlreadyUploaded { date });
        }

        let bytes = match photo {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => return Err(JournalError::MissingPhoto),
        };

        let Some(_permit) = self.uploads.try_acquire() else {
            warn!("upload rejected, another upload is in flight");
            return Err(JournalError::UploadInProgress);
        };

        let resize = self.resize;
        let processed = tokio::task::spawn_blocking(move || process_photo(&bytes, &resize))
            .await
            .map_err(|err| JournalError::Worker(err.to_string()))?
            .inspect_err(|err| warn!("photo for {date} rejected: {err}"))?;

        let entry = JournalEntry {
            photo: processed.data_uri,
            note,
        };

        let key = date.clone();
        let entry = self
            .write(move |store| {
                if !is_open_on(store, &key) {
                    return Err(JournalError::AlreadyUploaded { date: key });
                }
                store
                    .put(&key, &entry)
                    .inspect_err(|err| error!("failed to store entry for {key}: {err}"))?;
                Ok(entry)
            })
            .await?;
        info!(
            "stored entry for {date} ({}x{}, {} bytes)",
            processed.width,
            processed.height,
            entry.photo.len()
        );

        Ok((date, entry))
    }

    pub async fn get(&self, date: &str) -> Result<Option<JournalEntry>, JournalError> {
        validate_date(date)?;
        let store = self.store.lock().await;
        Ok(store.get(date)?)
    }

    pub async fn gallery(&self) -> Vec<GalleryItem> {
        let store = self.store.lock().await;
        build_gallery(&store)
    }

    pub async fn delete(&self, date: &str) -> Result<DeleteOutcome, JournalError> {
        validate_date(date)?;
        let key = date.to_string();
        let removed = self
            .write(move |store| {
                store
                    .delete(&key)
                    .inspect_err(|err| error!("failed to delete entry for {key}: {err}"))
                    .map_err(JournalError::from)
            })
            .await?;
        if removed {
            info!("deleted entry for {date}");
        }
        Ok(DeleteOutcome {
            removed,
            reopened_today: removed && date == self.today(),
        })
    }

    /// Runs a store mutation on the blocking pool. A file-backed store rewrites
    /// its whole file on every write.
    async fn write<T, F>(&self, op: F) -> Result<T, JournalError>
    where
        T: Send + 'static,
        F: FnOnce(&mut EntryStore) -> Result<T, JournalError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(&mut store.blocking_lock()))
            .await
            .map_err(|err| JournalError::Worker(err.to_string()))?
    }
}

fn validate_date(date: &str) -> Result<(), JournalError> {
    if is_date_key(date) {
        Ok(())
    } else {
        Err(JournalError::InvalidDate(date.to_string()))
    }
}
