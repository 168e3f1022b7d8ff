use crate::models::GalleryItem;
use crate::storage::EntryStore;
use tracing::error;

pub const NO_NOTE: &str = "No note";
pub const UNREADABLE_NOTE: &str = "This entry could not be read. Delete it to upload again.";

/// Every entry, newest date first. An unreadable value is listed with an empty
/// photo so it can still be deleted.
pub fn build_gallery(store: &EntryStore) -> Vec<GalleryItem> {
    let mut items: Vec<GalleryItem> = store
        .keys()
        .into_iter()
        .filter_map(|date| match store.get(&date) {
            Ok(Some(entry)) => Some(GalleryItem {
                note: display_note(&entry.note).to_string(),
                photo: entry.photo,
                date,
            }),
            Ok(None) => None,
            Err(err) => {
                error!("gallery entry for {date} is unreadable: {err}");
                Some(GalleryItem {
                    photo: String::new(),
                    note: UNREADABLE_NOTE.to_string(),
                    date,
                })
            }
        })
        .collect();

    // YYYY-MM-DD sorts lexically in date order.
    items.sort_by(|a, b| b.date.cmp(&a.date));
    items
}

pub fn display_note(note: &str) -> &str {
    if note.is_empty() { NO_NOTE } else { note }
}
