use crate::errors::AppError;
use crate::models::{DeleteResponse, GalleryItem, JournalEntry, TodayResponse, UploadResponse};
use crate::photo::decode_data_uri;
use crate::state::AppState;
use crate::ui::{render_index, status_message};
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::header,
    response::{Html, IntoResponse},
};
use tracing::info;

pub const UPLOADED_MESSAGE: &str = "Uploaded! Great job.";

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let journal = &state.journal;
    let date = journal.today();
    let uploaded = !journal.is_open().await;
    let gallery = journal.gallery().await;
    Html(render_index(&date, uploaded, &gallery))
}

pub async fn get_today(State(state): State<AppState>) -> Json<TodayResponse> {
    let uploaded = !state.journal.is_open().await;
    Json(TodayResponse {
        date: state.journal.today(),
        uploaded,
        message: status_message(uploaded).to_string(),
    })
}

/// Multipart fields: `photo` (file) and optional `note`.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut photo = None;
    let mut note = String::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" => photo = Some(field.bytes().await?.to_vec()),
            "note" => note = field.text().await?,
            _ => {}
        }
    }

    let (date, entry) = state.journal.upload(photo, note).await?;
    Ok(Json(UploadResponse {
        date,
        message: UPLOADED_MESSAGE.to_string(),
        entry,
    }))
}

pub async fn list_entries(State(state): State<AppState>) -> Json<Vec<GalleryItem>> {
    Json(state.journal.gallery().await)
}

pub async fn get_entry(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<JournalEntry>, AppError> {
    state
        .journal
        .get(&date)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("no entry for {date}")))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let outcome = state.journal.delete(&date).await?;
    let message = if outcome.reopened_today {
        status_message(false).to_string()
    } else if outcome.removed {
        format!("Deleted photo from {date}.")
    } else {
        info!("delete for {date} found nothing");
        format!("Nothing stored for {date}.")
    };

    Ok(Json(DeleteResponse {
        date,
        removed: outcome.removed,
        reopened_today: outcome.reopened_today,
        message,
    }))
}

pub async fn get_photo(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state
        .journal
        .get(&date)
        .await?
        .ok_or_else(|| AppError::not_found(format!("no entry for {date}")))?;
    let bytes = decode_data_uri(&entry.photo).map_err(AppError::internal)?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes))
}
