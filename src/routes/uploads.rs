//! Upload route — multipart file intake.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Json;

use crate::routes::auth::AuthUser;
use crate::services::upload::{self, StoredFile, UploadError};
use crate::state::AppState;

pub(crate) fn upload_error_to_status(err: &UploadError) -> StatusCode {
    match err {
        UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        UploadError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        UploadError::Fetch(_) => StatusCode::BAD_GATEWAY,
        UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `POST /api/uploads` — store the first file field of a multipart body.
pub async fn upload_file(
    State(state): State<AppState>,
    _auth: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<StoredFile>), StatusCode> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let bytes = field.bytes().await.map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;

        let stored = upload::save_bytes(&state.uploads_dir, &file_name, &bytes)
            .await
            .map_err(|e| upload_error_to_status(&e))?;
        return Ok((StatusCode::CREATED, Json(stored)));
    }

    Err(StatusCode::BAD_REQUEST)
}
