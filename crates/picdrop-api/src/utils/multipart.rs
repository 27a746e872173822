//! Multipart intake: find the single `image` file part and stream it into staging.

use axum::extract::Multipart;
use futures::TryStreamExt;
use picdrop_core::AppError;
use picdrop_storage::{IncomingFile, StagedUpload, UploadStore};
use tokio_util::io::StreamReader;

use crate::constants::IMAGE_FIELD;
use crate::error::{multipart_error, HttpAppError};
use crate::validation::UploadValidator;

/// Drain the multipart body and stage its `image` file part.
///
/// Fields with other names, and `image` fields without a filename (plain text values, or the
/// empty `filename=""` a browser sends when no file was chosen), are skipped. A second
/// `image` file part fails the request; the first part is discarded when its staged upload
/// is dropped.
pub async fn receive_image_part(
    multipart: &mut Multipart,
    storage: &dyn UploadStore,
    validator: &UploadValidator,
    max_bytes: u64,
) -> Result<StagedUpload, HttpAppError> {
    let mut staged: Option<StagedUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            tracing::debug!(field = ?field.name(), "Skipping non-image multipart field");
            continue;
        }

        let Some(original_filename) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
        else {
            tracing::debug!("Skipping image field without a filename");
            continue;
        };

        if staged.is_some() {
            return Err(AppError::MultipleFileParts.into());
        }

        let incoming = IncomingFile::new(
            original_filename,
            field.content_type().map(str::to_string),
        );
        validator.validate_declared(&incoming)?;

        let reader = StreamReader::new(field.map_err(std::io::Error::other));
        tokio::pin!(reader);

        staged = Some(storage.stage(incoming, &mut reader, max_bytes).await?);
    }

    staged.ok_or_else(|| AppError::MissingFilePart.into())
}
