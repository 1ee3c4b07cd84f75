use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tracing::warn;

use linkvault_core::{CreateDrop, DropSnapshot, NewContent};

use super::AppState;
use super::schemas::{DeleteRequest, DeleteResponse, RetrieveQuery, UploadResponse};
use crate::error::ServerError;

const DEFAULT_FILE_NAME: &str = "upload";
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A file part read from an upload form.
struct UploadedFile {
    name: String,
    mime_type: String,
    data: Bytes,
}

/// The fields of `POST /api/upload`, as sent by the browser form.
///
/// Every value arrives as a string; conversion to typed values happens in
/// [`UploadForm::parse`].
#[derive(Default)]
struct UploadForm {
    kind: Option<String>,
    text_content: Option<String>,
    expires_in_minutes: Option<String>,
    password: Option<String>,
    one_time_view: Option<String>,
    max_downloads: Option<String>,
    file: Option<UploadedFile>,
}

impl UploadForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, ServerError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == "file" {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or(DEFAULT_FILE_NAME)
                    .to_owned();
                let mime_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_MIME_TYPE)
                    .to_owned();
                let data = field.bytes().await?;
                form.file = Some(UploadedFile {
                    name: file_name,
                    mime_type,
                    data,
                });
                continue;
            }

            let value = field.text().await?;
            match name.as_str() {
                "type" => form.kind = Some(value),
                "textContent" => form.text_content = Some(value),
                "expiresInMinutes" => form.expires_in_minutes = Some(value),
                "password" => form.password = Some(value),
                "oneTimeView" => form.one_time_view = Some(value),
                "maxDownloads" => form.max_downloads = Some(value),
                _ => {}
            }
        }

        Ok(form)
    }

    /// Convert the transport-level strings into typed values.
    fn parse(self) -> Result<ParsedUpload, ServerError> {
        let ttl_minutes =
            parse_optional_number(self.expires_in_minutes.as_deref(), "expiresInMinutes")?;
        let max_downloads = parse_optional_number(self.max_downloads.as_deref(), "maxDownloads")?;
        let one_time_view = self
            .one_time_view
            .as_deref()
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));

        let payload = match self.kind.as_deref().map(str::trim) {
            Some("text") => Payload::Text(self.text_content.unwrap_or_default()),
            Some("file") => Payload::File(
                self.file
                    .ok_or_else(|| ServerError::BadRequest("no file uploaded".into()))?,
            ),
            _ => {
                return Err(ServerError::BadRequest(
                    "type must be \"text\" or \"file\"".into(),
                ));
            }
        };

        Ok(ParsedUpload {
            payload,
            ttl_minutes,
            password: self.password.filter(|p| !p.is_empty()),
            one_time_view,
            max_downloads,
        })
    }
}

enum Payload {
    Text(String),
    File(UploadedFile),
}

/// An upload form with every field converted to its typed value.
struct ParsedUpload {
    payload: Payload,
    ttl_minutes: Option<u32>,
    password: Option<String>,
    one_time_view: bool,
    max_downloads: Option<u32>,
}

fn parse_optional_number(value: Option<&str>, field: &str) -> Result<Option<u32>, ServerError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<u32>()
            .map(Some)
            .map_err(|_| ServerError::BadRequest(format!("{field} must be a non-negative integer"))),
    }
}

/// `POST /api/upload` -- create a text or file drop from a multipart form.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ServerError> {
    let ParsedUpload {
        payload,
        ttl_minutes,
        password,
        one_time_view,
        max_downloads,
    } = UploadForm::read(&mut multipart).await?.parse()?;

    let (content, blob_id) = match payload {
        Payload::Text(text) => (NewContent::Text(text), None),
        Payload::File(file) => {
            let file_ref = state
                .engine
                .blobs()
                .put(&file.name, &file.mime_type, file.data)
                .await
                .map_err(|e| ServerError::Engine(e.into()))?;
            let blob_id = file_ref.blob_id.clone();
            (NewContent::File(file_ref), Some(blob_id))
        }
    };

    let request = CreateDrop {
        content,
        ttl_minutes,
        password,
        one_time_view,
        max_downloads,
    };
    let created = match state.engine.create(request).await {
        Ok(created) => created,
        Err(e) => {
            if let Some(ref blob_id) = blob_id
                && let Err(release_err) = state.engine.blobs().release(blob_id).await
            {
                warn!(%blob_id, error = %release_err, "failed to release blob of rejected upload");
            }
            return Err(e.into());
        }
    };

    let body = UploadResponse {
        success: true,
        link: format!("{}/{}", state.public_url, created.id),
        id: created.id,
        delete_token: created.delete_token,
        expires_at: created.expires_at,
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// `GET /api/{id}` -- retrieve a drop, counting one view.
pub async fn get_drop(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RetrieveQuery>,
) -> Result<Json<DropSnapshot>, ServerError> {
    let snapshot = state
        .engine
        .retrieve(&id, query.password.as_deref())
        .await?;
    Ok(Json(snapshot))
}

/// `GET /api/{id}/download` -- retrieve a file drop's content, counting one
/// view.
pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RetrieveQuery>,
) -> Result<Response, ServerError> {
    let (snapshot, data) = state
        .engine
        .download(&id, query.password.as_deref())
        .await?;

    let (mime_type, file_name) = match snapshot.content.file_ref() {
        Some(file) => (file.mime_type.as_str(), file.original_name.as_str()),
        None => (DEFAULT_MIME_TYPE, DEFAULT_FILE_NAME),
    };
    let content_type = HeaderValue::from_str(mime_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_MIME_TYPE));
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        sanitize_file_name(file_name)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

/// `POST /api/delete` -- delete a drop with its delete token.
pub async fn delete_drop(
    State(state): State<AppState>,
    Json(body): Json<DeleteRequest>,
) -> Result<Json<DeleteResponse>, ServerError> {
    state
        .engine
        .delete(&body.short_id, &body.delete_token)
        .await?;
    Ok(Json(DeleteResponse {
        success: true,
        message: "Drop deleted successfully".into(),
    }))
}

/// Reduce a file name to printable ASCII safe inside a quoted header value.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim().is_empty() {
        DEFAULT_FILE_NAME.to_owned()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
        assert_eq!(sanitize_file_name("my \"quoted\".txt"), "my _quoted_.txt");
        assert_eq!(sanitize_file_name("naïve\r\n.txt"), "na_ve__.txt");
        assert_eq!(sanitize_file_name(""), "upload");
    }

    fn text_form() -> UploadForm {
        UploadForm {
            kind: Some("text".into()),
            text_content: Some("x".into()),
            ..UploadForm::default()
        }
    }

    #[test]
    fn one_time_view_only_accepts_true() {
        for (raw, expected) in [("true", true), ("TRUE", true), ("false", false), ("1", false)] {
            let form = UploadForm {
                one_time_view: Some(raw.into()),
                ..text_form()
            };
            let parsed = form.parse().unwrap();
            assert_eq!(parsed.one_time_view, expected, "for {raw:?}");
        }
        assert!(!text_form().parse().unwrap().one_time_view);
    }

    #[test]
    fn numbers_are_parsed_at_the_boundary() {
        let form = UploadForm {
            expires_in_minutes: Some(" 60 ".into()),
            max_downloads: Some(String::new()),
            ..text_form()
        };
        let parsed = form.parse().unwrap();
        assert_eq!(parsed.ttl_minutes, Some(60));
        assert_eq!(parsed.max_downloads, None);

        let form = UploadForm {
            max_downloads: Some("-1".into()),
            ..text_form()
        };
        assert!(matches!(form.parse(), Err(ServerError::BadRequest(_))));
    }

    #[test]
    fn empty_password_is_dropped() {
        let form = UploadForm {
            password: Some(String::new()),
            ..text_form()
        };
        assert!(form.parse().unwrap().password.is_none());
    }

    #[test]
    fn file_kind_requires_a_file() {
        let form = UploadForm {
            kind: Some("file".into()),
            ..UploadForm::default()
        };
        assert!(matches!(form.parse(), Err(ServerError::BadRequest(_))));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let form = UploadForm {
            kind: Some("image".into()),
            ..text_form()
        };
        assert!(matches!(form.parse(), Err(ServerError::BadRequest(_))));
    }
}
