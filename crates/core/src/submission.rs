//! Submission input classification and normalization.
//!
//! A submission arrives in exactly one of three shapes: an uploaded file,
//! a URL, or a caller-supplied content identifier with an explicit job type.
//! [`classify`] enforces the exclusivity and [`ContentSource::into_job_spec`]
//! derives the content descriptor, job type and parameters of the new job.

use serde_json::json;

use crate::error::CoreError;
use crate::job::JobType;
use crate::types::Timestamp;

/// Content types accepted for uploaded video.
pub const ALLOWED_VIDEO_CONTENT_TYPES: &[&str] = &[
    "video/mp4",
    "video/quicktime",
    "video/x-msvideo",
    "video/webm",
];

/// File extensions accepted when the upload carries no usable content type.
pub const ALLOWED_VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "webm"];

/// Prefix of synthesized content descriptors for URL submissions.
pub const URL_CONTENT_PREFIX: &str = "url-";

/// Maximum accepted URL length.
pub const MAX_URL_LENGTH: usize = 2_048;

/// Maximum accepted caller-supplied content identifier length.
pub const MAX_CONTENT_ID_LENGTH: usize = 512;

/// Maximum length kept from the original filename in a storage key.
const MAX_STORED_NAME_LENGTH: usize = 100;

/// Error message when no input shape is present.
pub const NO_INPUT_MESSAGE: &str = "no file, URL, or content descriptor provided";

/// Metadata of an uploaded file that has been received but not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// System-generated unique key, see [`generate_storage_key`].
    pub storage_key: String,
    /// Filename as sent by the client.
    pub original_name: String,
    pub content_type: Option<String>,
    pub size_bytes: u64,
    /// Where the file will live once written.
    pub file_path: String,
}

/// Raw request fields before shape classification. Blank strings count as
/// absent.
#[derive(Debug, Clone, Default)]
pub struct SubmissionInput {
    pub upload: Option<UploadedFile>,
    pub url: Option<String>,
    pub content_id: Option<String>,
    pub job_type: Option<String>,
    pub params: Option<serde_json::Value>,
}

/// The one input shape a submission resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentSource {
    Upload(UploadedFile),
    Url(String),
    Direct {
        content_id: String,
        job_type: JobType,
        params: serde_json::Value,
    },
}

/// Everything needed to insert a job row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJobSpec {
    pub content_id: String,
    pub job_type: JobType,
    pub params: serde_json::Value,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Resolve the request to exactly one [`ContentSource`].
pub fn classify(input: SubmissionInput) -> Result<ContentSource, CoreError> {
    let url = non_blank(input.url);
    let content_id = non_blank(input.content_id);
    let job_type = non_blank(input.job_type)
        .map(|t| JobType::parse(&t))
        .transpose()?;

    let present = usize::from(input.upload.is_some())
        + usize::from(url.is_some())
        + usize::from(content_id.is_some());

    match present {
        0 => return Err(CoreError::Validation(NO_INPUT_MESSAGE.to_string())),
        1 => {}
        _ => {
            return Err(CoreError::Validation(
                "provide exactly one of file, URL, or content descriptor".to_string(),
            ))
        }
    }

    let params = match input.params {
        None | Some(serde_json::Value::Null) => None,
        Some(p @ serde_json::Value::Object(_)) => Some(p),
        Some(_) => {
            return Err(CoreError::Validation(
                "params must be a JSON object".to_string(),
            ))
        }
    };

    if params.is_some() && content_id.is_none() {
        return Err(CoreError::Validation(
            "params are only accepted with a content descriptor".to_string(),
        ));
    }

    if let Some(upload) = input.upload {
        expect_implied_type(job_type, JobType::Video)?;
        validate_upload(&upload)?;
        return Ok(ContentSource::Upload(upload));
    }

    if let Some(url) = url {
        expect_implied_type(job_type, JobType::Url)?;
        validate_url(&url)?;
        return Ok(ContentSource::Url(url));
    }

    // One shape is present, so this is the direct case.
    let content_id = content_id.unwrap_or_default();
    if content_id.chars().count() > MAX_CONTENT_ID_LENGTH {
        return Err(CoreError::Validation(format!(
            "content_id exceeds {MAX_CONTENT_ID_LENGTH} characters"
        )));
    }
    let job_type = job_type.ok_or_else(|| {
        CoreError::Validation("job_type is required with a content descriptor".to_string())
    })?;

    Ok(ContentSource::Direct {
        content_id,
        job_type,
        params: params.unwrap_or_else(|| json!({})),
    })
}

/// File and URL shapes fix the job type; an explicit type must agree.
fn expect_implied_type(given: Option<JobType>, implied: JobType) -> Result<(), CoreError> {
    match given {
        Some(t) if t != implied => Err(CoreError::Validation(format!(
            "job_type '{t}' does not match the submitted content (expected '{implied}')"
        ))),
        _ => Ok(()),
    }
}

/// URLs must be absolute http(s) links.
pub fn validate_url(url: &str) -> Result<(), CoreError> {
    if url.chars().count() > MAX_URL_LENGTH {
        return Err(CoreError::Validation(format!(
            "URL exceeds {MAX_URL_LENGTH} characters"
        )));
    }
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(()),
        _ => Err(CoreError::Validation(
            "Invalid URL format. Must start with http:// or https://".to_string(),
        )),
    }
}

/// Uploads must be non-empty video files.
pub fn validate_upload(upload: &UploadedFile) -> Result<(), CoreError> {
    if upload.original_name.trim().is_empty() {
        return Err(CoreError::Validation("No file selected".to_string()));
    }
    if upload.size_bytes == 0 {
        return Err(CoreError::Validation("Uploaded file is empty".to_string()));
    }
    if !is_video(upload.content_type.as_deref(), &upload.original_name) {
        return Err(CoreError::Validation(
            "Invalid file type. Please upload MP4, MOV, AVI or WEBM".to_string(),
        ));
    }
    Ok(())
}

/// Generic or missing content types fall back to the file extension.
fn is_video(content_type: Option<&str>, filename: &str) -> bool {
    match content_type.map(|ct| ct.split(';').next().unwrap_or("").trim().to_lowercase()) {
        Some(ct) if ALLOWED_VIDEO_CONTENT_TYPES.contains(&ct.as_str()) => true,
        Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => false,
        _ => {
            let ext = filename.rsplit_once('.').map(|(_, e)| e.to_lowercase());
            ext.is_some_and(|e| ALLOWED_VIDEO_EXTENSIONS.contains(&e.as_str()))
        }
    }
}

/// Reduce a client filename to `[A-Za-z0-9._-]`, without leading dots.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    let mut out: String = trimmed.chars().take(MAX_STORED_NAME_LENGTH).collect();
    if out.is_empty() {
        out.push_str("upload");
    }
    out
}

/// Unique storage key for an uploaded file: `<uuid>-<sanitized name>`.
pub fn generate_storage_key(original_name: &str) -> String {
    format!("{}-{}", uuid::Uuid::new_v4(), sanitize_filename(original_name))
}

/// Content descriptor for a URL submitted at `submitted_at`.
pub fn url_content_id(submitted_at: Timestamp) -> String {
    format!("{URL_CONTENT_PREFIX}{}", submitted_at.timestamp_millis())
}

impl ContentSource {
    /// Derive the job row contents. `submitted_at` stamps URL descriptors.
    pub fn into_job_spec(self, submitted_at: Timestamp) -> NewJobSpec {
        match self {
            ContentSource::Upload(upload) => NewJobSpec {
                params: json!({
                    "file_path": upload.file_path,
                    "filename": upload.original_name,
                    "file_size": upload.size_bytes,
                    "content_type": upload.content_type,
                }),
                content_id: upload.storage_key,
                job_type: JobType::Video,
            },
            ContentSource::Url(url) => NewJobSpec {
                content_id: url_content_id(submitted_at),
                job_type: JobType::Url,
                params: json!({ "url": url }),
            },
            ContentSource::Direct {
                content_id,
                job_type,
                params,
            } => NewJobSpec {
                content_id,
                job_type,
                params,
            },
        }
    }
}
