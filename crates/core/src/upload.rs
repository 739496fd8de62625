//! Pure validation of an uploaded script before it enters the pipeline.

use crate::error::{Error, Result};

/// Default extensions accepted for script upload, used when the caller
/// doesn't supply its own configured allow-list. PDF/Fountain parsing
/// into plain text happens upstream of this boundary; by the time
/// `validate_upload` runs, the caller has already decoded the payload to
/// text.
pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 3] = ["txt", "fountain", "fdx"];

/// Default upload size ceiling (2 MB), used when the caller doesn't
/// supply its own configured limit.
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 2;

fn extension_of(filename: &str) -> Option<&str> {
    filename.rsplit('.').next().filter(|ext| *ext != filename)
}

/// Validate an uploaded script's filename and decoded text before it is
/// handed to the segmenter, against a caller-supplied (`max_upload_mb`,
/// `allowed_extensions`) pair — spec.md §6's configured upload
/// constraint, not a hardcoded limit, since different deployments tune
/// these independently.
pub fn validate_upload_with_limits(filename: &str, text: &str, max_upload_mb: u64, allowed_extensions: &[String]) -> Result<()> {
    if text.trim().is_empty() {
        return Err(Error::EmptyScript);
    }

    let max_bytes = (max_upload_mb as usize).saturating_mul(1024 * 1024);
    if text.len() > max_bytes {
        return Err(Error::InvalidParams {
            strategy: "upload".to_string(),
            reason: format!("script exceeds {max_upload_mb}MB"),
        });
    }

    match extension_of(filename) {
        Some(ext) if allowed_extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)) => Ok(()),
        Some(ext) => Err(Error::InvalidParams {
            strategy: "upload".to_string(),
            reason: format!("unsupported file extension: {ext}"),
        }),
        None => Err(Error::InvalidParams {
            strategy: "upload".to_string(),
            reason: "filename has no extension".to_string(),
        }),
    }
}

/// Validate against [`DEFAULT_MAX_UPLOAD_MB`]/[`DEFAULT_ALLOWED_EXTENSIONS`]
/// — convenience for callers (tests, the core test suite) that don't
/// have a configured server limit to hand.
pub fn validate_upload(filename: &str, text: &str) -> Result<()> {
    let defaults: Vec<String> = DEFAULT_ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect();
    validate_upload_with_limits(filename, text, DEFAULT_MAX_UPLOAD_MB, &defaults)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_plain_text_script() {
        assert!(validate_upload("draft.txt", "INT. ROOM - DAY\n\nSomething happens.").is_ok());
    }

    #[test]
    fn rejects_empty_text() {
        assert!(matches!(validate_upload("draft.txt", "   "), Err(Error::EmptyScript)));
    }

    #[test]
    fn rejects_unsupported_extensions() {
        assert!(validate_upload("draft.docx", "some text").is_err());
    }

    #[test]
    fn rejects_oversized_scripts() {
        let huge = "a".repeat((DEFAULT_MAX_UPLOAD_MB as usize) * 1024 * 1024 + 1);
        assert!(validate_upload("draft.txt", &huge).is_err());
    }

    #[test]
    fn extension_matching_is_case_insensitive() {
        assert!(validate_upload("draft.TXT", "some real content here").is_ok());
    }

    #[test]
    fn honors_a_caller_supplied_allow_list_and_limit() {
        let allowed = vec!["screenplay".to_string()];
        assert!(validate_upload_with_limits("draft.screenplay", "some content", 1, &allowed).is_ok());
        assert!(validate_upload_with_limits("draft.txt", "some content", 1, &allowed).is_err());
    }
}
