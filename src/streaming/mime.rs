//! Response content type resolution.

use std::path::Path;

/// Fallback when nothing better is known.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Pick the `Content-Type` for an object.
///
/// A declared `video/*` or `audio/*` type wins. Otherwise the name's extension
/// is looked up, and failing that any other declared type is used as is.
pub fn resolve_content_type(declared: Option<&str>, name: Option<&str>) -> String {
    let declared = declared.map(str::trim).filter(|d| !d.is_empty());

    if let Some(declared) = declared {
        let lower = declared.to_ascii_lowercase();
        if lower.starts_with("video/") || lower.starts_with("audio/") {
            return declared.to_string();
        }
    }

    if let Some(by_extension) = name.and_then(content_type_for_name) {
        return by_extension.to_string();
    }

    declared.unwrap_or(OCTET_STREAM).to_string()
}

/// Content type implied by a file name's extension, if it is a known media type.
pub fn content_type_for_name(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?;
    let mime = match ext.to_ascii_lowercase().as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "flv" => "video/x-flv",
        "wmv" => "video/x-ms-wmv",
        "ts" => "video/mp2t",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        _ => return None,
    };
    Some(mime)
}
