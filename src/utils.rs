use crate::error::{FinderError, Result};
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use url::Url;

/// Name used when a URL has no usable path segment
pub const FALLBACK_FILENAME: &str = "script.pdf";

/// Turn user input into an absolute URL, defaulting the scheme to https
pub fn normalize_input_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed == "https://" || trimmed == "http://" {
        return Err(FinderError::InvalidUrl {
            input: input.to_string(),
            reason: "Please enter a valid URL".to_string(),
        });
    }

    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else if trimmed.starts_with("//") {
        format!("https:{}", trimmed)
    } else {
        format!("https://{}", trimmed)
    };

    Url::parse(&with_scheme).map_err(|e| FinderError::InvalidUrl {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Derive a filesystem-safe `.pdf` filename from a URL
pub fn derive_filename(url: &Url) -> String {
    let path = percent_decode_str(url.path()).decode_utf8_lossy();

    let mut filename = path.rsplit('/').next().unwrap_or_default();
    if let Some((before, _)) = filename.split_once('?') {
        filename = before;
    }

    if !filename.is_empty() && filename.ends_with(".pdf") {
        return filename.to_string();
    }

    match path.split('/').filter(|segment| !segment.is_empty()).last() {
        Some(segment) => {
            let mut name = sanitize_filename(segment);
            if !name.ends_with(".pdf") {
                name.push_str(".pdf");
            }
            name
        }
        None => FALLBACK_FILENAME.to_string(),
    }
}

/// Replace every character outside `[A-Za-z0-9_.-]` with `_`
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// First path in `dir` for `filename` that does not exist yet.
///
/// Collisions get `_1`, `_2`, ... inserted before the extension.
pub async fn unique_path(dir: &Path, filename: &str) -> std::io::Result<PathBuf> {
    let candidate = dir.join(filename);
    if !tokio::fs::try_exists(&candidate).await? {
        return Ok(candidate);
    }

    let as_path = Path::new(filename);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    let extension = as_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1;
    loop {
        let candidate = dir.join(format!("{}_{}{}", stem, counter, extension));
        if !tokio::fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filename_for(url: &str) -> String {
        derive_filename(&Url::parse(url).unwrap())
    }

    #[test]
    fn test_normalize_input_url() {
        assert_eq!(
            normalize_input_url("example.com/scripts").unwrap().as_str(),
            "https://example.com/scripts"
        );
        assert_eq!(
            normalize_input_url("  http://example.com/ ").unwrap().as_str(),
            "http://example.com/"
        );
        assert_eq!(
            normalize_input_url("//cdn.example.com/a").unwrap().as_str(),
            "https://cdn.example.com/a"
        );
    }

    #[test]
    fn test_normalize_rejects_empty_input() {
        assert!(normalize_input_url("").is_err());
        assert!(normalize_input_url("   ").is_err());
        assert!(normalize_input_url("https://").is_err());
    }

    #[test]
    fn test_pdf_basename_is_kept_verbatim() {
        assert_eq!(
            filename_for("https://example.com/files/Movie_Script.pdf"),
            "Movie_Script.pdf"
        );
        assert_eq!(
            filename_for("https://example.com/files/Movie_Script.pdf?dl=1#top"),
            "Movie_Script.pdf"
        );
    }

    #[test]
    fn test_percent_decoded_before_use() {
        assert_eq!(
            filename_for("https://example.com/files/The%20Big%20Lebowski.pdf"),
            "The Big Lebowski.pdf"
        );
    }

    #[test]
    fn test_non_pdf_segment_is_sanitized() {
        assert_eq!(
            filename_for("https://example.com/download/pdf/12345"),
            "12345.pdf"
        );
        assert_eq!(
            filename_for("https://example.com/scripts/pulp%20fiction%3F/"),
            "pulp_fiction_.pdf"
        );
        // Uppercase extension is not treated as ".pdf"
        assert_eq!(filename_for("https://example.com/a/Draft.PDF"), "Draft.PDF.pdf");
    }

    #[test]
    fn test_fallback_when_no_segments() {
        assert_eq!(filename_for("https://example.com/"), FALLBACK_FILENAME);
        assert_eq!(filename_for("https://example.com"), FALLBACK_FILENAME);
    }

    #[test]
    fn test_derivation_is_idempotent_and_ends_in_pdf() {
        let urls = [
            "https://example.com/files/Movie_Script.pdf",
            "https://example.com/view?id=3",
            "https://example.com/pdfs/%E2%98%83",
            "https://example.com/",
            "https://dailyscript.com/scripts/alien.html",
        ];
        for url in urls {
            let first = filename_for(url);
            let second = filename_for(url);
            assert_eq!(first, second, "derivation changed for {}", url);
            assert!(first.ends_with(".pdf"), "{} derived {}", url, first);
        }
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a b/c:d"), "a_b_c_d");
        assert_eq!(sanitize_filename("ok-name_1.txt"), "ok-name_1.txt");
    }

    #[tokio::test]
    async fn test_unique_path_appends_counter() {
        let dir = tempfile::tempdir().unwrap();

        let first = unique_path(dir.path(), "draft.pdf").await.unwrap();
        assert_eq!(first, dir.path().join("draft.pdf"));
        std::fs::write(&first, b"x").unwrap();

        let second = unique_path(dir.path(), "draft.pdf").await.unwrap();
        assert_eq!(second, dir.path().join("draft_1.pdf"));
        std::fs::write(&second, b"x").unwrap();

        assert_eq!(
            unique_path(dir.path(), "draft.pdf").await.unwrap(),
            dir.path().join("draft_2.pdf")
        );
    }
}
