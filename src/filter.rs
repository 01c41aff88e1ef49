/// Case-insensitive substring filter applied to found scripts
///
/// A script is kept when the filter is empty, or when the filter text appears
/// in the lowercased URL joined with its anchor text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptFilter {
    needle: String,
}

impl ScriptFilter {
    /// Create a filter from user input; surrounding whitespace is ignored
    pub fn new(text: &str) -> Self {
        Self {
            needle: text.trim().to_lowercase(),
        }
    }

    /// A filter that accepts everything
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// The normalized filter text
    pub fn as_str(&self) -> &str {
        &self.needle
    }

    /// Determine if a candidate URL with the given anchor text passes the filter
    pub fn matches(&self, url: &str, anchor_text: &str) -> bool {
        if self.needle.is_empty() {
            return true;
        }

        let combined = format!("{} {}", url.to_lowercase(), anchor_text.to_lowercase());
        combined.contains(&self.needle)
    }
}

impl From<Option<&str>> for ScriptFilter {
    fn from(text: Option<&str>) -> Self {
        text.map(ScriptFilter::new).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_accepts_everything() {
        let filter = ScriptFilter::none();
        assert!(filter.is_empty());
        assert!(filter.matches("https://example.com/a.pdf", ""));
        assert!(filter.matches("", ""));

        // Whitespace-only input is the same as no filter
        assert!(ScriptFilter::new("   ").is_empty());
    }

    #[test]
    fn test_matches_url_or_anchor_text() {
        let filter = ScriptFilter::new("Pilot");
        assert_eq!(filter.as_str(), "pilot");

        assert!(filter.matches("https://example.com/The_PILOT.pdf", "download"));
        assert!(filter.matches("https://example.com/ep1.pdf", "Pilot episode"));
    }

    #[test]
    fn test_rejects_when_both_lack_substring() {
        let filter = ScriptFilter::new("screenplay");
        assert!(!filter.matches("https://example.com/draft.pdf", "Final draft"));
    }

    #[test]
    fn test_filter_spans_url_and_text_boundary() {
        // The URL and anchor text are joined with a single space
        let filter = ScriptFilter::new("pdf final");
        assert!(filter.matches("https://example.com/x.pdf", "Final"));
    }
}
