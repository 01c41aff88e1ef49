pub mod html;
pub mod rules;


use url::Url;

/// A hyperlink found on a page, resolved against the page URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    /// Absolute URL
    pub url: Url,
    /// The href attribute exactly as written
    pub href: String,
    /// Lowercased anchor text
    pub text: String,
}

/// What a scan should do with a discovered link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Points at a PDF
    Pdf,
    /// Looks like a script page worth fetching once
    Follow,
    /// Neither
    Other,
}

impl LinkKind {
    /// Classify a link; `follow_links` gates the [`LinkKind::Follow`] outcome
    pub fn classify(link: &DiscoveredLink, follow_links: bool) -> Self {
        if is_pdf_link(&link.url, &link.href) {
            ::log::trace!("Classifying as PDF: {}", link.url);
            LinkKind::Pdf
        } else if follow_links && should_follow(&link.text, &link.href) {
            ::log::trace!("Classifying as follow candidate: {}", link.url);
            LinkKind::Follow
        } else {
            LinkKind::Other
        }
    }
}

/// Determines whether a resolved URL (and the raw href it came from) points at a PDF
pub fn is_pdf_link(url: &Url, href: &str) -> bool {
    let url_lower = url.as_str().to_lowercase();
    let path = url.path().to_lowercase();
    let href_lower = href.to_lowercase();

    if path.ends_with(".pdf") {
        return true;
    }

    if href_lower.ends_with(".pdf") || href_lower.contains(".pdf?") || href_lower.contains(".pdf#")
    {
        return true;
    }

    if path.contains("/pdf/") || path.contains("/pdfs/") {
        return true;
    }

    // Known hosts still need "pdf" somewhere in the URL
    if rules::SCRIPT_PDF_DOMAINS
        .iter()
        .any(|domain| url_lower.contains(domain))
        && (url_lower.contains("pdf") || path.ends_with(".pdf"))
    {
        return true;
    }

    url_lower.contains("download") && url_lower.contains("pdf")
}

/// Determines whether a non-PDF link is worth fetching as a possible script page
pub fn should_follow(anchor_text: &str, href: &str) -> bool {
    let combined = format!("{} {}", anchor_text.to_lowercase(), href.to_lowercase());
    if rules::SCRIPT_KEYWORDS
        .iter()
        .any(|keyword| combined.contains(keyword))
    {
        return true;
    }

    rules::SCRIPT_PAGE_REGEXES
        .iter()
        .any(|regex| regex.is_match(href))
}

/// Result of parsing a page for links
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Number of `<a href>` elements on the page, including ones that were skipped
    pub anchor_count: usize,
    /// Links that resolved to an absolute URL
    pub links: Vec<DiscoveredLink>,
}

impl ParseResult {
    pub fn new(anchor_count: usize, links: Vec<DiscoveredLink>) -> Self {
        Self {
            anchor_count,
            links,
        }
    }
}
