//! Static tables driving link classification.

use regex::Regex;
use std::sync::LazyLock;

/// Words in anchor text or href that suggest a page hosting a script
pub const SCRIPT_KEYWORDS: &[&str] = &[
    "script",
    "screenplay",
    "teleplay",
    "pilot",
    "episode",
    "transcript",
    "draft",
    "shooting",
    "final",
];

/// Href patterns for script detail pages
pub const SCRIPT_PAGE_PATTERNS: &[&str] = &[
    r"/script/[\w-]+",
    r"/scripts/[\w-]+",
    r"/screenplay/[\w-]+",
    r"/screenplays/[\w-]+",
];

/// Hosts (and host/path prefixes) known to serve script PDFs
pub const SCRIPT_PDF_DOMAINS: &[&str] = &[
    "assets.scriptslug.com",
    "scriptslug.com/live/pdf",
    "dailyscript.com",
    "imsdb.com",
    "screenplaydb.com",
    "scriptpdf.com",
];

/// Compiled form of [`SCRIPT_PAGE_PATTERNS`]
pub static SCRIPT_PAGE_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    SCRIPT_PAGE_PATTERNS
        .iter()
        .map(|pattern| Regex::new(pattern).expect("script page patterns are valid"))
        .collect()
});
