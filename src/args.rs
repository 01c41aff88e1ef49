use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "script-finder")]
#[command(about = "Find and download PDF movie/TV scripts linked from a web page")]
#[command(version)]
pub struct Args {
    /// Page to scan (https:// is assumed when no scheme is given)
    pub url: String,

    /// Only keep scripts whose URL or link text contains this (case-insensitive)
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Do not follow links to likely script pages
    #[arg(long)]
    pub no_follow: bool,

    /// Download every script found as soon as the scan completes
    #[arg(short, long)]
    pub auto_download: bool,

    /// Render the page through a WebDriver browser first (needs e.g. chromedriver running)
    #[arg(short, long)]
    pub render_js: bool,

    /// Directory downloads are written to
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Path to a JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Download only these result rows (1-based, comma separated)
    #[arg(short, long, value_delimiter = ',')]
    pub select: Vec<usize>,

    /// Print the results as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Selected rows converted to 0-based indices
    pub fn selected_rows(&self) -> Vec<usize> {
        self.select
            .iter()
            .filter(|&&n| n > 0)
            .map(|n| n - 1)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["script-finder", "example.com"]);
        assert_eq!(args.url, "example.com");
        assert!(!args.no_follow);
        assert!(!args.auto_download);
        assert!(!args.render_js);
        assert!(args.select.is_empty());
    }

    #[test]
    fn test_select_is_one_based() {
        let args = Args::parse_from(["script-finder", "example.com", "--select", "1,3,0"]);
        assert_eq!(args.selected_rows(), vec![0, 2]);
    }
}
