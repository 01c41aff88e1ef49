use crate::parsers::{DiscoveredLink, ParseResult};
use scraper::{Html, Selector};
use url::Url;

/// Parses HTML and resolves every `<a href>` against `base`
pub fn parse(html: &str, base: &Url) -> ParseResult {
    let doc = Html::parse_document(html);

    let link_selector = Selector::parse("a[href]").unwrap();
    let anchors = doc.select(&link_selector).collect::<Vec<_>>();

    let links = anchors
        .iter()
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            if href.is_empty() {
                return None;
            }
            let url = match base.join(href) {
                Ok(url) => url,
                Err(e) => {
                    ::log::debug!("Skipping unresolvable href {:?}: {}", href, e);
                    return None;
                }
            };
            Some(DiscoveredLink {
                url,
                href: href.to_string(),
                text: anchor.text().collect::<String>().to_lowercase(),
            })
        })
        .collect::<Vec<_>>();

    ::log::debug!(
        "HTML parser found {} anchors, {} usable links",
        anchors.len(),
        links.len()
    );

    ParseResult::new(anchors.len(), links)
}
