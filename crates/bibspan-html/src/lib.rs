//! Discovery of COinS metadata spans (`<span class="Z3988" title="...">`)
//! in HTML pages.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use bibspan_core::TextRecord;

static COINS_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.Z3988").unwrap());

/// Collect the raw COinS payloads of a page: every non-empty `title`
/// attribute of a `span.Z3988`, in document order.
///
/// The HTML parser has already resolved entities, so the returned strings
/// carry plain `&` delimiters.
pub fn find_coins(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&COINS_SELECTOR)
        .filter_map(|span| span.value().attr("title"))
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decode every COinS span of a page into a canonical record.
///
/// Spans that fail to decode are skipped so one broken span never costs the
/// rest of the page.
pub fn harvest(html: &str) -> Vec<TextRecord> {
    find_coins(html)
        .iter()
        .filter_map(|raw| match bibspan_coins::parse_span(raw) {
            Ok(record) => Some(record),
            Err(error) => {
                tracing::warn!(%error, span = raw.as_str(), "skipping undecodable COinS span");
                None
            }
        })
        .collect()
}
