use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

static RESOURCES: Dir = include_dir!("$CARGO_MANIFEST_DIR/resources");

pub const FALLBACK_QUOTE: &str = "Focus Time";

fn parse_quotes(json: &str) -> Option<Vec<String>> {
    serde_json::from_str::<Vec<String>>(json)
        .ok()
        .map(|quotes| {
            quotes
                .into_iter()
                .map(|q| q.trim().to_string())
                .filter(|q| !q.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|quotes| !quotes.is_empty())
}

fn bundled_quotes() -> Vec<String> {
    RESOURCES
        .get_file("quotes.json")
        .and_then(|f| f.contents_utf8())
        .and_then(parse_quotes)
        .unwrap_or_else(|| vec![FALLBACK_QUOTE.to_string()])
}

/// Quotes from `path` (a JSON array of strings), or the bundled set when the
/// file is missing, unreadable or empty.
pub fn load_quotes(path: Option<&Path>) -> Vec<String> {
    if let Some(path) = path {
        match fs::read_to_string(path) {
            Ok(json) => match parse_quotes(&json) {
                Some(quotes) => {
                    debug!(count = quotes.len(), path = %path.display(), "loaded quotes");
                    return quotes;
                }
                None => warn!(path = %path.display(), "quotes file has no usable quotes"),
            },
            Err(e) => warn!(path = %path.display(), error = %e, "failed to read quotes file"),
        }
    }
    bundled_quotes()
}

/// Pick the quote shown for the lifetime of the app
pub fn pick_quote(quotes: &[String]) -> String {
    quotes
        .choose(&mut rand::thread_rng())
        .cloned()
        .unwrap_or_else(|| FALLBACK_QUOTE.to_string())
}
