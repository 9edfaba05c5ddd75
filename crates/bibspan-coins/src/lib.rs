//! Decoder for COinS metadata (OpenURL ContextObjects embedded in HTML
//! `span.Z3988` title attributes) and genre-aware conversion into the
//! canonical [`TextRecord`].

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use thiserror::Error;

use bibspan_core::TextRecord;

mod extract;

#[derive(Error, Debug)]
pub enum CoinsError {
    #[error("COinS data is not valid UTF-8 after percent-decoding: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
}

/// Separator joining the values of a repeated key. Callers that need the
/// individual values re-split on it.
pub const REPEAT_SEPARATOR: char = '@';

/// Bibliographic genre of a context object, decided by its `rft_val_fmt`
/// format identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Genre {
    Book,
    Article,
}

/// The decoded key/value content of one COinS span.
///
/// Keys are stored lower-cased; a key occurring more than once holds its
/// values joined by [`REPEAT_SEPARATOR`] in encounter order. Values are kept
/// verbatim after URL-decoding.
#[derive(Debug, Clone, Default)]
pub struct ContextObject {
    fields: HashMap<String, String>,
}

impl ContextObject {
    /// Decode a raw span title attribute value.
    ///
    /// The raw string is URL-decoded with form semantics (`+` means space),
    /// then split into `key=value` segments on the literal `&amp;` entity;
    /// attribute values that reach us already entity-decoded fall back to a
    /// plain `&` split. Segments without a `=` are dropped. Malformed
    /// percent escapes pass through literally; the only failure is decoded
    /// bytes that are not valid UTF-8.
    pub fn decode(raw: &str) -> Result<Self, CoinsError> {
        let decoded = form_decode(raw)?;

        let segments: Vec<&str> = decoded.split("&amp;").collect();
        let segments = if segments.len() == 1 {
            decoded.split('&').collect()
        } else {
            segments
        };

        let mut fields = HashMap::new();
        for segment in segments {
            let Some((key, value)) = segment.split_once('=') else {
                continue;
            };
            match fields.entry(key.to_lowercase()) {
                Entry::Occupied(mut slot) => {
                    let joined: &mut String = slot.get_mut();
                    joined.push(REPEAT_SEPARATOR);
                    joined.push_str(value);
                }
                Entry::Vacant(slot) => {
                    slot.insert(value.to_string());
                }
            }
        }
        Ok(Self { fields })
    }

    /// Look up a key (callers pass it lower-cased, e.g. `rft.btitle`).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Decide the genre from `rft_val_fmt`. Total: unknown or missing
    /// format identifiers fall back to [`Genre::Book`].
    pub fn genre(&self) -> Genre {
        let format = self.get("rft_val_fmt").unwrap_or("").to_lowercase();
        if format.ends_with("book") {
            Genre::Book
        } else if format.ends_with("journal") {
            Genre::Article
        } else {
            Genre::Book
        }
    }

    /// Assemble the canonical record for this context object's genre.
    pub fn to_record(&self) -> TextRecord {
        extract::record(self.genre(), self)
    }
}

/// Decode one raw COinS span straight into a canonical record.
pub fn parse_span(raw: &str) -> Result<TextRecord, CoinsError> {
    Ok(ContextObject::decode(raw)?.to_record())
}

/// URL-decode with HTML-form semantics: `+` becomes a space before percent
/// escapes are resolved, so an encoded `%2B` still yields a literal `+`.
fn form_decode(raw: &str) -> Result<String, CoinsError> {
    let spaced = raw.replace('+', " ");
    Ok(urlencoding::decode(&spaced)?.into_owned())
}
