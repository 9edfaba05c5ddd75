//! Streaming-XML front end for the parameter tree.
//!
//! [`drive`] pumps SAX-style events from a `quick-xml` reader into a
//! [`ParameterTree`]; the [`mods`] and [`dc`] modules declare schemas for
//! the two metadata formats we harvest and map the resulting tree content
//! into canonical records.

use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

use bibspan_paramtree::ParameterTree;

pub mod dc;
pub mod mods;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("XML parse error: {0}")]
    Parse(#[from] quick_xml::Error),
}

/// Pump every event of one XML document into a parameter tree.
///
/// Start and self-closing elements become `prepare` calls, matched on the
/// element's local name with its `type` attribute as the variant; text and
/// CDATA become `add_characters`; end elements become `unprepare`. The tree
/// absorbs anything undeclared, so the only failure here is a structurally
/// malformed document; text chunks with unresolvable entities are dropped.
pub fn drive<R: BufRead>(reader: R, tree: &mut ParameterTree) -> Result<(), XmlError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(false);

    let mut buf = Vec::with_capacity(4096);

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let name = local_name(e);
                let variant = type_attribute(e);
                tree.prepare(&name, variant.as_deref());
            }
            Event::Empty(ref e) => {
                let name = local_name(e);
                let variant = type_attribute(e);
                tree.prepare(&name, variant.as_deref());
                tree.unprepare();
            }
            Event::Text(ref e) => {
                if let Ok(text) = e.unescape() {
                    tree.add_characters(&text);
                }
            }
            Event::CData(ref e) => {
                tree.add_characters(&String::from_utf8_lossy(e.as_ref()));
            }
            Event::End(_) => tree.unprepare(),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Drive a whole in-memory document.
pub fn drive_str(xml: &str, tree: &mut ParameterTree) -> Result<(), XmlError> {
    drive(xml.as_bytes(), tree)
}

/// Element name without its namespace prefix.
fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned()
}

/// Value of the element's unprefixed `type` attribute, if any. Prefixed
/// attributes like `xsi:type` carry schema metadata, not a variant.
fn type_attribute(e: &BytesStart) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"type" {
            return Some(String::from_utf8_lossy(&attr.value).into_owned());
        }
    }
    None
}

/// Trimmed content at a tree path, defaulting to the empty string.
fn content(tree: &ParameterTree, path: &str) -> String {
    tree.get_content(path).map(str::trim).unwrap_or("").to_string()
}

/// Genre markers that make a record an article rather than a book.
fn is_article_genre(genre: &str) -> bool {
    let genre = genre.to_lowercase();
    genre.contains("article") || genre.contains("journal")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title_schema() -> ParameterTree {
        let mut tree = ParameterTree::new();
        let doc = tree.add_parameter("doc", "doc", None);
        tree.add_child(doc, "title", "title", None);
        tree.add_child(doc, "issued", "date", Some("issued"));
        tree
    }

    #[test]
    fn test_drive_routes_text_to_declared_nodes() {
        let mut tree = title_schema();
        drive_str("<doc><title>Hallo Welt</title></doc>", &mut tree).unwrap();
        assert_eq!(tree.get_content("doc/title"), Some("Hallo Welt"));
    }

    #[test]
    fn test_drive_strips_namespace_prefixes() {
        let mut tree = title_schema();
        let xml = r#"<m:doc xmlns:m="urn:example"><m:title>Hallo</m:title></m:doc>"#;
        drive_str(xml, &mut tree).unwrap();
        assert_eq!(tree.get_content("doc/title"), Some("Hallo"));
    }

    #[test]
    fn test_drive_passes_type_attribute_as_variant() {
        let mut tree = title_schema();
        let xml = r#"<doc><date type="issued">2005</date><date>1999</date></doc>"#;
        drive_str(xml, &mut tree).unwrap();
        assert_eq!(tree.get_content("doc/issued"), Some("2005"));
    }

    #[test]
    fn test_drive_ignores_prefixed_type_attributes() {
        let mut tree = title_schema();
        let xml = r#"<doc xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><title xsi:type="dcterms:W3CDTF">Getippt</title></doc>"#;
        drive_str(xml, &mut tree).unwrap();
        // xsi:type is not a variant; the no-variant declaration still matches.
        assert_eq!(tree.get_content("doc/title"), Some("Getippt"));
    }

    #[test]
    fn test_drive_balances_self_closing_elements() {
        let mut tree = title_schema();
        let xml = r#"<doc><pagebreak/><title>Nach dem Umbruch</title></doc>"#;
        drive_str(xml, &mut tree).unwrap();
        assert_eq!(tree.get_content("doc/title"), Some("Nach dem Umbruch"));
    }

    #[test]
    fn test_drive_unescapes_entities_and_cdata() {
        let mut tree = title_schema();
        drive_str("<doc><title>Krieg &amp; Frieden</title></doc>", &mut tree).unwrap();
        assert_eq!(tree.get_content("doc/title"), Some("Krieg & Frieden"));

        let mut tree = title_schema();
        drive_str("<doc><title><![CDATA[1 < 2]]></title></doc>", &mut tree).unwrap();
        assert_eq!(tree.get_content("doc/title"), Some("1 < 2"));
    }

    #[test]
    fn test_drive_rejects_mismatched_tags() {
        let mut tree = title_schema();
        assert!(drive_str("<doc><title>x</wrong></doc>", &mut tree).is_err());
    }

    #[test]
    fn test_is_article_genre() {
        assert!(is_article_genre("journal article"));
        assert!(is_article_genre("Zeitschriftenartikel / journal"));
        assert!(!is_article_genre("book"));
        assert!(!is_article_genre(""));
    }
}
