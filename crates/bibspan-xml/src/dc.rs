//! Dublin Core extractor for `oai_dc`-style records.
//!
//! The schema is flat: every interesting element sits directly under the
//! `<dc>` root. Namespace prefixes (`dc:title`, `oai_dc:dc`) are already
//! stripped by the driver.

use std::io::BufRead;

use bibspan_core::{ItemKind, TextRecord};
use bibspan_paramtree::ParameterTree;

use crate::{XmlError, content, drive, is_article_genre};

const ELEMENTS: &[&str] = &[
    "title",
    "creator",
    "date",
    "publisher",
    "type",
    "identifier",
    "description",
];

/// Read one Dublin Core record into a canonical record.
pub fn read<R: BufRead>(reader: R) -> Result<TextRecord, XmlError> {
    let mut tree = schema();
    drive(reader, &mut tree)?;
    Ok(map_record(&tree))
}

/// Read a Dublin Core record from an in-memory string.
pub fn read_str(xml: &str) -> Result<TextRecord, XmlError> {
    read(xml.as_bytes())
}

fn schema() -> ParameterTree {
    let mut tree = ParameterTree::new();
    let dc = tree.add_parameter("dc", "dc", None);
    for &element in ELEMENTS {
        tree.add_child(dc, element, element, None);
    }
    tree
}

fn map_record(tree: &ParameterTree) -> TextRecord {
    let creator = content(tree, "dc/creator");
    let author = if creator.is_empty() {
        "-".to_string()
    } else {
        creator
    };

    let kind = if is_article_genre(&content(tree, "dc/type")) {
        ItemKind::Article
    } else {
        ItemKind::Book
    };

    let mut text = String::new();
    for (label, path) in [
        ("Identifier", "dc/identifier"),
        ("Description", "dc/description"),
    ] {
        if let Some(value) = tree.get_content(path) {
            if !text.is_empty() {
                text.push_str(", ");
            }
            text.push_str(label);
            text.push_str(": ");
            text.push_str(value.trim());
        }
    }

    TextRecord {
        title: content(tree, "dc/title"),
        author,
        year: content(tree, "dc/date"),
        publisher: content(tree, "dc/publisher"),
        kind,
        text,
        ..Default::default()
    }
}
