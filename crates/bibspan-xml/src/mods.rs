//! MODS (Metadata Object Description Schema) extractor.
//!
//! Declares the handful of MODS paths we care about, drives one document
//! through the parameter tree, and maps the content into a canonical
//! record. Written for single-work documents; `<modsCollection>` wrappers
//! are tolerated because the tree ignores top-level elements until the
//! `<mods>` root matches.

use std::io::BufRead;

use bibspan_core::{ItemKind, TextRecord};
use bibspan_paramtree::ParameterTree;

use crate::{XmlError, content, drive, is_article_genre};

/// Read one MODS document into a canonical record.
pub fn read<R: BufRead>(reader: R) -> Result<TextRecord, XmlError> {
    let mut tree = schema();
    drive(reader, &mut tree)?;
    Ok(map_record(&tree))
}

/// Read a MODS document from an in-memory string.
pub fn read_str(xml: &str) -> Result<TextRecord, XmlError> {
    read(xml.as_bytes())
}

fn schema() -> ParameterTree {
    let mut tree = ParameterTree::new();
    let mods = tree.add_parameter("mods", "mods", None);

    let title_info = tree.add_child(mods, "titleInfo", "titleInfo", None);
    tree.add_child(title_info, "title", "title", None);
    tree.add_child(title_info, "subTitle", "subTitle", None);

    let name = tree.add_child(mods, "name", "name", Some("personal"));
    tree.add_child(name, "family", "namePart", Some("family"));
    tree.add_child(name, "given", "namePart", Some("given"));

    let origin = tree.add_child(mods, "originInfo", "originInfo", None);
    tree.add_child(origin, "dateIssued", "dateIssued", None);
    tree.add_child(origin, "publisher", "publisher", None);
    let place = tree.add_child(origin, "place", "place", None);
    tree.add_child(place, "placeTerm", "placeTerm", Some("text"));

    tree.add_child(mods, "genre", "genre", None);
    tree
}

fn map_record(tree: &ParameterTree) -> TextRecord {
    let family = tree.get_content("mods/name/family").map(str::trim);
    let given = tree.get_content("mods/name/given").map(str::trim);
    let author = match (family, given) {
        (Some(family), Some(given)) => format!("{family}, {given}"),
        (Some(family), None) => family.to_string(),
        (None, _) => "-".to_string(),
    };

    let genre = content(tree, "mods/genre");
    let kind = if is_article_genre(&genre) {
        ItemKind::Article
    } else {
        ItemKind::Book
    };

    TextRecord {
        title: content(tree, "mods/titleInfo/title"),
        author,
        sub_title: content(tree, "mods/titleInfo/subTitle"),
        year: content(tree, "mods/originInfo/dateIssued"),
        publisher: content(tree, "mods/originInfo/publisher"),
        place: content(tree, "mods/originInfo/place/placeTerm"),
        kind,
        ..Default::default()
    }
}
