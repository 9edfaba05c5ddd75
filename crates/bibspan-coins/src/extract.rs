//! Per-genre field assembly: map a decoded [`ContextObject`] onto the
//! canonical record. All lookups are total; missing keys leave record
//! fields at their defaults.

use bibspan_core::{ItemKind, TextRecord};

use crate::{ContextObject, Genre, REPEAT_SEPARATOR};

/// Assemble the canonical record for a dispatched genre.
pub(crate) fn record(genre: Genre, ctx: &ContextObject) -> TextRecord {
    match genre {
        Genre::Book => book(ctx),
        Genre::Article => article(ctx),
    }
}

fn book(ctx: &ContextObject) -> TextRecord {
    let (author, names) = author_field(ctx);

    let mut extra = ExtraText::new(ctx);
    extra.push("Edition", "rft.edition");
    extra.push("Series", "rft.series");
    extra.push("Total pages", "rft.tpages");
    extra.push("BICI", "rft.bici");
    extra.push_shared();

    TextRecord {
        title: first_of(ctx, &["rft.btitle", "rft.atitle", "rft.title"]),
        author,
        co_author: co_author(ctx, &names),
        pages: pages(ctx),
        publisher: value(ctx, "rft.pub"),
        place: value(ctx, "rft.place"),
        kind: ItemKind::Book,
        text: extra.finish(),
        ..Default::default()
    }
}

fn article(ctx: &ContextObject) -> TextRecord {
    let (author, names) = author_field(ctx);

    let mut extra = ExtraText::new(ctx);
    extra.push("Article number", "rft.artnum");
    extra.push("SICI", "rft.sici");
    extra.push("CODEN", "rft.coden");
    extra.push("Chronology", "rft.chron");
    extra.push("eISSN", "rft.eissn");
    extra.push("Season", "rft.ssn");
    extra.push("Quarter", "rft.quarter");
    extra.push("Part", "rft.part");
    extra.push_shared();

    TextRecord {
        title: first_of(ctx, &["rft.atitle", "rft.title"]),
        author,
        co_author: co_author(ctx, &names),
        publication: first_of(ctx, &["rft.jtitle", "rft.stitle"]),
        pages: pages(ctx),
        volume: int_value(ctx, "rft.volume"),
        number: int_value(ctx, "rft.issue"),
        kind: ItemKind::Article,
        text: extra.finish(),
        ..Default::default()
    }
}

/// Name parts retained from author assembly for the co-author filter.
#[derive(Default)]
struct AuthorNames {
    last: String,
    first: String,
}

/// Assemble the `"Last, First"` author display.
///
/// Without `rft.aulast` the author is the sentinel `-` and no other author
/// key is consulted. The first-name slot takes `rft.aufirst`, else
/// `rft.auinit`, else `rft.auinit1` rendered as an initial (optionally
/// followed by `rft.auinitm` as a middle initial); `rft.ausuffix` is
/// appended space-separated. Presence decides throughout: a present but
/// empty key ends the chain and still draws the comma.
fn author_field(ctx: &ContextObject) -> (String, AuthorNames) {
    let Some(last) = ctx.get("rft.aulast") else {
        return ("-".to_string(), AuthorNames::default());
    };

    let first = if let Some(aufirst) = ctx.get("rft.aufirst") {
        Some(aufirst.to_string())
    } else if let Some(auinit) = ctx.get("rft.auinit") {
        Some(auinit.to_string())
    } else if let Some(auinit1) = ctx.get("rft.auinit1") {
        let mut initials = format!("{auinit1}.");
        if let Some(auinitm) = ctx.get("rft.auinitm") {
            initials.push_str(&format!(" {auinitm}."));
        }
        Some(initials)
    } else {
        None
    };

    let mut author = last.to_string();
    if let Some(first) = &first {
        author.push_str(", ");
        author.push_str(first);
    }
    if let Some(suffix) = ctx.get("rft.ausuffix") {
        author.push(' ');
        author.push_str(suffix);
    }

    (
        author,
        AuthorNames {
            last: last.to_string(),
            first: first.unwrap_or_default(),
        },
    )
}

/// Join the `rft.au` entries, dropping entries that look like a repeat of
/// the primary author: plain substring containment of both retained name
/// parts. The heuristic is knowingly coarse (an empty retained part matches
/// every entry) and is kept as-is for output stability.
fn co_author(ctx: &ContextObject, names: &AuthorNames) -> String {
    let Some(au) = ctx.get("rft.au") else {
        return String::new();
    };
    let kept: Vec<&str> = au
        .split(REPEAT_SEPARATOR)
        .filter(|entry| !(entry.contains(&names.last) && entry.contains(&names.first)))
        .collect();
    kept.join(", ")
}

/// Page range: `rft.pages` verbatim, else `rft.spage` with `-rft.epage`
/// appended when present.
fn pages(ctx: &ContextObject) -> String {
    if let Some(pages) = ctx.get("rft.pages") {
        return pages.to_string();
    }
    let Some(spage) = ctx.get("rft.spage") else {
        return String::new();
    };
    match ctx.get("rft.epage") {
        Some(epage) => format!("{spage}-{epage}"),
        None => spage.to_string(),
    }
}

/// First present key wins; presence counts even when the value is empty.
fn first_of(ctx: &ContextObject, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| ctx.get(key))
        .unwrap_or("")
        .to_string()
}

fn value(ctx: &ContextObject, key: &str) -> String {
    ctx.get(key).unwrap_or("").to_string()
}

fn int_value(ctx: &ContextObject, key: &str) -> i32 {
    ctx.get(key).and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// Builder for the free-text extra field: ordered `"Label: value"`
/// fragments, emitted only for present keys, comma-joined.
struct ExtraText<'a> {
    ctx: &'a ContextObject,
    buf: String,
}

impl<'a> ExtraText<'a> {
    fn new(ctx: &'a ContextObject) -> Self {
        Self {
            ctx,
            buf: String::new(),
        }
    }

    fn push(&mut self, label: &str, key: &str) {
        if let Some(value) = self.ctx.get(key) {
            self.buf.push_str(label);
            self.buf.push_str(": ");
            self.buf.push_str(value);
            self.buf.push_str(", ");
        }
    }

    /// Fragments shared by every genre, emitted after the genre-specific
    /// ones.
    fn push_shared(&mut self) {
        self.push("Corporate author", "rft.aucorp");
        self.push("Date", "rft.date");
        self.push("ISBN", "rft.isbn");
        self.push("ISSN", "rft.issn");
        self.push("Genre", "rft.genre");
    }

    fn finish(mut self) -> String {
        // Every fragment ends with ", "; drop the trailing one.
        self.buf.truncate(self.buf.len().saturating_sub(2));
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(raw: &str) -> ContextObject {
        ContextObject::decode(raw).unwrap()
    }

    #[test]
    fn test_author_last_and_first() {
        let (author, _) = author_field(&ctx("rft.aulast=Mustermann&rft.aufirst=Max"));
        assert_eq!(author, "Mustermann, Max");
    }

    #[test]
    fn test_author_sentinel_without_last_name() {
        let (author, _) = author_field(&ctx("rft.aufirst=Max&rft.ausuffix=Jr"));
        assert_eq!(author, "-");
    }

    #[test]
    fn test_author_last_name_alone() {
        let (author, _) = author_field(&ctx("rft.aulast=Mustermann"));
        assert_eq!(author, "Mustermann");
    }

    #[test]
    fn test_author_initials_fallbacks() {
        let (author, _) = author_field(&ctx("rft.aulast=Doe&rft.auinit=J.+Q."));
        assert_eq!(author, "Doe, J. Q.");

        let (author, _) = author_field(&ctx("rft.aulast=Doe&rft.auinit1=J"));
        assert_eq!(author, "Doe, J.");

        let (author, _) =
            author_field(&ctx("rft.aulast=Doe&rft.auinit1=J&rft.auinitm=Q"));
        assert_eq!(author, "Doe, J. Q.");
    }

    #[test]
    fn test_author_first_name_beats_initials() {
        let (author, _) =
            author_field(&ctx("rft.aulast=Doe&rft.aufirst=Jane&rft.auinit1=J"));
        assert_eq!(author, "Doe, Jane");
    }

    #[test]
    fn test_author_empty_first_name_still_draws_the_comma() {
        // Presence ends the chain even with an empty value, and the comma
        // comes with it.
        let (author, _) = author_field(&ctx("rft.aulast=Mustermann&rft.aufirst="));
        assert_eq!(author, "Mustermann, ");

        let (author, _) = author_field(&ctx("rft.aulast=Doe&rft.aufirst=&rft.auinit=J."));
        assert_eq!(author, "Doe, ");
    }

    #[test]
    fn test_author_suffix_appended() {
        let (author, _) =
            author_field(&ctx("rft.aulast=King&rft.aufirst=Martin&rft.ausuffix=Jr"));
        assert_eq!(author, "King, Martin Jr");
    }

    #[test]
    fn test_co_author_filters_primary_author() {
        let record = ctx(
            "rft_val_fmt=mtx:book&rft.aulast=Mustermann&rft.aufirst=Max\
             &rft.au=Max+Mustermann&rft.au=Erika+Beispiel",
        )
        .to_record();
        assert_eq!(record.author, "Mustermann, Max");
        assert_eq!(record.co_author, "Erika Beispiel");
    }

    #[test]
    fn test_co_author_keeps_repeated_entries() {
        let record = ctx("rft.aulast=Mustermann&rft.aufirst=Max&rft.au=a&rft.au=a")
            .to_record();
        assert_eq!(record.co_author, "a, a");
    }

    #[test]
    fn test_co_author_empty_when_no_author_assembled() {
        // With no rft.aulast the retained name parts are empty strings and
        // the containment filter matches every entry.
        let record = ctx("rft.au=Erika+Beispiel&rft.au=Hans+Wurst").to_record();
        assert_eq!(record.author, "-");
        assert_eq!(record.co_author, "");
    }

    #[test]
    fn test_pages_chain() {
        assert_eq!(pages(&ctx("rft.pages=1-20&rft.spage=5")), "1-20");
        assert_eq!(pages(&ctx("rft.spage=5&rft.epage=10")), "5-10");
        assert_eq!(pages(&ctx("rft.spage=5")), "5");
        assert_eq!(pages(&ctx("rft.epage=10")), "");
    }

    #[test]
    fn test_int_values() {
        assert_eq!(int_value(&ctx("rft.volume=124"), "rft.volume"), 124);
        assert_eq!(int_value(&ctx("rft.volume=abc"), "rft.volume"), 0);
        assert_eq!(int_value(&ctx("x=1"), "rft.volume"), 0);
    }

    #[test]
    fn test_book_title_chain() {
        assert_eq!(ctx("rft.btitle=B&rft.atitle=A&rft.title=T").to_record().title, "B");
        assert_eq!(ctx("rft.atitle=A&rft.title=T").to_record().title, "A");
        assert_eq!(ctx("rft.title=T").to_record().title, "T");
        assert_eq!(ctx("x=1").to_record().title, "");
    }

    #[test]
    fn test_article_publication_chain() {
        let record = ctx("rft_val_fmt=mtx:journal&rft.jtitle=J&rft.stitle=S").to_record();
        assert_eq!(record.publication, "J");
        let record = ctx("rft_val_fmt=mtx:journal&rft.stitle=S").to_record();
        assert_eq!(record.publication, "S");
    }

    #[test]
    fn test_extra_text_order_and_trim() {
        let record = ctx(
            "rft_val_fmt=mtx:book&rft.series=Reihe&rft.edition=2nd\
             &rft.date=2005&rft.genre=book&rft.isbn=3-16-148410-X",
        )
        .to_record();
        assert_eq!(
            record.text,
            "Edition: 2nd, Series: Reihe, Date: 2005, ISBN: 3-16-148410-X, Genre: book"
        );
    }

    #[test]
    fn test_extra_text_empty_without_sources() {
        assert_eq!(ctx("rft.btitle=X").to_record().text, "");
    }

    #[test]
    fn test_article_extra_text_order() {
        let record = ctx(
            "rft_val_fmt=mtx:journal&rft.chron=1st+quater&rft.ssn=winter\
             &rft.date=2005&rft.genre=issue",
        )
        .to_record();
        assert_eq!(
            record.text,
            "Chronology: 1st quater, Season: winter, Date: 2005, Genre: issue"
        );
    }

    #[test]
    fn test_book_year_left_empty() {
        let record = ctx("rft_val_fmt=mtx:book&rft.date=2005").to_record();
        assert_eq!(record.year, "");
        assert_eq!(record.text, "Date: 2005");
    }
}
