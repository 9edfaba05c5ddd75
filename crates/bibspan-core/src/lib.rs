use std::fmt;

use serde::{Serialize, Serializer};

/// Kind of text item a harvested record creates, with its stable wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemKind {
    #[default]
    Book,
    Article,
    Contribution,
    Webpage,
}

impl ItemKind {
    /// Numeric code used in the key-value serialization.
    pub fn code(self) -> u8 {
        match self {
            ItemKind::Book => 0,
            ItemKind::Article => 1,
            ItemKind::Contribution => 2,
            ItemKind::Webpage => 3,
        }
    }
}

impl Serialize for ItemKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// A normalized bibliographic record, ready to create a text item.
///
/// Every field is always present; producers leave fields they cannot fill at
/// their defaults (`""` or `0`). Field order matches the key-value wire form
/// emitted by [`TextRecord::to_kev`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextRecord {
    pub title: String,
    pub author: String,
    #[serde(rename = "coAuthor")]
    pub co_author: String,
    #[serde(rename = "subTitle")]
    pub sub_title: String,
    pub year: String,
    pub publication: String,
    pub pages: String,
    pub volume: i32,
    pub number: i32,
    pub publisher: String,
    pub place: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub text: String,
}

impl TextRecord {
    /// Serialize as a single `key=value&key=value` line.
    ///
    /// Values are emitted raw; consumers that need to round-trip values
    /// containing `&` or `=` must escape them first.
    pub fn to_kev(&self) -> String {
        format!(
            "title={}&author={}&coAuthor={}&subTitle={}&year={}&publication={}&pages={}\
             &volume={}&number={}&publisher={}&place={}&type={}&text={}",
            self.title,
            self.author,
            self.co_author,
            self.sub_title,
            self.year,
            self.publication,
            self.pages,
            self.volume,
            self.number,
            self.publisher,
            self.place,
            self.kind.code(),
            self.text
        )
    }
}

impl fmt::Display for TextRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_kev())
    }
}
