//! Core data types shared across the pipeline and sync layers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered list of ingredient tokens feeding recipe generation.
///
/// Both the normalizer and the user edit this list. Duplicates are allowed
/// and insertion order is preserved for display. An empty set is valid
/// input to recipe generation and means "no ingredient constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(Vec<String>);

impl TagSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, tag: impl Into<String>) {
        self.0.push(tag.into());
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index < self.0.len() {
            Some(self.0.remove(index))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Parse a comma-separated token list. Tokens are trimmed and empty
    /// tokens are dropped.
    pub fn from_comma_separated(s: &str) -> Self {
        Self(
            s.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        Self(tags)
    }
}

impl FromIterator<String> for TagSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for TagSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Star rating in the range 0..=5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stars(u8);

impl Stars {
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, String> {
        if value > Self::MAX {
            Err(format!("star rating {} out of range 0..=5", value))
        } else {
            Ok(Self(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Stars {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Stars> for u8 {
    fn from(stars: Stars) -> u8 {
        stars.0
    }
}

/// Cuisine constraint for recipe generation.
///
/// `Unspecified` is a real value on the wire, not an omitted field: the
/// generation service expects the sentinel label verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cuisine {
    Japanese,
    French,
    Chinese,
    Italian,
    Mexican,
    Indian,
    Thai,
    Spanish,
    American,
    #[default]
    Unspecified,
}

impl Cuisine {
    /// All selectable cuisines, sentinel last.
    pub const ALL: &'static [Cuisine] = &[
        Cuisine::Japanese,
        Cuisine::French,
        Cuisine::Chinese,
        Cuisine::Italian,
        Cuisine::Mexican,
        Cuisine::Indian,
        Cuisine::Thai,
        Cuisine::Spanish,
        Cuisine::American,
        Cuisine::Unspecified,
    ];

    /// Wire label sent to the generation service.
    pub fn as_str(self) -> &'static str {
        match self {
            Cuisine::Japanese => "japanese",
            Cuisine::French => "french",
            Cuisine::Chinese => "chinese",
            Cuisine::Italian => "italian",
            Cuisine::Mexican => "mexican",
            Cuisine::Indian => "indian",
            Cuisine::Thai => "thai",
            Cuisine::Spanish => "spanish",
            Cuisine::American => "american",
            Cuisine::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for Cuisine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether generation may reach beyond the listed ingredients.
///
/// The wire encoding is inverted relative to the flag's natural reading:
/// `0` means "use only the listed ingredients", `1` means "other
/// ingredients are allowed". The upstream contract fixes this.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Exclusivity {
    #[default]
    OnlyListedIngredients,
    AllowOtherIngredients,
}

impl Exclusivity {
    pub fn wire_code(self) -> u8 {
        match self {
            Exclusivity::OnlyListedIngredients => 0,
            Exclusivity::AllowOtherIngredients => 1,
        }
    }
}

/// User-chosen constraints for a generation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecipeConstraints {
    pub cuisine: Cuisine,
    pub exclusivity: Exclusivity,
}

/// Time-ordered review key, milliseconds since the Unix epoch.
///
/// Allocated by [`crate::sync::ReviewStore`]; strictly increasing per
/// writer, so inserts order chronologically without a sequence counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReviewId(pub i64);

impl ReviewId {
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Parse a store key back into an id. Keys that are not integer
    /// millisecond timestamps are rejected.
    pub fn parse_key(key: &str) -> Option<Self> {
        key.parse::<i64>().ok().map(Self)
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A review as submitted, before the store assigns its key.
///
/// Field names follow the shared feed's record format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDraft {
    pub recipe_text: String,
    #[serde(rename = "mediaURL")]
    pub media_url: String,
    pub comment: String,
    pub star_delicious: Stars,
    pub star_easy: Stars,
    pub star_convenience: Stars,
}

/// A stored review: the draft record plus its feed key.
///
/// Immutable once written; there is no edit or delete path.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: ReviewId,
    pub recipe_text: String,
    pub media_url: String,
    pub comment: String,
    pub star_delicious: Stars,
    pub star_easy: Stars,
    pub star_convenience: Stars,
}

impl Review {
    pub fn from_record(id: ReviewId, record: ReviewDraft) -> Self {
        Self {
            id,
            recipe_text: record.recipe_text,
            media_url: record.media_url,
            comment: record.comment,
            star_delicious: record.star_delicious,
            star_easy: record.star_easy,
            star_convenience: record.star_convenience,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stars_range() {
        assert!(Stars::new(5).is_ok());
        assert!(Stars::new(0).is_ok());
        assert!(Stars::new(6).is_err());
    }

    #[test]
    fn test_tag_set_from_comma_separated() {
        let tags = TagSet::from_comma_separated("egg, milk , ,flour");
        assert_eq!(tags.as_slice(), &["egg", "milk", "flour"]);
    }

    #[test]
    fn test_tag_set_preserves_order_and_duplicates() {
        let mut tags = TagSet::new();
        tags.push("egg");
        tags.push("milk");
        tags.push("egg");
        assert_eq!(tags.as_slice(), &["egg", "milk", "egg"]);
    }

    #[test]
    fn test_exclusivity_wire_encoding() {
        assert_eq!(Exclusivity::OnlyListedIngredients.wire_code(), 0);
        assert_eq!(Exclusivity::AllowOtherIngredients.wire_code(), 1);
    }

    #[test]
    fn test_unspecified_cuisine_label() {
        assert_eq!(Cuisine::Unspecified.as_str(), "unspecified");
    }

    #[test]
    fn test_review_record_wire_names() {
        let draft = ReviewDraft {
            recipe_text: "Omelette".to_string(),
            media_url: "mem://images/1.jpg".to_string(),
            comment: "good".to_string(),
            star_delicious: Stars::new(5).unwrap(),
            star_easy: Stars::new(4).unwrap(),
            star_convenience: Stars::new(3).unwrap(),
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["recipeText"], "Omelette");
        assert_eq!(value["mediaURL"], "mem://images/1.jpg");
        assert_eq!(value["starDelicious"], 5);
    }
}
