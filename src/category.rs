// 🏷️ Category - Filter labels for the portfolio grid
//
// A category is either the reserved WILDCARD (matches every card) or an
// opaque tag. Page markup writes them as selectors: "*" for everything,
// ".filter-web" for a tag, so parsing accepts both spellings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Selector text for the wildcard category
pub const WILDCARD_SELECTOR: &str = "*";

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Matches every card
    Wildcard,

    /// A single tag, stored without the leading '.'
    Tag(String),
}

impl Category {
    /// Build a tag category from a bare name or a ".name" selector
    pub fn tag(name: impl AsRef<str>) -> Self {
        Category::parse(name.as_ref())
    }

    /// Parse a filter selector
    ///
    /// "*" and "" are the wildcard; one leading '.' is stripped from tags.
    pub fn parse(selector: &str) -> Self {
        let selector = selector.trim();
        if selector.is_empty() || selector == WILDCARD_SELECTOR {
            return Category::Wildcard;
        }

        let name = selector.strip_prefix('.').unwrap_or(selector);
        if name.is_empty() {
            Category::Wildcard
        } else {
            Category::Tag(name.to_string())
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Category::Wildcard)
    }

    /// Tag name, or None for the wildcard
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Category::Wildcard => None,
            Category::Tag(name) => Some(name.as_str()),
        }
    }

    /// Selector form ("*" or ".tag")
    pub fn selector(&self) -> String {
        match self {
            Category::Wildcard => WILDCARD_SELECTOR.to_string(),
            Category::Tag(name) => format!(".{}", name),
        }
    }

    /// Does this category admit a card carrying `tags`?
    pub fn admits<'a, I>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        match self {
            Category::Wildcard => true,
            Category::Tag(name) => tags.into_iter().any(|t| t == name),
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Wildcard
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Wildcard => write!(f, "All"),
            Category::Tag(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for Category {
    fn from(selector: &str) -> Self {
        Category::parse(selector)
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.selector())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let selector = String::deserialize(deserializer)?;
        Ok(Category::parse(&selector))
    }
}
