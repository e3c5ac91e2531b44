// 🗂️ Cards and Category Buttons - The static portfolio records
//
// Both are read once from the portfolio source and never change afterwards.
// A card's visibility is NOT stored here; it is derived by the controller.

use crate::category::Category;
use serde::{Deserialize, Serialize};

// ============================================================================
// CARD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// Stable identity (unique within a portfolio)
    pub id: String,

    /// Display title
    pub title: String,

    /// Optional short description
    pub description: Option<String>,

    /// Tags assigned at creation, without selector dots, no duplicates
    tags: Vec<String>,
}

impl Card {
    pub fn new<I, S>(id: impl Into<String>, title: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for tag in tags {
            // Tags are written like selectors or class names; WILDCARD is not a tag
            if let Category::Tag(name) = Category::parse(tag.as_ref()) {
                if !normalized.contains(&name) {
                    normalized.push(name);
                }
            }
        }

        Card {
            id: id.into(),
            title: title.into(),
            description: None,
            tags: normalized,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t == name)
    }

    /// Visibility rule: wildcard, or the category is one of our tags
    pub fn matches(&self, category: &Category) -> bool {
        category.admits(&self.tags)
    }
}

// ============================================================================
// CATEGORY BUTTON
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryButton {
    /// Text shown on the button (e.g. "All", "Web")
    pub label: String,

    /// Category this button selects
    #[serde(rename = "filter")]
    pub category: Category,
}

impl CategoryButton {
    pub fn new(label: impl Into<String>, category: Category) -> Self {
        CategoryButton {
            label: label.into(),
            category,
        }
    }

    pub fn wildcard(label: impl Into<String>) -> Self {
        CategoryButton::new(label, Category::Wildcard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_tags_are_normalized() {
        let card = Card::new("1", "Shop", [".filter-web", "filter-web", "filter-app", "*"]);
        assert_eq!(card.tags(), &["filter-web".to_string(), "filter-app".to_string()]);
        assert!(card.has_tag("filter-app"));
        assert!(!card.has_tag("*"));
    }

    #[test]
    fn test_card_matches() {
        let card = Card::new("1", "Shop", ["web"]);
        assert!(card.matches(&Category::Wildcard));
        assert!(card.matches(&Category::tag("web")));
        assert!(!card.matches(&Category::tag("app")));
    }

    #[test]
    fn test_untagged_card_only_matches_wildcard() {
        let card = Card::new("1", "Plain", Vec::<String>::new());
        assert!(card.tags().is_empty());
        assert!(card.matches(&Category::Wildcard));
        assert!(!card.matches(&Category::tag("web")));
    }

    #[test]
    fn test_button_deserializes_filter_selector() {
        let button: CategoryButton =
            serde_json::from_str(r#"{"label":"Web","filter":".filter-web"}"#).unwrap();
        assert_eq!(button.label, "Web");
        assert_eq!(button.category, Category::tag("filter-web"));
    }
}
