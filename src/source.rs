// 📂 Portfolio Source - Static declarative input (JSON or CSV)
//
// The source is read ONCE and turned into ordered buttons and cards.
// Every input failure (unreadable file, bad JSON, duplicate ids) surfaces
// here; the controller itself never fails.

use crate::card::{Card, CategoryButton};
use crate::category::Category;
use crate::filter::{FilterController, FilterView};
use anyhow::{bail, Context as AnyhowContext, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Label of the derived "show everything" button
pub const ALL_LABEL: &str = "All";

// ============================================================================
// RAW RECORDS
// ============================================================================

#[derive(Debug, Deserialize)]
struct PortfolioDocument {
    #[serde(default)]
    buttons: Vec<CategoryButton>,

    #[serde(default)]
    cards: Vec<CardRecord>,
}

#[derive(Debug, Deserialize)]
struct CardRecord {
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

/// One CSV row: tags are a space-separated class list
#[derive(Debug, Deserialize)]
struct CsvCardRecord {
    id: String,
    title: String,
    #[serde(default)]
    tags: String,
    #[serde(default)]
    description: Option<String>,
}

impl From<CardRecord> for Card {
    fn from(record: CardRecord) -> Self {
        let card = Card::new(record.id, record.title, record.tags);
        match record.description {
            Some(d) if !d.trim().is_empty() => card.with_description(d),
            _ => card,
        }
    }
}

impl From<CsvCardRecord> for Card {
    fn from(record: CsvCardRecord) -> Self {
        let card = Card::new(record.id, record.title, record.tags.split_whitespace());
        match record.description {
            Some(d) if !d.trim().is_empty() => card.with_description(d),
            _ => card,
        }
    }
}

// ============================================================================
// PORTFOLIO
// ============================================================================

/// Buttons and cards, validated and ready for a controller
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub buttons: Vec<CategoryButton>,
    pub cards: Vec<Card>,
}

impl Portfolio {
    pub fn new(buttons: Vec<CategoryButton>, cards: Vec<Card>) -> Result<Self> {
        validate_cards(&cards)?;
        Ok(Portfolio { buttons, cards })
    }

    /// Parse a JSON document `{ "buttons": [...], "cards": [...] }`
    pub fn from_json_str(content: &str) -> Result<Self> {
        let doc: PortfolioDocument =
            serde_json::from_str(content).context("Failed to parse portfolio JSON")?;

        let cards: Vec<Card> = doc.cards.into_iter().map(Card::from).collect();
        Portfolio::new(doc.buttons, cards)
    }

    /// Parse CSV rows `id,title,tags,description`
    ///
    /// CSV carries no buttons, so they are derived from the tags.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);

        let mut cards = Vec::new();
        for (row, result) in rdr.deserialize::<CsvCardRecord>().enumerate() {
            let record = result.with_context(|| format!("Failed to deserialize card at row {}", row + 1))?;
            cards.push(Card::from(record));
        }

        let buttons = derive_buttons(&cards);
        Portfolio::new(buttons, cards)
    }

    /// Load from a file, picking the format from its extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let portfolio = match extension.as_deref() {
            Some("json") => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read portfolio file: {:?}", path))?;
                Portfolio::from_json_str(&content)
                    .with_context(|| format!("Invalid portfolio file: {:?}", path))?
            }
            Some("csv") => {
                let file = fs::File::open(path)
                    .with_context(|| format!("Failed to open portfolio file: {:?}", path))?;
                Portfolio::from_csv_reader(file)
                    .with_context(|| format!("Invalid portfolio file: {:?}", path))?
            }
            _ => bail!("Unsupported portfolio format (expected .json or .csv): {:?}", path),
        };

        debug!(
            path = %path.display(),
            buttons = portfolio.buttons.len(),
            cards = portfolio.cards.len(),
            "portfolio loaded"
        );
        Ok(portfolio)
    }

    pub fn into_controller(self) -> FilterController {
        FilterController::new(self.buttons, self.cards)
    }

    pub fn into_controller_with_view<V: FilterView>(self, view: V) -> FilterController<V> {
        FilterController::with_view(self.buttons, self.cards, view)
    }
}

/// Wildcard button first, then one button per distinct tag (first-seen order)
pub fn derive_buttons(cards: &[Card]) -> Vec<CategoryButton> {
    let mut buttons = vec![CategoryButton::wildcard(ALL_LABEL)];
    let mut seen: HashSet<&str> = HashSet::new();

    for card in cards {
        for tag in card.tags() {
            if seen.insert(tag.as_str()) {
                buttons.push(CategoryButton::new(button_label(tag), Category::Tag(tag.clone())));
            }
        }
    }

    buttons
}

/// "filter-web" → "Web", "case-study" → "Case Study"
fn button_label(tag: &str) -> String {
    let name = tag.strip_prefix("filter-").unwrap_or(tag);
    name.split(|c: char| c == '-' || c == '_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn validate_cards(cards: &[Card]) -> Result<()> {
    let mut ids: HashSet<&str> = HashSet::new();
    for (index, card) in cards.iter().enumerate() {
        if card.id.trim().is_empty() {
            bail!("Card #{} has an empty id", index + 1);
        }
        if !ids.insert(card.id.as_str()) {
            bail!("Duplicate card id: {}", card.id);
        }
    }
    Ok(())
}

// ============================================================================
// READINESS (for deferred initialization)
// ============================================================================

#[derive(Debug)]
pub enum SourceState {
    /// Input is available and valid
    Ready(Portfolio),

    /// Input is not there yet; worth asking again later
    Pending(String),
}

/// Check whether the portfolio file exists yet, loading it if so
///
/// A missing file is Pending; a present but invalid file is an error.
pub fn probe_path<P: AsRef<Path>>(path: P) -> Result<SourceState> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(SourceState::Pending(format!("{:?} does not exist yet", path)));
    }
    Ok(SourceState::Ready(Portfolio::from_path(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SAMPLE_JSON: &str = r#"{
        "buttons": [
            { "label": "All", "filter": "*" },
            { "label": "Web", "filter": ".filter-web" },
            { "label": "App", "filter": ".filter-app" }
        ],
        "cards": [
            { "id": "1", "title": "Shop", "tags": ["filter-web"] },
            { "id": "2", "title": "Tracker", "tags": [".filter-app"], "description": "iOS" },
            { "id": "3", "title": "Dashboard", "tags": ["filter-web", "filter-app"] }
        ]
    }"#;

    const SAMPLE_CSV: &str = "id,title,tags,description\n\
        1,Shop,filter-web,\n\
        2,Tracker,filter-app,Habit tracker\n\
        3,Dashboard,filter-web filter-app,\n\
        4,Sketches,,\n";

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("portfolio-filter-source-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_from_json_str() {
        let portfolio = Portfolio::from_json_str(SAMPLE_JSON).unwrap();

        assert_eq!(portfolio.buttons.len(), 3);
        assert_eq!(portfolio.buttons[0].category, Category::Wildcard);
        assert_eq!(portfolio.buttons[1].category, Category::tag("filter-web"));
        assert_eq!(portfolio.cards.len(), 3);
        assert_eq!(portfolio.cards[1].tags(), &["filter-app".to_string()]);
        assert_eq!(portfolio.cards[1].description.as_deref(), Some("iOS"));
    }

    #[test]
    fn test_json_missing_sections_is_empty_portfolio() {
        let portfolio = Portfolio::from_json_str("{}").unwrap();
        assert!(portfolio.buttons.is_empty());
        assert!(portfolio.cards.is_empty());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(Portfolio::from_json_str("{ not json").is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"{ "cards": [
            { "id": "1", "title": "A" },
            { "id": "1", "title": "B" }
        ] }"#;
        let err = Portfolio::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("Duplicate card id"));
    }

    #[test]
    fn test_empty_id_rejected() {
        let json = r#"{ "cards": [{ "id": "  ", "title": "A" }] }"#;
        assert!(Portfolio::from_json_str(json).is_err());
    }

    #[test]
    fn test_from_csv_reader_derives_buttons() {
        let portfolio = Portfolio::from_csv_reader(SAMPLE_CSV.as_bytes()).unwrap();

        assert_eq!(portfolio.cards.len(), 4);
        assert_eq!(
            portfolio.cards[2].tags(),
            &["filter-web".to_string(), "filter-app".to_string()]
        );
        assert!(portfolio.cards[3].tags().is_empty());
        assert_eq!(portfolio.cards[1].description.as_deref(), Some("Habit tracker"));
        assert_eq!(portfolio.cards[0].description, None);

        let labels: Vec<&str> = portfolio.buttons.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["All", "Web", "App"]);
        assert_eq!(portfolio.buttons[2].category, Category::tag("filter-app"));
    }

    #[test]
    fn test_button_label() {
        assert_eq!(button_label("filter-web"), "Web");
        assert_eq!(button_label("case-study"), "Case Study");
        assert_eq!(button_label("design"), "Design");
    }

    #[test]
    fn test_from_path_dispatches_on_extension() {
        let json = temp_file("portfolio.json", SAMPLE_JSON);
        let csv = temp_file("portfolio.CSV", SAMPLE_CSV);
        let txt = temp_file("portfolio.txt", SAMPLE_JSON);

        assert_eq!(Portfolio::from_path(&json).unwrap().cards.len(), 3);
        assert_eq!(Portfolio::from_path(&csv).unwrap().cards.len(), 4);

        let err = Portfolio::from_path(&txt).unwrap_err();
        assert!(err.to_string().contains("Unsupported portfolio format"));
    }

    #[test]
    fn test_probe_path() {
        let missing = std::env::temp_dir().join("portfolio-filter-definitely-missing.json");
        assert!(matches!(probe_path(&missing).unwrap(), SourceState::Pending(_)));

        let present = temp_file("probe.json", SAMPLE_JSON);
        assert!(matches!(probe_path(&present).unwrap(), SourceState::Ready(_)));

        let broken = temp_file("broken.json", "[");
        assert!(probe_path(&broken).is_err());
    }

    #[test]
    fn test_into_controller() {
        let mut controller = Portfolio::from_json_str(SAMPLE_JSON).unwrap().into_controller();
        controller.select_category(Category::parse(".filter-web"));

        let visible: Vec<&str> = controller.visible_cards().into_iter().map(|c| c.id.as_str()).collect();
        assert_eq!(visible, vec!["1", "3"]);
        assert_eq!(controller.selected_button(), Some(1));
    }
}
