// 🔎 Filter Controller - One active category, derived visibility
//
// The controller holds the buttons, the cards and a single active category.
// Every selection recomputes ALL card visibilities and ALL button selections
// from scratch and pushes them to the attached view. Nothing is toggled
// incrementally, so presentation can never drift from the rule:
//
//     visible(card) == active is WILDCARD || active in card.tags

use crate::card::{Card, CategoryButton};
use crate::category::Category;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

// ============================================================================
// OUTPUT SURFACE
// ============================================================================

/// Receives visibility/selection signals from the controller
///
/// Rendering is up to the implementor (a table row, a CSS class, a flag).
pub trait FilterView {
    fn set_card_visible(&mut self, card: &Card, visible: bool);
    fn set_button_selected(&mut self, index: usize, button: &CategoryButton, selected: bool);
}

/// View that discards every signal (state is still queryable on the controller)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl FilterView for NullView {
    fn set_card_visible(&mut self, _card: &Card, _visible: bool) {}
    fn set_button_selected(&mut self, _index: usize, _button: &CategoryButton, _selected: bool) {}
}

/// View that remembers the last signal per card and per button
#[derive(Debug, Default, Clone)]
pub struct RecordingView {
    cards: HashMap<String, bool>,
    buttons: Vec<bool>,
    signals: usize,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last visibility pushed for a card id (None = never rendered)
    pub fn card_visible(&self, id: &str) -> Option<bool> {
        self.cards.get(id).copied()
    }

    /// Last selection pushed for a button index
    pub fn button_selected(&self, index: usize) -> Option<bool> {
        self.buttons.get(index).copied()
    }

    /// Total number of signals received
    pub fn signal_count(&self) -> usize {
        self.signals
    }
}

impl FilterView for RecordingView {
    fn set_card_visible(&mut self, card: &Card, visible: bool) {
        self.cards.insert(card.id.clone(), visible);
        self.signals += 1;
    }

    fn set_button_selected(&mut self, index: usize, _button: &CategoryButton, selected: bool) {
        if self.buttons.len() <= index {
            self.buttons.resize(index + 1, false);
        }
        self.buttons[index] = selected;
        self.signals += 1;
    }
}

// ============================================================================
// SNAPSHOT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardState {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonState {
    pub label: String,
    pub filter: Category,
    pub selected: bool,
}

/// Full presentation state at one moment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSnapshot {
    pub active: Category,
    pub visible_count: usize,
    pub total_count: usize,
    pub cards: Vec<CardState>,
    pub buttons: Vec<ButtonState>,
}

impl FilterSnapshot {
    pub fn visible_ids(&self) -> Vec<&str> {
        self.cards
            .iter()
            .filter(|c| c.visible)
            .map(|c| c.id.as_str())
            .collect()
    }

    pub fn selected_labels(&self) -> Vec<&str> {
        self.buttons
            .iter()
            .filter(|b| b.selected)
            .map(|b| b.label.as_str())
            .collect()
    }
}

// ============================================================================
// FILTER CONTROLLER
// ============================================================================

pub struct FilterController<V: FilterView = NullView> {
    buttons: Vec<CategoryButton>,
    cards: Vec<Card>,
    active: Category,
    view: V,
}

impl FilterController<NullView> {
    /// Build a controller with no attached view
    pub fn new(buttons: Vec<CategoryButton>, cards: Vec<Card>) -> Self {
        FilterController::with_view(buttons, cards, NullView)
    }
}

impl<V: FilterView> FilterController<V> {
    /// Build a controller and push the initial (everything visible) render
    pub fn with_view(buttons: Vec<CategoryButton>, cards: Vec<Card>, view: V) -> Self {
        let mut controller = FilterController {
            buttons,
            cards,
            active: Category::Wildcard,
            view,
        };

        info!(
            buttons = controller.buttons.len(),
            cards = controller.cards.len(),
            "filter controller initialized"
        );
        controller.render();
        controller
    }

    /// Make `category` the single active category and re-render everything
    ///
    /// Any category is accepted. One matching no card hides every card;
    /// one carried by no button leaves every button unselected.
    pub fn select_category(&mut self, category: Category) {
        if !self.buttons.iter().any(|b| b.category == category) {
            warn!(category = %category.selector(), "selected category has no button");
        }

        self.active = category;
        self.render();

        info!(
            category = %self.active.selector(),
            visible = self.visible_count(),
            total = self.cards.len(),
            "category selected"
        );
    }

    /// Select the category carried by the button at `index`
    ///
    /// Returns false (and changes nothing) when there is no such button.
    pub fn select_button(&mut self, index: usize) -> bool {
        match self.buttons.get(index) {
            Some(button) => {
                let category = button.category.clone();
                self.select_category(category);
                true
            }
            None => false,
        }
    }

    /// Total reassignment of every card and button signal
    fn render(&mut self) {
        let mut shown = 0;
        for card in &self.cards {
            let visible = card.matches(&self.active);
            if visible {
                shown += 1;
            }
            self.view.set_card_visible(card, visible);
        }

        for (index, button) in self.buttons.iter().enumerate() {
            let selected = button.category == self.active;
            self.view.set_button_selected(index, button, selected);
        }

        debug!(shown, hidden = self.cards.len() - shown, "visibility pass complete");
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn active(&self) -> &Category {
        &self.active
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn buttons(&self) -> &[CategoryButton] {
        &self.buttons
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn is_visible(&self, card: &Card) -> bool {
        card.matches(&self.active)
    }

    pub fn visible_cards(&self) -> Vec<&Card> {
        self.cards.iter().filter(|c| self.is_visible(c)).collect()
    }

    pub fn hidden_cards(&self) -> Vec<&Card> {
        self.cards.iter().filter(|c| !self.is_visible(c)).collect()
    }

    pub fn visible_count(&self) -> usize {
        self.cards.iter().filter(|c| self.is_visible(c)).count()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.buttons
            .get(index)
            .map(|b| b.category == self.active)
            .unwrap_or(false)
    }

    /// Index of the first button carrying the active category
    pub fn selected_button(&self) -> Option<usize> {
        self.buttons.iter().position(|b| b.category == self.active)
    }

    /// Distinct tags present on cards, in first-seen order
    pub fn categories(&self) -> Vec<Category> {
        let mut seen: Vec<Category> = Vec::new();
        for card in &self.cards {
            for tag in card.tags() {
                let category = Category::Tag(tag.clone());
                if !seen.contains(&category) {
                    seen.push(category);
                }
            }
        }
        seen
    }

    pub fn snapshot(&self) -> FilterSnapshot {
        let cards: Vec<CardState> = self
            .cards
            .iter()
            .map(|card| CardState {
                id: card.id.clone(),
                title: card.title.clone(),
                description: card.description.clone(),
                tags: card.tags().to_vec(),
                visible: self.is_visible(card),
            })
            .collect();

        let buttons = self
            .buttons
            .iter()
            .map(|button| ButtonState {
                label: button.label.clone(),
                filter: button.category.clone(),
                selected: button.category == self.active,
            })
            .collect();

        FilterSnapshot {
            active: self.active.clone(),
            visible_count: cards.iter().filter(|c| c.visible).count(),
            total_count: cards.len(),
            cards,
            buttons,
        }
    }
}

impl<V: FilterView> fmt::Debug for FilterController<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterController")
            .field("active", &self.active)
            .field("buttons", &self.buttons.len())
            .field("cards", &self.cards.len())
            .finish()
    }
}

// ============================================================================
// SHARED HANDLE
// ============================================================================

/// Controller behind a mutex, for dispatchers that may run concurrently
///
/// Each `select` holds the lock for the whole visibility pass, so one
/// invocation always completes before the next begins.
pub struct SharedFilter<V: FilterView = NullView> {
    inner: Arc<Mutex<FilterController<V>>>,
}

impl<V: FilterView> Clone for SharedFilter<V> {
    fn clone(&self) -> Self {
        SharedFilter {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: FilterView> SharedFilter<V> {
    pub fn new(controller: FilterController<V>) -> Self {
        SharedFilter {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    // The controller is a single register; a panic mid-pass cannot leave it
    // half-updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, FilterController<V>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn select(&self, category: Category) -> FilterSnapshot {
        let mut controller = self.lock();
        controller.select_category(category);
        controller.snapshot()
    }

    pub fn snapshot(&self) -> FilterSnapshot {
        self.lock().snapshot()
    }

    /// Run a read-only query against the controller
    pub fn with<R>(&self, f: impl FnOnce(&FilterController<V>) -> R) -> R {
        f(&self.lock())
    }
}
