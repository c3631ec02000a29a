//! Name matching between recipe ingredients and inventory items.
//!
//! The default policy is a case-insensitive, bidirectional substring check:
//! `"Eggs"` matches `"Free range eggs"` and `"Baby spinach"` matches
//! `"Spinach"`. It tolerates naming drift but can pair unrelated items
//! (`"Pea"` matches `"Peanut Butter"`). Swap in another [`NameMatcher`] when
//! that matters.

use std::collections::HashMap;
use std::fmt::Debug;

/// Decides whether an ingredient name refers to an inventory item
pub trait NameMatcher: Debug + Send + Sync {
    fn matches(&self, ingredient: &str, item: &str) -> bool;
}

/// Bidirectional case-insensitive substring matching
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl NameMatcher for SubstringMatcher {
    fn matches(&self, ingredient: &str, item: &str) -> bool {
        let ingredient = ingredient.trim().to_lowercase();
        let item = item.trim().to_lowercase();
        if ingredient.is_empty() || item.is_empty() {
            return false;
        }
        ingredient.contains(&item) || item.contains(&ingredient)
    }
}

/// Case-insensitive equality
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl NameMatcher for ExactMatcher {
    fn matches(&self, ingredient: &str, item: &str) -> bool {
        let ingredient = ingredient.trim();
        !ingredient.is_empty() && ingredient.eq_ignore_ascii_case(item.trim())
    }
}

/// User-confirmed ingredient to item mapping, falling back to another matcher
/// for names that have no entry
#[derive(Debug)]
pub struct MappedMatcher<M: NameMatcher> {
    mapping: HashMap<String, String>,
    fallback: M,
}

impl<M: NameMatcher> MappedMatcher<M> {
    pub fn new(fallback: M) -> Self {
        Self {
            mapping: HashMap::new(),
            fallback,
        }
    }

    /// Map an ingredient name to the inventory item it should consume
    pub fn with_mapping(mut self, ingredient: &str, item: &str) -> Self {
        self.mapping
            .insert(ingredient.trim().to_lowercase(), item.trim().to_lowercase());
        self
    }
}

impl<M: NameMatcher> NameMatcher for MappedMatcher<M> {
    fn matches(&self, ingredient: &str, item: &str) -> bool {
        match self.mapping.get(&ingredient.trim().to_lowercase()) {
            Some(mapped) => *mapped == item.trim().to_lowercase(),
            None => self.fallback.matches(ingredient, item),
        }
    }
}
