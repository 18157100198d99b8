//! Slot memory carried across turns
//!
//! All slot text passes through [`clean_slot`] before it is stored or used,
//! so a sentinel such as `"null"` can never masquerade as a city or food.

use serde::Serialize;

use crate::config::Vocabulary;
use crate::conversation::Intent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    City,
    Food,
}

/// Trim a slot value and drop it if it is a sentinel
pub fn clean_slot(value: Option<&str>, vocabulary: &Vocabulary) -> Option<String> {
    let value = value?.trim();
    if vocabulary.is_sentinel(value) {
        None
    } else {
        Some(value.to_string())
    }
}

/// Capitalise the first letter of every word, lower-case the rest.
///
/// A word starts after any non-alphabetic character, so `"new york"` becomes
/// `"New York"` and `"o'hare"` becomes `"O'Hare"`.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_alpha = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

/// What the session remembers between turns
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionMemory {
    last_city: Option<String>,
    last_food: Option<String>,
    last_action: Option<Intent>,
}

impl SessionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a slot only when `value` carries real content
    pub fn update(&mut self, slot: Slot, value: Option<&str>, vocabulary: &Vocabulary) {
        let Some(value) = clean_slot(value, vocabulary) else {
            return;
        };
        match slot {
            Slot::City => self.last_city = Some(value),
            Slot::Food => self.last_food = Some(value),
        }
    }

    pub fn get(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::City => self.last_city.as_deref(),
            Slot::Food => self.last_food.as_deref(),
        }
    }

    pub fn city(&self) -> Option<&str> {
        self.get(Slot::City)
    }

    pub fn food(&self) -> Option<&str> {
        self.get(Slot::Food)
    }

    pub fn last_action(&self) -> Option<Intent> {
        self.last_action
    }

    pub fn set_last_action(&mut self, action: Intent) {
        self.last_action = Some(action);
    }
}
