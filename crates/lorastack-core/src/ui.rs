//! UI hints for the presentation layer
//!
//! Each processed slot gets a checkbox group of trigger words rendered under
//! its weight control. The payload is write-only from this side: the user's
//! choice comes back on the next run through [`crate::PriorSelections`].

use crate::slot::weight_field;
use crate::tags::TagSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trigger-word choices for a single slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiChoice {
    /// Form field the widget is rendered under
    pub anchor: String,
    /// Every candidate trigger word
    pub choices: TagSet,
    /// Trigger words currently checked
    pub selected: TagSet,
}

impl UiChoice {
    pub fn new(index: usize, choices: TagSet, selected: TagSet) -> Self {
        Self {
            anchor: weight_field(index),
            choices,
            selected,
        }
    }
}

/// Key the payload uses for a slot's choices
pub fn triggers_key(index: usize) -> String {
    format!("lora{index}_triggers")
}

/// Map of `lora{i}_triggers` to the slot's choices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UiPayload(BTreeMap<String, UiChoice>);

impl UiPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the choices for a 1-based slot index
    pub fn insert(&mut self, index: usize, choice: UiChoice) {
        self.0.insert(triggers_key(index), choice);
    }

    /// Look up the choices for a 1-based slot index
    pub fn get(&self, index: usize) -> Option<&UiChoice> {
        self.0.get(&triggers_key(index))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &UiChoice)> {
        self.0.iter()
    }
}
