//! Token class remapping
//!
//! The theme is an opaque `class → class` table handed to the worker once at
//! startup (typically mapping token classes to hashed CSS module names).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Theme {
    classes: HashMap<String, String>,
}

impl Theme {
    pub fn new(classes: HashMap<String, String>) -> Self {
        Self { classes }
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// The mapped name of `class`, or `class` itself when unmapped
    pub fn class<'a>(&'a self, class: &'a str) -> &'a str {
        self.classes.get(class).map(String::as_str).unwrap_or(class)
    }

    pub fn apply(&self, classes: Vec<String>) -> Vec<String> {
        if self.classes.is_empty() {
            return classes;
        }
        classes
            .into_iter()
            .map(|class| self.class(&class).to_string())
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Theme {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            classes: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
