//! Personality profile and reply formatting
//!
//! Raw outcome text never reaches the user directly. A profile maps category
//! names to template lists; the formatter classifies each outcome as error or
//! success by case-insensitive containment of "error", picks a template
//! through an injectable chooser, and renders the reply. The chooser is a
//! seam so tests can pin selection while production draws at random.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{NinesError, Result};

const CATEGORY_ACKNOWLEDGE: &str = "acknowledge";
const CATEGORY_ERROR: &str = "error";
const REQUIRED_CATEGORIES: [&str; 2] = [CATEGORY_ACKNOWLEDGE, CATEGORY_ERROR];

/// Template categories, read-only after load.
#[derive(Debug, Clone)]
pub struct PersonalityProfile {
    categories: HashMap<String, Vec<String>>,
}

impl PersonalityProfile {
    /// Load and validate a profile document.
    ///
    /// Fails explicitly when a required category is missing or empty rather
    /// than discovering the gap mid-reply.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| NinesError::Profile(format!("cannot read {}: {}", path.display(), e)))?;
        let categories: HashMap<String, Vec<String>> = serde_json::from_str(&content)
            .map_err(|e| NinesError::Profile(format!("cannot parse {}: {}", path.display(), e)))?;
        Self::from_categories(categories)
    }

    /// Build a profile from an in-memory category map.
    pub fn from_categories(categories: HashMap<String, Vec<String>>) -> Result<Self> {
        for required in REQUIRED_CATEGORIES {
            match categories.get(required) {
                None => {
                    return Err(NinesError::Profile(format!(
                        "missing required category '{}'",
                        required
                    )))
                }
                Some(templates) if templates.is_empty() => {
                    return Err(NinesError::Profile(format!(
                        "category '{}' has no templates",
                        required
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(Self { categories })
    }

    pub fn templates(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(|v| v.as_slice())
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }
}

/// Picks one template from a non-empty slice.
pub trait TemplateChooser: Send {
    fn choose<'a>(&mut self, templates: &'a [String]) -> Option<&'a String>;
}

/// Uniform random chooser; seedable for deterministic runs.
pub struct RandomChooser {
    rng: SmallRng,
}

impl RandomChooser {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomChooser {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateChooser for RandomChooser {
    fn choose<'a>(&mut self, templates: &'a [String]) -> Option<&'a String> {
        templates.choose(&mut self.rng)
    }
}

/// Renders outcome text into a personality-styled reply.
pub struct PersonalityFormatter {
    profile: PersonalityProfile,
    chooser: Box<dyn TemplateChooser>,
}

impl PersonalityFormatter {
    pub fn new(profile: PersonalityProfile, chooser: Box<dyn TemplateChooser>) -> Self {
        Self { profile, chooser }
    }

    /// Classify the outcome, pick a template, render the reply.
    ///
    /// Error templates substitute `{error}` with the outcome; acknowledge
    /// templates are joined with the outcome on a new line.
    pub fn format(&mut self, outcome: &str) -> Result<String> {
        let is_error = outcome.to_lowercase().contains("error");
        let category = if is_error {
            CATEGORY_ERROR
        } else {
            CATEGORY_ACKNOWLEDGE
        };

        let templates = self
            .profile
            .templates(category)
            .ok_or_else(|| NinesError::Profile(format!("missing category '{}'", category)))?;
        let template = self
            .chooser
            .choose(templates)
            .ok_or_else(|| NinesError::Profile(format!("category '{}' is empty", category)))?;

        if is_error {
            Ok(template.replace("{error}", outcome))
        } else {
            Ok(format!("{}\n{}", template, outcome))
        }
    }
}
