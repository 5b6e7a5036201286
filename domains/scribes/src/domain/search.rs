//! Scribe search and filtering

use serde::Deserialize;

use crate::domain::entities::ScribeProfile;

/// Picker value meaning "no filter"
pub const ANY: &str = "Any";

/// Most scribes returned by a nearby listing
pub const NEARBY_LIMIT: usize = 20;

/// Default search radius for nearby listings, in kilometres
pub const DEFAULT_RADIUS_KM: u32 = 50;

/// Search criteria from the find-scribe screen
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScribeSearch {
    /// Free text matched against name, subjects and languages
    #[serde(default, rename = "q")]
    pub query: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub available_only: bool,
}

/// `None`, blank and "Any" all mean no filter
fn selected(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != ANY)
}

impl ScribeSearch {
    /// Selected language, if any. Applied in `matches`; profiles store
    /// languages as a set, which equality filters cannot express.
    pub fn language_filter(&self) -> Option<&str> {
        selected(&self.language)
    }

    pub fn subject_filter(&self) -> Option<&str> {
        selected(&self.subject)
    }

    fn text(&self) -> Option<String> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether one profile satisfies every criterion
    pub fn matches(&self, scribe: &ScribeProfile) -> bool {
        if self.available_only && !scribe.is_available {
            return false;
        }

        if let Some(text) = self.text() {
            let hit = scribe.name.to_lowercase().contains(&text)
                || scribe
                    .subjects
                    .iter()
                    .any(|s| s.to_lowercase().contains(&text))
                || scribe
                    .languages
                    .iter()
                    .any(|l| l.to_lowercase().contains(&text));
            if !hit {
                return false;
            }
        }

        if let Some(language) = self.language_filter() {
            if !scribe.speaks(language) {
                return false;
            }
        }

        if let Some(subject) = self.subject_filter() {
            if !scribe.teaches(subject) {
                return false;
            }
        }

        true
    }
}

/// Apply `search` to a list of profiles, keeping input order
pub fn filter_scribes(scribes: Vec<ScribeProfile>, search: &ScribeSearch) -> Vec<ScribeProfile> {
    scribes.into_iter().filter(|s| search.matches(s)).collect()
}
