//! In-memory address bar.
//!
//! Tracks the current URL plus a history stack so tests can tell a
//! history replace apart from a push.

use reqwest::Url;
use std::sync::Mutex;

use crate::domain::foundation::ValidationError;
use crate::ports::PageLocation;

#[derive(Debug)]
pub struct InMemoryLocation {
    state: Mutex<LocationState>,
}

#[derive(Debug)]
struct LocationState {
    history: Vec<Url>,
    replacements: usize,
}

impl InMemoryLocation {
    /// Opens a page at `url`.
    pub fn parse(url: &str) -> Result<Self, ValidationError> {
        let url = Url::parse(url)
            .map_err(|e| ValidationError::invalid_format("url", e.to_string()))?;
        Ok(Self {
            state: Mutex::new(LocationState {
                history: vec![url],
                replacements: 0,
            }),
        })
    }

    /// Current address bar contents.
    pub fn current_url(&self) -> String {
        self.with_state(|s| s.history.last().map(Url::to_string).unwrap_or_default())
    }

    /// Number of history entries.
    pub fn history_len(&self) -> usize {
        self.with_state(|s| s.history.len())
    }

    /// Number of history replacements performed.
    pub fn replacements(&self) -> usize {
        self.with_state(|s| s.replacements)
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut LocationState) -> R) -> R {
        match self.state.lock() {
            Ok(mut state) => f(&mut state),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl PageLocation for InMemoryLocation {
    fn query_param(&self, name: &str) -> Option<String> {
        self.with_state(|s| {
            s.history.last().and_then(|url| {
                url.query_pairs()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| value.into_owned())
                    .filter(|value| !value.trim().is_empty())
            })
        })
    }

    fn replace_without_param(&self, name: &str) {
        self.with_state(|s| {
            let Some(current) = s.history.last_mut() else {
                return;
            };

            let kept: Vec<(String, String)> = current
                .query_pairs()
                .filter(|(key, _)| key != name)
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();

            if kept.is_empty() {
                current.set_query(None);
            } else {
                current.query_pairs_mut().clear().extend_pairs(kept);
            }
            s.replacements += 1;
        })
    }
}
