//! Per-screen settings records.
//!
//! A record is created empty when its screen is first entered, edited on
//! every field change, and frozen once navigation moves past the screen.

use std::collections::BTreeMap;

use zeroize::Zeroize;

use crate::types::ScreenId;

/// Fields whose values are wiped when replaced or dropped.
pub fn is_sensitive(field: &str) -> bool {
    field.contains("password")
}

/// Field values collected by one wizard screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenRecord {
    screen: ScreenId,
    fields: BTreeMap<String, String>,
    frozen: bool,
}

impl ScreenRecord {
    pub fn new(screen: ScreenId) -> Self {
        Self {
            screen,
            fields: BTreeMap::new(),
            frozen: false,
        }
    }

    pub fn screen(&self) -> ScreenId {
        self.screen
    }

    /// Value of `field`, or `None` when it was never set.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Value of `field` with surrounding whitespace removed; empty when unset.
    pub fn trimmed(&self, field: &str) -> &str {
        self.get(field).map(str::trim).unwrap_or("")
    }

    /// True when `field` is absent or blank.
    pub fn is_blank(&self, field: &str) -> bool {
        self.trimmed(field).is_empty()
    }

    /// Set a field. Returns `false` (and leaves the record untouched) when frozen.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) -> bool {
        if self.frozen {
            return false;
        }
        let field = field.into();
        let sensitive = is_sensitive(&field);
        if let Some(mut previous) = self.fields.insert(field, value.into()) {
            if sensitive {
                previous.zeroize();
            }
        }
        true
    }

    /// Builder-style setter, used when assembling records outside the wizard.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
    }

    pub(crate) fn thaw(&mut self) {
        self.frozen = false;
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl ScreenRecord {
    /// Overwrite every sensitive value in place, leaving it empty.
    pub(crate) fn wipe_secrets(&mut self) {
        for (name, value) in self.fields.iter_mut() {
            if is_sensitive(name) {
                value.zeroize();
            }
        }
    }
}

impl Drop for ScreenRecord {
    fn drop(&mut self) {
        self.wipe_secrets();
    }
}
