//! Catalog of localizable names baked into emitted code.

use std::collections::HashMap;

/// Key → text catalog for the handful of names the compiler writes into
/// instructions: the `Bool` type name, the `TIMEOUT` constructor, and
/// error-message keys.
///
/// Lookup falls back to the key itself. Error-message keys such as
/// `errmsg:switch-does-not-match` have no default entry, so they reach the
/// VM untranslated and are rendered by the shell in the user's language.
#[derive(Debug, Clone)]
pub struct Messages {
    entries: HashMap<String, String>,
}

impl Messages {
    /// A catalog holding the built-in names the lowerings rely on.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert("TYPE:Bool".to_string(), "Bool".to_string());
        entries.insert("CONS:TIMEOUT".to_string(), "TIMEOUT".to_string());
        Self { entries }
    }

    /// Add or override a catalog entry.
    pub fn define(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }

    /// Look up `key`, falling back to the key itself.
    pub fn translate<'a>(&'a self, key: &'a str) -> &'a str {
        self.entries.get(key).map(String::as_str).unwrap_or(key)
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::new()
    }
}
