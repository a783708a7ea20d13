// src/messages.rs
// Display translations for backend validation messages

use std::collections::{BTreeMap, HashMap};

/// Backend (English) message -> display (Polish) message
const DEFAULT_TRANSLATIONS: &[(&str, &str)] = &[
    (
        "This password is too short. It must contain at least 8 characters.",
        "Hasło jest za krótkie. Musi zawierać przynajmniej 8 znaków.",
    ),
    ("This password is too common.", "To hasło jest zbyt popularne."),
    (
        "This password is entirely numeric.",
        "To hasło nie może być wyłącznie numeryczne.",
    ),
    (
        "A user with that username already exists.",
        "Użytkownik o takiej nazwie już istnieje.",
    ),
    ("Enter a valid email address.", "Wprowadź prawidłowy adres email."),
];

/// Separator between messages of different fields
pub const FIELD_SEPARATOR: &str = " | ";

/// Immutable lookup table used to translate backend messages for display.
///
/// Unknown messages pass through unchanged.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    entries: HashMap<String, String>,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self {
            entries: DEFAULT_TRANSLATIONS
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }
}

impl MessageCatalog {
    /// Add or replace translations (config file `[messages]` table)
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.entries
            .extend(overrides.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn translate<'a>(&'a self, msg: &'a str) -> &'a str {
        self.entries.get(msg).map(String::as_str).unwrap_or(msg)
    }

    /// Translate a field-keyed validation body.
    ///
    /// Values may be a string or a list of strings; anything else is rendered
    /// as JSON. Returns the translated map plus one display line where fields
    /// are joined with `" | "` and messages within a field with a space.
    pub fn translate_fields(
        &self,
        body: &serde_json::Map<String, serde_json::Value>,
    ) -> (BTreeMap<String, Vec<String>>, String) {
        let mut fields = BTreeMap::new();
        let mut lines = Vec::with_capacity(body.len());

        for (field, value) in body {
            let msgs: Vec<String> = match value {
                serde_json::Value::String(s) => vec![self.translate(s).to_string()],
                serde_json::Value::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        serde_json::Value::String(s) => self.translate(s).to_string(),
                        other => other.to_string(),
                    })
                    .collect(),
                other => vec![other.to_string()],
            };
            lines.push(msgs.join(" "));
            fields.insert(field.clone(), msgs);
        }

        (fields, lines.join(FIELD_SEPARATOR))
    }
}
