use serde::{Deserialize, Serialize};

/// Value the subscriber store reports for an attribute that was never filled in.
/// It is treated exactly like a missing value when deciding on fallback text.
pub const NULL_SENTINEL: &str = "NULL";

/// The literal placeholder text found in a subject, delimiters included
/// (e.g. `[CITY!]`). Two occurrences of the same text are the same token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceholderToken(String);

impl PlaceholderToken {
    pub fn new(literal: impl Into<String>) -> Self {
        Self(literal.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlaceholderToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a recognised placeholder is turned into text for one recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBinding {
    /// Attribute name exactly as the directory spells it.
    pub attribute_name: String,
    /// Text from the `?fallback` suffix, if the token had one.
    pub fallback_text: Option<String>,
    /// Set when the token carried the `!` marker.
    pub uppercase: bool,
    /// Recipient specific, `None` until bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_value: Option<String>,
}

impl TokenBinding {
    pub fn new(attribute_name: impl Into<String>, fallback_text: Option<String>, uppercase: bool) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            fallback_text,
            uppercase,
            resolved_value: None,
        }
    }

    /// True when the bound value is neither missing, empty, nor the `NULL` sentinel.
    pub fn has_value(&self) -> bool {
        matches!(self.resolved_value.as_deref(), Some(v) if !v.is_empty() && v != NULL_SENTINEL)
    }

    /// The text that replaces the token: fallback when there is no usable
    /// value and a fallback exists, the bound value otherwise (empty if unbound),
    /// uppercased when the token asked for it.
    pub fn effective_replacement(&self) -> String {
        let text = match (&self.fallback_text, self.has_value()) {
            (Some(fallback), false) => fallback.as_str(),
            _ => self.resolved_value.as_deref().unwrap_or_default(),
        };
        if self.uppercase {
            text.to_uppercase()
        } else {
            text.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderEntry {
    pub token: PlaceholderToken,
    pub binding: TokenBinding,
}

/// Token table for one campaign, in the order tokens first appear in the subject.
///
/// Built once when the campaign starts. Per-recipient values are bound into a
/// clone of this table, never into the campaign's own copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignPlaceholderSet {
    entries: Vec<PlaceholderEntry>,
}

impl CampaignPlaceholderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding unless the same literal token is already present.
    /// Returns `false` for a duplicate; the first binding is kept.
    pub fn insert(&mut self, token: PlaceholderToken, binding: TokenBinding) -> bool {
        if self.get(token.as_str()).is_some() {
            return false;
        }
        self.entries.push(PlaceholderEntry { token, binding });
        true
    }

    pub fn get(&self, literal: &str) -> Option<&TokenBinding> {
        self.entries
            .iter()
            .find(|entry| entry.token.as_str() == literal)
            .map(|entry| &entry.binding)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlaceholderEntry> {
        self.entries.iter()
    }

    pub fn bindings_mut(&mut self) -> impl Iterator<Item = &mut TokenBinding> {
        self.entries.iter_mut().map(|entry| &mut entry.binding)
    }

    pub fn tokens(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.token.to_string())
            .collect()
    }
}
