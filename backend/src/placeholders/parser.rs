//! Subject line scanner.
//!
//! Accepted token forms (`NAME` is matched case-insensitively against the
//! attribute directory):
//!
//! | token            | meaning                                           |
//! |------------------|---------------------------------------------------|
//! | `[NAME]`         | recipient's value                                 |
//! | `[NAME!]`        | value, uppercased                                 |
//! | `[!NAME]`        | same as `[NAME!]`                                 |
//! | `[NAME?text]`    | value, or `text` when the value is empty or NULL  |
//! | `[NAME?text!]`   | as above, uppercased                              |
//!
//! Anything else in brackets is not a placeholder and stays in the subject.

use common::model::place_holder::{CampaignPlaceholderSet, PlaceholderToken, TokenBinding};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

// Name may not contain brackets or the marker characters; the fallback may
// contain anything but brackets. The lazy fallback lets a trailing `!` be
// read as the uppercase marker.
pub(crate) static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?P<lead>!)?(?P<name>[^\[\]?!]+)(?:\?(?P<fallback>[^\[\]]*?))?(?P<tail>!)?\]")
        .expect("token pattern is hardcoded and valid")
});

/// Uppercased attribute name -> name as the directory spells it.
/// If two names differ only by case, the first one listed wins.
fn index_known_names(known: &[String]) -> HashMap<String, &str> {
    let mut index = HashMap::with_capacity(known.len());
    for name in known {
        index.entry(name.to_uppercase()).or_insert(name.as_str());
    }
    index
}

/// Builds the campaign's token table from its subject and the current
/// attribute directory. Tokens naming no known attribute are skipped.
pub fn parse_subject(subject: &str, known_names: &[String]) -> CampaignPlaceholderSet {
    let mut set = CampaignPlaceholderSet::new();
    if known_names.is_empty() || !subject.contains('[') {
        return set;
    }

    let index = index_known_names(known_names);
    for caps in TOKEN_RE.captures_iter(subject) {
        let literal = &caps[0];
        let candidate = &caps["name"];
        let Some(attribute_name) = index.get(&candidate.to_uppercase()) else {
            log::debug!("Ignoring {literal}: no attribute named {candidate:?}");
            continue;
        };

        let binding = TokenBinding::new(
            *attribute_name,
            caps.name("fallback").map(|m| m.as_str().to_string()),
            caps.name("lead").is_some() || caps.name("tail").is_some(),
        );
        set.insert(PlaceholderToken::new(literal), binding);
    }
    set
}
