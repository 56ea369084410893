use super::parser::TOKEN_RE;
use common::model::place_holder::CampaignPlaceholderSet;
use regex::Captures;

/// Replaces every occurrence of each bound token in `subject`.
///
/// The subject is scanned once with the token pattern and each match is
/// looked up in the table, so text produced by one replacement is never
/// scanned again. Matches that are not in the table stay verbatim.
pub fn rewrite_subject(set: &CampaignPlaceholderSet, subject: &str) -> String {
    if set.is_empty() {
        return subject.to_string();
    }
    TOKEN_RE
        .replace_all(subject, |caps: &Captures| {
            let literal = &caps[0];
            match set.get(literal) {
                Some(binding) => {
                    let replacement = binding.effective_replacement();
                    log::debug!("{} -> {:?}", literal, replacement);
                    replacement
                }
                None => literal.to_string(),
            }
        })
        .into_owned()
}
