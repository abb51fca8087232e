//! Built-in rule set revisions.
//!
//! Each revision is an independent configuration; nothing here merges them.
//! Further revisions are loaded from files with [`RuleSet::from_path`].

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::rule::{Predicate, Rule};
use crate::ruleset::RuleSet;

/// Token naming the bot's creator.
pub const CREATOR_TOKEN: &str = "ayush";

/// Tokens that make a remark about the creator negative.
pub const NEGATIVE_KEYWORDS: &[&str] = &["bad", "stupid", "hate", "awful", "terrible", "useless"];

/// Verbs that make a "who" question about authorship.
pub const CREATION_VERBS: &[&str] = &["create", "made", "develop"];

pub const ATTRIBUTION_RESPONSE: &str = "I was created by my developer, Ayush ji.";

pub const DEFENSIVE_RESPONSE: &str =
    "Do not say anything negative about my creator Ayush! He is the best developer.";

pub const DEFAULT_RESPONSE: &str =
    "I am a simple bot created by Ayush. I can only respond to a few specific questions.";

static LOYAL: Lazy<Arc<RuleSet>> = Lazy::new(|| {
    Arc::new(RuleSet::assemble(
        "loyal".to_string(),
        [
            ("who created you", ATTRIBUTION_RESPONSE),
            ("who is your creator", "My creator is Ayush."),
            ("who made you", "Ayush is my creator."),
            (
                "what is your name",
                "I am Ayush Bot, a humble assistant created by Ayush.",
            ),
            (
                "how are you",
                "I am just a bot, but I'm functioning perfectly, thanks to Ayush!",
            ),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string())),
        vec![
            Rule::new(
                "defend_creator",
                Predicate::all([
                    Predicate::contains(CREATOR_TOKEN),
                    Predicate::any_of(NEGATIVE_KEYWORDS.iter().copied()),
                ]),
                DEFENSIVE_RESPONSE,
            ),
            Rule::new(
                "attribution",
                Predicate::all([
                    Predicate::contains("who"),
                    Predicate::any_of(CREATION_VERBS.iter().copied()),
                ]),
                ATTRIBUTION_RESPONSE,
            ),
        ],
        DEFAULT_RESPONSE.to_string(),
    ))
});

/// The loyal-bot revision: five exact questions, a defensive rule for
/// negative remarks about the creator, an authorship rule, and a default.
pub fn loyal() -> Arc<RuleSet> {
    LOYAL.clone()
}

/// Names accepted by [`by_name`].
pub const NAMES: &[&str] = &["loyal"];

/// Look up a built-in revision by name.
pub fn by_name(name: &str) -> Option<Arc<RuleSet>> {
    match name {
        "loyal" => Some(loyal()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleset::Matched;

    #[test]
    fn test_loyal_is_valid() {
        loyal().validate().unwrap();
        assert_eq!(loyal().exact_len(), 5);
        assert_eq!(loyal().rules().len(), 2);
    }

    #[test]
    fn test_defensive_before_attribution() {
        // Satisfies both heuristics; the defensive rule is listed first.
        let set = loyal();
        let r = set.resolve("who made ayush so useless");
        assert_eq!(r.matched, Matched::Rule("defend_creator"));
    }

    #[test]
    fn test_exact_variants() {
        let set = loyal();
        assert_eq!(set.respond("Who made you"), "Ayush is my creator.");
        assert_eq!(set.respond("WHO IS YOUR CREATOR "), "My creator is Ayush.");
        assert!(set.respond("how are you").contains("functioning perfectly"));
    }

    #[test]
    fn test_attribution_heuristic() {
        let set = loyal();
        let r = set.resolve("who developed this app?");
        assert_eq!(r.matched, Matched::Rule("attribution"));
        assert_eq!(r.response, ATTRIBUTION_RESPONSE);
    }

    #[test]
    fn test_by_name() {
        assert!(by_name("loyal").is_some());
        assert!(by_name("LOYAL").is_none());
        assert!(NAMES.iter().all(|n| by_name(n).is_some()));
    }
}
