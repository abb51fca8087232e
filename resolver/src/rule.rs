//! Heuristic rules: a predicate over normalized input plus a canned reply.

use serde::{Deserialize, Serialize};

/// Predicate over normalized input.
///
/// Tokens are plain substrings; they are lower-cased when a rule set is
/// built, never trimmed, and may span word boundaries.
///
/// JSON/YAML form is a single-key map:
/// - `{contains: "ayush"}`
/// - `{any_of: ["bad", "stupid"]}`
/// - `{all_of: ["who", "you"]}`
/// - `{all: [<predicate>, ...]}` / `{any: [<predicate>, ...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PredicateRepr", into = "PredicateRepr")]
pub enum Predicate {
    /// Input contains the token.
    Contains(String),
    /// Input contains at least one token.
    AnyOf(Vec<String>),
    /// Input contains every token.
    AllOf(Vec<String>),
    /// Every sub-predicate holds.
    All(Vec<Predicate>),
    /// At least one sub-predicate holds.
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn contains(token: impl Into<String>) -> Self {
        Predicate::Contains(token.into())
    }

    pub fn any_of<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::AnyOf(tokens.into_iter().map(Into::into).collect())
    }

    pub fn all_of<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::AllOf(tokens.into_iter().map(Into::into).collect())
    }

    pub fn all(preds: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::All(preds.into_iter().collect())
    }

    pub fn any(preds: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Any(preds.into_iter().collect())
    }

    /// Evaluate against already-normalized input.
    pub fn matches(&self, normalized: &str) -> bool {
        match self {
            Predicate::Contains(t) => normalized.contains(t.as_str()),
            Predicate::AnyOf(ts) => ts.iter().any(|t| normalized.contains(t.as_str())),
            Predicate::AllOf(ts) => ts.iter().all(|t| normalized.contains(t.as_str())),
            Predicate::All(ps) => ps.iter().all(|p| p.matches(normalized)),
            Predicate::Any(ps) => ps.iter().any(|p| p.matches(normalized)),
        }
    }

    /// Lower-case every token.
    pub(crate) fn lowercased(self) -> Self {
        let lower = |ts: Vec<String>| ts.into_iter().map(|t| t.to_lowercase()).collect();
        match self {
            Predicate::Contains(t) => Predicate::Contains(t.to_lowercase()),
            Predicate::AnyOf(ts) => Predicate::AnyOf(lower(ts)),
            Predicate::AllOf(ts) => Predicate::AllOf(lower(ts)),
            Predicate::All(ps) => Predicate::All(ps.into_iter().map(Self::lowercased).collect()),
            Predicate::Any(ps) => Predicate::Any(ps.into_iter().map(Self::lowercased).collect()),
        }
    }

    /// Reject shapes that would match everything or nothing by accident.
    ///
    /// An empty token is a substring of every input (including the empty
    /// one), and empty lists make `all`/`any` vacuous.
    pub(crate) fn check(&self) -> Result<(), String> {
        let tokens = |kind: &str, ts: &[String]| {
            if ts.is_empty() {
                return Err(format!("{} has no tokens", kind));
            }
            if ts.iter().any(String::is_empty) {
                return Err(format!("{} has an empty token", kind));
            }
            Ok(())
        };
        match self {
            Predicate::Contains(t) if t.is_empty() => Err("contains has an empty token".into()),
            Predicate::Contains(_) => Ok(()),
            Predicate::AnyOf(ts) => tokens("any_of", ts),
            Predicate::AllOf(ts) => tokens("all_of", ts),
            Predicate::All(ps) | Predicate::Any(ps) => {
                if ps.is_empty() {
                    return Err("all/any has no predicates".into());
                }
                ps.iter().try_for_each(Predicate::check)
            }
        }
    }
}

/// Wire form of [`Predicate`]: exactly one field set.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PredicateRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    any_of: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    all_of: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    all: Option<Vec<Predicate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    any: Option<Vec<Predicate>>,
}

impl TryFrom<PredicateRepr> for Predicate {
    type Error = String;

    fn try_from(r: PredicateRepr) -> Result<Self, Self::Error> {
        let mut found = Vec::with_capacity(1);
        if let Some(t) = r.contains {
            found.push(Predicate::Contains(t));
        }
        if let Some(ts) = r.any_of {
            found.push(Predicate::AnyOf(ts));
        }
        if let Some(ts) = r.all_of {
            found.push(Predicate::AllOf(ts));
        }
        if let Some(ps) = r.all {
            found.push(Predicate::All(ps));
        }
        if let Some(ps) = r.any {
            found.push(Predicate::Any(ps));
        }
        match found.len() {
            1 => Ok(found.remove(0)),
            0 => Err("predicate needs one of contains, any_of, all_of, all, any".into()),
            _ => Err("predicate must set exactly one of contains, any_of, all_of, all, any".into()),
        }
    }
}

impl From<Predicate> for PredicateRepr {
    fn from(p: Predicate) -> Self {
        match p {
            Predicate::Contains(t) => PredicateRepr {
                contains: Some(t),
                ..Default::default()
            },
            Predicate::AnyOf(ts) => PredicateRepr {
                any_of: Some(ts),
                ..Default::default()
            },
            Predicate::AllOf(ts) => PredicateRepr {
                all_of: Some(ts),
                ..Default::default()
            },
            Predicate::All(ps) => PredicateRepr {
                all: Some(ps),
                ..Default::default()
            },
            Predicate::Any(ps) => PredicateRepr {
                any: Some(ps),
                ..Default::default()
            },
        }
    }
}

/// A named heuristic rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Name used in logs and resolution results (e.g. "defend_creator").
    pub name: String,
    pub when: Predicate,
    pub response: String,
}

impl Rule {
    pub fn new(name: impl Into<String>, when: Predicate, response: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            when,
            response: response.into(),
        }
    }
}
