//! Rule sets: exact-match table, ordered heuristic rules, default reply.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::RuleSetError;
use crate::normalize::normalize;
use crate::rule::{Predicate, Rule};

/// Which branch of the resolver produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matched<'a> {
    /// Normalized input equalled this exact-table key.
    Exact(&'a str),
    /// This heuristic rule was the first to hold.
    Rule(&'a str),
    /// Nothing matched.
    Default,
}

/// Reply plus the branch that chose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub response: &'a str,
    pub matched: Matched<'a>,
}

/// An immutable rule set.
///
/// Resolution order is fixed: the exact table first, then `rules`
/// top-to-bottom (first match wins), then the default reply. The order of
/// `rules` is part of the behavior and is preserved from the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    name: String,
    exact: HashMap<String, String>,
    rules: Vec<Rule>,
    default: String,
}

/// Serialized form of a rule set.
///
/// ```yaml
/// name: loyal
/// default: I am a simple bot created by Ayush.
/// exact:
///   who created you: I was created by my developer, Ayush ji.
/// rules:
///   - name: defend_creator
///     when:
///       all:
///         - contains: ayush
///         - any_of: [bad, stupid]
///     response: Do not say anything negative about my creator Ayush!
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSetFile {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub default: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub exact: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Start building a rule set.
    pub fn builder(name: impl Into<String>) -> RuleSetBuilder {
        RuleSetBuilder {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Normalize keys and tokens without validating. Later duplicates win.
    pub(crate) fn assemble(
        name: String,
        exact: impl IntoIterator<Item = (String, String)>,
        rules: Vec<Rule>,
        default: String,
    ) -> Self {
        Self {
            name,
            exact: exact.into_iter().map(|(k, v)| (normalize(&k), v)).collect(),
            rules: rules
                .into_iter()
                .map(|r| Rule {
                    when: r.when.lowercased(),
                    ..r
                })
                .collect(),
            default,
        }
    }

    /// Build from the serialized form, normalizing and validating it.
    pub fn from_file(file: RuleSetFile) -> Result<Self, RuleSetError> {
        let mut builder = Self::builder(file.name).default(file.default);
        for (key, response) in file.exact {
            builder = builder.exact(key, response);
        }
        for rule in file.rules {
            builder = builder.rule(rule);
        }
        builder.build()
    }

    /// Parse a rule set from YAML bytes.
    pub fn from_yaml(data: &[u8]) -> Result<Self, RuleSetError> {
        Self::from_file(serde_yaml::from_slice(data)?)
    }

    /// Parse a rule set from JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Self, RuleSetError> {
        Self::from_file(serde_json::from_slice(data)?)
    }

    /// Load a rule set from a `.yaml`, `.yml` or `.json` file.
    ///
    /// A file without a `name` is named after its stem.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RuleSetError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| RuleSetError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        let mut file: RuleSetFile = match ext {
            "yaml" | "yml" => serde_yaml::from_slice(&data)?,
            "json" => serde_json::from_slice(&data)?,
            _ => return Err(RuleSetError::UnsupportedFormat(path.to_path_buf())),
        };
        if file.name.is_empty()
            && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
        {
            file.name = stem.to_string();
        }

        let set = Self::from_file(file)?;
        info!(
            path = %path.display(),
            name = %set.name,
            exact = set.exact.len(),
            rules = set.rules.len(),
            "rule set loaded"
        );
        Ok(set)
    }

    /// Export to the serialized form. Exact keys come out sorted.
    pub fn to_file(&self) -> RuleSetFile {
        RuleSetFile {
            name: self.name.clone(),
            default: self.default.clone(),
            exact: self
                .exact
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            rules: self.rules.clone(),
        }
    }

    /// Check the invariants every resolvable rule set must hold.
    pub fn validate(&self) -> Result<(), RuleSetError> {
        if self.default.trim().is_empty() {
            return Err(RuleSetError::EmptyDefault);
        }
        for (key, response) in &self.exact {
            if key.is_empty() {
                return Err(RuleSetError::EmptyKey);
            }
            if response.trim().is_empty() {
                return Err(RuleSetError::EmptyResponse(key.clone()));
            }
        }
        let mut names = HashSet::new();
        for rule in &self.rules {
            if !names.insert(rule.name.as_str()) {
                return Err(RuleSetError::DuplicateRule(rule.name.clone()));
            }
            if rule.response.trim().is_empty() {
                return Err(RuleSetError::EmptyResponse(rule.name.clone()));
            }
            rule.when
                .check()
                .map_err(|message| RuleSetError::InvalidPredicate {
                    rule: rule.name.clone(),
                    message,
                })?;
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_response(&self) -> &str {
        &self.default
    }

    /// Heuristic rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of exact-table entries.
    pub fn exact_len(&self) -> usize {
        self.exact.len()
    }

    /// Resolve `input` to a reply.
    pub fn resolve(&self, input: &str) -> Resolution<'_> {
        let normalized = normalize(input);

        let resolution = if let Some((key, response)) = self.exact.get_key_value(&normalized) {
            Resolution {
                response,
                matched: Matched::Exact(key),
            }
        } else if let Some(rule) = self.rules.iter().find(|r| r.when.matches(&normalized)) {
            Resolution {
                response: &rule.response,
                matched: Matched::Rule(&rule.name),
            }
        } else {
            Resolution {
                response: &self.default,
                matched: Matched::Default,
            }
        };

        debug!(rule_set = %self.name, matched = ?resolution.matched, "resolved");
        resolution
    }

    /// Shorthand for `resolve(input).response`.
    pub fn respond(&self, input: &str) -> &str {
        self.resolve(input).response
    }
}

/// Builder for [`RuleSet`]. Rules keep the order they are added in.
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    name: String,
    exact: Vec<(String, String)>,
    rules: Vec<Rule>,
    default: String,
}

impl RuleSetBuilder {
    /// Map an exact input (normalized on build) to a reply.
    pub fn exact(mut self, key: impl Into<String>, response: impl Into<String>) -> Self {
        self.exact.push((key.into(), response.into()));
        self
    }

    /// Append a heuristic rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append a heuristic rule from its parts.
    pub fn when(
        self,
        name: impl Into<String>,
        when: Predicate,
        response: impl Into<String>,
    ) -> Self {
        self.rule(Rule::new(name, when, response))
    }

    /// Reply used when nothing matches.
    pub fn default(mut self, response: impl Into<String>) -> Self {
        self.default = response.into();
        self
    }

    pub fn build(self) -> Result<RuleSet, RuleSetError> {
        let mut seen = HashSet::new();
        for (key, _) in &self.exact {
            let key = normalize(key);
            if !seen.insert(key.clone()) {
                return Err(RuleSetError::DuplicateKey(key));
            }
        }

        let set = RuleSet::assemble(self.name, self.exact, self.rules, self.default);
        set.validate()?;
        Ok(set)
    }
}
