//! Run-owned resource names
//!
//! Every resource a benchmark run creates gets a generated name that embeds
//! part of the owner id, so cleanup can tell "ours" from "someone else's"
//! without any side database.
//!
//! ## Name Schema
//!
//! | Part | Example | Description |
//! |------|---------|-------------|
//! | prefix | `s_bench_` | Static text before the first placeholder |
//! | owner | `3f2a9c10` | First characters of the owner id (dashes removed) |
//! | separator | `_` | Static text between the placeholders |
//! | random | `Qx81LmZa` | Random characters from the allowed alphabet |
//! | suffix | | Static text after the second placeholder |
//!
//! Placeholders are runs of at least three `X` characters in the template.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;
use thiserror::Error;

/// Template used by benchmark scenarios unless they declare their own
pub const DEFAULT_NAME_FORMAT: &str = "s_bench_XXXXXXXX_XXXXXXXX";

/// Characters allowed in generated name parts
pub const DEFAULT_ALLOWED_CHARS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const MIN_PLACEHOLDER: usize = 3;

/// Errors from parsing a name template
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NameFormatError {
    /// Template does not have two placeholder runs with a separator between
    #[error("name template '{0}' needs two runs of at least 3 'X' separated by other text")]
    InvalidTemplate(String),

    /// No characters to generate from
    #[error("allowed character set cannot be empty")]
    EmptyAlphabet,

    /// Matching pattern for the template could not be built
    #[error("cannot build name pattern: {0}")]
    Pattern(String),
}

/// Parsed name template
#[derive(Debug, Clone)]
pub struct NameFormat {
    prefix: String,
    owner_len: usize,
    separator: String,
    random_len: usize,
    suffix: String,
    allowed: String,
    /// Anchored at the start, owner part in group 1
    pattern: Regex,
}

impl NameFormat {
    fn key(&self) -> (&str, usize, &str, usize, &str, &str) {
        (
            &self.prefix,
            self.owner_len,
            &self.separator,
            self.random_len,
            &self.suffix,
            &self.allowed,
        )
    }
}

impl PartialEq for NameFormat {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for NameFormat {}

impl Hash for NameFormat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl Default for NameFormat {
    fn default() -> Self {
        static DEFAULT: OnceLock<NameFormat> = OnceLock::new();
        DEFAULT
            .get_or_init(|| {
                NameFormat::parse(DEFAULT_NAME_FORMAT, DEFAULT_ALLOWED_CHARS)
                    .expect("default name template is valid")
            })
            .clone()
    }
}

impl NameFormat {
    /// Parse a template such as `s_bench_XXXXXXXX_XXXXXXXX`.
    pub fn parse(template: &str, allowed: &str) -> Result<Self, NameFormatError> {
        if allowed.is_empty() {
            return Err(NameFormatError::EmptyAlphabet);
        }
        let invalid = || NameFormatError::InvalidTemplate(template.to_string());

        let (prefix, rest) = split_placeholder(template).ok_or_else(invalid)?;
        let (owner_len, rest) = rest;
        let (separator, (random_len, suffix)) = split_placeholder(rest).ok_or_else(invalid)?;
        if separator.is_empty() || suffix.contains("XXX") {
            return Err(invalid());
        }

        let class = format!("[{}]", regex::escape(allowed));
        let pattern = format!(
            "^{}({class}{{{owner_len}}}){}{class}{{{random_len}}}{}",
            regex::escape(prefix),
            regex::escape(separator),
            regex::escape(suffix),
        );
        let pattern = Regex::new(&pattern).map_err(|e| NameFormatError::Pattern(e.to_string()))?;

        Ok(Self {
            prefix: prefix.to_string(),
            owner_len,
            separator: separator.to_string(),
            random_len,
            suffix: suffix.to_string(),
            allowed: allowed.to_string(),
            pattern,
        })
    }

    /// Generate a fresh name owned by `owner_id`.
    pub fn generate(&self, owner_id: &str) -> String {
        let chars: Vec<char> = self.allowed.chars().collect();
        let mut rng = rand::thread_rng();
        let random: String = (0..self.random_len)
            .map(|_| chars[rng.gen_range(0..chars.len())])
            .collect();

        format!(
            "{}{}{}{}{}",
            self.prefix,
            self.owner_part(owner_id),
            self.separator,
            random,
            self.suffix
        )
    }

    /// Check whether `name` could have been generated with this format.
    ///
    /// With an owner id, the owner part must be the one derived from it;
    /// without, any allowed characters match. When `exact` is false, extra
    /// text may follow the name (engines append suffixes to bulk-created
    /// objects).
    pub fn matches(&self, name: &str, owner_id: Option<&str>, exact: bool) -> bool {
        let Some(caps) = self.pattern.captures(name) else {
            return false;
        };
        if exact && caps.get(0).map(|m| m.end()) != Some(name.len()) {
            return false;
        }
        match (owner_id, caps.get(1)) {
            (Some(id), Some(owner)) => owner.as_str() == self.owner_part(id),
            (None, _) => true,
            (Some(_), None) => false,
        }
    }

    /// Owner-derived part of a name.
    ///
    /// Uses the leading characters of the owner id with dashes removed. Ids
    /// that are too short or contain disallowed characters map to a
    /// deterministic pseudo-random string seeded by the id.
    pub fn owner_part(&self, owner_id: &str) -> String {
        let stripped: String = owner_id
            .chars()
            .filter(|c| *c != '-')
            .take(self.owner_len)
            .collect();

        if stripped.chars().count() == self.owner_len
            && stripped.chars().all(|c| self.allowed.contains(c))
        {
            return stripped;
        }

        let chars: Vec<char> = self.allowed.chars().collect();
        let mut rng = StdRng::seed_from_u64(fnv1a(owner_id.as_bytes()));
        (0..self.owner_len)
            .map(|_| chars[rng.gen_range(0..chars.len())])
            .collect()
    }
}

/// Split `s` at its first placeholder run.
///
/// Returns the text before it and `(run_length, rest_after_run)`.
fn split_placeholder(s: &str) -> Option<(&str, (usize, &str))> {
    let start = s.find("XXX")?;
    let run = s[start..].chars().take_while(|c| *c == 'X').count();
    if run < MIN_PLACEHOLDER {
        return None;
    }
    Some((&s[..start], (run, &s[start + run..])))
}

/// Stable 64-bit FNV-1a hash, used to seed owner parts
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(0x0100_0000_01b3)
    })
}

/// A kind of run-owned object, identified by its name format
///
/// Scenarios that create resources each declare one; cleanup matches names
/// against the whole set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceClass {
    /// Identifier for logging (e.g. the scenario name)
    pub name: String,
    /// Name template used for generated names
    pub format: NameFormat,
}

impl ResourceClass {
    /// Create a class with a custom format
    pub fn new(name: impl Into<String>, format: NameFormat) -> Self {
        Self {
            name: name.into(),
            format,
        }
    }

    /// The default benchmark scenario class
    pub fn benchmark() -> Self {
        Self::new("benchmark", NameFormat::default())
    }
}

/// Decides whether a resource name belongs to a run
pub trait OwnershipMatcher: Send + Sync {
    /// True if `name` was generated by any of `classes` for `owner_id`
    fn matches(&self, name: &str, classes: &[ResourceClass], owner_id: Option<&str>) -> bool;
}

/// Matcher for names produced by [`NameFormat::generate`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNameMatcher {
    /// Require the whole name to match (no trailing text)
    pub exact: bool,
}

impl OwnershipMatcher for RandomNameMatcher {
    fn matches(&self, name: &str, classes: &[ResourceClass], owner_id: Option<&str>) -> bool {
        let mut seen: Vec<&NameFormat> = Vec::new();
        for class in classes {
            if seen.contains(&&class.format) {
                continue;
            }
            seen.push(&class.format);
            if class.format.matches(name, owner_id, self.exact) {
                return true;
            }
        }
        false
    }
}
