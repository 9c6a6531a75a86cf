//! Core types shared across the pipeline

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Extension given to compiled outputs when no explicit filename is set
pub const OUTPUT_EXTENSION: &str = "css";

/// Key under which the artifact list is handed to the runtime consumer
pub const RUNTIME_CONFIG_KEY: &str = "lazyLoadCSS";

/// Default directory scanned when no explicit files are configured
pub const DEFAULT_INPUT_DIR: &str = "app/assets/scss";

/// Default output root, also the public base URL
pub const DEFAULT_OUTPUT_DIR: &str = "assets/css";

/// Parameter object for viewport width rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScreenSize {
    pub width: u32,
}

/// Identifies a rule independent of its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleKind {
    WidthGreaterThan,
    WidthLessThan,
}

/// A deferred-loading rule attached to a compiled stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Apply the stylesheet once the viewport is wider than `width`
    WidthGreaterThan(ScreenSize),
    /// Apply the stylesheet while the viewport is narrower than `width`
    WidthLessThan(ScreenSize),
}

impl Rule {
    pub fn width_gt(width: u32) -> Self {
        Rule::WidthGreaterThan(ScreenSize { width })
    }

    pub fn width_lt(width: u32) -> Self {
        Rule::WidthLessThan(ScreenSize { width })
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::WidthGreaterThan(_) => RuleKind::WidthGreaterThan,
            Rule::WidthLessThan(_) => RuleKind::WidthLessThan,
        }
    }
}

/// Set of rules, at most one per [`RuleKind`].
///
/// Serializes as an object keyed by wire name, e.g.
/// `{"widthLT": {"width": 600}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RuleFields", into = "RuleFields")]
pub struct RuleSet {
    rules: BTreeMap<RuleKind, Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rule, returning the one it replaced.
    pub fn insert(&mut self, rule: Rule) -> Option<Rule> {
        self.rules.insert(rule.kind(), rule)
    }

    pub fn with(mut self, rule: Rule) -> Self {
        self.insert(rule);
        self
    }

    pub fn get(&self, kind: RuleKind) -> Option<&Rule> {
        self.rules.get(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        let mut set = RuleSet::new();
        for rule in iter {
            set.insert(rule);
        }
        set
    }
}

/// Keyed wire form of a [`RuleSet`]. Unknown rule names are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleFields {
    #[serde(rename = "widthGT", default, skip_serializing_if = "Option::is_none")]
    pub width_gt: Option<ScreenSize>,
    #[serde(rename = "widthLT", default, skip_serializing_if = "Option::is_none")]
    pub width_lt: Option<ScreenSize>,
}

impl From<RuleFields> for RuleSet {
    fn from(fields: RuleFields) -> Self {
        let gt = fields.width_gt.map(Rule::WidthGreaterThan);
        let lt = fields.width_lt.map(Rule::WidthLessThan);
        gt.into_iter().chain(lt).collect()
    }
}

impl From<RuleSet> for RuleFields {
    fn from(set: RuleSet) -> Self {
        let mut fields = RuleFields::default();
        for rule in set.rules.into_values() {
            match rule {
                Rule::WidthGreaterThan(size) => fields.width_gt = Some(size),
                Rule::WidthLessThan(size) => fields.width_lt = Some(size),
            }
        }
        fields
    }
}

/// One stylesheet source as configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFileSpec {
    /// Relative to the project root
    pub file_path: PathBuf,
    /// Relative to the parent of the output root
    pub output_filename: Option<String>,
    pub rules: RuleSet,
}

impl SourceFileSpec {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            output_filename: None,
            rules: RuleSet::new(),
        }
    }

    pub fn with_output_filename(mut self, filename: impl Into<String>) -> Self {
        self.output_filename = Some(filename.into());
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.insert(rule);
        self
    }
}

/// Where a resolved file came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOrigin {
    Explicit,
    Discovered,
}

/// A source file with its fully merged rules, ready for compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedFile {
    pub file_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_filename: Option<String>,
    pub rules: RuleSet,
    pub origin: FileOrigin,
}

/// Published unit: compiled output path plus its effective rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledArtifact {
    /// Public path, `/`-separated, relative to the served root
    pub path: String,
    pub rules: RuleSet,
}
