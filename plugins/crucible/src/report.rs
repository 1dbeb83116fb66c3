//! Findings, models and per-harness reports.

use std::fmt;
use std::panic::Location as CallerLocation;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Call site of an assumption, assertion or panic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl From<&CallerLocation<'_>> for Location {
    fn from(loc: &CallerLocation<'_>) -> Self {
        Self::new(loc.file(), loc.line())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One symbolic value drawn on a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    /// Width in bits (1..=64).
    pub width: u32,
    pub signed: bool,
    /// Raw bits, zero-extended.
    pub bits: u64,
}

impl Binding {
    /// The value as a signed integer, sign-extended from `width`. Widths
    /// outside 1..=64, as a hand-edited model may carry, are clamped.
    pub fn as_i64(&self) -> i64 {
        let shift = 64 - self.width.clamp(1, 64);
        ((self.bits << shift) as i64) >> shift
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.signed { 'i' } else { 'u' };
        if self.signed {
            write!(f, "{}: {}{} = {}", self.name, prefix, self.width, self.as_i64())
        } else {
            write!(f, "{}: {}{} = {}", self.name, prefix, self.width, self.bits)
        }
    }
}

/// The values drawn on one path, in draw order. Enough to replay the path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model {
    bindings: Vec<Binding>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, binding: Binding) {
        self.bindings.push(binding);
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// First binding drawn under `name`.
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl FromIterator<Binding> for Model {
    fn from_iter<I: IntoIterator<Item = Binding>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingKind {
    AssertionFailed,
    /// Unconditional failure, e.g. a reached `__VERIFIER_error`.
    Error { message: String },
    /// The harness itself panicked.
    Panic { message: String },
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingKind::AssertionFailed => write!(f, "assertion failed"),
            FindingKind::Error { message } => write!(f, "error: {message}"),
            FindingKind::Panic { message } => write!(f, "panic: {message}"),
        }
    }
}

/// A reportable failure discovered on some path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub location: Location,
    /// Model of the first path that reached this finding.
    pub model: Model,
    /// Number of paths that reached it.
    pub occurrences: usize,
}

impl Finding {
    pub fn new(kind: FindingKind, location: Location, model: Model) -> Self {
        Self {
            kind,
            location,
            model,
            occurrences: 1,
        }
    }

    fn same_site(&self, other: &Finding) -> bool {
        self.location == other.location
            && std::mem::discriminant(&self.kind) == std::mem::discriminant(&other.kind)
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.location)?;
        if self.occurrences > 1 {
            write!(f, " ({} paths)", self.occurrences)?;
        }
        for binding in self.model.bindings() {
            write!(f, "\n    {binding}")?;
        }
        Ok(())
    }
}

/// Result of running one harness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub harness: String,
    pub seed: u64,
    /// Paths executed, pruned ones included.
    pub paths: usize,
    pub pruned: usize,
    findings: Vec<Finding>,
}

impl Report {
    pub fn new(harness: impl Into<String>, seed: u64) -> Self {
        Self {
            harness: harness.into(),
            seed,
            paths: 0,
            pruned: 0,
            findings: Vec::new(),
        }
    }

    /// Record a finding, merging it with an earlier one from the same site.
    pub fn add_finding(&mut self, finding: Finding) {
        match self.findings.iter_mut().find(|f| f.same_site(&finding)) {
            Some(existing) => existing.occurrences += finding.occurrences,
            None => self.findings.push(finding),
        }
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn is_success(&self) -> bool {
        self.findings.is_empty()
    }

    /// Every executed path was pruned by an assumption.
    pub fn is_vacuous(&self) -> bool {
        self.paths > 0 && self.pruned == self.paths
    }

    /// Panics with the rendered report if any finding was recorded.
    pub fn expect_pass(&self) {
        if !self.is_success() {
            panic!("{self}");
        }
        if self.is_vacuous() {
            tracing::warn!(harness = %self.harness, "every path was pruned by an assumption");
        }
    }

    /// Panics if no finding was recorded.
    pub fn expect_fail(&self) {
        if self.is_success() {
            panic!("{}: expected a failure, none found in {} paths", self.harness, self.paths);
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_success() { "ok" } else { "FAILED" };
        write!(
            f,
            "{}: {} ({} paths, {} pruned, seed {})",
            self.harness, status, self.paths, self.pruned, self.seed
        )?;
        for finding in &self.findings {
            write!(f, "\n  {finding}")?;
        }
        Ok(())
    }
}
