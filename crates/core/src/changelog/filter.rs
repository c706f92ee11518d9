//! Changeset acceptance filters
//!
//! Filters decide whether a changeset takes part in the current run.
//! Evaluation is fail-fast: the first filter that rejects a changeset
//! stops further evaluation.

use super::changeset::ChangeSet;

/// Outcome of one filter for one changeset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResult {
    /// Whether the filter accepted the changeset
    pub accepted: bool,
    /// Display name of the filter that produced this result
    pub filter: String,
    /// Human-readable reason token
    pub reason: String,
}

impl FilterResult {
    pub fn accepted(filter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            accepted: true,
            filter: filter.into(),
            reason: reason.into(),
        }
    }

    pub fn denied(filter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            filter: filter.into(),
            reason: reason.into(),
        }
    }
}

/// Acceptance check applied to every changeset of a run
pub trait ChangeSetFilter {
    /// Name surfaced in reasons and logs
    fn display_name(&self) -> &'static str;

    /// Decide whether the changeset participates in the current run
    fn accepts(&self, change_set: &ChangeSet) -> FilterResult;
}

/// Matches the run's context expressions against changeset contexts.
///
/// A run without contexts accepts everything; a changeset without
/// contexts runs everywhere. Token comparison is case-insensitive.
pub struct ContextFilter {
    run_contexts: Vec<String>,
}

impl ContextFilter {
    pub fn new(run_contexts: Vec<String>) -> Self {
        Self {
            run_contexts: normalize(run_contexts),
        }
    }
}

impl ChangeSetFilter for ContextFilter {
    fn display_name(&self) -> &'static str {
        "context"
    }

    fn accepts(&self, change_set: &ChangeSet) -> FilterResult {
        token_match(
            self.display_name(),
            "context",
            &self.run_contexts,
            &change_set.contexts,
        )
    }
}

/// Matches the run's label expressions against changeset labels.
pub struct LabelFilter {
    run_labels: Vec<String>,
}

impl LabelFilter {
    pub fn new(run_labels: Vec<String>) -> Self {
        Self {
            run_labels: normalize(run_labels),
        }
    }
}

impl ChangeSetFilter for LabelFilter {
    fn display_name(&self) -> &'static str {
        "label"
    }

    fn accepts(&self, change_set: &ChangeSet) -> FilterResult {
        token_match(
            self.display_name(),
            "label",
            &self.run_labels,
            &change_set.labels,
        )
    }
}

fn normalize(tokens: Vec<String>) -> Vec<String> {
    tokens
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn token_match(
    filter: &str,
    kind: &str,
    run_tokens: &[String],
    change_set_tokens: &[String],
) -> FilterResult {
    if run_tokens.is_empty() {
        return FilterResult::accepted(filter, format!("no run {kind} specified"));
    }
    if change_set_tokens.is_empty() {
        return FilterResult::accepted(filter, format!("changeset declares no {kind}"));
    }
    for token in change_set_tokens {
        let token = token.trim().to_lowercase();
        if run_tokens.contains(&token) {
            return FilterResult::accepted(filter, format!("{kind} '{token}' matched"));
        }
    }
    FilterResult::denied(
        filter,
        format!(
            "{kind}s [{}] do not match run {kind}s [{}]",
            change_set_tokens.join(", "),
            run_tokens.join(", ")
        ),
    )
}
