//! Content restriction rules and their evaluator.
//!
//! A `ContentRestriction` is a declarative allow/exclude policy over a book
//! series' age rating and sharing labels. It can be attached to a user or to
//! an API key, and is evaluated against the metadata of the content being
//! accessed.
//!
//! Evaluation is two-phased: the allow clauses (age threshold in allow-only
//! mode, allow labels) are combined first, then the exclude clauses (age
//! threshold in exclude mode, exclude labels) can veto an admitted result.
//! Each allow clause is a tri-state signal: it can pass, fail, or simply not
//! be configured. A clause that is not configured has no opinion and must
//! never cause a denial on its own.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How an age threshold is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowExclude {
    /// Only content rated at or below the threshold age is allowed.
    AllowOnly,
    /// Content rated at or above the threshold age is excluded.
    Exclude,
}

/// An age threshold with its interpretation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeThreshold {
    /// The age the rule pivots on.
    pub age: u32,
    /// Whether the threshold allows below or excludes above.
    pub mode: AllowExclude,
}

impl AgeThreshold {
    /// Creates a new age threshold.
    #[must_use]
    pub fn new(age: u32, mode: AllowExclude) -> Self {
        Self { age, mode }
    }
}

/// Outcome of a single allow clause.
///
/// A clause that is not configured carries no opinion: it neither admits nor
/// denies. This is distinct from a configured clause that fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    /// The clause is configured and satisfied.
    Pass,
    /// The clause is configured and violated.
    Fail,
    /// The clause is not configured.
    NotConfigured,
}

/// A declarative allow/exclude policy over age rating and sharing labels.
///
/// Label comparison is case-insensitive and ignores blank labels. The
/// builders normalize on construction, and evaluation normalizes both sides
/// again so rules deserialized from storage with mixed-case labels compare
/// the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRestriction {
    age_threshold: Option<AgeThreshold>,
    labels_allow: BTreeSet<String>,
    labels_exclude: BTreeSet<String>,
}

impl ContentRestriction {
    /// Creates an inactive restriction that allows everything.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Sets the age threshold.
    #[must_use]
    pub fn with_age_threshold(mut self, threshold: AgeThreshold) -> Self {
        self.age_threshold = Some(threshold);
        self
    }

    /// Sets the allowed labels. Labels are lowercased and blanks dropped.
    #[must_use]
    pub fn with_labels_allow<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.labels_allow = normalize_labels(labels);
        self
    }

    /// Sets the excluded labels. Labels are lowercased and blanks dropped.
    #[must_use]
    pub fn with_labels_exclude<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.labels_exclude = normalize_labels(labels);
        self
    }

    /// Returns the age threshold, if configured.
    #[must_use]
    pub fn age_threshold(&self) -> Option<AgeThreshold> {
        self.age_threshold
    }

    /// Returns the normalized allowed labels.
    #[must_use]
    pub fn labels_allow(&self) -> &BTreeSet<String> {
        &self.labels_allow
    }

    /// Returns the normalized excluded labels.
    #[must_use]
    pub fn labels_exclude(&self) -> &BTreeSet<String> {
        &self.labels_exclude
    }

    /// Returns true if any clause is configured.
    ///
    /// An inactive restriction allows all content and is dropped when a
    /// permission set is built from its principal.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.age_threshold.is_some()
            || !self.labels_allow.is_empty()
            || !self.labels_exclude.is_empty()
    }

    /// Evaluates this restriction against a piece of content.
    ///
    /// The allow clauses are combined with OR: when both are configured,
    /// satisfying either one admits the content. A clause that is not
    /// configured has no opinion and never denies by itself. Once admitted,
    /// the exclude clauses are checked: an exclude match always denies,
    /// regardless of the allow outcome.
    ///
    /// An absent age rating never satisfies nor violates an age clause, and
    /// an empty label set never matches either label clause.
    #[must_use]
    pub fn is_content_allowed(
        &self,
        age_rating: Option<u32>,
        sharing_labels: &BTreeSet<String>,
    ) -> bool {
        let labels = normalize_labels(sharing_labels);
        let labels_allow = normalize_labels(&self.labels_allow);
        let labels_exclude = normalize_labels(&self.labels_exclude);

        let age_signal = match self.age_threshold {
            Some(threshold) if threshold.mode == AllowExclude::AllowOnly => {
                match age_rating {
                    Some(age) if age <= threshold.age => Signal::Pass,
                    _ => Signal::Fail,
                }
            }
            _ => Signal::NotConfigured,
        };

        let label_signal = if labels_allow.is_empty() {
            Signal::NotConfigured
        } else if intersects(&labels_allow, &labels) {
            Signal::Pass
        } else {
            Signal::Fail
        };

        let admitted = match (age_signal, label_signal) {
            (Signal::NotConfigured, Signal::NotConfigured) => true,
            (Signal::NotConfigured, Signal::Pass) => true,
            (Signal::NotConfigured, Signal::Fail) => false,
            (Signal::Pass, Signal::NotConfigured) => true,
            (Signal::Fail, Signal::NotConfigured) => false,
            (Signal::Pass, Signal::Pass) => true,
            (Signal::Pass, Signal::Fail) => true,
            (Signal::Fail, Signal::Pass) => true,
            (Signal::Fail, Signal::Fail) => false,
        };
        if !admitted {
            return false;
        }

        let age_denied = match self.age_threshold {
            Some(threshold) if threshold.mode == AllowExclude::Exclude => {
                matches!(age_rating, Some(age) if age >= threshold.age)
            }
            _ => false,
        };

        let label_denied = !labels_exclude.is_empty() && intersects(&labels_exclude, &labels);

        !age_denied && !label_denied
    }
}

/// Lowercases labels and drops blank ones.
pub(crate) fn normalize_labels<I, S>(labels: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    labels
        .into_iter()
        .filter(|label| !label.as_ref().trim().is_empty())
        .map(|label| label.as_ref().to_lowercase())
        .collect()
}

fn intersects(a: &BTreeSet<String>, b: &BTreeSet<String>) -> bool {
    a.intersection(b).next().is_some()
}
