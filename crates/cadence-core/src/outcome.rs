//! Shared outcome vocabulary: transitions returned by decision actions and
//! terminal statuses of batch job runs.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Named outcome telling the orchestrator which path to take next.
///
/// `Ok` and `Nok` always exist. Actions that need more than a binary decision
/// declare extra labels as `Custom`; custom labels are upper-cased so that
/// `"review"` and `"REVIEW"` name the same transition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Transition {
    /// Success path
    Ok,
    /// Failure path
    Nok,
    /// Action-specific path
    Custom(String),
}

impl Transition {
    /// Create a transition from a label, folding the reserved names.
    /// A blank label folds to `Nok`.
    pub fn custom(label: impl AsRef<str>) -> Self {
        let label = label.as_ref().trim().to_uppercase();
        match label.as_str() {
            "OK" => Transition::Ok,
            "NOK" | "" => Transition::Nok,
            _ => Transition::Custom(label),
        }
    }

    /// Map a boolean decision onto the reserved pair
    #[inline]
    pub fn from_success(success: bool) -> Self {
        if success {
            Transition::Ok
        } else {
            Transition::Nok
        }
    }

    /// The transition label as the orchestrator sees it
    pub fn label(&self) -> &str {
        match self {
            Transition::Ok => "OK",
            Transition::Nok => "NOK",
            Transition::Custom(label) => label,
        }
    }

    /// Whether this is one of the two reserved transitions
    #[inline]
    pub fn is_reserved(&self) -> bool {
        matches!(self, Transition::Ok | Transition::Nok)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Transition {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Transition::custom(s))
    }
}

impl From<String> for Transition {
    fn from(label: String) -> Self {
        Transition::custom(label)
    }
}

impl From<Transition> for String {
    fn from(transition: Transition) -> Self {
        transition.label().to_string()
    }
}

/// Terminal classification of one batch job run.
///
/// Severity order is `Success < Warning < Error`. `Aborted` sits outside that
/// order: it compares equal only to itself and wins outright when statuses
/// are combined with [`JobStatus::escalate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Every processed item succeeded (or there were none)
    Success,
    /// Some, but not all, items failed
    Warning,
    /// Every item failed, or the item source failed
    Error,
    /// Stopped on an abort request
    Aborted,
}

impl JobStatus {
    /// Severity rank, `None` for `Aborted`
    pub fn severity(&self) -> Option<u8> {
        match self {
            JobStatus::Success => Some(0),
            JobStatus::Warning => Some(1),
            JobStatus::Error => Some(2),
            JobStatus::Aborted => None,
        }
    }

    /// Combine two statuses, keeping the more severe one
    pub fn escalate(self, other: JobStatus) -> JobStatus {
        match (self.severity(), other.severity()) {
            (None, _) => self,
            (_, None) => other,
            (Some(a), Some(b)) => {
                if b > a {
                    other
                } else {
                    self
                }
            }
        }
    }

    /// Aggregate per-item counts into a status for a run that was not aborted.
    ///
    /// `processed` counts attempts, not successes.
    pub fn from_counts(processed: u64, failed: u64) -> JobStatus {
        if failed == 0 {
            JobStatus::Success
        } else if failed < processed {
            JobStatus::Warning
        } else {
            JobStatus::Error
        }
    }

    /// Stable upper-case label
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Success => "SUCCESS",
            JobStatus::Warning => "WARNING",
            JobStatus::Error => "ERROR",
            JobStatus::Aborted => "ABORTED",
        }
    }
}

impl PartialOrd for JobStatus {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.severity(), other.severity()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            (None, None) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result half of a scheduler's `(result, state)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionResult {
    /// Run succeeded
    Success,
    /// Run finished with some failures
    Warning,
    /// Run failed
    Error,
    /// Result unknown, the run did not finish
    Unknown,
}

/// State half of a scheduler's `(result, state)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    /// The run went through its whole work sequence
    Finished,
    /// The run stopped early
    Aborted,
}

/// Conventional mapping of a [`JobStatus`] onto a cron-style scheduler's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformResult {
    /// Outcome of the run
    pub result: CompletionResult,
    /// Whether the run finished
    pub state: RunState,
}

impl From<JobStatus> for PerformResult {
    fn from(status: JobStatus) -> Self {
        let (result, state) = match status {
            JobStatus::Success => (CompletionResult::Success, RunState::Finished),
            JobStatus::Warning => (CompletionResult::Warning, RunState::Finished),
            JobStatus::Error => (CompletionResult::Error, RunState::Aborted),
            JobStatus::Aborted => (CompletionResult::Unknown, RunState::Aborted),
        };
        PerformResult { result, state }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_labels_fold() {
        assert_eq!(Transition::custom("ok"), Transition::Ok);
        assert_eq!(Transition::custom(" NOK "), Transition::Nok);
        assert_eq!(
            Transition::custom("review"),
            Transition::Custom("REVIEW".to_string())
        );
        assert_eq!("Review".parse::<Transition>().unwrap(), Transition::custom("REVIEW"));
    }

    #[test]
    fn test_blank_label_is_nok() {
        assert_eq!(Transition::custom(""), Transition::Nok);
        assert_eq!(Transition::custom("  \t"), Transition::Nok);
        assert_eq!("".parse::<Transition>().unwrap(), Transition::Nok);

        let back: Transition = serde_json::from_str("\" \"").unwrap();
        assert_eq!(back, Transition::Nok);
    }

    #[test]
    fn test_transition_display_and_serde() {
        assert_eq!(Transition::Ok.to_string(), "OK");
        assert_eq!(Transition::Nok.to_string(), "NOK");
        assert_eq!(Transition::custom("hold").to_string(), "HOLD");

        let json = serde_json::to_string(&Transition::custom("hold")).unwrap();
        assert_eq!(json, "\"HOLD\"");
        let back: Transition = serde_json::from_str("\"ok\"").unwrap();
        assert_eq!(back, Transition::Ok);
    }

    #[test]
    fn test_from_success() {
        assert_eq!(Transition::from_success(true), Transition::Ok);
        assert_eq!(Transition::from_success(false), Transition::Nok);
        assert!(Transition::Ok.is_reserved());
        assert!(!Transition::custom("x").is_reserved());
    }

    #[test]
    fn test_status_from_counts() {
        assert_eq!(JobStatus::from_counts(0, 0), JobStatus::Success);
        assert_eq!(JobStatus::from_counts(10, 0), JobStatus::Success);
        assert_eq!(JobStatus::from_counts(10, 2), JobStatus::Warning);
        assert_eq!(JobStatus::from_counts(10, 10), JobStatus::Error);
        assert_eq!(JobStatus::from_counts(1, 1), JobStatus::Error);
    }

    #[test]
    fn test_severity_order() {
        assert!(JobStatus::Success < JobStatus::Warning);
        assert!(JobStatus::Warning < JobStatus::Error);
        assert_eq!(JobStatus::Aborted.partial_cmp(&JobStatus::Error), None);
        assert_eq!(JobStatus::Success.partial_cmp(&JobStatus::Aborted), None);
        assert_eq!(
            JobStatus::Aborted.partial_cmp(&JobStatus::Aborted),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_escalate() {
        assert_eq!(JobStatus::Success.escalate(JobStatus::Warning), JobStatus::Warning);
        assert_eq!(JobStatus::Error.escalate(JobStatus::Warning), JobStatus::Error);
        assert_eq!(JobStatus::Error.escalate(JobStatus::Aborted), JobStatus::Aborted);
        assert_eq!(JobStatus::Aborted.escalate(JobStatus::Success), JobStatus::Aborted);
    }

    #[test]
    fn test_perform_result_mapping() {
        assert_eq!(
            PerformResult::from(JobStatus::Success),
            PerformResult { result: CompletionResult::Success, state: RunState::Finished }
        );
        assert_eq!(
            PerformResult::from(JobStatus::Warning),
            PerformResult { result: CompletionResult::Warning, state: RunState::Finished }
        );
        assert_eq!(
            PerformResult::from(JobStatus::Error),
            PerformResult { result: CompletionResult::Error, state: RunState::Aborted }
        );
        assert_eq!(
            PerformResult::from(JobStatus::Aborted),
            PerformResult { result: CompletionResult::Unknown, state: RunState::Aborted }
        );
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(serde_json::to_string(&JobStatus::Aborted).unwrap(), "\"ABORTED\"");
        let status: JobStatus = serde_json::from_str("\"WARNING\"").unwrap();
        assert_eq!(status, JobStatus::Warning);
    }
}
