//! Typed errors for dataset loading and phase aggregation.

use thiserror::Error;

/// Failure while turning trial timings into phase summaries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregateError {
    /// No trial of the task matched the phase filter.
    #[error("missing phase data: task `{task}` has no trials for phase `{phase}`")]
    MissingPhaseData { task: String, phase: String },

    /// A single-valued phase matched more than one trial.
    #[error("ambiguous phase data: task `{task}` has {count} trials for phase `{phase}`, expected exactly one")]
    AmbiguousPhaseData {
        task: String,
        phase: String,
        count: usize,
    },

    /// A selected trial label does not carry a thread count.
    #[error("malformed trial label `{label}`: expected `<word> <threads> <layout>`")]
    MalformedLabel { label: String },
}

/// Failure while loading an embedded benchmark dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to parse dataset `{name}`: {source}")]
    Parse {
        name: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("task `{0}` is declared more than once")]
    DuplicateTask(String),

    #[error("task `{task}` declares trial `{label}` more than once")]
    DuplicateLabel { task: String, label: String },

    #[error("task `{task}` trial `{label}` has invalid timing {seconds}")]
    InvalidTiming {
        task: String,
        label: String,
        seconds: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_phase_message_names_task_and_phase() {
        let err = AggregateError::MissingPhaseData {
            task: "Zip Code Search".to_string(),
            phase: "Parallel OOA".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("Zip Code Search"));
        assert!(message.contains("Parallel OOA"));
    }

    #[test]
    fn test_malformed_label_message() {
        let err = AggregateError::MalformedLabel {
            label: "Par x AOO".to_string(),
        };
        assert!(err.to_string().contains("`Par x AOO`"));
    }
}
