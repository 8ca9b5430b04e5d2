//! Data models for benchmark tables and phase summaries.
//!
//! A [`BenchmarkSet`] is the immutable input: tasks in declaration order,
//! each holding labeled trial timings. A [`PhaseSummary`] is what the
//! aggregator derives from one task.

use crate::analysis::AggregationMode;
use crate::error::{AggregateError, DatasetError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Data layout under benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layout {
    /// Array of Objects.
    #[serde(rename = "AOO")]
    Aoo,
    /// Object of Arrays.
    #[serde(rename = "OOA")]
    Ooa,
}

impl Layout {
    /// The tag used inside trial labels.
    pub fn tag(&self) -> &'static str {
        match self {
            Layout::Aoo => "AOO",
            Layout::Ooa => "OOA",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Aoo => write!(f, "Array of Objects"),
            Layout::Ooa => write!(f, "Object of Arrays"),
        }
    }
}

/// Identifier of a single timing trial, e.g. `Seq AOO` or `Par 8 OOA`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrialLabel(String);

impl TrialLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the concurrency descriptor is `Seq`.
    pub fn is_sequential(&self) -> bool {
        self.0.starts_with("Seq")
    }

    /// Whether the concurrency descriptor is `Par`.
    pub fn is_parallel(&self) -> bool {
        self.0.starts_with("Par")
    }

    /// Whether the label carries the given layout tag anywhere.
    pub fn has_layout(&self, layout: Layout) -> bool {
        self.0.contains(layout.tag())
    }

    /// Parses the thread count from the second whitespace-separated token.
    ///
    /// The label must look like `<word> <integer> <word...>` with a positive
    /// integer, so `Par 8 AOO` yields 8 while `Seq AOO` is malformed.
    pub fn thread_count(&self) -> Result<u32, AggregateError> {
        let malformed = || AggregateError::MalformedLabel {
            label: self.0.clone(),
        };

        let mut tokens = self.0.split_whitespace();
        tokens.next().ok_or_else(malformed)?;
        let threads = tokens.next().ok_or_else(malformed)?;
        tokens.next().ok_or_else(malformed)?;

        match threads.parse::<u32>() {
            Ok(count) if count > 0 => Ok(count),
            _ => Err(malformed()),
        }
    }
}

impl fmt::Display for TrialLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrialLabel {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One labeled timing measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub label: TrialLabel,
    /// Elapsed time in seconds.
    pub seconds: f64,
}

impl Trial {
    #[allow(dead_code)] // Builder utility
    pub fn new(label: impl Into<String>, seconds: f64) -> Self {
        Self {
            label: TrialLabel::new(label),
            seconds,
        }
    }
}

/// Trial timings of one named task, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskResults {
    name: String,
    trials: Vec<Trial>,
}

impl TaskResults {
    /// Builds a task, rejecting repeated labels and negative or non-finite timings.
    pub fn new(name: impl Into<String>, trials: Vec<Trial>) -> Result<Self, DatasetError> {
        let name = name.into();
        validate_trials(&name, &trials)?;
        Ok(Self { name, trials })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    /// Looks up a trial timing by its exact label.
    #[allow(dead_code)] // Lookup utility
    pub fn get(&self, label: &str) -> Option<f64> {
        self.trials
            .iter()
            .find(|t| t.label.as_str() == label)
            .map(|t| t.seconds)
    }
}

fn validate_trials(task: &str, trials: &[Trial]) -> Result<(), DatasetError> {
    let mut seen = HashSet::new();

    for trial in trials {
        if !seen.insert(trial.label.as_str()) {
            return Err(DatasetError::DuplicateLabel {
                task: task.to_string(),
                label: trial.label.to_string(),
            });
        }
        if !trial.seconds.is_finite() || trial.seconds < 0.0 {
            return Err(DatasetError::InvalidTiming {
                task: task.to_string(),
                label: trial.label.to_string(),
                seconds: trial.seconds,
            });
        }
    }

    Ok(())
}

/// Benchmark tasks in chart order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BenchmarkSet {
    tasks: Vec<TaskResults>,
}

impl BenchmarkSet {
    /// Builds a set, rejecting repeated task names.
    pub fn new(tasks: Vec<TaskResults>) -> Result<Self, DatasetError> {
        {
            let mut seen = HashSet::new();
            if let Some(task) = tasks.iter().find(|t| !seen.insert(t.name())) {
                return Err(DatasetError::DuplicateTask(task.name().to_string()));
            }
        }
        Ok(Self { tasks })
    }

    pub fn tasks(&self) -> &[TaskResults] {
        &self.tasks
    }

    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    #[allow(dead_code)] // Lookup utility
    pub fn get(&self, name: &str) -> Option<&TaskResults> {
        self.tasks.iter().find(|t| t.name() == name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// The trial a selection phase picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub label: TrialLabel,
    /// Thread count parsed from the label.
    pub threads: u32,
}

/// Representative value of one phase for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseValue {
    /// Phase name, e.g. `Parallel AOO`.
    pub phase: String,
    /// Representative time in seconds.
    pub seconds: f64,
    /// Winning trial, only for select-min phases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<Selection>,
}

impl PhaseValue {
    pub fn threads(&self) -> Option<u32> {
        self.selected.as_ref().map(|s| s.threads)
    }
}

/// Phase values of one task, in phase definition order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub task: String,
    pub phases: Vec<PhaseValue>,
}

impl PhaseSummary {
    #[allow(dead_code)] // Utility for comparisons
    pub fn values(&self) -> Vec<f64> {
        self.phases.iter().map(|p| p.seconds).collect()
    }

    /// Ratio of the first (baseline) phase to the phase at `index`.
    ///
    /// Returns `None` for an out-of-range index or a zero-time phase.
    pub fn speedup(&self, index: usize) -> Option<f64> {
        let baseline = self.phases.first()?.seconds;
        let value = self.phases.get(index)?.seconds;
        if value == 0.0 {
            return None;
        }
        Some(baseline / value)
    }
}

/// Metadata about a generated summary report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Name of the embedded dataset.
    pub dataset: String,
    /// Reduction mode used for the parallel phases.
    pub mode: AggregationMode,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Number of tasks summarized.
    pub tasks: usize,
}

/// The complete summary report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    /// Phase names, in column order.
    pub phases: Vec<String>,
    pub summaries: Vec<PhaseSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_facets() {
        let seq = TrialLabel::from("Seq AOO");
        assert!(seq.is_sequential());
        assert!(!seq.is_parallel());
        assert!(seq.has_layout(Layout::Aoo));
        assert!(!seq.has_layout(Layout::Ooa));

        let par = TrialLabel::from("Par 16 OOA");
        assert!(par.is_parallel());
        assert!(par.has_layout(Layout::Ooa));
    }

    #[test]
    fn test_thread_count() {
        assert_eq!(TrialLabel::from("Par 8 AOO").thread_count(), Ok(8));
        assert_eq!(TrialLabel::from("Par  16   OOA").thread_count(), Ok(16));
        assert_eq!(TrialLabel::from("Par 2 OOA extra").thread_count(), Ok(2));
    }

    #[test]
    fn test_thread_count_malformed() {
        for label in ["Seq AOO", "Par", "Par 8", "Par eight AOO", "Par 0 AOO", "Par -2 AOO"] {
            assert_eq!(
                TrialLabel::from(label).thread_count(),
                Err(AggregateError::MalformedLabel {
                    label: label.to_string()
                }),
                "label {label:?}"
            );
        }
    }

    #[test]
    fn test_task_rejects_duplicate_label() {
        let err = TaskResults::new(
            "Load",
            vec![Trial::new("Seq AOO", 1.0), Trial::new("Seq AOO", 2.0)],
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateLabel { .. }));
    }

    #[test]
    fn test_task_rejects_invalid_timing() {
        let negative = TaskResults::new("Load", vec![Trial::new("Seq AOO", -0.5)]);
        assert!(matches!(negative, Err(DatasetError::InvalidTiming { .. })));

        let nan = TaskResults::new("Load", vec![Trial::new("Seq AOO", f64::NAN)]);
        assert!(matches!(nan, Err(DatasetError::InvalidTiming { .. })));
    }

    #[test]
    fn test_set_preserves_order_and_rejects_duplicates() {
        let a = TaskResults::new("B task", vec![Trial::new("Seq AOO", 1.0)]).unwrap();
        let b = TaskResults::new("A task", vec![Trial::new("Seq AOO", 2.0)]).unwrap();
        let set = BenchmarkSet::new(vec![a.clone(), b]).unwrap();
        assert_eq!(set.task_names(), vec!["B task", "A task"]);
        assert_eq!(set.get("A task").and_then(|t| t.get("Seq AOO")), Some(2.0));

        let err = BenchmarkSet::new(vec![a.clone(), a]).unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateTask(name) if name == "B task"));
    }

    #[test]
    fn test_speedup() {
        let summary = PhaseSummary {
            task: "Zip Code Search".to_string(),
            phases: vec![
                PhaseValue {
                    phase: "Sequential".to_string(),
                    seconds: 0.2,
                    selected: None,
                },
                PhaseValue {
                    phase: "Parallel AOO".to_string(),
                    seconds: 0.1,
                    selected: None,
                },
                PhaseValue {
                    phase: "Parallel OOA".to_string(),
                    seconds: 0.0,
                    selected: None,
                },
            ],
        };

        assert_eq!(summary.speedup(0), Some(1.0));
        assert_eq!(summary.speedup(1), Some(2.0));
        assert_eq!(summary.speedup(2), None);
        assert_eq!(summary.speedup(3), None);
    }
}
