//! Phase aggregation.
//!
//! Each task's trials are reduced to one representative value per phase.
//! A phase is a filter over trial labels plus a reduction rule; the two
//! built-in [`AggregationMode`]s differ only in how the parallel phases are
//! reduced.

use crate::error::AggregateError;
use crate::models::{
    BenchmarkSet, Layout, PhaseSummary, PhaseValue, Selection, TaskResults, Trial, TrialLabel,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub const PHASE_SEQUENTIAL: &str = "Sequential";
pub const PHASE_PARALLEL_AOO: &str = "Parallel AOO";
pub const PHASE_PARALLEL_OOA: &str = "Parallel OOA";

/// How the parallel phases are reduced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationMode {
    /// Fastest parallel trial per layout, annotated with its thread count
    #[default]
    SelectMin,
    /// Mean over all parallel trials per layout
    Mean,
}

impl AggregationMode {
    /// The three phases of this mode: sequential baseline, parallel AOO, parallel OOA.
    pub fn phases(&self) -> Vec<PhaseDefinition> {
        let parallel = match self {
            AggregationMode::SelectMin => Reduction::SelectMin,
            AggregationMode::Mean => Reduction::Mean,
        };

        vec![
            PhaseDefinition::new(PHASE_SEQUENTIAL, PhaseFilter::Sequential, Reduction::Single),
            PhaseDefinition::new(
                PHASE_PARALLEL_AOO,
                PhaseFilter::Parallel(Layout::Aoo),
                parallel,
            ),
            PhaseDefinition::new(
                PHASE_PARALLEL_OOA,
                PhaseFilter::Parallel(Layout::Ooa),
                parallel,
            ),
        ]
    }
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationMode::SelectMin => write!(f, "select-min"),
            AggregationMode::Mean => write!(f, "mean"),
        }
    }
}

/// Which trials are eligible for a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseFilter {
    /// Labels starting with `Seq`.
    Sequential,
    /// Parallel trials of one layout.
    ///
    /// AOO requires a `Par` prefix and excludes anything tagged `OOA`;
    /// OOA accepts any label tagged `OOA`.
    Parallel(Layout),
}

impl PhaseFilter {
    pub fn matches(&self, label: &TrialLabel) -> bool {
        match self {
            PhaseFilter::Sequential => label.is_sequential(),
            PhaseFilter::Parallel(Layout::Aoo) => {
                label.is_parallel() && label.has_layout(Layout::Aoo) && !label.has_layout(Layout::Ooa)
            }
            PhaseFilter::Parallel(Layout::Ooa) => label.has_layout(Layout::Ooa),
        }
    }
}

/// How the eligible trials collapse into one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Exactly one eligible trial; its value is used as is.
    Single,
    /// Minimum value; the winning label is kept. Ties go to the first trial.
    SelectMin,
    /// Arithmetic mean; no label is kept.
    Mean,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseDefinition {
    pub name: String,
    pub filter: PhaseFilter,
    pub reduction: Reduction,
}

impl PhaseDefinition {
    pub fn new(name: impl Into<String>, filter: PhaseFilter, reduction: Reduction) -> Self {
        Self {
            name: name.into(),
            filter,
            reduction,
        }
    }
}

/// Reduces benchmark tasks to phase summaries.
#[derive(Debug, Clone)]
pub struct Aggregator {
    phases: Vec<PhaseDefinition>,
}

impl Aggregator {
    pub fn new(phases: Vec<PhaseDefinition>) -> Self {
        Self { phases }
    }

    pub fn for_mode(mode: AggregationMode) -> Self {
        Self::new(mode.phases())
    }

    pub fn phase_names(&self) -> Vec<String> {
        self.phases.iter().map(|p| p.name.clone()).collect()
    }

    /// Summarizes every task in set order. The first failing task aborts the run.
    pub fn summarize(&self, set: &BenchmarkSet) -> Result<Vec<PhaseSummary>, AggregateError> {
        set.tasks()
            .iter()
            .map(|task| self.summarize_task(task))
            .collect()
    }

    pub fn summarize_task(&self, task: &TaskResults) -> Result<PhaseSummary, AggregateError> {
        let phases = self
            .phases
            .iter()
            .map(|phase| reduce(task, phase))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PhaseSummary {
            task: task.name().to_string(),
            phases,
        })
    }
}

fn reduce(task: &TaskResults, phase: &PhaseDefinition) -> Result<PhaseValue, AggregateError> {
    let eligible: Vec<&Trial> = task
        .trials()
        .iter()
        .filter(|t| phase.filter.matches(&t.label))
        .collect();

    if eligible.is_empty() {
        return Err(AggregateError::MissingPhaseData {
            task: task.name().to_string(),
            phase: phase.name.clone(),
        });
    }

    let value = match phase.reduction {
        Reduction::Single => {
            if eligible.len() > 1 {
                return Err(AggregateError::AmbiguousPhaseData {
                    task: task.name().to_string(),
                    phase: phase.name.clone(),
                    count: eligible.len(),
                });
            }
            PhaseValue {
                phase: phase.name.clone(),
                seconds: eligible[0].seconds,
                selected: None,
            }
        }
        Reduction::SelectMin => {
            let mut best = eligible[0];
            for &trial in &eligible[1..] {
                if trial.seconds < best.seconds {
                    best = trial;
                }
            }
            let threads = best.label.thread_count()?;
            PhaseValue {
                phase: phase.name.clone(),
                seconds: best.seconds,
                selected: Some(Selection {
                    label: best.label.clone(),
                    threads,
                }),
            }
        }
        Reduction::Mean => {
            let sum: f64 = eligible.iter().map(|t| t.seconds).sum();
            PhaseValue {
                phase: phase.name.clone(),
                seconds: sum / eligible.len() as f64,
                selected: None,
            }
        }
    };

    debug!(
        task = task.name(),
        phase = %phase.name,
        trials = eligible.len(),
        seconds = value.seconds,
        selected = ?value.selected.as_ref().map(|s| s.label.as_str()),
        "Reduced phase"
    );

    Ok(value)
}
