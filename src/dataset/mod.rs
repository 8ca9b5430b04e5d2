//! Embedded benchmark datasets.
//!
//! The timing tables are TOML documents compiled into the binary. They are
//! parsed and validated into a [`BenchmarkSet`] once at startup; nothing is
//! read from disk at runtime.

use crate::analysis::AggregationMode;
use crate::error::DatasetError;
use crate::models::{BenchmarkSet, TaskResults, Trial};
use serde::Deserialize;
use tracing::debug;

const SEARCH_TOML: &str = include_str!("../../data/search.toml");
const THREADED_TOML: &str = include_str!("../../data/threaded.toml");

/// Catalogue of embedded timing tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Dataset {
    /// Five API searches with 2/4/8/16-thread runs
    #[default]
    Search,
    /// Threaded runs with 2/4/8 threads
    Threaded,
}

impl Dataset {
    pub fn all() -> &'static [Dataset] {
        &[Dataset::Search, Dataset::Threaded]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Search => "search",
            Dataset::Threaded => "threaded",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Dataset::Search => "API searches, sequential vs. 2/4/8/16 threads (AOO and OOA)",
            Dataset::Threaded => "Threaded API runs, sequential vs. 2/4/8 threads (AOO and OOA)",
        }
    }

    /// Reduction mode the table was originally charted with.
    pub fn default_mode(&self) -> AggregationMode {
        match self {
            Dataset::Search => AggregationMode::SelectMin,
            Dataset::Threaded => AggregationMode::Mean,
        }
    }

    fn source(&self) -> &'static str {
        match self {
            Dataset::Search => SEARCH_TOML,
            Dataset::Threaded => THREADED_TOML,
        }
    }

    pub fn load(&self) -> Result<BenchmarkSet, DatasetError> {
        let set = parse(self.name(), self.source())?;
        debug!(
            dataset = self.name(),
            tasks = set.len(),
            "Loaded embedded dataset"
        );
        Ok(set)
    }
}

#[derive(Debug, Deserialize)]
struct DatasetFile {
    #[serde(default)]
    tasks: Vec<TaskEntry>,
}

#[derive(Debug, Deserialize)]
struct TaskEntry {
    name: String,
    #[serde(default)]
    trials: Vec<Trial>,
}

/// Parses a TOML timing table, keeping task and trial declaration order.
pub fn parse(name: &str, content: &str) -> Result<BenchmarkSet, DatasetError> {
    let file: DatasetFile = toml::from_str(content).map_err(|source| DatasetError::Parse {
        name: name.to_string(),
        source,
    })?;

    let tasks = file
        .tasks
        .into_iter()
        .map(|entry| TaskResults::new(entry.name, entry.trials))
        .collect::<Result<Vec<_>, _>>()?;

    BenchmarkSet::new(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Aggregator;

    #[test]
    fn test_all_datasets_load() {
        for dataset in Dataset::all() {
            let set = dataset.load().unwrap();
            assert!(!set.is_empty(), "{} is empty", dataset.name());
        }
    }

    #[test]
    fn test_search_dataset_order() {
        let set = Dataset::Search.load().unwrap();
        assert_eq!(
            set.task_names(),
            vec![
                "Date Range Search",
                "Borough Search",
                "Zip Code Search",
                "Injury Threshold Search",
                "Location Bounds Search",
            ]
        );
        assert!(set.tasks().iter().all(|t| t.trials().len() == 9));
    }

    #[test]
    fn test_datasets_summarize_in_their_default_mode() {
        for dataset in Dataset::all() {
            let set = dataset.load().unwrap();
            let summaries = Aggregator::for_mode(dataset.default_mode())
                .summarize(&set)
                .unwrap();
            assert_eq!(summaries.len(), set.len());
        }
    }

    #[test]
    fn test_search_dataset_zip_code_selection() {
        let set = Dataset::Search.load().unwrap();
        let task = set.get("Zip Code Search").unwrap();
        let summary = Aggregator::for_mode(AggregationMode::SelectMin)
            .summarize_task(task)
            .unwrap();
        assert_eq!(summary.values(), vec![0.0829295, 0.129948, 0.0692444]);
    }

    #[test]
    fn test_parse_empty_document() {
        let set = parse("empty", "").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_documents() {
        let err = parse("broken", "[[tasks]]\nname = 3").unwrap_err();
        assert!(matches!(err, DatasetError::Parse { .. }));

        let duplicate = r#"
[[tasks]]
name = "Load"
trials = [{ label = "Seq AOO", seconds = 1.0 }]

[[tasks]]
name = "Load"
trials = [{ label = "Seq AOO", seconds = 2.0 }]
"#;
        let err = parse("duplicate", duplicate).unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateTask(name) if name == "Load"));
    }
}
