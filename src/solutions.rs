use std::fs;

use glob::Pattern;
use log::{debug, info};

use crate::{
    error::{Result, StatsError},
    layout::Layout,
};

/// Number of solved-instance files found per bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionCounts {
    raw: Vec<u32>,
}

impl SolutionCounts {
    pub fn new(raw: Vec<u32>) -> Self {
        SolutionCounts { raw }
    }

    pub fn raw(&self) -> &[u32] {
        &self.raw
    }

    pub fn get(&self, bucket: usize) -> u32 {
        self.raw.get(bucket).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.raw.iter().sum()
    }

    /// Solved fraction of each bucket's trials.
    pub fn ratios(&self, trials: u32) -> Vec<f64> {
        self.raw
            .iter()
            .map(|&n| f64::from(n) / f64::from(trials))
            .collect()
    }
}

pub fn count_solutions(layout: &Layout) -> Result<SolutionCounts> {
    let mut raw = vec![0; layout.bucket_count()];
    for param in layout.params() {
        if let Some(bucket) = layout.bucket_of(param) {
            let found = count_in_dir(layout, param)?;
            debug!("{:?}: {} solution files", layout.parameter_dir(param), found);
            raw[bucket] += found;
        }
    }

    let counts = SolutionCounts::new(raw);
    info!(
        "Counted {} solution files across {} buckets",
        counts.total(),
        layout.bucket_count()
    );
    Ok(counts)
}

/// Counts the entries of `param`'s directory whose name carries its solution marker.
pub fn count_in_dir(layout: &Layout, param: u32) -> Result<u32> {
    let dir = layout.parameter_dir(param);
    let pattern = Pattern::new(&format!(
        "*{}*",
        Pattern::escape(&layout.solution_marker(param))
    ))?;
    let bucket_dir = |source| StatsError::BucketDir {
        path: dir.clone(),
        source,
    };

    let mut count = 0;
    for entry in fs::read_dir(&dir).map_err(bucket_dir)? {
        let entry = entry.map_err(bucket_dir)?;
        if pattern.matches(&entry.file_name().to_string_lossy()) {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
use crate::fixtures::{add_solutions, empty_tree, small_layout};

#[test]
fn counts_marker_files_per_bucket() {
    let dir = tempfile::tempdir().unwrap();
    let layout = small_layout(dir.path());
    empty_tree(&layout);
    add_solutions(&layout, 100, 3);
    add_solutions(&layout, 104, 2);
    add_solutions(&layout, 107, 4);

    let counts = count_solutions(&layout).unwrap();
    assert_eq!(counts.raw(), &[5, 4]);
    assert_eq!(counts.total(), 9);
    assert_eq!(counts.ratios(100), vec![0.05, 0.04]);
}

#[test]
fn ignores_logs_and_other_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let layout = small_layout(dir.path());
    empty_tree(&layout);
    let param_dir = layout.parameter_dir(101);
    fs::write(param_dir.join("resultswalkM101.txt"), "").unwrap();
    fs::write(param_dir.join("resultsM1010_1"), "").unwrap();
    fs::write(param_dir.join("problemM101_1.txt"), "").unwrap();
    fs::write(param_dir.join("resultsM101_1"), "").unwrap();

    assert_eq!(count_in_dir(&layout, 101).unwrap(), 1);
}

#[test]
fn marker_is_matched_literally() {
    let dir = tempfile::tempdir().unwrap();
    let layout = Layout {
        prefix: "M[".to_string(),
        ..small_layout(dir.path())
    };
    empty_tree(&layout);
    add_solutions(&layout, 102, 2);
    assert_eq!(count_in_dir(&layout, 102).unwrap(), 2);
}

#[test]
fn missing_parameter_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let layout = small_layout(dir.path());
    empty_tree(&layout);
    fs::remove_dir_all(layout.parameter_dir(108)).unwrap();

    match count_solutions(&layout) {
        Err(StatsError::BucketDir { path, .. }) => assert_eq!(path, layout.parameter_dir(108)),
        other => panic!("expected a missing directory error, got {:?}", other),
    }
}

#[test]
fn ratios_keep_bucket_order() {
    let counts = SolutionCounts::new(vec![100, 0, 37]);
    assert_eq!(counts.ratios(100), vec![1.0, 0.0, 0.37]);
    assert_eq!(counts.get(2), 37);
    assert_eq!(counts.get(9), 0);
}
