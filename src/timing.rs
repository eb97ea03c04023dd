use std::{fs, io::ErrorKind, path::Path};

use log::{debug, info};

use crate::{
    error::{Result, StatsError},
    layout::Layout,
    record::{parse_records, RecordFormat},
    solutions::SolutionCounts,
};

/// Solve times summed per bucket, in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketTimes {
    pub millis: Vec<f64>,
    pub records: Vec<usize>,
    pub files: Vec<usize>,
}

impl BucketTimes {
    pub fn new(buckets: usize) -> Self {
        BucketTimes {
            millis: vec![0.0; buckets],
            records: vec![0; buckets],
            files: vec![0; buckets],
        }
    }

    fn add_log(&mut self, bucket: usize, path: &Path, text: &str, format: RecordFormat) -> Result<()> {
        let records = parse_records(text, format).map_err(|source| StatsError::Record {
            path: path.to_path_buf(),
            source,
        })?;
        for record in &records {
            self.millis[bucket] += record.millis();
        }
        self.records[bucket] += records.len();
        self.files[bucket] += 1;
        Ok(())
    }
}

/// Sums the DPLL log of every parameter. Every log must exist.
pub fn dpll_times(layout: &Layout) -> Result<BucketTimes> {
    let mut times = BucketTimes::new(layout.bucket_count());
    for param in layout.params() {
        if let Some(bucket) = layout.bucket_of(param) {
            let path = layout.dpll_results(param);
            let text = fs::read_to_string(&path).map_err(|source| StatsError::ResultsFile {
                path: path.clone(),
                source,
            })?;
            times.add_log(bucket, &path, &text, RecordFormat::DPLL)?;
        }
    }
    info!(
        "Parsed {} DPLL records",
        times.records.iter().sum::<usize>()
    );
    Ok(times)
}

/// Sums the WalkSat log of every parameter that has one.
pub fn walksat_times(layout: &Layout) -> Result<BucketTimes> {
    let mut times = BucketTimes::new(layout.bucket_count());
    for param in layout.params() {
        if let Some(bucket) = layout.bucket_of(param) {
            let path = layout.walksat_results(param);
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    debug!("No WalkSat results at {:?}, skipping", path);
                    continue;
                }
                Err(source) => return Err(StatsError::ResultsFile { path, source }),
            };
            times.add_log(bucket, &path, &text, RecordFormat::WALKSAT)?;
        }
    }
    info!(
        "Parsed {} WalkSat records from {} files",
        times.records.iter().sum::<usize>(),
        times.files.iter().sum::<usize>()
    );
    Ok(times)
}

pub fn round_half_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Average milliseconds per trial.
pub fn dpll_averages(times: &BucketTimes, trials: u32) -> Vec<i64> {
    times
        .millis
        .iter()
        .map(|&sum| round_half_even(sum / f64::from(trials)))
        .collect()
}

/// Average milliseconds per WalkSat run over the solved instances of each
/// bucket. `None` when the bucket has no solved instance.
pub fn walksat_averages(times: &BucketTimes, solved: &SolutionCounts, runs: u32) -> Vec<Option<i64>> {
    times
        .millis
        .iter()
        .enumerate()
        .map(|(bucket, &sum)| match solved.get(bucket) {
            0 => None,
            count => Some(round_half_even(sum / (f64::from(count) * f64::from(runs)))),
        })
        .collect()
}

#[cfg(test)]
use crate::fixtures::{empty_tree, small_layout, write_dpll, write_walksat, Run};

#[test]
fn dpll_small_times_round_to_zero() {
    let dir = tempfile::tempdir().unwrap();
    let layout = Layout::with_root(dir.path());
    empty_tree(&layout);
    write_dpll(&layout, 1500, &[Run::Unsolved(0.001); 3]);

    let times = dpll_times(&layout).unwrap();
    assert_eq!(times.records[0], 3);
    assert!((times.millis[0] - 3.0).abs() < 1e-9);

    let averages = dpll_averages(&times, 100);
    assert_eq!(averages.len(), 80);
    assert_eq!(averages[0], 0);
}

#[test]
fn dpll_sums_all_parameters_of_a_bucket() {
    let dir = tempfile::tempdir().unwrap();
    let layout = small_layout(dir.path());
    empty_tree(&layout);
    write_dpll(&layout, 100, &[Run::Solved(2.5), Run::Unsolved(60.0)]);
    write_dpll(&layout, 103, &[Run::Solved(0.25)]);
    write_dpll(&layout, 109, &[Run::Solved(1.0), Run::Solved(1.0)]);

    let times = dpll_times(&layout).unwrap();
    assert_eq!(times.millis, vec![62750.0, 2000.0]);
    assert_eq!(times.records, vec![3, 2]);
    assert_eq!(times.files, vec![5, 5]);
    assert_eq!(dpll_averages(&times, 100), vec![628, 20]);
}

#[test]
fn missing_dpll_log_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let layout = small_layout(dir.path());
    empty_tree(&layout);
    fs::remove_file(layout.dpll_results(106)).unwrap();

    match dpll_times(&layout) {
        Err(StatsError::ResultsFile { path, .. }) => assert_eq!(path, layout.dpll_results(106)),
        other => panic!("expected a missing results error, got {:?}", other),
    }
}

#[test]
fn malformed_dpll_log_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let layout = small_layout(dir.path());
    empty_tree(&layout);
    fs::write(
        layout.dpll_results(102),
        "\n\nNO SOLUTION EXISTS. Proved by dpll!\nTime spent: ??? secs\n",
    )
    .unwrap();

    match dpll_times(&layout) {
        Err(StatsError::Record { path, .. }) => assert_eq!(path, layout.dpll_results(102)),
        other => panic!("expected a record error, got {:?}", other),
    }
}

#[test]
fn walksat_skips_missing_logs() {
    let dir = tempfile::tempdir().unwrap();
    let layout = small_layout(dir.path());
    empty_tree(&layout);
    write_walksat(&layout, 101, &[Run::Solved(0.5), Run::Solved(1.5)]);

    let times = walksat_times(&layout).unwrap();
    assert_eq!(times.millis, vec![2000.0, 0.0]);
    assert_eq!(times.files, vec![1, 0]);
}

#[test]
fn walksat_averages_over_solved_runs() {
    let times = BucketTimes {
        millis: vec![2000.0, 0.0, 900.0, 37.5],
        records: vec![2, 0, 3, 1],
        files: vec![1, 0, 1, 1],
    };
    let solved = SolutionCounts::new(vec![2, 4, 0, 1]);

    assert_eq!(
        walksat_averages(&times, &solved, 5),
        vec![Some(200), Some(0), None, Some(8)]
    );
}

#[test]
fn walksat_divisor_does_not_overflow() {
    let times = BucketTimes {
        millis: vec![1000.0],
        records: vec![2],
        files: vec![1],
    };
    let solved = SolutionCounts::new(vec![2]);
    assert_eq!(walksat_averages(&times, &solved, 3_000_000_000), vec![Some(0)]);
    assert_eq!(walksat_averages(&times, &solved, u32::MAX), vec![Some(0)]);
}

#[test]
fn unreadable_walksat_log_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let layout = small_layout(dir.path());
    empty_tree(&layout);
    fs::create_dir(layout.walksat_results(101)).unwrap();

    match walksat_times(&layout) {
        Err(StatsError::ResultsFile { path, .. }) => assert_eq!(path, layout.walksat_results(101)),
        other => panic!("expected a results file error, got {:?}", other),
    }
}

#[test]
fn averages_round_half_to_even() {
    assert_eq!(round_half_even(0.5), 0);
    assert_eq!(round_half_even(1.5), 2);
    assert_eq!(round_half_even(2.5), 2);
    assert_eq!(round_half_even(2.51), 3);

    let times = BucketTimes {
        millis: vec![50.0, 150.0, 250.0],
        records: vec![1, 1, 1],
        files: vec![1, 1, 1],
    };
    assert_eq!(dpll_averages(&times, 100), vec![0, 2, 2]);
}
