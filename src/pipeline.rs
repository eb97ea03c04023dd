use log::info;

use crate::{
    error::Result,
    layout::Layout,
    report::{self, Outputs, SummaryRow},
    solutions::{count_solutions, SolutionCounts},
    timing::{dpll_averages, dpll_times, walksat_averages, walksat_times, BucketTimes},
};

/// Everything one run computed, bucket by bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub solutions: SolutionCounts,
    pub dpll: BucketTimes,
    pub walksat: BucketTimes,
    pub dpll_avg_ms: Vec<i64>,
    pub walksat_avg_ms: Vec<Option<i64>>,
}

impl Aggregates {
    pub fn summary_rows(&self, layout: &Layout) -> Vec<SummaryRow> {
        (0..layout.bucket_count())
            .map(|bucket| {
                let (first_param, last_param) = layout.bucket_params(bucket);
                let solved = self.solutions.get(bucket);
                SummaryRow {
                    bucket,
                    first_param,
                    last_param,
                    solved,
                    solution_ratio: f64::from(solved) / f64::from(layout.trials),
                    dpll_records: self.dpll.records[bucket],
                    dpll_avg_ms: self.dpll_avg_ms[bucket],
                    walksat_files: self.walksat.files[bucket],
                    walksat_records: self.walksat.records[bucket],
                    walksat_avg_ms: self.walksat_avg_ms[bucket],
                }
            })
            .collect()
    }
}

// Stages only leave flame spans behind when a flamegraph was asked for.
fn stage<T>(profile: bool, name: &'static str, work: impl FnOnce() -> Result<T>) -> Result<T> {
    if profile {
        flame::span_of(name, work)
    } else {
        work()
    }
}

/// Runs the three stages in order, writing each record as soon as its stage
/// finishes. A failing stage leaves the earlier records in place.
pub fn run(layout: &Layout, outputs: &Outputs) -> Result<Aggregates> {
    let profile = outputs.flamegraph;
    layout.validate()?;
    info!(
        "Aggregating parameters {}..{} of {:?} into {} buckets",
        layout.first,
        layout.end,
        layout.root,
        layout.bucket_count()
    );

    let solutions = stage(profile, "count_solutions", || count_solutions(layout))?;
    report::write_record(
        &outputs.solutions(),
        &report::render_ratios(&solutions.ratios(layout.trials)),
    )?;

    let dpll = stage(profile, "dpll_times", || dpll_times(layout))?;
    let dpll_avg_ms = dpll_averages(&dpll, layout.trials);
    report::write_record(&outputs.dpll(), &report::render_millis(&dpll_avg_ms))?;

    let walksat = stage(profile, "walksat_times", || walksat_times(layout))?;
    let walksat_avg_ms = walksat_averages(&walksat, &solutions, layout.walksat_runs);
    report::write_record(&outputs.walksat(), &report::render_walksat(&walksat_avg_ms))?;

    let aggregates = Aggregates {
        solutions,
        dpll,
        walksat,
        dpll_avg_ms,
        walksat_avg_ms,
    };
    if let Some(path) = &outputs.summary {
        report::write_summary(path, &aggregates.summary_rows(layout))?;
    }
    Ok(aggregates)
}

#[cfg(test)]
use crate::{
    error::StatsError,
    fixtures::{add_solutions, empty_tree, small_layout, write_dpll, write_walksat, Run},
};
#[cfg(test)]
use std::fs;

#[test]
fn writes_all_three_records() {
    let tree = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let layout = Layout::with_root(tree.path());
    empty_tree(&layout);

    add_solutions(&layout, 1500, 2);
    add_solutions(&layout, 1524, 1);
    write_dpll(&layout, 1500, &[Run::Solved(1.0), Run::Solved(0.5), Run::Unsolved(60.0)]);
    write_walksat(&layout, 1500, &[Run::Solved(0.25), Run::Solved(0.25)]);
    write_walksat(&layout, 1510, &[Run::Solved(1.0)]);

    // Bucket 5 has solutions but no WalkSat logs.
    add_solutions(&layout, 1630, 4);
    write_dpll(&layout, 1630, &[Run::Solved(2.0)]);

    let aggregates = run(&layout, &Outputs::in_dir(out.path())).unwrap();
    assert_eq!(aggregates.solutions.get(0), 3);
    assert_eq!(aggregates.solutions.get(5), 4);

    let solutions = fs::read_to_string(out.path().join(report::SOLUTIONS_FILE)).unwrap();
    let tokens: Vec<&str> = solutions.split_terminator(';').collect();
    assert_eq!(tokens.len(), 80);
    assert_eq!(tokens[0], "0,03");
    assert_eq!(tokens[5], "0,04");
    assert_eq!(tokens[1], "0,0");

    let dpll = fs::read_to_string(out.path().join(report::DPLL_FILE)).unwrap();
    let tokens: Vec<&str> = dpll.split_terminator(';').collect();
    assert_eq!(tokens.len(), 80);
    assert_eq!(tokens[0], "615");
    assert_eq!(tokens[5], "20");
    assert_eq!(tokens[79], "0");

    // Bucket 0: 1500 ms over 3 solved instances of 5 runs each.
    let walksat = fs::read_to_string(out.path().join(report::WALKSAT_FILE)).unwrap();
    let tokens: Vec<&str> = walksat.split(';').collect();
    assert_eq!(tokens.len(), 81);
    assert_eq!(tokens[0], "100");
    assert_eq!(tokens[5], "");
    assert!(tokens[1..80].iter().all(|t| t.is_empty()));
    assert_eq!(aggregates.walksat_avg_ms[5], Some(0));
    assert_eq!(aggregates.walksat_avg_ms[1], None);
}

#[test]
fn summary_table_has_a_row_per_bucket() {
    let tree = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let layout = small_layout(tree.path());
    empty_tree(&layout);
    add_solutions(&layout, 107, 1);
    write_walksat(&layout, 107, &[Run::Solved(0.5)]);

    let outputs = Outputs {
        summary: Some(out.path().join("summary.csv")),
        ..Outputs::in_dir(out.path())
    };
    let aggregates = run(&layout, &outputs).unwrap();

    let rows = aggregates.summary_rows(&layout);
    assert_eq!(rows.len(), 2);
    assert_eq!((rows[1].first_param, rows[1].last_param), (105, 109));
    assert_eq!(rows[1].walksat_avg_ms, Some(100));
    assert_eq!(rows[0].walksat_avg_ms, None);

    let summary = fs::read_to_string(out.path().join("summary.csv")).unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "0,100,104,0,0.0,0,0,0,0,");
    assert_eq!(lines[2], "1,105,109,1,0.01,0,0,1,1,100");
}

#[test]
fn stages_are_profiled_only_on_request() {
    let tree = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let layout = small_layout(tree.path());
    empty_tree(&layout);
    write_dpll(&layout, 104, &[Run::Solved(0.5)]);

    flame::clear();
    run(&layout, &Outputs::in_dir(out.path())).unwrap();
    assert!(flame::spans().is_empty());

    let profiled = Outputs {
        flamegraph: true,
        ..Outputs::in_dir(out.path())
    };
    run(&layout, &profiled).unwrap();
    let names: Vec<String> = flame::spans().iter().map(|span| span.name.to_string()).collect();
    assert_eq!(names, vec!["count_solutions", "dpll_times", "walksat_times"]);
    flame::clear();
}

#[test]
fn failed_stage_keeps_earlier_records() {
    let tree = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let layout = small_layout(tree.path());
    empty_tree(&layout);
    fs::remove_file(layout.dpll_results(103)).unwrap();

    let result = run(&layout, &Outputs::in_dir(out.path()));
    assert!(matches!(result, Err(StatsError::ResultsFile { .. })));
    assert_eq!(
        fs::read_to_string(out.path().join(report::SOLUTIONS_FILE)).unwrap(),
        "0,0;0,0;"
    );
    assert!(!out.path().join(report::DPLL_FILE).exists());
}

#[test]
fn invalid_layout_reads_nothing() {
    let out = tempfile::tempdir().unwrap();
    let layout = Layout {
        width: 0,
        ..Layout::with_root(out.path().join("absent"))
    };
    assert!(matches!(
        run(&layout, &Outputs::in_dir(out.path())),
        Err(StatsError::Config(_))
    ));
    assert!(!out.path().join(report::SOLUTIONS_FILE).exists());
}
