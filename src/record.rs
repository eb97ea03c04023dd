use std::num::ParseFloatError;

use thiserror::Error;

pub const TIME_KEY: &str = "Time spent";
// The solvers print `%f` seconds; only the leading six characters are significant.
pub const TIME_FIELD_WIDTH: usize = 6;

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("record at line {line} ends before its time line")]
    Truncated { line: usize },

    #[error("line {line}: expected a `Time spent:` field")]
    MissingTimeField { line: usize },

    #[error("line {line}: invalid time value {value:?}: {source}")]
    InvalidTime {
        line: usize,
        value: String,
        source: ParseFloatError,
    },
}

/// Line geometry of one solver's results log.
///
/// Runs are appended one after another, each preceded by two blank lines.
/// An unsolved run spans `stride` lines. A solved run (header starting with
/// `S`) prints the assignment right after the header, so it spans one more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordFormat {
    pub first_record: usize,
    pub stride: usize,
}

impl RecordFormat {
    pub const DPLL: RecordFormat = RecordFormat {
        first_record: 2,
        stride: 5,
    };

    // WalkSat also reports its restart count.
    pub const WALKSAT: RecordFormat = RecordFormat {
        first_record: 2,
        stride: 6,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    pub solved: bool,
    pub seconds: f64,
    /// 1-based line of the record header.
    pub line: usize,
}

impl Record {
    pub fn millis(&self) -> f64 {
        self.seconds * 1000.0
    }
}

pub fn parse_records(text: &str, format: RecordFormat) -> Result<Vec<Record>, RecordError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut records = Vec::new();

    let mut index = format.first_record;
    while index + 1 < lines.len() {
        let solved = lines[index].starts_with('S');
        let extra = usize::from(solved);
        let time_line = index + 1 + extra;
        let line = lines
            .get(time_line)
            .ok_or(RecordError::Truncated { line: index + 1 })?;

        records.push(Record {
            solved,
            seconds: parse_time(line, time_line + 1)?,
            line: index + 1,
        });
        index += format.stride + extra;
    }

    Ok(records)
}

/// Reads the seconds value of a `Time spent: <seconds> secs` line.
pub fn parse_time(line: &str, number: usize) -> Result<f64, RecordError> {
    let value = line
        .split_once(':')
        .filter(|(key, _)| key.trim() == TIME_KEY)
        .and_then(|(_, value)| value.split_whitespace().next())
        .ok_or(RecordError::MissingTimeField { line: number })?;

    let field = match value.char_indices().nth(TIME_FIELD_WIDTH) {
        Some((end, _)) => &value[..end],
        None => value,
    };
    field.parse().map_err(|source| RecordError::InvalidTime {
        line: number,
        value: field.to_string(),
        source,
    })
}

#[cfg(test)]
use crate::fixtures::{dpll_log, walksat_log, Run};

#[test]
fn parses_unsolved_dpll_records() {
    let log = dpll_log(&[Run::Unsolved(0.001), Run::Unsolved(0.001), Run::Unsolved(0.001)]);
    let records = parse_records(&log, RecordFormat::DPLL).unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| !r.solved && r.seconds == 0.001));
    assert_eq!(records[0].line, 3);
    assert_eq!(records[1].line, 8);
}

#[test]
fn solved_records_take_an_extra_line() {
    let log = dpll_log(&[
        Run::Solved(0.5),
        Run::Unsolved(1.25),
        Run::Solved(2.0),
        Run::Solved(0.125),
    ]);
    let records = parse_records(&log, RecordFormat::DPLL).unwrap();
    let times: Vec<f64> = records.iter().map(|r| r.seconds).collect();
    let solved: Vec<bool> = records.iter().map(|r| r.solved).collect();
    assert_eq!(times, vec![0.5, 1.25, 2.0, 0.125]);
    assert_eq!(solved, vec![true, false, true, true]);
}

#[test]
fn walksat_records_use_the_longer_stride() {
    let log = walksat_log(&[Run::Solved(0.25), Run::Unsolved(60.0), Run::Solved(0.75)]);
    let records = parse_records(&log, RecordFormat::WALKSAT).unwrap();
    let times: Vec<f64> = records.iter().map(|r| r.seconds).collect();
    assert_eq!(times, vec![0.25, 60.0, 0.75]);
}

#[test]
fn sum_matches_embedded_times() {
    let runs = [0.012, 0.5, 3.25, 0.0, 1.5];
    let log = dpll_log(&runs.map(Run::Solved));
    let total: f64 = parse_records(&log, RecordFormat::DPLL)
        .unwrap()
        .iter()
        .map(Record::millis)
        .sum();
    let expected: f64 = runs.iter().map(|s| s * 1000.0).sum();
    assert!((total - expected).abs() < 1e-9);
}

#[test]
fn empty_and_header_only_logs_have_no_records() {
    assert!(parse_records("", RecordFormat::DPLL).unwrap().is_empty());
    assert!(parse_records("\n\n", RecordFormat::DPLL).unwrap().is_empty());
    assert!(parse_records("\n\nNO SOLUTION", RecordFormat::DPLL).unwrap().is_empty());
}

#[test]
fn time_value_is_cut_to_field_width() {
    assert_eq!(parse_time("Time spent: 0.123456 secs", 1).unwrap(), 0.1234);
    assert_eq!(parse_time("Time spent: 12.345678 secs", 1).unwrap(), 12.345);
    assert_eq!(parse_time("Time spent: 0.001000 secs", 1).unwrap(), 0.001);
    assert_eq!(parse_time("Time spent: 5", 1).unwrap(), 5.0);
}

#[test]
fn rejects_lines_without_time_field() {
    assert_eq!(
        parse_time("Number of steps: 12", 7),
        Err(RecordError::MissingTimeField { line: 7 })
    );
    assert_eq!(
        parse_time("Time spent:", 3),
        Err(RecordError::MissingTimeField { line: 3 })
    );
    assert!(matches!(
        parse_time("Time spent: abc secs", 4),
        Err(RecordError::InvalidTime { line: 4, .. })
    ));
}

#[test]
fn parsing_records_leaves_no_profiling_spans() {
    flame::clear();
    let log = dpll_log(&[Run::Solved(0.5); 20]);
    for _ in 0..100 {
        parse_records(&log, RecordFormat::DPLL).unwrap();
    }
    assert!(flame::spans().is_empty());
}

#[test]
fn truncated_solved_record_is_an_error() {
    let log = "\n\nSolution found with dpll!\nP1=true  \n";
    assert_eq!(
        parse_records(log, RecordFormat::DPLL),
        Err(RecordError::Truncated { line: 3 })
    );
}

#[test]
fn misaligned_record_reports_line() {
    let log = "\n\nNO SOLUTION EXISTS. Proved by dpll!\nNumber of steps: 3\n";
    assert_eq!(
        parse_records(log, RecordFormat::DPLL),
        Err(RecordError::MissingTimeField { line: 4 })
    );
}
