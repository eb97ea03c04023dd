use std::{
    fs,
    path::{Path, PathBuf},
};

use log::info;

use crate::error::{Result, StatsError};

pub const SOLUTIONS_FILE: &str = "nOfSolutions.txt";
pub const DPLL_FILE: &str = "timeStatsdpll.txt";
pub const WALKSAT_FILE: &str = "timeStatswalk.txt";
pub const FLAMEGRAPH_FILE: &str = "flamegraph.html";

pub const SUMMARY_HEADER: [&str; 10] = [
    "bucket",
    "first_param",
    "last_param",
    "solved",
    "solution_ratio",
    "dpll_records",
    "dpll_avg_ms",
    "walksat_files",
    "walksat_records",
    "walksat_avg_ms",
];

/// Where a run writes its results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outputs {
    pub dir: PathBuf,
    pub summary: Option<PathBuf>,
    pub flamegraph: bool,
}

impl Default for Outputs {
    fn default() -> Self {
        Outputs {
            dir: PathBuf::from("."),
            summary: None,
            flamegraph: false,
        }
    }
}

impl Outputs {
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Outputs {
            dir: dir.as_ref().to_path_buf(),
            ..Outputs::default()
        }
    }

    pub fn solutions(&self) -> PathBuf {
        self.dir.join(SOLUTIONS_FILE)
    }

    pub fn dpll(&self) -> PathBuf {
        self.dir.join(DPLL_FILE)
    }

    pub fn walksat(&self) -> PathBuf {
        self.dir.join(WALKSAT_FILE)
    }

    pub fn flamegraph(&self) -> PathBuf {
        self.dir.join(FLAMEGRAPH_FILE)
    }
}

pub fn decimal_comma(token: &str) -> String {
    token.replace('.', ",")
}

// `{:?}` keeps the fractional part of whole numbers (`1.0`, `0.0`).
fn float_token(value: f64) -> String {
    let repr = format!("{:?}", value);
    let repr = padded_exponent(&repr).unwrap_or(repr);
    decimal_comma(&repr)
}

// Exponents carry a sign and at least two digits: `1e-5` becomes `1e-05`, `1e16` becomes `1e+16`.
fn padded_exponent(repr: &str) -> Option<String> {
    let (mantissa, exponent) = repr.split_once('e')?;
    let exponent: i32 = exponent.parse().ok()?;
    let sign = if exponent < 0 { '-' } else { '+' };
    Some(format!("{}e{}{:02}", mantissa, sign, exponent.abs()))
}

pub fn render_ratios(ratios: &[f64]) -> String {
    ratios
        .iter()
        .map(|&ratio| float_token(ratio) + ";")
        .collect()
}

pub fn render_millis(millis: &[i64]) -> String {
    millis
        .iter()
        .map(|ms| decimal_comma(&ms.to_string()) + ";")
        .collect()
}

/// Buckets without a solved instance and buckets averaging 0 ms both
/// render as an empty token.
pub fn render_walksat(millis: &[Option<i64>]) -> String {
    millis
        .iter()
        .map(|ms| match ms {
            None | Some(0) => ";".to_string(),
            Some(ms) => decimal_comma(&ms.to_string()) + ";",
        })
        .collect()
}

pub fn write_record(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|source| StatsError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote {:?}", path);
    Ok(())
}

/// One line of the per-bucket summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub bucket: usize,
    pub first_param: u32,
    pub last_param: u32,
    pub solved: u32,
    pub solution_ratio: f64,
    pub dpll_records: usize,
    pub dpll_avg_ms: i64,
    pub walksat_files: usize,
    pub walksat_records: usize,
    pub walksat_avg_ms: Option<i64>,
}

impl SummaryRow {
    fn fields(&self) -> Vec<String> {
        vec![
            self.bucket.to_string(),
            self.first_param.to_string(),
            self.last_param.to_string(),
            self.solved.to_string(),
            format!("{:?}", self.solution_ratio),
            self.dpll_records.to_string(),
            self.dpll_avg_ms.to_string(),
            self.walksat_files.to_string(),
            self.walksat_records.to_string(),
            self.walksat_avg_ms.map(|ms| ms.to_string()).unwrap_or_default(),
        ]
    }
}

pub fn write_summary(path: &Path, rows: &[SummaryRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(SUMMARY_HEADER)?;
    for row in rows {
        writer.write_record(row.fields())?;
    }
    writer.flush().map_err(|source| StatsError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote summary of {} buckets to {:?}", rows.len(), path);
    Ok(())
}

#[test]
fn ratios_use_decimal_comma() {
    assert_eq!(render_ratios(&[0.37, 1.0, 0.0, 0.05]), "0,37;1,0;0,0;0,05;");
}

#[test]
fn tiny_and_huge_ratios_use_padded_exponents() {
    assert_eq!(
        render_ratios(&[0.00001, 0.000015, 1e16, 0.0001, 2.5e-7]),
        "1e-05;1,5e-05;1e+16;0,0001;2,5e-07;"
    );
}

#[test]
fn ratio_record_has_a_token_per_bucket() {
    let rendered = render_ratios(&vec![0.25; 80]);
    assert_eq!(rendered.matches(';').count(), 80);
    assert!(rendered.ends_with(';'));
    assert_eq!(rendered.split(';').filter(|t| !t.is_empty()).count(), 80);
}

#[test]
fn millis_are_plain_integers() {
    assert_eq!(render_millis(&[0, 12, 60000]), "0;12;60000;");
}

#[test]
fn walksat_flattens_zero_and_missing() {
    assert_eq!(render_walksat(&[Some(3), None, Some(0), Some(1200)]), "3;;;1200;");
}

#[test]
fn summary_keeps_missing_and_zero_apart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("summary.csv");
    let row = |bucket, walksat_avg_ms| SummaryRow {
        bucket,
        first_param: 1500,
        last_param: 1524,
        solved: 2,
        solution_ratio: 0.02,
        dpll_records: 100,
        dpll_avg_ms: 7,
        walksat_files: 1,
        walksat_records: 10,
        walksat_avg_ms,
    };
    write_summary(&path, &[row(0, None), row(1, Some(0))]).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], SUMMARY_HEADER.join(","));
    assert_eq!(lines[1], "0,1500,1524,2,0.02,100,7,1,10,");
    assert_eq!(lines[2], "1,1500,1524,2,0.02,100,7,1,10,0");
}

#[test]
fn unwritable_record_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join(SOLUTIONS_FILE);
    match write_record(&path, "0,0;") {
        Err(StatsError::Output { path: failed, .. }) => assert_eq!(failed, path),
        other => panic!("expected an output error, got {:?}", other),
    }
}
