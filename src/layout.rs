use std::{
    ops::Range,
    path::{Path, PathBuf},
};

use crate::error::{Result, StatsError};

pub const DEFAULT_ROOT: &str = "tests";
pub const DEFAULT_PREFIX: &str = "M";
pub const DEFAULT_FIRST: u32 = 1500;
pub const DEFAULT_END: u32 = 3500;
pub const DEFAULT_WIDTH: u32 = 25;
pub const DEFAULT_TRIALS: u32 = 100;
pub const DEFAULT_WALKSAT_RUNS: u32 = 5;

/// Where the experiment tree lives and how its parameters fold into buckets.
///
/// Every parameter `i` in `first..end` owns a directory `<root>/<prefix><i>`
/// holding the solver outputs for that parameter:
/// - `results<prefix><i>_<n>` files, one per instance the solver solved,
/// - `results<prefix><i>.txt`, the DPLL log,
/// - `resultswalk<prefix><i>.txt`, the WalkSat log (optional).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    pub prefix: String,
    pub first: u32,
    pub end: u32,
    pub width: u32,
    pub trials: u32,
    pub walksat_runs: u32,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            root: PathBuf::from(DEFAULT_ROOT),
            prefix: DEFAULT_PREFIX.to_string(),
            first: DEFAULT_FIRST,
            end: DEFAULT_END,
            width: DEFAULT_WIDTH,
            trials: DEFAULT_TRIALS,
            walksat_runs: DEFAULT_WALKSAT_RUNS,
        }
    }
}

impl Layout {
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        Layout {
            root: root.as_ref().to_path_buf(),
            ..Layout::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.end <= self.first {
            return Err(StatsError::Config(format!(
                "empty parameter range {}..{}",
                self.first, self.end
            )));
        }
        if self.width == 0 {
            return Err(StatsError::Config("bucket width must be positive".to_string()));
        }
        if self.trials == 0 {
            return Err(StatsError::Config("trial count must be positive".to_string()));
        }
        if self.walksat_runs == 0 {
            return Err(StatsError::Config(
                "WalkSat run count must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn params(&self) -> Range<u32> {
        self.first..self.end
    }

    pub fn bucket_count(&self) -> usize {
        ((self.end - self.first) as usize).div_ceil(self.width as usize)
    }

    pub fn bucket_of(&self, param: u32) -> Option<usize> {
        if !self.params().contains(&param) {
            return None;
        }
        Some(((param - self.first) / self.width) as usize)
    }

    /// Inclusive parameter range folded into `bucket`.
    pub fn bucket_params(&self, bucket: usize) -> (u32, u32) {
        let low = self.first + bucket as u32 * self.width;
        let high = low.saturating_add(self.width).min(self.end) - 1;
        (low, high)
    }

    pub fn parameter_dir(&self, param: u32) -> PathBuf {
        self.root.join(format!("{}{}", self.prefix, param))
    }

    pub fn dpll_results(&self, param: u32) -> PathBuf {
        self.parameter_dir(param)
            .join(format!("results{}{}.txt", self.prefix, param))
    }

    pub fn walksat_results(&self, param: u32) -> PathBuf {
        self.parameter_dir(param)
            .join(format!("resultswalk{}{}.txt", self.prefix, param))
    }

    /// Substring shared by the names of every solved-instance file of `param`.
    pub fn solution_marker(&self, param: u32) -> String {
        format!("results{}{}_", self.prefix, param)
    }
}

#[test]
fn default_layout_has_80_buckets() {
    let layout = Layout::default();
    assert_eq!(layout.bucket_count(), 80);
    assert!(layout.validate().is_ok());
}

#[test]
fn every_parameter_maps_into_a_bucket() {
    let layout = Layout::default();
    for i in 1500..3500 {
        let bucket = layout.bucket_of(i).unwrap();
        assert_eq!(bucket, ((i - 1500) / 25) as usize);
        assert!(bucket < 80);
    }
    assert_eq!(layout.bucket_of(1499), None);
    assert_eq!(layout.bucket_of(3500), None);
}

#[test]
fn bucket_params_cover_the_range() {
    let layout = Layout::default();
    assert_eq!(layout.bucket_params(0), (1500, 1524));
    assert_eq!(layout.bucket_params(79), (3475, 3499));

    let uneven = Layout {
        first: 0,
        end: 10,
        width: 4,
        ..Layout::default()
    };
    assert_eq!(uneven.bucket_count(), 3);
    assert_eq!(uneven.bucket_of(9), Some(2));
    assert_eq!(uneven.bucket_params(2), (8, 9));
}

#[test]
fn paths_follow_naming_convention() {
    let layout = Layout::with_root("/data/tests");
    assert_eq!(layout.parameter_dir(1500), PathBuf::from("/data/tests/M1500"));
    assert_eq!(
        layout.dpll_results(1500),
        PathBuf::from("/data/tests/M1500/resultsM1500.txt")
    );
    assert_eq!(
        layout.walksat_results(1500),
        PathBuf::from("/data/tests/M1500/resultswalkM1500.txt")
    );
    assert_eq!(layout.solution_marker(1500), "resultsM1500_");
}

#[test]
fn rejects_degenerate_configuration() {
    let empty = Layout {
        end: 1500,
        ..Layout::default()
    };
    assert!(matches!(empty.validate(), Err(StatsError::Config(_))));

    let zero_width = Layout {
        width: 0,
        ..Layout::default()
    };
    assert!(matches!(zero_width.validate(), Err(StatsError::Config(_))));

    let zero_trials = Layout {
        trials: 0,
        ..Layout::default()
    };
    assert!(matches!(zero_trials.validate(), Err(StatsError::Config(_))));

    let zero_runs = Layout {
        walksat_runs: 0,
        ..Layout::default()
    };
    assert!(matches!(zero_runs.validate(), Err(StatsError::Config(_))));
}

#[test]
fn wide_bucket_clamps_to_range_end() {
    let layout = Layout {
        first: 0,
        end: 10,
        width: u32::MAX,
        ..Layout::default()
    };
    assert_eq!(layout.bucket_count(), 1);
    assert_eq!(layout.bucket_of(9), Some(0));
    assert_eq!(layout.bucket_params(0), (0, 9));

    let near_max = Layout {
        first: u32::MAX - 10,
        end: u32::MAX,
        width: 8,
        ..Layout::default()
    };
    assert_eq!(near_max.bucket_params(1), (u32::MAX - 2, u32::MAX - 1));
}
