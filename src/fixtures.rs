// Builders for solver logs and experiment trees used by the unit tests.

use std::{fmt::Write as _, fs, path::Path};

use crate::layout::Layout;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Run {
    Solved(f64),
    Unsolved(f64),
}

fn solver_log(runs: &[Run], solver: &str, restarts: bool) -> String {
    let mut out = String::new();
    for run in runs {
        let seconds = match *run {
            Run::Solved(seconds) => {
                write!(out, "\n\nSolution found with {}!\n", solver).unwrap();
                out.push_str("P1=true  P2=false  P3=true  \n");
                seconds
            }
            Run::Unsolved(seconds) => {
                write!(out, "\n\nNO SOLUTION found with {}...\n", solver).unwrap();
                seconds
            }
        };
        writeln!(out, "Time spent: {:.6} secs", seconds).unwrap();
        if restarts {
            out.push_str("Number of restarts: 3\n");
        }
        out.push_str("Number of steps: 42\n");
    }
    out
}

pub(crate) fn dpll_log(runs: &[Run]) -> String {
    solver_log(runs, "dpll", false)
}

pub(crate) fn walksat_log(runs: &[Run]) -> String {
    solver_log(runs, "walksat", true)
}

/// Creates every parameter directory with an empty DPLL log.
pub(crate) fn empty_tree(layout: &Layout) {
    for param in layout.params() {
        fs::create_dir_all(layout.parameter_dir(param)).unwrap();
        fs::write(layout.dpll_results(param), "").unwrap();
    }
}

pub(crate) fn add_solutions(layout: &Layout, param: u32, count: usize) {
    for n in 0..count {
        let name = format!("{}{}", layout.solution_marker(param), n);
        fs::write(layout.parameter_dir(param).join(name), "1 -2 3 ").unwrap();
    }
}

pub(crate) fn write_dpll(layout: &Layout, param: u32, runs: &[Run]) {
    fs::write(layout.dpll_results(param), dpll_log(runs)).unwrap();
}

pub(crate) fn write_walksat(layout: &Layout, param: u32, runs: &[Run]) {
    fs::write(layout.walksat_results(param), walksat_log(runs)).unwrap();
}

/// A ten-parameter tree in two buckets of five.
pub(crate) fn small_layout(root: &Path) -> Layout {
    Layout {
        root: root.to_path_buf(),
        first: 100,
        end: 110,
        width: 5,
        ..Layout::default()
    }
}
