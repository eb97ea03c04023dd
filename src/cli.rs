use std::path::PathBuf;

use clap::{command, value_parser, Arg, ArgAction, ArgMatches, Command};

use crate::{
    layout::{
        Layout, DEFAULT_END, DEFAULT_FIRST, DEFAULT_PREFIX, DEFAULT_ROOT, DEFAULT_TRIALS,
        DEFAULT_WALKSAT_RUNS, DEFAULT_WIDTH,
    },
    report::Outputs,
};

#[derive(Debug)]
pub struct CliArgs {
    pub root: PathBuf,
    pub output: PathBuf,
    pub prefix: String,
    pub first: u32,
    pub end: u32,
    pub width: u32,
    pub trials: u32,
    pub walksat_runs: u32,
    pub summary: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub verbosity: u8,
    pub flamegraph: bool,
}

impl CliArgs {
    pub fn layout(&self) -> Layout {
        Layout {
            root: self.root.clone(),
            prefix: self.prefix.clone(),
            first: self.first,
            end: self.end,
            width: self.width,
            trials: self.trials,
            walksat_runs: self.walksat_runs,
        }
    }

    pub fn outputs(&self) -> Outputs {
        Outputs {
            dir: self.output.clone(),
            summary: self.summary.clone(),
            flamegraph: self.flamegraph,
        }
    }
}

fn number(name: &'static str, help: &'static str, default: u32) -> Arg {
    Arg::new(name)
        .help(help)
        .long(name)
        .value_parser(value_parser!(u32))
        .default_value(default.to_string())
}

pub fn command() -> Command {
    command!("sat-stats")
        .about("Aggregates DPLL and WalkSat result logs into per-bucket solution ratios and average solve times.")
        .arg(
            Arg::new("root")
                .help("Directory holding one sub-directory per parameter")
                .long("root")
                .short('r')
                .value_parser(value_parser!(PathBuf))
                .default_value(DEFAULT_ROOT),
        )
        .arg(
            Arg::new("output")
                .help("Directory the aggregate records are written to")
                .long("output")
                .short('o')
                .value_parser(value_parser!(PathBuf))
                .default_value("."),
        )
        .arg(
            Arg::new("prefix")
                .help("Prefix of the parameter directories and result files")
                .long("prefix")
                .short('p')
                .default_value(DEFAULT_PREFIX),
        )
        .arg(number("first", "First parameter value, inclusive", DEFAULT_FIRST))
        .arg(number("end", "Last parameter value, exclusive", DEFAULT_END))
        .arg(number("width", "Parameter values per bucket", DEFAULT_WIDTH).short('w'))
        .arg(number("trials", "Trials per bucket", DEFAULT_TRIALS).short('t'))
        .arg(number(
            "walksat-runs",
            "WalkSat runs per solved instance",
            DEFAULT_WALKSAT_RUNS,
        ))
        .arg(
            Arg::new("summary")
                .help("Also write a per-bucket CSV summary to this file")
                .long("summary")
                .short('s')
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("log-file")
                .help("Append log lines to this file")
                .long("log-file")
                .short('l')
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .help("Log progress (-v) or every file visited (-vv)")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("flamegraph")
                .help("Write a flamegraph of the run to the output directory")
                .long("flamegraph")
                .short('f')
                .action(ArgAction::SetTrue),
        )
}

pub fn cli() -> CliArgs {
    from_matches(&command().get_matches())
}

fn from_matches(arguments: &ArgMatches) -> CliArgs {
    let path = |id: &str| arguments.get_one::<PathBuf>(id).cloned();
    let number = |id: &str| arguments.get_one::<u32>(id).copied().unwrap_or_default();

    CliArgs {
        root: path("root").unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT)),
        output: path("output").unwrap_or_else(|| PathBuf::from(".")),
        prefix: arguments
            .get_one::<String>("prefix")
            .cloned()
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
        first: number("first"),
        end: number("end"),
        width: number("width"),
        trials: number("trials"),
        walksat_runs: number("walksat-runs"),
        summary: path("summary"),
        log_file: path("log-file"),
        verbosity: arguments.get_count("verbose"),
        flamegraph: arguments.get_flag("flamegraph"),
    }
}

#[cfg(test)]
fn parse(args: &[&str]) -> CliArgs {
    from_matches(&command().get_matches_from(args.iter().copied()))
}

#[test]
fn defaults_match_experiment_layout() {
    let args = parse(&["sat-stats"]);
    assert_eq!(args.layout(), Layout::default());
    assert_eq!(args.outputs(), Outputs::default());
    assert_eq!(args.verbosity, 0);
    assert!(args.log_file.is_none());
}

#[test]
fn flags_override_layout() {
    let args = parse(&[
        "sat-stats", "-r", "runs", "-o", "out", "--prefix", "N", "--first", "100", "--end",
        "200", "-w", "10", "-t", "50", "--walksat-runs", "3", "-s", "out/summary.csv", "-vv", "-f",
    ]);
    let layout = args.layout();
    assert_eq!(layout.root, PathBuf::from("runs"));
    assert_eq!(layout.prefix, "N");
    assert_eq!((layout.first, layout.end, layout.width), (100, 200, 10));
    assert_eq!((layout.trials, layout.walksat_runs), (50, 3));
    assert_eq!(layout.bucket_count(), 10);

    let outputs = args.outputs();
    assert_eq!(outputs.dir, PathBuf::from("out"));
    assert_eq!(outputs.summary, Some(PathBuf::from("out/summary.csv")));
    assert!(outputs.flamegraph);
    assert_eq!(args.verbosity, 2);
}

#[test]
fn help_shows_numeric_defaults() {
    let help = command().render_help().to_string();
    for default in ["[default: 1500]", "[default: 3500]", "[default: 25]", "[default: 100]", "[default: 5]"] {
        assert!(help.contains(default), "missing {} in help", default);
    }
}

#[test]
fn rejects_non_numeric_parameters() {
    let result = command().try_get_matches_from(["sat-stats", "--width", "wide"]);
    assert!(result.is_err());
}
