use std::{fs::File, process::ExitCode};

use log::error;
use sat_stats::{cli, logger, pipeline};

fn main() -> ExitCode {
    let arguments = cli::cli();

    match logger::StatsLogger::new(logger::level_for(arguments.verbosity), arguments.log_file.as_deref()) {
        Ok(stats_logger) => {
            if let Err(err) = logger::init(stats_logger) {
                eprintln!("Cannot install logger: {}", err);
            }
        }
        Err(err) => {
            eprintln!("Cannot open log file {:?}: {}", arguments.log_file, err);
            return ExitCode::FAILURE;
        }
    }

    let outputs = arguments.outputs();
    let result = pipeline::run(&arguments.layout(), &outputs);

    if outputs.flamegraph {
        //spans of a failed run are dumped as well
        let path = outputs.flamegraph();
        match File::create(&path) {
            Ok(file) => {
                if let Err(err) = flame::dump_html(file) {
                    error!("Cannot write flamegraph {:?}: {}", path, err);
                }
            }
            Err(err) => error!("Cannot create flamegraph {:?}: {}", path, err),
        }
    }

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
