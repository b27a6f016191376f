#[macro_use]
extern crate log;

use std::io;
use std::process;

use log::LevelFilter;

use crate::cmdline::Options;
use crate::experiment::report;
use crate::experiment::settings::Settings;
use crate::logging::SimulationDispatch;

pub mod cmdline;
pub mod experiment;
pub mod logging;

fn main() {
    let options = match Options::parse() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Invalid command line option: {:?}", e);
            process::exit(1);
        }
    };

    // Setup logging.
    let level = if options.verbose {
        LevelFilter::Trace
    } else {
        logging::DEFAULT_LEVEL
    };
    fern::Dispatch::new()
        .pretty_logging(false)
        .level(level)
        .chain(io::stdout())
        .apply().unwrap();

    let settings = match Settings::load(options.settings_file.as_ref().map(|s| s.as_str())) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Could not load settings: {}", e);
            process::exit(1);
        }
    };

    info!("Simulating the in-flight entertainment network.");
    debug!("Options: {:#?}", options);
    debug!("Settings: {:#?}", settings);

    for &clients in &options.clients {
        for run in 1..=options.runs {
            match experiment::run_once(&settings, clients, options.seed, run) {
                Ok(result) => {
                    info!(
                        "{} clients, run {}: {} sent, {} received, {}% lost.",
                        clients, run, result.tx, result.rx, result.loss_ratio
                    );
                    println!("{}", report::csv_line(&result));
                }
                Err(e) => {
                    error!("Run {} with {} clients failed: {}", run, clients, e);
                    process::exit(1);
                }
            }
        }
    }
}
