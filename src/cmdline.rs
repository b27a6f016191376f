use std::str::FromStr;

use clap::{App, Arg, Values};

#[derive(Debug, Copy, Clone)]
pub(crate) enum ParseError {
    Clients,
    Runs,
    Seed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Options {
    pub clients: Vec<usize>,
    pub runs: u64,
    pub seed: u64,
    pub settings_file: Option<String>,
    pub verbose: bool,
}

impl Options {
    fn create_app<'a, 'b>() -> App<'a, 'b> {
        App::new("fes-simulation")
            .version("0.1.0")
            .about("In-flight entertainment network simulation")
            // Configuration
            .arg(Arg::with_name("clients")
                .value_name("CLIENTS")
                .help("Number of client seats behind the cabin switch. A comma-separated list simulates each count in turn.")
                .takes_value(true)
                .required(true)
                .use_delimiter(true))
            // Options
            .arg(Arg::with_name("runs")
                .long("runs")
                .value_name("RUNS")
                .help("Number of replications per client count, using run numbers 1..=RUNS.")
                .default_value("1"))
            .arg(Arg::with_name("seed")
                .long("seed")
                .value_name("SEED")
                .help("Base seed for all random streams.")
                .default_value("1"))
            .arg(Arg::with_name("settings_file")
                .long("settings_file")
                .short("c")
                .value_name("SETTINGS_FILE")
                .help("Path to the experiment settings. Compiled-in defaults are used when omitted.")
                .takes_value(true))
            .arg(Arg::with_name("verbose")
                .long("verbose")
                .short("v")
                .help("Log debug output, including per-node address reports.")
                .takes_value(false))
    }

    /// Parses a non-optional command line option from a string into `T` and returns `error`, when parsing fails.
    fn parse_value<T: FromStr>(value: Option<&str>, error: ParseError) -> Result<T, ParseError> {
        match value {
            None => Err(error),
            Some(s) => match T::from_str(s.trim()) {
                Err(_) => Err(error),
                Ok(v) => Ok(v),
            },
        }
    }

    /// Parses a command line option from a string into `Vec<T>` and returns `error`, when parsing fails.
    fn parse_values<T: FromStr>(values: Option<Values>, error: ParseError) -> Result<Vec<T>, ParseError> {
        match values {
            None => Ok(Vec::new()),
            Some(values) => values
                .map(|value| Self::parse_value(Some(value), error))
                .collect(),
        }
    }

    fn parse_option_string(value: Option<&str>) -> Option<String> {
        value.map(String::from)
    }

    pub fn parse() -> Result<Options, ParseError> {
        let app = Self::create_app();
        let matches = app.get_matches();

        Ok(Options {
            clients: Self::parse_values::<usize>(matches.values_of("clients"), ParseError::Clients)?,
            runs: Self::parse_value::<u64>(matches.value_of("runs"), ParseError::Runs)?,
            seed: Self::parse_value::<u64>(matches.value_of("seed"), ParseError::Seed)?,
            settings_file: Self::parse_option_string(matches.value_of("settings_file")),
            verbose: matches.is_present("verbose"),
        })
    }
}
