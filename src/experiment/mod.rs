use std::fmt;

use simulator::SimulationError;

pub(crate) mod report;
pub(crate) mod scenario;
pub(crate) mod settings;

pub(crate) use scenario::run_once;

/// Counters of one finished replication.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ExperimentResult {
    pub clients: usize,
    pub run: u64,
    pub tx: u64,
    pub rx: u64,
    pub loss_ratio: f64,
}

#[derive(Debug)]
pub(crate) enum Error {
    Settings(settings::Error),
    Simulation(SimulationError),
}

impl From<settings::Error> for Error {
    fn from(e: settings::Error) -> Self {
        Error::Settings(e)
    }
}

impl From<SimulationError> for Error {
    fn from(e: SimulationError) -> Self {
        Error::Simulation(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Settings(e) => write!(f, "{}", e),
            Error::Simulation(e) => write!(f, "{}", e),
        }
    }
}
