use std::fmt;
use std::fs::read_to_string;
use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;

use serde_derive::Deserialize;

use simulator::{DataRate, Subnet};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub(crate) struct Settings {
    pub experiment: ExperimentSettings,
    pub links: LinkSettings,
    pub traffic: TrafficSettings,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub(crate) struct ExperimentSettings {
    /// Length of the receive window and source lifetime, in seconds.
    pub simulation_secs: f64,
    pub port: u16,
    /// Base address of the first per-link subnet, e.g. "10.0.0.0".
    pub base_network: String,
    pub subnet_prefix: u8,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub(crate) struct LinkSettings {
    pub backbone_rate_bps: u64,
    pub backbone_delay_ms: u64,
    pub access_rate_bps: u64,
    pub access_delay_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub(crate) struct TrafficSettings {
    pub data_rate_bps: u64,
    pub packet_size_bytes: u32,
    pub on_min_secs: f64,
    pub on_max_secs: f64,
    pub off_min_secs: f64,
    pub off_max_secs: f64,
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Settings, Error> {
        let settings: Settings = toml::from_str(read_to_string(path)?.as_ref())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from `path`, or the compiled-in defaults of the
    /// in-flight entertainment experiment when no path is given.
    pub fn load(path: Option<&str>) -> Result<Settings, Error> {
        match path {
            Some(path) => Settings::from_file(path),
            None => Ok(Settings::default()),
        }
    }

    fn validate(&self) -> Result<(), Error> {
        if !(self.experiment.simulation_secs > 0.0) || !self.experiment.simulation_secs.is_finite()
        {
            return Err(Error::Constraint(
                "experiment.simulation-secs must be positive and finite".to_string(),
            ));
        }
        if self.experiment.subnet_prefix > 30 {
            return Err(Error::Constraint(
                "experiment.subnet-prefix must leave room for two host addresses".to_string(),
            ));
        }
        self.experiment.base_network.parse::<Ipv4Addr>()?;

        for (name, rate) in &[
            ("links.backbone-rate-bps", self.links.backbone_rate_bps),
            ("links.access-rate-bps", self.links.access_rate_bps),
            ("traffic.data-rate-bps", self.traffic.data_rate_bps),
        ] {
            if *rate == 0 {
                return Err(Error::Constraint(format!("{} must be positive", name)));
            }
        }
        if self.traffic.packet_size_bytes == 0 {
            return Err(Error::Constraint(
                "traffic.packet-size-bytes must be positive".to_string(),
            ));
        }
        for (name, min, max) in &[
            ("on", self.traffic.on_min_secs, self.traffic.on_max_secs),
            ("off", self.traffic.off_min_secs, self.traffic.off_max_secs),
        ] {
            if !min.is_finite() || !max.is_finite() || *min < 0.0 || max < min {
                return Err(Error::Constraint(format!(
                    "traffic.{name}-min-secs..{name}-max-secs must be finite, non-negative and ordered",
                    name = name
                )));
            }
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            experiment: ExperimentSettings {
                simulation_secs: 2400.0,
                port: 9000,
                base_network: "10.0.0.0".to_string(),
                subnet_prefix: 24,
            },
            links: LinkSettings {
                backbone_rate_bps: 10_000_000,
                backbone_delay_ms: 3,
                access_rate_bps: 10_000_000,
                access_delay_ms: 3,
            },
            traffic: TrafficSettings {
                data_rate_bps: 1_000_000,
                packet_size_bytes: 512,
                on_min_secs: 1.0,
                on_max_secs: 3.0,
                off_min_secs: 1.0,
                off_max_secs: 40.0,
            },
        }
    }
}

impl ExperimentSettings {
    /// The validated base subnet. Call only on validated settings.
    pub fn base_subnet(&self) -> Result<Subnet, Error> {
        Ok(Subnet::new(self.base_network.parse()?, self.subnet_prefix))
    }
}

impl LinkSettings {
    pub fn backbone_rate(&self) -> DataRate {
        DataRate::from_bps(self.backbone_rate_bps)
    }

    pub fn backbone_delay(&self) -> Duration {
        Duration::from_millis(self.backbone_delay_ms)
    }

    pub fn access_rate(&self) -> DataRate {
        DataRate::from_bps(self.access_rate_bps)
    }

    pub fn access_delay(&self) -> Duration {
        Duration::from_millis(self.access_delay_ms)
    }
}

impl TrafficSettings {
    pub fn data_rate(&self) -> DataRate {
        DataRate::from_bps(self.data_rate_bps)
    }
}

#[derive(Debug)]
pub(crate) enum Error {
    Toml(toml::de::Error),
    Io(std::io::Error),
    Address(std::net::AddrParseError),
    Constraint(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Toml(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<std::net::AddrParseError> for Error {
    fn from(e: std::net::AddrParseError) -> Self {
        Error::Address(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Toml(e) => write!(f, "settings are not valid TOML: {}", e),
            Error::Io(e) => write!(f, "settings file unreadable: {}", e),
            Error::Address(e) => write!(f, "settings contain an invalid address: {}", e),
            Error::Constraint(what) => write!(f, "settings violate a constraint: {}", what),
        }
    }
}
