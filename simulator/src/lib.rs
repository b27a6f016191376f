#[macro_use]
extern crate log;

pub use address::Subnet;
pub use error::SimulationError;
pub use event::EventHandle;
pub use instrumentation::Instrumentation;
pub use network::Network;
pub use onoff::{OnOffConfig, OnOffSource, SourceState};
pub use packet::Packet;
pub use random::RandomStream;
pub use rate::DataRate;
pub use routing::{NextHop, RoutingTable};
pub use scheduler::Scheduler;
pub use sink::PacketSink;
pub use time::SimTime;
pub use topology::{Interface, Link, LinkId, Node, NodeId, Topology};

pub mod address;
pub mod error;
pub mod event;
pub mod instrumentation;
pub mod network;
pub mod onoff;
pub mod packet;
pub mod random;
pub mod rate;
pub mod routing;
pub mod scheduler;
pub mod sink;
pub mod time;
pub mod topology;
