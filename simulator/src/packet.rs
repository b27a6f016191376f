use std::net::Ipv4Addr;

use crate::time::SimTime;
use crate::topology::NodeId;

/// A packet in flight. The simulation tracks packets as metadata only,
/// no payload bytes are carried.
#[derive(Clone, Debug)]
pub struct Packet {
    pub size: u32,
    pub source: NodeId,
    pub destination: Ipv4Addr,
    pub port: u16,
    pub sent_at: SimTime,
}
