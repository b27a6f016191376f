use std::cell::RefCell;
use std::rc::Rc;

use crate::error::SimulationError;
use crate::instrumentation::Instrumentation;
use crate::network::Network;
use crate::packet::Packet;
use crate::scheduler::Scheduler;
use crate::topology::NodeId;

pub(crate) type SharedSinkState = Rc<RefCell<SinkState>>;

pub(crate) struct SinkState {
    node: NodeId,
    port: u16,
    active: bool,
    received: u64,
    instrumentation: Instrumentation,
}

/// A packet sink bound to one (node, port) pair.
///
/// The sink counts packets that arrive inside its active window and
/// ticks the rx side of its instrumentation for each. Outside the
/// window arrivals are dropped, like datagrams hitting a closed socket.
pub struct PacketSink {
    state: SharedSinkState,
    scheduler: Scheduler,
}

impl PacketSink {
    /// Binds a sink to a node and port. At most one sink per pair.
    /// The sink starts out inactive.
    pub fn new(
        network: &Network,
        node: NodeId,
        port: u16,
        instrumentation: Instrumentation,
    ) -> Result<PacketSink, SimulationError> {
        let state = Rc::new(RefCell::new(SinkState {
            node,
            port,
            active: false,
            received: 0,
            instrumentation,
        }));
        network.register_sink(node, port, Rc::clone(&state))?;
        Ok(PacketSink {
            state,
            scheduler: network.scheduler(),
        })
    }

    /// Opens the receive window `at_secs` seconds from the current
    /// virtual time.
    pub fn start(&self, at_secs: f64) -> Result<(), SimulationError> {
        let state = Rc::clone(&self.state);
        self.scheduler.schedule(at_secs, move || {
            let mut state = state.borrow_mut();
            state.active = true;
            debug!("Sink on node {}:{} starts listening.", state.node, state.port);
        })?;
        Ok(())
    }

    /// Closes the receive window `at_secs` seconds from the current
    /// virtual time. Packets arriving at or after this instant are not
    /// counted.
    pub fn stop(&self, at_secs: f64) -> Result<(), SimulationError> {
        let state = Rc::clone(&self.state);
        self.scheduler.schedule(at_secs, move || {
            let mut state = state.borrow_mut();
            state.active = false;
            debug!(
                "Sink on node {}:{} stops listening after {} packets.",
                state.node, state.port, state.received
            );
        })?;
        Ok(())
    }

    /// Packets counted so far.
    pub fn received(&self) -> u64 {
        self.state.borrow().received
    }
}

pub(crate) fn deliver(state: &SharedSinkState, scheduler: &Scheduler, packet: Packet) {
    let mut state = state.borrow_mut();
    if state.active {
        state.received += 1;
        state.instrumentation.on_rx();
        trace!(
            "t={} sink on node {}:{} receives {} bytes sent at t={}.",
            scheduler.now(),
            state.node,
            state.port,
            packet.size,
            packet.sent_at
        );
    } else {
        trace!(
            "t={} sink on node {}:{} is closed, {} bytes dropped.",
            scheduler.now(),
            state.node,
            state.port,
            packet.size
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Subnet;
    use crate::rate::DataRate;
    use crate::routing::RoutingTable;
    use crate::time::SimTime;
    use crate::topology::Topology;
    use std::net::Ipv4Addr;
    use std::time::Duration;

    fn two_node_network() -> (Network, NodeId, Ipv4Addr) {
        let mut topology = Topology::new();
        let source = topology.create_node();
        let target = topology.create_node();
        let link = topology
            .create_link(source, target, DataRate::from_mbps(10), Duration::from_millis(3))
            .unwrap();
        let (_, target_address) = topology
            .assign_addresses(link, Subnet::new("10.0.0.0".parse().unwrap(), 24))
            .unwrap();
        let routing = RoutingTable::build(&topology).unwrap();
        let network = Network::new(Scheduler::new(), topology, routing);
        (network, target, target_address)
    }

    fn send_at(network: &Network, at: f64, destination: Ipv4Addr, port: u16) {
        let net = network.clone();
        let scheduler = network.scheduler();
        network
            .scheduler()
            .schedule(at, move || {
                net.transmit(Packet {
                    size: 512,
                    source: 0,
                    destination,
                    port,
                    sent_at: scheduler.now(),
                })
            })
            .unwrap();
    }

    #[test]
    fn counts_only_packets_inside_the_active_window() {
        let (network, target, address) = two_node_network();
        let instrumentation = Instrumentation::new();
        let sink = PacketSink::new(&network, target, 9000, instrumentation.clone()).unwrap();
        sink.start(1.0).unwrap();
        sink.stop(3.0).unwrap();

        // One hop takes 409.6us serialization + 3ms propagation.
        send_at(&network, 0.5, address, 9000); // arrives before the window
        send_at(&network, 1.5, address, 9000); // arrives inside
        send_at(&network, 2.5, address, 9000); // arrives inside
        send_at(&network, 2.999, address, 9000); // arrives after the stop
        network.scheduler().run().unwrap();

        assert_eq!(sink.received(), 2);
        assert_eq!(instrumentation.rx_count(), 2);
    }

    #[test]
    fn packets_to_an_unbound_port_are_dropped() {
        let (network, target, address) = two_node_network();
        let sink = PacketSink::new(&network, target, 9000, Instrumentation::new()).unwrap();
        sink.start(0.0).unwrap();

        send_at(&network, 1.0, address, 4444);
        network.scheduler().run().unwrap();

        assert_eq!(sink.received(), 0);
    }

    #[test]
    fn one_sink_per_node_and_port() {
        let (network, target, _) = two_node_network();
        let _first = PacketSink::new(&network, target, 9000, Instrumentation::new()).unwrap();
        let second = PacketSink::new(&network, target, 9000, Instrumentation::new());
        assert!(matches!(
            second,
            Err(SimulationError::InvalidOperation(_))
        ));
        let other_port = PacketSink::new(&network, target, 9001, Instrumentation::new());
        assert!(other_port.is_ok());
    }

    #[test]
    fn binding_to_an_unknown_node_fails() {
        let (network, _, _) = two_node_network();
        let result = PacketSink::new(&network, 99, 9000, Instrumentation::new());
        assert_eq!(result.err(), Some(SimulationError::NotFound("node", 99)));
    }

    #[test]
    fn a_hop_takes_serialization_plus_propagation_time() {
        let (network, target, address) = two_node_network();
        let sink = PacketSink::new(&network, target, 9000, Instrumentation::new()).unwrap();
        sink.start(0.0).unwrap();
        send_at(&network, 1.0, address, 9000);

        let scheduler = network.scheduler();
        scheduler.run().unwrap();
        assert_eq!(sink.received(), 1);
        // 512 bytes at 10Mbps is 409.6us on the wire, plus 3ms delay.
        assert_eq!(
            scheduler.now(),
            SimTime::from_nanos(1_000_000_000 + 409_600 + 3_000_000)
        );
    }
}
