use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::SimulationError;
use crate::packet::Packet;
use crate::routing::RoutingTable;
use crate::scheduler::Scheduler;
use crate::sink::SharedSinkState;
use crate::topology::{NodeId, Topology};

/// The packet-forwarding fabric: a frozen topology, its routing table
/// and the scheduler that carries packets hop by hop.
///
/// Each hop delays a packet by the link's serialization time for the
/// packet size plus the link's propagation delay. A packet that cannot
/// be routed or reaches a node without a matching sink is dropped.
/// The handle is cheap to clone; all clones share one fabric.
#[derive(Clone)]
pub struct Network {
    inner: Rc<NetworkInner>,
}

struct NetworkInner {
    scheduler: Scheduler,
    topology: Topology,
    routing: RoutingTable,
    sinks: RefCell<HashMap<(NodeId, u16), SharedSinkState>>,
}

impl Network {
    /// Freezes a topology and its routing table into a fabric. The
    /// table must have been built from this exact topology.
    pub fn new(scheduler: Scheduler, topology: Topology, routing: RoutingTable) -> Self {
        debug!(
            "Network fabric over {} nodes, {} links, {} routes.",
            topology.node_count(),
            topology.link_count(),
            routing.len()
        );
        Network {
            inner: Rc::new(NetworkInner {
                scheduler,
                topology,
                routing,
                sinks: RefCell::new(HashMap::new()),
            }),
        }
    }

    pub fn scheduler(&self) -> Scheduler {
        self.inner.scheduler.clone()
    }

    pub fn topology(&self) -> &Topology {
        &self.inner.topology
    }

    /// Registers a sink for (node, port). One sink per pair.
    pub(crate) fn register_sink(
        &self,
        node: NodeId,
        port: u16,
        state: SharedSinkState,
    ) -> Result<(), SimulationError> {
        if self.inner.topology.node(node).is_none() {
            return Err(SimulationError::NotFound("node", node));
        }
        let mut sinks = self.inner.sinks.borrow_mut();
        if sinks.contains_key(&(node, port)) {
            return Err(SimulationError::InvalidOperation(
                "a sink is already bound to this node and port",
            ));
        }
        sinks.insert((node, port), state);
        Ok(())
    }

    /// Injects a freshly transmitted packet at its source node.
    pub(crate) fn transmit(&self, packet: Packet) {
        trace!(
            "t={} node {} transmits {} bytes to {}:{}.",
            self.inner.scheduler.now(),
            packet.source,
            packet.size,
            packet.destination,
            packet.port
        );
        self.forward(packet.source, packet);
    }

    /// Moves a packet one hop closer to its destination, or delivers it.
    fn forward(&self, at: NodeId, packet: Packet) {
        let topology = &self.inner.topology;
        if topology.owns_address(at, packet.destination) {
            self.deliver(at, packet);
            return;
        }

        let destination_link = match topology.subnet_of(packet.destination) {
            Some(link) => link,
            None => {
                warn!(
                    "Dropping packet at node {}: {} is not in any assigned subnet.",
                    at, packet.destination
                );
                return;
            }
        };
        // The link id came out of subnet_of on the same topology.
        let destination_endpoints = topology.link(destination_link).unwrap();
        if !topology.owns_address(destination_endpoints.a, packet.destination)
            && !topology.owns_address(destination_endpoints.b, packet.destination)
        {
            warn!(
                "Dropping packet at node {}: {} is in subnet of link {} but assigned to no node.",
                at, packet.destination, destination_link
            );
            return;
        }
        let hop = match self.inner.routing.next_hop(at, destination_link) {
            Some(hop) => hop,
            None => {
                warn!(
                    "Dropping packet at node {}: no route towards {}.",
                    at, packet.destination
                );
                return;
            }
        };
        // Route entries only name links of the routed topology.
        let link = topology.link(hop.link).unwrap();
        let arrival = self.inner.scheduler.now()
            + link.rate.transmission_time(packet.size)
            + link.delay;
        let network = self.clone();
        let next = hop.node;
        // Scheduling only fails once the scheduler is destroyed; the
        // packet is dropped with everything else then.
        let _ = self
            .inner
            .scheduler
            .schedule_at(arrival, move || network.forward(next, packet));
    }

    fn deliver(&self, at: NodeId, packet: Packet) {
        let sink = self
            .inner
            .sinks
            .borrow()
            .get(&(at, packet.port))
            .map(Rc::clone);
        match sink {
            Some(sink) => crate::sink::deliver(&sink, &self.inner.scheduler, packet),
            None => trace!(
                "t={} node {} drops {} bytes: no sink on port {}.",
                self.inner.scheduler.now(),
                at,
                packet.size,
                packet.port
            ),
        }
    }
}
