use std::net::Ipv4Addr;
use std::time::Duration;

use crate::address::Subnet;
use crate::error::SimulationError;
use crate::rate::DataRate;

pub type NodeId = usize;
pub type LinkId = usize;

/// One side of a point-to-point link, as seen from a node.
#[derive(Clone, Debug)]
pub struct Interface {
    pub link: LinkId,
    pub address: Option<Ipv4Addr>,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub interfaces: Vec<Interface>,
}

impl Node {
    /// The addresses assigned to this node's interfaces, in interface order.
    pub fn addresses(&self) -> Vec<Ipv4Addr> {
        self.interfaces.iter().filter_map(|i| i.address).collect()
    }
}

/// A bidirectional point-to-point link with symmetric rate and delay.
#[derive(Clone, Debug)]
pub struct Link {
    pub id: LinkId,
    pub a: NodeId,
    pub b: NodeId,
    pub rate: DataRate,
    pub delay: Duration,
    pub subnet: Option<Subnet>,
}

impl Link {
    /// The endpoint opposite `node`, if `node` is an endpoint at all.
    pub fn peer(&self, node: NodeId) -> Option<NodeId> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

/// The static shape of the simulated network: nodes, the point-to-point
/// links between them and the subnets assigned to those links.
///
/// Ids are dense indices handed out in creation order. A topology is
/// mutable while it is being described and is frozen by moving it into
/// [`Network`](crate::Network).
#[derive(Clone, Debug, Default)]
pub struct Topology {
    nodes: Vec<Node>,
    links: Vec<Link>,
}

impl Topology {
    pub fn new() -> Self {
        Topology::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Adds a node with no interfaces and returns its id.
    pub fn create_node(&mut self) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            id,
            interfaces: Vec::new(),
        });
        id
    }

    /// Connects two distinct existing nodes and returns the link id.
    /// The link starts out without addresses.
    pub fn create_link(
        &mut self,
        a: NodeId,
        b: NodeId,
        rate: DataRate,
        delay: Duration,
    ) -> Result<LinkId, SimulationError> {
        if a >= self.nodes.len() {
            return Err(SimulationError::NotFound("node", a));
        }
        if b >= self.nodes.len() {
            return Err(SimulationError::NotFound("node", b));
        }
        if a == b {
            return Err(SimulationError::InvalidOperation(
                "link endpoints must be distinct nodes",
            ));
        }
        if rate.bits_per_sec() == 0 {
            return Err(SimulationError::InvalidOperation(
                "link rate must be positive",
            ));
        }

        let id = self.links.len();
        self.links.push(Link {
            id,
            a,
            b,
            rate,
            delay,
            subnet: None,
        });
        self.nodes[a].interfaces.push(Interface {
            link: id,
            address: None,
        });
        self.nodes[b].interfaces.push(Interface {
            link: id,
            address: None,
        });
        debug!("Created link {}: node {} <-> node {} ({}).", id, a, b, rate);
        Ok(id)
    }

    /// Assigns a subnet to a link: the first usable host address goes to
    /// endpoint `a`, the second to endpoint `b`. Fails without touching
    /// any state if the subnet is too small, overlaps an assigned subnet
    /// or the link is already addressed.
    pub fn assign_addresses(
        &mut self,
        link: LinkId,
        subnet: Subnet,
    ) -> Result<(Ipv4Addr, Ipv4Addr), SimulationError> {
        let (a, b) = match self.links.get(link) {
            Some(l) => {
                if l.subnet.is_some() {
                    return Err(SimulationError::InvalidOperation(
                        "link already has an assigned subnet",
                    ));
                }
                (l.a, l.b)
            }
            None => return Err(SimulationError::NotFound("link", link)),
        };
        if subnet.usable_hosts() < 2 {
            return Err(SimulationError::InsufficientAddressSpace(subnet));
        }
        for other in &self.links {
            if let Some(assigned) = other.subnet {
                if assigned.overlaps(&subnet) {
                    return Err(SimulationError::AddressConflict(subnet, assigned));
                }
            }
        }

        let addr_a = subnet
            .host(1)
            .ok_or(SimulationError::InsufficientAddressSpace(subnet))?;
        let addr_b = subnet
            .host(2)
            .ok_or(SimulationError::InsufficientAddressSpace(subnet))?;
        self.links[link].subnet = Some(subnet);
        self.set_interface_address(a, link, addr_a);
        self.set_interface_address(b, link, addr_b);
        debug!(
            "Assigned {} to link {}: node {} = {}, node {} = {}.",
            subnet, link, a, addr_a, b, addr_b
        );
        Ok((addr_a, addr_b))
    }

    fn set_interface_address(&mut self, node: NodeId, link: LinkId, address: Ipv4Addr) {
        for interface in &mut self.nodes[node].interfaces {
            if interface.link == link {
                interface.address = Some(address);
                return;
            }
        }
    }

    /// Whether `address` is assigned to one of the node's interfaces.
    pub fn owns_address(&self, node: NodeId, address: Ipv4Addr) -> bool {
        match self.nodes.get(node) {
            Some(n) => n.interfaces.iter().any(|i| i.address == Some(address)),
            None => false,
        }
    }

    /// The addressed link whose subnet contains `address`.
    pub fn subnet_of(&self, address: Ipv4Addr) -> Option<LinkId> {
        self.links
            .iter()
            .find(|l| l.subnet.map_or(false, |s| s.contains(address)))
            .map(|l| l.id)
    }

    /// The node's neighbors as (peer, link) pairs, sorted ascending.
    /// The order makes graph traversals over the topology deterministic.
    pub fn neighbors(&self, node: NodeId) -> Vec<(NodeId, LinkId)> {
        let mut neighbors = Vec::new();
        if let Some(n) = self.nodes.get(node) {
            for interface in &n.interfaces {
                let link = &self.links[interface.link];
                if let Some(peer) = link.peer(node) {
                    neighbors.push((peer, link.id));
                }
            }
        }
        neighbors.sort_unstable();
        neighbors
    }
}
