use std::collections::{HashMap, VecDeque};

use crate::error::SimulationError;
use crate::topology::{LinkId, NodeId, Topology};

/// Where a node forwards a packet next: the neighbor and the link
/// leading to it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NextHop {
    pub node: NodeId,
    pub link: LinkId,
}

/// Precomputed next-hop table over a topology snapshot.
///
/// One entry per (node, addressed link): the first hop of a shortest
/// path from the node towards the link's subnet. Built once after the
/// topology is complete; mutating the topology afterwards invalidates
/// the table and requires a rebuild.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoutingTable {
    entries: HashMap<(NodeId, LinkId), NextHop>,
}

impl RoutingTable {
    /// Computes routes from every node to every addressed link.
    ///
    /// Ties between equal-length paths go to the lowest next-hop node
    /// id, then the lowest link id, so repeated builds over the same
    /// topology yield the same table. Fails if any node cannot reach
    /// some addressed subnet.
    pub fn build(topology: &Topology) -> Result<RoutingTable, SimulationError> {
        let destinations: Vec<_> = topology
            .links()
            .iter()
            .filter_map(|l| l.subnet.map(|s| (l.id, s)))
            .collect();

        let mut entries = HashMap::new();
        for node in 0..topology.node_count() {
            let (hops, first_hop) = shortest_hops(topology, node);
            for &(link_id, subnet) in &destinations {
                // Link ids in `destinations` come from the topology itself.
                let link = topology.link(link_id).unwrap();
                if let Some(peer) = link.peer(node) {
                    // Attached nodes forward straight across the link.
                    entries.insert(
                        (node, link_id),
                        NextHop {
                            node: peer,
                            link: link_id,
                        },
                    );
                    continue;
                }

                let target = match (hops[link.a], hops[link.b]) {
                    (Some(da), Some(db)) => {
                        if da < db || (da == db && link.a < link.b) {
                            link.a
                        } else {
                            link.b
                        }
                    }
                    (Some(_), None) => link.a,
                    (None, Some(_)) => link.b,
                    (None, None) => return Err(SimulationError::Unreachable(node, subnet)),
                };
                match first_hop[target] {
                    Some(hop) => {
                        entries.insert((node, link_id), hop);
                    }
                    None => return Err(SimulationError::Unreachable(node, subnet)),
                }
            }
        }

        debug!(
            "Built routing table: {} entries over {} nodes and {} destinations.",
            entries.len(),
            topology.node_count(),
            destinations.len()
        );
        Ok(RoutingTable { entries })
    }

    /// The next hop from `node` towards the subnet of `link`, if routed.
    pub fn next_hop(&self, node: NodeId, link: LinkId) -> Option<NextHop> {
        self.entries.get(&(node, link)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Breadth-first search from `origin`. Returns per node the hop count
/// and the first hop of the discovered shortest path. Neighbors expand
/// in ascending (peer, link) order, which pins down which of several
/// equal-length paths is found first.
fn shortest_hops(
    topology: &Topology,
    origin: NodeId,
) -> (Vec<Option<u32>>, Vec<Option<NextHop>>) {
    let mut hops: Vec<Option<u32>> = vec![None; topology.node_count()];
    let mut first_hop: Vec<Option<NextHop>> = vec![None; topology.node_count()];
    let mut queue = VecDeque::new();

    hops[origin] = Some(0);
    queue.push_back(origin);
    while let Some(current) = queue.pop_front() {
        for (peer, link) in topology.neighbors(current) {
            if hops[peer].is_none() {
                hops[peer] = hops[current].map(|h| h + 1);
                first_hop[peer] = if current == origin {
                    Some(NextHop { node: peer, link })
                } else {
                    first_hop[current]
                };
                queue.push_back(peer);
            }
        }
    }
    (hops, first_hop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Subnet;
    use crate::rate::DataRate;
    use std::time::Duration;

    fn link(topology: &mut Topology, a: NodeId, b: NodeId) -> LinkId {
        topology
            .create_link(a, b, DataRate::from_mbps(10), Duration::from_millis(3))
            .unwrap()
    }

    fn subnet(s: &str) -> Subnet {
        Subnet::new(s.parse().unwrap(), 24)
    }

    #[test]
    fn routes_a_chain_through_the_middle_node() {
        let mut topology = Topology::new();
        let n0 = topology.create_node();
        let n1 = topology.create_node();
        let n2 = topology.create_node();
        let left = link(&mut topology, n0, n1);
        let right = link(&mut topology, n1, n2);
        topology.assign_addresses(left, subnet("10.0.0.0")).unwrap();
        topology.assign_addresses(right, subnet("10.0.1.0")).unwrap();

        let table = RoutingTable::build(&topology).unwrap();
        assert_eq!(
            table.next_hop(n0, right),
            Some(NextHop { node: n1, link: left })
        );
        assert_eq!(
            table.next_hop(n1, right),
            Some(NextHop { node: n2, link: right })
        );
        assert_eq!(
            table.next_hop(n2, left),
            Some(NextHop { node: n1, link: right })
        );
    }

    #[test]
    fn equal_length_paths_pick_the_lowest_next_hop_id() {
        // 0 -- 1 -- 3 -- 4 with a second path 0 -- 2 -- 3. Routes from
        // node 0 towards link (3,4) must go via node 1, not node 2.
        let mut topology = Topology::new();
        for _ in 0..5 {
            topology.create_node();
        }
        let via_one = link(&mut topology, 0, 1);
        let _via_two = link(&mut topology, 0, 2);
        link(&mut topology, 1, 3);
        link(&mut topology, 2, 3);
        let dest = link(&mut topology, 3, 4);
        topology.assign_addresses(dest, subnet("10.0.0.0")).unwrap();

        let table = RoutingTable::build(&topology).unwrap();
        assert_eq!(
            table.next_hop(0, dest),
            Some(NextHop {
                node: 1,
                link: via_one
            })
        );
    }

    #[test]
    fn rebuilding_yields_an_identical_table() {
        let mut topology = Topology::new();
        for _ in 0..6 {
            topology.create_node();
        }
        link(&mut topology, 0, 1);
        link(&mut topology, 1, 2);
        link(&mut topology, 2, 3);
        link(&mut topology, 0, 4);
        link(&mut topology, 4, 3);
        let far = link(&mut topology, 3, 5);
        topology.assign_addresses(far, subnet("10.0.0.0")).unwrap();

        let first = RoutingTable::build(&topology).unwrap();
        let second = RoutingTable::build(&topology).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn a_partitioned_topology_fails_with_unreachable() {
        let mut topology = Topology::new();
        for _ in 0..4 {
            topology.create_node();
        }
        let here = link(&mut topology, 0, 1);
        let there = link(&mut topology, 2, 3);
        topology.assign_addresses(here, subnet("10.0.0.0")).unwrap();
        topology.assign_addresses(there, subnet("10.0.1.0")).unwrap();

        let result = RoutingTable::build(&topology);
        assert_eq!(
            result,
            Err(SimulationError::Unreachable(0, subnet("10.0.1.0")))
        );
    }

    #[test]
    fn unaddressed_links_create_no_routes() {
        let mut topology = Topology::new();
        let n0 = topology.create_node();
        let n1 = topology.create_node();
        let n2 = topology.create_node();
        let addressed = link(&mut topology, n0, n1);
        let bare = link(&mut topology, n1, n2);
        topology
            .assign_addresses(addressed, subnet("10.0.0.0"))
            .unwrap();

        let table = RoutingTable::build(&topology).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.next_hop(n0, bare), None);
        assert_eq!(
            table.next_hop(n2, addressed),
            Some(NextHop {
                node: n1,
                link: bare
            })
        );
    }
}
