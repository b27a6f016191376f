use std::time::Duration;

use simulator::{
    DataRate, Instrumentation, Network, OnOffConfig, OnOffSource, PacketSink, RandomStream,
    RoutingTable, Scheduler, Subnet, Topology,
};

/// Probes a three-node chain: one 128-byte packet per second from the
/// left end to the right end, forwarded through the middle node.
fn main() {
    let scheduler = Scheduler::new();
    let mut topology = Topology::new();
    let left = topology.create_node();
    let middle = topology.create_node();
    let right = topology.create_node();

    let rate = DataRate::from_mbps(5);
    let delay = Duration::from_millis(2);
    let first = topology.create_link(left, middle, rate, delay).unwrap();
    let second = topology.create_link(middle, right, rate, delay).unwrap();

    let mut block = Subnet::new("10.0.0.0".parse().unwrap(), 30);
    topology.assign_addresses(first, block).unwrap();
    block = block.next_network();
    let (_, right_address) = topology.assign_addresses(second, block).unwrap();

    for node in topology.nodes() {
        let addresses: Vec<String> = node.addresses().iter().map(|a| a.to_string()).collect();
        println!("Node {} has IP addresses: {}", node.id, addresses.join(" "));
    }

    let routing = RoutingTable::build(&topology).unwrap();
    let network = Network::new(scheduler.clone(), topology, routing);

    let instrumentation = Instrumentation::new();
    let sink = PacketSink::new(&network, right, 9000, instrumentation.clone()).unwrap();
    sink.start(0.0).unwrap();
    sink.stop(6.0).unwrap();

    // A single On period covers the whole send window, so exactly one
    // probe leaves per second between t=1 and the stop at t=5.
    let source = OnOffSource::new(
        &network,
        left,
        OnOffConfig {
            destination: right_address,
            port: 9000,
            data_rate: DataRate::from_bps(1024),
            packet_size: 128,
            on_min_secs: 100.0,
            on_max_secs: 100.0,
            off_min_secs: 1.0,
            off_max_secs: 1.0,
        },
        RandomStream::new(1, 1),
        instrumentation.clone(),
    )
    .unwrap();
    source.start(1.0).unwrap();
    source.stop(5.0).unwrap();

    scheduler.run().unwrap();
    println!(
        "Sent {} probes, received {}, loss ratio {}%.",
        instrumentation.tx_count(),
        instrumentation.rx_count(),
        instrumentation.loss_ratio()
    );
    scheduler.destroy();
}
