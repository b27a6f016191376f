use std::net::Ipv4Addr;
use std::time::Duration;

use simulator::{
    DataRate, Instrumentation, Network, OnOffConfig, OnOffSource, PacketSink, RandomStream,
    RoutingTable, Scheduler, Subnet, Topology,
};

const PORT: u16 = 9000;

fn subnet(s: &str) -> Subnet {
    Subnet::new(s.parse().unwrap(), 24)
}

/// A config whose single On period outlasts the source's lifetime, so
/// the source behaves like a constant-rate sender of one packet per
/// second of `packet_size` bytes.
fn constant_rate(destination: Ipv4Addr, packet_size: u32) -> OnOffConfig {
    OnOffConfig {
        destination,
        port: PORT,
        data_rate: DataRate::from_bps(u64::from(packet_size) * 8),
        packet_size,
        on_min_secs: 1_000.0,
        on_max_secs: 1_000.0,
        off_min_secs: 1.0,
        off_max_secs: 1.0,
    }
}

#[test]
fn a_burst_over_one_link_is_fully_delivered() {
    let scheduler = Scheduler::new();
    let mut topology = Topology::new();
    let sender = topology.create_node();
    let receiver = topology.create_node();
    let link = topology
        .create_link(sender, receiver, DataRate::from_mbps(5), Duration::from_millis(2))
        .unwrap();
    let (_, receiver_address) = topology.assign_addresses(link, subnet("10.0.0.0")).unwrap();
    let routing = RoutingTable::build(&topology).unwrap();
    let network = Network::new(scheduler.clone(), topology, routing);

    let instrumentation = Instrumentation::new();
    let sink = PacketSink::new(&network, receiver, PORT, instrumentation.clone()).unwrap();
    sink.start(0.0).unwrap();
    sink.stop(5.0).unwrap();

    let source = OnOffSource::new(
        &network,
        sender,
        constant_rate(receiver_address, 128),
        RandomStream::new(1, 1),
        instrumentation.clone(),
    )
    .unwrap();
    source.start(1.0).unwrap();
    source.stop(5.0).unwrap();

    scheduler.run().unwrap();
    scheduler.destroy();

    // Sends at t=1..=4; each packet needs 204.8us on the wire plus 2ms,
    // so every arrival beats the sink's stop at t=5.
    assert_eq!(instrumentation.tx_count(), 4);
    assert_eq!(instrumentation.rx_count(), 4);
    assert_eq!(instrumentation.loss_ratio(), 0.0);
    assert_eq!(sink.received(), 4);
}

#[test]
fn packets_reaching_a_closed_sink_count_as_lost() {
    let scheduler = Scheduler::new();
    let mut topology = Topology::new();
    let sender = topology.create_node();
    let receiver = topology.create_node();
    let link = topology
        .create_link(sender, receiver, DataRate::from_mbps(1), Duration::from_millis(1))
        .unwrap();
    let (_, receiver_address) = topology.assign_addresses(link, subnet("10.0.0.0")).unwrap();
    let routing = RoutingTable::build(&topology).unwrap();
    let network = Network::new(scheduler.clone(), topology, routing);

    let instrumentation = Instrumentation::new();
    let sink = PacketSink::new(&network, receiver, PORT, instrumentation.clone()).unwrap();
    sink.start(0.0).unwrap();
    sink.stop(2.0).unwrap();

    let source = OnOffSource::new(
        &network,
        sender,
        constant_rate(receiver_address, 512),
        RandomStream::new(1, 1),
        instrumentation.clone(),
    )
    .unwrap();
    source.start(0.0).unwrap();
    source.stop(10.0).unwrap();

    scheduler.run().unwrap();
    scheduler.destroy();

    // Ten sends at t=0..=9, each arriving 5.096ms after it left. Only
    // the packets sent at t=0 and t=1 beat the sink's stop at t=2.
    assert_eq!(instrumentation.tx_count(), 10);
    assert_eq!(instrumentation.rx_count(), 2);
    assert_eq!(instrumentation.loss_ratio(), 80.0);
}

/// Runs a small star experiment and reports its counters.
fn star_run(seed: u64, run: u64) -> (u64, u64, f64) {
    let scheduler = Scheduler::new();
    let mut topology = Topology::new();
    let server = topology.create_node();
    let hub = topology.create_node();
    let clients: Vec<_> = (0..4).map(|_| topology.create_node()).collect();

    let rate = DataRate::from_mbps(10);
    let delay = Duration::from_millis(3);
    let mut block = subnet("10.0.0.0");
    let backbone = topology.create_link(server, hub, rate, delay).unwrap();
    topology.assign_addresses(backbone, block).unwrap();
    let mut client_addresses = Vec::new();
    for &client in &clients {
        block = block.next_network();
        let access = topology.create_link(hub, client, rate, delay).unwrap();
        let (_, client_address) = topology.assign_addresses(access, block).unwrap();
        client_addresses.push(client_address);
    }
    let routing = RoutingTable::build(&topology).unwrap();
    let network = Network::new(scheduler.clone(), topology, routing);

    let instrumentation = Instrumentation::new();
    let mut stream = RandomStream::new(seed, run);
    let mut sinks = Vec::new();
    for &client in &clients {
        let sink = PacketSink::new(&network, client, PORT, instrumentation.clone()).unwrap();
        sink.start(0.0).unwrap();
        sink.stop(60.0).unwrap();
        sinks.push(sink);
    }
    for &address in &client_addresses {
        let source = OnOffSource::new(
            &network,
            server,
            OnOffConfig {
                destination: address,
                port: PORT,
                data_rate: DataRate::from_mbps(1),
                packet_size: 512,
                on_min_secs: 1.0,
                on_max_secs: 3.0,
                off_min_secs: 1.0,
                off_max_secs: 40.0,
            },
            stream.fork(),
            instrumentation.clone(),
        )
        .unwrap();
        source.start(0.0).unwrap();
        source.stop(50.0).unwrap();
    }

    scheduler.run().unwrap();
    let result = (
        instrumentation.tx_count(),
        instrumentation.rx_count(),
        instrumentation.loss_ratio(),
    );
    scheduler.destroy();
    result
}

#[test]
fn replications_with_the_same_run_number_are_identical() {
    let first = star_run(1, 3);
    let second = star_run(1, 3);
    assert_eq!(first, second);
    assert!(first.0 > 0);
}
