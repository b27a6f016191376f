use simulator::{
    Instrumentation, Network, NodeId, OnOffConfig, OnOffSource, PacketSink, RandomStream,
    RoutingTable, Scheduler, Topology,
};

use crate::experiment::settings::Settings;
use crate::experiment::{report, Error, ExperimentResult};

/// Runs one replication of the cabin experiment: a media server behind
/// a switch, one point-to-point access link per client seat, and one
/// On-Off stream from the server to every seat. Returns the aggregate
/// counters over all streams.
pub(crate) fn run_once(
    settings: &Settings,
    clients: usize,
    seed: u64,
    run: u64,
) -> Result<ExperimentResult, Error> {
    info!("Starting run {} with {} clients (seed {}).", run, clients, seed);

    let scheduler = Scheduler::new();
    let mut topology = Topology::new();
    let server = topology.create_node();
    let switch = topology.create_node();
    let seats: Vec<NodeId> = (0..clients).map(|_| topology.create_node()).collect();

    let mut block = settings.experiment.base_subnet()?;
    let backbone = topology.create_link(
        server,
        switch,
        settings.links.backbone_rate(),
        settings.links.backbone_delay(),
    )?;
    topology.assign_addresses(backbone, block)?;

    let mut seat_addresses = Vec::with_capacity(clients);
    for &seat in &seats {
        block = block.next_network();
        let access = topology.create_link(
            switch,
            seat,
            settings.links.access_rate(),
            settings.links.access_delay(),
        )?;
        let (_, seat_address) = topology.assign_addresses(access, block)?;
        seat_addresses.push(seat_address);
    }

    let routing = RoutingTable::build(&topology)?;
    let network = Network::new(scheduler.clone(), topology, routing);
    report::log_addresses(network.topology());

    let instrumentation = Instrumentation::new();
    let mut stream = RandomStream::new(seed, run);
    let lifetime = settings.experiment.simulation_secs;

    let mut sinks = Vec::with_capacity(clients);
    for &seat in &seats {
        let sink = PacketSink::new(
            &network,
            seat,
            settings.experiment.port,
            instrumentation.clone(),
        )?;
        sink.start(0.0)?;
        sink.stop(lifetime)?;
        sinks.push(sink);
    }
    for &seat_address in &seat_addresses {
        let source = OnOffSource::new(
            &network,
            server,
            OnOffConfig {
                destination: seat_address,
                port: settings.experiment.port,
                data_rate: settings.traffic.data_rate(),
                packet_size: settings.traffic.packet_size_bytes,
                on_min_secs: settings.traffic.on_min_secs,
                on_max_secs: settings.traffic.on_max_secs,
                off_min_secs: settings.traffic.off_min_secs,
                off_max_secs: settings.traffic.off_max_secs,
            },
            stream.fork(),
            instrumentation.clone(),
        )?;
        source.start(0.0)?;
        source.stop(lifetime)?;
    }

    scheduler.run()?;
    let result = ExperimentResult {
        clients,
        run,
        tx: instrumentation.tx_count(),
        rx: instrumentation.rx_count(),
        loss_ratio: instrumentation.loss_ratio(),
    };
    info!(
        "Run {} finished at t={}: {} sent, {} received.",
        run,
        scheduler.now(),
        result.tx,
        result.rx
    );
    scheduler.destroy();
    Ok(result)
}
