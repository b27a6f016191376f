use simulator::Topology;

use crate::experiment::ExperimentResult;

/// Logs every node's interface addresses, one line per node.
pub(crate) fn log_addresses(topology: &Topology) {
    for node in topology.nodes() {
        let addresses: Vec<String> = node.addresses().iter().map(|a| a.to_string()).collect();
        debug!("Node {} has IP addresses: {}", node.id, addresses.join(" "));
    }
}

/// The machine-readable result line, one per replication.
pub(crate) fn csv_line(result: &ExperimentResult) -> String {
    format!(
        "CSV_RESULT,{},{},{}",
        result.clients, result.run, result.loss_ratio
    )
}
