use std::cell::Cell;
use std::rc::Rc;

/// Shared transmit/receive counters for one measurement.
///
/// Sources and sinks are handed a clone at construction and tick it
/// explicitly, so a measurement only ever covers the components it was
/// given to. Clones share the same counters.
#[derive(Clone, Debug, Default)]
pub struct Instrumentation {
    counters: Rc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    tx: Cell<u64>,
    rx: Cell<u64>,
}

impl Instrumentation {
    pub fn new() -> Self {
        Instrumentation::default()
    }

    pub fn on_tx(&self) {
        let tx = &self.counters.tx;
        tx.set(tx.get() + 1);
    }

    pub fn on_rx(&self) {
        let rx = &self.counters.rx;
        rx.set(rx.get() + 1);
    }

    pub fn tx_count(&self) -> u64 {
        self.counters.tx.get()
    }

    pub fn rx_count(&self) -> u64 {
        self.counters.rx.get()
    }

    /// Percentage of transmitted packets that were not received.
    /// Zero if nothing was transmitted, so an idle measurement never
    /// divides by zero.
    pub fn loss_ratio(&self) -> f64 {
        let tx = self.tx_count();
        if tx == 0 {
            return 0.0;
        }
        let lost = tx.saturating_sub(self.rx_count());
        lost as f64 * 100.0 / tx as f64
    }

    /// Percentage of transmitted packets that were received. An idle
    /// measurement counts as fully delivered.
    pub fn delivery_ratio(&self) -> f64 {
        let tx = self.tx_count();
        if tx == 0 {
            return 100.0;
        }
        self.rx_count().min(tx) as f64 * 100.0 / tx as f64
    }

    pub fn reset(&self) {
        self.counters.tx.set(0);
        self.counters.rx.set(0);
    }
}
