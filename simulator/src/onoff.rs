use std::cell::RefCell;
use std::net::Ipv4Addr;
use std::rc::Rc;

use crate::error::SimulationError;
use crate::event::EventHandle;
use crate::instrumentation::Instrumentation;
use crate::network::Network;
use crate::packet::Packet;
use crate::random::RandomStream;
use crate::rate::DataRate;
use crate::scheduler::Scheduler;
use crate::topology::NodeId;

/// Traffic profile of an On-Off source. During an On period packets of
/// `packet_size` bytes leave back to back at `data_rate`; period
/// lengths are drawn uniformly from the given bounds.
#[derive(Clone, Debug)]
pub struct OnOffConfig {
    pub destination: Ipv4Addr,
    pub port: u16,
    pub data_rate: DataRate,
    pub packet_size: u32,
    pub on_min_secs: f64,
    pub on_max_secs: f64,
    pub off_min_secs: f64,
    pub off_max_secs: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SourceState {
    Idle,
    On,
    Off,
    Stopped,
}

/// An On-Off traffic source attached to one node.
///
/// From `start` the source alternates between On periods, in which it
/// emits packets at its configured rate, and silent Off periods. The
/// first packet of an On period leaves the moment the period begins;
/// residual transmission credit does not carry across periods. `stop`
/// is terminal.
pub struct OnOffSource {
    inner: Rc<RefCell<SourceInner>>,
}

struct SourceInner {
    node: NodeId,
    config: OnOffConfig,
    state: SourceState,
    network: Network,
    scheduler: Scheduler,
    instrumentation: Instrumentation,
    stream: RandomStream,
    start_event: Option<EventHandle>,
    pending_send: Option<EventHandle>,
    pending_transition: Option<EventHandle>,
    sent: u64,
}

impl OnOffSource {
    pub fn new(
        network: &Network,
        node: NodeId,
        config: OnOffConfig,
        stream: RandomStream,
        instrumentation: Instrumentation,
    ) -> Result<OnOffSource, SimulationError> {
        if network.topology().node(node).is_none() {
            return Err(SimulationError::NotFound("node", node));
        }
        validate(&config)?;
        Ok(OnOffSource {
            inner: Rc::new(RefCell::new(SourceInner {
                node,
                config,
                state: SourceState::Idle,
                network: network.clone(),
                scheduler: network.scheduler(),
                instrumentation,
                stream,
                start_event: None,
                pending_send: None,
                pending_transition: None,
                sent: 0,
            })),
        })
    }

    /// Schedules the first On period `at_secs` seconds from the current
    /// virtual time. A source starts at most once.
    pub fn start(&self, at_secs: f64) -> Result<(), SimulationError> {
        let scheduler = {
            let source = self.inner.borrow();
            if source.state != SourceState::Idle || source.start_event.is_some() {
                return Err(SimulationError::InvalidOperation(
                    "source was already started",
                ));
            }
            source.scheduler.clone()
        };
        let cell = Rc::clone(&self.inner);
        let handle = scheduler.schedule(at_secs, move || begin_on_period(&cell))?;
        self.inner.borrow_mut().start_event = Some(handle);
        Ok(())
    }

    /// Schedules the terminal stop `at_secs` seconds from the current
    /// virtual time. All pending sends and transitions are cancelled
    /// when it fires.
    pub fn stop(&self, at_secs: f64) -> Result<(), SimulationError> {
        let scheduler = self.inner.borrow().scheduler.clone();
        let cell = Rc::clone(&self.inner);
        scheduler.schedule(at_secs, move || halt(&cell))?;
        Ok(())
    }

    pub fn state(&self) -> SourceState {
        self.inner.borrow().state
    }

    /// Packets emitted so far.
    pub fn sent(&self) -> u64 {
        self.inner.borrow().sent
    }
}

fn validate(config: &OnOffConfig) -> Result<(), SimulationError> {
    if config.packet_size == 0 {
        return Err(SimulationError::InvalidOperation(
            "packet size must be positive",
        ));
    }
    if config.data_rate.bits_per_sec() == 0 {
        return Err(SimulationError::InvalidOperation(
            "source data rate must be positive",
        ));
    }
    let pairs = [
        (config.on_min_secs, config.on_max_secs),
        (config.off_min_secs, config.off_max_secs),
    ];
    for &(min, max) in &pairs {
        if !min.is_finite() || !max.is_finite() || min < 0.0 || max < min {
            return Err(SimulationError::InvalidOperation(
                "period bounds must be finite, non-negative and ordered",
            ));
        }
    }
    Ok(())
}

fn begin_on_period(inner: &Rc<RefCell<SourceInner>>) {
    let mut source = inner.borrow_mut();
    if source.state == SourceState::Stopped {
        return;
    }
    source.state = SourceState::On;
    source.start_event = None;

    let min = source.config.on_min_secs;
    let max = source.config.on_max_secs;
    let duration = source.stream.uniform(min, max);
    trace!(
        "t={} source on node {} switches On for {}s.",
        source.scheduler.now(),
        source.node,
        duration
    );
    // The transition is scheduled before the next send, so at equal
    // times it wins and the boundary packet is not emitted.
    let cell = Rc::clone(inner);
    if let Ok(handle) = source
        .scheduler
        .schedule(duration, move || begin_off_period(&cell))
    {
        source.pending_transition = Some(handle);
    }
    emit_packet(&mut source, inner);
}

fn begin_off_period(inner: &Rc<RefCell<SourceInner>>) {
    let mut source = inner.borrow_mut();
    if source.state == SourceState::Stopped {
        return;
    }
    source.state = SourceState::Off;
    source.pending_transition = None;
    if let Some(handle) = source.pending_send.take() {
        source.scheduler.cancel(handle);
    }

    let min = source.config.off_min_secs;
    let max = source.config.off_max_secs;
    let duration = source.stream.uniform(min, max);
    trace!(
        "t={} source on node {} switches Off for {}s.",
        source.scheduler.now(),
        source.node,
        duration
    );
    let cell = Rc::clone(inner);
    if let Ok(handle) = source
        .scheduler
        .schedule(duration, move || begin_on_period(&cell))
    {
        source.pending_transition = Some(handle);
    }
}

fn send_next(inner: &Rc<RefCell<SourceInner>>) {
    let mut source = inner.borrow_mut();
    if source.state != SourceState::On {
        return;
    }
    source.pending_send = None;
    emit_packet(&mut source, inner);
}

fn emit_packet(source: &mut SourceInner, inner: &Rc<RefCell<SourceInner>>) {
    source.sent += 1;
    source.instrumentation.on_tx();
    source.network.transmit(Packet {
        size: source.config.packet_size,
        source: source.node,
        destination: source.config.destination,
        port: source.config.port,
        sent_at: source.scheduler.now(),
    });

    let interval = source
        .config
        .data_rate
        .transmission_time(source.config.packet_size);
    let cell = Rc::clone(inner);
    if let Ok(handle) = source
        .scheduler
        .schedule(interval.as_secs_f64(), move || send_next(&cell))
    {
        source.pending_send = Some(handle);
    }
}

fn halt(inner: &Rc<RefCell<SourceInner>>) {
    let mut source = inner.borrow_mut();
    if source.state == SourceState::Stopped {
        return;
    }
    debug!(
        "t={} source on node {} stops after {} packets.",
        source.scheduler.now(),
        source.node,
        source.sent
    );
    source.state = SourceState::Stopped;
    if let Some(handle) = source.start_event.take() {
        source.scheduler.cancel(handle);
    }
    if let Some(handle) = source.pending_send.take() {
        source.scheduler.cancel(handle);
    }
    if let Some(handle) = source.pending_transition.take() {
        source.scheduler.cancel(handle);
    }
}
