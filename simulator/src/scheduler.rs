use std::cell::RefCell;
use std::collections::binary_heap::BinaryHeap;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::SimulationError;
use crate::event::{EventHandle, EventKey, PendingAction};
use crate::time::SimTime;

/// The event scheduler at the heart of the simulation.
///
/// Actions are closures keyed by (time, sequence number); `run` pops them
/// in that order and advances the virtual clock to each event's time, so
/// the clock never moves between events. The handle is cheap to clone and
/// all clones share one queue, which is what lets a running action
/// schedule follow-up events.
#[derive(Clone)]
pub struct Scheduler {
    core: Rc<RefCell<SchedulerCore>>,
}

struct SchedulerCore {
    clock: SimTime,
    queue: BinaryHeap<EventKey>,
    pending: HashMap<u64, PendingAction>,
    next_sequence: u64,
    destroyed: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler {
            core: Rc::new(RefCell::new(SchedulerCore {
                clock: SimTime::ZERO,
                queue: BinaryHeap::new(),
                pending: HashMap::new(),
                next_sequence: 0,
                destroyed: false,
            })),
        }
    }

    /// The current virtual time.
    pub fn now(&self) -> SimTime {
        self.core.borrow().clock
    }

    /// Number of events that are scheduled but not yet executed.
    /// Cancelled events are reclaimed lazily, so they still count until
    /// their time comes around.
    pub fn pending_events(&self) -> usize {
        self.core.borrow().pending.len()
    }

    /// Schedules `action` to run `delay_secs` seconds after the current
    /// virtual time. A zero delay is allowed and runs after all events
    /// already scheduled for the current instant.
    pub fn schedule<F>(&self, delay_secs: f64, action: F) -> Result<EventHandle, SimulationError>
    where
        F: FnOnce() + 'static,
    {
        if !delay_secs.is_finite() || delay_secs < 0.0 {
            return Err(SimulationError::InvalidOperation(
                "schedule with a negative or non-finite delay",
            ));
        }
        let delay = SimTime::from_secs_f64(delay_secs);
        let now = self.core.borrow().clock;
        let time = SimTime::from_nanos(now.as_nanos().saturating_add(delay.as_nanos()));
        self.schedule_at(time, action)
    }

    /// Schedules `action` at an absolute virtual time, which must not lie
    /// in the past.
    pub fn schedule_at<F>(&self, time: SimTime, action: F) -> Result<EventHandle, SimulationError>
    where
        F: FnOnce() + 'static,
    {
        let mut core = self.core.borrow_mut();
        if core.destroyed {
            return Err(SimulationError::InvalidOperation(
                "schedule on a destroyed scheduler",
            ));
        }
        if time < core.clock {
            return Err(SimulationError::InvalidOperation(
                "schedule at a time before the current virtual time",
            ));
        }

        let sequence = core.next_sequence;
        core.next_sequence += 1;
        core.queue.push(EventKey { time, sequence });
        core.pending.insert(
            sequence,
            PendingAction {
                action: Box::new(action),
                cancelled: false,
            },
        );
        trace!("Scheduled event #{} for t={}.", sequence, time);
        Ok(EventHandle(sequence))
    }

    /// Cancels a scheduled event. Cancelling an event that already ran,
    /// was cancelled before or belongs to a destroyed scheduler has no
    /// effect.
    pub fn cancel(&self, handle: EventHandle) {
        let mut core = self.core.borrow_mut();
        if let Some(entry) = core.pending.get_mut(&handle.0) {
            if !entry.cancelled {
                entry.cancelled = true;
                trace!("Cancelled event #{}.", handle.0);
            }
        }
    }

    /// Runs the simulation until the event queue is empty or the
    /// scheduler is destroyed from within an action.
    pub fn run(&self) -> Result<(), SimulationError> {
        loop {
            let action = {
                let mut core = self.core.borrow_mut();
                if core.destroyed {
                    return Ok(());
                }
                let key = match core.queue.pop() {
                    Some(key) => key,
                    None => return Ok(()),
                };
                if key.time < core.clock {
                    return Err(SimulationError::InvalidOperation(
                        "event queue yielded an event in the past",
                    ));
                }
                core.clock = key.time;
                match core.pending.remove(&key.sequence) {
                    Some(entry) => {
                        if entry.cancelled {
                            continue;
                        }
                        trace!("Executing event #{} at t={}.", key.sequence, key.time);
                        entry.action
                    }
                    None => continue,
                }
            };
            action();
        }
    }

    /// Tears the scheduler down: drops all remaining events and refuses
    /// further scheduling. Idempotent.
    pub fn destroy(&self) {
        let dropped = {
            let mut core = self.core.borrow_mut();
            if core.destroyed {
                return;
            }
            core.destroyed = true;
            core.queue.clear();
            core.pending.drain().collect::<Vec<_>>()
        };
        if !dropped.is_empty() {
            debug!("Destroyed scheduler with {} pending events.", dropped.len());
        }
        // Actions are dropped outside the borrow; they may own clones of
        // this scheduler and run destructors that touch it.
        drop(dropped);
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Scheduler::new()
    }
}
