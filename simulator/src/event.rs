use std::cmp::Ordering;

use crate::time::SimTime;

/// Ticket for a scheduled event. Pass it back to
/// [`Scheduler::cancel`](crate::Scheduler::cancel) to cancel the event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EventHandle(pub(crate) u64);

/// Heap key of a scheduled event. The sequence number is issued in
/// scheduling order and breaks ties between events at the same time,
/// which keeps the execution order reproducible.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct EventKey {
    pub time: SimTime,
    pub sequence: u64,
}

impl PartialOrd for EventKey {
    fn partial_cmp(&self, other: &EventKey) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventKey {
    /// Orders by (time, sequence) in reverse, so that `BinaryHeap`
    /// pops the earliest event first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Arena slot of a not-yet-executed event. Cancellation only flips the
/// flag, the slot is reclaimed when the key is popped off the heap.
pub(crate) struct PendingAction {
    pub action: Box<dyn FnOnce()>,
    pub cancelled: bool,
}
