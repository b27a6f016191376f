use std::error;
use std::fmt;

use crate::address::Subnet;

/// Everything that can go wrong while describing or running a simulation.
///
/// Variants are non-fatal from the library's point of view: an operation
/// reports its failure and leaves the simulation state untouched, the
/// caller decides whether to abort.
#[derive(Clone, Debug, PartialEq)]
pub enum SimulationError {
    /// An API call that violates the component's contract, e.g. a negative
    /// delay or scheduling on a destroyed scheduler.
    InvalidOperation(&'static str),
    /// An id that does not refer to a live entity. Carries the entity kind
    /// and the offending id.
    NotFound(&'static str, usize),
    /// The requested subnet overlaps one that is already assigned.
    AddressConflict(Subnet, Subnet),
    /// The subnet cannot supply an address for both endpoints of a link.
    InsufficientAddressSpace(Subnet),
    /// No path from the node to any endpoint of the addressed subnet.
    Unreachable(usize, Subnet),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimulationError::InvalidOperation(what) => {
                write!(f, "invalid operation: {}", what)
            }
            SimulationError::NotFound(kind, id) => {
                write!(f, "unknown {} id {}", kind, id)
            }
            SimulationError::AddressConflict(requested, assigned) => {
                write!(f, "subnet {} overlaps assigned subnet {}", requested, assigned)
            }
            SimulationError::InsufficientAddressSpace(subnet) => {
                write!(f, "subnet {} has fewer than two usable host addresses", subnet)
            }
            SimulationError::Unreachable(node, subnet) => {
                write!(f, "node {} has no path to subnet {}", node, subnet)
            }
        }
    }
}

impl error::Error for SimulationError {}
