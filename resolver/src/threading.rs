//! Threading and blocking contracts of generated glue
//!
//! These describe the generated system, not this crate: how each side of a
//! connection behaves once the generator has emitted its glue.

use connectors::{ConnectorDescriptor, EndpointSpec};
use core_types::{BaseKind, EndpointRole};
use serde::{Deserialize, Serialize};

/// What one side of a connection may assume about blocking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockingContract {
    /// Hardware side: nothing is generated
    NoGlue,
    /// Never waits for delivery confirmation
    NonBlocking,
    /// Runs on the calling thread, no dedicated context
    InlineInCaller,
    /// Caller is held until the callee returns
    CallerBlocksUntilReturn,
    /// Callee blocks waiting for the next request when idle
    BlocksAwaitingRequest,
    /// Receiver polls or waits; signals sent before a wait may coalesce
    WaitOrPoll,
    /// Direct access to a shared window, no synchronization
    SharedWindow,
    /// Thread count unset; the generator's default policy applies
    GeneratorDefault,
}

impl BlockingContract {
    /// Whether the side's caller can be held by the other side
    pub fn may_block_caller(&self) -> bool {
        matches!(self, BlockingContract::CallerBlocksUntilReturn)
    }
}

/// Thread budget and contract of one side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideThreading {
    pub threads: Option<u32>,
    pub contract: BlockingContract,
}

/// Threading of both sides of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadingContract {
    pub from: SideThreading,
    pub to: SideThreading,
    /// Several sends before one wait may wake the receiver once
    pub coalescing: bool,
}

impl ThreadingContract {
    pub fn for_descriptor(descriptor: &ConnectorDescriptor) -> Self {
        Self {
            from: side_threading(&descriptor.from, EndpointRole::From),
            to: side_threading(&descriptor.to, EndpointRole::To),
            coalescing: descriptor.delivers_asynchronously(),
        }
    }

    pub fn side(&self, role: EndpointRole) -> &SideThreading {
        match role {
            EndpointRole::From => &self.from,
            EndpointRole::To => &self.to,
        }
    }
}

/// Derives the contract of one side from its endpoint spec
pub fn side_threading(spec: &EndpointSpec, role: EndpointRole) -> SideThreading {
    let contract = if spec.kind.hardware {
        BlockingContract::NoGlue
    } else if spec.kind.base == BaseKind::Dataport {
        BlockingContract::SharedWindow
    } else {
        match (spec.threads, role, spec.kind.base) {
            (None, _, _) => BlockingContract::GeneratorDefault,
            // A call without glue threads still runs on the caller's context.
            (Some(0), EndpointRole::From, BaseKind::Procedure) => {
                BlockingContract::CallerBlocksUntilReturn
            }
            (Some(0), EndpointRole::From, _) => BlockingContract::NonBlocking,
            (Some(0), EndpointRole::To, _) => BlockingContract::InlineInCaller,
            (Some(_), EndpointRole::From, BaseKind::Procedure) => {
                BlockingContract::CallerBlocksUntilReturn
            }
            (Some(_), EndpointRole::To, BaseKind::Procedure) => {
                BlockingContract::BlocksAwaitingRequest
            }
            (Some(_), EndpointRole::From, _) => BlockingContract::NonBlocking,
            (Some(_), EndpointRole::To, _) => BlockingContract::WaitOrPoll,
        }
    };

    SideThreading {
        threads: spec.threads,
        contract,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(kind: &str, threads: Option<u32>) -> EndpointSpec {
        let mut spec = EndpointSpec::parse(kind).unwrap();
        spec.threads = threads;
        spec
    }

    #[test]
    fn test_zero_threads_event_sender_never_blocks() {
        let side = side_threading(&spec("Events", Some(0)), EndpointRole::From);
        assert_eq!(side.contract, BlockingContract::NonBlocking);
        assert!(!side.contract.may_block_caller());
    }

    #[test]
    fn test_zero_threads_caller_still_blocks() {
        let side = side_threading(&spec("Procedures", Some(0)), EndpointRole::From);
        assert_eq!(side.contract, BlockingContract::CallerBlocksUntilReturn);
        assert!(side.contract.may_block_caller());
    }

    #[test]
    fn test_unset_threads_defer_to_generator() {
        let side = side_threading(&spec("Procedure", None), EndpointRole::To);
        assert_eq!(side.contract, BlockingContract::GeneratorDefault);
        assert_eq!(side.threads, None);
    }

    #[test]
    fn test_call_pair_blocks() {
        let from = side_threading(&spec("Procedures", Some(1)), EndpointRole::From);
        let to = side_threading(&spec("Procedure", Some(1)), EndpointRole::To);
        assert_eq!(from.contract, BlockingContract::CallerBlocksUntilReturn);
        assert_eq!(to.contract, BlockingContract::BlocksAwaitingRequest);
    }

    #[test]
    fn test_event_receiver_waits_or_polls() {
        let to = side_threading(&spec("Event", Some(1)), EndpointRole::To);
        assert_eq!(to.contract, BlockingContract::WaitOrPoll);
        let inline = side_threading(&spec("Event", Some(0)), EndpointRole::To);
        assert_eq!(inline.contract, BlockingContract::InlineInCaller);
    }

    #[test]
    fn test_dataports_and_hardware() {
        let shared = side_threading(&spec("Dataports", Some(2)), EndpointRole::From);
        assert_eq!(shared.contract, BlockingContract::SharedWindow);
        let device = side_threading(&spec("hardware Event", None), EndpointRole::From);
        assert_eq!(device.contract, BlockingContract::NoGlue);
    }
}
