//! Threading contract tests
//!
//! The generator relies on these blocking guarantees of the standard set.

use resolver::BlockingContract;

/// Expected `(from, to)` contracts of a standard connector
pub const THREADING_CONTRACTS: [(&str, BlockingContract, BlockingContract); 6] = [
    (
        "seL4Notification",
        BlockingContract::NonBlocking,
        BlockingContract::GeneratorDefault,
    ),
    (
        "seL4NotificationNative",
        BlockingContract::NonBlocking,
        BlockingContract::InlineInCaller,
    ),
    (
        "seL4DirectCall",
        BlockingContract::CallerBlocksUntilReturn,
        BlockingContract::InlineInCaller,
    ),
    (
        "seL4SharedData",
        BlockingContract::SharedWindow,
        BlockingContract::SharedWindow,
    ),
    (
        "seL4HardwareMMIO",
        BlockingContract::SharedWindow,
        BlockingContract::NoGlue,
    ),
    (
        "seL4HardwareInterrupt",
        BlockingContract::NoGlue,
        BlockingContract::GeneratorDefault,
    ),
];

// ===== Contract Tests =====
