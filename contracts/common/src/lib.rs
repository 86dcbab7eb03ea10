//! # Share Vault Common
//!
//! Building blocks shared by the share vault, its controller and its
//! strategies:
//!
//! - [`VaultError`]: the error taxonomy every contract returns
//! - [`access`]: role store behind every gated entry point
//! - [`reentrancy`]: guard for operations that call out before finishing
//! - [`math`]: checked fixed-point and basis-point arithmetic
//! - [`interfaces`]: `StrategyClient` / `ControllerClient` for cross-contract calls

#![no_std]

pub mod access;
pub mod interfaces;
pub mod math;
pub mod reentrancy;

mod error;

pub use access::Role;
pub use error::VaultError;
pub use interfaces::{ControllerClient, ControllerInterface, StrategyClient, StrategyInterface};

/// Instance storage is bumped to a week on every state-changing call.
pub const INSTANCE_BUMP_AMOUNT: u32 = 7 * access::DAY_IN_LEDGERS;
pub const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - access::DAY_IN_LEDGERS;

/// Per-holder persistent entries (share balances) live for a month between touches.
pub const BALANCE_BUMP_AMOUNT: u32 = access::PERSISTENT_BUMP_AMOUNT;
pub const BALANCE_LIFETIME_THRESHOLD: u32 = access::PERSISTENT_LIFETIME_THRESHOLD;

/// Ledgers an approval to a strategy stays valid. Approvals are reset to
/// zero within the same invocation, so this only has to outlive the call.
pub const APPROVAL_LEDGERS: u32 = 100;
