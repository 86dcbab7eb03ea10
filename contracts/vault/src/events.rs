//! Event payloads.
//!
//! Every state-changing operation publishes one event with a single
//! `symbol_short!` topic so keepers, frontends and indexers can follow share
//! issuance, fee flow and lifecycle changes without reading storage.

use soroban_sdk::{contracttype, Address};

use crate::storage::FeeConfig;

/// Emitted once by `initialize`.
///
/// # Topics
/// - `SymbolShort("init")`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultInitializedEvent {
    pub asset: Address,
    pub controller: Address,
    pub treasury: Address,
    pub admin: Address,
    pub fees: FeeConfig,
}

/// Emitted when a depositor adds assets and receives shares.
///
/// # Topics
/// - `SymbolShort("deposit")`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositEvent {
    /// Account the assets were pulled from
    pub caller: Address,
    /// Account credited with the shares
    pub recipient: Address,
    pub amount: i128,
    pub shares: i128,
    /// `total_assets` after the deposit reached the strategy
    pub total_assets: i128,
}

/// Emitted when a holder burns shares for assets.
///
/// # Topics
/// - `SymbolShort("withdraw")`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawEvent {
    pub caller: Address,
    pub shares: i128,
    /// Paid to the caller, after the withdrawal fee
    pub amount: i128,
    /// Withdrawal fee sent to the treasury
    pub fee: i128,
}

/// Emitted on a profitable harvest. Unprofitable harvests publish nothing.
///
/// # Topics
/// - `SymbolShort("harvest")`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HarvestEvent {
    /// Increase of the vault's own balance across the strategy harvest
    pub profit: i128,
    pub performance_fee: i128,
    pub management_fee: i128,
    /// Profit sent back to the strategy
    pub reinvested: i128,
    pub total_assets: i128,
}

/// # Topics
/// - `SymbolShort("fees_set")`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeesUpdatedEvent {
    pub old_fees: FeeConfig,
    pub new_fees: FeeConfig,
}

/// # Topics
/// - `SymbolShort("treasury")`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TreasuryUpdatedEvent {
    pub old_treasury: Address,
    pub new_treasury: Address,
}

/// Emitted when the vault is paused or unpaused.
///
/// # Topics
/// - `SymbolShort("paused")` / `SymbolShort("unpaused")`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PauseEvent {
    /// True if vault is now paused, false if unpaused
    pub paused: bool,
    pub caller: Address,
}

/// Emitted by `emergency_withdraw`.
///
/// # Topics
/// - `SymbolShort("shutdown")`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShutdownEvent {
    pub caller: Address,
    /// Assets pulled back from the strategy
    pub recovered: i128,
}
