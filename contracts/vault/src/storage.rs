//! Storage layout and typed accessors for the vault.
//!
//! ## Instance storage (contract-wide)
//! - `Asset`, `Controller`: fixed at initialization
//! - `PerformanceFeeBps`, `ManagementFeeBps`, `WithdrawalFeeBps`, `Treasury`
//! - `LastHarvest`, `LastRecordedTotalAssets`: harvest bookkeeping
//! - `Shutdown`, `Paused`: lifecycle flags
//! - `TotalSupply`: outstanding shares
//! - `Version`
//!
//! ## Persistent storage (per holder)
//! - `Shares(holder)`: share balance

use share_vault_common::{
    VaultError, BALANCE_BUMP_AMOUNT, BALANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT,
    INSTANCE_LIFETIME_THRESHOLD,
};
use soroban_sdk::{contracttype, Address, Env};

#[contracttype]
pub enum DataKey {
    /// Underlying token accepted for deposits
    Asset,
    /// Strategy registry
    Controller,
    PerformanceFeeBps,
    /// Annual rate, accrued linearly between harvests
    ManagementFeeBps,
    WithdrawalFeeBps,
    /// Fee recipient
    Treasury,
    /// Ledger timestamp of the last profitable harvest
    LastHarvest,
    /// `total_assets` right after the last profitable harvest
    LastRecordedTotalAssets,
    /// One-way emergency latch
    Shutdown,
    Paused,
    TotalSupply,
    /// Share balance of a holder
    Shares(Address),
    Version,
}

/// Fee settings in basis points.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeeConfig {
    pub performance_fee_bps: u32,
    pub management_fee_bps: u32,
    pub withdrawal_fee_bps: u32,
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Asset)
}

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn get_address(env: &Env, key: &DataKey) -> Result<Address, VaultError> {
    env.storage()
        .instance()
        .get(key)
        .ok_or(VaultError::NotInitialized)
}

pub fn asset(env: &Env) -> Result<Address, VaultError> {
    get_address(env, &DataKey::Asset)
}

pub fn controller(env: &Env) -> Result<Address, VaultError> {
    get_address(env, &DataKey::Controller)
}

pub fn treasury(env: &Env) -> Result<Address, VaultError> {
    get_address(env, &DataKey::Treasury)
}

pub fn set_treasury(env: &Env, treasury: &Address) {
    env.storage().instance().set(&DataKey::Treasury, treasury);
}

pub fn fees(env: &Env) -> FeeConfig {
    let bps = |key: DataKey| env.storage().instance().get(&key).unwrap_or(0_u32);
    FeeConfig {
        performance_fee_bps: bps(DataKey::PerformanceFeeBps),
        management_fee_bps: bps(DataKey::ManagementFeeBps),
        withdrawal_fee_bps: bps(DataKey::WithdrawalFeeBps),
    }
}

pub fn set_fees(env: &Env, fees: &FeeConfig) {
    env.storage()
        .instance()
        .set(&DataKey::PerformanceFeeBps, &fees.performance_fee_bps);
    env.storage()
        .instance()
        .set(&DataKey::ManagementFeeBps, &fees.management_fee_bps);
    env.storage()
        .instance()
        .set(&DataKey::WithdrawalFeeBps, &fees.withdrawal_fee_bps);
}

pub fn last_harvest(env: &Env) -> u64 {
    env.storage().instance().get(&DataKey::LastHarvest).unwrap_or(0)
}

pub fn last_recorded_total_assets(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::LastRecordedTotalAssets)
        .unwrap_or(0)
}

pub fn record_harvest(env: &Env, timestamp: u64, total_assets: i128) {
    env.storage().instance().set(&DataKey::LastHarvest, &timestamp);
    env.storage()
        .instance()
        .set(&DataKey::LastRecordedTotalAssets, &total_assets);
}

pub fn is_shutdown(env: &Env) -> bool {
    env.storage().instance().get(&DataKey::Shutdown).unwrap_or(false)
}

pub fn is_paused(env: &Env) -> bool {
    env.storage().instance().get(&DataKey::Paused).unwrap_or(false)
}

pub fn set_flag(env: &Env, key: &DataKey, value: bool) {
    env.storage().instance().set(key, &value);
}

pub fn total_supply(env: &Env) -> i128 {
    env.storage().instance().get(&DataKey::TotalSupply).unwrap_or(0)
}

pub fn shares_of(env: &Env, holder: &Address) -> i128 {
    let key = DataKey::Shares(holder.clone());
    match env.storage().persistent().get::<_, i128>(&key) {
        Some(shares) => {
            env.storage()
                .persistent()
                .extend_ttl(&key, BALANCE_LIFETIME_THRESHOLD, BALANCE_BUMP_AMOUNT);
            shares
        }
        None => 0,
    }
}

/// Writes a holder's new balance and the matching total supply.
pub fn write_shares(env: &Env, holder: &Address, shares: i128, total_supply: i128) {
    let key = DataKey::Shares(holder.clone());
    if shares == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &shares);
        env.storage()
            .persistent()
            .extend_ttl(&key, BALANCE_LIFETIME_THRESHOLD, BALANCE_BUMP_AMOUNT);
    }
    env.storage().instance().set(&DataKey::TotalSupply, &total_supply);
}
