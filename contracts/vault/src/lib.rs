//! # Share Vault Contract
//!
//! An ERC-4626 inspired vault that pools deposits of a single asset, routes
//! them to one pluggable yield strategy, and tracks proportional ownership with
//! an internal share ledger whose unit value grows as yield is harvested.
//!
//! ## Architecture Overview
//!
//! The vault is the accounting engine. It never decides where capital goes:
//! the controller holds the vault's active strategy, and the vault asks it on
//! every call. Any contract implementing `StrategyInterface` can be registered.
//!
//! ## Share Accounting Model
//!
//! - `total_assets = idle balance + strategy.balance_of()`
//! - `price_per_share = total_assets * SCALE / total_supply`, or `SCALE`
//!   before the first deposit
//! - The first deposit mints 1:1. Later deposits mint
//!   `amount * total_supply / total_assets_before`, priced on the total
//!   captured *before* the deposit was pulled in and forwarded
//! - A withdrawal burns shares for `shares * total_assets / total_supply`
//!
//! ## Asset Flow
//!
//! ```text
//! Deposit Flow:
//! User → [Asset Token] → [Vault] → approve → [Strategy pulls full amount]
//!                           ↓
//!                   Shares minted, DepositEvent emitted
//!
//! Withdraw Flow:
//! User → [Vault.withdraw()] → shortfall? → [Strategy.withdraw()]
//!                  ↓
//!   Withdrawal fee → Treasury, remainder → User, WithdrawEvent emitted
//!
//! Harvest Flow (Keeper):
//! Keeper → [Vault.harvest()] → [Controller.harvest()] → [Strategy.harvest()]
//!                  ↓
//!   profit = own balance delta
//!   performance fee + management fee → Treasury
//!   remaining profit → Strategy, HarvestEvent emitted
//! ```
//!
//! ## Fees
//!
//! - Performance fee: share of each harvest's profit (cap 50%)
//! - Management fee: annual rate on total assets, accrued linearly since the
//!   last profitable harvest and charged only when a harvest is profitable
//!   (cap 10%). It is paid out of the vault's balance and does not reduce the
//!   profit that is reinvested; when idle funds cannot cover it, the shortfall
//!   is pulled from the strategy
//! - Withdrawal fee: share of every withdrawal (cap 10%)
//!
//! ## Lifecycle
//!
//! `paused` blocks deposits and withdrawals until governance unpauses.
//! `emergency_withdraw` recalls everything from the strategy and latches
//! `shutdown`: deposits are refused forever, withdrawals keep working.
//!
//! # Examples
//!
//! ## Deposit
//! ```ignore
//! let shares = vault_client.deposit(&user, &amount, &None);
//! ```
//!
//! ## Withdraw with a slippage floor
//! ```ignore
//! let paid = vault_client.withdraw(&user, &shares, &Some(min_amount_out));
//! ```

#![no_std]

mod events;
mod storage;

pub use events::*;
pub use storage::{DataKey, FeeConfig};

use share_vault_common::{
    access::{self, Role},
    math::{accrue_annual, apply_bps, checked_add, checked_sub, mul_div, SCALE},
    reentrancy, ControllerClient, StrategyClient, VaultError, APPROVAL_LEDGERS,
};
use soroban_sdk::{contract, contractimpl, log, symbol_short, token, Address, Env};

/// Upper bound for `performance_fee_bps` (50% of profit).
pub const MAX_PERFORMANCE_FEE_BPS: u32 = 5_000;
/// Upper bound for `management_fee_bps` (10% of assets per year).
pub const MAX_MANAGEMENT_FEE_BPS: u32 = 1_000;
/// Upper bound for `withdrawal_fee_bps` (10% of each withdrawal).
pub const MAX_WITHDRAWAL_FEE_BPS: u32 = 1_000;

const VERSION: u32 = 1;


// ============================================================================
// CONTRACT
// ============================================================================

/// Share Vault - single-asset, single-strategy yield vault on Soroban
///
/// # Security Model
///
/// - Depositors and withdrawers authorize their own calls (`require_auth()`)
/// - Harvest requires the `Keeper` role
/// - Fees, treasury, pause and emergency shutdown require `Governance`
/// - Role assignments require `Admin`
/// - Deposit, withdraw, harvest and emergency withdraw hold a reentrancy guard
///   for their whole duration
#[contract]
pub struct ShareVault;

#[contractimpl]
impl ShareVault {

    // ==========================================================================
    // INITIALIZATION
    // ==========================================================================

    /// Initializes the vault with its asset, registry, fees and treasury.
    ///
    /// Must be called exactly once after deployment.
    ///
    /// # Arguments
    /// * `asset` - The token accepted for deposits
    /// * `controller` - The registry holding this vault's strategy
    /// * `performance_fee_bps` - Share of harvest profit sent to the treasury
    /// * `management_fee_bps` - Annual rate on total assets
    /// * `withdrawal_fee_bps` - Share of each withdrawal sent to the treasury
    /// * `treasury` - Fee recipient
    /// * `admin` - Receives the `Admin`, `Governance` and `Keeper` roles
    ///
    /// # Errors
    /// - `AlreadyInitialized` if called twice
    /// - `InvalidAddress` if any address (admin included) is this vault, or
    ///   asset equals controller
    /// - `FeeTooHigh` if any fee is above its cap
    ///
    /// # Events
    /// Emits `VaultInitializedEvent`
    pub fn initialize(
        env: Env,
        asset: Address,
        controller: Address,
        performance_fee_bps: u32,
        management_fee_bps: u32,
        withdrawal_fee_bps: u32,
        treasury: Address,
        admin: Address,
    ) -> Result<(), VaultError> {
        if storage::is_initialized(&env) {
            return Err(VaultError::AlreadyInitialized);
        }
        Self::require_valid_address(&env, &asset)?;
        Self::require_valid_address(&env, &controller)?;
        Self::require_valid_address(&env, &treasury)?;
        Self::require_valid_address(&env, &admin)?;
        if asset == controller {
            return Err(VaultError::InvalidAddress);
        }

        let fees = FeeConfig {
            performance_fee_bps,
            management_fee_bps,
            withdrawal_fee_bps,
        };
        Self::require_valid_fees(&fees)?;

        env.storage().instance().set(&DataKey::Asset, &asset);
        env.storage().instance().set(&DataKey::Controller, &controller);
        storage::set_fees(&env, &fees);
        storage::set_treasury(&env, &treasury);
        storage::record_harvest(&env, env.ledger().timestamp(), 0);
        storage::set_flag(&env, &DataKey::Shutdown, false);
        storage::set_flag(&env, &DataKey::Paused, false);
        env.storage().instance().set(&DataKey::TotalSupply, &0_i128);
        env.storage().instance().set(&DataKey::Version, &VERSION);

        for role in [Role::Admin, Role::Governance, Role::Keeper] {
            access::set_role(&env, role, &admin);
        }
        storage::bump_instance(&env);

        env.events().publish(
            (symbol_short!("init"),),
            VaultInitializedEvent { asset, controller, treasury, admin, fees },
        );
        Ok(())
    }


    // ==========================================================================
    // CORE LIFECYCLE - DEPOSIT
    // ==========================================================================

    /// Deposits `amount` of the asset and mints shares to `recipient`.
    ///
    /// The full amount is forwarded to the registered strategy, if any, before
    /// shares are minted. Shares are priced on total assets captured before
    /// the deposit.
    ///
    /// # Arguments
    /// * `caller` - Account the assets are pulled from (must authorize)
    /// * `amount` - Assets to deposit
    /// * `recipient` - Account credited with the shares; defaults to `caller`
    ///
    /// # Returns
    /// The number of shares minted
    ///
    /// # Errors
    /// - `EmergencyShutdownActive` after `emergency_withdraw`
    /// - `Paused` while paused
    /// - `InvalidAmount` if `amount <= 0` or the deposit would mint no shares
    /// - `InvalidAddress` if `recipient` is this vault
    /// - `Reentrancy` on nested entry
    ///
    /// # Events
    /// Emits `DepositEvent`
    pub fn deposit(
        env: Env,
        caller: Address,
        amount: i128,
        recipient: Option<Address>,
    ) -> Result<i128, VaultError> {
        caller.require_auth();

        Self::require_not_shutdown(&env)?;
        Self::require_not_paused(&env)?;
        Self::require_positive_amount(amount)?;
        let recipient = recipient.unwrap_or_else(|| caller.clone());
        Self::require_valid_address(&env, &recipient)?;

        reentrancy::enter(&env)?;

        let this = env.current_contract_address();
        let token = token::Client::new(&env, &storage::asset(&env)?);

        let total_assets_before = Self::compute_total_assets(&env)?;
        token.transfer(&caller, &this, &amount);
        if let Some(strategy) = Self::active_strategy(&env)? {
            Self::deploy_to_strategy(&env, &token, &strategy, amount);
        }
        let total_assets_after = Self::compute_total_assets(&env)?;

        let supply = storage::total_supply(&env);
        let shares = if supply == 0 {
            amount
        } else {
            mul_div(amount, supply, total_assets_before)?
        };
        if shares <= 0 {
            return Err(VaultError::InvalidAmount);
        }
        Self::mint(&env, &recipient, shares)?;

        reentrancy::exit(&env);
        storage::bump_instance(&env);

        env.events().publish(
            (symbol_short!("deposit"),),
            DepositEvent {
                caller,
                recipient,
                amount,
                shares,
                total_assets: total_assets_after,
            },
        );
        Ok(shares)
    }


    // ==========================================================================
    // CORE LIFECYCLE - WITHDRAW
    // ==========================================================================

    /// Burns `shares` and pays the caller their proportional claim on total
    /// assets, minus the withdrawal fee.
    ///
    /// If idle funds cannot cover the claim, the shortfall is pulled from the
    /// strategy, capped at what it reports. When the strategy under-delivers
    /// the payout shrinks to what the vault holds; `min_amount_out` is the
    /// caller's protection against that.
    ///
    /// Works after emergency shutdown.
    ///
    /// # Arguments
    /// * `caller` - Share holder (must authorize)
    /// * `shares` - Shares to burn
    /// * `min_amount_out` - Minimum assets to receive after fees; defaults to 0
    ///
    /// # Returns
    /// Assets transferred to the caller
    ///
    /// # Errors
    /// - `Paused` while paused
    /// - `InvalidAmount` if `shares <= 0`
    /// - `InsufficientShares` if the caller holds fewer than `shares`
    /// - `InsufficientOutput` if the payout is below `min_amount_out`
    /// - `Reentrancy` on nested entry
    ///
    /// # Events
    /// Emits `WithdrawEvent`
    pub fn withdraw(
        env: Env,
        caller: Address,
        shares: i128,
        min_amount_out: Option<i128>,
    ) -> Result<i128, VaultError> {
        caller.require_auth();

        Self::require_not_paused(&env)?;
        Self::require_positive_amount(shares)?;
        if storage::shares_of(&env, &caller) < shares {
            return Err(VaultError::InsufficientShares);
        }

        reentrancy::enter(&env)?;

        let this = env.current_contract_address();
        let token = token::Client::new(&env, &storage::asset(&env)?);

        let supply = storage::total_supply(&env);
        let mut amount = mul_div(shares, Self::compute_total_assets(&env)?, supply)?;

        let idle = token.balance(&this);
        if idle < amount {
            if let Some(strategy) = Self::active_strategy(&env)? {
                Self::pull_from_strategy(&env, &strategy, checked_sub(amount, idle)?);
            }
            let available = token.balance(&this);
            if available < amount {
                log!(&env, "withdraw truncated: owed {}, available {}", amount, available);
                amount = available;
            }
        }

        let fee = apply_bps(amount, storage::fees(&env).withdrawal_fee_bps)?;
        amount = checked_sub(amount, fee)?;
        if amount < min_amount_out.unwrap_or(0) {
            return Err(VaultError::InsufficientOutput);
        }

        Self::burn(&env, &caller, shares)?;
        if fee > 0 {
            token.transfer(&this, &storage::treasury(&env)?, &fee);
        }
        if amount > 0 {
            token.transfer(&this, &caller, &amount);
        }

        reentrancy::exit(&env);
        storage::bump_instance(&env);

        env.events().publish(
            (symbol_short!("withdraw"),),
            WithdrawEvent { caller, shares, amount, fee },
        );
        Ok(amount)
    }


    // ==========================================================================
    // CORE LIFECYCLE - HARVEST
    // ==========================================================================

    /// Realizes strategy yield, takes fees and reinvests the rest.
    ///
    /// Profit is the increase of the vault's own balance across the
    /// controller-mediated strategy harvest; the amount the strategy reports
    /// is not used. With no profit nothing else happens: no fees, no
    /// reinvestment, and the harvest timestamp does not move.
    ///
    /// `total_assets` already includes yield the strategy has accrued but not
    /// paid out, so `price_per_share` read right before this call counts the
    /// gross yield. Once fees leave, the price drops below that reading. It
    /// stays above the price at the previous deposit or harvest while fees
    /// are below the profit.
    ///
    /// # Arguments
    /// * `caller` - Keeper (must authorize)
    ///
    /// # Returns
    /// The gross profit, or 0 when the harvest was not profitable
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` lacks the `Keeper` role
    /// - `NoStrategy` if no strategy is registered
    /// - `Reentrancy` on nested entry
    ///
    /// # Events
    /// Emits `HarvestEvent` when profitable
    ///
    /// # Security
    /// - The vault must hold the `Keeper` role on the controller
    pub fn harvest(env: Env, caller: Address) -> Result<i128, VaultError> {
        access::require_role(&env, &caller, Role::Keeper)?;
        let strategy = Self::active_strategy(&env)?.ok_or(VaultError::NoStrategy)?;

        reentrancy::enter(&env)?;

        let this = env.current_contract_address();
        let token = token::Client::new(&env, &storage::asset(&env)?);
        let controller = ControllerClient::new(&env, &storage::controller(&env)?);

        let balance_before = token.balance(&this);
        controller.harvest(&this, &this);
        let balance_after = token.balance(&this);

        let gross_profit = checked_sub(balance_after, balance_before)?;
        if gross_profit <= 0 {
            reentrancy::exit(&env);
            return Ok(0);
        }

        let fees = storage::fees(&env);
        let treasury = storage::treasury(&env)?;

        let performance_fee = apply_bps(gross_profit, fees.performance_fee_bps)?;
        if performance_fee > 0 {
            token.transfer(&this, &treasury, &performance_fee);
        }
        let profit = checked_sub(gross_profit, performance_fee)?;

        // Charged on current total assets; it does not reduce `profit`.
        let mut management_fee = Self::accrued_management_fee(&env, fees.management_fee_bps)?;
        if management_fee > 0 {
            let idle = token.balance(&this);
            if idle < management_fee {
                Self::pull_from_strategy(&env, &strategy, checked_sub(management_fee, idle)?);
            }
            management_fee = management_fee.min(token.balance(&this));
            if management_fee > 0 {
                token.transfer(&this, &treasury, &management_fee);
            }
        }

        let reinvested = profit.min(token.balance(&this)).max(0);
        if reinvested > 0 {
            Self::deploy_to_strategy(&env, &token, &strategy, reinvested);
        }

        let total_assets = Self::compute_total_assets(&env)?;
        storage::record_harvest(&env, env.ledger().timestamp(), total_assets);

        reentrancy::exit(&env);
        storage::bump_instance(&env);

        env.events().publish(
            (symbol_short!("harvest"),),
            HarvestEvent {
                profit: gross_profit,
                performance_fee,
                management_fee,
                reinvested,
                total_assets,
            },
        );
        Ok(gross_profit)
    }


    // ==========================================================================
    // ADMINISTRATIVE - EMERGENCY
    // ==========================================================================

    /// Recalls every asset from the strategy and shuts the vault down.
    ///
    /// Shutdown is permanent: deposits are refused from now on, withdrawals
    /// continue to work against the recalled idle balance.
    ///
    /// # Returns
    /// Assets recovered from the strategy
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` lacks the `Governance` role
    /// - `Reentrancy` on nested entry
    ///
    /// # Events
    /// Emits `ShutdownEvent`
    pub fn emergency_withdraw(env: Env, caller: Address) -> Result<i128, VaultError> {
        access::require_role(&env, &caller, Role::Governance)?;
        reentrancy::enter(&env)?;

        storage::set_flag(&env, &DataKey::Shutdown, true);
        let recovered = match Self::active_strategy(&env)? {
            Some(strategy) => StrategyClient::new(&env, &strategy).withdraw_all(),
            None => 0,
        };

        reentrancy::exit(&env);
        storage::bump_instance(&env);

        env.events().publish(
            (symbol_short!("shutdown"),),
            ShutdownEvent { caller, recovered },
        );
        Ok(recovered)
    }


    // ==========================================================================
    // ADMINISTRATIVE - PAUSE CONTROL
    // ==========================================================================

    /// Pauses the vault, disabling deposits and withdrawals.
    ///
    /// Read functions and harvest remain operational.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` lacks the `Governance` role
    /// - `Paused` if already paused
    ///
    /// # Events
    /// Emits `PauseEvent` with `paused: true`
    pub fn pause(env: Env, caller: Address) -> Result<(), VaultError> {
        access::require_role(&env, &caller, Role::Governance)?;
        Self::require_not_paused(&env)?;

        storage::set_flag(&env, &DataKey::Paused, true);
        storage::bump_instance(&env);

        env.events().publish(
            (symbol_short!("paused"),),
            PauseEvent { paused: true, caller },
        );
        Ok(())
    }

    /// Unpauses the vault, re-enabling deposits and withdrawals.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` lacks the `Governance` role
    /// - `NotPaused` if the vault is not currently paused
    ///
    /// # Events
    /// Emits `PauseEvent` with `paused: false`
    pub fn unpause(env: Env, caller: Address) -> Result<(), VaultError> {
        access::require_role(&env, &caller, Role::Governance)?;
        if !storage::is_paused(&env) {
            return Err(VaultError::NotPaused);
        }

        storage::set_flag(&env, &DataKey::Paused, false);
        storage::bump_instance(&env);

        env.events().publish(
            (symbol_short!("unpaused"),),
            PauseEvent { paused: false, caller },
        );
        Ok(())
    }


    // ==========================================================================
    // ADMINISTRATIVE - CONFIGURATION
    // ==========================================================================

    /// Sets the share of harvest profit taken as performance fee.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` lacks the `Governance` role
    /// - `FeeTooHigh` above `MAX_PERFORMANCE_FEE_BPS`
    pub fn set_performance_fee(env: Env, caller: Address, fee_bps: u32) -> Result<(), VaultError> {
        access::require_role(&env, &caller, Role::Governance)?;
        let fees = FeeConfig {
            performance_fee_bps: fee_bps,
            ..storage::fees(&env)
        };
        Self::update_fees(&env, fees)
    }

    /// Sets the annual management fee rate.
    ///
    /// Takes effect at the next profitable harvest, over the whole period
    /// since the previous one.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` lacks the `Governance` role
    /// - `FeeTooHigh` above `MAX_MANAGEMENT_FEE_BPS`
    pub fn set_management_fee(env: Env, caller: Address, fee_bps: u32) -> Result<(), VaultError> {
        access::require_role(&env, &caller, Role::Governance)?;
        let fees = FeeConfig {
            management_fee_bps: fee_bps,
            ..storage::fees(&env)
        };
        Self::update_fees(&env, fees)
    }

    /// Sets the share of each withdrawal sent to the treasury.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` lacks the `Governance` role
    /// - `FeeTooHigh` above `MAX_WITHDRAWAL_FEE_BPS`
    pub fn set_withdrawal_fee(env: Env, caller: Address, fee_bps: u32) -> Result<(), VaultError> {
        access::require_role(&env, &caller, Role::Governance)?;
        let fees = FeeConfig {
            withdrawal_fee_bps: fee_bps,
            ..storage::fees(&env)
        };
        Self::update_fees(&env, fees)
    }

    /// Replaces the fee recipient.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` lacks the `Governance` role
    /// - `InvalidAddress` if `treasury` is this vault
    ///
    /// # Events
    /// Emits `TreasuryUpdatedEvent`
    pub fn set_treasury(env: Env, caller: Address, treasury: Address) -> Result<(), VaultError> {
        access::require_role(&env, &caller, Role::Governance)?;
        Self::require_valid_address(&env, &treasury)?;

        let old_treasury = storage::treasury(&env)?;
        storage::set_treasury(&env, &treasury);
        storage::bump_instance(&env);

        env.events().publish(
            (symbol_short!("treasury"),),
            TreasuryUpdatedEvent { old_treasury, new_treasury: treasury },
        );
        Ok(())
    }

    pub fn grant_role(
        env: Env,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<(), VaultError> {
        access::grant_role(&env, &caller, role, &account)
    }

    pub fn revoke_role(
        env: Env,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<(), VaultError> {
        access::revoke_role(&env, &caller, role, &account)
    }


    // ==========================================================================
    // READ FUNCTIONS
    // ==========================================================================

    /// Idle balance plus whatever the strategy reports, including yield it
    /// has accrued but not yet harvested.
    ///
    /// Safe to call at any time, including while paused or shut down.
    pub fn total_assets(env: Env) -> Result<i128, VaultError> {
        Self::compute_total_assets(&env)
    }

    /// Value of one share scaled by `SCALE` (1e18).
    ///
    /// Returns `SCALE` while no shares exist, which is the bootstrap 1:1 rate.
    pub fn price_per_share(env: Env) -> Result<i128, VaultError> {
        let supply = storage::total_supply(&env);
        if supply == 0 {
            return Ok(SCALE);
        }
        mul_div(Self::compute_total_assets(&env)?, SCALE, supply)
    }

    /// Shares a deposit of `amount` would mint right now.
    pub fn convert_to_shares(env: Env, amount: i128) -> Result<i128, VaultError> {
        let supply = storage::total_supply(&env);
        if supply == 0 {
            return Ok(amount);
        }
        mul_div(amount, supply, Self::compute_total_assets(&env)?)
    }

    /// Assets `shares` are worth right now, before the withdrawal fee.
    pub fn convert_to_assets(env: Env, shares: i128) -> Result<i128, VaultError> {
        let supply = storage::total_supply(&env);
        if supply == 0 {
            return Ok(shares);
        }
        mul_div(shares, Self::compute_total_assets(&env)?, supply)
    }

    pub fn total_supply(env: Env) -> i128 {
        storage::total_supply(&env)
    }

    /// Share balance of `holder`.
    pub fn balance_of(env: Env, holder: Address) -> i128 {
        storage::shares_of(&env, &holder)
    }

    /// Assets held by the vault itself, not deployed to the strategy.
    pub fn idle_balance(env: Env) -> Result<i128, VaultError> {
        let asset = storage::asset(&env)?;
        Ok(token::Client::new(&env, &asset).balance(&env.current_contract_address()))
    }

    pub fn asset(env: Env) -> Result<Address, VaultError> {
        storage::asset(&env)
    }

    pub fn controller(env: Env) -> Result<Address, VaultError> {
        storage::controller(&env)
    }

    /// The strategy the controller currently has registered for this vault.
    pub fn strategy(env: Env) -> Result<Option<Address>, VaultError> {
        Self::active_strategy(&env)
    }

    pub fn treasury(env: Env) -> Result<Address, VaultError> {
        storage::treasury(&env)
    }

    pub fn fees(env: Env) -> FeeConfig {
        storage::fees(&env)
    }

    pub fn last_harvest_timestamp(env: Env) -> u64 {
        storage::last_harvest(&env)
    }

    pub fn last_recorded_total_assets(env: Env) -> i128 {
        storage::last_recorded_total_assets(&env)
    }

    pub fn is_shutdown(env: Env) -> bool {
        storage::is_shutdown(&env)
    }

    pub fn is_paused(env: Env) -> bool {
        storage::is_paused(&env)
    }

    pub fn has_role(env: Env, role: Role, account: Address) -> bool {
        access::has_role(&env, role, &account)
    }

    /// Returns the contract version.
    pub fn get_version(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&DataKey::Version)
            .unwrap_or(VERSION)
    }


    // ==========================================================================
    // INTERNAL ACCOUNTING HELPERS
    // ==========================================================================

    fn compute_total_assets(env: &Env) -> Result<i128, VaultError> {
        let token = token::Client::new(env, &storage::asset(env)?);
        let idle = token.balance(&env.current_contract_address());
        let deployed = match Self::active_strategy(env)? {
            Some(strategy) => StrategyClient::new(env, &strategy).balance_of(),
            None => 0,
        };
        checked_add(idle, deployed)
    }

    fn active_strategy(env: &Env) -> Result<Option<Address>, VaultError> {
        let controller = ControllerClient::new(env, &storage::controller(env)?);
        Ok(controller.get_strategy(&env.current_contract_address()))
    }

    /// Management fee accrued since the last profitable harvest.
    fn accrued_management_fee(env: &Env, management_fee_bps: u32) -> Result<i128, VaultError> {
        if management_fee_bps == 0 {
            return Ok(0);
        }
        let elapsed = env
            .ledger()
            .timestamp()
            .saturating_sub(storage::last_harvest(env));
        accrue_annual(Self::compute_total_assets(env)?, management_fee_bps, elapsed)
    }

    /// Approve, let the strategy pull, reset the approval.
    fn deploy_to_strategy(env: &Env, token: &token::Client, strategy: &Address, amount: i128) {
        let this = env.current_contract_address();
        let expiration = env.ledger().sequence() + APPROVAL_LEDGERS;
        token.approve(&this, strategy, &amount, &expiration);
        StrategyClient::new(env, strategy).deposit(&amount);
        token.approve(&this, strategy, &0, &expiration);
    }

    /// Asks the strategy for `shortfall`, capped at the balance it reports.
    fn pull_from_strategy(env: &Env, strategy: &Address, shortfall: i128) {
        let client = StrategyClient::new(env, strategy);
        let request = shortfall.min(client.balance_of());
        if request > 0 {
            client.withdraw(&request);
        }
    }

    fn mint(env: &Env, to: &Address, shares: i128) -> Result<(), VaultError> {
        let balance = checked_add(storage::shares_of(env, to), shares)?;
        let supply = checked_add(storage::total_supply(env), shares)?;
        storage::write_shares(env, to, balance, supply);
        Ok(())
    }

    fn burn(env: &Env, from: &Address, shares: i128) -> Result<(), VaultError> {
        let balance = checked_sub(storage::shares_of(env, from), shares)?;
        let supply = checked_sub(storage::total_supply(env), shares)?;
        storage::write_shares(env, from, balance, supply);
        Ok(())
    }

    fn update_fees(env: &Env, fees: FeeConfig) -> Result<(), VaultError> {
        Self::require_valid_fees(&fees)?;

        let old_fees = storage::fees(env);
        storage::set_fees(env, &fees);
        storage::bump_instance(env);

        env.events().publish(
            (symbol_short!("fees_set"),),
            FeesUpdatedEvent { old_fees, new_fees: fees },
        );
        Ok(())
    }


    // ==========================================================================
    // INTERNAL VALIDATION HELPERS
    // ==========================================================================

    #[inline]
    fn require_not_paused(env: &Env) -> Result<(), VaultError> {
        if storage::is_paused(env) {
            return Err(VaultError::Paused);
        }
        Ok(())
    }

    #[inline]
    fn require_not_shutdown(env: &Env) -> Result<(), VaultError> {
        if storage::is_shutdown(env) {
            return Err(VaultError::EmergencyShutdownActive);
        }
        Ok(())
    }

    #[inline]
    fn require_positive_amount(amount: i128) -> Result<(), VaultError> {
        if amount <= 0 {
            return Err(VaultError::InvalidAmount);
        }
        Ok(())
    }

    /// Funds sent to the vault's own address would be counted as idle
    /// assets of every holder; it stands in for the null address.
    #[inline]
    fn require_valid_address(env: &Env, address: &Address) -> Result<(), VaultError> {
        if *address == env.current_contract_address() {
            return Err(VaultError::InvalidAddress);
        }
        Ok(())
    }

    fn require_valid_fees(fees: &FeeConfig) -> Result<(), VaultError> {
        if fees.performance_fee_bps > MAX_PERFORMANCE_FEE_BPS
            || fees.management_fee_bps > MAX_MANAGEMENT_FEE_BPS
            || fees.withdrawal_fee_bps > MAX_WITHDRAWAL_FEE_BPS
        {
            return Err(VaultError::FeeTooHigh);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test;
