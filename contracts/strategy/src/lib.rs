//! # Linear Yield Strategy
//!
//! Reference strategy for the share vault. It holds the principal the vault
//! deploys into it and accrues yield on that principal at a fixed annual rate,
//! linearly in ledger time.
//!
//! ## Accounting Model
//!
//! ```text
//! balance_of = principal + pending_yield + principal * rate * (now - last_accrual) / year
//!              \_______/   \___________/   \___________________________________________/
//!               deployed    rolled up at        projected on read, never written
//!                           last accrual
//! ```
//!
//! Every mutating call first rolls the projection into `pending_yield` and
//! moves `last_accrual` to now, so yield is never counted twice and new
//! principal does not earn retroactively.
//!
//! Yield is paid out of a reward reserve: any token balance the contract holds
//! above `principal`. Sponsors top it up with `fund_rewards`. A harvest pays
//! `min(pending_yield, reserve)` to the vault and leaves the rest pending.
//!
//! ## Callers
//! - The vault: `deposit`, `withdraw`, `withdraw_all`
//! - The controller (owner): `harvest`, `migrate`
//! - A predecessor strategy during migration: `accept_migration`
//! - Anyone: `fund_rewards` and the read functions

#![no_std]

use share_vault_common::{
    math::{accrue_annual, checked_add, checked_sub},
    StrategyClient, StrategyInterface, VaultError, APPROVAL_LEDGERS, INSTANCE_BUMP_AMOUNT,
    INSTANCE_LIFETIME_THRESHOLD,
};
use soroban_sdk::{
    contract, contractimpl, contracttype, log, panic_with_error, symbol_short, token, Address,
    Env, String,
};


// ============================================================================
// STORAGE KEYS
// ============================================================================

/// Instance storage keys. A strategy is a small singleton, so every entry
/// lives in instance storage.
#[contracttype]
pub enum DataKey {
    /// Owning vault, fixed at initialization
    Vault,
    /// Owner allowed to harvest and migrate
    Controller,
    /// Underlying token
    Asset,
    Name,
    AnnualRateBps,
    Position,
    /// Set once the position has been migrated to a successor
    Retired,
}

/// Deployed principal and yield bookkeeping.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
    pub principal: i128,
    /// Yield rolled up at `last_accrual` and not yet harvested
    pub pending_yield: i128,
    pub last_accrual: u64,
}

impl Position {
    fn projected_yield(&self, annual_rate_bps: u32, now: u64) -> Result<i128, VaultError> {
        accrue_annual(
            self.principal,
            annual_rate_bps,
            now.saturating_sub(self.last_accrual),
        )
    }

    fn total(&self) -> Result<i128, VaultError> {
        checked_add(self.principal, self.pending_yield)
    }
}


// ============================================================================
// EVENTS
// ============================================================================

/// # Topics
/// - `SymbolShort("deposit")`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StrategyDepositEvent {
    pub amount: i128,
    pub principal: i128,
}

/// # Topics
/// - `SymbolShort("withdraw")`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StrategyWithdrawEvent {
    pub requested: i128,
    pub returned: i128,
}

/// # Topics
/// - `SymbolShort("harvest")`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StrategyHarvestEvent {
    pub harvested: i128,
    /// Yield left pending because the reserve could not cover it
    pub pending_yield: i128,
}

/// # Topics
/// - `SymbolShort("migrate")` on the predecessor
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MigrationEvent {
    pub new_strategy: Address,
    pub amount: i128,
    /// Unbooked reward reserve handed over with the position
    pub surplus: i128,
}

/// # Topics
/// - `SymbolShort("mig_in")` on the successor
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MigrationReceivedEvent {
    pub from: Address,
    pub amount: i128,
}

/// # Topics
/// - `SymbolShort("rewards")`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardsFundedEvent {
    pub from: Address,
    pub amount: i128,
}


// ============================================================================
// CONTRACT
// ============================================================================

#[contract]
pub struct LinearYieldStrategy;

#[contractimpl]
impl LinearYieldStrategy {

    /// Configures the strategy. Callable once.
    ///
    /// # Arguments
    /// * `vault` - The vault whose capital this strategy manages
    /// * `controller` - Owner allowed to harvest and migrate
    /// * `asset` - The vault's underlying token
    /// * `name` - Display name
    /// * `annual_rate_bps` - Linear yield rate per 365 days
    ///
    /// # Errors
    /// - `AlreadyInitialized` on a second call
    /// - `InvalidAddress` if any address is this contract itself
    pub fn initialize(
        env: Env,
        vault: Address,
        controller: Address,
        asset: Address,
        name: String,
        annual_rate_bps: u32,
    ) -> Result<(), VaultError> {
        if env.storage().instance().has(&DataKey::Vault) {
            return Err(VaultError::AlreadyInitialized);
        }
        let this = env.current_contract_address();
        if vault == this || controller == this || asset == this {
            return Err(VaultError::InvalidAddress);
        }

        env.storage().instance().set(&DataKey::Vault, &vault);
        env.storage().instance().set(&DataKey::Controller, &controller);
        env.storage().instance().set(&DataKey::Asset, &asset);
        env.storage().instance().set(&DataKey::Name, &name);
        env.storage().instance().set(&DataKey::AnnualRateBps, &annual_rate_bps);
        env.storage().instance().set(&DataKey::Retired, &false);
        env.storage().instance().set(
            &DataKey::Position,
            &Position {
                principal: 0,
                pending_yield: 0,
                last_accrual: env.ledger().timestamp(),
            },
        );
        Self::bump(&env);
        Ok(())
    }

    /// Tops up the reward reserve that harvests are paid from.
    pub fn fund_rewards(env: Env, from: Address, amount: i128) -> Result<(), VaultError> {
        from.require_auth();
        if amount <= 0 {
            return Err(VaultError::InvalidAmount);
        }

        let asset = Self::asset(env.clone())?;
        token::Client::new(&env, &asset).transfer(&from, &env.current_contract_address(), &amount);
        Self::bump(&env);

        env.events().publish(
            (symbol_short!("rewards"),),
            RewardsFundedEvent { from, amount },
        );
        Ok(())
    }

    // ==========================================================================
    // READ FUNCTIONS
    // ==========================================================================

    pub fn controller(env: Env) -> Result<Address, VaultError> {
        env.storage()
            .instance()
            .get(&DataKey::Controller)
            .ok_or(VaultError::NotInitialized)
    }

    pub fn asset(env: Env) -> Result<Address, VaultError> {
        env.storage()
            .instance()
            .get(&DataKey::Asset)
            .ok_or(VaultError::NotInitialized)
    }

    pub fn annual_rate_bps(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&DataKey::AnnualRateBps)
            .unwrap_or(0)
    }

    /// Stored bookkeeping as of the last accrual; excludes the projection.
    pub fn position(env: Env) -> Result<Position, VaultError> {
        Self::load_position(&env)
    }

    /// Token balance above principal, available to pay yield.
    pub fn reward_reserve(env: Env) -> Result<i128, VaultError> {
        let position = Self::load_position(&env)?;
        let balance = Self::token_balance(&env)?;
        Ok(checked_sub(balance, position.principal)?.max(0))
    }

    pub fn is_retired(env: Env) -> bool {
        env.storage()
            .instance()
            .get(&DataKey::Retired)
            .unwrap_or(false)
    }

    // ==========================================================================
    // INTERNAL HELPERS
    // ==========================================================================

    fn vault_address(env: &Env) -> Result<Address, VaultError> {
        env.storage()
            .instance()
            .get(&DataKey::Vault)
            .ok_or(VaultError::NotInitialized)
    }

    fn load_position(env: &Env) -> Result<Position, VaultError> {
        env.storage()
            .instance()
            .get(&DataKey::Position)
            .ok_or(VaultError::NotInitialized)
    }

    fn store_position(env: &Env, position: &Position) {
        env.storage().instance().set(&DataKey::Position, position);
        Self::bump(env);
    }

    /// Rolls yield accrued since the last accrual into `pending_yield`.
    fn accrue(env: &Env) -> Result<Position, VaultError> {
        let mut position = Self::load_position(env)?;
        let now = env.ledger().timestamp();
        let earned = position.projected_yield(Self::annual_rate_bps(env.clone()), now)?;
        position.pending_yield = checked_add(position.pending_yield, earned)?;
        position.last_accrual = now;
        Ok(position)
    }

    /// Takes up to `requested` out of the position, principal first, bounded by
    /// what the position is worth and what the contract actually holds.
    fn release(env: &Env, position: &mut Position, requested: i128) -> Result<i128, VaultError> {
        let available = position.total()?.min(Self::token_balance(env)?);
        let released = requested.min(available).max(0);

        let from_principal = released.min(position.principal);
        position.principal = checked_sub(position.principal, from_principal)?;
        position.pending_yield =
            checked_sub(position.pending_yield, checked_sub(released, from_principal)?)?;
        Ok(released)
    }

    fn token_balance(env: &Env) -> Result<i128, VaultError> {
        let asset = Self::asset(env.clone())?;
        Ok(token::Client::new(env, &asset).balance(&env.current_contract_address()))
    }

    fn send_to_vault(env: &Env, amount: i128) -> Result<(), VaultError> {
        if amount > 0 {
            let asset = Self::asset(env.clone())?;
            let vault = Self::vault_address(env)?;
            token::Client::new(env, &asset).transfer(&env.current_contract_address(), &vault, &amount);
        }
        Ok(())
    }

    fn require_vault(env: &Env) -> Result<Address, VaultError> {
        let vault = Self::vault_address(env)?;
        vault.require_auth();
        Ok(vault)
    }

    fn require_controller(env: &Env) -> Result<(), VaultError> {
        Self::controller(env.clone())?.require_auth();
        Ok(())
    }

    fn require_active(env: &Env) -> Result<(), VaultError> {
        if Self::is_retired(env.clone()) {
            return Err(VaultError::StrategyRetired);
        }
        Ok(())
    }

    #[inline]
    fn bump(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
    }
}

#[contractimpl]
impl StrategyInterface for LinearYieldStrategy {
    fn name(env: Env) -> String {
        env.storage()
            .instance()
            .get(&DataKey::Name)
            .unwrap_or_else(|| panic_with_error!(&env, VaultError::NotInitialized))
    }

    fn vault(env: Env) -> Address {
        Self::vault_address(&env).unwrap_or_else(|e| panic_with_error!(&env, e))
    }

    fn balance_of(env: Env) -> i128 {
        let position = match Self::load_position(&env) {
            Ok(position) => position,
            Err(_) => return 0,
        };
        let projected = position
            .projected_yield(Self::annual_rate_bps(env.clone()), env.ledger().timestamp())
            .and_then(|earned| checked_add(position.total()?, earned));
        projected.unwrap_or_else(|e| panic_with_error!(&env, e))
    }

    fn deposit(env: Env, amount: i128) -> Result<(), VaultError> {
        let vault = Self::require_vault(&env)?;
        if amount <= 0 {
            return Err(VaultError::InvalidAmount);
        }
        Self::require_active(&env)?;

        let mut position = Self::accrue(&env)?;
        let this = env.current_contract_address();
        let asset = Self::asset(env.clone())?;
        token::Client::new(&env, &asset).transfer_from(&this, &vault, &this, &amount);

        position.principal = checked_add(position.principal, amount)?;
        Self::store_position(&env, &position);

        env.events().publish(
            (symbol_short!("deposit"),),
            StrategyDepositEvent { amount, principal: position.principal },
        );
        Ok(())
    }

    fn withdraw(env: Env, amount: i128) -> Result<i128, VaultError> {
        Self::require_vault(&env)?;
        if amount <= 0 {
            return Err(VaultError::InvalidAmount);
        }

        let mut position = Self::accrue(&env)?;
        let returned = Self::release(&env, &mut position, amount)?;
        Self::store_position(&env, &position);
        Self::send_to_vault(&env, returned)?;

        if returned < amount {
            log!(&env, "withdraw short: requested {}, returned {}", amount, returned);
        }
        env.events().publish(
            (symbol_short!("withdraw"),),
            StrategyWithdrawEvent { requested: amount, returned },
        );
        Ok(returned)
    }

    fn withdraw_all(env: Env) -> Result<i128, VaultError> {
        Self::require_vault(&env)?;

        let mut position = Self::accrue(&env)?;
        let requested = position.total()?;
        let returned = Self::release(&env, &mut position, requested)?;
        Self::store_position(&env, &position);
        Self::send_to_vault(&env, returned)?;

        env.events().publish(
            (symbol_short!("withdraw"),),
            StrategyWithdrawEvent { requested, returned },
        );
        Ok(returned)
    }

    fn harvest(env: Env) -> Result<i128, VaultError> {
        Self::require_controller(&env)?;

        let mut position = Self::accrue(&env)?;
        let reserve = checked_sub(Self::token_balance(&env)?, position.principal)?.max(0);
        let harvested = position.pending_yield.min(reserve).max(0);
        position.pending_yield = checked_sub(position.pending_yield, harvested)?;
        Self::store_position(&env, &position);
        Self::send_to_vault(&env, harvested)?;

        env.events().publish(
            (symbol_short!("harvest"),),
            StrategyHarvestEvent { harvested, pending_yield: position.pending_yield },
        );
        Ok(harvested)
    }

    fn migrate(env: Env, new_strategy: Address) -> Result<(), VaultError> {
        Self::require_controller(&env)?;
        let this = env.current_contract_address();
        if new_strategy == this {
            return Err(VaultError::InvalidAddress);
        }
        let successor = StrategyClient::new(&env, &new_strategy);
        if successor.vault() != Self::vault_address(&env)? {
            return Err(VaultError::StrategyMismatch);
        }

        let position = Self::accrue(&env)?;
        let asset = Self::asset(env.clone())?;
        let token = token::Client::new(&env, &asset);
        let amount = position.total()?.min(token.balance(&this)).max(0);

        if amount > 0 {
            let expiration = env.ledger().sequence() + APPROVAL_LEDGERS;
            token.approve(&this, &new_strategy, &amount, &expiration);
            successor.accept_migration(&this, &amount);
        }

        let surplus = token.balance(&this);
        if surplus > 0 {
            token.transfer(&this, &new_strategy, &surplus);
        }

        Self::store_position(
            &env,
            &Position { principal: 0, pending_yield: 0, last_accrual: env.ledger().timestamp() },
        );
        env.storage().instance().set(&DataKey::Retired, &true);

        env.events().publish(
            (symbol_short!("migrate"),),
            MigrationEvent { new_strategy, amount, surplus },
        );
        Ok(())
    }

    fn accept_migration(env: Env, from: Address, amount: i128) -> Result<(), VaultError> {
        from.require_auth();
        if amount <= 0 {
            return Err(VaultError::InvalidAmount);
        }
        Self::require_active(&env)?;

        let mut position = Self::accrue(&env)?;
        let this = env.current_contract_address();
        let asset = Self::asset(env.clone())?;
        token::Client::new(&env, &asset).transfer_from(&this, &from, &this, &amount);

        position.principal = checked_add(position.principal, amount)?;
        Self::store_position(&env, &position);

        env.events().publish(
            (symbol_short!("mig_in"),),
            MigrationReceivedEvent { from, amount },
        );
        Ok(())
    }
}
