//! # Vault Controller
//!
//! Registry and authorization gateway between vaults and their strategies.
//!
//! Each vault has at most one active strategy. The controller records that
//! mapping, gates who may change it, and is the only party a strategy accepts
//! `harvest` and `migrate` calls from.
//!
//! ```text
//! Strategist ──set_strategy──►  ┌────────────┐
//! Keeper ─────harvest────────►  │ Controller │ ──harvest / migrate──► Strategy
//! Governance ─migrate_strategy► └────────────┘
//!                                     ▲
//!                     get_strategy    │   harvest (vault holds Keeper)
//!                                   Vault
//! ```
//!
//! ## Roles
//! - `Admin`: grants and revokes roles
//! - `Strategist`: registers or clears a vault's strategy
//! - `Keeper`: harvests; the vault itself needs this role to harvest through
//!   the controller
//! - `Governance`: migrates a vault's position to a new strategy

#![no_std]

use share_vault_common::{
    access::{self, Role},
    reentrancy, ControllerInterface, StrategyClient, VaultError, INSTANCE_BUMP_AMOUNT,
    INSTANCE_LIFETIME_THRESHOLD,
};
use soroban_sdk::{contract, contractimpl, contracttype, symbol_short, Address, Env};


// ============================================================================
// STORAGE KEYS
// ============================================================================

#[contracttype]
pub enum DataKey {
    /// Set on initialization
    Initialized,
    /// Active strategy for a vault (persistent storage)
    StrategyOf(Address),
}


// ============================================================================
// EVENTS
// ============================================================================

/// Emitted when a strategist registers, replaces or clears a strategy.
///
/// # Topics
/// - `SymbolShort("strat_set")`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StrategySetEvent {
    pub vault: Address,
    pub old_strategy: Option<Address>,
    pub new_strategy: Option<Address>,
}

/// # Topics
/// - `SymbolShort("harvest")`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HarvestEvent {
    pub vault: Address,
    pub strategy: Address,
    pub amount: i128,
}

/// # Topics
/// - `SymbolShort("migrated")`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StrategyMigratedEvent {
    pub vault: Address,
    pub old_strategy: Address,
    pub new_strategy: Address,
}


// ============================================================================
// CONTRACT
// ============================================================================

#[contract]
pub struct VaultController;

#[contractimpl]
impl VaultController {

    /// Initializes the controller and hands every role to `admin`.
    ///
    /// # Errors
    /// - `AlreadyInitialized` on a second call
    pub fn initialize(env: Env, admin: Address) -> Result<(), VaultError> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(VaultError::AlreadyInitialized);
        }

        env.storage().instance().set(&DataKey::Initialized, &true);
        for role in [Role::Admin, Role::Governance, Role::Strategist, Role::Keeper] {
            access::set_role(&env, role, &admin);
        }
        Self::bump(&env);
        Ok(())
    }

    /// Registers `strategy` as the active strategy for `vault`, or clears the
    /// entry when `strategy` is `None`.
    ///
    /// Replacing a strategy this way does not move funds; use
    /// [`VaultController::migrate_strategy`] for a strategy holding capital.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` lacks the strategist role
    /// - `StrategyMismatch` if the strategy reports a different vault
    pub fn set_strategy(
        env: Env,
        caller: Address,
        vault: Address,
        strategy: Option<Address>,
    ) -> Result<(), VaultError> {
        access::require_role(&env, &caller, Role::Strategist)?;

        if let Some(strategy) = &strategy {
            if StrategyClient::new(&env, strategy).vault() != vault {
                return Err(VaultError::StrategyMismatch);
            }
        }

        let old_strategy = Self::strategy_of(&env, &vault);
        let key = DataKey::StrategyOf(vault.clone());
        match &strategy {
            Some(strategy) => Self::store_strategy(&env, &vault, strategy),
            None => env.storage().persistent().remove(&key),
        }
        Self::bump(&env);

        env.events().publish(
            (symbol_short!("strat_set"),),
            StrategySetEvent { vault, old_strategy, new_strategy: strategy },
        );
        Ok(())
    }

    /// Moves the vault's entire position from its current strategy to
    /// `new_strategy` and repoints the registry.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` lacks the governance role
    /// - `StrategyMismatch` if `new_strategy` reports a different vault
    /// - `NoExistingStrategy` if the vault has no strategy to migrate from
    /// - `Reentrancy` on nested entry
    pub fn migrate_strategy(
        env: Env,
        caller: Address,
        vault: Address,
        new_strategy: Address,
    ) -> Result<(), VaultError> {
        access::require_role(&env, &caller, Role::Governance)?;

        if StrategyClient::new(&env, &new_strategy).vault() != vault {
            return Err(VaultError::StrategyMismatch);
        }
        let old_strategy =
            Self::strategy_of(&env, &vault).ok_or(VaultError::NoExistingStrategy)?;

        reentrancy::enter(&env)?;
        StrategyClient::new(&env, &old_strategy).migrate(&new_strategy);
        Self::store_strategy(&env, &vault, &new_strategy);
        reentrancy::exit(&env);
        Self::bump(&env);

        env.events().publish(
            (symbol_short!("migrated"),),
            StrategyMigratedEvent { vault, old_strategy, new_strategy },
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

    pub fn has_role(env: Env, role: Role, account: Address) -> bool {
        access::has_role(&env, role, &account)
    }

    // ==========================================================================
    // INTERNAL HELPERS
    // ==========================================================================

    fn strategy_of(env: &Env, vault: &Address) -> Option<Address> {
        env.storage()
            .persistent()
            .get(&DataKey::StrategyOf(vault.clone()))
    }

    fn store_strategy(env: &Env, vault: &Address, strategy: &Address) {
        let key = DataKey::StrategyOf(vault.clone());
        env.storage().persistent().set(&key, strategy);
        env.storage().persistent().extend_ttl(
            &key,
            share_vault_common::BALANCE_LIFETIME_THRESHOLD,
            share_vault_common::BALANCE_BUMP_AMOUNT,
        );
    }

    #[inline]
    fn bump(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
    }
}

#[contractimpl]
impl ControllerInterface for VaultController {
    fn get_strategy(env: Env, vault: Address) -> Option<Address> {
        Self::strategy_of(&env, &vault)
    }

    /// Harvests the strategy registered for `vault` and returns what it sent
    /// to the vault.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` lacks the keeper role
    /// - `NoStrategy` if the vault has no strategy
    /// - `Reentrancy` on nested entry
    fn harvest(env: Env, caller: Address, vault: Address) -> Result<i128, VaultError> {
        access::require_role(&env, &caller, Role::Keeper)?;
        let strategy = Self::strategy_of(&env, &vault).ok_or(VaultError::NoStrategy)?;

        reentrancy::enter(&env)?;
        let amount = StrategyClient::new(&env, &strategy).harvest();
        reentrancy::exit(&env);
        Self::bump(&env);

        env.events().publish(
            (symbol_short!("harvest"),),
            HarvestEvent { vault, strategy, amount },
        );
        Ok(amount)
    }
}
