//! Cross-contract interfaces.
//!
//! The vault only ever talks to a strategy and to the controller through these
//! traits, so any contract implementing [`StrategyInterface`] can be registered
//! for a vault at runtime.

use soroban_sdk::{contractclient, Address, Env, String};

use crate::VaultError;

/// Capability a yield strategy exposes to its vault and controller.
#[contractclient(name = "StrategyClient")]
pub trait StrategyInterface {
    /// Human-readable strategy name.
    fn name(env: Env) -> String;

    /// The vault this strategy works for. Fixed at initialization.
    fn vault(env: Env) -> Address;

    /// Assets currently managed, including yield accrued up to now.
    /// Must not mutate state.
    fn balance_of(env: Env) -> i128;

    /// Pulls `amount` of the asset from the vault. The vault approves the
    /// strategy beforehand; only the vault may call.
    fn deposit(env: Env, amount: i128) -> Result<(), VaultError>;

    /// Returns up to `amount` to the vault; may return less when the
    /// strategy holds less. Only the vault may call.
    fn withdraw(env: Env, amount: i128) -> Result<i128, VaultError>;

    /// Returns everything withdrawable to the vault. Only the vault may call.
    fn withdraw_all(env: Env) -> Result<i128, VaultError>;

    /// Realizes accrued yield and sends it to the vault. Only the strategy's
    /// owner (the controller) may call.
    fn harvest(env: Env) -> Result<i128, VaultError>;

    /// Drains the full position into `new_strategy`. Only the strategy's
    /// owner (the controller) may call.
    fn migrate(env: Env, new_strategy: Address) -> Result<(), VaultError>;

    /// Successor side of [`StrategyInterface::migrate`]: pulls `amount` from
    /// `from`, which must have approved it, and books it as principal.
    fn accept_migration(env: Env, from: Address, amount: i128) -> Result<(), VaultError>;
}

/// What the vault needs from the controller.
#[contractclient(name = "ControllerClient")]
pub trait ControllerInterface {
    /// Active strategy for `vault`, if any.
    fn get_strategy(env: Env, vault: Address) -> Option<Address>;

    /// Harvests the strategy registered for `vault`. `caller` must hold the
    /// keeper role on the controller.
    fn harvest(env: Env, caller: Address, vault: Address) -> Result<i128, VaultError>;
}
