//! Role store shared by the vault and the controller.
//!
//! Each contract keeps its own assignments in persistent storage under
//! [`AccessKey::Role`]. A gated entry point takes the caller's address,
//! requires its authorization and then checks the assignment, so the policy
//! is a plain `(caller, role) -> bool` lookup composed into the contract.

use soroban_sdk::{contracttype, symbol_short, Address, Env};

use crate::VaultError;

pub(crate) const DAY_IN_LEDGERS: u32 = 17_280;
pub(crate) const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub(crate) const PERSISTENT_LIFETIME_THRESHOLD: u32 = PERSISTENT_BUMP_AMOUNT - DAY_IN_LEDGERS;

/// Named capabilities gating administrative and keeper entry points.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Role {
    /// Grants and revokes every role
    Admin = 0,
    /// Fees, treasury, pause, emergency shutdown, strategy migration
    Governance = 1,
    /// Strategy registration on the controller
    Strategist = 2,
    /// Harvest
    Keeper = 3,
}

#[contracttype]
pub enum AccessKey {
    Role(Role, Address),
}

/// Emitted when a role is granted or revoked.
///
/// # Topics
/// - `SymbolShort("role_gr")` / `SymbolShort("role_rv")`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleChangedEvent {
    pub role: Role,
    pub account: Address,
    pub sender: Address,
}

pub fn has_role(env: &Env, role: Role, account: &Address) -> bool {
    let key = AccessKey::Role(role, account.clone());
    let granted = env.storage().persistent().get(&key).unwrap_or(false);
    if granted {
        env.storage().persistent().extend_ttl(
            &key,
            PERSISTENT_LIFETIME_THRESHOLD,
            PERSISTENT_BUMP_AMOUNT,
        );
    }
    granted
}

/// Requires `caller` to have authorized the invocation and to hold `role`.
pub fn require_role(env: &Env, caller: &Address, role: Role) -> Result<(), VaultError> {
    caller.require_auth();
    if !has_role(env, role, caller) {
        return Err(VaultError::Unauthorized);
    }
    Ok(())
}

/// Unchecked assignment used during initialization.
pub fn set_role(env: &Env, role: Role, account: &Address) {
    let key = AccessKey::Role(role, account.clone());
    env.storage().persistent().set(&key, &true);
    env.storage().persistent().extend_ttl(
        &key,
        PERSISTENT_LIFETIME_THRESHOLD,
        PERSISTENT_BUMP_AMOUNT,
    );
}

pub fn grant_role(
    env: &Env,
    caller: &Address,
    role: Role,
    account: &Address,
) -> Result<(), VaultError> {
    require_role(env, caller, Role::Admin)?;
    set_role(env, role, account);

    env.events().publish(
        (symbol_short!("role_gr"),),
        RoleChangedEvent { role, account: account.clone(), sender: caller.clone() },
    );
    Ok(())
}

pub fn revoke_role(
    env: &Env,
    caller: &Address,
    role: Role,
    account: &Address,
) -> Result<(), VaultError> {
    require_role(env, caller, Role::Admin)?;
    env.storage()
        .persistent()
        .remove(&AccessKey::Role(role, account.clone()));

    env.events().publish(
        (symbol_short!("role_rv"),),
        RoleChangedEvent { role, account: account.clone(), sender: caller.clone() },
    );
    Ok(())
}
