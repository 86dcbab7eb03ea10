//! Non-reentrant guard for operations that call out to the token or a
//! strategy before their own bookkeeping is final.
//!
//! The flag lives in instance storage. A failed invocation rolls back every
//! write, so an `Err` returned after [`enter`] also clears the flag.

use soroban_sdk::{contracttype, Env};

use crate::VaultError;

#[contracttype]
pub enum GuardKey {
    Entered,
}

pub fn enter(env: &Env) -> Result<(), VaultError> {
    let entered: bool = env
        .storage()
        .instance()
        .get(&GuardKey::Entered)
        .unwrap_or(false);
    if entered {
        return Err(VaultError::Reentrancy);
    }
    env.storage().instance().set(&GuardKey::Entered, &true);
    Ok(())
}

pub fn exit(env: &Env) {
    env.storage().instance().remove(&GuardKey::Entered);
}

#[cfg(test)]
pub fn is_entered(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&GuardKey::Entered)
        .unwrap_or(false)
}
