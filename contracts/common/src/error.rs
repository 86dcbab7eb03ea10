use soroban_sdk::contracterror;

/// Error codes shared by the vault, controller and strategy contracts.
///
/// Codes are part of the public ABI: clients match on the numeric value, so
/// existing variants must never be renumbered.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum VaultError {
    /// `initialize` was called on a contract that is already configured
    AlreadyInitialized = 1,
    /// A call reached a contract before `initialize`
    NotInitialized = 2,
    /// Zero or negative amount, or an amount that would mint zero shares
    InvalidAmount = 3,
    /// An address that would strand funds (asset, controller, treasury, recipient)
    InvalidAddress = 4,
    /// Withdrawal asks for more shares than the caller holds
    InsufficientShares = 5,
    /// Withdrawal output fell below the caller's `min_amount_out`
    InsufficientOutput = 6,
    /// Deposit attempted after emergency shutdown
    EmergencyShutdownActive = 7,
    /// Deposit or withdraw attempted while paused, or pause while paused
    Paused = 8,
    /// Unpause attempted while not paused
    NotPaused = 9,
    /// Caller lacks the role the entry point requires
    Unauthorized = 10,
    /// Operation needs a registered strategy and none exists
    NoStrategy = 11,
    /// Strategy reports a different vault than the one it is registered for
    StrategyMismatch = 12,
    /// Migration attempted with no strategy to migrate from
    NoExistingStrategy = 13,
    /// Fee above its cap
    FeeTooHigh = 14,
    /// Nested entry into a guarded operation
    Reentrancy = 15,
    /// Checked arithmetic overflowed or divided by zero
    ArithmeticError = 16,
    /// Strategy has migrated its position away and accepts no new funds
    StrategyRetired = 17,
}
