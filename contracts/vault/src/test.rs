#![cfg(test)]

use super::*;
use share_vault_controller::{VaultController, VaultControllerClient};
use share_vault_strategy::{LinearYieldStrategy, LinearYieldStrategyClient};
use soroban_sdk::{
    testutils::{Address as _, Events, Ledger},
    token::{self, StellarAssetClient},
    Address, Env, IntoVal, String, Symbol, TryFromVal, Val, Vec,
};

const UNIT: i128 = 10_000_000;
const START: u64 = 1_700_000_000;
const YEAR: u64 = 31_536_000;

struct Setup<'a> {
    vault: ShareVaultClient<'a>,
    controller: VaultControllerClient<'a>,
    strategy: LinearYieldStrategyClient<'a>,
    token: token::Client<'a>,
    asset_admin: StellarAssetClient<'a>,
    admin: Address,
    treasury: Address,
}

fn set_time(env: &Env, timestamp: u64) {
    env.ledger().with_mut(|li| li.timestamp = timestamp);
}

fn setup(env: &Env) -> Setup<'_> {
    setup_with_fees(env, 0, 0, 0)
}

/// Asset, controller, vault and a 5% linear strategy, wired the way a
/// deployment wires them: the vault holds `Keeper` on the controller and the
/// strategy is registered for the vault.
fn setup_with_fees(
    env: &Env,
    performance_fee_bps: u32,
    management_fee_bps: u32,
    withdrawal_fee_bps: u32,
) -> Setup<'_> {
    env.mock_all_auths();
    set_time(env, START);

    let token_admin = Address::generate(env);
    let asset = env.register_stellar_asset_contract_v2(token_admin).address();
    let admin = Address::generate(env);
    let treasury = Address::generate(env);

    let controller_id = env.register_contract(None, VaultController);
    let controller = VaultControllerClient::new(env, &controller_id);
    controller.initialize(&admin);

    let vault_id = env.register_contract(None, ShareVault);
    let vault = ShareVaultClient::new(env, &vault_id);
    vault.initialize(
        &asset,
        &controller_id,
        &performance_fee_bps,
        &management_fee_bps,
        &withdrawal_fee_bps,
        &treasury,
        &admin,
    );
    controller.grant_role(&admin, &Role::Keeper, &vault_id);

    let strategy = new_strategy(env, &vault_id, &controller_id, &asset);
    controller.set_strategy(&admin, &vault_id, &Some(strategy.address.clone()));

    Setup {
        vault,
        controller,
        strategy,
        token: token::Client::new(env, &asset),
        asset_admin: StellarAssetClient::new(env, &asset),
        admin,
        treasury,
    }
}

fn new_strategy<'a>(
    env: &Env,
    vault: &Address,
    controller: &Address,
    asset: &Address,
) -> LinearYieldStrategyClient<'a> {
    let contract_id = env.register_contract(None, LinearYieldStrategy);
    let strategy = LinearYieldStrategyClient::new(env, &contract_id);
    strategy.initialize(
        vault,
        controller,
        asset,
        &String::from_str(env, "Linear Yield"),
        &500,
    );
    strategy
}

/// Mints `amount` to a fresh depositor.
fn new_depositor(env: &Env, s: &Setup, amount: i128) -> Address {
    let user = Address::generate(env);
    s.asset_admin.mint(&user, &amount);
    user
}

/// Tops up the strategy's reward reserve so harvests can pay out.
fn fund_rewards(env: &Env, s: &Setup, amount: i128) {
    let sponsor = Address::generate(env);
    s.asset_admin.mint(&sponsor, &amount);
    s.strategy.fund_rewards(&sponsor, &amount);
}

fn published(env: &Env, contract: &Address, name: Symbol) -> Option<Val> {
    let topics: Vec<Val> = (name,).into_val(env);
    env.events()
        .all()
        .iter()
        .filter(|(emitter, event_topics, _)| emitter == contract && event_topics == &topics)
        .last()
        .map(|(_, _, data)| data)
}

fn last_event<T: TryFromVal<Env, Val>>(env: &Env, contract: &Address, name: Symbol) -> T {
    let data = published(env, contract, name).expect("event not published");
    T::try_from_val(env, &data).unwrap()
}


// ============================================================================
// INITIALIZATION
// ============================================================================

#[test]
fn test_initialize_records_configuration() {
    let env = Env::default();
    let s = setup_with_fees(&env, 1_000, 200, 50);

    assert_eq!(s.vault.asset(), s.token.address);
    assert_eq!(s.vault.controller(), s.controller.address);
    assert_eq!(s.vault.strategy(), Some(s.strategy.address.clone()));
    assert_eq!(s.vault.treasury(), s.treasury);
    assert_eq!(
        s.vault.fees(),
        FeeConfig {
            performance_fee_bps: 1_000,
            management_fee_bps: 200,
            withdrawal_fee_bps: 50,
        }
    );
    assert_eq!(s.vault.total_supply(), 0);
    assert_eq!(s.vault.total_assets(), 0);
    assert_eq!(s.vault.price_per_share(), SCALE);
    assert_eq!(s.vault.last_harvest_timestamp(), START);
    assert_eq!(s.vault.last_recorded_total_assets(), 0);
    assert!(!s.vault.is_paused());
    assert!(!s.vault.is_shutdown());
    assert_eq!(s.vault.get_version(), 1);

    for role in [Role::Admin, Role::Governance, Role::Keeper] {
        assert!(s.vault.has_role(&role, &s.admin));
    }
    assert!(!s.vault.has_role(&Role::Strategist, &s.admin));
}

#[test]
fn test_initialize_twice_fails() {
    let env = Env::default();
    let s = setup(&env);

    let result = s.vault.try_initialize(
        &s.token.address,
        &s.controller.address,
        &0,
        &0,
        &0,
        &s.treasury,
        &s.admin,
    );
    assert_eq!(result, Err(Ok(VaultError::AlreadyInitialized)));
}

#[test]
fn test_initialize_validates_fees_and_addresses() {
    let env = Env::default();
    env.mock_all_auths();

    let asset = Address::generate(&env);
    let controller = Address::generate(&env);
    let treasury = Address::generate(&env);
    let admin = Address::generate(&env);
    let vault_id = env.register_contract(None, ShareVault);
    let vault = ShareVaultClient::new(&env, &vault_id);

    assert_eq!(
        vault.try_initialize(&asset, &controller, &5_001, &0, &0, &treasury, &admin),
        Err(Ok(VaultError::FeeTooHigh))
    );
    assert_eq!(
        vault.try_initialize(&asset, &controller, &0, &1_001, &0, &treasury, &admin),
        Err(Ok(VaultError::FeeTooHigh))
    );
    assert_eq!(
        vault.try_initialize(&asset, &controller, &0, &0, &1_001, &treasury, &admin),
        Err(Ok(VaultError::FeeTooHigh))
    );
    assert_eq!(
        vault.try_initialize(&asset, &controller, &0, &0, &0, &vault_id, &admin),
        Err(Ok(VaultError::InvalidAddress))
    );
    assert_eq!(
        vault.try_initialize(&asset, &controller, &0, &0, &0, &treasury, &vault_id),
        Err(Ok(VaultError::InvalidAddress))
    );
    assert!(!vault.has_role(&Role::Admin, &vault_id));
    assert_eq!(
        vault.try_initialize(&asset, &asset, &0, &0, &0, &treasury, &admin),
        Err(Ok(VaultError::InvalidAddress))
    );

    vault.initialize(&asset, &controller, &5_000, &1_000, &1_000, &treasury, &admin);
    let event: VaultInitializedEvent = last_event(&env, &vault_id, symbol_short!("init"));
    assert_eq!(event.asset, asset);
    assert_eq!(event.admin, admin);
    assert_eq!(event.fees.performance_fee_bps, 5_000);
}


// ============================================================================
// DEPOSIT
// ============================================================================

#[test]
fn test_first_deposit_mints_one_to_one() {
    let env = Env::default();
    let s = setup(&env);
    let user = new_depositor(&env, &s, 1_000 * UNIT);

    let shares = s.vault.deposit(&user, &(1_000 * UNIT), &None);

    assert_eq!(shares, 1_000 * UNIT);
    assert_eq!(s.vault.balance_of(&user), 1_000 * UNIT);
    assert_eq!(s.vault.total_supply(), 1_000 * UNIT);
    assert_eq!(s.vault.total_assets(), 1_000 * UNIT);
    assert_eq!(s.vault.price_per_share(), SCALE);

    // Everything is forwarded to the strategy.
    assert_eq!(s.vault.idle_balance(), 0);
    assert_eq!(s.strategy.balance_of(), 1_000 * UNIT);
    assert_eq!(s.token.balance(&user), 0);

    let event: DepositEvent = last_event(&env, &s.vault.address, symbol_short!("deposit"));
    assert_eq!(event.caller, user);
    assert_eq!(event.recipient, user);
    assert_eq!(event.amount, 1_000 * UNIT);
    assert_eq!(event.shares, 1_000 * UNIT);
    assert_eq!(event.total_assets, 1_000 * UNIT);
}

#[test]
fn test_equal_deposits_at_same_price_mint_equal_shares() {
    let env = Env::default();
    let s = setup(&env);
    let alice = new_depositor(&env, &s, 1_000 * UNIT);
    let bob = new_depositor(&env, &s, 1_000 * UNIT);

    let alice_shares = s.vault.deposit(&alice, &(1_000 * UNIT), &None);
    let bob_shares = s.vault.deposit(&bob, &(1_000 * UNIT), &None);

    assert_eq!(alice_shares, bob_shares);
    assert_eq!(s.vault.total_supply(), 2_000 * UNIT);
    assert_eq!(s.vault.total_assets(), 2_000 * UNIT);
}

#[test]
fn test_deposits_without_yield_keep_unit_price() {
    let env = Env::default();
    let s = setup(&env);
    let small = new_depositor(&env, &s, 1_000 * UNIT);
    let large = new_depositor(&env, &s, 1_001 * UNIT);
    let third = new_depositor(&env, &s, 7 * UNIT + 3);

    let small_shares = s.vault.deposit(&small, &(1_000 * UNIT), &None);
    assert_eq!(s.vault.price_per_share(), SCALE);

    let large_shares = s.vault.deposit(&large, &(1_001 * UNIT), &None);
    assert_eq!(s.vault.price_per_share(), SCALE);
    assert!(large_shares > small_shares);

    s.vault.deposit(&third, &(7 * UNIT + 3), &None);
    assert_eq!(s.vault.price_per_share(), SCALE);
    assert_eq!(s.vault.total_supply(), s.vault.total_assets());
    assert_eq!(s.vault.balance_of(&third), 7 * UNIT + 3);
}

#[test]
fn test_deposit_prices_on_assets_before_deposit() {
    let env = Env::default();
    let s = setup(&env);
    let alice = new_depositor(&env, &s, 1_000 * UNIT);
    let bob = new_depositor(&env, &s, 1_050 * UNIT);

    s.vault.deposit(&alice, &(1_000 * UNIT), &None);

    // A year of 5% yield is projected into total assets before any harvest.
    set_time(&env, START + YEAR);
    assert_eq!(s.vault.total_assets(), 1_050 * UNIT);
    assert_eq!(s.vault.convert_to_shares(&(1_050 * UNIT)), 1_000 * UNIT);

    let bob_shares = s.vault.deposit(&bob, &(1_050 * UNIT), &None);

    assert_eq!(bob_shares, 1_000 * UNIT);
    assert_eq!(s.vault.total_assets(), 2_100 * UNIT);
    assert_eq!(s.vault.convert_to_assets(&(1_000 * UNIT)), 1_050 * UNIT);
}

#[test]
fn test_deposit_credits_recipient() {
    let env = Env::default();
    let s = setup(&env);
    let payer = new_depositor(&env, &s, 500 * UNIT);
    let beneficiary = Address::generate(&env);

    s.vault.deposit(&payer, &(500 * UNIT), &Some(beneficiary.clone()));

    assert_eq!(s.vault.balance_of(&payer), 0);
    assert_eq!(s.vault.balance_of(&beneficiary), 500 * UNIT);
    assert_eq!(s.token.balance(&payer), 0);
}

#[test]
fn test_deposit_rejects_invalid_input() {
    let env = Env::default();
    let s = setup(&env);
    let user = new_depositor(&env, &s, 100 * UNIT);

    assert_eq!(
        s.vault.try_deposit(&user, &0, &None),
        Err(Ok(VaultError::InvalidAmount))
    );
    assert_eq!(
        s.vault.try_deposit(&user, &-1, &None),
        Err(Ok(VaultError::InvalidAmount))
    );
    assert_eq!(
        s.vault.try_deposit(&user, &(100 * UNIT), &Some(s.vault.address.clone())),
        Err(Ok(VaultError::InvalidAddress))
    );
    assert_eq!(s.token.balance(&user), 100 * UNIT);
    assert_eq!(s.vault.total_supply(), 0);
}

#[test]
fn test_deposit_without_strategy_stays_idle() {
    let env = Env::default();
    let s = setup(&env);
    s.controller.set_strategy(&s.admin, &s.vault.address, &None);
    let user = new_depositor(&env, &s, 300 * UNIT);

    s.vault.deposit(&user, &(300 * UNIT), &None);

    assert_eq!(s.vault.strategy(), None);
    assert_eq!(s.vault.idle_balance(), 300 * UNIT);
    assert_eq!(s.vault.total_assets(), 300 * UNIT);
    assert_eq!(s.vault.withdraw(&user, &(300 * UNIT), &None), 300 * UNIT);
}


// ============================================================================
// WITHDRAW
// ============================================================================

#[test]
fn test_withdraw_round_trip_without_fee() {
    let env = Env::default();
    let s = setup(&env);
    let user = new_depositor(&env, &s, 1_000 * UNIT);
    let shares = s.vault.deposit(&user, &(1_000 * UNIT), &None);

    let paid = s.vault.withdraw(&user, &shares, &None);

    assert_eq!(paid, 1_000 * UNIT);
    assert_eq!(s.token.balance(&user), 1_000 * UNIT);
    assert_eq!(s.vault.balance_of(&user), 0);
    assert_eq!(s.vault.total_supply(), 0);
    assert_eq!(s.strategy.balance_of(), 0);
    assert_eq!(s.vault.price_per_share(), SCALE);
}

#[test]
fn test_withdraw_round_trip_with_fee() {
    let env = Env::default();
    let s = setup_with_fees(&env, 0, 0, 100);
    let user = new_depositor(&env, &s, 1_000 * UNIT);
    let shares = s.vault.deposit(&user, &(1_000 * UNIT), &None);

    let paid = s.vault.withdraw(&user, &shares, &None);

    assert_eq!(paid, 990 * UNIT);
    assert_eq!(s.token.balance(&user), 990 * UNIT);
    assert_eq!(s.token.balance(&s.treasury), 10 * UNIT);

    let event: WithdrawEvent = last_event(&env, &s.vault.address, symbol_short!("withdraw"));
    assert_eq!(event.caller, user);
    assert_eq!(event.shares, shares);
    assert_eq!(event.amount, 990 * UNIT);
    assert_eq!(event.fee, 10 * UNIT);
}

#[test]
fn test_partial_withdraw_uses_idle_first() {
    let env = Env::default();
    let s = setup(&env);
    s.controller.set_strategy(&s.admin, &s.vault.address, &None);
    let user = new_depositor(&env, &s, 1_000 * UNIT);
    s.vault.deposit(&user, &(400 * UNIT), &None);

    s.controller.set_strategy(&s.admin, &s.vault.address, &Some(s.strategy.address.clone()));
    s.vault.deposit(&user, &(600 * UNIT), &None);
    assert_eq!(s.vault.idle_balance(), 400 * UNIT);
    assert_eq!(s.strategy.balance_of(), 600 * UNIT);

    // 700 owed: 400 idle plus a 300 shortfall pulled from the strategy.
    assert_eq!(s.vault.withdraw(&user, &(700 * UNIT), &None), 700 * UNIT);
    assert_eq!(s.vault.idle_balance(), 0);
    assert_eq!(s.strategy.balance_of(), 300 * UNIT);
    assert_eq!(s.vault.balance_of(&user), 300 * UNIT);
}

#[test]
fn test_withdraw_more_than_held_leaves_balances_unchanged() {
    let env = Env::default();
    let s = setup(&env);
    let user = new_depositor(&env, &s, 1_000 * UNIT);
    s.vault.deposit(&user, &(1_000 * UNIT), &None);

    assert_eq!(
        s.vault.try_withdraw(&user, &(1_000 * UNIT + 1), &None),
        Err(Ok(VaultError::InsufficientShares))
    );
    assert_eq!(
        s.vault.try_withdraw(&user, &0, &None),
        Err(Ok(VaultError::InvalidAmount))
    );

    let outsider = Address::generate(&env);
    assert_eq!(
        s.vault.try_withdraw(&outsider, &UNIT, &None),
        Err(Ok(VaultError::InsufficientShares))
    );

    assert_eq!(s.vault.balance_of(&user), 1_000 * UNIT);
    assert_eq!(s.vault.total_supply(), 1_000 * UNIT);
    assert_eq!(s.vault.total_assets(), 1_000 * UNIT);
    assert_eq!(s.token.balance(&user), 0);
}

#[test]
fn test_withdraw_enforces_min_amount_out() {
    let env = Env::default();
    let s = setup_with_fees(&env, 0, 0, 100);
    let user = new_depositor(&env, &s, 1_000 * UNIT);
    let shares = s.vault.deposit(&user, &(1_000 * UNIT), &None);

    assert_eq!(
        s.vault.try_withdraw(&user, &shares, &Some(1_000 * UNIT)),
        Err(Ok(VaultError::InsufficientOutput))
    );
    assert_eq!(s.vault.balance_of(&user), shares);
    assert_eq!(s.strategy.balance_of(), 1_000 * UNIT);

    assert_eq!(s.vault.withdraw(&user, &shares, &Some(990 * UNIT)), 990 * UNIT);
}


// ============================================================================
// HARVEST
// ============================================================================

#[test]
fn test_unprofitable_harvest_changes_nothing() {
    let env = Env::default();
    let s = setup_with_fees(&env, 1_000, 200, 0);
    let user = new_depositor(&env, &s, 1_000 * UNIT);
    s.vault.deposit(&user, &(1_000 * UNIT), &None);

    // No reward reserve: the strategy has nothing to pay out.
    set_time(&env, START + YEAR);
    assert_eq!(s.vault.harvest(&s.admin), 0);
    assert!(published(&env, &s.vault.address, symbol_short!("harvest")).is_none());

    assert_eq!(s.token.balance(&s.treasury), 0);
    assert_eq!(s.vault.idle_balance(), 0);
    assert_eq!(s.vault.last_harvest_timestamp(), START);
    assert_eq!(s.vault.last_recorded_total_assets(), 0);
    assert_eq!(s.vault.total_supply(), 1_000 * UNIT);
}

#[test]
fn test_profitable_harvest_takes_fees_and_reinvests() {
    let env = Env::default();
    let s = setup_with_fees(&env, 1_000, 200, 0);
    let user = new_depositor(&env, &s, 1_000 * UNIT);
    s.vault.deposit(&user, &(1_000 * UNIT), &None);
    fund_rewards(&env, &s, 100 * UNIT);
    let price_at_deposit = s.vault.price_per_share();

    set_time(&env, START + YEAR);
    assert_eq!(s.vault.harvest(&s.admin), 50 * UNIT);

    // Performance: 10% of 50. Management: 2% of the 1_045 left after it.
    let performance_fee = 5 * UNIT;
    let management_fee = 209_000_000;
    let reinvested = 241_000_000;
    let total_assets = 1_000 * UNIT + reinvested;

    let event: HarvestEvent = last_event(&env, &s.vault.address, symbol_short!("harvest"));
    assert_eq!(
        event,
        HarvestEvent {
            profit: 50 * UNIT,
            performance_fee,
            management_fee,
            reinvested,
            total_assets,
        }
    );

    assert_eq!(s.token.balance(&s.treasury), performance_fee + management_fee);
    assert_eq!(s.vault.idle_balance(), 0);
    assert_eq!(s.strategy.balance_of(), total_assets);
    assert_eq!(s.vault.total_assets(), total_assets);
    assert_eq!(s.vault.last_harvest_timestamp(), START + YEAR);
    assert_eq!(s.vault.last_recorded_total_assets(), total_assets);

    let price = s.vault.price_per_share();
    assert!(price > price_at_deposit);
    assert_eq!(price, 1_024_100_000_000_000_000);
}

#[test]
fn test_management_fee_shortfall_is_pulled_from_strategy() {
    let env = Env::default();
    let s = setup_with_fees(&env, 0, 1_000, 0);
    let user = new_depositor(&env, &s, 1_000 * UNIT);
    s.vault.deposit(&user, &(1_000 * UNIT), &None);
    fund_rewards(&env, &s, 100 * UNIT);

    // 10% of 1_050 is more than the 50 of profit sitting idle.
    set_time(&env, START + YEAR);
    assert_eq!(s.vault.harvest(&s.admin), 50 * UNIT);

    let event: HarvestEvent = last_event(&env, &s.vault.address, symbol_short!("harvest"));
    assert_eq!(event.performance_fee, 0);
    assert_eq!(event.management_fee, 105 * UNIT);
    assert_eq!(event.reinvested, 0);
    assert_eq!(event.total_assets, 945 * UNIT);

    assert_eq!(s.token.balance(&s.treasury), 105 * UNIT);
    assert_eq!(s.strategy.position().principal, 945 * UNIT);
    assert_eq!(s.vault.total_assets(), 945 * UNIT);
}

#[test]
fn test_second_harvest_accrues_management_fee_from_last_harvest() {
    let env = Env::default();
    let s = setup_with_fees(&env, 0, 100, 0);
    let user = new_depositor(&env, &s, 1_000 * UNIT);
    s.vault.deposit(&user, &(1_000 * UNIT), &None);
    fund_rewards(&env, &s, 200 * UNIT);

    set_time(&env, START + YEAR);
    s.vault.harvest(&s.admin);
    let first: HarvestEvent = last_event(&env, &s.vault.address, symbol_short!("harvest"));
    // 1% of 1_050 for a full year.
    assert_eq!(first.management_fee, 105_000_000);

    set_time(&env, START + YEAR + YEAR / 2);
    s.vault.harvest(&s.admin);
    let second: HarvestEvent = last_event(&env, &s.vault.address, symbol_short!("harvest"));
    // Half a year on the assets present at the second harvest.
    let assets = first.total_assets + second.profit;
    assert_eq!(second.management_fee, assets * 100 / 10_000 / 2);
    assert_eq!(s.vault.last_harvest_timestamp(), START + YEAR + YEAR / 2);
}

#[test]
fn test_harvest_requires_keeper_and_strategy() {
    let env = Env::default();
    let s = setup(&env);
    let keeper = Address::generate(&env);

    assert_eq!(s.vault.try_harvest(&keeper), Err(Ok(VaultError::Unauthorized)));

    s.vault.grant_role(&s.admin, &Role::Keeper, &keeper);
    assert_eq!(s.vault.harvest(&keeper), 0);

    s.controller.set_strategy(&s.admin, &s.vault.address, &None);
    assert_eq!(s.vault.try_harvest(&keeper), Err(Ok(VaultError::NoStrategy)));

    s.vault.revoke_role(&s.admin, &Role::Keeper, &keeper);
    assert!(!s.vault.has_role(&Role::Keeper, &keeper));
    assert_eq!(s.vault.try_harvest(&keeper), Err(Ok(VaultError::Unauthorized)));
}


// ============================================================================
// LIFECYCLE
// ============================================================================

#[test]
fn test_emergency_withdraw_blocks_deposits_but_not_withdrawals() {
    let env = Env::default();
    let s = setup(&env);
    let user = new_depositor(&env, &s, 1_500 * UNIT);
    let shares = s.vault.deposit(&user, &(1_000 * UNIT), &None);

    let outsider = Address::generate(&env);
    assert_eq!(
        s.vault.try_emergency_withdraw(&outsider),
        Err(Ok(VaultError::Unauthorized))
    );

    assert_eq!(s.vault.emergency_withdraw(&s.admin), 1_000 * UNIT);
    assert!(s.vault.is_shutdown());
    assert_eq!(s.vault.idle_balance(), 1_000 * UNIT);
    assert_eq!(s.strategy.balance_of(), 0);
    assert_eq!(s.vault.total_assets(), 1_000 * UNIT);

    let event: ShutdownEvent = last_event(&env, &s.vault.address, symbol_short!("shutdown"));
    assert_eq!(event.caller, s.admin);
    assert_eq!(event.recovered, 1_000 * UNIT);

    assert_eq!(
        s.vault.try_deposit(&user, &(500 * UNIT), &None),
        Err(Ok(VaultError::EmergencyShutdownActive))
    );
    assert_eq!(s.vault.withdraw(&user, &shares, &None), 1_000 * UNIT);
    assert_eq!(s.token.balance(&user), 1_500 * UNIT);
}

#[test]
fn test_pause_blocks_deposit_and_withdraw() {
    let env = Env::default();
    let s = setup(&env);
    let user = new_depositor(&env, &s, 1_000 * UNIT);
    s.vault.deposit(&user, &(500 * UNIT), &None);

    s.vault.pause(&s.admin);
    assert!(s.vault.is_paused());
    let event: PauseEvent = last_event(&env, &s.vault.address, symbol_short!("paused"));
    assert_eq!(event, PauseEvent { paused: true, caller: s.admin.clone() });

    assert_eq!(
        s.vault.try_deposit(&user, &(500 * UNIT), &None),
        Err(Ok(VaultError::Paused))
    );
    assert_eq!(
        s.vault.try_withdraw(&user, &(500 * UNIT), &None),
        Err(Ok(VaultError::Paused))
    );
    assert_eq!(s.vault.try_pause(&s.admin), Err(Ok(VaultError::Paused)));

    // Reads keep working while paused.
    assert_eq!(s.vault.total_assets(), 500 * UNIT);

    s.vault.unpause(&s.admin);
    assert!(!s.vault.is_paused());
    let event: PauseEvent = last_event(&env, &s.vault.address, symbol_short!("unpaused"));
    assert!(!event.paused);

    assert_eq!(s.vault.try_unpause(&s.admin), Err(Ok(VaultError::NotPaused)));
    assert_eq!(s.vault.deposit(&user, &(500 * UNIT), &None), 500 * UNIT);
    assert_eq!(s.vault.withdraw(&user, &(600 * UNIT), &None), 600 * UNIT);
}

/// Deposit, deposit, withdraw with an optional pause/unpause cycle in between,
/// returning the user's token balance, share balance, total assets and supply.
fn run_deposit_withdraw_cycle(with_pause: bool) -> (i128, i128, i128, i128) {
    let env = Env::default();
    let s = setup_with_fees(&env, 0, 0, 100);
    let user = new_depositor(&env, &s, 1_000 * UNIT);

    s.vault.deposit(&user, &(500 * UNIT), &None);
    if with_pause {
        s.vault.pause(&s.admin);
        s.vault.unpause(&s.admin);
    }
    s.vault.deposit(&user, &(500 * UNIT), &None);
    s.vault.withdraw(&user, &(600 * UNIT), &None);

    (
        s.token.balance(&user),
        s.vault.balance_of(&user),
        s.vault.total_assets(),
        s.vault.total_supply(),
    )
}

#[test]
fn test_unpause_restores_normal_operation() {
    let paused = run_deposit_withdraw_cycle(true);
    let never_paused = run_deposit_withdraw_cycle(false);

    assert_eq!(paused, never_paused);
    assert_eq!(paused, (594 * UNIT, 400 * UNIT, 400 * UNIT, 400 * UNIT));
}

#[test]
fn test_pause_requires_governance() {
    let env = Env::default();
    let s = setup(&env);
    let outsider = Address::generate(&env);

    assert_eq!(s.vault.try_pause(&outsider), Err(Ok(VaultError::Unauthorized)));

    s.vault.grant_role(&s.admin, &Role::Governance, &outsider);
    s.vault.pause(&outsider);
    assert!(s.vault.is_paused());
}

#[test]
fn test_migration_keeps_share_value() {
    let env = Env::default();
    let s = setup(&env);
    let user = new_depositor(&env, &s, 1_000 * UNIT);
    let shares = s.vault.deposit(&user, &(1_000 * UNIT), &None);
    fund_rewards(&env, &s, 100 * UNIT);

    set_time(&env, START + YEAR / 2);
    let successor = new_strategy(&env, &s.vault.address, &s.controller.address, &s.token.address);
    s.controller.migrate_strategy(&s.admin, &s.vault.address, &successor.address);

    assert_eq!(s.vault.strategy(), Some(successor.address.clone()));
    assert!(s.strategy.is_retired());
    assert_eq!(s.vault.total_assets(), 1_025 * UNIT);

    assert_eq!(s.vault.withdraw(&user, &shares, &None), 1_025 * UNIT);
    assert_eq!(s.token.balance(&user), 1_025 * UNIT);
}


// ============================================================================
// CONFIGURATION
// ============================================================================

#[test]
fn test_fee_setters_enforce_caps() {
    let env = Env::default();
    let s = setup(&env);

    s.vault.set_performance_fee(&s.admin, &MAX_PERFORMANCE_FEE_BPS);
    let event: FeesUpdatedEvent = last_event(&env, &s.vault.address, symbol_short!("fees_set"));
    assert_eq!(event.old_fees.performance_fee_bps, 0);
    assert_eq!(event.new_fees.performance_fee_bps, MAX_PERFORMANCE_FEE_BPS);

    s.vault.set_management_fee(&s.admin, &MAX_MANAGEMENT_FEE_BPS);
    s.vault.set_withdrawal_fee(&s.admin, &MAX_WITHDRAWAL_FEE_BPS);
    assert_eq!(
        s.vault.fees(),
        FeeConfig {
            performance_fee_bps: MAX_PERFORMANCE_FEE_BPS,
            management_fee_bps: MAX_MANAGEMENT_FEE_BPS,
            withdrawal_fee_bps: MAX_WITHDRAWAL_FEE_BPS,
        }
    );

    assert_eq!(
        s.vault.try_set_performance_fee(&s.admin, &(MAX_PERFORMANCE_FEE_BPS + 1)),
        Err(Ok(VaultError::FeeTooHigh))
    );
    assert_eq!(
        s.vault.try_set_management_fee(&s.admin, &(MAX_MANAGEMENT_FEE_BPS + 1)),
        Err(Ok(VaultError::FeeTooHigh))
    );
    assert_eq!(
        s.vault.try_set_withdrawal_fee(&s.admin, &(MAX_WITHDRAWAL_FEE_BPS + 1)),
        Err(Ok(VaultError::FeeTooHigh))
    );
    assert_eq!(s.vault.fees().withdrawal_fee_bps, MAX_WITHDRAWAL_FEE_BPS);
}

#[test]
fn test_configuration_requires_governance() {
    let env = Env::default();
    let s = setup(&env);
    let outsider = Address::generate(&env);

    assert_eq!(
        s.vault.try_set_performance_fee(&outsider, &100),
        Err(Ok(VaultError::Unauthorized))
    );
    assert_eq!(
        s.vault.try_set_management_fee(&outsider, &100),
        Err(Ok(VaultError::Unauthorized))
    );
    assert_eq!(
        s.vault.try_set_withdrawal_fee(&outsider, &100),
        Err(Ok(VaultError::Unauthorized))
    );
    assert_eq!(
        s.vault.try_set_treasury(&outsider, &outsider),
        Err(Ok(VaultError::Unauthorized))
    );
    assert_eq!(
        s.vault.try_grant_role(&outsider, &Role::Governance, &outsider),
        Err(Ok(VaultError::Unauthorized))
    );
}

#[test]
fn test_set_treasury_redirects_fees() {
    let env = Env::default();
    let s = setup_with_fees(&env, 0, 0, 100);
    let new_treasury = Address::generate(&env);

    assert_eq!(
        s.vault.try_set_treasury(&s.admin, &s.vault.address),
        Err(Ok(VaultError::InvalidAddress))
    );

    s.vault.set_treasury(&s.admin, &new_treasury);
    assert_eq!(s.vault.treasury(), new_treasury);
    let event: TreasuryUpdatedEvent =
        last_event(&env, &s.vault.address, symbol_short!("treasury"));
    assert_eq!(event.old_treasury, s.treasury);
    assert_eq!(event.new_treasury, new_treasury);

    let user = new_depositor(&env, &s, 1_000 * UNIT);
    let shares = s.vault.deposit(&user, &(1_000 * UNIT), &None);
    s.vault.withdraw(&user, &shares, &None);

    assert_eq!(s.token.balance(&new_treasury), 10 * UNIT);
    assert_eq!(s.token.balance(&s.treasury), 0);
}
