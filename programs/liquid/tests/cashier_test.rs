mod common;

use common::*;
use liquid::{
    error::LiquidError,
    instruction,
    state::{CashierState, Position, SplitterState, VaultState},
};
use solana_program::pubkey::Pubkey;
use solana_program_test::ProgramTestContext;
use solana_sdk::signature::Signer;

struct Fixture {
    usdc: Pubkey,
    holder_token: Pubkey,
    vault_token: Pubkey,
    default_token: Pubkey,
    third_token: Pubkey,
}

/// One supported asset (USDC, 6 decimals) priced so a share is worth
/// 0.8 USDC and 0.8 standard units, the holder funded with 100k USDC, and
/// both fee receivers configured.
async fn fixture(context: &mut ProgramTestContext, program_id: &Pubkey) -> Fixture {
    bootstrap_protocol(context, program_id).await;
    let payer = context.payer.pubkey();

    let usdc = create_mint(context, 6).await;
    let vault_token = register_asset(context, program_id, &usdc).await;
    let holder_token = create_token_account(context, &usdc, &payer).await;
    mint_to(context, &usdc, &holder_token, 100_000_000_000).await;

    send(
        context,
        &[instruction::update_prices(
            program_id,
            &payer,
            vec![quote(125, 6), quote(125, 9)],
        )],
        &[],
    )
    .await
    .unwrap();

    let default_receiver = Pubkey::new_unique();
    let third_receiver = Pubkey::new_unique();
    let default_token = create_token_account(context, &usdc, &default_receiver).await;
    let third_token = create_token_account(context, &usdc, &third_receiver).await;
    send(
        context,
        &[
            instruction::set_default_receiver(program_id, &payer, &default_receiver),
            instruction::set_third_party_receiver(program_id, &payer, &third_receiver),
        ],
        &[],
    )
    .await
    .unwrap();

    Fixture {
        usdc,
        holder_token,
        vault_token,
        default_token,
        third_token,
    }
}

async fn deposit_20k(context: &mut ProgramTestContext, program_id: &Pubkey, f: &Fixture) {
    let payer = context.payer.pubkey();
    send(
        context,
        &[instruction::deposit(
            program_id,
            &payer,
            &f.usdc,
            &f.holder_token,
            &f.vault_token,
            20_000_000_000,
        )],
        &[],
    )
    .await
    .unwrap();
}

/// Reprices the share from 0.8 to 1.0 in both USDC and standard terms.
async fn reprice_to_par(context: &mut ProgramTestContext, program_id: &Pubkey) {
    let payer = context.payer.pubkey();
    send(
        context,
        &[instruction::update_prices(
            program_id,
            &payer,
            vec![quote(100, 6), quote(100, 9)],
        )],
        &[],
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_deposit_mints_shares_at_quote() {
    let (mut context, program_id) = setup().await;
    let f = fixture(&mut context, &program_id).await;
    let payer = context.payer.pubkey();
    let entry_time = current_time(&mut context).await;
    deposit_20k(&mut context, &program_id, &f).await;

    // 20000 USDC at 1.25 shares per USDC.
    let (position_pda, _) = instruction::position_pda(&program_id, &payer);
    let position: Position = read_state(&mut context, position_pda).await;
    assert_eq!(position.shares, 25_000 * SHARE);
    assert_eq!(position.entry_ts, entry_time);
    assert_eq!(position.entry_standard_price, 800_000_000_000_000_000);
    assert!(position.pending.is_none());

    let (vault_pda, _) = instruction::vault_pda(&program_id);
    let vault: VaultState = read_state(&mut context, vault_pda).await;
    assert_eq!(vault.total_supply, 25_000 * SHARE);
    assert_eq!(token_balance(&mut context, &f.vault_token).await, 20_000_000_000);

    assert_liquid_error(
        send(
            &mut context,
            &[instruction::deposit(
                &program_id,
                &payer,
                &f.usdc,
                &f.holder_token,
                &f.vault_token,
                0,
            )],
            &[],
        )
        .await,
        LiquidError::ZeroAmount,
    );
}

#[tokio::test]
async fn test_queued_withdrawal_journey() {
    let (mut context, program_id) = setup().await;
    let f = fixture(&mut context, &program_id).await;
    let payer = context.payer.pubkey();
    deposit_20k(&mut context, &program_id, &f).await;

    // 60% of the performance fee goes to the third party, set through the
    // cashier's parameter surface.
    send(
        &mut context,
        &[instruction::set_parameter(
            &program_id,
            &payer,
            "thirdPartyRatioPerformance",
            6_000,
        )],
        &[],
    )
    .await
    .unwrap();

    advance_clock(&mut context, 45 * DAY).await;
    reprice_to_par(&mut context, &program_id).await;

    // 10000 shares at par = 10000 USDC gross.
    send(
        &mut context,
        &[instruction::request_withdraw(&program_id, &payer, &f.usdc, 10_000 * SHARE)],
        &[],
    )
    .await
    .unwrap();

    let (position_pda, _) = instruction::position_pda(&program_id, &payer);
    let position: Position = read_state(&mut context, position_pda).await;
    assert_eq!(position.shares, 15_000 * SHARE);
    let pending = position.pending.clone().unwrap();
    assert_eq!(pending.shares, 10_000 * SHARE);
    assert_eq!(pending.asset_mint, f.usdc);
    // 10000 * 2%/yr * 45/365, rounded up
    assert_eq!(pending.fee_management, 24_657_535);
    // 10000 * (0.2 / 1.0) * 20%
    assert_eq!(pending.fee_performance, 400_000_000);
    // 10000 * 1%
    assert_eq!(pending.fee_exit, 100_000_000);
    assert_eq!(pending.net_amount, 9_475_342_465);

    // Shares leave the supply at request time.
    let (vault_pda, _) = instruction::vault_pda(&program_id);
    let vault: VaultState = read_state(&mut context, vault_pda).await;
    assert_eq!(vault.total_supply, 15_000 * SHARE);

    // One pending slot per holder.
    assert_liquid_error(
        send(
            &mut context,
            &[instruction::request_withdraw(&program_id, &payer, &f.usdc, SHARE)],
            &[],
        )
        .await,
        LiquidError::WithdrawalAlreadyPending,
    );

    let complete = instruction::complete_withdraw(
        &program_id,
        &payer,
        &f.vault_token,
        &f.holder_token,
        &f.default_token,
        &f.third_token,
    );
    assert_liquid_error(
        send(&mut context, &[complete.clone()], &[]).await,
        LiquidError::WithdrawalStillPending,
    );

    advance_clock(&mut context, 7 * DAY).await;
    let balance_before = token_balance(&mut context, &f.holder_token).await;
    send(&mut context, &[complete.clone()], &[]).await.unwrap();

    assert_eq!(
        token_balance(&mut context, &f.holder_token).await,
        balance_before + 9_475_342_465
    );
    // Management and exit fees all to the default receiver, performance
    // split 40/60.
    assert_eq!(
        token_balance(&mut context, &f.default_token).await,
        24_657_535 + 100_000_000 + 160_000_000
    );
    assert_eq!(token_balance(&mut context, &f.third_token).await, 240_000_000);
    assert_eq!(token_balance(&mut context, &f.vault_token).await, 10_000_000_000);

    let position: Position = read_state(&mut context, position_pda).await;
    assert!(position.pending.is_none());

    assert_liquid_error(
        send(&mut context, &[complete], &[]).await,
        LiquidError::NoPendingWithdrawal,
    );
}

#[tokio::test]
async fn test_instant_withdrawal() {
    let (mut context, program_id) = setup().await;
    let f = fixture(&mut context, &program_id).await;
    let payer = context.payer.pubkey();
    deposit_20k(&mut context, &program_id, &f).await;

    advance_clock(&mut context, 45 * DAY).await;
    reprice_to_par(&mut context, &program_id).await;

    let balance_before = token_balance(&mut context, &f.holder_token).await;
    send(
        &mut context,
        &[instruction::instant_withdraw(
            &program_id,
            &payer,
            &f.usdc,
            &f.vault_token,
            &f.holder_token,
            &f.default_token,
            &f.third_token,
            10_000 * SHARE,
        )],
        &[],
    )
    .await
    .unwrap();

    // Same management and performance fees as the queued path, with the 5%
    // instant rate in place of the 1% exit rate.
    let total_fees = 24_657_535 + 400_000_000 + 500_000_000;
    assert_eq!(
        token_balance(&mut context, &f.holder_token).await,
        balance_before + 10_000_000_000 - total_fees
    );
    assert_eq!(token_balance(&mut context, &f.default_token).await, total_fees);

    // The remaining 15000 shares are worth more than the vault holds.
    assert_liquid_error(
        send(
            &mut context,
            &[instruction::instant_withdraw(
                &program_id,
                &payer,
                &f.usdc,
                &f.vault_token,
                &f.holder_token,
                &f.default_token,
                &f.third_token,
                15_000 * SHARE,
            )],
            &[],
        )
        .await,
        LiquidError::InsufficientLiquidity,
    );
}

#[tokio::test]
async fn test_set_parameter_surface() {
    let (mut context, program_id) = setup().await;
    bootstrap_protocol(&mut context, &program_id).await;
    let payer = context.payer.pubkey();

    send(
        &mut context,
        &[
            instruction::set_parameter(&program_id, &payer, "feeRateExit", 150),
            instruction::set_parameter(&program_id, &payer, "withdrawPeriod", 86_400),
            instruction::set_parameter(&program_id, &payer, "thirdPartyRatioManagement", 1_000),
        ],
        &[],
    )
    .await
    .unwrap();

    let (cashier_pda, _) = instruction::cashier_pda(&program_id);
    let cashier: CashierState = read_state(&mut context, cashier_pda).await;
    assert_eq!(cashier.params.fee_rate_exit, 150);
    assert_eq!(cashier.params.withdraw_period, 86_400);

    let (splitter_pda, _) = instruction::splitter_pda(&program_id);
    let splitter: SplitterState = read_state(&mut context, splitter_pda).await;
    assert_eq!(splitter.third_party_ratio_management, 1_000);

    assert_liquid_error(
        send(
            &mut context,
            &[instruction::set_parameter(&program_id, &payer, "feeRate", 100)],
            &[],
        )
        .await,
        LiquidError::InvalidParameterKey,
    );

    assert_liquid_error(
        send(
            &mut context,
            &[instruction::set_parameter(&program_id, &payer, "feeRateExit", 10_001)],
            &[],
        )
        .await,
        LiquidError::InvalidRatio,
    );
}

#[tokio::test]
async fn test_pause_blocks_entry_points_but_not_completion() {
    let (mut context, program_id) = setup().await;
    let f = fixture(&mut context, &program_id).await;
    let payer = context.payer.pubkey();
    deposit_20k(&mut context, &program_id, &f).await;

    send(
        &mut context,
        &[instruction::request_withdraw(&program_id, &payer, &f.usdc, 1_000 * SHARE)],
        &[],
    )
    .await
    .unwrap();

    send(&mut context, &[instruction::pause(&program_id, &payer)], &[])
        .await
        .unwrap();

    assert_liquid_error(
        send(
            &mut context,
            &[instruction::deposit(
                &program_id,
                &payer,
                &f.usdc,
                &f.holder_token,
                &f.vault_token,
                1_000_000,
            )],
            &[],
        )
        .await,
        LiquidError::ProtocolPaused,
    );
    assert_liquid_error(
        send(
            &mut context,
            &[instruction::request_withdraw(&program_id, &payer, &f.usdc, SHARE)],
            &[],
        )
        .await,
        LiquidError::ProtocolPaused,
    );

    // Queued exits still complete under pause.
    advance_clock(&mut context, 7 * DAY).await;
    send(
        &mut context,
        &[instruction::complete_withdraw(
            &program_id,
            &payer,
            &f.vault_token,
            &f.holder_token,
            &f.default_token,
            &f.third_token,
        )],
        &[],
    )
    .await
    .unwrap();

    send(&mut context, &[instruction::unpause(&program_id, &payer)], &[])
        .await
        .unwrap();
    assert_liquid_error(
        send(&mut context, &[instruction::unpause(&program_id, &payer)], &[]).await,
        LiquidError::NotPaused,
    );

    // Entry points reopen.
    send(
        &mut context,
        &[instruction::deposit(
            &program_id,
            &payer,
            &f.usdc,
            &f.holder_token,
            &f.vault_token,
            1_000_000,
        )],
        &[],
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_delisted_asset_refunds_shares() {
    let (mut context, program_id) = setup().await;
    let f = fixture(&mut context, &program_id).await;
    let payer = context.payer.pubkey();
    deposit_20k(&mut context, &program_id, &f).await;

    send(
        &mut context,
        &[instruction::request_withdraw(&program_id, &payer, &f.usdc, 10_000 * SHARE)],
        &[],
    )
    .await
    .unwrap();
    send(
        &mut context,
        &[instruction::remove_supported_asset(&program_id, &payer, &f.usdc)],
        &[],
    )
    .await
    .unwrap();

    advance_clock(&mut context, 7 * DAY).await;
    let balance_before = token_balance(&mut context, &f.holder_token).await;
    send(
        &mut context,
        &[instruction::complete_withdraw(
            &program_id,
            &payer,
            &f.vault_token,
            &f.holder_token,
            &f.default_token,
            &f.third_token,
        )],
        &[],
    )
    .await
    .unwrap();

    // No assets moved; the escrowed shares came back.
    assert_eq!(token_balance(&mut context, &f.holder_token).await, balance_before);
    let (position_pda, _) = instruction::position_pda(&program_id, &payer);
    let position: Position = read_state(&mut context, position_pda).await;
    assert_eq!(position.shares, 25_000 * SHARE);
    assert!(position.pending.is_none());

    let (vault_pda, _) = instruction::vault_pda(&program_id);
    let vault: VaultState = read_state(&mut context, vault_pda).await;
    assert_eq!(vault.total_supply, 25_000 * SHARE);
}
