use solana_program::{
    account_info::{next_account_info, AccountInfo},
    clock::Clock,
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
    sysvar::Sysvar,
};

use crate::{
    error::LiquidError,
    math::fees::FeeBreakdown,
    processor::{
        assert_signer, create_pda_account, expect_pda, load_state, save_state, token_transfer,
        token_transfer_signed, verify_token_account,
    },
    state::{
        cashier::{
            preview_complete_withdraw, preview_deposit, preview_request_withdraw, CompleteOutcome,
            ParameterKey,
        },
        splitter::FeeCategory,
        CashierState, OracleState, PendingWithdrawal, Position, SplitterState, VaultState,
        CASHIER_SEED, ORACLE_SEED, POSITION_SEED, SPLITTER_SEED, VAULT_SEED,
    },
};

pub(crate) fn process_initialize_cashier(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let payer_info = next_account_info(account_info_iter)?;
    let cashier_info = next_account_info(account_info_iter)?;
    let system_program = next_account_info(account_info_iter)?;

    assert_signer(payer_info)?;
    let bump = expect_pda(cashier_info, &[CASHIER_SEED], program_id)?;

    create_pda_account(
        payer_info,
        cashier_info,
        system_program,
        program_id,
        CashierState::calculate_size(),
        &[CASHIER_SEED, &[bump]],
    )?;

    let clock = Clock::get()?;
    let cashier = CashierState::new(*payer_info.key, clock.unix_timestamp, bump);
    save_state(cashier_info, &cashier)?;

    msg!("Cashier initialized, authority {}", payer_info.key);
    Ok(())
}

pub(crate) fn process_set_fee_manager(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    manager: Pubkey,
    enabled: bool,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let authority_info = next_account_info(account_info_iter)?;
    let cashier_info = next_account_info(account_info_iter)?;

    assert_signer(authority_info)?;
    expect_pda(cashier_info, &[CASHIER_SEED], program_id)?;
    let mut cashier: CashierState = load_state(cashier_info)?;
    if !cashier.is_initialized {
        return Err(LiquidError::NotInitialized.into());
    }
    if cashier.authority != *authority_info.key {
        return Err(LiquidError::InvalidAuthority.into());
    }
    cashier.set_fee_manager(manager, enabled)?;
    save_state(cashier_info, &cashier)?;

    msg!("Fee manager {} enabled={}", manager, enabled);
    Ok(())
}

fn load_core_states(
    vault_info: &AccountInfo,
    oracle_info: &AccountInfo,
    cashier_info: &AccountInfo,
    program_id: &Pubkey,
) -> Result<(VaultState, OracleState, CashierState), ProgramError> {
    expect_pda(vault_info, &[VAULT_SEED], program_id)?;
    expect_pda(oracle_info, &[ORACLE_SEED], program_id)?;
    expect_pda(cashier_info, &[CASHIER_SEED], program_id)?;
    let vault: VaultState = load_state(vault_info)?;
    let oracle: OracleState = load_state(oracle_info)?;
    let cashier: CashierState = load_state(cashier_info)?;
    if !vault.is_initialized || !oracle.is_initialized || !cashier.is_initialized {
        return Err(LiquidError::NotInitialized.into());
    }
    Ok((vault, oracle, cashier))
}

pub(crate) fn process_deposit(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    amount: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let depositor_info = next_account_info(account_info_iter)?;
    let vault_info = next_account_info(account_info_iter)?;
    let oracle_info = next_account_info(account_info_iter)?;
    let cashier_info = next_account_info(account_info_iter)?;
    let position_info = next_account_info(account_info_iter)?;
    let mint_info = next_account_info(account_info_iter)?;
    let depositor_token_info = next_account_info(account_info_iter)?;
    let vault_token_info = next_account_info(account_info_iter)?;
    let token_program = next_account_info(account_info_iter)?;
    let system_program = next_account_info(account_info_iter)?;

    assert_signer(depositor_info)?;
    let (mut vault, oracle, cashier) =
        load_core_states(vault_info, oracle_info, cashier_info, program_id)?;
    if cashier.paused {
        return Err(LiquidError::ProtocolPaused.into());
    }

    let shares = preview_deposit(&oracle, mint_info.key, amount)?;
    let clock = Clock::get()?;
    let standard_price = oracle.share_standard_price()?;

    verify_token_account(vault_token_info, mint_info.key, vault_info.key)?;
    token_transfer(
        token_program,
        depositor_token_info,
        vault_token_info,
        depositor_info,
        amount,
    )?;

    let position_bump = expect_pda(
        position_info,
        &[POSITION_SEED, depositor_info.key.as_ref()],
        program_id,
    )?;
    let mut position = if position_info.data_is_empty() {
        create_pda_account(
            depositor_info,
            position_info,
            system_program,
            program_id,
            Position::LEN,
            &[POSITION_SEED, depositor_info.key.as_ref(), &[position_bump]],
        )?;
        Position::new(*depositor_info.key, position_bump)
    } else {
        let position: Position = load_state(position_info)?;
        if position.holder != *depositor_info.key {
            return Err(LiquidError::InvalidAuthority.into());
        }
        position
    };

    position.merge_deposit(shares, clock.unix_timestamp, standard_price)?;
    vault.mint(shares)?;
    save_state(position_info, &position)?;
    save_state(vault_info, &vault)?;

    msg!(
        "Deposit: {} of {} minted {} shares for {}",
        amount,
        mint_info.key,
        shares,
        depositor_info.key
    );
    Ok(())
}

pub(crate) fn process_request_withdraw(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    shares: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let holder_info = next_account_info(account_info_iter)?;
    let vault_info = next_account_info(account_info_iter)?;
    let oracle_info = next_account_info(account_info_iter)?;
    let cashier_info = next_account_info(account_info_iter)?;
    let position_info = next_account_info(account_info_iter)?;
    let mint_info = next_account_info(account_info_iter)?;

    assert_signer(holder_info)?;
    let (mut vault, oracle, cashier) =
        load_core_states(vault_info, oracle_info, cashier_info, program_id)?;
    if cashier.paused {
        return Err(LiquidError::ProtocolPaused.into());
    }

    expect_pda(
        position_info,
        &[POSITION_SEED, holder_info.key.as_ref()],
        program_id,
    )?;
    let mut position: Position = load_state(position_info)?;
    if !position.is_initialized || position.holder != *holder_info.key {
        return Err(LiquidError::InvalidAccountData.into());
    }
    if position.pending.is_some() {
        return Err(LiquidError::WithdrawalAlreadyPending.into());
    }

    let clock = Clock::get()?;
    let (gross, fees, net) = preview_request_withdraw(
        &oracle,
        &cashier,
        &position,
        mint_info.key,
        shares,
        clock.unix_timestamp,
        false,
    )?;

    // Shares leave circulation now; value is locked in at today's quote.
    position.debit_shares(shares)?;
    vault.burn(shares)?;
    position.pending = Some(PendingWithdrawal {
        shares,
        request_ts: clock.unix_timestamp,
        asset_mint: *mint_info.key,
        net_amount: net,
        fee_management: fees.management,
        fee_performance: fees.performance,
        fee_exit: fees.exit,
    });
    save_state(position_info, &position)?;
    save_state(vault_info, &vault)?;

    msg!(
        "Withdrawal requested: {} shares, gross {}, net {} of {}",
        shares,
        gross,
        net,
        mint_info.key
    );
    Ok(())
}

/// Splits each fee category between the receivers and pays both out of the
/// vault's token account. Zero amounts are skipped; a non-zero amount with
/// no receiver configured is an error.
#[allow(clippy::too_many_arguments)]
fn pay_asset_fees<'a>(
    splitter: &SplitterState,
    fees: &FeeBreakdown,
    mint: &Pubkey,
    vault_info: &AccountInfo<'a>,
    vault_bump: u8,
    vault_token_info: &AccountInfo<'a>,
    default_token_info: &AccountInfo<'a>,
    third_token_info: &AccountInfo<'a>,
    token_program: &AccountInfo<'a>,
) -> ProgramResult {
    let mut default_total = 0u64;
    let mut third_total = 0u64;
    for (category, amount) in [
        (FeeCategory::Management, fees.management),
        (FeeCategory::Performance, fees.performance),
        (FeeCategory::Exit, fees.exit),
    ] {
        let (default_cut, third_cut) = splitter.split(category, amount);
        default_total = default_total
            .checked_add(default_cut)
            .ok_or::<ProgramError>(LiquidError::ArithmeticOverflow.into())?;
        third_total = third_total
            .checked_add(third_cut)
            .ok_or::<ProgramError>(LiquidError::ArithmeticOverflow.into())?;
    }

    let seeds: &[&[u8]] = &[VAULT_SEED, &[vault_bump]];
    if default_total > 0 {
        if splitter.default_receiver == Pubkey::default() {
            return Err(LiquidError::ReceiverNotConfigured.into());
        }
        verify_token_account(default_token_info, mint, &splitter.default_receiver)?;
        token_transfer_signed(
            token_program,
            vault_token_info,
            default_token_info,
            vault_info,
            seeds,
            default_total,
        )?;
    }
    if third_total > 0 {
        if splitter.third_party_receiver == Pubkey::default() {
            return Err(LiquidError::ReceiverNotConfigured.into());
        }
        verify_token_account(third_token_info, mint, &splitter.third_party_receiver)?;
        token_transfer_signed(
            token_program,
            vault_token_info,
            third_token_info,
            vault_info,
            seeds,
            third_total,
        )?;
    }
    Ok(())
}

pub(crate) fn process_instant_withdraw(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    shares: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let holder_info = next_account_info(account_info_iter)?;
    let vault_info = next_account_info(account_info_iter)?;
    let oracle_info = next_account_info(account_info_iter)?;
    let cashier_info = next_account_info(account_info_iter)?;
    let position_info = next_account_info(account_info_iter)?;
    let mint_info = next_account_info(account_info_iter)?;
    let vault_token_info = next_account_info(account_info_iter)?;
    let holder_token_info = next_account_info(account_info_iter)?;
    let splitter_info = next_account_info(account_info_iter)?;
    let default_token_info = next_account_info(account_info_iter)?;
    let third_token_info = next_account_info(account_info_iter)?;
    let token_program = next_account_info(account_info_iter)?;

    assert_signer(holder_info)?;
    let (mut vault, oracle, cashier) =
        load_core_states(vault_info, oracle_info, cashier_info, program_id)?;
    if cashier.paused {
        return Err(LiquidError::ProtocolPaused.into());
    }
    expect_pda(splitter_info, &[SPLITTER_SEED], program_id)?;
    let splitter: SplitterState = load_state(splitter_info)?;

    expect_pda(
        position_info,
        &[POSITION_SEED, holder_info.key.as_ref()],
        program_id,
    )?;
    let mut position: Position = load_state(position_info)?;
    if !position.is_initialized || position.holder != *holder_info.key {
        return Err(LiquidError::InvalidAccountData.into());
    }

    let clock = Clock::get()?;
    let (gross, fees, net) = preview_request_withdraw(
        &oracle,
        &cashier,
        &position,
        mint_info.key,
        shares,
        clock.unix_timestamp,
        true,
    )?;

    let vault_token = verify_token_account(vault_token_info, mint_info.key, vault_info.key)?;
    if vault_token.amount < gross {
        return Err(LiquidError::InsufficientLiquidity.into());
    }

    position.debit_shares(shares)?;
    vault.burn(shares)?;

    token_transfer_signed(
        token_program,
        vault_token_info,
        holder_token_info,
        vault_info,
        &[VAULT_SEED, &[vault.bump]],
        net,
    )?;
    pay_asset_fees(
        &splitter,
        &fees,
        mint_info.key,
        vault_info,
        vault.bump,
        vault_token_info,
        default_token_info,
        third_token_info,
        token_program,
    )?;

    save_state(position_info, &position)?;
    save_state(vault_info, &vault)?;

    msg!(
        "Instant withdrawal: {} shares, gross {}, net {} of {}",
        shares,
        gross,
        net,
        mint_info.key
    );
    Ok(())
}

pub(crate) fn process_complete_withdraw(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let holder_info = next_account_info(account_info_iter)?;
    let vault_info = next_account_info(account_info_iter)?;
    let oracle_info = next_account_info(account_info_iter)?;
    let cashier_info = next_account_info(account_info_iter)?;
    let position_info = next_account_info(account_info_iter)?;
    let vault_token_info = next_account_info(account_info_iter)?;
    let holder_token_info = next_account_info(account_info_iter)?;
    let splitter_info = next_account_info(account_info_iter)?;
    let default_token_info = next_account_info(account_info_iter)?;
    let third_token_info = next_account_info(account_info_iter)?;
    let token_program = next_account_info(account_info_iter)?;

    assert_signer(holder_info)?;
    // Completion stays open while paused so queued exits are never trapped.
    let (mut vault, oracle, cashier) =
        load_core_states(vault_info, oracle_info, cashier_info, program_id)?;
    expect_pda(splitter_info, &[SPLITTER_SEED], program_id)?;
    let splitter: SplitterState = load_state(splitter_info)?;

    expect_pda(
        position_info,
        &[POSITION_SEED, holder_info.key.as_ref()],
        program_id,
    )?;
    let mut position: Position = load_state(position_info)?;
    if !position.is_initialized || position.holder != *holder_info.key {
        return Err(LiquidError::InvalidAccountData.into());
    }

    let clock = Clock::get()?;
    match preview_complete_withdraw(&oracle, &cashier, &position, clock.unix_timestamp)? {
        CompleteOutcome::StillPending => Err(LiquidError::WithdrawalStillPending.into()),
        CompleteOutcome::RefundShares(shares) => {
            position.pending = None;
            position.credit_shares(shares)?;
            vault.mint(shares)?;
            save_state(position_info, &position)?;
            save_state(vault_info, &vault)?;
            msg!("Withdrawal target delisted, {} shares refunded", shares);
            Ok(())
        }
        CompleteOutcome::Payout(net) => {
            let pending = position.pending.take().ok_or::<ProgramError>(
                LiquidError::NoPendingWithdrawal.into(),
            )?;
            let fees = FeeBreakdown {
                management: pending.fee_management,
                performance: pending.fee_performance,
                exit: pending.fee_exit,
            };
            let owed = net
                .checked_add(fees.total()?)
                .ok_or::<ProgramError>(LiquidError::ArithmeticOverflow.into())?;
            let vault_token =
                verify_token_account(vault_token_info, &pending.asset_mint, vault_info.key)?;
            if vault_token.amount < owed {
                return Err(LiquidError::InsufficientLiquidity.into());
            }

            token_transfer_signed(
                token_program,
                vault_token_info,
                holder_token_info,
                vault_info,
                &[VAULT_SEED, &[vault.bump]],
                net,
            )?;
            pay_asset_fees(
                &splitter,
                &fees,
                &pending.asset_mint,
                vault_info,
                vault.bump,
                vault_token_info,
                default_token_info,
                third_token_info,
                token_program,
            )?;

            save_state(position_info, &position)?;
            msg!(
                "Withdrawal completed: net {} of {} to {}",
                net,
                pending.asset_mint,
                holder_info.key
            );
            Ok(())
        }
    }
}

fn credit_receiver_position(
    position_info: &AccountInfo,
    receiver: &Pubkey,
    shares: u64,
    now: i64,
    standard_price: u128,
    program_id: &Pubkey,
) -> ProgramResult {
    if shares == 0 {
        return Ok(());
    }
    if *receiver == Pubkey::default() {
        return Err(LiquidError::ReceiverNotConfigured.into());
    }
    expect_pda(position_info, &[POSITION_SEED, receiver.as_ref()], program_id)?;
    if position_info.data_is_empty() {
        return Err(LiquidError::NotInitialized.into());
    }
    let mut position: Position = load_state(position_info)?;
    position.merge_deposit(shares, now, standard_price)?;
    save_state(position_info, &position)
}

pub(crate) fn process_collect_fees(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let manager_info = next_account_info(account_info_iter)?;
    let cashier_info = next_account_info(account_info_iter)?;
    let vault_info = next_account_info(account_info_iter)?;
    let oracle_info = next_account_info(account_info_iter)?;
    let splitter_info = next_account_info(account_info_iter)?;
    let default_position_info = next_account_info(account_info_iter)?;
    let third_position_info = next_account_info(account_info_iter)?;

    assert_signer(manager_info)?;
    let (mut vault, oracle, mut cashier) =
        load_core_states(vault_info, oracle_info, cashier_info, program_id)?;
    if !cashier.is_fee_manager(manager_info.key) {
        return Err(LiquidError::UnauthorizedRole.into());
    }
    expect_pda(splitter_info, &[SPLITTER_SEED], program_id)?;
    let splitter: SplitterState = load_state(splitter_info)?;

    let clock = Clock::get()?;
    let now = clock.unix_timestamp;
    let price = oracle.share_standard_price()?;

    // First collection only records the baseline.
    if cashier.high_water_mark == 0 {
        cashier.high_water_mark = price;
        cashier.last_collect_ts = now;
        save_state(cashier_info, &cashier)?;
        msg!("High-water mark initialized at {}", price);
        return Ok(());
    }

    let (management, performance) =
        cashier.accrue_collect_fees(vault.total_supply, now, price)?;
    let (default_mgmt, third_mgmt) = splitter.split(FeeCategory::Management, management);
    let (default_perf, third_perf) = splitter.split(FeeCategory::Performance, performance);
    let default_total = default_mgmt
        .checked_add(default_perf)
        .ok_or::<ProgramError>(LiquidError::ArithmeticOverflow.into())?;
    let third_total = third_mgmt
        .checked_add(third_perf)
        .ok_or::<ProgramError>(LiquidError::ArithmeticOverflow.into())?;

    credit_receiver_position(
        default_position_info,
        &splitter.default_receiver,
        default_total,
        now,
        price,
        program_id,
    )?;
    credit_receiver_position(
        third_position_info,
        &splitter.third_party_receiver,
        third_total,
        now,
        price,
        program_id,
    )?;
    vault.mint(
        default_total
            .checked_add(third_total)
            .ok_or::<ProgramError>(LiquidError::ArithmeticOverflow.into())?,
    )?;

    if price > cashier.high_water_mark {
        cashier.high_water_mark = price;
    }
    cashier.last_collect_ts = now;
    save_state(cashier_info, &cashier)?;
    save_state(vault_info, &vault)?;

    msg!(
        "Fees collected: {} management shares, {} performance shares",
        management,
        performance
    );
    Ok(())
}

pub(crate) fn process_set_parameter(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    key: String,
    value: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let manager_info = next_account_info(account_info_iter)?;
    let cashier_info = next_account_info(account_info_iter)?;
    let splitter_info = next_account_info(account_info_iter)?;

    assert_signer(manager_info)?;
    expect_pda(cashier_info, &[CASHIER_SEED], program_id)?;
    let mut cashier: CashierState = load_state(cashier_info)?;
    if !cashier.is_initialized {
        return Err(LiquidError::NotInitialized.into());
    }
    if !cashier.is_fee_manager(manager_info.key) {
        return Err(LiquidError::UnauthorizedRole.into());
    }

    match ParameterKey::parse(&key)? {
        ParameterKey::ThirdPartyRatio(category) => {
            expect_pda(splitter_info, &[SPLITTER_SEED], program_id)?;
            let mut splitter: SplitterState = load_state(splitter_info)?;
            splitter.set_ratio(category, value)?;
            save_state(splitter_info, &splitter)?;
        }
        parsed => {
            cashier.set_parameter(parsed, value)?;
            save_state(cashier_info, &cashier)?;
        }
    }

    msg!("Parameter {} set to {}", key, value);
    Ok(())
}

pub(crate) fn process_set_paused(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    paused: bool,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let authority_info = next_account_info(account_info_iter)?;
    let cashier_info = next_account_info(account_info_iter)?;

    assert_signer(authority_info)?;
    expect_pda(cashier_info, &[CASHIER_SEED], program_id)?;
    let mut cashier: CashierState = load_state(cashier_info)?;
    if !cashier.is_initialized {
        return Err(LiquidError::NotInitialized.into());
    }
    if cashier.authority != *authority_info.key {
        return Err(LiquidError::InvalidAuthority.into());
    }
    if cashier.paused == paused {
        return Err(if paused {
            LiquidError::ProtocolPaused.into()
        } else {
            LiquidError::NotPaused.into()
        });
    }
    cashier.paused = paused;
    save_state(cashier_info, &cashier)?;

    msg!("Protocol paused={}", paused);
    Ok(())
}
