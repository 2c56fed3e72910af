use solana_program::{
    account_info::{next_account_info, AccountInfo},
    clock::Clock,
    entrypoint::ProgramResult,
    msg,
    program_pack::Pack,
    pubkey::Pubkey,
    sysvar::Sysvar,
};

use crate::{
    error::LiquidError,
    processor::{assert_signer, create_pda_account, expect_pda, load_state, save_state},
    state::{OracleState, ORACLE_SEED},
};

pub(crate) fn process_initialize_oracle(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let payer_info = next_account_info(account_info_iter)?;
    let oracle_info = next_account_info(account_info_iter)?;
    let system_program = next_account_info(account_info_iter)?;

    assert_signer(payer_info)?;
    let bump = expect_pda(oracle_info, &[ORACLE_SEED], program_id)?;

    create_pda_account(
        payer_info,
        oracle_info,
        system_program,
        program_id,
        OracleState::calculate_size(),
        &[ORACLE_SEED, &[bump]],
    )?;

    let oracle = OracleState::new(*payer_info.key, bump);
    save_state(oracle_info, &oracle)?;

    msg!("Oracle initialized, authority {}", payer_info.key);
    Ok(())
}

fn load_oracle_for_authority(
    authority_info: &AccountInfo,
    oracle_info: &AccountInfo,
    program_id: &Pubkey,
) -> Result<OracleState, solana_program::program_error::ProgramError> {
    assert_signer(authority_info)?;
    expect_pda(oracle_info, &[ORACLE_SEED], program_id)?;
    let oracle: OracleState = load_state(oracle_info)?;
    if !oracle.is_initialized {
        return Err(LiquidError::NotInitialized.into());
    }
    if oracle.authority != *authority_info.key {
        return Err(LiquidError::InvalidAuthority.into());
    }
    Ok(oracle)
}

pub(crate) fn process_add_supported_asset(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let authority_info = next_account_info(account_info_iter)?;
    let oracle_info = next_account_info(account_info_iter)?;
    let mint_info = next_account_info(account_info_iter)?;

    let mut oracle = load_oracle_for_authority(authority_info, oracle_info, program_id)?;

    if mint_info.owner != &spl_token::id() {
        return Err(LiquidError::InvalidTokenAccount.into());
    }
    let mint = spl_token::state::Mint::unpack(&mint_info.try_borrow_data()?)?;

    oracle.add_asset(*mint_info.key, mint.decimals)?;
    save_state(oracle_info, &oracle)?;

    msg!(
        "Asset {} added, decimals {}, supported assets {}",
        mint_info.key,
        mint.decimals,
        oracle.supported_assets_num()
    );
    Ok(())
}

pub(crate) fn process_remove_supported_asset(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    mint: Pubkey,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let authority_info = next_account_info(account_info_iter)?;
    let oracle_info = next_account_info(account_info_iter)?;

    let mut oracle = load_oracle_for_authority(authority_info, oracle_info, program_id)?;
    oracle.remove_asset(&mint)?;
    save_state(oracle_info, &oracle)?;

    msg!("Asset {} removed", mint);
    Ok(())
}

pub(crate) fn process_set_price_updater(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    updater: Pubkey,
    enabled: bool,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let authority_info = next_account_info(account_info_iter)?;
    let oracle_info = next_account_info(account_info_iter)?;

    let mut oracle = load_oracle_for_authority(authority_info, oracle_info, program_id)?;
    oracle.set_price_updater(updater, enabled)?;
    save_state(oracle_info, &oracle)?;

    msg!("Price updater {} enabled={}", updater, enabled);
    Ok(())
}

pub(crate) fn process_set_update_interval(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    seconds: i64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let authority_info = next_account_info(account_info_iter)?;
    let oracle_info = next_account_info(account_info_iter)?;

    if seconds < 0 {
        return Err(LiquidError::InvalidInputLength.into());
    }
    let mut oracle = load_oracle_for_authority(authority_info, oracle_info, program_id)?;
    oracle.minimum_update_interval = seconds;
    save_state(oracle_info, &oracle)?;

    msg!("Minimum update interval set to {}s", seconds);
    Ok(())
}

pub(crate) fn process_update_prices(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    prices: Vec<u128>,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let updater_info = next_account_info(account_info_iter)?;
    let oracle_info = next_account_info(account_info_iter)?;

    assert_signer(updater_info)?;
    expect_pda(oracle_info, &[ORACLE_SEED], program_id)?;

    let mut oracle: OracleState = load_state(oracle_info)?;
    if !oracle.is_initialized {
        return Err(LiquidError::NotInitialized.into());
    }
    if !oracle.is_price_updater(updater_info.key) {
        return Err(LiquidError::UnauthorizedRole.into());
    }

    let clock = Clock::get()?;
    oracle.update_prices(&prices, clock.unix_timestamp)?;
    save_state(oracle_info, &oracle)?;

    msg!("Prices updated, {} entries at {}", prices.len(), clock.unix_timestamp);
    Ok(())
}
