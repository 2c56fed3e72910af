use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::{
    error::LiquidError,
    processor::{assert_signer, create_pda_account, expect_pda, load_state, save_state},
    state::{splitter::FeeCategory, SplitterState, SPLITTER_SEED},
};

pub(crate) fn process_initialize_splitter(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let payer_info = next_account_info(account_info_iter)?;
    let splitter_info = next_account_info(account_info_iter)?;
    let system_program = next_account_info(account_info_iter)?;

    assert_signer(payer_info)?;
    let bump = expect_pda(splitter_info, &[SPLITTER_SEED], program_id)?;

    create_pda_account(
        payer_info,
        splitter_info,
        system_program,
        program_id,
        SplitterState::calculate_size(),
        &[SPLITTER_SEED, &[bump]],
    )?;

    let splitter = SplitterState::new(*payer_info.key, bump);
    save_state(splitter_info, &splitter)?;

    msg!("Fee splitter initialized, authority {}", payer_info.key);
    Ok(())
}

fn load_splitter(
    splitter_info: &AccountInfo,
    program_id: &Pubkey,
) -> Result<SplitterState, ProgramError> {
    expect_pda(splitter_info, &[SPLITTER_SEED], program_id)?;
    let splitter: SplitterState = load_state(splitter_info)?;
    if !splitter.is_initialized {
        return Err(LiquidError::NotInitialized.into());
    }
    Ok(splitter)
}

pub(crate) fn process_set_fee_split_manager(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    manager: Pubkey,
    enabled: bool,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let authority_info = next_account_info(account_info_iter)?;
    let splitter_info = next_account_info(account_info_iter)?;

    assert_signer(authority_info)?;
    let mut splitter = load_splitter(splitter_info, program_id)?;
    if splitter.authority != *authority_info.key {
        return Err(LiquidError::InvalidAuthority.into());
    }
    splitter.set_split_manager(manager, enabled)?;
    save_state(splitter_info, &splitter)?;

    msg!("Fee split manager {} enabled={}", manager, enabled);
    Ok(())
}

fn load_splitter_for_manager(
    manager_info: &AccountInfo,
    splitter_info: &AccountInfo,
    program_id: &Pubkey,
) -> Result<SplitterState, ProgramError> {
    assert_signer(manager_info)?;
    let splitter = load_splitter(splitter_info, program_id)?;
    if !splitter.is_split_manager(manager_info.key) {
        return Err(LiquidError::UnauthorizedRole.into());
    }
    Ok(splitter)
}

pub(crate) fn process_set_default_receiver(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    receiver: Pubkey,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let manager_info = next_account_info(account_info_iter)?;
    let splitter_info = next_account_info(account_info_iter)?;

    let mut splitter = load_splitter_for_manager(manager_info, splitter_info, program_id)?;
    splitter.default_receiver = receiver;
    save_state(splitter_info, &splitter)?;

    msg!("Default fee receiver set to {}", receiver);
    Ok(())
}

pub(crate) fn process_set_third_party_receiver(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    receiver: Pubkey,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let manager_info = next_account_info(account_info_iter)?;
    let splitter_info = next_account_info(account_info_iter)?;

    let mut splitter = load_splitter_for_manager(manager_info, splitter_info, program_id)?;
    splitter.third_party_receiver = receiver;
    save_state(splitter_info, &splitter)?;

    msg!("Third-party fee receiver set to {}", receiver);
    Ok(())
}

pub(crate) fn process_set_third_party_ratio(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    category: FeeCategory,
    ratio: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let manager_info = next_account_info(account_info_iter)?;
    let splitter_info = next_account_info(account_info_iter)?;

    let mut splitter = load_splitter_for_manager(manager_info, splitter_info, program_id)?;
    splitter.set_ratio(category, ratio)?;
    save_state(splitter_info, &splitter)?;

    msg!("Third-party ratio {:?} set to {} bps", category, ratio);
    Ok(())
}
