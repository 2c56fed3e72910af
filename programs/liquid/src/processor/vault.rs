use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    instruction::{AccountMeta, Instruction},
    msg,
    program::invoke_signed,
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::{
    error::LiquidError,
    processor::{
        assert_signer, create_pda_account, expect_pda, load_state, save_state, token_transfer,
        token_transfer_signed, verify_token_account,
    },
    state::{
        position::merge_entry, Position, Strategy, VaultState, POSITION_SEED, VAULT_SEED,
    },
};

pub(crate) fn process_initialize_vault(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    share_name: String,
    share_symbol: String,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let payer_info = next_account_info(account_info_iter)?;
    let vault_info = next_account_info(account_info_iter)?;
    let system_program = next_account_info(account_info_iter)?;

    assert_signer(payer_info)?;
    let bump = expect_pda(vault_info, &[VAULT_SEED], program_id)?;

    create_pda_account(
        payer_info,
        vault_info,
        system_program,
        program_id,
        VaultState::calculate_size(),
        &[VAULT_SEED, &[bump]],
    )?;

    let vault = VaultState::new(*payer_info.key, share_name, share_symbol, bump);
    save_state(vault_info, &vault)?;

    msg!("Vault initialized, authority {}", payer_info.key);
    Ok(())
}

fn load_vault_for_authority(
    authority_info: &AccountInfo,
    vault_info: &AccountInfo,
    program_id: &Pubkey,
) -> Result<VaultState, ProgramError> {
    assert_signer(authority_info)?;
    expect_pda(vault_info, &[VAULT_SEED], program_id)?;
    let vault: VaultState = load_state(vault_info)?;
    if !vault.is_initialized {
        return Err(LiquidError::NotInitialized.into());
    }
    if vault.authority != *authority_info.key {
        return Err(LiquidError::InvalidAuthority.into());
    }
    Ok(vault)
}

fn load_vault_for_manager(
    manager_info: &AccountInfo,
    vault_info: &AccountInfo,
    program_id: &Pubkey,
) -> Result<VaultState, ProgramError> {
    assert_signer(manager_info)?;
    expect_pda(vault_info, &[VAULT_SEED], program_id)?;
    let vault: VaultState = load_state(vault_info)?;
    if !vault.is_initialized {
        return Err(LiquidError::NotInitialized.into());
    }
    if !vault.is_liquidity_manager(manager_info.key) {
        return Err(LiquidError::UnauthorizedRole.into());
    }
    Ok(vault)
}

pub(crate) fn process_set_liquidity_manager(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    manager: Pubkey,
    enabled: bool,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let authority_info = next_account_info(account_info_iter)?;
    let vault_info = next_account_info(account_info_iter)?;

    let mut vault = load_vault_for_authority(authority_info, vault_info, program_id)?;
    vault.set_liquidity_manager(manager, enabled)?;
    save_state(vault_info, &vault)?;

    msg!("Liquidity manager {} enabled={}", manager, enabled);
    Ok(())
}

pub(crate) fn process_deposit_liquidity(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    amount: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let manager_info = next_account_info(account_info_iter)?;
    let vault_info = next_account_info(account_info_iter)?;
    let mint_info = next_account_info(account_info_iter)?;
    let source_token_info = next_account_info(account_info_iter)?;
    let vault_token_info = next_account_info(account_info_iter)?;
    let token_program = next_account_info(account_info_iter)?;

    if amount == 0 {
        return Err(LiquidError::ZeroAmount.into());
    }
    load_vault_for_manager(manager_info, vault_info, program_id)?;
    verify_token_account(vault_token_info, mint_info.key, vault_info.key)?;

    token_transfer(
        token_program,
        source_token_info,
        vault_token_info,
        manager_info,
        amount,
    )?;

    msg!("Liquidity deposited: {} of {}", amount, mint_info.key);
    Ok(())
}

pub(crate) fn process_withdraw_liquidity(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    amount: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let manager_info = next_account_info(account_info_iter)?;
    let vault_info = next_account_info(account_info_iter)?;
    let mint_info = next_account_info(account_info_iter)?;
    let vault_token_info = next_account_info(account_info_iter)?;
    let destination_token_info = next_account_info(account_info_iter)?;
    let token_program = next_account_info(account_info_iter)?;

    if amount == 0 {
        return Err(LiquidError::ZeroAmount.into());
    }
    let vault = load_vault_for_manager(manager_info, vault_info, program_id)?;
    let vault_token = verify_token_account(vault_token_info, mint_info.key, vault_info.key)?;
    if vault_token.amount < amount {
        return Err(LiquidError::InsufficientLiquidity.into());
    }

    token_transfer_signed(
        token_program,
        vault_token_info,
        destination_token_info,
        vault_info,
        &[VAULT_SEED, &[vault.bump]],
        amount,
    )?;

    msg!("Liquidity withdrawn: {} of {}", amount, mint_info.key);
    Ok(())
}

pub(crate) fn process_add_strategy(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    target: Pubkey,
    mask: Vec<u8>,
    pattern: Vec<u8>,
    description: String,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let authority_info = next_account_info(account_info_iter)?;
    let vault_info = next_account_info(account_info_iter)?;

    let mut vault = load_vault_for_authority(authority_info, vault_info, program_id)?;
    let strategy = Strategy::new(target, mask, pattern, description)?;
    let index = vault.add_strategy(strategy)?;
    save_state(vault_info, &vault)?;

    msg!("Strategy {} added, target {}", index, target);
    Ok(())
}

pub(crate) fn process_remove_strategy(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    index: u32,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let authority_info = next_account_info(account_info_iter)?;
    let vault_info = next_account_info(account_info_iter)?;

    let mut vault = load_vault_for_authority(authority_info, vault_info, program_id)?;
    vault.remove_strategy(index as usize)?;
    save_state(vault_info, &vault)?;

    msg!("Strategy {} removed", index);
    Ok(())
}

/// Forwards an allow-listed call to the strategy target with the vault PDA
/// as signer. The remaining accounts are passed through in order.
pub(crate) fn process_execute_strategy(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    index: u32,
    call_data: Vec<u8>,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let manager_info = next_account_info(account_info_iter)?;
    let vault_info = next_account_info(account_info_iter)?;
    let target_program_info = next_account_info(account_info_iter)?;
    let forwarded: Vec<&AccountInfo> = account_info_iter.collect();

    let vault = load_vault_for_manager(manager_info, vault_info, program_id)?;
    let strategy = vault.strategy(index as usize)?;
    if strategy.target != *target_program_info.key {
        return Err(LiquidError::StrategyNotMatched.into());
    }
    strategy.matches(&call_data)?;

    let metas: Vec<AccountMeta> = forwarded
        .iter()
        .map(|info| AccountMeta {
            pubkey: *info.key,
            is_signer: info.is_signer || info.key == vault_info.key,
            is_writable: info.is_writable,
        })
        .collect();
    let mut infos: Vec<AccountInfo> = forwarded.into_iter().cloned().collect();
    infos.push(vault_info.clone());

    invoke_signed(
        &Instruction {
            program_id: *target_program_info.key,
            accounts: metas,
            data: call_data,
        },
        &infos,
        &[&[VAULT_SEED, &[vault.bump]]],
    )?;

    msg!("Strategy {} executed against {}", index, target_program_info.key);
    Ok(())
}

pub(crate) fn process_initialize_position(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let payer_info = next_account_info(account_info_iter)?;
    let holder_info = next_account_info(account_info_iter)?;
    let position_info = next_account_info(account_info_iter)?;
    let system_program = next_account_info(account_info_iter)?;

    assert_signer(payer_info)?;
    let bump = expect_pda(
        position_info,
        &[POSITION_SEED, holder_info.key.as_ref()],
        program_id,
    )?;

    create_pda_account(
        payer_info,
        position_info,
        system_program,
        program_id,
        Position::LEN,
        &[POSITION_SEED, holder_info.key.as_ref(), &[bump]],
    )?;

    let position = Position::new(*holder_info.key, bump);
    save_state(position_info, &position)?;

    msg!("Position initialized for {}", holder_info.key);
    Ok(())
}

/// Moves shares between holders. The transferred shares carry the sender's
/// entry bookkeeping into the recipient's weighted averages.
pub(crate) fn process_transfer_shares(
    accounts: &[AccountInfo],
    program_id: &Pubkey,
    amount: u64,
) -> ProgramResult {
    let account_info_iter = &mut accounts.iter();
    let sender_info = next_account_info(account_info_iter)?;
    let sender_position_info = next_account_info(account_info_iter)?;
    let recipient_position_info = next_account_info(account_info_iter)?;

    if amount == 0 {
        return Err(LiquidError::ZeroAmount.into());
    }
    // Both positions are written back below; aliasing them would turn the
    // debit-then-credit into a pure credit.
    if sender_position_info.key == recipient_position_info.key {
        return Err(LiquidError::SelfTransfer.into());
    }
    assert_signer(sender_info)?;
    expect_pda(
        sender_position_info,
        &[POSITION_SEED, sender_info.key.as_ref()],
        program_id,
    )?;

    let mut sender_position: Position = load_state(sender_position_info)?;
    let mut recipient_position: Position = load_state(recipient_position_info)?;
    if !sender_position.is_initialized || !recipient_position.is_initialized {
        return Err(LiquidError::NotInitialized.into());
    }
    if sender_position.holder != *sender_info.key {
        return Err(LiquidError::InvalidAuthority.into());
    }
    expect_pda(
        recipient_position_info,
        &[POSITION_SEED, recipient_position.holder.as_ref()],
        program_id,
    )?;

    sender_position.debit_shares(amount)?;
    let (entry_ts, entry_price) = merge_entry(
        recipient_position.shares,
        recipient_position.entry_ts,
        recipient_position.entry_standard_price,
        amount,
        sender_position.entry_ts,
        sender_position.entry_standard_price,
    )?;
    recipient_position.entry_ts = entry_ts;
    recipient_position.entry_standard_price = entry_price;
    recipient_position.credit_shares(amount)?;

    save_state(sender_position_info, &sender_position)?;
    save_state(recipient_position_info, &recipient_position)?;

    msg!(
        "Transferred {} shares from {} to {}",
        amount,
        sender_position.holder,
        recipient_position.holder
    );
    Ok(())
}
