mod cashier;
mod oracle;
mod splitter;
mod vault;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
    sysvar::Sysvar,
};

use crate::{error::LiquidError, instruction::LiquidInstruction};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = LiquidInstruction::unpack(instruction_data)?;

        match instruction {
            LiquidInstruction::InitializeOracle => {
                msg!("Instruction: InitializeOracle");
                oracle::process_initialize_oracle(accounts, program_id)
            }
            LiquidInstruction::AddSupportedAsset => {
                msg!("Instruction: AddSupportedAsset");
                oracle::process_add_supported_asset(accounts, program_id)
            }
            LiquidInstruction::RemoveSupportedAsset { mint } => {
                msg!("Instruction: RemoveSupportedAsset");
                oracle::process_remove_supported_asset(accounts, program_id, mint)
            }
            LiquidInstruction::SetPriceUpdater { updater, enabled } => {
                msg!("Instruction: SetPriceUpdater");
                oracle::process_set_price_updater(accounts, program_id, updater, enabled)
            }
            LiquidInstruction::SetUpdateInterval { seconds } => {
                msg!("Instruction: SetUpdateInterval");
                oracle::process_set_update_interval(accounts, program_id, seconds)
            }
            LiquidInstruction::UpdatePrices { prices } => {
                msg!("Instruction: UpdatePrices");
                oracle::process_update_prices(accounts, program_id, prices)
            }
            LiquidInstruction::InitializeVault {
                share_name,
                share_symbol,
            } => {
                msg!("Instruction: InitializeVault");
                vault::process_initialize_vault(accounts, program_id, share_name, share_symbol)
            }
            LiquidInstruction::SetLiquidityManager { manager, enabled } => {
                msg!("Instruction: SetLiquidityManager");
                vault::process_set_liquidity_manager(accounts, program_id, manager, enabled)
            }
            LiquidInstruction::DepositLiquidity { amount } => {
                msg!("Instruction: DepositLiquidity");
                vault::process_deposit_liquidity(accounts, program_id, amount)
            }
            LiquidInstruction::WithdrawLiquidity { amount } => {
                msg!("Instruction: WithdrawLiquidity");
                vault::process_withdraw_liquidity(accounts, program_id, amount)
            }
            LiquidInstruction::AddStrategy {
                target,
                mask,
                pattern,
                description,
            } => {
                msg!("Instruction: AddStrategy");
                vault::process_add_strategy(accounts, program_id, target, mask, pattern, description)
            }
            LiquidInstruction::RemoveStrategy { index } => {
                msg!("Instruction: RemoveStrategy");
                vault::process_remove_strategy(accounts, program_id, index)
            }
            LiquidInstruction::ExecuteStrategy { index, call_data } => {
                msg!("Instruction: ExecuteStrategy");
                vault::process_execute_strategy(accounts, program_id, index, call_data)
            }
            LiquidInstruction::InitializePosition => {
                msg!("Instruction: InitializePosition");
                vault::process_initialize_position(accounts, program_id)
            }
            LiquidInstruction::TransferShares { amount } => {
                msg!("Instruction: TransferShares");
                vault::process_transfer_shares(accounts, program_id, amount)
            }
            LiquidInstruction::InitializeCashier => {
                msg!("Instruction: InitializeCashier");
                cashier::process_initialize_cashier(accounts, program_id)
            }
            LiquidInstruction::SetFeeManager { manager, enabled } => {
                msg!("Instruction: SetFeeManager");
                cashier::process_set_fee_manager(accounts, program_id, manager, enabled)
            }
            LiquidInstruction::Deposit { amount } => {
                msg!("Instruction: Deposit");
                cashier::process_deposit(accounts, program_id, amount)
            }
            LiquidInstruction::RequestWithdraw { shares } => {
                msg!("Instruction: RequestWithdraw");
                cashier::process_request_withdraw(accounts, program_id, shares)
            }
            LiquidInstruction::InstantWithdraw { shares } => {
                msg!("Instruction: InstantWithdraw");
                cashier::process_instant_withdraw(accounts, program_id, shares)
            }
            LiquidInstruction::CompleteWithdraw => {
                msg!("Instruction: CompleteWithdraw");
                cashier::process_complete_withdraw(accounts, program_id)
            }
            LiquidInstruction::CollectFees => {
                msg!("Instruction: CollectFees");
                cashier::process_collect_fees(accounts, program_id)
            }
            LiquidInstruction::SetParameter { key, value } => {
                msg!("Instruction: SetParameter");
                cashier::process_set_parameter(accounts, program_id, key, value)
            }
            LiquidInstruction::Pause => {
                msg!("Instruction: Pause");
                cashier::process_set_paused(accounts, program_id, true)
            }
            LiquidInstruction::Unpause => {
                msg!("Instruction: Unpause");
                cashier::process_set_paused(accounts, program_id, false)
            }
            LiquidInstruction::InitializeSplitter => {
                msg!("Instruction: InitializeSplitter");
                splitter::process_initialize_splitter(accounts, program_id)
            }
            LiquidInstruction::SetFeeSplitManager { manager, enabled } => {
                msg!("Instruction: SetFeeSplitManager");
                splitter::process_set_fee_split_manager(accounts, program_id, manager, enabled)
            }
            LiquidInstruction::SetDefaultReceiver { receiver } => {
                msg!("Instruction: SetDefaultReceiver");
                splitter::process_set_default_receiver(accounts, program_id, receiver)
            }
            LiquidInstruction::SetThirdPartyReceiver { receiver } => {
                msg!("Instruction: SetThirdPartyReceiver");
                splitter::process_set_third_party_receiver(accounts, program_id, receiver)
            }
            LiquidInstruction::SetThirdPartyRatio { category, ratio } => {
                msg!("Instruction: SetThirdPartyRatio");
                splitter::process_set_third_party_ratio(accounts, program_id, category, ratio)
            }
        }
    }
}

/// Deserializes program state, tolerating trailing zero bytes in the
/// fixed-size account allocation.
pub(crate) fn load_state<T: BorshDeserialize>(info: &AccountInfo) -> Result<T, ProgramError> {
    let data = info.try_borrow_data()?;
    let mut cursor: &[u8] = &data;
    T::deserialize(&mut cursor).map_err(|_| LiquidError::InvalidAccountData.into())
}

pub(crate) fn save_state<T: BorshSerialize>(
    info: &AccountInfo,
    state: &T,
) -> Result<(), ProgramError> {
    let mut data = info.try_borrow_mut_data()?;
    borsh::to_writer(&mut data.as_mut(), state)
        .map_err(|_| LiquidError::InvalidAccountData.into())
}

pub(crate) fn assert_signer(info: &AccountInfo) -> ProgramResult {
    if !info.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }
    Ok(())
}

/// Checks that `info` is the PDA for `seeds` and returns its bump.
pub(crate) fn expect_pda(
    info: &AccountInfo,
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<u8, ProgramError> {
    let (expected, bump) = Pubkey::find_program_address(seeds, program_id);
    if expected != *info.key {
        return Err(LiquidError::InvalidPda.into());
    }
    Ok(bump)
}

pub(crate) fn create_pda_account<'a>(
    payer: &AccountInfo<'a>,
    pda: &AccountInfo<'a>,
    system_program: &AccountInfo<'a>,
    program_id: &Pubkey,
    size: usize,
    signer_seeds: &[&[u8]],
) -> ProgramResult {
    if !pda.data_is_empty() {
        return Err(LiquidError::AlreadyInitialized.into());
    }
    let rent = Rent::get()?;
    invoke_signed(
        &system_instruction::create_account(
            payer.key,
            pda.key,
            rent.minimum_balance(size),
            size as u64,
            program_id,
        ),
        &[payer.clone(), pda.clone(), system_program.clone()],
        &[signer_seeds],
    )
}

/// Loads an SPL token account and checks its mint and owner.
pub(crate) fn verify_token_account(
    info: &AccountInfo,
    expected_mint: &Pubkey,
    expected_owner: &Pubkey,
) -> Result<spl_token::state::Account, ProgramError> {
    if info.owner != &spl_token::id() {
        return Err(LiquidError::InvalidTokenAccount.into());
    }
    let account = spl_token::state::Account::unpack(&info.try_borrow_data()?)?;
    if account.mint != *expected_mint || account.owner != *expected_owner {
        return Err(LiquidError::InvalidTokenAccount.into());
    }
    Ok(account)
}

pub(crate) fn token_transfer<'a>(
    token_program: &AccountInfo<'a>,
    source: &AccountInfo<'a>,
    destination: &AccountInfo<'a>,
    authority: &AccountInfo<'a>,
    amount: u64,
) -> ProgramResult {
    invoke(
        &spl_token::instruction::transfer(
            token_program.key,
            source.key,
            destination.key,
            authority.key,
            &[],
            amount,
        )?,
        &[source.clone(), destination.clone(), authority.clone()],
    )
}

/// SPL transfer signed by a program PDA.
pub(crate) fn token_transfer_signed<'a>(
    token_program: &AccountInfo<'a>,
    source: &AccountInfo<'a>,
    destination: &AccountInfo<'a>,
    pda_authority: &AccountInfo<'a>,
    signer_seeds: &[&[u8]],
    amount: u64,
) -> ProgramResult {
    invoke_signed(
        &spl_token::instruction::transfer(
            token_program.key,
            source.key,
            destination.key,
            pda_authority.key,
            &[],
            amount,
        )?,
        &[source.clone(), destination.clone(), pda_authority.clone()],
        &[signer_seeds],
    )
}
