use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::state::{
    splitter::FeeCategory, CASHIER_SEED, ORACLE_SEED, POSITION_SEED, SPLITTER_SEED, VAULT_SEED,
};

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub enum LiquidInstruction {
    // ------------------------------ Oracle ------------------------------
    /// Initialize the price oracle
    /// Accounts:
    /// 0. `[signer, writable]` Payer, becomes oracle authority
    /// 1. `[writable]` Oracle PDA
    /// 2. `[]` System program
    InitializeOracle,

    /// Register a supported asset (asset-manager role = oracle authority)
    /// Accounts:
    /// 0. `[signer]` Oracle authority
    /// 1. `[writable]` Oracle PDA
    /// 2. `[]` Asset mint (decimals are read from it)
    AddSupportedAsset,

    /// Deregister a supported asset
    /// Accounts:
    /// 0. `[signer]` Oracle authority
    /// 1. `[writable]` Oracle PDA
    RemoveSupportedAsset { mint: Pubkey },

    /// Grant or revoke the price-updater role
    /// Accounts:
    /// 0. `[signer]` Oracle authority
    /// 1. `[writable]` Oracle PDA
    SetPriceUpdater { updater: Pubkey, enabled: bool },

    /// Change the minimum interval between price updates
    /// Accounts:
    /// 0. `[signer]` Oracle authority
    /// 1. `[writable]` Oracle PDA
    SetUpdateInterval { seconds: i64 },

    /// Atomically replace all prices (supported assets + standard asset,
    /// registration order)
    /// Accounts:
    /// 0. `[signer]` Price updater
    /// 1. `[writable]` Oracle PDA
    UpdatePrices { prices: Vec<u128> },

    // ------------------------------ Vault -------------------------------
    /// Initialize the share vault
    /// Accounts:
    /// 0. `[signer, writable]` Payer, becomes vault authority
    /// 1. `[writable]` Vault PDA
    /// 2. `[]` System program
    InitializeVault { share_name: String, share_symbol: String },

    /// Grant or revoke the liquidity-manager role
    /// Accounts:
    /// 0. `[signer]` Vault authority
    /// 1. `[writable]` Vault PDA
    SetLiquidityManager { manager: Pubkey, enabled: bool },

    /// Move asset liquidity into the vault directly
    /// Accounts:
    /// 0. `[signer]` Liquidity manager
    /// 1. `[]` Vault PDA
    /// 2. `[]` Asset mint
    /// 3. `[writable]` Manager's asset token account
    /// 4. `[writable]` Vault asset token account
    /// 5. `[]` Token program
    DepositLiquidity { amount: u64 },

    /// Move asset liquidity out of the vault directly
    /// Accounts:
    /// 0. `[signer]` Liquidity manager
    /// 1. `[]` Vault PDA
    /// 2. `[]` Asset mint
    /// 3. `[writable]` Vault asset token account
    /// 4. `[writable]` Destination asset token account
    /// 5. `[]` Token program
    WithdrawLiquidity { amount: u64 },

    /// Register an allow-listed strategy call shape
    /// Accounts:
    /// 0. `[signer]` Vault authority
    /// 1. `[writable]` Vault PDA
    AddStrategy {
        target: Pubkey,
        mask: Vec<u8>,
        pattern: Vec<u8>,
        description: String,
    },

    /// Remove a strategy by index
    /// Accounts:
    /// 0. `[signer]` Vault authority
    /// 1. `[writable]` Vault PDA
    RemoveStrategy { index: u32 },

    /// Execute a registered strategy: call data must satisfy the mask
    /// check, then is forwarded verbatim to the target program with the
    /// vault PDA as signer
    /// Accounts:
    /// 0. `[signer]` Liquidity manager
    /// 1. `[]` Vault PDA
    /// 2. `[]` Target program
    /// 3.. `[...]` Accounts forwarded to the target, in order
    ExecuteStrategy { index: u32, call_data: Vec<u8> },

    /// Create an empty position account for a holder (deposits create one
    /// automatically; fee receivers and transfer targets need this)
    /// Accounts:
    /// 0. `[signer, writable]` Payer
    /// 1. `[]` Holder
    /// 2. `[writable]` Holder position PDA
    /// 3. `[]` System program
    InitializePosition,

    /// Transfer shares between holders (standard fungible semantics;
    /// entry bookkeeping stays with each holder)
    /// Accounts:
    /// 0. `[signer]` Sender
    /// 1. `[writable]` Sender position PDA
    /// 2. `[writable]` Recipient position PDA
    TransferShares { amount: u64 },

    // ------------------------------ Cashier -----------------------------
    /// Initialize the cashier
    /// Accounts:
    /// 0. `[signer, writable]` Payer, becomes cashier authority
    /// 1. `[writable]` Cashier PDA
    /// 2. `[]` System program
    InitializeCashier,

    /// Grant or revoke the fee-manager role
    /// Accounts:
    /// 0. `[signer]` Cashier authority
    /// 1. `[writable]` Cashier PDA
    SetFeeManager { manager: Pubkey, enabled: bool },

    /// Deposit a supported asset for freshly minted shares
    /// Accounts:
    /// 0. `[signer, writable]` Depositor (pays position rent if new)
    /// 1. `[writable]` Vault PDA
    /// 2. `[]` Oracle PDA
    /// 3. `[]` Cashier PDA
    /// 4. `[writable]` Depositor position PDA
    /// 5. `[]` Asset mint
    /// 6. `[writable]` Depositor asset token account
    /// 7. `[writable]` Vault asset token account
    /// 8. `[]` Token program
    /// 9. `[]` System program
    Deposit { amount: u64 },

    /// Queue a withdrawal: burn shares, charge fees, record the pending
    /// slot
    /// Accounts:
    /// 0. `[signer]` Holder
    /// 1. `[writable]` Vault PDA
    /// 2. `[]` Oracle PDA
    /// 3. `[]` Cashier PDA
    /// 4. `[writable]` Holder position PDA
    /// 5. `[]` Target asset mint
    RequestWithdraw { shares: u64 },

    /// Withdraw immediately at the higher instant-exit rate, settling from
    /// current vault liquidity
    /// Accounts:
    /// 0. `[signer]` Holder
    /// 1. `[writable]` Vault PDA
    /// 2. `[]` Oracle PDA
    /// 3. `[]` Cashier PDA
    /// 4. `[writable]` Holder position PDA
    /// 5. `[]` Target asset mint
    /// 6. `[writable]` Vault asset token account
    /// 7. `[writable]` Holder asset token account
    /// 8. `[]` Splitter PDA
    /// 9. `[writable]` Default receiver asset token account
    /// 10. `[writable]` Third-party receiver asset token account
    /// 11. `[]` Token program
    InstantWithdraw { shares: u64 },

    /// Complete the pending withdrawal after the waiting period. If the
    /// target asset was removed, refunds the escrowed shares instead.
    /// Accounts:
    /// 0. `[signer]` Holder
    /// 1. `[writable]` Vault PDA
    /// 2. `[]` Oracle PDA
    /// 3. `[]` Cashier PDA
    /// 4. `[writable]` Holder position PDA
    /// 5. `[writable]` Vault asset token account
    /// 6. `[writable]` Holder asset token account
    /// 7. `[]` Splitter PDA
    /// 8. `[writable]` Default receiver asset token account
    /// 9. `[writable]` Third-party receiver asset token account
    /// 10. `[]` Token program
    CompleteWithdraw,

    /// Collect system-wide management/performance fees as freshly minted
    /// shares, split between the fee receivers, advancing the high-water
    /// mark
    /// Accounts:
    /// 0. `[signer]` Fee manager
    /// 1. `[writable]` Cashier PDA
    /// 2. `[writable]` Vault PDA
    /// 3. `[]` Oracle PDA
    /// 4. `[]` Splitter PDA
    /// 5. `[writable]` Default receiver position PDA
    /// 6. `[writable]` Third-party receiver position PDA
    CollectFees,

    /// Set a named fee parameter (ratio keys are applied to the splitter)
    /// Accounts:
    /// 0. `[signer]` Fee manager
    /// 1. `[writable]` Cashier PDA
    /// 2. `[writable]` Splitter PDA
    SetParameter { key: String, value: u64 },

    /// Halt deposits and withdrawal entry points
    /// Accounts:
    /// 0. `[signer]` Cashier authority
    /// 1. `[writable]` Cashier PDA
    Pause,

    /// Resume deposits and withdrawal entry points
    /// Accounts:
    /// 0. `[signer]` Cashier authority
    /// 1. `[writable]` Cashier PDA
    Unpause,

    // ---------------------------- Fee splitter ---------------------------
    /// Initialize the fee splitter
    /// Accounts:
    /// 0. `[signer, writable]` Payer, becomes splitter authority
    /// 1. `[writable]` Splitter PDA
    /// 2. `[]` System program
    InitializeSplitter,

    /// Grant or revoke the fee-split manager role
    /// Accounts:
    /// 0. `[signer]` Splitter authority
    /// 1. `[writable]` Splitter PDA
    SetFeeSplitManager { manager: Pubkey, enabled: bool },

    /// Set the default fee receiver
    /// Accounts:
    /// 0. `[signer]` Fee-split manager
    /// 1. `[writable]` Splitter PDA
    SetDefaultReceiver { receiver: Pubkey },

    /// Set the third-party fee receiver
    /// Accounts:
    /// 0. `[signer]` Fee-split manager
    /// 1. `[writable]` Splitter PDA
    SetThirdPartyReceiver { receiver: Pubkey },

    /// Set a per-category third-party ratio in basis points
    /// Accounts:
    /// 0. `[signer]` Fee-split manager
    /// 1. `[writable]` Splitter PDA
    SetThirdPartyRatio { category: FeeCategory, ratio: u64 },
}

impl LiquidInstruction {
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        Self::try_from_slice(input).map_err(|_| ProgramError::InvalidInstructionData)
    }

    pub fn pack(&self) -> Vec<u8> {
        self.try_to_vec().expect("instruction serialization")
    }
}

pub fn oracle_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[ORACLE_SEED], program_id)
}

pub fn vault_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEED], program_id)
}

pub fn cashier_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[CASHIER_SEED], program_id)
}

pub fn splitter_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[SPLITTER_SEED], program_id)
}

pub fn position_pda(program_id: &Pubkey, holder: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[POSITION_SEED, holder.as_ref()], program_id)
}

// Helper functions to create instructions

pub fn initialize_oracle(program_id: &Pubkey, payer: &Pubkey) -> Instruction {
    let (oracle, _) = oracle_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(oracle, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: LiquidInstruction::InitializeOracle.pack(),
    }
}

pub fn add_supported_asset(program_id: &Pubkey, authority: &Pubkey, mint: &Pubkey) -> Instruction {
    let (oracle, _) = oracle_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(oracle, false),
            AccountMeta::new_readonly(*mint, false),
        ],
        data: LiquidInstruction::AddSupportedAsset.pack(),
    }
}

pub fn remove_supported_asset(
    program_id: &Pubkey,
    authority: &Pubkey,
    mint: &Pubkey,
) -> Instruction {
    let (oracle, _) = oracle_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(oracle, false),
        ],
        data: LiquidInstruction::RemoveSupportedAsset { mint: *mint }.pack(),
    }
}

pub fn set_price_updater(
    program_id: &Pubkey,
    authority: &Pubkey,
    updater: &Pubkey,
    enabled: bool,
) -> Instruction {
    let (oracle, _) = oracle_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(oracle, false),
        ],
        data: LiquidInstruction::SetPriceUpdater {
            updater: *updater,
            enabled,
        }
        .pack(),
    }
}

pub fn set_update_interval(program_id: &Pubkey, authority: &Pubkey, seconds: i64) -> Instruction {
    let (oracle, _) = oracle_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(oracle, false),
        ],
        data: LiquidInstruction::SetUpdateInterval { seconds }.pack(),
    }
}

pub fn update_prices(program_id: &Pubkey, updater: &Pubkey, prices: Vec<u128>) -> Instruction {
    let (oracle, _) = oracle_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*updater, true),
            AccountMeta::new(oracle, false),
        ],
        data: LiquidInstruction::UpdatePrices { prices }.pack(),
    }
}

pub fn initialize_vault(
    program_id: &Pubkey,
    payer: &Pubkey,
    share_name: &str,
    share_symbol: &str,
) -> Instruction {
    let (vault, _) = vault_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(vault, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: LiquidInstruction::InitializeVault {
            share_name: share_name.to_string(),
            share_symbol: share_symbol.to_string(),
        }
        .pack(),
    }
}

pub fn set_liquidity_manager(
    program_id: &Pubkey,
    authority: &Pubkey,
    manager: &Pubkey,
    enabled: bool,
) -> Instruction {
    let (vault, _) = vault_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(vault, false),
        ],
        data: LiquidInstruction::SetLiquidityManager {
            manager: *manager,
            enabled,
        }
        .pack(),
    }
}

pub fn deposit_liquidity(
    program_id: &Pubkey,
    manager: &Pubkey,
    mint: &Pubkey,
    source_token: &Pubkey,
    vault_token: &Pubkey,
    amount: u64,
) -> Instruction {
    let (vault, _) = vault_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*manager, true),
            AccountMeta::new_readonly(vault, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new(*source_token, false),
            AccountMeta::new(*vault_token, false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data: LiquidInstruction::DepositLiquidity { amount }.pack(),
    }
}

pub fn withdraw_liquidity(
    program_id: &Pubkey,
    manager: &Pubkey,
    mint: &Pubkey,
    vault_token: &Pubkey,
    destination_token: &Pubkey,
    amount: u64,
) -> Instruction {
    let (vault, _) = vault_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*manager, true),
            AccountMeta::new_readonly(vault, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new(*vault_token, false),
            AccountMeta::new(*destination_token, false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data: LiquidInstruction::WithdrawLiquidity { amount }.pack(),
    }
}

pub fn add_strategy(
    program_id: &Pubkey,
    authority: &Pubkey,
    target: &Pubkey,
    mask: Vec<u8>,
    pattern: Vec<u8>,
    description: &str,
) -> Instruction {
    let (vault, _) = vault_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(vault, false),
        ],
        data: LiquidInstruction::AddStrategy {
            target: *target,
            mask,
            pattern,
            description: description.to_string(),
        }
        .pack(),
    }
}

pub fn remove_strategy(program_id: &Pubkey, authority: &Pubkey, index: u32) -> Instruction {
    let (vault, _) = vault_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(vault, false),
        ],
        data: LiquidInstruction::RemoveStrategy { index }.pack(),
    }
}

pub fn execute_strategy(
    program_id: &Pubkey,
    manager: &Pubkey,
    target_program: &Pubkey,
    forwarded: Vec<AccountMeta>,
    index: u32,
    call_data: Vec<u8>,
) -> Instruction {
    let (vault, _) = vault_pda(program_id);
    let mut accounts = vec![
        AccountMeta::new_readonly(*manager, true),
        AccountMeta::new_readonly(vault, false),
        AccountMeta::new_readonly(*target_program, false),
    ];
    accounts.extend(forwarded);
    Instruction {
        program_id: *program_id,
        accounts,
        data: LiquidInstruction::ExecuteStrategy { index, call_data }.pack(),
    }
}

pub fn initialize_position(program_id: &Pubkey, payer: &Pubkey, holder: &Pubkey) -> Instruction {
    let (position, _) = position_pda(program_id, holder);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new_readonly(*holder, false),
            AccountMeta::new(position, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: LiquidInstruction::InitializePosition.pack(),
    }
}

pub fn transfer_shares(
    program_id: &Pubkey,
    sender: &Pubkey,
    recipient: &Pubkey,
    amount: u64,
) -> Instruction {
    let (sender_position, _) = position_pda(program_id, sender);
    let (recipient_position, _) = position_pda(program_id, recipient);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*sender, true),
            AccountMeta::new(sender_position, false),
            AccountMeta::new(recipient_position, false),
        ],
        data: LiquidInstruction::TransferShares { amount }.pack(),
    }
}

pub fn initialize_cashier(program_id: &Pubkey, payer: &Pubkey) -> Instruction {
    let (cashier, _) = cashier_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(cashier, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: LiquidInstruction::InitializeCashier.pack(),
    }
}

pub fn set_fee_manager(
    program_id: &Pubkey,
    authority: &Pubkey,
    manager: &Pubkey,
    enabled: bool,
) -> Instruction {
    let (cashier, _) = cashier_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(cashier, false),
        ],
        data: LiquidInstruction::SetFeeManager {
            manager: *manager,
            enabled,
        }
        .pack(),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn deposit(
    program_id: &Pubkey,
    depositor: &Pubkey,
    mint: &Pubkey,
    depositor_token: &Pubkey,
    vault_token: &Pubkey,
    amount: u64,
) -> Instruction {
    let (vault, _) = vault_pda(program_id);
    let (oracle, _) = oracle_pda(program_id);
    let (cashier, _) = cashier_pda(program_id);
    let (position, _) = position_pda(program_id, depositor);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*depositor, true),
            AccountMeta::new(vault, false),
            AccountMeta::new_readonly(oracle, false),
            AccountMeta::new_readonly(cashier, false),
            AccountMeta::new(position, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new(*depositor_token, false),
            AccountMeta::new(*vault_token, false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: LiquidInstruction::Deposit { amount }.pack(),
    }
}

pub fn request_withdraw(
    program_id: &Pubkey,
    holder: &Pubkey,
    mint: &Pubkey,
    shares: u64,
) -> Instruction {
    let (vault, _) = vault_pda(program_id);
    let (oracle, _) = oracle_pda(program_id);
    let (cashier, _) = cashier_pda(program_id);
    let (position, _) = position_pda(program_id, holder);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*holder, true),
            AccountMeta::new(vault, false),
            AccountMeta::new_readonly(oracle, false),
            AccountMeta::new_readonly(cashier, false),
            AccountMeta::new(position, false),
            AccountMeta::new_readonly(*mint, false),
        ],
        data: LiquidInstruction::RequestWithdraw { shares }.pack(),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn instant_withdraw(
    program_id: &Pubkey,
    holder: &Pubkey,
    mint: &Pubkey,
    vault_token: &Pubkey,
    holder_token: &Pubkey,
    default_receiver_token: &Pubkey,
    third_party_receiver_token: &Pubkey,
    shares: u64,
) -> Instruction {
    let (vault, _) = vault_pda(program_id);
    let (oracle, _) = oracle_pda(program_id);
    let (cashier, _) = cashier_pda(program_id);
    let (splitter, _) = splitter_pda(program_id);
    let (position, _) = position_pda(program_id, holder);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*holder, true),
            AccountMeta::new(vault, false),
            AccountMeta::new_readonly(oracle, false),
            AccountMeta::new_readonly(cashier, false),
            AccountMeta::new(position, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new(*vault_token, false),
            AccountMeta::new(*holder_token, false),
            AccountMeta::new_readonly(splitter, false),
            AccountMeta::new(*default_receiver_token, false),
            AccountMeta::new(*third_party_receiver_token, false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data: LiquidInstruction::InstantWithdraw { shares }.pack(),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn complete_withdraw(
    program_id: &Pubkey,
    holder: &Pubkey,
    vault_token: &Pubkey,
    holder_token: &Pubkey,
    default_receiver_token: &Pubkey,
    third_party_receiver_token: &Pubkey,
) -> Instruction {
    let (vault, _) = vault_pda(program_id);
    let (oracle, _) = oracle_pda(program_id);
    let (cashier, _) = cashier_pda(program_id);
    let (splitter, _) = splitter_pda(program_id);
    let (position, _) = position_pda(program_id, holder);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*holder, true),
            AccountMeta::new(vault, false),
            AccountMeta::new_readonly(oracle, false),
            AccountMeta::new_readonly(cashier, false),
            AccountMeta::new(position, false),
            AccountMeta::new(*vault_token, false),
            AccountMeta::new(*holder_token, false),
            AccountMeta::new_readonly(splitter, false),
            AccountMeta::new(*default_receiver_token, false),
            AccountMeta::new(*third_party_receiver_token, false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data: LiquidInstruction::CompleteWithdraw.pack(),
    }
}

pub fn collect_fees(
    program_id: &Pubkey,
    fee_manager: &Pubkey,
    default_receiver: &Pubkey,
    third_party_receiver: &Pubkey,
) -> Instruction {
    let (cashier, _) = cashier_pda(program_id);
    let (vault, _) = vault_pda(program_id);
    let (oracle, _) = oracle_pda(program_id);
    let (splitter, _) = splitter_pda(program_id);
    let (default_position, _) = position_pda(program_id, default_receiver);
    let (third_position, _) = position_pda(program_id, third_party_receiver);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*fee_manager, true),
            AccountMeta::new(cashier, false),
            AccountMeta::new(vault, false),
            AccountMeta::new_readonly(oracle, false),
            AccountMeta::new_readonly(splitter, false),
            AccountMeta::new(default_position, false),
            AccountMeta::new(third_position, false),
        ],
        data: LiquidInstruction::CollectFees.pack(),
    }
}

pub fn set_parameter(
    program_id: &Pubkey,
    fee_manager: &Pubkey,
    key: &str,
    value: u64,
) -> Instruction {
    let (cashier, _) = cashier_pda(program_id);
    let (splitter, _) = splitter_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*fee_manager, true),
            AccountMeta::new(cashier, false),
            AccountMeta::new(splitter, false),
        ],
        data: LiquidInstruction::SetParameter {
            key: key.to_string(),
            value,
        }
        .pack(),
    }
}

pub fn pause(program_id: &Pubkey, authority: &Pubkey) -> Instruction {
    let (cashier, _) = cashier_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(cashier, false),
        ],
        data: LiquidInstruction::Pause.pack(),
    }
}

pub fn unpause(program_id: &Pubkey, authority: &Pubkey) -> Instruction {
    let (cashier, _) = cashier_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(cashier, false),
        ],
        data: LiquidInstruction::Unpause.pack(),
    }
}

pub fn initialize_splitter(program_id: &Pubkey, payer: &Pubkey) -> Instruction {
    let (splitter, _) = splitter_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(splitter, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: LiquidInstruction::InitializeSplitter.pack(),
    }
}

pub fn set_fee_split_manager(
    program_id: &Pubkey,
    authority: &Pubkey,
    manager: &Pubkey,
    enabled: bool,
) -> Instruction {
    let (splitter, _) = splitter_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(splitter, false),
        ],
        data: LiquidInstruction::SetFeeSplitManager {
            manager: *manager,
            enabled,
        }
        .pack(),
    }
}

pub fn set_default_receiver(
    program_id: &Pubkey,
    manager: &Pubkey,
    receiver: &Pubkey,
) -> Instruction {
    let (splitter, _) = splitter_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*manager, true),
            AccountMeta::new(splitter, false),
        ],
        data: LiquidInstruction::SetDefaultReceiver { receiver: *receiver }.pack(),
    }
}

pub fn set_third_party_receiver(
    program_id: &Pubkey,
    manager: &Pubkey,
    receiver: &Pubkey,
) -> Instruction {
    let (splitter, _) = splitter_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*manager, true),
            AccountMeta::new(splitter, false),
        ],
        data: LiquidInstruction::SetThirdPartyReceiver { receiver: *receiver }.pack(),
    }
}

pub fn set_third_party_ratio(
    program_id: &Pubkey,
    manager: &Pubkey,
    category: FeeCategory,
    ratio: u64,
) -> Instruction {
    let (splitter, _) = splitter_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*manager, true),
            AccountMeta::new(splitter, false),
        ],
        data: LiquidInstruction::SetThirdPartyRatio { category, ratio }.pack(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack_round_trip() {
        let cases = vec![
            LiquidInstruction::InitializeOracle,
            LiquidInstruction::UpdatePrices {
                prices: vec![1, u128::MAX, 42],
            },
            LiquidInstruction::Deposit { amount: 12345 },
            LiquidInstruction::SetParameter {
                key: "feeRateExit".to_string(),
                value: 150,
            },
            LiquidInstruction::ExecuteStrategy {
                index: 2,
                call_data: vec![3, 0, 0, 0, 7],
            },
        ];
        for case in cases {
            let packed = case.pack();
            let unpacked = LiquidInstruction::unpack(&packed).unwrap();
            assert_eq!(format!("{:?}", case), format!("{:?}", unpacked));
        }
    }

    #[test]
    fn test_unpack_rejects_garbage() {
        assert!(LiquidInstruction::unpack(&[250, 1, 2]).is_err());
    }
}
