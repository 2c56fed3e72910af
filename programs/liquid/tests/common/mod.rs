#![allow(dead_code)]

use borsh::BorshDeserialize;
use solana_program::{clock::Clock, program_pack::Pack, pubkey::Pubkey, system_instruction};
use solana_program_test::{processor, BanksClientError, ProgramTest, ProgramTestContext};
use solana_sdk::{
    instruction::{Instruction, InstructionError},
    signature::{Keypair, Signer},
    transaction::{Transaction, TransactionError},
};

use liquid::error::LiquidError;

pub const DAY: i64 = 86_400;
pub const E18: u128 = 1_000_000_000_000_000_000;
pub const SHARE: u64 = 1_000_000_000;

pub async fn setup() -> (ProgramTestContext, Pubkey) {
    let program_id = Pubkey::new_unique();
    let program_test = ProgramTest::new("liquid", program_id, processor!(liquid::process));
    let context = program_test.start_with_context().await;
    (context, program_id)
}

/// Asset-to-share quote at the oracle's scale, from a price expressed in
/// hundredths (125 -> 1.25 shares per whole asset unit).
pub fn quote(price_times_100: u128, asset_decimals: u32) -> u128 {
    price_times_100 * 10u128.pow(18 + 9 - asset_decimals) / 100
}

pub async fn send(
    context: &mut ProgramTestContext,
    instructions: &[Instruction],
    extra_signers: &[&Keypair],
) -> Result<(), BanksClientError> {
    // A fresh blockhash keeps repeated identical instructions from being
    // deduplicated by the status cache.
    let blockhash = context.get_new_latest_blockhash().await?;
    let mut signers = vec![&context.payer];
    signers.extend_from_slice(extra_signers);
    let transaction = Transaction::new_signed_with_payer(
        instructions,
        Some(&context.payer.pubkey()),
        &signers,
        blockhash,
    );
    context.banks_client.process_transaction(transaction).await
}

pub fn assert_liquid_error(result: Result<(), BanksClientError>, expected: LiquidError) {
    match result.unwrap_err() {
        BanksClientError::TransactionError(TransactionError::InstructionError(
            _,
            InstructionError::Custom(code),
        )) => assert_eq!(code, expected as u32),
        other => panic!("expected {:?}, got {:?}", expected, other),
    }
}

pub async fn read_state<T: BorshDeserialize>(
    context: &mut ProgramTestContext,
    address: Pubkey,
) -> T {
    let account = context
        .banks_client
        .get_account(address)
        .await
        .unwrap()
        .unwrap();
    let mut cursor: &[u8] = &account.data;
    T::deserialize(&mut cursor).unwrap()
}

pub async fn current_time(context: &mut ProgramTestContext) -> i64 {
    let clock: Clock = context.banks_client.get_sysvar().await.unwrap();
    clock.unix_timestamp
}

pub async fn advance_clock(context: &mut ProgramTestContext, seconds: i64) {
    let mut clock: Clock = context.banks_client.get_sysvar().await.unwrap();
    clock.unix_timestamp += seconds;
    context.set_sysvar(&clock);
}

pub async fn create_mint(context: &mut ProgramTestContext, decimals: u8) -> Pubkey {
    let mint = Keypair::new();
    let rent = context.banks_client.get_rent().await.unwrap();
    let instructions = [
        system_instruction::create_account(
            &context.payer.pubkey(),
            &mint.pubkey(),
            rent.minimum_balance(spl_token::state::Mint::LEN),
            spl_token::state::Mint::LEN as u64,
            &spl_token::id(),
        ),
        spl_token::instruction::initialize_mint(
            &spl_token::id(),
            &mint.pubkey(),
            &context.payer.pubkey(),
            None,
            decimals,
        )
        .unwrap(),
    ];
    send(context, &instructions, &[&mint]).await.unwrap();
    mint.pubkey()
}

pub async fn create_token_account(
    context: &mut ProgramTestContext,
    mint: &Pubkey,
    owner: &Pubkey,
) -> Pubkey {
    let account = Keypair::new();
    let rent = context.banks_client.get_rent().await.unwrap();
    let instructions = [
        system_instruction::create_account(
            &context.payer.pubkey(),
            &account.pubkey(),
            rent.minimum_balance(spl_token::state::Account::LEN),
            spl_token::state::Account::LEN as u64,
            &spl_token::id(),
        ),
        spl_token::instruction::initialize_account(
            &spl_token::id(),
            &account.pubkey(),
            mint,
            owner,
        )
        .unwrap(),
    ];
    send(context, &instructions, &[&account]).await.unwrap();
    account.pubkey()
}

pub async fn mint_to(
    context: &mut ProgramTestContext,
    mint: &Pubkey,
    destination: &Pubkey,
    amount: u64,
) {
    let authority = context.payer.pubkey();
    let instruction = spl_token::instruction::mint_to(
        &spl_token::id(),
        mint,
        destination,
        &authority,
        &[],
        amount,
    )
    .unwrap();
    send(context, &[instruction], &[]).await.unwrap();
}

pub async fn token_balance(context: &mut ProgramTestContext, address: &Pubkey) -> u64 {
    let account = context
        .banks_client
        .get_account(*address)
        .await
        .unwrap()
        .unwrap();
    spl_token::state::Account::unpack(&account.data).unwrap().amount
}

/// Initializes the four protocol accounts with the context payer as every
/// authority, and grants the payer the updater/manager roles.
pub async fn bootstrap_protocol(context: &mut ProgramTestContext, program_id: &Pubkey) {
    let payer = context.payer.pubkey();
    let instructions = [
        liquid::instruction::initialize_oracle(program_id, &payer),
        liquid::instruction::initialize_vault(program_id, &payer, "Liquid Share", "LQS"),
        liquid::instruction::initialize_cashier(program_id, &payer),
        liquid::instruction::initialize_splitter(program_id, &payer),
        liquid::instruction::set_price_updater(program_id, &payer, &payer, true),
        liquid::instruction::set_liquidity_manager(program_id, &payer, &payer, true),
        liquid::instruction::set_fee_manager(program_id, &payer, &payer, true),
        liquid::instruction::set_fee_split_manager(program_id, &payer, &payer, true),
    ];
    send(context, &instructions, &[]).await.unwrap();
}

/// Registers a mint with the oracle and creates the vault's token account
/// for it. Returns the vault token account address.
pub async fn register_asset(
    context: &mut ProgramTestContext,
    program_id: &Pubkey,
    mint: &Pubkey,
) -> Pubkey {
    let payer = context.payer.pubkey();
    let instruction = liquid::instruction::add_supported_asset(program_id, &payer, mint);
    send(context, &[instruction], &[]).await.unwrap();
    let (vault, _) = liquid::instruction::vault_pda(program_id);
    create_token_account(context, mint, &vault).await
}
