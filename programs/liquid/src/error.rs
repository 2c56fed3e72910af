use num_derive::FromPrimitive;
use solana_program::{
    decode_error::DecodeError,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, FromPrimitive, PartialEq)]
pub enum LiquidError {
    #[error("Invalid instruction")]
    InvalidInstruction = 0,

    #[error("Invalid account data")]
    InvalidAccountData = 1,

    #[error("Invalid PDA")]
    InvalidPda = 2,

    #[error("Already initialized")]
    AlreadyInitialized = 3,

    #[error("Not initialized")]
    NotInitialized = 4,

    #[error("Invalid authority")]
    InvalidAuthority = 5,

    #[error("Caller lacks the required role")]
    UnauthorizedRole = 6,

    #[error("Asset already supported")]
    AssetAlreadySupported = 7,

    #[error("Asset not supported")]
    AssetNotSupported = 8,

    #[error("Too many supported assets")]
    TooManyAssets = 9,

    #[error("Invalid input length")]
    InvalidInputLength = 10,

    #[error("Price updated too frequently")]
    UpdateTooFrequently = 11,

    #[error("Price must be nonzero")]
    ZeroPrice = 12,

    #[error("Amount must be nonzero")]
    ZeroAmount = 13,

    #[error("Invalid parameter key")]
    InvalidParameterKey = 14,

    #[error("Withdrawal already pending")]
    WithdrawalAlreadyPending = 15,

    #[error("Withdrawal still pending")]
    WithdrawalStillPending = 16,

    #[error("No pending withdrawal")]
    NoPendingWithdrawal = 17,

    #[error("Insufficient share balance")]
    InsufficientShares = 18,

    #[error("Insufficient vault liquidity")]
    InsufficientLiquidity = 19,

    #[error("Protocol is paused")]
    ProtocolPaused = 20,

    #[error("Protocol is not paused")]
    NotPaused = 21,

    #[error("Strategy not matched")]
    StrategyNotMatched = 22,

    #[error("Call data length mismatch")]
    LengthMismatch = 23,

    #[error("Invalid strategy index")]
    InvalidStrategyIndex = 24,

    #[error("Too many strategies")]
    TooManyStrategies = 25,

    #[error("Ratio exceeds 10000 basis points")]
    InvalidRatio = 26,

    #[error("Fee receiver not configured")]
    ReceiverNotConfigured = 27,

    #[error("Invalid token account")]
    InvalidTokenAccount = 28,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow = 29,

    #[error("Divide by zero")]
    DivideByZero = 30,

    #[error("Too many role members")]
    TooManyRoleMembers = 31,

    #[error("Cannot transfer shares to self")]
    SelfTransfer = 32,
}

impl PrintProgramError for LiquidError {
    fn print<E>(&self) {
        use solana_program::msg;
        msg!("LiquidError: {}", self);
    }
}

impl From<LiquidError> for ProgramError {
    fn from(e: LiquidError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for LiquidError {
    fn type_of() -> &'static str {
        "LiquidError"
    }
}
