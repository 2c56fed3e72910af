use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::error::LiquidError;

/// Single-slot pending withdrawal record. At most one per holder; a new
/// request is rejected while this slot is occupied.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct PendingWithdrawal {
    /// Shares escrowed (already burned from the holder's balance).
    pub shares: u64,
    pub request_ts: i64,
    /// Target asset mint chosen at request time.
    pub asset_mint: Pubkey,
    /// Asset amount owed after fees.
    pub net_amount: u64,
    pub fee_management: u64,
    pub fee_performance: u64,
    pub fee_exit: u64,
}

/// Per-holder record: share balance plus the weighted deposit bookkeeping
/// the cashier charges fees against.
#[derive(BorshSerialize, BorshDeserialize, Debug)]
pub struct Position {
    pub is_initialized: bool,
    pub holder: Pubkey,
    pub shares: u64,
    /// Share-weighted average deposit timestamp.
    pub entry_ts: i64,
    /// Share-weighted average entry share price in standard-asset terms
    /// (1e18 scale).
    pub entry_standard_price: u128,
    pub pending: Option<PendingWithdrawal>,
    pub bump: u8,
}

impl Position {
    // bool + pubkey + u64 + i64 + u128 + Option<PendingWithdrawal> + bump
    pub const LEN: usize = 1 + 32 + 8 + 8 + 16 + 1 + (8 + 8 + 32 + 8 + 8 + 8 + 8) + 1;

    pub fn new(holder: Pubkey, bump: u8) -> Self {
        Self {
            is_initialized: true,
            holder,
            shares: 0,
            entry_ts: 0,
            entry_standard_price: 0,
            pending: None,
            bump,
        }
    }

    /// Folds a new deposit into the weighted entry bookkeeping and credits
    /// the shares.
    pub fn merge_deposit(
        &mut self,
        new_shares: u64,
        now: i64,
        standard_price: u128,
    ) -> Result<(), ProgramError> {
        let (entry_ts, entry_price) = merge_entry(
            self.shares,
            self.entry_ts,
            self.entry_standard_price,
            new_shares,
            now,
            standard_price,
        )?;
        self.entry_ts = entry_ts;
        self.entry_standard_price = entry_price;
        self.shares = self
            .shares
            .checked_add(new_shares)
            .ok_or::<ProgramError>(LiquidError::ArithmeticOverflow.into())?;
        Ok(())
    }

    pub fn debit_shares(&mut self, shares: u64) -> Result<(), ProgramError> {
        if shares > self.shares {
            return Err(LiquidError::InsufficientShares.into());
        }
        self.shares -= shares;
        Ok(())
    }

    pub fn credit_shares(&mut self, shares: u64) -> Result<(), ProgramError> {
        self.shares = self
            .shares
            .checked_add(shares)
            .ok_or::<ProgramError>(LiquidError::ArithmeticOverflow.into())?;
        Ok(())
    }
}

/// Share-weighted merge of (timestamp, entry price) pairs:
/// `merged = (s_old * v_old + s_new * v_new) / (s_old + s_new)`, floor.
/// An empty position adopts the new values directly.
pub fn merge_entry(
    old_shares: u64,
    old_ts: i64,
    old_price: u128,
    new_shares: u64,
    now: i64,
    price: u128,
) -> Result<(i64, u128), ProgramError> {
    if new_shares == 0 {
        return Err(LiquidError::ZeroAmount.into());
    }
    if old_shares == 0 {
        return Ok((now, price));
    }
    let total = (old_shares as u128)
        .checked_add(new_shares as u128)
        .ok_or::<ProgramError>(LiquidError::ArithmeticOverflow.into())?;

    let weighted_ts = (old_shares as u128)
        .checked_mul(old_ts as u128)
        .and_then(|a| (new_shares as u128).checked_mul(now as u128).map(|b| (a, b)))
        .and_then(|(a, b)| a.checked_add(b))
        .ok_or::<ProgramError>(LiquidError::ArithmeticOverflow.into())?
        / total;

    let weighted_price = (old_shares as u128)
        .checked_mul(old_price)
        .and_then(|a| (new_shares as u128).checked_mul(price).map(|b| (a, b)))
        .and_then(|(a, b)| a.checked_add(b))
        .ok_or::<ProgramError>(LiquidError::ArithmeticOverflow.into())?
        / total;

    Ok((weighted_ts as i64, weighted_price))
}
