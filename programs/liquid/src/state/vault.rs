use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::error::LiquidError;

// Sized so the account stays under the 10 KiB cap on CPI-created accounts.
pub const MAX_STRATEGIES: usize = 8;
pub const MAX_LIQUIDITY_MANAGERS: usize = 8;
pub const MAX_CALL_DATA_LEN: usize = 64;
pub const MAX_DESCRIPTION_LEN: usize = 128;

/// Allow-listed call shape for strategy execution: forwarded call data must
/// agree with `pattern` at every byte position where `mask` has bits set.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct Strategy {
    /// Program the approved call is forwarded to.
    pub target: Pubkey,
    pub mask: Vec<u8>,
    pub pattern: Vec<u8>,
    pub description: String,
}

impl Strategy {
    pub fn new(
        target: Pubkey,
        mask: Vec<u8>,
        pattern: Vec<u8>,
        description: String,
    ) -> Result<Self, ProgramError> {
        if mask.len() != pattern.len() {
            return Err(LiquidError::LengthMismatch.into());
        }
        if mask.len() > MAX_CALL_DATA_LEN || description.len() > MAX_DESCRIPTION_LEN {
            return Err(LiquidError::InvalidInputLength.into());
        }
        Ok(Self {
            target,
            mask,
            pattern,
            description,
        })
    }

    /// Bitwise allow-list check over the full call data:
    /// `data & mask == pattern & mask`, byte for byte.
    pub fn matches(&self, call_data: &[u8]) -> Result<(), ProgramError> {
        if call_data.len() != self.mask.len() {
            return Err(LiquidError::LengthMismatch.into());
        }
        for ((data, mask), pattern) in call_data.iter().zip(&self.mask).zip(&self.pattern) {
            if data & mask != pattern & mask {
                return Err(LiquidError::StrategyNotMatched.into());
            }
        }
        Ok(())
    }
}

/// Share ledger and strategy runner. Balances live in per-holder Position
/// accounts; this account tracks the total supply and the strategy
/// allow-list. Only cashier handlers mint and burn.
#[derive(BorshSerialize, BorshDeserialize, Debug)]
pub struct VaultState {
    pub is_initialized: bool,
    pub authority: Pubkey,
    pub share_name: String,
    pub share_symbol: String,
    pub total_supply: u64,
    pub liquidity_managers: Vec<Pubkey>,
    pub strategies: Vec<Strategy>,
    pub bump: u8,
}

impl VaultState {
    pub fn new(authority: Pubkey, share_name: String, share_symbol: String, bump: u8) -> Self {
        Self {
            is_initialized: true,
            authority,
            share_name,
            share_symbol,
            total_supply: 0,
            liquidity_managers: Vec::new(),
            strategies: Vec::new(),
            bump,
        }
    }

    pub fn calculate_size() -> usize {
        let strategy_size = 32
            + 4 + MAX_CALL_DATA_LEN
            + 4 + MAX_CALL_DATA_LEN
            + 4 + MAX_DESCRIPTION_LEN;
        1 + 32
            + 4 + 64 // name
            + 4 + 16 // symbol
            + 8
            + 4 + MAX_LIQUIDITY_MANAGERS * 32
            + 4 + MAX_STRATEGIES * strategy_size
            + 1
            + 128 // buffer
    }

    pub fn is_liquidity_manager(&self, who: &Pubkey) -> bool {
        self.liquidity_managers.contains(who)
    }

    pub fn set_liquidity_manager(
        &mut self,
        who: Pubkey,
        enabled: bool,
    ) -> Result<(), ProgramError> {
        if enabled {
            if !self.liquidity_managers.contains(&who) {
                if self.liquidity_managers.len() >= MAX_LIQUIDITY_MANAGERS {
                    return Err(LiquidError::TooManyRoleMembers.into());
                }
                self.liquidity_managers.push(who);
            }
        } else {
            self.liquidity_managers.retain(|m| m != &who);
        }
        Ok(())
    }

    pub fn add_strategy(&mut self, strategy: Strategy) -> Result<usize, ProgramError> {
        if self.strategies.len() >= MAX_STRATEGIES {
            return Err(LiquidError::TooManyStrategies.into());
        }
        self.strategies.push(strategy);
        Ok(self.strategies.len() - 1)
    }

    pub fn remove_strategy(&mut self, index: usize) -> Result<(), ProgramError> {
        if index >= self.strategies.len() {
            return Err(LiquidError::InvalidStrategyIndex.into());
        }
        self.strategies.remove(index);
        Ok(())
    }

    pub fn strategy(&self, index: usize) -> Result<&Strategy, ProgramError> {
        self.strategies
            .get(index)
            .ok_or_else(|| LiquidError::InvalidStrategyIndex.into())
    }

    pub fn mint(&mut self, shares: u64) -> Result<(), ProgramError> {
        self.total_supply = self
            .total_supply
            .checked_add(shares)
            .ok_or::<ProgramError>(LiquidError::ArithmeticOverflow.into())?;
        Ok(())
    }

    pub fn burn(&mut self, shares: u64) -> Result<(), ProgramError> {
        self.total_supply = self
            .total_supply
            .checked_sub(shares)
            .ok_or::<ProgramError>(LiquidError::InsufficientShares.into())?;
        Ok(())
    }
}
