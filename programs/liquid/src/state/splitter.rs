use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::{error::LiquidError, math::fixed_point::BPS_DENOMINATOR};

pub const MAX_SPLIT_MANAGERS: usize = 8;

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeCategory {
    Management,
    Performance,
    Exit,
}

/// Distributes collected fees between a default receiver and a third-party
/// receiver by a per-category basis-point ratio. Only the cashier fee paths
/// consult it.
#[derive(BorshSerialize, BorshDeserialize, Debug)]
pub struct SplitterState {
    pub is_initialized: bool,
    pub authority: Pubkey,
    pub split_managers: Vec<Pubkey>,
    pub default_receiver: Pubkey,
    pub third_party_receiver: Pubkey,
    pub third_party_ratio_management: u64,
    pub third_party_ratio_performance: u64,
    pub third_party_ratio_exit: u64,
    pub bump: u8,
}

impl SplitterState {
    pub fn new(authority: Pubkey, bump: u8) -> Self {
        Self {
            is_initialized: true,
            authority,
            split_managers: Vec::new(),
            default_receiver: Pubkey::default(),
            third_party_receiver: Pubkey::default(),
            third_party_ratio_management: 0,
            third_party_ratio_performance: 0,
            third_party_ratio_exit: 0,
            bump,
        }
    }

    pub fn calculate_size() -> usize {
        1 + 32 + 4 + MAX_SPLIT_MANAGERS * 32 + 32 + 32 + 8 + 8 + 8 + 1 + 32
    }

    pub fn is_split_manager(&self, who: &Pubkey) -> bool {
        self.split_managers.contains(who)
    }

    pub fn set_split_manager(&mut self, who: Pubkey, enabled: bool) -> Result<(), ProgramError> {
        if enabled {
            if !self.split_managers.contains(&who) {
                if self.split_managers.len() >= MAX_SPLIT_MANAGERS {
                    return Err(LiquidError::TooManyRoleMembers.into());
                }
                self.split_managers.push(who);
            }
        } else {
            self.split_managers.retain(|m| m != &who);
        }
        Ok(())
    }

    pub fn ratio(&self, category: FeeCategory) -> u64 {
        match category {
            FeeCategory::Management => self.third_party_ratio_management,
            FeeCategory::Performance => self.third_party_ratio_performance,
            FeeCategory::Exit => self.third_party_ratio_exit,
        }
    }

    pub fn set_ratio(&mut self, category: FeeCategory, ratio: u64) -> Result<(), ProgramError> {
        if ratio > BPS_DENOMINATOR {
            return Err(LiquidError::InvalidRatio.into());
        }
        match category {
            FeeCategory::Management => self.third_party_ratio_management = ratio,
            FeeCategory::Performance => self.third_party_ratio_performance = ratio,
            FeeCategory::Exit => self.third_party_ratio_exit = ratio,
        }
        Ok(())
    }

    /// Splits a fee amount: the third party takes `ratio/10000` rounded
    /// down, the default receiver the remainder.
    pub fn split(&self, category: FeeCategory, amount: u64) -> (u64, u64) {
        let third = ((amount as u128) * self.ratio(category) as u128
            / BPS_DENOMINATOR as u128) as u64;
        (amount - third, third)
    }
}
