use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::{
    error::LiquidError,
    math::fees::{accrue_system_fees, calculate_fees, FeeBreakdown, FeeParams},
    math::fixed_point::BPS_DENOMINATOR,
    state::{oracle::OracleState, position::Position, splitter::FeeCategory},
};

pub const MAX_FEE_MANAGERS: usize = 8;

/// Parameter keys accepted by `SetParameter`, as camelCase strings. The
/// three ratio keys are forwarded to the fee splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKey {
    FeeRateManagement,
    FeeRatePerformance,
    FeeRateExit,
    FeeRateInstant,
    ThirdPartyRatio(FeeCategory),
    WithdrawPeriod,
}

impl ParameterKey {
    pub fn parse(key: &str) -> Result<Self, ProgramError> {
        match key {
            "feeRateManagement" => Ok(Self::FeeRateManagement),
            "feeRatePerformance" => Ok(Self::FeeRatePerformance),
            "feeRateExit" => Ok(Self::FeeRateExit),
            "feeRateInstant" => Ok(Self::FeeRateInstant),
            "thirdPartyRatioManagement" => Ok(Self::ThirdPartyRatio(FeeCategory::Management)),
            "thirdPartyRatioPerformance" => Ok(Self::ThirdPartyRatio(FeeCategory::Performance)),
            "thirdPartyRatioExit" => Ok(Self::ThirdPartyRatio(FeeCategory::Exit)),
            "withdrawPeriod" => Ok(Self::WithdrawPeriod),
            _ => Err(LiquidError::InvalidParameterKey.into()),
        }
    }
}

/// The accounting core: fee parameters, pause switch, and the system-wide
/// fee-collection bookkeeping (high-water mark + last collection time).
#[derive(BorshSerialize, BorshDeserialize, Debug)]
pub struct CashierState {
    pub is_initialized: bool,
    pub authority: Pubkey,
    pub fee_managers: Vec<Pubkey>,
    pub params: FeeParams,
    pub paused: bool,
    /// Share standard price (1e18) at the most recent fee collection; zero
    /// until the first collection records it.
    pub high_water_mark: u128,
    pub last_collect_ts: i64,
    pub bump: u8,
}

impl CashierState {
    pub fn new(authority: Pubkey, now: i64, bump: u8) -> Self {
        Self {
            is_initialized: true,
            authority,
            fee_managers: Vec::new(),
            params: FeeParams::default(),
            paused: false,
            high_water_mark: 0,
            last_collect_ts: now,
            bump,
        }
    }

    pub fn calculate_size() -> usize {
        1 + 32 + 4 + MAX_FEE_MANAGERS * 32 + (8 * 4 + 8) + 1 + 16 + 8 + 1 + 64
    }

    pub fn is_fee_manager(&self, who: &Pubkey) -> bool {
        self.fee_managers.contains(who)
    }

    pub fn set_fee_manager(&mut self, who: Pubkey, enabled: bool) -> Result<(), ProgramError> {
        if enabled {
            if !self.fee_managers.contains(&who) {
                if self.fee_managers.len() >= MAX_FEE_MANAGERS {
                    return Err(LiquidError::TooManyRoleMembers.into());
                }
                self.fee_managers.push(who);
            }
        } else {
            self.fee_managers.retain(|m| m != &who);
        }
        Ok(())
    }

    /// Applies a cashier-owned parameter. Ratio keys are handled by the
    /// splitter and rejected here.
    pub fn set_parameter(&mut self, key: ParameterKey, value: u64) -> Result<(), ProgramError> {
        let rate_capped = |v: u64| -> Result<u64, ProgramError> {
            if v > BPS_DENOMINATOR {
                Err(LiquidError::InvalidRatio.into())
            } else {
                Ok(v)
            }
        };
        match key {
            ParameterKey::FeeRateManagement => {
                self.params.fee_rate_management = rate_capped(value)?
            }
            ParameterKey::FeeRatePerformance => {
                self.params.fee_rate_performance = rate_capped(value)?
            }
            ParameterKey::FeeRateExit => self.params.fee_rate_exit = rate_capped(value)?,
            ParameterKey::FeeRateInstant => self.params.fee_rate_instant = rate_capped(value)?,
            ParameterKey::WithdrawPeriod => {
                self.params.withdraw_period =
                    i64::try_from(value).map_err(|_| LiquidError::ArithmeticOverflow)?
            }
            ParameterKey::ThirdPartyRatio(_) => {
                return Err(LiquidError::InvalidParameterKey.into())
            }
        }
        Ok(())
    }

    /// Fee breakdown for a holder withdrawing `gross` asset units now.
    /// The mutating handlers call exactly this, so previews are
    /// bit-identical to execution.
    pub fn calculate_holder_fees(
        &self,
        gross: u64,
        position: &Position,
        now: i64,
        current_standard_price: u128,
        is_instant: bool,
    ) -> Result<FeeBreakdown, ProgramError> {
        calculate_fees(
            gross,
            position.entry_ts,
            position.entry_standard_price,
            now,
            current_standard_price,
            &self.params,
            is_instant,
        )
    }

    /// System-wide accrual for `CollectFees`: (management, performance)
    /// fee shares to mint.
    pub fn accrue_collect_fees(
        &self,
        total_supply: u64,
        now: i64,
        current_standard_price: u128,
    ) -> Result<(u64, u64), ProgramError> {
        accrue_system_fees(
            total_supply,
            self.last_collect_ts,
            now,
            self.high_water_mark,
            current_standard_price,
            &self.params,
        )
    }
}

/// Preview of a withdrawal request: `(gross, fees, net)` in target-asset
/// base units. Identical arithmetic to the mutating path.
pub fn preview_request_withdraw(
    oracle: &OracleState,
    cashier: &CashierState,
    position: &Position,
    asset_mint: &Pubkey,
    shares: u64,
    now: i64,
    is_instant: bool,
) -> Result<(u64, FeeBreakdown, u64), ProgramError> {
    if shares == 0 {
        return Err(LiquidError::ZeroAmount.into());
    }
    if shares > position.shares {
        return Err(LiquidError::InsufficientShares.into());
    }
    let gross = oracle.share_to_asset(asset_mint, shares)?;
    let fees = cashier.calculate_holder_fees(
        gross,
        position,
        now,
        oracle.share_standard_price()?,
        is_instant,
    )?;
    let net = gross
        .checked_sub(fees.total()?)
        .ok_or::<ProgramError>(LiquidError::InsufficientLiquidity.into())?;
    Ok((gross, fees, net))
}

/// Shares a deposit of `amount` asset units would mint right now.
pub fn preview_deposit(
    oracle: &OracleState,
    asset_mint: &Pubkey,
    amount: u64,
) -> Result<u64, ProgramError> {
    if amount == 0 {
        return Err(LiquidError::ZeroAmount.into());
    }
    oracle.asset_to_share(asset_mint, amount)
}

/// Outcome of completing the pending withdrawal at time `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompleteOutcome {
    /// Waiting period not yet elapsed.
    StillPending,
    /// Target asset was removed; the escrowed shares are refunded.
    RefundShares(u64),
    /// Net asset amount to pay out.
    Payout(u64),
}

pub fn preview_complete_withdraw(
    oracle: &OracleState,
    cashier: &CashierState,
    position: &Position,
    now: i64,
) -> Result<CompleteOutcome, ProgramError> {
    let pending = position
        .pending
        .as_ref()
        .ok_or::<ProgramError>(LiquidError::NoPendingWithdrawal.into())?;
    if now < pending.request_ts + cashier.params.withdraw_period {
        return Ok(CompleteOutcome::StillPending);
    }
    if !oracle.is_supported(&pending.asset_mint) {
        return Ok(CompleteOutcome::RefundShares(pending.shares));
    }
    Ok(CompleteOutcome::Payout(pending.net_amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::position::PendingWithdrawal;

    const DAY: i64 = 86_400;

    #[test]
    fn test_parameter_key_parsing() {
        assert_eq!(
            ParameterKey::parse("feeRateManagement").unwrap(),
            ParameterKey::FeeRateManagement
        );
        assert_eq!(
            ParameterKey::parse("thirdPartyRatioPerformance").unwrap(),
            ParameterKey::ThirdPartyRatio(FeeCategory::Performance)
        );
        assert_eq!(
            ParameterKey::parse("withdrawPeriod").unwrap(),
            ParameterKey::WithdrawPeriod
        );
        assert_eq!(
            ParameterKey::parse("feeRate"),
            Err(LiquidError::InvalidParameterKey.into())
        );
    }

    #[test]
    fn test_set_parameter() {
        let mut cashier = CashierState::new(Pubkey::new_unique(), 0, 255);
        cashier
            .set_parameter(ParameterKey::FeeRateManagement, 400)
            .unwrap();
        cashier
            .set_parameter(ParameterKey::WithdrawPeriod, 3 * 86_400)
            .unwrap();
        assert_eq!(cashier.params.fee_rate_management, 400);
        assert_eq!(cashier.params.withdraw_period, 3 * 86_400);
        assert_eq!(
            cashier.set_parameter(ParameterKey::FeeRateExit, 10_001),
            Err(LiquidError::InvalidRatio.into())
        );
    }

    #[test]
    fn test_fee_manager_role() {
        let mut cashier = CashierState::new(Pubkey::new_unique(), 0, 255);
        let manager = Pubkey::new_unique();
        cashier.set_fee_manager(manager, true).unwrap();
        assert!(cashier.is_fee_manager(&manager));
        cashier.set_fee_manager(manager, false).unwrap();
        assert!(!cashier.is_fee_manager(&manager));
    }

    fn oracle_with_priced_usdc() -> (OracleState, Pubkey) {
        let mut oracle = OracleState::new(Pubkey::new_unique(), 255);
        let usdc = Pubkey::new_unique();
        oracle.add_asset(usdc, 6).unwrap();
        oracle
            .update_prices(
                &[
                    800_000_000_000_000_000_000, // 0.8 @ 10^(18+9-6)
                    800_000_000_000_000_000,     // standard 0.8
                ],
                60 * DAY,
            )
            .unwrap();
        (oracle, usdc)
    }

    // Full breakdown for a 20000-share withdrawal against a priced oracle.
    #[test]
    fn test_preview_request_withdraw_fixture() {
        let (oracle, usdc) = oracle_with_priced_usdc();
        let cashier = CashierState::new(Pubkey::new_unique(), 0, 255);
        let mut position = Position::new(Pubkey::new_unique(), 254);
        position.shares = 96_000_000_000_000;
        position.entry_ts = 15 * DAY;
        position.entry_standard_price = 950_000_000_000_000_000;

        let (gross, fees, net) = preview_request_withdraw(
            &oracle,
            &cashier,
            &position,
            &usdc,
            20_000_000_000_000,
            60 * DAY,
            false,
        )
        .unwrap();
        assert_eq!(gross, 25_000_000_000);
        assert_eq!(fees.management, 61_643_836);
        assert_eq!(fees.performance, 1_200_000_000);
        assert_eq!(fees.exit, 250_000_000);
        assert_eq!(net, 25_000_000_000 - 1_511_643_836);
    }

    #[test]
    fn test_preview_request_withdraw_bounds() {
        let (oracle, usdc) = oracle_with_priced_usdc();
        let cashier = CashierState::new(Pubkey::new_unique(), 0, 255);
        let mut position = Position::new(Pubkey::new_unique(), 254);
        position.shares = 100;
        assert_eq!(
            preview_request_withdraw(&oracle, &cashier, &position, &usdc, 101, 0, false),
            Err(LiquidError::InsufficientShares.into())
        );
        assert_eq!(
            preview_request_withdraw(&oracle, &cashier, &position, &usdc, 0, 0, false),
            Err(LiquidError::ZeroAmount.into())
        );
    }

    #[test]
    fn test_preview_complete_withdraw_paths() {
        let (oracle, usdc) = oracle_with_priced_usdc();
        let cashier = CashierState::new(Pubkey::new_unique(), 0, 255);
        let mut position = Position::new(Pubkey::new_unique(), 254);
        assert_eq!(
            preview_complete_withdraw(&oracle, &cashier, &position, 0),
            Err(LiquidError::NoPendingWithdrawal.into())
        );

        position.pending = Some(PendingWithdrawal {
            shares: 2_000_000_000_000,
            request_ts: 0,
            asset_mint: usdc,
            net_amount: 999,
            fee_management: 1,
            fee_performance: 2,
            fee_exit: 3,
        });
        let period = cashier.params.withdraw_period;
        assert_eq!(
            preview_complete_withdraw(&oracle, &cashier, &position, period - 1).unwrap(),
            CompleteOutcome::StillPending
        );
        assert_eq!(
            preview_complete_withdraw(&oracle, &cashier, &position, period).unwrap(),
            CompleteOutcome::Payout(999)
        );

        // Asset removed mid-flight: refund, not an error.
        let mut gone = OracleState::new(Pubkey::new_unique(), 255);
        gone.add_asset(Pubkey::new_unique(), 6).unwrap();
        assert_eq!(
            preview_complete_withdraw(&gone, &cashier, &position, period).unwrap(),
            CompleteOutcome::RefundShares(2_000_000_000_000)
        );
    }
}
