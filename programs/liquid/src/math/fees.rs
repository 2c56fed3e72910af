use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::program_error::ProgramError;

use crate::math::fixed_point::{
    mul_div_ceil, BPS_DENOMINATOR, SECONDS_PER_YEAR,
};

/// Fee configuration, all rates in basis points.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct FeeParams {
    /// Annualized management fee.
    pub fee_rate_management: u64,
    /// Charged on appreciation above the holder's entry price.
    pub fee_rate_performance: u64,
    /// Flat rate on gross value for queued withdrawals.
    pub fee_rate_exit: u64,
    /// Flat rate on gross value for the instant path.
    pub fee_rate_instant: u64,
    /// Seconds a queued withdrawal must wait before completion.
    pub withdraw_period: i64,
}

impl Default for FeeParams {
    fn default() -> Self {
        Self {
            fee_rate_management: 200,   // 2% / year
            fee_rate_performance: 2000, // 20%
            fee_rate_exit: 100,         // 1%
            fee_rate_instant: 500,      // 5%
            withdraw_period: 7 * 86_400,
        }
    }
}

/// Per-category fee amounts for a single withdrawal, in asset base units.
/// The exit slot holds the instant-exit fee on the instant path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeBreakdown {
    pub management: u64,
    pub performance: u64,
    pub exit: u64,
}

impl FeeBreakdown {
    pub fn total(&self) -> Result<u64, ProgramError> {
        self.management
            .checked_add(self.performance)
            .and_then(|t| t.checked_add(self.exit))
            .ok_or_else(|| crate::error::LiquidError::ArithmeticOverflow.into())
    }
}

/// Fee breakdown for withdrawing a gross asset value.
///
/// The management fee pro-rates the annual rate over the time since the
/// holder's weighted entry timestamp. The performance fee applies only to
/// the share of value attributable to appreciation of the share's standard
/// price above the holder's weighted entry price, measured against the
/// *current* price (`(p - e) / p` of gross). The exit (or instant) fee is
/// flat on gross. All three round up.
pub fn calculate_fees(
    gross: u64,
    entry_ts: i64,
    entry_standard_price: u128,
    now: i64,
    current_standard_price: u128,
    params: &FeeParams,
    is_instant: bool,
) -> Result<FeeBreakdown, ProgramError> {
    let elapsed = now.saturating_sub(entry_ts).max(0) as u128;
    let management = mul_div_ceil(
        gross as u128,
        (params.fee_rate_management as u128).saturating_mul(elapsed),
        (BPS_DENOMINATOR as u128).saturating_mul(SECONDS_PER_YEAR as u128),
    )?;

    let performance = if current_standard_price > entry_standard_price {
        let appreciation = current_standard_price - entry_standard_price;
        mul_div_ceil(
            (gross as u128).checked_mul(appreciation).ok_or_else(|| {
                ProgramError::from(crate::error::LiquidError::ArithmeticOverflow)
            })?,
            params.fee_rate_performance as u128,
            current_standard_price.saturating_mul(BPS_DENOMINATOR as u128),
        )?
    } else {
        0
    };

    let flat_rate = if is_instant {
        params.fee_rate_instant
    } else {
        params.fee_rate_exit
    };
    let exit = mul_div_ceil(gross as u128, flat_rate as u128, BPS_DENOMINATOR as u128)?;

    Ok(FeeBreakdown {
        management: crate::math::fixed_point::to_u64(management)?,
        performance: crate::math::fixed_point::to_u64(performance)?,
        exit: crate::math::fixed_point::to_u64(exit)?,
    })
}

/// System-wide fee accrual for `CollectFees`, in share base units:
/// management pro-rated on total supply since the last collection, and
/// performance on supply appreciation above the stored high-water mark.
///
/// Unlike the per-holder path, appreciation here is measured against the
/// *high-water mark* (`(p - hwm) / hwm`), so the two paths are distinct on
/// purpose. Returns `(management_shares, performance_shares)`.
pub fn accrue_system_fees(
    total_supply: u64,
    last_collect_ts: i64,
    now: i64,
    high_water_mark: u128,
    current_standard_price: u128,
    params: &FeeParams,
) -> Result<(u64, u64), ProgramError> {
    let elapsed = now.saturating_sub(last_collect_ts).max(0) as u128;
    let management = mul_div_ceil(
        total_supply as u128,
        (params.fee_rate_management as u128).saturating_mul(elapsed),
        (BPS_DENOMINATOR as u128).saturating_mul(SECONDS_PER_YEAR as u128),
    )?;

    let performance = if high_water_mark > 0 && current_standard_price > high_water_mark {
        let appreciation = current_standard_price - high_water_mark;
        mul_div_ceil(
            (total_supply as u128).checked_mul(appreciation).ok_or_else(|| {
                ProgramError::from(crate::error::LiquidError::ArithmeticOverflow)
            })?,
            params.fee_rate_performance as u128,
            high_water_mark.saturating_mul(BPS_DENOMINATOR as u128),
        )?
    } else {
        0
    };

    Ok((
        crate::math::fixed_point::to_u64(management)?,
        crate::math::fixed_point::to_u64(performance)?,
    ))
}
