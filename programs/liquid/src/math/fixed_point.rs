use solana_program::program_error::ProgramError;

use crate::error::LiquidError;

/// Share amounts use 9 decimal base units.
pub const SHARE_DECIMALS: u8 = 9;

/// Price-to-share quotes carry an implicit scale of
/// 10^(18 + SHARE_DECIMALS - asset_decimals), so that
/// `shares = amount * price / PRICE_PRECISION`.
pub const PRICE_PRECISION: u128 = 1_000_000_000_000_000_000;

/// Numerator for reciprocal (share-to-asset) price quotes: 1e36 / price.
pub const RECIPROCAL_PRECISION: u128 = PRICE_PRECISION * PRICE_PRECISION;

/// Fee rates and split ratios are expressed in basis points.
pub const BPS_DENOMINATOR: u64 = 10_000;

pub const SECONDS_PER_YEAR: i64 = 31_536_000;

/// `a * b / d`, truncating toward zero. Used for all view conversions.
pub fn mul_div_floor(a: u128, b: u128, d: u128) -> Result<u128, ProgramError> {
    if d == 0 {
        return Err(LiquidError::DivideByZero.into());
    }
    let product = a
        .checked_mul(b)
        .ok_or::<ProgramError>(LiquidError::ArithmeticOverflow.into())?;
    Ok(product / d)
}

/// `a * b / d`, rounding up. Used for all fee computations so rounding
/// dust accrues to the protocol, never leaks to the withdrawer.
pub fn mul_div_ceil(a: u128, b: u128, d: u128) -> Result<u128, ProgramError> {
    if d == 0 {
        return Err(LiquidError::DivideByZero.into());
    }
    let product = a
        .checked_mul(b)
        .ok_or::<ProgramError>(LiquidError::ArithmeticOverflow.into())?;
    let quotient = product / d;
    if product % d == 0 {
        Ok(quotient)
    } else {
        quotient
            .checked_add(1)
            .ok_or_else(|| LiquidError::ArithmeticOverflow.into())
    }
}

pub fn to_u64(value: u128) -> Result<u64, ProgramError> {
    u64::try_from(value).map_err(|_| LiquidError::ArithmeticOverflow.into())
}

/// Asset base units -> share base units at the given price-to-share quote.
pub fn asset_to_share(amount: u64, price_to_share: u128) -> Result<u64, ProgramError> {
    if price_to_share == 0 {
        return Err(LiquidError::ZeroPrice.into());
    }
    to_u64(mul_div_floor(amount as u128, price_to_share, PRICE_PRECISION)?)
}

/// Share base units -> asset base units at the given price-to-share quote.
pub fn share_to_asset(shares: u64, price_to_share: u128) -> Result<u64, ProgramError> {
    if price_to_share == 0 {
        return Err(LiquidError::ZeroPrice.into());
    }
    to_u64(mul_div_floor(shares as u128, PRICE_PRECISION, price_to_share)?)
}

/// Reciprocal of a price quote: converts a price-to-share quote into the
/// equivalent share-to-asset quote (and vice versa).
pub fn reciprocal_price(price: u128) -> Result<u128, ProgramError> {
    if price == 0 {
        return Err(LiquidError::ZeroPrice.into());
    }
    Ok(RECIPROCAL_PRECISION / price)
}
