use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::{
    error::LiquidError,
    math::fixed_point::{self, reciprocal_price},
};

pub const MAX_SUPPORTED_ASSETS: usize = 16;
pub const MAX_PRICE_UPDATERS: usize = 8;

/// Sentinel mint address for the synthetic standard asset. Its price slot
/// is always the last entry of the price array.
pub const STANDARD_ASSET: Pubkey = Pubkey::new_from_array([0xff; 32]);

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct AssetInfo {
    pub mint: Pubkey,
    pub decimals: u8,
}

/// Price oracle state. Supported assets form an ordered list; the price
/// array is kept aligned to that order with one trailing slot for the
/// standard asset. Prices are price-to-share quotes scaled by
/// 10^(18 + SHARE_DECIMALS - asset_decimals).
#[derive(BorshSerialize, BorshDeserialize, Debug)]
pub struct OracleState {
    pub is_initialized: bool,
    pub authority: Pubkey,
    pub price_updaters: Vec<Pubkey>,
    pub assets: Vec<AssetInfo>,
    /// assets.len() + 1 entries; last is the standard asset.
    pub prices: Vec<u128>,
    pub last_update_ts: i64,
    pub minimum_update_interval: i64,
    pub bump: u8,
}

impl OracleState {
    pub const DEFAULT_UPDATE_INTERVAL: i64 = 3_600;

    pub fn new(authority: Pubkey, bump: u8) -> Self {
        Self {
            is_initialized: true,
            authority,
            price_updaters: Vec::new(),
            assets: Vec::new(),
            prices: vec![0], // standard asset slot
            last_update_ts: 0,
            minimum_update_interval: Self::DEFAULT_UPDATE_INTERVAL,
            bump,
        }
    }

    pub fn calculate_size() -> usize {
        1 + 32
            + 4 + MAX_PRICE_UPDATERS * 32
            + 4 + MAX_SUPPORTED_ASSETS * (32 + 1)
            + 4 + (MAX_SUPPORTED_ASSETS + 1) * 16
            + 8 + 8 + 1
            + 64 // buffer
    }

    pub fn asset_index(&self, mint: &Pubkey) -> Option<usize> {
        self.assets.iter().position(|a| &a.mint == mint)
    }

    pub fn is_supported(&self, mint: &Pubkey) -> bool {
        self.asset_index(mint).is_some()
    }

    pub fn is_price_updater(&self, who: &Pubkey) -> bool {
        self.price_updaters.contains(who)
    }

    pub fn set_price_updater(&mut self, who: Pubkey, enabled: bool) -> Result<(), ProgramError> {
        if enabled {
            if !self.price_updaters.contains(&who) {
                if self.price_updaters.len() >= MAX_PRICE_UPDATERS {
                    return Err(LiquidError::TooManyRoleMembers.into());
                }
                self.price_updaters.push(who);
            }
        } else {
            self.price_updaters.retain(|u| u != &who);
        }
        Ok(())
    }

    /// Registers an asset at the end of the ordered list, inserting a zero
    /// price slot just before the standard asset. The asset cannot be
    /// converted until the next price update fills the slot.
    pub fn add_asset(&mut self, mint: Pubkey, decimals: u8) -> Result<(), ProgramError> {
        if mint == STANDARD_ASSET {
            return Err(LiquidError::AssetAlreadySupported.into());
        }
        if self.is_supported(&mint) {
            return Err(LiquidError::AssetAlreadySupported.into());
        }
        if self.assets.len() >= MAX_SUPPORTED_ASSETS {
            return Err(LiquidError::TooManyAssets.into());
        }
        self.assets.push(AssetInfo { mint, decimals });
        let standard_slot = self.prices.len() - 1;
        self.prices.insert(standard_slot, 0);
        Ok(())
    }

    pub fn remove_asset(&mut self, mint: &Pubkey) -> Result<(), ProgramError> {
        let index = self
            .asset_index(mint)
            .ok_or::<ProgramError>(LiquidError::AssetNotSupported.into())?;
        self.assets.remove(index);
        self.prices.remove(index);
        Ok(())
    }

    /// Atomically replaces all prices (supported assets + standard asset,
    /// in registration order), gated by the minimum update interval.
    pub fn update_prices(&mut self, prices: &[u128], now: i64) -> Result<(), ProgramError> {
        if prices.len() != self.assets.len() + 1 {
            return Err(LiquidError::InvalidInputLength.into());
        }
        if self.last_update_ts != 0 && now < self.last_update_ts + self.minimum_update_interval {
            return Err(LiquidError::UpdateTooFrequently.into());
        }
        if prices.iter().any(|p| *p == 0) {
            return Err(LiquidError::ZeroPrice.into());
        }
        self.prices.clear();
        self.prices.extend_from_slice(prices);
        self.last_update_ts = now;
        Ok(())
    }

    /// Price-to-share quote for a supported asset or the standard asset.
    pub fn asset_price_to_share(&self, mint: &Pubkey) -> Result<u128, ProgramError> {
        let index = if *mint == STANDARD_ASSET {
            self.prices.len() - 1
        } else {
            self.asset_index(mint)
                .ok_or::<ProgramError>(LiquidError::AssetNotSupported.into())?
        };
        Ok(self.prices[index])
    }

    /// Share-to-asset quote (reciprocal of the price-to-share quote).
    pub fn share_price_to_asset(&self, mint: &Pubkey) -> Result<u128, ProgramError> {
        reciprocal_price(self.asset_price_to_share(mint)?)
    }

    pub fn asset_to_share(&self, mint: &Pubkey, amount: u64) -> Result<u64, ProgramError> {
        fixed_point::asset_to_share(amount, self.asset_price_to_share(mint)?)
    }

    pub fn share_to_asset(&self, mint: &Pubkey, shares: u64) -> Result<u64, ProgramError> {
        fixed_point::share_to_asset(shares, self.asset_price_to_share(mint)?)
    }

    /// The share price in standard-asset terms (1e18 scale), the basis for
    /// entry prices and the high-water mark.
    pub fn share_standard_price(&self) -> Result<u128, ProgramError> {
        reciprocal_price(*self.prices.last().unwrap_or(&0))
    }

    pub fn supported_assets_num(&self) -> usize {
        self.assets.len()
    }

    pub fn share_prices_all(&self) -> Result<Vec<u128>, ProgramError> {
        self.prices.iter().map(|p| reciprocal_price(*p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(human_times_100: u128, asset_decimals: u32) -> u128 {
        human_times_100 * 10u128.pow(18 + 9 - asset_decimals) / 100
    }

    fn oracle_with_assets() -> (OracleState, Pubkey, Pubkey) {
        let mut oracle = OracleState::new(Pubkey::new_unique(), 255);
        let btc = Pubkey::new_unique();
        let usdc = Pubkey::new_unique();
        oracle.add_asset(btc, 8).unwrap();
        oracle.add_asset(usdc, 6).unwrap();
        (oracle, btc, usdc)
    }

    #[test]
    fn test_add_remove_asset() {
        let (mut oracle, btc, usdc) = oracle_with_assets();
        assert_eq!(oracle.supported_assets_num(), 2);
        assert_eq!(oracle.prices.len(), 3);
        assert_eq!(
            oracle.add_asset(btc, 8),
            Err(LiquidError::AssetAlreadySupported.into())
        );
        oracle.remove_asset(&btc).unwrap();
        assert_eq!(oracle.supported_assets_num(), 1);
        assert_eq!(oracle.prices.len(), 2);
        assert!(oracle.is_supported(&usdc));
        assert_eq!(
            oracle.remove_asset(&btc),
            Err(LiquidError::AssetNotSupported.into())
        );
    }

    #[test]
    fn test_update_prices_validation() {
        let (mut oracle, _, _) = oracle_with_assets();
        assert_eq!(
            oracle.update_prices(&[1, 1], 1000),
            Err(LiquidError::InvalidInputLength.into())
        );
        oracle.update_prices(&[1, 1, 1], 1000).unwrap();
        assert_eq!(
            oracle.update_prices(&[2, 2, 2], 1000 + 60),
            Err(LiquidError::UpdateTooFrequently.into())
        );
        oracle
            .update_prices(&[2, 2, 2], 1000 + oracle.minimum_update_interval)
            .unwrap();
        assert_eq!(
            oracle.update_prices(&[0, 1, 1], 20_000),
            Err(LiquidError::ZeroPrice.into())
        );
    }

    #[test]
    fn test_conversion_quotes() {
        let (mut oracle, btc, usdc) = oracle_with_assets();
        oracle
            .update_prices(
                &[quote(60_000_00, 8), quote(120, 6), quote(125, 9)],
                1000,
            )
            .unwrap();

        // 0.2 BTC -> 12000 shares
        assert_eq!(
            oracle.asset_to_share(&btc, 20_000_000).unwrap(),
            12_000_000_000_000
        );
        // 10000 USDC -> 12000 shares
        assert_eq!(
            oracle.asset_to_share(&usdc, 10_000_000_000).unwrap(),
            12_000_000_000_000
        );
        // Standard at 1.25 -> share standard price 0.8
        assert_eq!(
            oracle.share_standard_price().unwrap(),
            800_000_000_000_000_000
        );
    }

    #[test]
    fn test_unpriced_asset_rejected() {
        let (mut oracle, btc, _) = oracle_with_assets();
        assert_eq!(
            oracle.asset_to_share(&btc, 100),
            Err(LiquidError::ZeroPrice.into())
        );
        oracle
            .update_prices(&[quote(100, 8), quote(100, 6), quote(100, 9)], 1000)
            .unwrap();
        let late = Pubkey::new_unique();
        oracle.add_asset(late, 6).unwrap();
        // New slot is zero until the next update.
        assert_eq!(
            oracle.share_to_asset(&late, 100),
            Err(LiquidError::ZeroPrice.into())
        );
    }

    #[test]
    fn test_price_updater_role() {
        let (mut oracle, _, _) = oracle_with_assets();
        let updater = Pubkey::new_unique();
        assert!(!oracle.is_price_updater(&updater));
        oracle.set_price_updater(updater, true).unwrap();
        assert!(oracle.is_price_updater(&updater));
        oracle.set_price_updater(updater, false).unwrap();
        assert!(!oracle.is_price_updater(&updater));
    }
}
