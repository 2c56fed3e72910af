pub mod cashier;
pub mod oracle;
pub mod position;
pub mod splitter;
pub mod vault;

pub use cashier::*;
pub use oracle::*;
pub use position::*;
pub use splitter::*;
pub use vault::*;

/// PDA seeds for the four singleton state accounts and the per-holder
/// position accounts.
pub const ORACLE_SEED: &[u8] = b"oracle";
pub const VAULT_SEED: &[u8] = b"vault";
pub const CASHIER_SEED: &[u8] = b"cashier";
pub const SPLITTER_SEED: &[u8] = b"splitter";
pub const POSITION_SEED: &[u8] = b"position";
