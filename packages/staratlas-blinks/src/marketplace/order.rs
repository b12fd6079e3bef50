//! On-chain order account layout.

use borsh::BorshDeserialize;
use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;

use super::{OpenOrder, OrderSide};

/// Discriminator + 5 pubkeys + side + 4 words.
pub const ORDER_ACCOUNT_LEN: usize = 8 + 32 * 5 + 1 + 8 * 4;
/// Offset of `asset_mint`, used as a `memcmp` filter.
pub const ASSET_MINT_OFFSET: usize = 8 + 32 * 2;

const ORDER_SIDE_BUY: u8 = 0;
const ORDER_SIDE_SELL: u8 = 1;

/// Anchor account discriminator: first 8 bytes of `sha256("account:<Name>")`.
pub fn account_discriminator(name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("account:{name}").as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

/// Raw `OrderAccount` body (after the discriminator).
#[derive(Debug, Clone, PartialEq, BorshDeserialize)]
pub struct OrderAccount {
    pub order_initializer_pubkey: Pubkey,
    pub currency_mint: Pubkey,
    pub asset_mint: Pubkey,
    pub initializer_currency_token_account: Pubkey,
    pub initializer_asset_token_account: Pubkey,
    pub order_side: u8,
    pub price: u64,
    pub order_origination_qty: u64,
    pub order_remaining_qty: u64,
    pub created_at_timestamp: i64,
}

impl OrderAccount {
    /// Decode account data. `None` for anything that is not an order account.
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() < ORDER_ACCOUNT_LEN || data[..8] != account_discriminator("OrderAccount") {
            return None;
        }
        let mut body = &data[8..ORDER_ACCOUNT_LEN];
        let order = Self::deserialize(&mut body).ok()?;
        order.side().map(|_| order)
    }

    pub fn side(&self) -> Option<OrderSide> {
        match self.order_side {
            ORDER_SIDE_BUY => Some(OrderSide::Buy),
            ORDER_SIDE_SELL => Some(OrderSide::Sell),
            _ => None,
        }
    }

    /// A buyer can take this order: it is an ask with quantity left.
    pub fn is_fillable(&self) -> bool {
        self.side() == Some(OrderSide::Sell) && self.order_remaining_qty > 0
    }

    pub fn into_open_order(self, id: Pubkey, currency_decimals: u8) -> OpenOrder {
        OpenOrder {
            id,
            ui_price: ui_amount(self.price, currency_decimals),
            price: self.price,
            side: self.side().unwrap_or(OrderSide::Sell),
            initializer: self.order_initializer_pubkey,
            currency_mint: self.currency_mint,
            asset_mint: self.asset_mint,
            initializer_currency_token_account: self.initializer_currency_token_account,
            initializer_asset_token_account: self.initializer_asset_token_account,
            origination_qty: self.order_origination_qty,
            remaining_qty: self.order_remaining_qty,
            created_at: self.created_at_timestamp,
        }
    }
}

/// Base units -> display units.
pub fn ui_amount(amount: u64, decimals: u8) -> f64 {
    amount as f64 / 10f64.powi(decimals as i32)
}
