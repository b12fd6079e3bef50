//! Marketplace client capability.
//!
//! The resolver only sees [`Marketplace`]; the production implementation is
//! [`GalacticMarketplace`], which reads order accounts and builds exchange
//! transactions over Solana RPC.

mod exchange;
mod galactic;
mod order;

pub use exchange::{
    instruction_discriminator, process_exchange, unsigned_transaction, ExchangeAccounts,
};
pub use galactic::GalacticMarketplace;
pub use order::{account_discriminator, OrderAccount, ASSET_MINT_OFFSET, ORDER_ACCOUNT_LEN};

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;

/// Side of an order book entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// An open order as reported by the marketplace.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenOrder {
    /// Order account address.
    pub id: Pubkey,
    /// `price` scaled by the currency's decimals.
    pub ui_price: f64,
    /// Price per unit in currency base units.
    pub price: u64,
    pub side: OrderSide,
    pub initializer: Pubkey,
    pub currency_mint: Pubkey,
    pub asset_mint: Pubkey,
    pub initializer_currency_token_account: Pubkey,
    pub initializer_asset_token_account: Pubkey,
    pub origination_qty: u64,
    pub remaining_qty: u64,
    /// Unix seconds.
    pub created_at: i64,
}

/// Order book access and transaction construction.
#[async_trait]
pub trait Marketplace: Send + Sync {
    /// Open sell orders for `mint`, in the order the backend returns them.
    async fn open_orders_for_asset(&self, mint: &Pubkey) -> Result<Vec<OpenOrder>, crate::Error>;

    /// A single open order, `None` if it does not exist (or was filled).
    async fn open_order(&self, order_id: &Pubkey) -> Result<Option<OpenOrder>, crate::Error>;

    /// Unsigned transaction buying `quantity` units of `order` for `buyer`.
    async fn exchange_transaction(
        &self,
        order: &OpenOrder,
        buyer: &Pubkey,
        quantity: u64,
    ) -> Result<Transaction, crate::Error>;

    async fn health(&self) -> Result<(), crate::Error>;
}
