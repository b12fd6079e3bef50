//! Galactic Marketplace client over Solana RPC.

use async_trait::async_trait;
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use spl_token::solana_program::program_pack::Pack;
use spl_token::state::Mint;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, info};

use super::exchange::{registered_currency_address, sa_vault_from_registered_currency};
use super::{ExchangeAccounts, Marketplace, OpenOrder, OrderAccount};
use super::{ASSET_MINT_OFFSET, ORDER_ACCOUNT_LEN};
use crate::rpc::ChainRpc;

/// Marketplace client bound to one program and one RPC connection.
pub struct GalacticMarketplace {
    rpc: ChainRpc,
    program_id: Pubkey,
}

impl GalacticMarketplace {
    pub fn new(rpc: ChainRpc, program_id: &str) -> Result<Self, crate::Error> {
        let program_id = Pubkey::from_str(program_id)
            .map_err(|e| crate::Error::Config(format!("invalid program id: {e}")))?;
        info!(program = %program_id, rpc = rpc.url(), "Marketplace client ready");
        Ok(Self { rpc, program_id })
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    async fn currency_decimals(&self, mint: &Pubkey) -> Result<u8, crate::Error> {
        let account = self
            .rpc
            .account(mint)
            .await?
            .ok_or_else(|| crate::Error::Upstream(format!("currency mint {mint} not found")))?;
        Mint::unpack(&account.data)
            .map(|m| m.decimals)
            .map_err(|e| crate::Error::Upstream(format!("currency mint {mint} unreadable: {e}")))
    }

    async fn sa_vault(&self, currency_mint: &Pubkey) -> Result<Pubkey, crate::Error> {
        let address = registered_currency_address(&self.program_id, currency_mint);
        let account = self.rpc.account(&address).await?.ok_or_else(|| {
            crate::Error::Upstream(format!("currency {currency_mint} is not registered"))
        })?;
        sa_vault_from_registered_currency(&account.data).ok_or_else(|| {
            crate::Error::Upstream(format!("registered currency {address} unreadable"))
        })
    }
}

#[async_trait]
impl Marketplace for GalacticMarketplace {
    async fn open_orders_for_asset(&self, mint: &Pubkey) -> Result<Vec<OpenOrder>, crate::Error> {
        let filters = vec![
            RpcFilterType::DataSize(ORDER_ACCOUNT_LEN as u64),
            RpcFilterType::Memcmp(Memcmp::new_base58_encoded(
                ASSET_MINT_OFFSET,
                mint.as_ref(),
            )),
        ];
        let accounts = self.rpc.program_accounts(&self.program_id, filters).await?;

        // Orders for one asset almost always share a currency.
        let mut decimals: HashMap<Pubkey, u8> = HashMap::new();
        let mut orders = Vec::with_capacity(accounts.len());
        for (id, account) in accounts {
            let Some(order) = OrderAccount::decode(&account.data) else {
                debug!(account = %id, "Skipping undecodable order account");
                continue;
            };
            if !order.is_fillable() {
                continue;
            }
            let currency_decimals = match decimals.get(&order.currency_mint) {
                Some(d) => *d,
                None => {
                    let d = self.currency_decimals(&order.currency_mint).await?;
                    decimals.insert(order.currency_mint, d);
                    d
                }
            };
            orders.push(order.into_open_order(id, currency_decimals));
        }

        debug!(mint = %mint, orders = orders.len(), "Fetched open orders");
        Ok(orders)
    }

    async fn open_order(&self, order_id: &Pubkey) -> Result<Option<OpenOrder>, crate::Error> {
        let Some(account) = self.rpc.account(order_id).await? else {
            return Ok(None);
        };
        if account.owner != self.program_id {
            debug!(account = %order_id, owner = %account.owner, "Not a marketplace account");
            return Ok(None);
        }
        let Some(order) = OrderAccount::decode(&account.data) else {
            return Ok(None);
        };
        if !order.is_fillable() {
            debug!(account = %order_id, side = order.order_side, "Order cannot be bought");
            return Ok(None);
        }
        let currency_decimals = self.currency_decimals(&order.currency_mint).await?;
        Ok(Some(order.into_open_order(*order_id, currency_decimals)))
    }

    async fn exchange_transaction(
        &self,
        order: &OpenOrder,
        buyer: &Pubkey,
        quantity: u64,
    ) -> Result<Transaction, crate::Error> {
        let sa_vault = self.sa_vault(&order.currency_mint).await?;
        let accounts = ExchangeAccounts::for_sell_order(&self.program_id, order, buyer, sa_vault);
        let blockhash = self.rpc.latest_blockhash().await?;
        Ok(super::unsigned_transaction(
            &self.program_id,
            &accounts,
            quantity,
            order.price,
            blockhash,
        ))
    }

    async fn health(&self) -> Result<(), crate::Error> {
        self.rpc.health_check().await
    }
}
