//! Action resolution: discover → findOrders → buy.
//!
//! Every call is self-contained. The Actions client invokes each stage as
//! an independent HTTP request, so all inputs are re-validated each time
//! and nothing is remembered between stages.

use base64::prelude::{Engine as _, BASE64_STANDARD};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::actions::{
    ActionGetResponse, ActionLinks, ActionParameter, ActionPostRequest, ActionPostResponse,
    ActionQuery, LinkedAction, ACTION_TYPE,
};
use crate::catalog::{normalize, NftCatalog};
use crate::marketplace::{Marketplace, OrderSide};
use crate::metrics::METRICS;
use crate::Error;

pub const ACTION_PATH: &str = "/api/actions/buy-nft";
pub const TITLE: &str = "Star Atlas NFT Purchase";
pub const ICON: &str = "https://staratlas.com/favicon.ico";
pub const CURRENCY: &str = "ATLAS";
/// Orders offered per menu, taken in marketplace order.
pub const MAX_LISTED_ORDERS: usize = 6;
pub const PURCHASE_QTY: u64 = 1;

/// Step of the action chain, carried in the `action` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Discover,
    FindOrders,
    Buy,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Discover => "discover",
            Stage::FindOrders => "findOrders",
            Stage::Buy => "buy",
        }
    }
}

impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discover" => Ok(Stage::Discover),
            "findOrders" => Ok(Stage::FindOrders),
            "buy" => Ok(Stage::Buy),
            _ => Err(Error::invalid("Invalid action")),
        }
    }
}

/// Raw inputs of a POST. Validation happens in [`ActionResolver::resolve_stage`].
#[derive(Debug, Clone, Default)]
pub struct ActionRequest {
    pub nft_name: Option<String>,
    pub stage: Option<String>,
    pub order_id: Option<String>,
    /// Buyer wallet, from the body's `account`.
    pub account: Option<String>,
}

impl ActionRequest {
    pub fn from_parts(query: ActionQuery, body: ActionPostRequest) -> Self {
        Self {
            nft_name: query.nft_name,
            stage: query.action,
            order_id: query.order_id,
            account: body.account,
        }
    }
}

/// Result of a POST: an order menu or a transaction to sign.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StageResponse {
    Menu(ActionGetResponse),
    Transaction(ActionPostResponse),
}

pub struct ActionResolver {
    catalog: NftCatalog,
    marketplace: Arc<dyn Marketplace>,
    call_timeout: Duration,
}

impl ActionResolver {
    pub fn new(catalog: NftCatalog, marketplace: Arc<dyn Marketplace>, call_timeout: Duration) -> Self {
        Self {
            catalog,
            marketplace,
            call_timeout,
        }
    }

    pub fn catalog(&self) -> &NftCatalog {
        &self.catalog
    }

    /// GET: describe the action for `nft_name`.
    pub fn describe(&self, nft_name: Option<&str>) -> Result<ActionGetResponse, Error> {
        let name = self.known_name(nft_name)?;

        Ok(ActionGetResponse {
            kind: ACTION_TYPE.into(),
            title: TITLE.into(),
            icon: ICON.into(),
            description: format!(
                "Purchase a {} NFT from the Star Atlas marketplace",
                name.to_uppercase()
            ),
            label: "Select NFT Order".into(),
            links: ActionLinks {
                actions: vec![LinkedAction {
                    label: "Find Orders".into(),
                    href: action_href(&name, &[("action", Stage::FindOrders.as_str())]),
                    parameters: vec![ActionParameter {
                        name: "nftName".into(),
                        label: "Enter NFT name (e.g., pearce x4)".into(),
                        required: true,
                    }],
                }],
            },
        })
    }

    /// POST: validate, then run the requested stage.
    pub async fn resolve_stage(&self, request: &ActionRequest) -> Result<StageResponse, Error> {
        let name = self.known_name(request.nft_name.as_deref())?;
        let buyer = parse_address(request.account.as_deref(), "Invalid account")?;
        let mint = self
            .catalog
            .resolve(&name)
            .ok_or_else(|| Error::invalid("Invalid NFT name"))?;

        match request.stage.as_deref().map(Stage::from_str) {
            Some(Ok(Stage::FindOrders)) => {
                Ok(StageResponse::Menu(self.find_orders(&name, &mint).await))
            }
            Some(Ok(Stage::Buy)) => self
                .buy(&name, &mint, request.order_id.as_deref(), &buyer)
                .await
                .map(StageResponse::Transaction),
            _ => Err(Error::invalid("Invalid action")),
        }
    }

    /// Menu of up to [`MAX_LISTED_ORDERS`] orders. Lookup failures yield an empty menu.
    async fn find_orders(&self, name: &str, mint: &Pubkey) -> ActionGetResponse {
        let orders = match self
            .bounded("open_orders_for_asset", self.marketplace.open_orders_for_asset(mint))
            .await
        {
            Ok(orders) => orders,
            Err(e) => {
                METRICS.record_error(&e);
                warn!(nft = name, mint = %mint, error = %e, "Order lookup failed, returning empty menu");
                Vec::new()
            }
        };

        let actions: Vec<LinkedAction> = orders
            .iter()
            .take(MAX_LISTED_ORDERS)
            .map(|order| LinkedAction {
                label: format!("Buy for {} {CURRENCY}", order.ui_price),
                href: action_href(
                    name,
                    &[("action", Stage::Buy.as_str()), ("orderId", &order.id.to_string())],
                ),
                parameters: Vec::new(),
            })
            .collect();

        METRICS
            .orders_listed
            .fetch_add(actions.len() as u64, Ordering::Relaxed);
        info!(nft = name, available = orders.len(), listed = actions.len(), "Order menu built");

        ActionGetResponse {
            kind: ACTION_TYPE.into(),
            title: TITLE.into(),
            icon: ICON.into(),
            description: format!("Select an order to purchase {} NFT", name.to_uppercase()),
            label: "Select Order".into(),
            links: ActionLinks { actions },
        }
    }

    async fn buy(
        &self,
        name: &str,
        mint: &Pubkey,
        order_id: Option<&str>,
        buyer: &Pubkey,
    ) -> Result<ActionPostResponse, Error> {
        let order_id = parse_address(order_id, "Invalid or missing orderId")?;

        let order = self
            .bounded("open_order", self.marketplace.open_order(&order_id))
            .await?
            .filter(|order| order.side == OrderSide::Sell && order.asset_mint == *mint)
            .ok_or_else(|| Error::NotFound("Order not found".into()))?;

        let tx = self
            .bounded(
                "exchange_transaction",
                self.marketplace.exchange_transaction(&order, buyer, PURCHASE_QTY),
            )
            .await?;

        // Wallet signs later; signature slots stay zeroed.
        let bytes = bincode::serialize(&tx)
            .map_err(|e| Error::Upstream(format!("transaction serialization failed: {e}")))?;

        METRICS.tx_built.fetch_add(1, Ordering::Relaxed);
        info!(nft = name, order = %order_id, buyer = %buyer, price = order.ui_price, "Purchase transaction built");

        Ok(ActionPostResponse {
            transaction: BASE64_STANDARD.encode(bytes),
            message: format!(
                "Purchase {} NFT for {} {CURRENCY}",
                name.to_uppercase(),
                order.ui_price
            ),
        })
    }

    /// Catalog-checked, normalized NFT name.
    fn known_name(&self, nft_name: Option<&str>) -> Result<String, Error> {
        match nft_name.map(normalize) {
            Some(name) if !name.is_empty() && self.catalog.contains(&name) => Ok(name),
            _ => Err(Error::invalid("Invalid or missing NFT name")),
        }
    }

    async fn bounded<T, F>(&self, call: &'static str, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        tokio::time::timeout(self.call_timeout, fut)
            .await
            .map_err(|_| {
                Error::Timeout(format!(
                    "{call} exceeded {}ms",
                    self.call_timeout.as_millis()
                ))
            })?
    }
}

/// Relative href back into the action route.
pub fn action_href(nft_name: &str, params: &[(&str, &str)]) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("nftName", nft_name);
    for (key, value) in params {
        query.append_pair(key, value);
    }
    format!("{ACTION_PATH}?{}", query.finish())
}

fn parse_address(value: Option<&str>, reason: &str) -> Result<Pubkey, Error> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| Pubkey::from_str(s).ok())
        .ok_or_else(|| Error::invalid(reason))
}
