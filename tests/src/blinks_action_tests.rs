//! HTTP-level tests of the three-stage action chain against a fake marketplace.

use anyhow::Result;
use axum::http::StatusCode;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use staratlas_blinks::marketplace::OrderSide;
use staratlas_blinks::Error;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::utils::{buy_uri, get, pearce_order, post, test_app, FakeMarketplace};

const FIND_ORDERS: &str = "/api/actions/buy-nft?nftName=pearce%20x4&action=findOrders";

fn buyer() -> serde_json::Value {
    json!({ "account": Pubkey::new_unique().to_string() })
}

// ── Describe ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_describe_known_nft() -> Result<()> {
    let app = test_app(Arc::new(FakeMarketplace::default()))?;

    let resp = get(&app, "/api/actions/buy-nft?nftName=PEARCE%20X4").await?;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["type"], "action");
    assert_eq!(resp.body["title"], "Star Atlas NFT Purchase");
    assert_eq!(
        resp.body["description"],
        "Purchase a PEARCE X4 NFT from the Star Atlas marketplace"
    );

    let actions = resp.body["links"]["actions"].as_array().unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0]["label"], "Find Orders");
    assert_eq!(
        actions[0]["href"],
        "/api/actions/buy-nft?nftName=pearce+x4&action=findOrders"
    );
    assert_eq!(
        actions[0]["parameters"],
        json!([{ "name": "nftName", "label": "Enter NFT name (e.g., pearce x4)", "required": true }])
    );
    Ok(())
}

#[tokio::test]
async fn test_describe_rejects_unknown_or_missing_name() -> Result<()> {
    let app = test_app(Arc::new(FakeMarketplace::default()))?;

    for uri in [
        "/api/actions/buy-nft",
        "/api/actions/buy-nft?nftName=",
        "/api/actions/buy-nft?nftName=opal%20jet",
    ] {
        let resp = get(&app, uri).await?;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(resp.body, json!({ "error": "Invalid or missing NFT name" }));
    }
    Ok(())
}

#[tokio::test]
async fn test_describe_href_round_trips_into_find_orders() -> Result<()> {
    let market = Arc::new(FakeMarketplace {
        orders: vec![pearce_order(10.0)],
        ..Default::default()
    });
    let app = test_app(market)?;

    let described = get(&app, "/api/actions/buy-nft?nftName=pearce%20x4").await?;
    let href = described.body["links"]["actions"][0]["href"]
        .as_str()
        .unwrap()
        .to_string();

    let menu = post(&app, &href, buyer()).await?;
    assert_eq!(menu.status, StatusCode::OK);
    assert_eq!(menu.body["links"]["actions"][0]["label"], "Buy for 10 ATLAS");
    Ok(())
}

// ── findOrders ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_find_orders_without_orders_is_empty_menu() -> Result<()> {
    let app = test_app(Arc::new(FakeMarketplace::default()))?;

    let resp = post(&app, FIND_ORDERS, buyer()).await?;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["label"], "Select Order");
    assert_eq!(
        resp.body["description"],
        "Select an order to purchase PEARCE X4 NFT"
    );
    assert_eq!(resp.body["links"]["actions"], json!([]));
    Ok(())
}

#[tokio::test]
async fn test_find_orders_keeps_first_six_in_client_order() -> Result<()> {
    let orders: Vec<_> = [40.0, 12.5, 99.0, 1.0, 7.25, 300.0, 0.5, 2.0]
        .into_iter()
        .map(pearce_order)
        .collect();
    let market = Arc::new(FakeMarketplace {
        orders: orders.clone(),
        ..Default::default()
    });
    let app = test_app(market)?;

    let resp = post(&app, FIND_ORDERS, buyer()).await?;
    assert_eq!(resp.status, StatusCode::OK);
    let actions = resp.body["links"]["actions"].as_array().unwrap();
    assert_eq!(actions.len(), 6);

    for (action, order) in actions.iter().zip(&orders) {
        assert_eq!(action["label"], format!("Buy for {} ATLAS", order.ui_price));
        assert_eq!(
            action["href"],
            format!(
                "/api/actions/buy-nft?nftName=pearce+x4&action=buy&orderId={}",
                order.id
            )
        );
        assert!(action.get("parameters").is_none());
    }
    Ok(())
}

#[tokio::test]
async fn test_find_orders_upstream_failure_is_empty_menu() -> Result<()> {
    let market = Arc::new(FakeMarketplace {
        orders: vec![pearce_order(1.0)],
        listing_error: Some(Error::Upstream("getProgramAccounts failed".into())),
        ..Default::default()
    });
    let app = test_app(market)?;

    let resp = post(&app, FIND_ORDERS, buyer()).await?;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["links"]["actions"], json!([]));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_find_orders_slow_marketplace_is_empty_menu() -> Result<()> {
    let market = Arc::new(FakeMarketplace {
        orders: vec![pearce_order(1.0)],
        delay: Some(Duration::from_secs(30)),
        ..Default::default()
    });
    let app = test_app(market)?;

    let resp = post(&app, FIND_ORDERS, buyer()).await?;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["links"]["actions"], json!([]));
    Ok(())
}

// ── Input validation ────────────────────────────────────────────────

#[tokio::test]
async fn test_post_rejects_unknown_name_before_account() -> Result<()> {
    let app = test_app(Arc::new(FakeMarketplace::default()))?;

    let resp = post(
        &app,
        "/api/actions/buy-nft?nftName=opal%20jet&action=findOrders",
        json!({ "account": "not-a-wallet" }),
    )
    .await?;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"], "Invalid or missing NFT name");
    Ok(())
}

#[tokio::test]
async fn test_post_rejects_bad_account() -> Result<()> {
    let app = test_app(Arc::new(FakeMarketplace::default()))?;

    for body in [json!({ "account": "not-a-wallet" }), json!({}), json!([1, 2])] {
        let resp = post(&app, FIND_ORDERS, body).await?;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.body["error"], "Invalid account");
    }
    Ok(())
}

#[tokio::test]
async fn test_post_rejects_missing_or_unknown_action() -> Result<()> {
    let app = test_app(Arc::new(FakeMarketplace::default()))?;

    for uri in [
        "/api/actions/buy-nft?nftName=pearce%20x4",
        "/api/actions/buy-nft?nftName=pearce%20x4&action=sell",
    ] {
        let resp = post(&app, uri, buyer()).await?;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(resp.body["error"], "Invalid action");
    }
    Ok(())
}

#[tokio::test]
async fn test_buy_rejects_missing_or_malformed_order_id() -> Result<()> {
    let app = test_app(Arc::new(FakeMarketplace::default()))?;

    for uri in [
        "/api/actions/buy-nft?nftName=pearce%20x4&action=buy",
        "/api/actions/buy-nft?nftName=pearce%20x4&action=buy&orderId=xyz",
    ] {
        let resp = post(&app, uri, buyer()).await?;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(resp.body["error"], "Invalid or missing orderId");
    }
    Ok(())
}

// ── buy ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_buy_unknown_order_is_not_found() -> Result<()> {
    let market = Arc::new(FakeMarketplace {
        orders: vec![pearce_order(5.0)],
        ..Default::default()
    });
    let app = test_app(market)?;

    let resp = post(&app, &buy_uri(&Pubkey::new_unique()), buyer()).await?;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body, json!({ "error": "Order not found" }));
    Ok(())
}

#[tokio::test]
async fn test_buy_rejects_order_for_another_nft() -> Result<()> {
    let mut order = pearce_order(2.0);
    order.asset_mint = Pubkey::new_unique();
    let market = Arc::new(FakeMarketplace {
        orders: vec![order.clone()],
        ..Default::default()
    });
    let app = test_app(market.clone())?;

    let resp = post(&app, &buy_uri(&order.id), buyer()).await?;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body, json!({ "error": "Order not found" }));
    assert_eq!(market.transactions_built.load(Ordering::Relaxed), 0);
    Ok(())
}

#[tokio::test]
async fn test_buy_rejects_buy_side_order() -> Result<()> {
    let mut order = pearce_order(2.0);
    order.side = OrderSide::Buy;
    let market = Arc::new(FakeMarketplace {
        orders: vec![order.clone()],
        ..Default::default()
    });
    let app = test_app(market.clone())?;

    let resp = post(&app, &buy_uri(&order.id), buyer()).await?;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["error"], "Order not found");
    assert_eq!(market.transactions_built.load(Ordering::Relaxed), 0);
    Ok(())
}

#[tokio::test]
async fn test_buy_returns_unsigned_transaction() -> Result<()> {
    let order = pearce_order(1234.5);
    let market = Arc::new(FakeMarketplace {
        orders: vec![pearce_order(1.0), order.clone()],
        ..Default::default()
    });
    let app = test_app(market)?;
    let buyer_key = Pubkey::new_unique();

    let resp = post(
        &app,
        &buy_uri(&order.id),
        json!({ "account": buyer_key.to_string() }),
    )
    .await?;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.body["message"],
        "Purchase PEARCE X4 NFT for 1234.5 ATLAS"
    );

    let bytes = BASE64_STANDARD.decode(resp.body["transaction"].as_str().unwrap())?;
    let tx: Transaction = bincode::deserialize(&bytes)?;
    assert_eq!(tx.message.account_keys[0], buyer_key);
    assert!(tx.signatures.iter().all(|s| *s == Default::default()));
    Ok(())
}

#[tokio::test]
async fn test_buy_twice_builds_two_transactions() -> Result<()> {
    let order = pearce_order(3.0);
    let market = Arc::new(FakeMarketplace {
        orders: vec![order.clone()],
        ..Default::default()
    });
    let app = test_app(market.clone())?;
    let body = buyer();

    let first = post(&app, &buy_uri(&order.id), body.clone()).await?;
    let second = post(&app, &buy_uri(&order.id), body).await?;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(market.transactions_built.load(Ordering::Relaxed), 2);
    Ok(())
}

#[tokio::test]
async fn test_buy_upstream_failure_is_bad_gateway() -> Result<()> {
    let order = pearce_order(3.0);
    let market = Arc::new(FakeMarketplace {
        orders: vec![order.clone()],
        lookup_error: Some(Error::Upstream("getAccountInfo failed: 10.1.2.3 refused".into())),
        ..Default::default()
    });
    let app = test_app(market)?;

    let resp = post(&app, &buy_uri(&order.id), buyer()).await?;
    assert_eq!(resp.status, StatusCode::BAD_GATEWAY);
    assert_eq!(resp.body["error"], "Marketplace temporarily unavailable");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_buy_slow_marketplace_times_out() -> Result<()> {
    let order = pearce_order(3.0);
    let market = Arc::new(FakeMarketplace {
        orders: vec![order.clone()],
        delay: Some(Duration::from_secs(30)),
        ..Default::default()
    });
    let app = test_app(market)?;

    let resp = post(&app, &buy_uri(&order.id), buyer()).await?;
    assert_eq!(resp.status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(resp.body["error"], "Marketplace request timed out");
    Ok(())
}
