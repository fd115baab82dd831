//! E2E tests for the marketplace: escrowed listings, atomic buys, receipts.

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use dungeons_domain::{Listing, ListingId, ListingStatus};

use super::e2e_helpers::{error_code, TestServer};

#[tokio::test]
async fn test_listing_lifecycle_with_partial_then_full_fill() {
    let server = TestServer::setup().await;
    let seller = server.register("seller@example.com", "Seller", "player").await;
    let buyer = server.register("buyer@example.com", "Buyer", "player").await;
    let sword = server.create_item("Rusty Sword", true).await;
    server.grant_items(seller.player_id, sword, 3).await;
    server.grant_gold(buyer.player_id, 100).await;

    // Creating the listing escrows the whole stack out of the seller's bag.
    let (status, listing) = server
        .post(
            "/v1/market/listings",
            Some(&seller.token),
            json!({"itemId": sword, "qty": 3, "pricePerUnit": 10}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{listing}");
    assert_eq!(listing["status"], "active");
    assert_eq!(listing["qty"], 3);
    let listing_id = listing["id"].as_str().expect("listing id").to_string();
    assert_eq!(server.inventory_qty(&seller, sword).await, 0);

    let (status, body) = server
        .get("/v1/market/listings", Some(&buyer.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().expect("listings").len(), 1);

    // Partial fill leaves the listing active with the remainder.
    let (status, body) = server
        .post(
            &format!("/v1/market/listings/{listing_id}/buy"),
            Some(&buyer.token),
            json!({"qty": 2}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "active");
    assert_eq!(body["qty"], 1);
    assert_eq!(server.gold(&buyer).await, 80);
    assert_eq!(server.gold(&seller).await, 20);
    assert_eq!(server.inventory_qty(&buyer, sword).await, 2);

    // Buying the remainder closes it out and records the buyer.
    let (status, body) = server
        .post(
            &format!("/v1/market/listings/{listing_id}/buy"),
            Some(&buyer.token),
            json!({"qty": 1}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "sold");
    assert_eq!(body["qty"], 0);
    assert_eq!(body["buyerId"], json!(buyer.player_id));
    assert_eq!(server.gold(&buyer).await, 70);
    assert_eq!(server.gold(&seller).await, 30);
    assert_eq!(server.inventory_qty(&buyer, sword).await, 3);

    // Sold listings drop out of the browse view and refuse further buys.
    let (_, body) = server.get("/v1/market/listings", Some(&buyer.token)).await;
    assert!(body["data"].as_array().expect("listings").is_empty());
    let (status, body) = server
        .post(
            &format!("/v1/market/listings/{listing_id}/buy"),
            Some(&buyer.token),
            json!({"qty": 1}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(error_code(&body), "conflict");

    // Exactly one receipt per settled buy, visible to both parties.
    let (status, body) = server.get("/v1/market/trades", Some(&buyer.token)).await;
    assert_eq!(status, StatusCode::OK);
    let trades = body["data"].as_array().expect("trades");
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0]["totalPrice"], 10);
    assert_eq!(trades[1]["totalPrice"], 20);

    let (_, body) = server.get("/v1/market/trades", Some(&seller.token)).await;
    assert_eq!(body["data"].as_array().expect("trades").len(), 2);
}

#[tokio::test]
async fn test_buy_rejections_leave_no_trace() {
    let server = TestServer::setup().await;
    let seller = server.register("seller@example.com", "Seller", "player").await;
    let buyer = server.register("buyer@example.com", "Buyer", "player").await;
    let sword = server.create_item("Rusty Sword", true).await;
    server.grant_items(seller.player_id, sword, 2).await;
    server.grant_gold(buyer.player_id, 5).await;

    let (_, listing) = server
        .post(
            "/v1/market/listings",
            Some(&seller.token),
            json!({"itemId": sword, "qty": 2, "pricePerUnit": 10}),
        )
        .await;
    let listing_id = listing["id"].as_str().expect("listing id").to_string();
    let buy_path = format!("/v1/market/listings/{listing_id}/buy");

    // Sellers cannot buy their own stock.
    let (status, body) = server
        .post(&buy_path, Some(&seller.token), json!({"qty": 1}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    // More than remains.
    let (status, body) = server
        .post(&buy_path, Some(&buyer.token), json!({"qty": 3}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    // Short on gold: 2 * 10 > 5.
    let (status, body) = server
        .post(&buy_path, Some(&buyer.token), json!({"qty": 2}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(error_code(&body), "insufficient_funds");

    // Nothing moved: balances, stock and the listing are all as created.
    assert_eq!(server.gold(&buyer).await, 5);
    assert_eq!(server.gold(&seller).await, 0);
    assert_eq!(server.inventory_qty(&buyer, sword).await, 0);
    let (_, body) = server.get("/v1/market/listings", Some(&buyer.token)).await;
    assert_eq!(body["data"][0]["qty"], 2);
    let (_, body) = server.get("/v1/market/trades", Some(&buyer.token)).await;
    assert!(body["data"].as_array().expect("trades").is_empty());
}

#[tokio::test]
async fn test_create_listing_guards() {
    let server = TestServer::setup().await;
    let seller = server.register("seller@example.com", "Seller", "player").await;
    let heirloom = server.create_item("Family Heirloom", false).await;
    let sword = server.create_item("Rusty Sword", true).await;
    server.grant_items(seller.player_id, heirloom, 1).await;
    server.grant_items(seller.player_id, sword, 1).await;

    let (status, body) = server
        .post(
            "/v1/market/listings",
            Some(&seller.token),
            json!({"itemId": heirloom, "qty": 1, "pricePerUnit": 10}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "not tradable: {body}");

    let (status, body) = server
        .post(
            "/v1/market/listings",
            Some(&seller.token),
            json!({"itemId": sword, "qty": 2, "pricePerUnit": 10}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "stack too small: {body}");

    let (status, body) = server
        .post(
            "/v1/market/listings",
            Some(&seller.token),
            json!({"itemId": uuid::Uuid::new_v4(), "qty": 1, "pricePerUnit": 10}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "unknown item: {body}");

    // The failed attempts never touched the stacks.
    assert_eq!(server.inventory_qty(&seller, heirloom).await, 1);
    assert_eq!(server.inventory_qty(&seller, sword).await, 1);
}

#[tokio::test]
async fn test_cancel_returns_escrow() {
    let server = TestServer::setup().await;
    let seller = server.register("seller@example.com", "Seller", "player").await;
    let rival = server.register("rival@example.com", "Rival", "player").await;
    let sword = server.create_item("Rusty Sword", true).await;
    server.grant_items(seller.player_id, sword, 3).await;

    let (_, listing) = server
        .post(
            "/v1/market/listings",
            Some(&seller.token),
            json!({"itemId": sword, "qty": 3, "pricePerUnit": 10}),
        )
        .await;
    let listing_id = listing["id"].as_str().expect("listing id").to_string();
    let cancel_path = format!("/v1/market/listings/{listing_id}/cancel");

    let (status, body) = server.post(&cancel_path, Some(&rival.token), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");

    let (status, body) = server.post(&cancel_path, Some(&seller.token), json!({})).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "cancelled");
    assert_eq!(server.inventory_qty(&seller, sword).await, 3);

    // Cancelled means gone: no double cancel, no late buy.
    let (status, _) = server.post(&cancel_path, Some(&seller.token), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = server
        .post(
            &format!("/v1/market/listings/{listing_id}/buy"),
            Some(&rival.token),
            json!({"qty": 1}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_expired_listings_are_dead_stock() {
    let server = TestServer::setup().await;
    let seller = server.register("seller@example.com", "Seller", "player").await;
    let buyer = server.register("buyer@example.com", "Buyer", "player").await;
    server.grant_gold(buyer.player_id, 100).await;
    let sword = server.create_item("Rusty Sword", true).await;

    // Inserted directly with an expiry in the past; the API only accepts
    // future expiries.
    let now = Utc::now();
    let listing = Listing {
        id: ListingId::new(),
        seller_id: seller.player_id,
        buyer_id: None,
        item_id: sword,
        qty: 1,
        price_per_unit: 10,
        status: ListingStatus::Active,
        created_at: now - Duration::hours(2),
        expires_at: Some(now - Duration::hours(1)),
    };
    let mut tx = server.app.repositories.ledger.begin().await.expect("begin");
    tx.insert_listing(&listing).await.expect("insert listing");
    tx.commit().await.expect("commit");

    let (_, body) = server.get("/v1/market/listings", Some(&buyer.token)).await;
    assert!(
        body["data"].as_array().expect("listings").is_empty(),
        "expired stock must not be browsable: {body}"
    );

    let (status, body) = server
        .post(
            &format!("/v1/market/listings/{}/buy", listing.id),
            Some(&buyer.token),
            json!({"qty": 1}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(server.gold(&buyer).await, 100);
}
