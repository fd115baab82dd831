//! E2E tests for the run lifecycle: start, ordered attempts, idempotent
//! settlement and reward payout.

use axum::http::StatusCode;
use serde_json::json;

use super::e2e_helpers::{
    error_code, TestServer, FAR_LAT, FAR_LON, STEP_1_LAT, STEP_1_LON, STEP_2_LAT, STEP_2_LON,
};

#[tokio::test]
async fn test_full_two_step_run() {
    let server = TestServer::setup().await;
    let mj = server.register("mj@example.com", "The MJ", "mj").await;
    let player = server.register("ada@example.com", "Ada", "player").await;
    let potion = server.create_item("Minor Potion", true).await;
    let (dungeon_id, step_1, step_2) = server.publish_two_step_dungeon(&mj, Some(potion)).await;

    let run_id = server.start_run(&player, dungeon_id).await;
    let (status, run) = server
        .get(&format!("/v1/runs/{run_id}"), Some(&player.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["state"], "active");
    assert_eq!(run["currentStep"], 1);

    // Step 2 first: rejected on ordering even though we stand inside its fence.
    let (status, body) = server
        .attempt(&player, run_id, step_2, STEP_2_LAT, STEP_2_LON, "key-wrong-order")
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(error_code(&body), "WRONG_STEP_ORDER");

    // Step 1 from far away: rejected on the geofence.
    let (status, body) = server
        .attempt(&player, run_id, step_1, FAR_LAT, FAR_LON, "key-too-far")
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(error_code(&body), "NOT_IN_RANGE");

    // Failed gates must leave everything untouched.
    assert_eq!(server.gold(&player).await, 0);
    let (_, run) = server
        .get(&format!("/v1/runs/{run_id}"), Some(&player.token))
        .await;
    assert_eq!(run["currentStep"], 1);

    // In range, in order: the attempt settles.
    let (status, outcome) = server
        .attempt(&player, run_id, step_1, STEP_1_LAT, STEP_1_LON, "key-0001")
        .await;
    assert_eq!(status, StatusCode::OK, "{outcome}");
    assert_eq!(outcome["idempotentReplay"], false);
    assert_eq!(outcome["rewards"]["gold"], 50);
    assert_eq!(outcome["run"]["currentStep"], 2);
    assert_eq!(outcome["run"]["state"], "active");
    assert_eq!(outcome["player"]["gold"], 50);
    assert_eq!(server.gold(&player).await, 50);
    assert_eq!(server.inventory_qty(&player, potion).await, 1);

    // Same key again: byte-for-byte the settled world, only the flag flips.
    let (status, replay) = server
        .attempt(&player, run_id, step_1, STEP_1_LAT, STEP_1_LON, "key-0001")
        .await;
    assert_eq!(status, StatusCode::OK, "{replay}");
    assert_eq!(replay["idempotentReplay"], true);
    assert_eq!(replay["rewards"], outcome["rewards"]);
    assert_eq!(replay["run"], outcome["run"]);
    assert_eq!(replay["player"], outcome["player"]);
    assert_eq!(server.gold(&player).await, 50, "replay must not pay twice");
    assert_eq!(server.inventory_qty(&player, potion).await, 1);

    // A different key for the same settled step is a hard conflict.
    let (status, body) = server
        .attempt(&player, run_id, step_1, STEP_1_LAT, STEP_1_LON, "key-0002")
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(error_code(&body), "ATTEMPT_ALREADY_HANDLED");

    // Clearing the final step completes the run.
    let (status, outcome) = server
        .attempt(&player, run_id, step_2, STEP_2_LAT, STEP_2_LON, "key-0003")
        .await;
    assert_eq!(status, StatusCode::OK, "{outcome}");
    assert_eq!(outcome["run"]["state"], "completed");
    assert_eq!(outcome["run"]["currentStep"], 3);
    assert_eq!(
        outcome["run"]["killedSteps"].as_array().expect("kills").len(),
        2
    );
    assert_eq!(server.gold(&player).await, 170);

    let (_, run) = server
        .get(&format!("/v1/runs/{run_id}"), Some(&player.token))
        .await;
    assert_eq!(run["state"], "completed");
    assert!(run.get("endedAt").is_some());
}

#[tokio::test]
async fn test_start_run_guards() {
    let server = TestServer::setup().await;
    let mj = server.register("mj@example.com", "The MJ", "mj").await;
    let player = server.register("ada@example.com", "Ada", "player").await;

    // Unknown dungeon.
    let (status, body) = server
        .post(
            "/v1/runs",
            Some(&player.token),
            json!({"dungeonId": uuid::Uuid::new_v4()}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");

    // Draft dungeon: visible to nobody, so not startable.
    let (_, body) = server
        .post(
            "/v1/dungeons",
            Some(&mj.token),
            json!({
                "title": "Unfinished Crypt",
                "description": "Still being dug out",
                "areaName": "Old Town",
            }),
        )
        .await;
    let draft_id = body["id"].as_str().expect("dungeon id").to_string();
    let (status, body) = server
        .post(
            "/v1/runs",
            Some(&player.token),
            json!({"dungeonId": draft_id}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    // One active run per (player, dungeon).
    let (dungeon_id, _, _) = server.publish_two_step_dungeon(&mj, None).await;
    server.start_run(&player, dungeon_id).await;
    let (status, body) = server
        .post(
            "/v1/runs",
            Some(&player.token),
            json!({"dungeonId": dungeon_id}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(error_code(&body), "conflict");
}

#[tokio::test]
async fn test_completed_run_frees_the_slot() {
    let server = TestServer::setup().await;
    let mj = server.register("mj@example.com", "The MJ", "mj").await;
    let player = server.register("ada@example.com", "Ada", "player").await;
    let (dungeon_id, step_1, step_2) = server.publish_two_step_dungeon(&mj, None).await;

    let run_id = server.start_run(&player, dungeon_id).await;
    server
        .attempt(&player, run_id, step_1, STEP_1_LAT, STEP_1_LON, "key-0001")
        .await;
    let (status, _) = server
        .attempt(&player, run_id, step_2, STEP_2_LAT, STEP_2_LON, "key-0002")
        .await;
    assert_eq!(status, StatusCode::OK);

    // The finished run no longer blocks a fresh start.
    let second = server.start_run(&player, dungeon_id).await;
    assert_ne!(second, run_id);

    let (status, body) = server.get("/v1/runs", Some(&player.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().expect("runs").len(), 2);
}

#[tokio::test]
async fn test_runs_are_private_to_their_owner() {
    let server = TestServer::setup().await;
    let mj = server.register("mj@example.com", "The MJ", "mj").await;
    let ada = server.register("ada@example.com", "Ada", "player").await;
    let bob = server.register("bob@example.com", "Bob", "player").await;
    let (dungeon_id, step_1, _) = server.publish_two_step_dungeon(&mj, None).await;

    let run_id = server.start_run(&ada, dungeon_id).await;

    let (status, body) = server
        .get(&format!("/v1/runs/{run_id}"), Some(&bob.token))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");

    let (status, body) = server
        .attempt(&bob, run_id, step_1, STEP_1_LAT, STEP_1_LON, "key-sneaky")
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");

    let (_, body) = server.get("/v1/runs", Some(&bob.token)).await;
    assert!(body["data"].as_array().expect("runs").is_empty());
}
