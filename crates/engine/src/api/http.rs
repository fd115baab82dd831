//! HTTP routes.
//!
//! Auth is enforced by extractor choice: public handlers take neither
//! identity extractor, player endpoints take [`Identity`], and authoring
//! endpoints take [`MjIdentity`]. Ownership checks beyond the role live in
//! the use cases.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use dungeons_domain::{
    BossStep, Dungeon, DungeonId, ItemId, Listing, ListingId, PlayerId, Role, Run, RunId, StepId,
    Trade,
};

use crate::api::dto::{
    AttemptRequest, AuthResponse, BuyListingRequest, CreateDungeonRequest, CreateListingRequest,
    CreateStepRequest, DungeonDetailResponse, InventoryResponse, ListResponse, LoginRequest,
    PageQuery, PlayerResponse, RegisterRequest, ReorderStepsRequest, StartRunRequest,
    UpdateDungeonRequest, UpdatePlayerRequest, UpdateStepRequest,
};
use crate::api::error::ApiError;
use crate::api::extract::{Identity, MjIdentity, ValidatedJson};
use crate::app::App;
use crate::use_cases::dungeon::StepInput;
use crate::use_cases::run::AttemptOutcome;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/healthz", get(health))
        .route("/version", get(version))
        .route("/v1/auth/register", post(register))
        .route("/v1/auth/login", post(login))
        .route("/v1/me", get(me))
        .route("/v1/me/inventory", get(my_inventory))
        .route("/v1/players", get(list_players))
        .route("/v1/players/{id}", get(get_player).patch(update_player))
        .route("/v1/dungeons", get(list_dungeons).post(create_dungeon))
        .route("/v1/dungeons/{id}", get(get_dungeon).patch(update_dungeon))
        .route("/v1/dungeons/{id}/publish", post(publish_dungeon))
        .route("/v1/dungeons/{id}/archive", post(archive_dungeon))
        .route("/v1/dungeons/{id}/steps", post(create_step))
        .route("/v1/dungeons/{id}/steps/reorder", post(reorder_steps))
        .route("/v1/dungeons/{id}/steps/{stepId}", patch(update_step))
        .route("/v1/runs", get(list_runs).post(start_run))
        .route("/v1/runs/{id}", get(get_run))
        .route("/v1/runs/{id}/steps/{stepId}/attempt", post(attempt_step))
        .route("/v1/market/listings", get(list_listings).post(create_listing))
        .route("/v1/market/listings/{id}/buy", post(buy_listing))
        .route("/v1/market/listings/{id}/cancel", post(cancel_listing))
        .route("/v1/market/trades", get(list_trades))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

async fn version() -> Json<serde_json::Value> {
    Json(json!({"version": env!("CARGO_PKG_VERSION")}))
}

// ---------------------------------------------------------------------------
// Auth and players
// ---------------------------------------------------------------------------

async fn register(
    State(app): State<Arc<App>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let session = app
        .use_cases
        .players
        .register
        .execute(
            &req.display_name,
            &req.email,
            &req.password,
            req.role.unwrap_or(Role::Player),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

async fn login(
    State(app): State<Arc<App>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let session = app
        .use_cases
        .players
        .login
        .execute(&req.email, &req.password)
        .await?;
    Ok(Json(session.into()))
}

async fn me(
    State(app): State<Arc<App>>,
    identity: Identity,
) -> Result<Json<PlayerResponse>, ApiError> {
    let player = app.use_cases.players.queries.me(identity.player_id).await?;
    Ok(Json(player.into()))
}

async fn my_inventory(
    State(app): State<Arc<App>>,
    identity: Identity,
) -> Result<Json<InventoryResponse>, ApiError> {
    let entries = app
        .use_cases
        .players
        .queries
        .inventory(identity.player_id)
        .await?;
    Ok(Json(InventoryResponse::new(identity.player_id, entries)))
}

async fn list_players(
    State(app): State<Arc<App>>,
    MjIdentity(_): MjIdentity,
    Query(query): Query<PageQuery>,
) -> Result<Json<ListResponse<PlayerResponse>>, ApiError> {
    let params = query.params();
    let players = app.use_cases.players.queries.list(params).await?;
    Ok(Json(ListResponse::new(
        players.into_iter().map(PlayerResponse::from).collect(),
        params,
    )))
}

async fn get_player(
    State(app): State<Arc<App>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<PlayerResponse>, ApiError> {
    let player = app
        .use_cases
        .players
        .queries
        .get(identity.player_id, identity.role, PlayerId::from_uuid(id))
        .await?;
    Ok(Json(player.into()))
}

async fn update_player(
    State(app): State<Arc<App>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdatePlayerRequest>,
) -> Result<Json<PlayerResponse>, ApiError> {
    let player = app
        .use_cases
        .players
        .update
        .execute(
            identity.player_id,
            identity.role,
            PlayerId::from_uuid(id),
            &req.display_name,
        )
        .await?;
    Ok(Json(player.into()))
}

// ---------------------------------------------------------------------------
// Dungeon catalog and authoring
// ---------------------------------------------------------------------------

async fn list_dungeons(
    State(app): State<Arc<App>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ListResponse<Dungeon>>, ApiError> {
    let params = query.params();
    let dungeons = app.use_cases.dungeons.catalog.list_published(params).await?;
    Ok(Json(ListResponse::new(dungeons, params)))
}

async fn get_dungeon(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DungeonDetailResponse>, ApiError> {
    let (dungeon, steps) = app
        .use_cases
        .dungeons
        .catalog
        .get_published(DungeonId::from_uuid(id))
        .await?;
    Ok(Json(DungeonDetailResponse { dungeon, steps }))
}

async fn create_dungeon(
    State(app): State<Arc<App>>,
    MjIdentity(identity): MjIdentity,
    ValidatedJson(req): ValidatedJson<CreateDungeonRequest>,
) -> Result<(StatusCode, Json<Dungeon>), ApiError> {
    let dungeon = app
        .use_cases
        .dungeons
        .authoring
        .create(identity.player_id, &req.title, &req.description, &req.area_name)
        .await?;
    Ok((StatusCode::CREATED, Json(dungeon)))
}

async fn update_dungeon(
    State(app): State<Arc<App>>,
    MjIdentity(identity): MjIdentity,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateDungeonRequest>,
) -> Result<Json<Dungeon>, ApiError> {
    let dungeon = app
        .use_cases
        .dungeons
        .authoring
        .update(
            identity.player_id,
            DungeonId::from_uuid(id),
            &req.title,
            &req.description,
            &req.area_name,
        )
        .await?;
    Ok(Json(dungeon))
}

async fn publish_dungeon(
    State(app): State<Arc<App>>,
    MjIdentity(identity): MjIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<Dungeon>, ApiError> {
    let dungeon = app
        .use_cases
        .dungeons
        .authoring
        .publish(identity.player_id, DungeonId::from_uuid(id))
        .await?;
    Ok(Json(dungeon))
}

async fn archive_dungeon(
    State(app): State<Arc<App>>,
    MjIdentity(identity): MjIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<Dungeon>, ApiError> {
    let dungeon = app
        .use_cases
        .dungeons
        .authoring
        .archive(identity.player_id, DungeonId::from_uuid(id))
        .await?;
    Ok(Json(dungeon))
}

async fn create_step(
    State(app): State<Arc<App>>,
    MjIdentity(identity): MjIdentity,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<CreateStepRequest>,
) -> Result<(StatusCode, Json<BossStep>), ApiError> {
    let step = app
        .use_cases
        .dungeons
        .authoring
        .add_step(
            identity.player_id,
            DungeonId::from_uuid(id),
            req.order,
            StepInput {
                name: req.name,
                location: req.location.into(),
                zone_description: req.zone_description,
                difficulty: req.difficulty,
                rewards: req.rewards,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(step)))
}

async fn update_step(
    State(app): State<Arc<App>>,
    MjIdentity(identity): MjIdentity,
    Path((id, step_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(req): ValidatedJson<UpdateStepRequest>,
) -> Result<Json<BossStep>, ApiError> {
    let step = app
        .use_cases
        .dungeons
        .authoring
        .update_step(
            identity.player_id,
            DungeonId::from_uuid(id),
            StepId::from_uuid(step_id),
            StepInput {
                name: req.name,
                location: req.location.into(),
                zone_description: req.zone_description,
                difficulty: req.difficulty,
                rewards: req.rewards,
            },
        )
        .await?;
    Ok(Json(step))
}

async fn reorder_steps(
    State(app): State<Arc<App>>,
    MjIdentity(identity): MjIdentity,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ReorderStepsRequest>,
) -> Result<Json<Vec<BossStep>>, ApiError> {
    let steps = app
        .use_cases
        .dungeons
        .authoring
        .reorder_steps(
            identity.player_id,
            DungeonId::from_uuid(id),
            req.step_ids.into_iter().map(StepId::from_uuid).collect(),
        )
        .await?;
    Ok(Json(steps))
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

async fn start_run(
    State(app): State<Arc<App>>,
    identity: Identity,
    ValidatedJson(req): ValidatedJson<StartRunRequest>,
) -> Result<(StatusCode, Json<Run>), ApiError> {
    let run = app
        .use_cases
        .runs
        .start
        .execute(identity.player_id, DungeonId::from_uuid(req.dungeon_id))
        .await?;
    Ok((StatusCode::CREATED, Json(run)))
}

async fn list_runs(
    State(app): State<Arc<App>>,
    identity: Identity,
    Query(query): Query<PageQuery>,
) -> Result<Json<ListResponse<Run>>, ApiError> {
    let params = query.params();
    let runs = app
        .use_cases
        .runs
        .queries
        .list(identity.player_id, params)
        .await?;
    Ok(Json(ListResponse::new(runs, params)))
}

async fn get_run(
    State(app): State<Arc<App>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Run>, ApiError> {
    let run = app
        .use_cases
        .runs
        .queries
        .get(identity.player_id, RunId::from_uuid(id))
        .await?;
    Ok(Json(run))
}

async fn attempt_step(
    State(app): State<Arc<App>>,
    identity: Identity,
    Path((id, step_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(req): ValidatedJson<AttemptRequest>,
) -> Result<Json<AttemptOutcome>, ApiError> {
    let outcome = app
        .use_cases
        .runs
        .attempt
        .execute(
            identity.player_id,
            RunId::from_uuid(id),
            StepId::from_uuid(step_id),
            req.lat,
            req.lon,
            req.idempotency_key,
        )
        .await?;
    Ok(Json(outcome))
}

// ---------------------------------------------------------------------------
// Marketplace
// ---------------------------------------------------------------------------

async fn list_listings(
    State(app): State<Arc<App>>,
    _identity: Identity,
    Query(query): Query<PageQuery>,
) -> Result<Json<ListResponse<Listing>>, ApiError> {
    let params = query.params();
    let listings = app.use_cases.market.queries.list_active(params).await?;
    Ok(Json(ListResponse::new(listings, params)))
}

async fn create_listing(
    State(app): State<Arc<App>>,
    identity: Identity,
    ValidatedJson(req): ValidatedJson<CreateListingRequest>,
) -> Result<(StatusCode, Json<Listing>), ApiError> {
    let listing = app
        .use_cases
        .market
        .create
        .execute(
            identity.player_id,
            ItemId::from_uuid(req.item_id),
            req.qty,
            req.price_per_unit,
            req.expires_in_hours,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

async fn buy_listing(
    State(app): State<Arc<App>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<BuyListingRequest>,
) -> Result<Json<Listing>, ApiError> {
    let listing = app
        .use_cases
        .market
        .buy
        .execute(identity.player_id, ListingId::from_uuid(id), req.qty)
        .await?;
    Ok(Json(listing))
}

async fn cancel_listing(
    State(app): State<Arc<App>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Listing>, ApiError> {
    let listing = app
        .use_cases
        .market
        .cancel
        .execute(identity.player_id, ListingId::from_uuid(id))
        .await?;
    Ok(Json(listing))
}

async fn list_trades(
    State(app): State<Arc<App>>,
    identity: Identity,
    Query(query): Query<PageQuery>,
) -> Result<Json<ListResponse<Trade>>, ApiError> {
    let params = query.params();
    let trades = app
        .use_cases
        .market
        .queries
        .list_trades(identity.player_id, params)
        .await?;
    Ok(Json(ListResponse::new(trades, params)))
}
