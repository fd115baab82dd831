//! E2E test helpers for driving the full HTTP stack.
//!
//! Each test gets its own SQLite file in a temp directory and a fully wired
//! [`App`]; requests go through the real router via `tower::ServiceExt`, so
//! extractors, validation and error mapping are all exercised.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use dungeons_domain::{ItemDef, ItemId, PlayerId};

use crate::api;
use crate::app::App;
use crate::infrastructure::auth::AuthTokens;
use crate::infrastructure::sqlite;

pub const PASSWORD: &str = "hunter2hunter2";

/// Coordinates used for seeded boss steps; "at" and "far" are relative to
/// the first step's 80 m geofence.
pub const STEP_1_LAT: f64 = 48.8566;
pub const STEP_1_LON: f64 = 2.3522;
pub const STEP_2_LAT: f64 = 48.8700;
pub const STEP_2_LON: f64 = 2.3700;
pub const FAR_LAT: f64 = 48.9000;
pub const FAR_LON: f64 = 2.5000;

/// A registered account: bearer token plus the server-assigned id.
pub struct Session {
    pub token: String,
    pub player_id: PlayerId,
}

pub struct TestServer {
    pub app: Arc<App>,
    router: Router,
    _temp_dir: TempDir,
}

impl TestServer {
    pub async fn setup() -> Self {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let db_path = temp_dir.path().join("e2e.db");
        let pool = sqlite::connect(db_path.to_str().expect("utf-8 temp path"))
            .await
            .expect("open database");
        sqlite::schema::ensure_schema(&pool).await.expect("ensure schema");

        let auth = Arc::new(AuthTokens::new("e2e-secret", Duration::hours(1)));
        let app = Arc::new(App::new(pool, auth));
        let router = api::routes().with_state(app.clone());

        Self {
            app,
            router,
            _temp_dir: temp_dir,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, path, token, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.request(Method::POST, path, token, Some(body)).await
    }

    pub async fn patch(
        &self,
        path: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.request(Method::PATCH, path, token, Some(body)).await
    }

    /// Register an account through the API and hand back its session.
    pub async fn register(&self, email: &str, display_name: &str, role: &str) -> Session {
        let (status, body) = self
            .post(
                "/v1/auth/register",
                None,
                json!({
                    "email": email,
                    "displayName": display_name,
                    "password": PASSWORD,
                    "role": role,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

        Session {
            token: body["token"].as_str().expect("token in response").to_string(),
            player_id: parse_id(&body["player"]["id"]),
        }
    }

    /// Credit gold outside the API, as if earned in earlier play.
    pub async fn grant_gold(&self, player_id: PlayerId, amount: i64) {
        let mut tx = self.app.repositories.ledger.begin().await.expect("begin tx");
        tx.credit_gold(player_id, amount, chrono::Utc::now())
            .await
            .expect("credit gold");
        tx.commit().await.expect("commit");
    }

    /// Create an item definition directly; items have no authoring endpoint.
    pub async fn create_item(&self, name: &str, tradable: bool) -> ItemId {
        let now = chrono::Utc::now();
        let item = ItemDef {
            id: ItemId::new(),
            item_type: "weapon".into(),
            rarity: "common".into(),
            name: name.into(),
            description: "Test item".into(),
            stats: json!({"attack": 1}),
            tradable,
            base_value: 10,
            created_at: now,
            updated_at: now,
        };
        self.app.repositories.item.create(&item).await.expect("create item");
        item.id
    }

    /// Put items into a player's bag outside the API.
    pub async fn grant_items(&self, player_id: PlayerId, item_id: ItemId, qty: i64) {
        self.app
            .repositories
            .inventory
            .add(player_id, item_id, qty, chrono::Utc::now())
            .await
            .expect("grant items");
    }

    /// Author and publish a two-step dungeon through the API.
    ///
    /// Step 1 sits at ([`STEP_1_LAT`], [`STEP_1_LON`]) with an 80 m radius
    /// and awards 50 gold plus one of `reward_item` when given; step 2 sits
    /// at ([`STEP_2_LAT`], [`STEP_2_LON`]) with 100 m and awards 120 gold.
    pub async fn publish_two_step_dungeon(
        &self,
        mj: &Session,
        reward_item: Option<ItemId>,
    ) -> (Uuid, Uuid, Uuid) {
        let (status, body) = self
            .post(
                "/v1/dungeons",
                Some(&mj.token),
                json!({
                    "title": "Crypt of Webs",
                    "description": "A spider-infested crypt under the city",
                    "areaName": "Old Town",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create dungeon: {body}");
        let dungeon_id = body["id"].as_str().expect("dungeon id").to_string();

        let reward_items = match reward_item {
            Some(item_id) => json!([{"itemId": item_id, "qty": 1}]),
            None => json!([]),
        };
        let (status, body) = self
            .post(
                &format!("/v1/dungeons/{dungeon_id}/steps"),
                Some(&mj.token),
                json!({
                    "order": 1,
                    "name": "Gatekeeper",
                    "location": {"lat": STEP_1_LAT, "lon": STEP_1_LON, "radiusMeters": 80.0},
                    "zoneDescription": "The crypt entrance",
                    "difficulty": 2,
                    "rewards": {"gold": 50, "items": reward_items},
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create step 1: {body}");
        let step_1 = body["id"].as_str().expect("step id").to_string();

        let (status, body) = self
            .post(
                &format!("/v1/dungeons/{dungeon_id}/steps"),
                Some(&mj.token),
                json!({
                    "order": 2,
                    "name": "Broodmother",
                    "location": {"lat": STEP_2_LAT, "lon": STEP_2_LON, "radiusMeters": 100.0},
                    "zoneDescription": "The central chamber",
                    "difficulty": 5,
                    "rewards": {"gold": 120, "items": []},
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create step 2: {body}");
        let step_2 = body["id"].as_str().expect("step id").to_string();

        let (status, body) = self
            .post(
                &format!("/v1/dungeons/{dungeon_id}/publish"),
                Some(&mj.token),
                json!({}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "publish: {body}");

        (
            Uuid::parse_str(&dungeon_id).expect("dungeon uuid"),
            Uuid::parse_str(&step_1).expect("step 1 uuid"),
            Uuid::parse_str(&step_2).expect("step 2 uuid"),
        )
    }

    /// Start a run for the dungeon and return its id.
    pub async fn start_run(&self, session: &Session, dungeon_id: Uuid) -> Uuid {
        let (status, body) = self
            .post(
                "/v1/runs",
                Some(&session.token),
                json!({"dungeonId": dungeon_id}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "start run: {body}");
        Uuid::parse_str(body["id"].as_str().expect("run id")).expect("run uuid")
    }

    /// POST an attempt at the given coordinates.
    pub async fn attempt(
        &self,
        session: &Session,
        run_id: Uuid,
        step_id: Uuid,
        lat: f64,
        lon: f64,
        key: &str,
    ) -> (StatusCode, Value) {
        self.post(
            &format!("/v1/runs/{run_id}/steps/{step_id}/attempt"),
            Some(&session.token),
            json!({"lat": lat, "lon": lon, "idempotencyKey": key}),
        )
        .await
    }

    /// Current gold balance as seen through `/v1/me`.
    pub async fn gold(&self, session: &Session) -> i64 {
        let (status, body) = self.get("/v1/me", Some(&session.token)).await;
        assert_eq!(status, StatusCode::OK, "me: {body}");
        body["wallet"]["gold"].as_i64().expect("gold balance")
    }

    /// Inventory quantity of one item as seen through `/v1/me/inventory`.
    pub async fn inventory_qty(&self, session: &Session, item_id: ItemId) -> i64 {
        let (status, body) = self.get("/v1/me/inventory", Some(&session.token)).await;
        assert_eq!(status, StatusCode::OK, "inventory: {body}");
        body["items"]
            .as_array()
            .expect("items array")
            .iter()
            .find(|entry| entry["itemId"] == json!(item_id))
            .and_then(|entry| entry["qty"].as_i64())
            .unwrap_or(0)
    }
}

pub fn parse_id(value: &Value) -> PlayerId {
    PlayerId::from_uuid(
        Uuid::parse_str(value.as_str().expect("id string")).expect("well-formed uuid"),
    )
}

/// Shorthand for asserting the error envelope code.
pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or("<missing>")
}
