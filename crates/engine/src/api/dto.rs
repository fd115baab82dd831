//! Request and response bodies for the HTTP API.
//!
//! Requests carry `validator` bounds checked by [`ValidatedJson`]; responses
//! are thin views over domain types so handlers never leak storage details.
//!
//! [`ValidatedJson`]: super::extract::ValidatedJson

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use dungeons_domain::{
    BossLocation, BossStep, Dungeon, InventoryEntry, ItemId, PageParams, Player, PlayerId,
    Rewards, Role,
};

use crate::use_cases::player::AuthSession;

// ---------------------------------------------------------------------------
// Auth and players
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email, length(max = 254))]
    pub email: String,
    #[validate(length(min = 3, max = 64))]
    pub display_name: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// Defaults to [`Role::Player`] when omitted.
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email, length(max = 254))]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlayerRequest {
    #[validate(length(min = 3, max = 64))]
    pub display_name: String,
}

// ---------------------------------------------------------------------------
// Dungeon authoring
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDungeonRequest {
    #[validate(length(min = 3, max = 120))]
    pub title: String,
    #[validate(length(min = 3, max = 1024))]
    pub description: String,
    #[validate(length(min = 2, max = 120))]
    pub area_name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDungeonRequest {
    #[validate(length(min = 3, max = 120))]
    pub title: String,
    #[validate(length(min = 3, max = 1024))]
    pub description: String,
    #[validate(length(min = 2, max = 120))]
    pub area_name: String,
}

/// Geofence centre and radius for a boss step. The radius lower bound is
/// enforced by the authoring use case so it also covers stored steps.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LocationRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
    pub radius_meters: f64,
}

impl From<LocationRequest> for BossLocation {
    fn from(req: LocationRequest) -> Self {
        BossLocation {
            lat: req.lat,
            lon: req.lon,
            radius_meters: req.radius_meters,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStepRequest {
    #[validate(range(min = 1))]
    pub order: u32,
    #[validate(length(min = 2, max = 120))]
    pub name: String,
    #[validate(nested)]
    pub location: LocationRequest,
    #[validate(length(min = 2, max = 512))]
    pub zone_description: String,
    #[validate(range(min = 1, max = 10))]
    pub difficulty: u8,
    pub rewards: Rewards,
}

/// Same shape as [`CreateStepRequest`] minus `order`, which only the reorder
/// endpoint may change.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStepRequest {
    #[validate(length(min = 2, max = 120))]
    pub name: String,
    #[validate(nested)]
    pub location: LocationRequest,
    #[validate(length(min = 2, max = 512))]
    pub zone_description: String,
    #[validate(range(min = 1, max = 10))]
    pub difficulty: u8,
    pub rewards: Rewards,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReorderStepsRequest {
    #[validate(length(min = 1))]
    pub step_ids: Vec<Uuid>,
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartRunRequest {
    pub dungeon_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
    #[validate(length(min = 8, max = 128))]
    pub idempotency_key: String,
}

// ---------------------------------------------------------------------------
// Marketplace
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub item_id: Uuid,
    #[validate(range(min = 1))]
    pub qty: i64,
    #[validate(range(min = 1))]
    pub price_per_unit: i64,
    #[validate(range(min = 1, max = 720))]
    pub expires_in_hours: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BuyListingRequest {
    #[validate(range(min = 1))]
    pub qty: i64,
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Raw `?page=&limit=` query values. Out-of-range values are clamped rather
/// than rejected, so this carries no validator bounds.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn params(&self) -> PageParams {
        PageParams::new(self.page, self.limit)
    }
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

/// Standard envelope for list endpoints: `{"data": [...], "pagination": {...}}`.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(data: Vec<T>, params: PageParams) -> Self {
        Self {
            data,
            pagination: Pagination {
                page: params.page(),
                limit: params.limit(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct WalletResponse {
    pub gold: i64,
}

/// Public view of a player account. Never exposes the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub id: PlayerId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub wallet: WalletResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Player> for PlayerResponse {
    fn from(player: Player) -> Self {
        Self {
            id: player.id,
            email: player.email,
            display_name: player.display_name,
            role: player.role,
            wallet: WalletResponse { gold: player.gold },
            created_at: player.created_at,
            updated_at: player.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub player: PlayerResponse,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token,
            player: session.player.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemResponse {
    pub item_id: ItemId,
    pub qty: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryResponse {
    pub player_id: PlayerId,
    pub items: Vec<InventoryItemResponse>,
}

impl InventoryResponse {
    pub fn new(player_id: PlayerId, entries: Vec<InventoryEntry>) -> Self {
        Self {
            player_id,
            items: entries
                .into_iter()
                .map(|e| InventoryItemResponse {
                    item_id: e.item_id,
                    qty: e.qty,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DungeonDetailResponse {
    pub dungeon: Dungeon,
    pub steps: Vec<BossStep>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_register_body_is_well_formed_validation_passes() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "email": "ada@example.com",
            "displayName": "Ada",
            "password": "correct horse",
        }))
        .unwrap();

        assert!(req.validate().is_ok());
        assert!(req.role.is_none());
    }

    #[test]
    fn when_email_is_malformed_validation_fails() {
        let req = RegisterRequest {
            email: "not-an-email".into(),
            display_name: "Ada".into(),
            password: "correct horse".into(),
            role: None,
        };

        assert!(req.validate().is_err());
    }

    #[test]
    fn when_step_latitude_is_out_of_range_nested_validation_fails() {
        let req: CreateStepRequest = serde_json::from_value(serde_json::json!({
            "order": 1,
            "name": "Gatekeeper",
            "location": {"lat": 95.0, "lon": 2.35, "radiusMeters": 80.0},
            "zoneDescription": "North gate",
            "difficulty": 3,
            "rewards": {"gold": 50, "items": []},
        }))
        .unwrap();

        assert!(req.validate().is_err());
    }

    #[test]
    fn when_expiry_is_omitted_listing_validation_passes() {
        let req: CreateListingRequest = serde_json::from_value(serde_json::json!({
            "itemId": Uuid::new_v4(),
            "qty": 3,
            "pricePerUnit": 10,
        }))
        .unwrap();

        assert!(req.validate().is_ok());
        assert!(req.expires_in_hours.is_none());
    }

    #[test]
    fn page_query_clamps_out_of_range_values() {
        let params = PageQuery {
            page: Some(0),
            limit: Some(10_000),
        }
        .params();

        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 20);
    }

    #[test]
    fn player_response_hides_password_hash() {
        let player = crate::test_fixtures::test_player(Role::Player, 100);
        let body = serde_json::to_value(PlayerResponse::from(player)).unwrap();

        assert!(body.get("passwordHash").is_none());
        assert!(body.get("password_hash").is_none());
        assert_eq!(body["wallet"]["gold"], 100);
    }
}
