use dungeons_domain::Player;

/// A freshly issued session: the signed token plus the account it belongs to.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub player: Player,
}
