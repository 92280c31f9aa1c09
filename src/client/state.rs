//! Connection state.

/// Where a connection is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// No stream.
    #[default]
    Disconnected,
    /// Dialing or handshaking.
    Connecting,
    /// Stream live, registration not yet confirmed.
    Connected,
    /// The server sent its welcome.
    Registered,
}

/// What the server told us about itself during registration.
///
/// Each field is written at most once per connection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerInfo {
    /// `001` text.
    pub welcome: Option<String>,
    /// `002` text.
    pub your_host: Option<String>,
    /// `003` text.
    pub created: Option<String>,
    /// Server name from `004`.
    pub server_name: Option<String>,
    /// Server version from `004`.
    pub version: Option<String>,
    /// User modes from `004`.
    pub user_modes: Option<String>,
    /// Channel modes from `004`.
    pub channel_modes: Option<String>,
}

impl ServerInfo {
    /// Sets `slot` unless it already holds a value.
    pub(crate) fn set_once(slot: &mut Option<String>, value: &str) {
        if slot.is_none() {
            *slot = Some(value.to_owned());
        }
    }
}

/// Our own identity on the connection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelfUser {
    /// Current nickname, as last requested or confirmed by the server.
    pub nickname: Option<String>,
    /// Username sent with USER.
    pub username: Option<String>,
    /// Real name sent with USER.
    pub realname: Option<String>,
}

/// A snapshot of a connection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionState {
    /// Lifecycle phase.
    pub phase: Phase,
    /// Server details.
    pub server_info: ServerInfo,
    /// Our identity.
    pub self_user: SelfUser,
}

impl ConnectionState {
    /// Whether a stream is live.
    pub fn is_connected(&self) -> bool {
        matches!(self.phase, Phase::Connected | Phase::Registered)
    }

    /// Whether the server confirmed registration.
    pub fn is_registered(&self) -> bool {
        self.phase == Phase::Registered
    }
}
