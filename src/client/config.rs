//! Client configuration.

use crate::line::MAX_IRC_LINE_LEN;

/// Connection and identity settings for [`Client::connect_with`].
///
/// [`Client::connect_with`]: super::Client::connect_with
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClientConfig {
    /// Server host name.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Secure the connection with the client's secure channel factory.
    pub use_tls: bool,
    /// Nickname to register with.
    pub nickname: String,
    /// Username for USER.
    pub username: String,
    /// Real name for USER.
    pub realname: String,
    /// Connection password, sent with PASS before registering.
    pub password: Option<String>,
    /// Longest inbound line accepted, in bytes.
    pub max_line_len: usize,
    /// Character encoding label, e.g. `utf-8` or `latin1`.
    pub encoding: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            host: "localhost".to_owned(),
            port: 6667,
            use_tls: false,
            nickname: "slirc".to_owned(),
            username: "slirc".to_owned(),
            realname: "slirc".to_owned(),
            password: None,
            max_line_len: MAX_IRC_LINE_LEN,
            encoding: "utf-8".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.port, 6667);
        assert_eq!(config.max_line_len, 8191);
        assert_eq!(config.encoding, "utf-8");
        assert!(config.password.is_none());
    }
}
