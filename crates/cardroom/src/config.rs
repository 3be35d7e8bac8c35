//! Server configuration, with defaults and environment overrides.

use std::net::SocketAddr;

use cardroom_protocol::RoomId;
use cardroom_room::RoomConfig;

/// Everything the server needs at start-up.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind: SocketAddr,
    /// Settings every room is created with.
    pub room: RoomConfig,
    /// Create a room on the first connect to an unknown id. When `false`,
    /// such connects are answered with 404 and rooms must be created
    /// explicitly.
    pub create_rooms_on_connect: bool,
    /// Rooms created before the first connection is accepted.
    pub default_rooms: Vec<RoomId>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 2222)),
            room: RoomConfig::default(),
            create_rooms_on_connect: true,
            default_rooms: Vec::new(),
        }
    }
}

/// A configuration value that couldn't be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

impl ServerConfig {
    /// Loads the defaults, overridden by any of these that are set:
    ///
    /// - `CARDROOM_BIND`: listen address, e.g. `0.0.0.0:2222`
    /// - `CARDROOM_MAX_PLAYERS`: seats per room
    /// - `CARDROOM_LAZY_ROOMS`: `true`/`false`, see
    ///   [`create_rooms_on_connect`](Self::create_rooms_on_connect)
    /// - `CARDROOM_DEFAULT_ROOMS`: comma-separated room ids
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] if a variable is set but can't be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through
    /// `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(bind) = lookup("CARDROOM_BIND") {
            config.bind = parse("CARDROOM_BIND", &bind)?;
        }
        if let Some(max) = lookup("CARDROOM_MAX_PLAYERS") {
            let max: usize = parse("CARDROOM_MAX_PLAYERS", &max)?;
            if max < 2 {
                return Err(ConfigError::Invalid {
                    var: "CARDROOM_MAX_PLAYERS".into(),
                    reason: "a table needs at least 2 seats".into(),
                });
            }
            config.room.max_players = max;
        }
        if let Some(lazy) = lookup("CARDROOM_LAZY_ROOMS") {
            config.create_rooms_on_connect = parse("CARDROOM_LAZY_ROOMS", &lazy)?;
        }
        if let Some(rooms) = lookup("CARDROOM_DEFAULT_ROOMS") {
            config.default_rooms = rooms
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(RoomId::from)
                .collect();
        }

        Ok(config)
    }
}

fn parse<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var: var.to_string(),
        reason: format!("{value:?}: {e}"),
    })
}
