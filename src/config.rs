//! Process configuration read from the environment

use crate::types::{ExhaustionPolicy, GameConfig};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 8888;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load config from environment variables
    ///
    /// Unparseable values are logged and replaced by their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let game = GameConfig {
            answer_timeout_secs: env_or(
                "PARTY_ANSWER_TIMEOUT_SECS",
                defaults.game.answer_timeout_secs,
            ),
            vote_timeout_secs: env_or("PARTY_VOTE_TIMEOUT_SECS", defaults.game.vote_timeout_secs),
            exhaustion: env_or::<ExhaustionPolicy>(
                "PARTY_QUESTION_EXHAUSTION",
                defaults.game.exhaustion,
            ),
            event_buffer: defaults.game.event_buffer,
        };

        Self {
            bind_addr: env_or("PARTY_BIND_ADDR", defaults.bind_addr),
            port: env_or("PARTY_PORT", defaults.port),
            game,
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Debug,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => match raw.trim().parse() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Invalid {}={:?} ({}), using {:?}", key, raw, e, default);
                default
            }
        },
        _ => default,
    }
}
