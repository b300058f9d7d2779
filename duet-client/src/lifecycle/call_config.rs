use crate::error::ConfigError;
use crate::lifecycle::CallLimit;
use crate::transport::TransportConfig;
use duet_core::RoomId;
use duet_core::utils::default_relay_url;

#[derive(Debug, Clone)]
pub struct CallConfig {
    pub room_id: RoomId,
    pub relay_url: String,
    pub limit: Option<CallLimit>,
    pub transport: TransportConfig,
}

impl CallConfig {
    /// Untimed call through the local relay with the default STUN servers.
    pub fn new(room_id: impl Into<RoomId>) -> Self {
        Self {
            room_id: room_id.into(),
            relay_url: default_relay_url(),
            limit: None,
            transport: TransportConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.room_id.as_str().trim().is_empty() {
            return Err(ConfigError::EmptyRoom);
        }
        if let Some(limit) = &self.limit {
            limit.validate()?;
        }
        Ok(())
    }
}
