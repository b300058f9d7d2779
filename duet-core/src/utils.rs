pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun1.l.google.com:19302";

/// Port the relay listens on unless configured otherwise.
pub const DEFAULT_RELAY_PORT: u16 = 3000;

pub fn default_relay_url() -> String {
    format!("ws://localhost:{}", DEFAULT_RELAY_PORT)
}
