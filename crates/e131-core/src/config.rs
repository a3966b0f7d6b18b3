//! Receiver configuration.
//!
//! Every field has a default, so a partial JSON document is enough:
//!
//! ```
//! use e131_core::ReceiverConfig;
//!
//! let config: ReceiverConfig = serde_json::from_str(r#"{ "reuse_addr": true }"#)?;
//! assert_eq!(config.port, 5568);
//! assert!(config.reuse_addr);
//! # Ok::<(), serde_json::Error>(())
//! ```

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

/// Standard sACN UDP port.
pub const DEFAULT_PORT: u16 = 5568;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// UDP port to listen on; 0 lets the OS choose.
    pub port: u16,
    /// Local interface address used for the multicast join.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<Ipv4Addr>,
    /// Set `SO_REUSEADDR` so several receivers can share the port.
    pub reuse_addr: bool,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            interface: None,
            reuse_addr: false,
        }
    }
}
