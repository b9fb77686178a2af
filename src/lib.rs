//! # cwiz
//!
//! An async client for WiZ smart lights speaking the UDP pilot protocol.
//!
//! Commands are small JSON-shaped datagrams sent to port 38899. Replies are
//! read with a tolerant field extractor rather than a full JSON parser, and
//! every request is retried with a growing wait bound since the transport is
//! lossy.
//!
//! ## Quick Start
//!
//! ```ignore
//! use cwiz::{Bulb, PilotBuilder};
//!
//! async fn control_light() -> Result<(), cwiz::Error> {
//!     let mut bulb = Bulb::create("192.168.1.100").await?;
//!
//!     let mut pilot = PilotBuilder::new();
//!     pilot.rgb(0, 0, 255).brightness(60);
//!     bulb.apply(&pilot).await?;
//!
//!     let state = bulb.refresh_state().await?;
//!     println!("on: {}, brightness: {}", state.emitting(), state.brightness().value());
//!     Ok(())
//! }
//! ```
//!
//! ## Discovery
//!
//! ```ignore
//! use std::time::Duration;
//! use cwiz::{BulbRegistry, discover_bulbs};
//!
//! let mut registry = BulbRegistry::new();
//! discover_bulbs(&mut registry, "255.255.255.255", Duration::from_secs(3)).await?;
//! for bulb in &registry {
//!     println!("{} at {}", bulb.mac, bulb.ip);
//! }
//! ```
//!
//! ## Cached state
//!
//! A [`Bulb`] keeps the last known settings in a [`BulbState`]. Commands
//! update the cache once the bulb acknowledges them and
//! [`Bulb::refresh_state`] merges only the fields the bulb reports, so the
//! cache may be stale.
//!
//! ## Runtime Selection
//!
//! The crate is runtime-agnostic. Select the runtime with a feature flag:
//!
//! - `runtime-tokio` (default): Use the tokio async runtime
//! - `runtime-async-std`: Use the async-std runtime
//! - `runtime-smol`: Use the smol runtime
//!
//! ```toml
//! [dependencies]
//! cwiz = { version = "1", default-features = false, features = ["runtime-smol"] }
//! ```

mod bulb;
pub mod codec;
mod discovery;
mod errors;
mod info;
mod pilot;
pub mod runtime;
mod state;
mod transport;
mod types;

/// UDP port WiZ bulbs listen on.
pub const PORT: u16 = 38899;

/// Lowest supported color temperature in Kelvin.
pub const TEMP_MIN: u16 = Kelvin::MIN;
/// Highest supported color temperature in Kelvin.
pub const TEMP_MAX: u16 = Kelvin::MAX;
/// Lowest brightness a bulb accepts.
pub const BRIGHTNESS_MIN: u8 = Brightness::MIN;
/// Highest brightness a bulb accepts.
pub const BRIGHTNESS_MAX: u8 = Brightness::MAX;

pub use bulb::{Bulb, clamp_brightness, clamp_temperature};
pub use codec::MAX_MESSAGE_LEN;
pub use discovery::{BulbRegistry, DiscoveredBulb, discover_bulbs};
pub use errors::{Error, ErrorKind};
pub use info::BulbInfo;
pub use pilot::PilotBuilder;
pub use state::BulbState;
pub use transport::{RetryPolicy, send_and_await};
pub use types::{
    Brightness, Color, ColorRGBWW, Kelvin, PowerMode, SceneMode, hex_to_rgb, rgb_to_rgbcw,
};
