//! # Meshlens Profile
//!
//! Saved network profiles and the engine configuration they render to.
//!
//! ## Core Components
//!
//! - [`NetworkProfile`]: Flat settings for one network
//! - [`ProfileBook`]: Ordered profiles with one active, never empty
//! - [`ProfileStore`]: JSON persistence for the book
//! - [`EngineConfig`]: The engine's TOML document
//!
//! ## Example
//!
//! ```rust,ignore
//! use meshlens_profile::ProfileStore;
//!
//! let store = ProfileStore::new(&data_dir);
//! let mut book = store.load();
//! book.add_new();
//! store.save(&book)?;
//!
//! println!("{}", book.active().render_toml()?);
//! ```

mod book;
mod engine_config;
mod error;
mod profile;
mod store;

pub use book::ProfileBook;
pub use engine_config::{
    EngineConfig, Flags, NetworkIdentity, PeerConfig, PortForwardConfig, ProxyNetworkConfig,
    VpnPortalConfig,
};
pub use error::{ProfileError, ProfileResult};
pub use profile::{DEFAULT_INSTANCE_NAME, NetworkProfile, PortForwardItem, lines};
pub use store::ProfileStore;
