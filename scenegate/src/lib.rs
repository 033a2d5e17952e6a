//! SceneGate - Planet satellite imagery gateway
//!
//! This library searches Planet's Data API for recent scenes around a point,
//! looks up individual scenes and proxies their map tiles, and serves all
//! three to map clients over HTTP.
//!
//! # Modules
//!
//! - [`geometry`]: point buffering for spatial search filters
//! - [`search`]: search criteria documents sent to the provider
//! - [`scene`]: scene metadata as returned to callers
//! - [`provider`]: the provider trait and its Planet implementation
//! - [`gateway`]: the HTTP front end
//! - [`config`] and [`logging`]: process setup

pub mod config;
pub mod gateway;
pub mod geometry;
pub mod logging;
pub mod provider;
pub mod scene;
pub mod search;
