//! Command modules for `fcli tool`.
//!
//! ## Per-tool Commands
//!
//! - [`install`] - Install a tool version
//! - [`uninstall`] - Remove the installed version
//! - [`list`] - List published and installed versions
//!
//! ## Catalog Commands
//!
//! - [`definitions`] - Update the local tool definitions

pub mod definitions;
pub mod install;
pub mod list;
pub mod uninstall;
