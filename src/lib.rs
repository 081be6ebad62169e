//! astro-bridge: natal charts overlaid with transits, for AI assistants.
//!
//! The [`render`] module holds the aspect-overlay renderer. Planet positions
//! come from an external calculation API through [`chart`], and the result is
//! served over HTTP by [`api`] and as MCP tools by [`mcp`].

pub mod api;
pub mod chart;
pub mod config;
pub mod mcp;
pub mod models;
pub mod render;
