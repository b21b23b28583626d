//! Server module for Wayfarer
//!
//! - `config`: configuration structures
//! - `loader`: layered loading from files and environment
//! - `providers`: Gemini and Amap MCP construction
//! - `validation`: production configuration warnings
//! - `init`: assistant wiring, router and run loop

pub mod config;
mod init;
mod loader;
mod providers;
mod validation;

pub use init::{build_app, build_assistant, run};
pub use loader::load_config;
pub use providers::{resolve_key, AMAP_KEY_VAR, LLM_KEY_VAR};
