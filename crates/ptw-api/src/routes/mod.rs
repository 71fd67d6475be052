//! # API Route Modules
//!
//! Each module exposes `router() -> Router<AppState>`; [`crate::app`]
//! merges them under the authenticated `/v1` surface.

pub mod identities;
pub mod notifications;
pub mod permits;
pub mod risk;
