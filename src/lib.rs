//! Tilebridge: asynchronous map-render job dispatch.
//!
//! The bridge accepts a submission referencing a caller-owned map, runs the
//! costly synchronous render on the blocking pool, and delivers exactly one
//! completion (tile bytes or error) back on the runtime. The render itself
//! lives behind [`render::TileRenderer`]; this crate owns the
//! offload-and-complete protocol around it: mutual exclusion per map,
//! worker-to-completion handoff, and single-fire completion on every path.

pub mod config;
pub mod dispatch;
pub mod domain;
pub mod infra;
pub mod render;
