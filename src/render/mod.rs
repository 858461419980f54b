//! Rendering seam: the computation collaborator behind the dispatch core.
//!
//! Renderers are intentionally opaque to the bridge: blocking, potentially
//! slow, potentially failing. The bridge never inspects how a tile is
//! produced; it only truncates the scratch buffer to the reported byte
//! count and marshals the result back to the submitter.

mod types;
mod wire;

pub use types::{RenderError, RenderedTile, TileRenderer};
pub use wire::{MIN_SCRATCH_CAPACITY, WireTileRenderer};
