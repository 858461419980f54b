use thiserror::Error;

use crate::domain::Map;

/// Raw output of one render pass.
///
/// Renderers may write into a scratch buffer sized ahead of time; only
/// `byte_count` bytes of it are meaningful. The dispatcher truncates to
/// exactly that length before handing bytes to the caller.
#[derive(Debug, Clone)]
pub struct RenderedTile {
    pub scratch: Vec<u8>,
    pub byte_count: usize,
}

impl RenderedTile {
    pub fn new(scratch: Vec<u8>, byte_count: usize) -> Self {
        debug_assert!(byte_count <= scratch.len());
        Self {
            scratch,
            byte_count,
        }
    }
}

/// Structured errors surfaced by tile renderers. Delivered to the caller as
/// the error arm of the completion callback, never as a process crash.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("render backend failed: {message}")]
    Backend { message: String },
    #[error("layer `{layer}` could not be encoded: {message}")]
    Encoding { layer: String, message: String },
    #[error("render worker lost before reporting a result")]
    WorkerLost,
}

impl RenderError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Computation collaborator executed on the blocking pool.
///
/// `render` may block for its whole duration and must not assume anything
/// about which thread invokes it. Implementations never see the completion
/// callback; they only report a tile or an error.
pub trait TileRenderer: Send + Sync {
    fn render(&self, map: &Map) -> Result<RenderedTile, RenderError>;
}
