use super::types::{RenderError, RenderedTile, TileRenderer};
use crate::domain::Map;

/// Renderers are expected to reserve scratch space up front; anything past
/// the reported byte count is padding the dispatcher discards.
pub const MIN_SCRATCH_CAPACITY: usize = 4096;

const WIRE_MAGIC: &[u8; 4] = b"TBW1";

/// Length-prefixed wire encoder standing in for a full vector-tile backend.
///
/// Writes a header (magic, extent, layer count) followed by each layer's
/// name and feature payloads, then zero-pads the scratch buffer up to
/// [`MIN_SCRATCH_CAPACITY`]. The meaningful byte count it reports is what
/// callers ultimately receive.
#[derive(Debug, Default, Clone)]
pub struct WireTileRenderer;

impl TileRenderer for WireTileRenderer {
    fn render(&self, map: &Map) -> Result<RenderedTile, RenderError> {
        let mut out = Vec::with_capacity(MIN_SCRATCH_CAPACITY);
        out.extend_from_slice(WIRE_MAGIC);
        out.extend_from_slice(&map.extent.to_le_bytes());
        out.extend_from_slice(&(map.layers.len() as u32).to_le_bytes());

        for layer in &map.layers {
            if layer.name.is_empty() {
                return Err(RenderError::Encoding {
                    layer: String::from("<unnamed>"),
                    message: String::from("layer name must not be empty"),
                });
            }
            write_chunk(&mut out, layer.name.as_bytes());
            out.extend_from_slice(&(layer.features.len() as u32).to_le_bytes());
            for feature in &layer.features {
                write_chunk(&mut out, feature.as_bytes());
            }
        }

        let byte_count = out.len();
        if out.len() < MIN_SCRATCH_CAPACITY {
            out.resize(MIN_SCRATCH_CAPACITY, 0);
        }

        Ok(RenderedTile::new(out, byte_count))
    }
}

fn write_chunk(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(bytes);
}
