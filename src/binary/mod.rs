//! Binary resin slicer formats
//!
//! Each format has a decoder implementing [`ResinDecoder`]. A decoder either
//! recognises the buffer and returns a record, or declines with
//! [`Decoded::NoMatch`] so the next decoder in the chain gets a turn. The
//! [`GenericDecoder`] never declines and closes every chain that may see
//! foreign data.
//!
//! All fixed-offset reads go through [`cursor::ByteCursor`], so a truncated
//! or hostile file turns into an error value instead of a panic.

pub mod ctb;
pub mod cursor;
pub mod cxdlp;
pub mod generic;
pub mod heuristic;
pub mod photon;
pub mod preview;

pub use ctb::CtbDecoder;
pub use cxdlp::CxdlpDecoder;
pub use generic::GenericDecoder;
pub use photon::PhotonDecoder;

use crate::config::DecoderConfig;
use crate::model::{MaterialUnit, SlicerExtract};

/// Outcome of a single decoder
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// The decoder recognised the data
    Match(SlicerExtract),
    /// The data is not in this decoder's format
    NoMatch,
}

/// A decoder for one binary resin format
pub trait ResinDecoder {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Decode `data`
    ///
    /// Implementations must not panic on any input.
    fn decode(&self, data: &[u8], config: &DecoderConfig) -> Decoded;
}

/// Run decoders in order until one matches
///
/// An exhausted chain yields an empty millilitre record.
pub fn run_chain(chain: &[&dyn ResinDecoder], data: &[u8], config: &DecoderConfig) -> SlicerExtract {
    for decoder in chain {
        match decoder.decode(data, config) {
            Decoded::Match(extract) => {
                tracing::debug!(decoder = decoder.name(), "resin decoder matched");
                return extract;
            }
            Decoded::NoMatch => {
                tracing::debug!(decoder = decoder.name(), "resin decoder declined");
            }
        }
    }
    SlicerExtract::empty(MaterialUnit::Milliliters)
}
