//! H.264 parameter-set extraction.
//!
//! | Module | Purpose                                         |
//! |--------|-------------------------------------------------|
//! | `bits` | MSB-first bit reader, Exp-Golomb decoding       |
//! | `nal`  | Annex B splitting, emulation-prevention removal |
//! | `sps`  | Sequence parameter set → [`ParameterSetInfo`]   |

pub mod bits;
pub mod nal;
pub mod sps;

pub use bits::BitReader;
pub use sps::{ConstraintSet, ParameterSetInfo, parse_sequence_parameter_set};

use crate::error::ParseError;

/// Parse the first SPS found in an Annex B configuration packet.
pub fn parse_configuration(data: &[u8]) -> Result<ParameterSetInfo, ParseError> {
    let sps = nal::split_annex_b(data)
        .into_iter()
        .find(|unit| nal::nal_unit_type(unit[0]) == nal::NAL_TYPE_SPS)
        .ok_or(ParseError::MissingParameterSet)?;
    let rbsp = nal::strip_emulation_prevention(&sps[1..]);
    sps::parse_sequence_parameter_set(&rbsp)
}
