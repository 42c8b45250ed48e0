//! Sequence parameter set parsing, up to and including frame cropping.
//!
//! VUI parameters and anything after the cropping fields are not read.

use bitflags::bitflags;

use crate::error::ParseError;
use crate::h264::bits::BitReader;

bitflags! {
    /// `constraint_set0_flag` .. `constraint_set5_flag` plus the two reserved bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConstraintSet: u8 {
        const SET0 = 0x80;
        const SET1 = 0x40;
        const SET2 = 0x20;
        const SET3 = 0x10;
        const SET4 = 0x08;
        const SET5 = 0x04;
    }
}

/// Profiles whose SPS carries chroma format, bit depth and scaling matrices.
const HIGH_PROFILES: [u8; 13] = [100, 110, 122, 244, 44, 83, 86, 118, 128, 138, 139, 134, 135];

/// Codec profile, level and picture geometry from one SPS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSetInfo {
    pub profile_index: u8,
    pub constraint_set: ConstraintSet,
    pub level_index: u8,
    pub encoded_width: u32,
    pub encoded_height: u32,
    pub crop_left: u32,
    pub crop_right: u32,
    pub crop_top: u32,
    pub crop_bottom: u32,
    pub cropped_width: u32,
    pub cropped_height: u32,
}

/// Parse an SPS RBSP that starts at `profile_idc`.
///
/// The NAL header byte must already be removed and emulation-prevention
/// bytes stripped.
pub fn parse_sequence_parameter_set(rbsp: &[u8]) -> Result<ParameterSetInfo, ParseError> {
    let mut r = BitReader::new(rbsp);

    let profile_index = r.read_u8()?;
    let constraint_set = ConstraintSet::from_bits_retain(r.read_u8()?);
    let level_index = r.read_u8()?;

    let _seq_parameter_set_id = r.read_ue()?;

    if HIGH_PROFILES.contains(&profile_index) {
        let chroma_format_idc = r.read_ue()?;
        if chroma_format_idc == 3 {
            let _separate_colour_plane_flag = r.read_bit()?;
        }
        let _bit_depth_luma_minus8 = r.read_ue()?;
        let _bit_depth_chroma_minus8 = r.read_ue()?;
        let _qpprime_y_zero_transform_bypass_flag = r.read_bit()?;
        if r.read_bit()? {
            let list_count = if chroma_format_idc == 3 { 12 } else { 8 };
            for i in 0..list_count {
                if r.read_bit()? {
                    skip_scaling_list(&mut r, if i < 6 { 16 } else { 64 })?;
                }
            }
        }
    }

    let _log2_max_frame_num_minus4 = r.read_ue()?;
    match r.read_ue()? {
        0 => {
            let _log2_max_pic_order_cnt_lsb_minus4 = r.read_ue()?;
        }
        1 => {
            let _delta_pic_order_always_zero_flag = r.read_bit()?;
            let _offset_for_non_ref_pic = r.read_se()?;
            let _offset_for_top_to_bottom_field = r.read_se()?;
            let cycle = r.read_ue()?;
            for _ in 0..cycle {
                let _offset_for_ref_frame = r.read_se()?;
            }
        }
        _ => {}
    }

    let _max_num_ref_frames = r.read_ue()?;
    let _gaps_in_frame_num_value_allowed_flag = r.read_bit()?;
    let pic_width_in_mbs_minus1 = r.read_ue()?;
    let pic_height_in_map_units_minus1 = r.read_ue()?;
    let frame_mbs_only_flag = r.read_bit()?;
    if !frame_mbs_only_flag {
        let _mb_adaptive_frame_field_flag = r.read_bit()?;
    }
    let _direct_8x8_inference_flag = r.read_bit()?;

    let (mut crop_left, mut crop_right, mut crop_top, mut crop_bottom) = (0, 0, 0, 0);
    if r.read_bit()? {
        crop_left = r.read_ue()?;
        crop_right = r.read_ue()?;
        crop_top = r.read_ue()?;
        crop_bottom = r.read_ue()?;
    }

    let encoded_width = (pic_width_in_mbs_minus1 as u64 + 1) * 16;
    let field_factor = if frame_mbs_only_flag { 1 } else { 2 };
    let encoded_height = (pic_height_in_map_units_minus1 as u64 + 1) * field_factor * 16;

    let crop_left = chroma_crop(crop_left, "frame_crop_left_offset")?;
    let crop_right = chroma_crop(crop_right, "frame_crop_right_offset")?;
    let crop_top = chroma_crop(crop_top, "frame_crop_top_offset")?;
    let crop_bottom = chroma_crop(crop_bottom, "frame_crop_bottom_offset")?;

    let encoded_width = to_u32(encoded_width, "pic_width_in_mbs_minus1")?;
    let encoded_height = to_u32(encoded_height, "pic_height_in_map_units_minus1")?;

    Ok(ParameterSetInfo {
        profile_index,
        constraint_set,
        level_index,
        encoded_width,
        encoded_height,
        crop_left,
        crop_right,
        crop_top,
        crop_bottom,
        cropped_width: cropped(encoded_width, crop_left, crop_right, "width")?,
        cropped_height: cropped(encoded_height, crop_top, crop_bottom, "height")?,
    })
}

fn skip_scaling_list(r: &mut BitReader<'_>, size: usize) -> Result<(), ParseError> {
    let mut last_scale: i64 = 8;
    let mut next_scale: i64 = 8;
    for _ in 0..size {
        if next_scale != 0 {
            let delta_scale = r.read_se()? as i64;
            next_scale = (last_scale + delta_scale).rem_euclid(256);
        }
        if next_scale != 0 {
            last_scale = next_scale;
        }
    }
    Ok(())
}

/// Crop offsets are in chroma sample units; 4:2:0 doubles them.
fn chroma_crop(offset: u32, field: &'static str) -> Result<u32, ParseError> {
    offset
        .checked_mul(2)
        .ok_or(ParseError::ValueOutOfRange(field))
}

fn to_u32(value: u64, field: &'static str) -> Result<u32, ParseError> {
    u32::try_from(value).map_err(|_| ParseError::ValueOutOfRange(field))
}

fn cropped(size: u32, a: u32, b: u32, dimension: &'static str) -> Result<u32, ParseError> {
    let crop = a
        .checked_add(b)
        .ok_or(ParseError::ValueOutOfRange("frame crop"))?;
    size.checked_sub(crop).ok_or(ParseError::InvalidCrop {
        dimension,
        crop,
        size,
    })
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::h264::bits::test_writer::BitWriter;

    /// Baseline SPS with the given geometry and crop offsets.
    fn baseline_sps(width_mbs: u32, height_units: u32, frame_mbs_only: bool, crop: Option<[u32; 4]>) -> Vec<u8> {
        let mut w = BitWriter::new();
        w.bits(66, 8).bits(0xC0, 8).bits(31, 8);
        w.ue(0).ue(0).ue(2).ue(1).bit(false);
        w.ue(width_mbs).ue(height_units).bit(frame_mbs_only);
        if !frame_mbs_only {
            w.bit(false);
        }
        w.bit(true);
        match crop {
            Some([l, r, t, b]) => {
                w.bit(true).ue(l).ue(r).ue(t).ue(b);
            }
            None => {
                w.bit(false);
            }
        }
        w.bit(false);
        w.finish()
    }

    #[test]
    fn parses_720p_without_crop() {
        let info = parse_sequence_parameter_set(&baseline_sps(79, 44, true, None)).unwrap();
        assert_eq!(info.profile_index, 66);
        assert_eq!(info.constraint_set, ConstraintSet::SET0 | ConstraintSet::SET1);
        assert_eq!(info.level_index, 31);
        assert_eq!((info.encoded_width, info.encoded_height), (1280, 720));
        assert_eq!((info.cropped_width, info.cropped_height), (1280, 720));
        assert_eq!(
            (info.crop_left, info.crop_right, info.crop_top, info.crop_bottom),
            (0, 0, 0, 0)
        );
    }

    #[test]
    fn left_crop_is_doubled() {
        let sps = baseline_sps(79, 44, true, Some([2, 0, 0, 0]));
        let info = parse_sequence_parameter_set(&sps).unwrap();
        assert_eq!(info.crop_left, 4);
        assert_eq!(info.cropped_width, 1276);
        assert_eq!(info.cropped_height, 720);
    }

    #[test]
    fn full_hd_bottom_crop() {
        let sps = baseline_sps(119, 67, true, Some([0, 0, 0, 4]));
        let info = parse_sequence_parameter_set(&sps).unwrap();
        assert_eq!((info.encoded_width, info.encoded_height), (1920, 1088));
        assert_eq!(info.cropped_height, 1080);
    }

    #[test]
    fn field_coding_doubles_height() {
        let sps = baseline_sps(44, 17, false, None);
        let info = parse_sequence_parameter_set(&sps).unwrap();
        assert_eq!((info.encoded_width, info.encoded_height), (720, 576));
    }

    #[test]
    fn high_profile_with_scaling_matrix() {
        let mut w = BitWriter::new();
        w.bits(100, 8).bits(0, 8).bits(40, 8);
        w.ue(0);
        // chroma_format_idc, bit depths, bypass flag, scaling matrix present
        w.ue(1).ue(0).ue(0).bit(false).bit(true);
        // list 0 present with a non-trivial delta run, the other seven absent
        w.bit(true).se(-8);
        for _ in 1..8 {
            w.bit(false);
        }
        // pic_order_cnt_type 1 with a two-entry cycle
        w.ue(0).ue(1).bit(false).se(-2).se(1).ue(2).se(3).se(-3);
        w.ue(4).bit(false).ue(119).ue(67).bit(true).bit(true);
        w.bit(true).ue(0).ue(0).ue(0).ue(4).bit(false);
        let info = parse_sequence_parameter_set(&w.finish()).unwrap();

        assert_eq!(info.profile_index, 100);
        assert!(info.constraint_set.is_empty());
        assert_eq!((info.cropped_width, info.cropped_height), (1920, 1080));
    }

    #[test]
    fn truncated_sps_fails() {
        let sps = baseline_sps(79, 44, true, None);
        let err = parse_sequence_parameter_set(&sps[..5]).unwrap_err();
        assert!(matches!(err, ParseError::Exhausted { .. }));
    }

    #[test]
    fn oversized_crop_is_rejected() {
        let sps = baseline_sps(0, 0, true, Some([5, 5, 0, 0]));
        assert_eq!(
            parse_sequence_parameter_set(&sps),
            Err(ParseError::InvalidCrop {
                dimension: "width",
                crop: 20,
                size: 16
            })
        );
    }
}
