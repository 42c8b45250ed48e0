//! Annex B NAL unit splitting and emulation-prevention removal.

use std::borrow::Cow;

/// `nal_unit_type` of a sequence parameter set.
pub const NAL_TYPE_SPS: u8 = 7;

/// `nal_unit_type` of a picture parameter set.
pub const NAL_TYPE_PPS: u8 = 8;

/// Low five bits of the NAL header byte.
pub fn nal_unit_type(header: u8) -> u8 {
    header & 0x1F
}

/// Split an Annex B byte stream on `00 00 01` / `00 00 00 01` start codes.
///
/// Bytes before the first start code are skipped. Trailing zero bytes of
/// each unit belong to the next start code and are dropped.
pub fn split_annex_b(data: &[u8]) -> Vec<&[u8]> {
    let mut starts = Vec::new();
    let mut i = 0;
    while i + 3 <= data.len() {
        if data[i] == 0 && data[i + 1] == 0 && data[i + 2] == 1 {
            starts.push(i + 3);
            i += 3;
        } else {
            i += 1;
        }
    }

    let mut units = Vec::with_capacity(starts.len());
    for (n, &start) in starts.iter().enumerate() {
        let mut end = match starts.get(n + 1) {
            Some(&next) => next - 3,
            None => data.len(),
        };
        while end > start && data[end - 1] == 0 {
            end -= 1;
        }
        if end > start {
            units.push(&data[start..end]);
        }
    }
    units
}

/// Remove `0x03` bytes inserted after every `00 00` pair.
pub fn strip_emulation_prevention(nal: &[u8]) -> Cow<'_, [u8]> {
    let needs_strip = nal.windows(3).any(|w| w == [0, 0, 3]);
    if !needs_strip {
        return Cow::Borrowed(nal);
    }

    let mut out = Vec::with_capacity(nal.len());
    let mut zeros = 0;
    for &byte in nal {
        if zeros >= 2 && byte == 3 {
            zeros = 0;
            continue;
        }
        zeros = if byte == 0 { zeros + 1 } else { 0 };
        out.push(byte);
    }
    Cow::Owned(out)
}
