//! Video packet wire record.
//!
//! ```text
//! pts:   i64  (8)   presentation timestamp, or NO_PTS for a parameter set
//! size:  u32  (4)
//! data:  [u8] (size)
//! ```

use std::fmt::Debug;

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::AsyncRead;

use crate::codec::{FieldReader, WireEncode};
use crate::error::ScrcpyError;

/// PTS sentinel marking a codec configuration packet.
pub const NO_PTS: i64 = -1;

#[derive(Clone, PartialEq, Eq)]
pub struct VideoPacket {
    pub pts: i64,
    pub size: u32,
    pub data: Bytes,
}

impl VideoPacket {
    /// Fixed-size prefix before the payload.
    pub const HEADER_LEN: usize = 12;

    /// A frame packet whose `size` matches `data`.
    pub fn frame(pts: i64, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            pts,
            size: data.len() as u32,
            data,
        }
    }

    /// A parameter-set packet (`pts == NO_PTS`).
    pub fn configuration(data: impl Into<Bytes>) -> Self {
        Self::frame(NO_PTS, data)
    }

    pub fn is_configuration(&self) -> bool {
        self.pts == NO_PTS
    }

    /// Decode one packet, suspending until all of its bytes arrive.
    pub async fn read_from<R: AsyncRead + Unpin>(
        reader: &mut FieldReader<R>,
    ) -> Result<Self, ScrcpyError> {
        let pts = reader.read_i64().await?;
        let size = reader.read_u32().await?;
        let data = reader.read_bytes(size as usize).await?;
        Ok(Self { pts, size, data })
    }
}

impl WireEncode for VideoPacket {
    fn encoded_len(&self) -> usize {
        Self::HEADER_LEN + self.data.len()
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(self.encoded_len());
        dst.put_i64(self.pts);
        dst.put_u32(self.size);
        dst.put_slice(&self.data);
    }
}

impl Debug for VideoPacket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoPacket")
            .field("pts", &self.pts)
            .field("size", &self.size)
            .field("data_len", &self.data.len())
            .finish()
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    #[test]
    fn wire_layout() {
        let bytes = VideoPacket::frame(0x0102, vec![0xAA, 0xBB]).to_bytes();
        assert_eq!(
            &bytes[..],
            &[0, 0, 0, 0, 0, 0, 0x01, 0x02, 0, 0, 0, 2, 0xAA, 0xBB]
        );
    }

    #[test]
    fn configuration_uses_sentinel() {
        let packet = VideoPacket::configuration(vec![1, 2, 3]);
        assert!(packet.is_configuration());
        assert_eq!(packet.to_bytes()[..8], [0xFF; 8]);
        assert!(!VideoPacket::frame(0, Bytes::new()).is_configuration());
    }

    #[test]
    fn size_is_written_as_stored() {
        let mut packet = VideoPacket::frame(1, vec![9, 9, 9]);
        packet.size = 7;
        let bytes = packet.to_bytes();
        assert_eq!(bytes[8..12], [0, 0, 0, 7]);
        assert_eq!(bytes.len(), VideoPacket::HEADER_LEN + 3);
    }

    #[tokio::test]
    async fn truncated_payload_is_stream_end() {
        let mut bytes = VideoPacket::frame(5, vec![1, 2, 3, 4]).to_bytes().to_vec();
        bytes.truncate(14);
        let mut reader = FieldReader::new(Cursor::new(bytes));
        let err = VideoPacket::read_from(&mut reader).await.unwrap_err();
        assert!(err.is_stream_end());
    }

    proptest! {
        #[test]
        fn decode_reproduces_encoded_packet(
            pts in any::<i64>(),
            data in proptest::collection::vec(any::<u8>(), 0..512),
        ) {
            let packet = VideoPacket::frame(pts, data);
            let wire = packet.to_bytes().to_vec();

            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let decoded = runtime.block_on(async {
                let mut reader = FieldReader::new(Cursor::new(wire));
                VideoPacket::read_from(&mut reader).await
            }).unwrap();

            prop_assert_eq!(decoded, packet);
        }
    }
}
