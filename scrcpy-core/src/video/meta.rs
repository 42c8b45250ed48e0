//! Device metadata sent at the head of the video socket.
//!
//! ```text
//! device_name:  [u8; 64]  NUL-padded UTF-8
//! width:        u16
//! height:       u16
//! ```

use bytes::{BufMut, BytesMut};
use tokio::io::AsyncRead;

use crate::codec::{FieldReader, WireEncode};
use crate::error::ScrcpyError;

/// Fixed width of the device name field.
pub const DEVICE_NAME_FIELD_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceMeta {
    pub device_name: String,
    pub width: u16,
    pub height: u16,
}

impl DeviceMeta {
    pub const SIZE: usize = DEVICE_NAME_FIELD_LENGTH + 4;

    pub async fn read_from<R: AsyncRead + Unpin>(
        reader: &mut FieldReader<R>,
    ) -> Result<Self, ScrcpyError> {
        let name = reader.read_bytes(DEVICE_NAME_FIELD_LENGTH).await?;
        let end = name.iter().position(|&b| b == 0).unwrap_or(name.len());
        let device_name = std::str::from_utf8(&name[..end])
            .map_err(|_| ScrcpyError::InvalidMetadata("device name is not utf-8"))?
            .to_string();
        let width = reader.read_u16().await?;
        let height = reader.read_u16().await?;
        Ok(Self {
            device_name,
            width,
            height,
        })
    }
}

impl WireEncode for DeviceMeta {
    fn encoded_len(&self) -> usize {
        Self::SIZE
    }

    /// Names longer than the field are cut at the last character boundary
    /// that fits.
    fn encode(&self, dst: &mut BytesMut) {
        let name = &self.device_name;
        let mut len = name.len().min(DEVICE_NAME_FIELD_LENGTH);
        while !name.is_char_boundary(len) {
            len -= 1;
        }
        dst.put_slice(&name.as_bytes()[..len]);
        dst.put_bytes(0, DEVICE_NAME_FIELD_LENGTH - len);
        dst.put_u16(self.width);
        dst.put_u16(self.height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn reads_padded_name() {
        let meta = DeviceMeta {
            device_name: "Pixel 7".into(),
            width: 1080,
            height: 2400,
        };
        let wire = meta.to_bytes();
        assert_eq!(wire.len(), DeviceMeta::SIZE);

        let mut reader = FieldReader::new(Cursor::new(wire.to_vec()));
        assert_eq!(DeviceMeta::read_from(&mut reader).await.unwrap(), meta);
    }

    #[tokio::test]
    async fn long_multibyte_name_is_cut_on_char_boundary() {
        // 21 three-byte characters: byte 64 falls inside the 22nd.
        let meta = DeviceMeta {
            device_name: "端".repeat(22),
            width: 1,
            height: 2,
        };
        let wire = meta.to_bytes();
        assert_eq!(wire.len(), DeviceMeta::SIZE);

        let mut reader = FieldReader::new(Cursor::new(wire.to_vec()));
        let decoded = DeviceMeta::read_from(&mut reader).await.unwrap();
        assert_eq!(decoded.device_name, "端".repeat(21));
        assert_eq!((decoded.width, decoded.height), (1, 2));
    }

    #[tokio::test]
    async fn invalid_utf8_name() {
        let mut wire = vec![0xFFu8; DEVICE_NAME_FIELD_LENGTH];
        wire.extend_from_slice(&[0, 1, 0, 1]);
        let mut reader = FieldReader::new(Cursor::new(wire));
        assert!(matches!(
            DeviceMeta::read_from(&mut reader).await,
            Err(ScrcpyError::InvalidMetadata(_))
        ));
    }

    #[tokio::test]
    async fn truncated_meta_is_stream_end() {
        let mut reader = FieldReader::new(Cursor::new(vec![b'a'; 10]));
        let err = DeviceMeta::read_from(&mut reader).await.unwrap_err();
        assert!(err.is_stream_end());
    }
}
