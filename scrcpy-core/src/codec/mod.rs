//! Binary codec layer for fixed-schema wire records.
//!
//! Every multi-byte field on the scrcpy wire is big-endian. Records are
//! decoded one field at a time from an exact-count reader ([`FieldReader`])
//! and encoded into a [`BytesMut`] by types implementing [`WireEncode`].
//! Field order is fixed per record type.

use std::io;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::ScrcpyError;

// ── WireEncode ───────────────────────────────────────────────────

/// A record with a fixed binary layout.
///
/// Length fields are written exactly as stored; implementations never
/// recompute them from their paired buffers.
pub trait WireEncode {
    /// Number of bytes [`encode`](Self::encode) appends.
    fn encoded_len(&self) -> usize;

    /// Append the record's wire bytes to `dst`.
    fn encode(&self, dst: &mut BytesMut);

    /// Encode into a fresh, exactly sized buffer.
    fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf);
        buf.freeze()
    }
}

// ── FieldReader ──────────────────────────────────────────────────

/// Initial capacity cap for variable-length fields.
const READ_CHUNK_LIMIT: usize = 64 * 1024;

/// Exact-count field reader over a raw byte source.
///
/// Each call consumes exactly the bytes of one field and suspends until
/// they are available. A source that closes before a field completes
/// yields [`ScrcpyError::StreamEnded`]. No bytes are read ahead, so
/// [`into_inner`](Self::into_inner) hands back the source positioned right
/// after the last decoded field.
#[derive(Debug)]
pub struct FieldReader<R> {
    inner: R,
}

impl<R: AsyncRead + Unpin> FieldReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub async fn read_u8(&mut self) -> Result<u8, ScrcpyError> {
        self.inner.read_u8().await.map_err(map_read_error)
    }

    pub async fn read_u16(&mut self) -> Result<u16, ScrcpyError> {
        self.inner.read_u16().await.map_err(map_read_error)
    }

    pub async fn read_u32(&mut self) -> Result<u32, ScrcpyError> {
        self.inner.read_u32().await.map_err(map_read_error)
    }

    pub async fn read_i32(&mut self) -> Result<i32, ScrcpyError> {
        self.inner.read_i32().await.map_err(map_read_error)
    }

    pub async fn read_i64(&mut self) -> Result<i64, ScrcpyError> {
        self.inner.read_i64().await.map_err(map_read_error)
    }

    /// Read exactly `len` bytes.
    ///
    /// The buffer grows with the bytes actually received, so a bogus
    /// length field cannot force a large up-front allocation.
    pub async fn read_bytes(&mut self, len: usize) -> Result<Bytes, ScrcpyError> {
        let mut buf = Vec::with_capacity(len.min(READ_CHUNK_LIMIT));
        (&mut self.inner)
            .take(len as u64)
            .read_to_end(&mut buf)
            .await
            .map_err(map_read_error)?;
        if buf.len() < len {
            return Err(ScrcpyError::StreamEnded);
        }
        Ok(Bytes::from(buf))
    }

    /// Release the underlying source, e.g. for pass-through chunk reads.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Closed or reset sources end the stream; anything else is a transport fault.
pub(crate) fn map_read_error(e: io::Error) -> ScrcpyError {
    match e.kind() {
        io::ErrorKind::UnexpectedEof
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe => ScrcpyError::StreamEnded,
        _ => ScrcpyError::Connection(e),
    }
}

// ── Tests ────────────────────────────────────────────────────────
