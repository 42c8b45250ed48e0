//! Video stream decoder.
//!
//! Turns the raw video socket into a lazy sequence of
//! [`VideoStreamEvent`]s. The mode is fixed per stream:
//!
//! - **frame meta off**: every chunk read from the source becomes a
//!   [`VideoStreamEvent::Frame`] verbatim.
//! - **frame meta on**: the source is a sequence of [`VideoPacket`]s. A
//!   packet with `pts == NO_PTS` carries the codec parameter sets; it is
//!   parsed into a [`VideoStreamEvent::Configuration`] and its raw bytes are
//!   held until the next frame packet, which is emitted with them prepended.
//!
//! Source closure, at a record boundary or mid-record, ends the sequence
//! without an error item. A parameter-set parse failure yields one `Err`
//! item and ends the sequence.

pub mod meta;

pub use meta::DeviceMeta;

use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, StreamExt};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;
use tracing::{debug, trace};

use crate::codec::{FieldReader, map_read_error};
use crate::error::ScrcpyError;
use crate::h264::{self, ParameterSetInfo};
use crate::packet::VideoPacket;

// ── Events ───────────────────────────────────────────────────────

/// Encoded frame bytes, possibly prefixed with the preceding parameter sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    /// Presentation timestamp; `None` when the server sends no frame meta.
    pub pts: Option<i64>,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoStreamEvent {
    Configuration(ParameterSetInfo),
    Frame(VideoFrame),
}

/// Pull-based event sequence; polling requires exclusive access.
pub type VideoEventStream = BoxStream<'static, Result<VideoStreamEvent, ScrcpyError>>;

/// Decode `source` into a stream of video events.
pub fn decode_video_stream<R>(source: R, send_frame_meta: bool) -> VideoEventStream
where
    R: AsyncRead + Unpin + Send + 'static,
{
    if send_frame_meta {
        framed_events(source)
    } else {
        passthrough_events(source)
    }
}

// ── Frame meta on ────────────────────────────────────────────────

struct PacketState<R> {
    reader: FieldReader<R>,
    /// Raw parameter-set bytes waiting for the next frame.
    header: Option<Bytes>,
    finished: bool,
}

impl<R: AsyncRead + Unpin> PacketState<R> {
    async fn next_event(&mut self) -> Result<VideoStreamEvent, ScrcpyError> {
        let packet = VideoPacket::read_from(&mut self.reader).await?;

        if packet.is_configuration() {
            let info = h264::parse_configuration(&packet.data)?;
            debug!(
                profile = info.profile_index,
                level = info.level_index,
                width = info.cropped_width,
                height = info.cropped_height,
                "video configuration"
            );
            self.header = Some(packet.data);
            return Ok(VideoStreamEvent::Configuration(info));
        }

        let data = match self.header.take() {
            Some(header) => {
                let mut merged = BytesMut::with_capacity(header.len() + packet.data.len());
                merged.extend_from_slice(&header);
                merged.extend_from_slice(&packet.data);
                merged.freeze()
            }
            None => packet.data,
        };
        trace!(pts = packet.pts, len = data.len(), "video frame");
        Ok(VideoStreamEvent::Frame(VideoFrame {
            pts: Some(packet.pts),
            data,
        }))
    }
}

fn framed_events<R>(source: R) -> VideoEventStream
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let state = PacketState {
        reader: FieldReader::new(source),
        header: None,
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }
        match state.next_event().await {
            Ok(event) => Some((Ok(event), state)),
            Err(ScrcpyError::StreamEnded) => {
                debug!("video stream ended");
                None
            }
            Err(e) => {
                state.finished = true;
                Some((Err(e), state))
            }
        }
    })
    .boxed()
}

// ── Frame meta off ───────────────────────────────────────────────

fn passthrough_events<R>(source: R) -> VideoEventStream
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let chunks = ReaderStream::new(source);

    stream::unfold((chunks, false), |(mut chunks, finished)| async move {
        if finished {
            return None;
        }
        match chunks.next().await? {
            Ok(data) => {
                trace!(len = data.len(), "video chunk");
                let event = VideoStreamEvent::Frame(VideoFrame { pts: None, data });
                Some((Ok(event), (chunks, false)))
            }
            Err(e) => match map_read_error(e) {
                ScrcpyError::StreamEnded => {
                    debug!("video stream ended");
                    None
                }
                other => Some((Err(other), (chunks, true))),
            },
        }
    })
    .boxed()
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::WireEncode;
    use crate::error::ParseError;
    use std::io::Cursor;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    const SPS_720P: [u8; 13] = [
        0, 0, 0, 1, 0x67, 0x42, 0xC0, 0x1F, 0xDA, 0x01, 0x40, 0x16, 0xE4,
    ];

    fn wire(packets: &[VideoPacket]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for packet in packets {
            packet.encode(&mut buf);
        }
        buf.to_vec()
    }

    async fn collect(stream: VideoEventStream) -> Vec<Result<VideoStreamEvent, ScrcpyError>> {
        stream.collect().await
    }

    fn frame_data(event: &Result<VideoStreamEvent, ScrcpyError>) -> &[u8] {
        match event {
            Ok(VideoStreamEvent::Frame(frame)) => &frame.data,
            other => panic!("expected frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn configuration_is_merged_into_next_frame() {
        let bytes = wire(&[
            VideoPacket::configuration(SPS_720P.to_vec()),
            VideoPacket::frame(100, vec![0x65, 0x88]),
            VideoPacket::frame(200, vec![0x41, 0x9A]),
        ]);
        let events = collect(decode_video_stream(Cursor::new(bytes), true)).await;

        assert_eq!(events.len(), 3);
        match &events[0] {
            Ok(VideoStreamEvent::Configuration(info)) => {
                assert_eq!((info.encoded_width, info.encoded_height), (1280, 720));
            }
            other => panic!("expected configuration, got {other:?}"),
        }

        let mut merged = SPS_720P.to_vec();
        merged.extend_from_slice(&[0x65, 0x88]);
        assert_eq!(frame_data(&events[1]), &merged[..]);
        assert_eq!(frame_data(&events[2]), &[0x41, 0x9A]);
    }

    #[tokio::test]
    async fn frame_without_configuration_is_unmodified() {
        let bytes = wire(&[VideoPacket::frame(7, vec![1, 2, 3])]);
        let events = collect(decode_video_stream(Cursor::new(bytes), true)).await;

        assert_eq!(events.len(), 1);
        match &events[0] {
            Ok(VideoStreamEvent::Frame(frame)) => {
                assert_eq!(frame.pts, Some(7));
                assert_eq!(&frame.data[..], &[1, 2, 3]);
            }
            other => panic!("expected frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn mid_record_closure_ends_cleanly() {
        let mut bytes = wire(&[
            VideoPacket::frame(1, vec![9; 16]),
            VideoPacket::frame(2, vec![8; 16]),
        ]);
        bytes.truncate(bytes.len() - 5);
        let events = collect(decode_video_stream(Cursor::new(bytes), true)).await;

        assert_eq!(events.len(), 1);
        assert_eq!(frame_data(&events[0]), &[9; 16]);
    }

    #[tokio::test]
    async fn parse_error_is_terminal() {
        let bytes = wire(&[
            VideoPacket::configuration(vec![0, 0, 0, 1, 0x67, 0x42]),
            VideoPacket::frame(1, vec![1]),
        ]);
        let events = collect(decode_video_stream(Cursor::new(bytes), true)).await;

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Err(ScrcpyError::Parse(ParseError::Exhausted { .. }))
        ));
    }

    #[tokio::test]
    async fn passthrough_wraps_chunks_verbatim() {
        let mock = tokio_test::io::Builder::new()
            .read(&[1, 2, 3])
            .read(&[4, 5])
            .build();
        let events = collect(decode_video_stream(mock, false)).await;

        assert_eq!(events.len(), 2);
        assert_eq!(frame_data(&events[0]), &[1, 2, 3]);
        assert_eq!(frame_data(&events[1]), &[4, 5]);
        assert!(matches!(
            &events[0],
            Ok(VideoStreamEvent::Frame(VideoFrame { pts: None, .. }))
        ));
    }

    #[tokio::test]
    async fn pull_waits_for_source_bytes() {
        let (mut device, host) = tokio::io::duplex(64);
        let mut events = decode_video_stream(host, true);

        let pending = tokio::time::timeout(Duration::from_millis(20), events.next()).await;
        assert!(pending.is_err());

        device
            .write_all(&VideoPacket::frame(3, vec![0xAB]).to_bytes())
            .await
            .unwrap();
        let event = events.next().await.unwrap().unwrap();
        assert_eq!(
            event,
            VideoStreamEvent::Frame(VideoFrame {
                pts: Some(3),
                data: Bytes::from_static(&[0xAB]),
            })
        );

        drop(device);
        assert!(events.next().await.is_none());
    }
}
