//! # scrcpy-core
//!
//! Host-side protocol library for the scrcpy device server.
//!
//! This crate contains:
//! - **Codec**: `FieldReader` and `WireEncode` for big-endian wire records
//! - **Packet**: `VideoPacket`, the framed unit of the video socket
//! - **H.264**: Annex-B splitting and sequence parameter set parsing
//! - **Video**: `decode_video_stream`, turning the video socket into configuration/frame events
//! - **Options**: `ScrcpyOptions` over a `ProtocolRevision` table, server argument formatting
//! - **Control**: `ControlMessage` family and the per-revision `ControlMessageEncoder`
//! - **Connection**: `DeviceTransport`, forward/reverse wiring, `StrategySelector`
//! - **Error**: `ScrcpyError`, a typed, `thiserror`-based error hierarchy

pub mod codec;
pub mod connection;
pub mod control;
pub mod error;
pub mod h264;
pub mod options;
pub mod packet;
pub mod video;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use codec::{FieldReader, WireEncode};
pub use connection::{
    ConnectionOptions, ConnectionSettings, DeviceSocket, DeviceStream, DeviceTransport,
    ScrcpyConnection, ScrcpyStreams, Strategy, StrategySelector, TunnelMode,
};
pub use control::{ControlMessage, ControlMessageEncoder, ControlMessageType};
pub use error::{ParseError, ScrcpyError};
pub use h264::{ConstraintSet, ParameterSetInfo};
pub use options::{
    CodecOptions, OptionKey, OptionValue, OptionsInit, ProtocolRevision, ScrcpyOptions, V1_16,
};
pub use packet::{NO_PTS, VideoPacket};
pub use video::{
    DeviceMeta, VideoEventStream, VideoFrame, VideoStreamEvent, decode_video_stream,
};
