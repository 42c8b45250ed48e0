//! Option Value Model.
//!
//! [`ScrcpyOptions`] pairs the user's partial [`OptionsInit`] with a
//! [`ProtocolRevision`]. Defaults are resolved only when arguments are
//! formatted; the stored value is never filled in.

pub mod codec_options;
pub mod revision;
pub mod value;

pub use codec_options::{CodecOptionValue, CodecOptions};
pub use revision::{
    BackOrScreenOnLayout, ConnectionPolicy, InjectScrollLayout, ProtocolRevision, V1_16,
};
pub use value::{LogLevel, OptionKey, OptionValue, OptionsInit, UNSET_PLACEHOLDER, VideoOrientation};

use std::sync::Arc;

use bytes::Bytes;
use tokio_util::codec::FramedWrite;
use tracing::info;

use crate::connection::{
    ConnectionOptions, ConnectionSettings, DeviceSocket, DeviceTransport, ScrcpyConnection,
    StrategySelector, TunnelMode,
};
use crate::control::{BackOrScreenOn, ControlMessage, ControlMessageEncoder, InjectScroll};
use crate::error::ScrcpyError;

#[derive(Debug, Clone)]
pub struct ScrcpyOptions {
    revision: &'static ProtocolRevision,
    value: OptionsInit,
    exact_base: bool,
}

impl ScrcpyOptions {
    /// Options for exactly the 1.16 server.
    ///
    /// A `verbose` log level is lowered to `debug` and an `initial`
    /// orientation lock to `unlocked`.
    pub fn v1_16(init: OptionsInit) -> Self {
        Self::new(&V1_16, init, true)
    }

    /// Options for a revision extending 1.16. No values are rewritten.
    pub fn extended(revision: &'static ProtocolRevision, init: OptionsInit) -> Self {
        Self::new(revision, init, false)
    }

    fn new(revision: &'static ProtocolRevision, mut init: OptionsInit, exact_base: bool) -> Self {
        if exact_base {
            if init.log_level == Some(LogLevel::Verbose) {
                init.log_level = Some(LogLevel::Debug);
            }
            if init.lock_video_orientation == Some(VideoOrientation::Initial) {
                init.lock_video_orientation = Some(VideoOrientation::Unlocked);
            }
        }
        Self {
            revision,
            value: init,
            exact_base,
        }
    }

    pub fn value(&self) -> &OptionsInit {
        &self.value
    }

    pub fn revision(&self) -> &'static ProtocolRevision {
        self.revision
    }

    pub fn is_exact_base(&self) -> bool {
        self.exact_base
    }

    /// User value for `key`, else the revision default.
    pub fn resolved(&self, key: OptionKey) -> OptionValue {
        self.value
            .get(key)
            .unwrap_or_else(|| self.revision.default_value(key))
    }

    // ── Server arguments ─────────────────────────────────────────

    /// Positional arguments in revision order.
    pub fn format_server_arguments(&self) -> Vec<String> {
        self.revision
            .option_order()
            .into_iter()
            .map(|key| self.resolved(key).render())
            .collect()
    }

    pub fn output_encoder_name_pattern(&self) -> &'static str {
        self.revision.encoder_name_pattern
    }

    // ── Connection ───────────────────────────────────────────────

    pub fn tunnel_mode(&self) -> TunnelMode {
        if self.resolved(OptionKey::TunnelForward).as_bool() == Some(true) {
            TunnelMode::Forward
        } else {
            TunnelMode::Reverse
        }
    }

    pub fn send_frame_meta(&self) -> bool {
        self.resolved(OptionKey::SendFrameMeta).as_bool().unwrap_or(true)
    }

    pub fn connection_options(&self) -> ConnectionOptions {
        let control = match self.revision.connection {
            ConnectionPolicy::Legacy => true,
            ConnectionPolicy::ControlFromOptions => {
                self.resolved(OptionKey::Control).as_bool().unwrap_or(true)
            }
        };
        ConnectionOptions {
            control,
            send_dummy_byte: true,
            send_device_meta: true,
        }
    }

    /// Wire `transport` for this configuration.
    pub fn create_connection(&self, transport: Arc<dyn DeviceTransport>) -> ScrcpyConnection {
        let mode = self.tunnel_mode();
        let options = self.connection_options();
        info!(
            revision = self.revision.version,
            transport = transport.name(),
            ?mode,
            control = options.control,
            "creating connection"
        );
        ScrcpyConnection::new(transport, mode, options)
    }

    /// Pick the first supported transport and wire it, as one step.
    pub async fn negotiate_connection(
        &self,
        transports: &StrategySelector<dyn DeviceTransport>,
        settings: ConnectionSettings,
    ) -> Result<ScrcpyConnection, ScrcpyError> {
        transports
            .negotiate(|transport| async move {
                let mut connection = self.create_connection(transport).with_settings(settings);
                connection.initialize().await?;
                Ok(connection)
            })
            .await
    }

    // ── Control ──────────────────────────────────────────────────

    pub fn control_encoder(&self) -> ControlMessageEncoder {
        ControlMessageEncoder::new(self.revision)
    }

    pub fn serialize_control_message(&self, message: &ControlMessage) -> Option<Bytes> {
        self.control_encoder().serialize(message)
    }

    pub fn serialize_back_or_screen_on_control_message(
        &self,
        message: &BackOrScreenOn,
    ) -> Option<Bytes> {
        self.control_encoder()
            .serialize_back_or_screen_on(message, self.revision.back_or_screen_on)
    }

    /// `layout` defaults to the revision's; pass [`InjectScrollLayout::Base`]
    /// to talk to an older server.
    pub fn serialize_inject_scroll_control_message(
        &self,
        message: &InjectScroll,
        layout: Option<InjectScrollLayout>,
    ) -> Option<Bytes> {
        self.control_encoder()
            .serialize_inject_scroll(message, layout.unwrap_or(self.revision.inject_scroll))
    }

    /// Message sink over the control socket.
    pub fn control_sink(&self, socket: DeviceSocket) -> FramedWrite<DeviceSocket, ControlMessageEncoder> {
        FramedWrite::new(socket, self.control_encoder())
    }
}
