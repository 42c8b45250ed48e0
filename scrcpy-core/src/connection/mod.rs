//! Connection wiring between the host and the device server.
//!
//! A [`DeviceTransport`] supplies raw duplex sockets, either by connecting
//! to a device-side service (forward tunnel) or by accepting sockets the
//! device opens towards the host (reverse tunnel). [`ScrcpyConnection`]
//! runs the handshake on top: video socket first, then the optional control
//! socket, then the device metadata record on the video socket.

pub mod strategy;

pub use strategy::{Strategy, StrategySelector};

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::codec::FieldReader;
use crate::error::ScrcpyError;
use crate::video::DeviceMeta;

// ── Transport ────────────────────────────────────────────────────

/// A raw duplex byte channel to the device.
pub trait DeviceStream: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send + 'static> DeviceStream for T {}

pub type DeviceSocket = Box<dyn DeviceStream>;

/// Backend that opens channels to the device.
#[async_trait]
pub trait DeviceTransport: Strategy {
    /// Open a channel to `service` on the device, e.g. `localabstract:scrcpy`.
    async fn connect(&self, service: &str) -> io::Result<DeviceSocket>;

    /// Start accepting channels the device opens to `device_address`.
    async fn add_reverse_tunnel(
        &self,
        device_address: &str,
    ) -> io::Result<mpsc::Receiver<DeviceSocket>>;

    async fn remove_reverse_tunnel(&self, device_address: &str) -> io::Result<()>;
}

// ── Options ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunnelMode {
    /// Host connects to a device-side listener.
    Forward,
    /// Device connects back through a host-side listener.
    Reverse,
}

/// Handshake flags fixed by the protocol revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// Open a second socket for control messages.
    pub control: bool,
    /// Forward mode: the server writes one byte once it is listening.
    pub send_dummy_byte: bool,
    /// The server writes a [`DeviceMeta`] record on the video socket.
    pub send_device_meta: bool,
}

/// Tunables for connection setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Abstract socket name the server listens on or connects to.
    pub socket_name: String,
    /// Forward mode connect attempts while the server starts up.
    pub connect_attempts: u32,
    pub retry_delay_ms: u64,
    /// Reverse mode wait for each device socket.
    pub accept_timeout_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            socket_name: "scrcpy".into(),
            connect_attempts: 100,
            retry_delay_ms: 100,
            accept_timeout_ms: 10_000,
        }
    }
}

impl ConnectionSettings {
    pub fn device_address(&self) -> String {
        format!("localabstract:{}", self.socket_name)
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    fn accept_timeout(&self) -> Duration {
        Duration::from_millis(self.accept_timeout_ms)
    }
}

// ── ScrcpyConnection ─────────────────────────────────────────────

/// Sockets produced by a completed handshake.
pub struct ScrcpyStreams {
    pub video: DeviceSocket,
    pub control: Option<DeviceSocket>,
    pub device_meta: Option<DeviceMeta>,
}

impl std::fmt::Debug for ScrcpyStreams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrcpyStreams")
            .field("control", &self.control.is_some())
            .field("device_meta", &self.device_meta)
            .finish_non_exhaustive()
    }
}

pub struct ScrcpyConnection {
    transport: Arc<dyn DeviceTransport>,
    mode: TunnelMode,
    options: ConnectionOptions,
    settings: ConnectionSettings,
    incoming: Option<mpsc::Receiver<DeviceSocket>>,
}

impl ScrcpyConnection {
    pub fn new(
        transport: Arc<dyn DeviceTransport>,
        mode: TunnelMode,
        options: ConnectionOptions,
    ) -> Self {
        Self {
            transport,
            mode,
            options,
            settings: ConnectionSettings::default(),
            incoming: None,
        }
    }

    pub fn with_settings(mut self, settings: ConnectionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn mode(&self) -> TunnelMode {
        self.mode
    }

    pub fn options(&self) -> ConnectionOptions {
        self.options
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Prepare the transport before the server starts. Reverse mode must
    /// listen before the server tries to connect back.
    pub async fn initialize(&mut self) -> Result<(), ScrcpyError> {
        if self.mode == TunnelMode::Reverse && self.incoming.is_none() {
            let address = self.settings.device_address();
            let incoming = self.transport.add_reverse_tunnel(&address).await?;
            info!(transport = self.transport.name(), %address, "reverse tunnel registered");
            self.incoming = Some(incoming);
        }
        Ok(())
    }

    /// Complete the handshake once the server is running.
    pub async fn streams(&mut self) -> Result<ScrcpyStreams, ScrcpyError> {
        let (mut video, control) = match self.mode {
            TunnelMode::Forward => {
                let video = self.connect_video().await?;
                let control = if self.options.control {
                    Some(self.transport.connect(&self.settings.device_address()).await?)
                } else {
                    None
                };
                (video, control)
            }
            TunnelMode::Reverse => {
                self.initialize().await?;
                let video = self.accept().await?;
                let control = if self.options.control {
                    Some(self.accept().await?)
                } else {
                    None
                };
                (video, control)
            }
        };

        let device_meta = if self.options.send_device_meta {
            let mut reader = FieldReader::new(&mut video);
            let meta = DeviceMeta::read_from(&mut reader).await?;
            info!(
                device = %meta.device_name,
                width = meta.width,
                height = meta.height,
                "device connected"
            );
            Some(meta)
        } else {
            None
        };

        Ok(ScrcpyStreams {
            video,
            control,
            device_meta,
        })
    }

    /// Release transport resources.
    pub async fn close(&mut self) -> Result<(), ScrcpyError> {
        if self.incoming.take().is_some() {
            let address = self.settings.device_address();
            self.transport.remove_reverse_tunnel(&address).await?;
            debug!(%address, "reverse tunnel removed");
        }
        Ok(())
    }

    /// Forward mode: the device listener may not exist yet, so retry until
    /// a connect succeeds and, when enabled, the dummy byte arrives.
    async fn connect_video(&self) -> Result<DeviceSocket, ScrcpyError> {
        let address = self.settings.device_address();
        let attempts = self.settings.connect_attempts.max(1);

        for attempt in 1..=attempts {
            match self.try_connect_video(&address).await {
                Ok(socket) => {
                    debug!(attempt, %address, "video socket connected");
                    return Ok(socket);
                }
                Err(e) if attempt < attempts => {
                    debug!(attempt, error = %e, "video connect failed, retrying");
                    tokio::time::sleep(self.settings.retry_delay()).await;
                }
                Err(e) => {
                    warn!(attempts, error = %e, "giving up on video socket");
                    return Err(e);
                }
            }
        }
        Err(ScrcpyError::ChannelClosed)
    }

    async fn try_connect_video(&self, address: &str) -> Result<DeviceSocket, ScrcpyError> {
        let socket = self.transport.connect(address).await?;
        if !self.options.send_dummy_byte {
            return Ok(socket);
        }
        let mut reader = FieldReader::new(socket);
        reader.read_u8().await?;
        Ok(reader.into_inner())
    }

    async fn accept(&mut self) -> Result<DeviceSocket, ScrcpyError> {
        let timeout = self.settings.accept_timeout();
        let incoming = self.incoming.as_mut().ok_or(ScrcpyError::ChannelClosed)?;
        tokio::time::timeout(timeout, incoming.recv())
            .await
            .map_err(|_| ScrcpyError::Timeout(timeout))?
            .ok_or(ScrcpyError::ChannelClosed)
    }
}

// ── Tests ────────────────────────────────────────────────────────
