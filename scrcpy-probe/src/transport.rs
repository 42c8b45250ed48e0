//! TCP transport for sockets already forwarded to the host, e.g. with
//! `adb forward tcp:27183 localabstract:scrcpy` or
//! `adb reverse localabstract:scrcpy tcp:27183`.

use std::io;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use scrcpy_core::{DeviceSocket, DeviceTransport, Strategy};

/// Maps every device service to one host address: forward mode connects to
/// it, reverse mode listens on it.
pub struct TcpTransport {
    address: String,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl TcpTransport {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            listener: Mutex::new(None),
        }
    }

    fn stop_listener(&self) {
        let handle = match self.listener.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.stop_listener();
    }
}

#[async_trait]
impl Strategy for TcpTransport {
    fn name(&self) -> &'static str {
        "tcp"
    }

    async fn is_supported(&self) -> bool {
        true
    }
}

#[async_trait]
impl DeviceTransport for TcpTransport {
    async fn connect(&self, service: &str) -> io::Result<DeviceSocket> {
        let stream = TcpStream::connect(&self.address).await?;
        stream.set_nodelay(true)?;
        debug!(service, address = %self.address, "tcp connected");
        Ok(Box::new(stream))
    }

    async fn add_reverse_tunnel(
        &self,
        device_address: &str,
    ) -> io::Result<mpsc::Receiver<DeviceSocket>> {
        let listener = TcpListener::bind(&self.address).await?;
        debug!(device_address, address = %self.address, "tcp listening");

        let (tx, rx) = mpsc::channel(2);
        let handle = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        debug!(%peer, "device socket accepted");
                        if tx.send(Box::new(stream) as DeviceSocket).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("accept failed: {e}");
                        break;
                    }
                }
            }
        });

        self.stop_listener();
        if let Ok(mut guard) = self.listener.lock() {
            *guard = Some(handle);
        }
        Ok(rx)
    }

    async fn remove_reverse_tunnel(&self, _device_address: &str) -> io::Result<()> {
        self.stop_listener();
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────
