//! scrcpy probe: decode a video stream and log what it carries.
//!
//! ```text
//! scrcpy-probe --print-args              Print server arguments for the config
//! scrcpy-probe --file capture.bin        Decode a captured video socket dump
//! scrcpy-probe --connect 127.0.0.1:27183 Decode a forwarded (or reversed) session
//! scrcpy-probe --gen-config              Dump default config and exit
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use futures::StreamExt;
use tokio::io::AsyncRead;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use scrcpy_core::{
    DeviceMeta, DeviceTransport, FieldReader, ScrcpyConnection, ScrcpyError, ScrcpyOptions,
    StrategySelector, VideoStreamEvent, decode_video_stream,
};
use scrcpy_probe::config::ProbeConfig;
use scrcpy_probe::transport::TcpTransport;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "scrcpy-probe", about = "scrcpy video stream probe")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "scrcpy-probe.toml")]
    config: PathBuf,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,

    /// Print the positional server arguments and exit.
    #[arg(long)]
    print_args: bool,

    /// Read the video socket bytes from a file.
    #[arg(short, long, conflicts_with = "connect")]
    file: Option<PathBuf>,

    /// Host address of the tunnelled server socket. `server.tunnel_forward`
    /// connects to it; otherwise the probe listens on it for the device.
    #[arg(long)]
    connect: Option<String>,

    /// `--file` only: the dump starts with the forward-tunnel dummy byte.
    #[arg(long)]
    dummy_byte: bool,

    /// `--file` only: the dump starts with the device metadata record.
    #[arg(long)]
    device_meta: bool,

    /// Stop after this many events.
    #[arg(long)]
    max_events: Option<usize>,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&ProbeConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let config = ProbeConfig::load(&cli.config);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("scrcpy-probe v{}", env!("CARGO_PKG_VERSION"));

    let options = ScrcpyOptions::v1_16(config.server.clone());

    if cli.print_args {
        println!("{}", options.format_server_arguments().join(" "));
        return Ok(());
    }

    let send_frame_meta = options.send_frame_meta();
    if let Some(path) = &cli.file {
        let source = tokio::fs::File::open(path).await?;
        info!("reading {}", path.display());
        let mut reader = FieldReader::new(source);
        if cli.dummy_byte {
            reader.read_u8().await?;
        }
        if cli.device_meta {
            log_device(&DeviceMeta::read_from(&mut reader).await?);
        }
        log_events(reader.into_inner(), &cli, send_frame_meta).await?;
    } else if let Some(addr) = &cli.connect {
        let transports: StrategySelector<dyn DeviceTransport> = StrategySelector::new(
            "transport",
            vec![Arc::new(TcpTransport::new(addr.clone())) as Arc<dyn DeviceTransport>],
        );
        let mut connection = options
            .negotiate_connection(&transports, config.connection.clone())
            .await?;
        info!(mode = ?connection.mode(), "waiting for the device server on {addr}");

        let result = session(&mut connection, &cli, send_frame_meta).await;
        connection.close().await?;
        result?;
    } else {
        warn!("no source given; use --file or --connect");
    }

    Ok(())
}

async fn session(
    connection: &mut ScrcpyConnection,
    cli: &Cli,
    send_frame_meta: bool,
) -> Result<(), ScrcpyError> {
    let streams = connection.streams().await?;
    if let Some(meta) = &streams.device_meta {
        log_device(meta);
    }
    log_events(streams.video, cli, send_frame_meta).await
}

fn log_device(meta: &DeviceMeta) {
    info!("device {:?} {}x{}", meta.device_name, meta.width, meta.height);
}

async fn log_events<R>(source: R, cli: &Cli, send_frame_meta: bool) -> Result<(), ScrcpyError>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut events = decode_video_stream(source, send_frame_meta);
    let mut configurations = 0usize;
    let mut frames = 0usize;
    let mut bytes = 0usize;

    while let Some(event) = events.next().await {
        match event {
            Ok(VideoStreamEvent::Configuration(info)) => {
                configurations += 1;
                info!(
                    "configuration: profile {} level {} {}x{} (encoded {}x{}, crop l{} r{} t{} b{})",
                    info.profile_index,
                    info.level_index,
                    info.cropped_width,
                    info.cropped_height,
                    info.encoded_width,
                    info.encoded_height,
                    info.crop_left,
                    info.crop_right,
                    info.crop_top,
                    info.crop_bottom,
                );
            }
            Ok(VideoStreamEvent::Frame(frame)) => {
                frames += 1;
                bytes += frame.data.len();
                tracing::debug!(pts = ?frame.pts, len = frame.data.len(), "frame");
            }
            Err(e) => {
                error!("video stream error: {e}");
                return Err(e);
            }
        }

        if cli
            .max_events
            .is_some_and(|max| configurations + frames >= max)
        {
            break;
        }
    }

    info!("{configurations} configuration(s), {frames} frame(s), {bytes} bytes");
    Ok(())
}
