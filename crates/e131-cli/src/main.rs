use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use e131_core::receiver::transport::{bind_sender, send_datagram};
use e131_core::{
    Cid, DEFAULT_PORT, DISCOVERY_UNIVERSE, DataOptions, DataPacket, DiscoveryOptions,
    DiscoveryPacket, DiscoveryReceiver, PacketReport, Payload, ReceiverConfig, ReceiverEvent,
    ReceiverError, SourceReport, UsageError, discovery_pages, multicast_group, parse_packet,
};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("E131_BUILD_COMMIT"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "e131")]
#[command(version = VERSION)]
#[command(
    about = "Encode, decode and discover E1.31 (sACN) traffic.",
    long_about = None,
    after_help = "Examples:\n  e131 decode datagram.bin --pretty\n  e131 encode data -u 1 -c 1=100 -o frame.bin\n  e131 discover --duration 30\n  e131 announce -u 1 2 3 --name \"Test Desk\""
)]
struct Cli {
    /// Increase log verbosity on stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode one raw E1.31 datagram and print it as JSON.
    Decode {
        /// File holding a single UDP payload
        input: PathBuf,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Build a packet and write the raw datagram to a file.
    Encode {
        #[command(subcommand)]
        command: EncodeCommands,
    },
    /// Listen for universe discovery and print one JSON line per event.
    Discover(DiscoverArgs),
    /// Send one round of universe discovery pages.
    Announce(AnnounceArgs),
}

#[derive(Subcommand, Debug)]
enum EncodeCommands {
    /// One universe discovery page (at most 512 universes).
    Discovery {
        /// Universe numbers, in list order
        #[arg(short = 'u', long = "universe", num_args = 1..)]
        universes: Vec<u16>,

        #[arg(long, default_value_t = 0)]
        page: u8,

        #[arg(long, default_value_t = 0)]
        last_page: u8,

        #[command(flatten)]
        identity: Identity,

        /// Output datagram path
        #[arg(short = 'o', long)]
        output: PathBuf,
    },
    /// One DMX data packet with 0-100 channel levels.
    Data {
        #[arg(short = 'u', long)]
        universe: u16,

        #[arg(long, default_value_t = 0)]
        sequence: u8,

        /// Channel level as CH=LEVEL (CH 1-512, LEVEL 0-100), repeatable
        #[arg(short = 'c', long = "channel", value_parser = parse_channel)]
        channels: Vec<(u32, u16)>,

        /// Priority 0-200 (default 100)
        #[arg(long)]
        priority: Option<u8>,

        #[command(flatten)]
        identity: Identity,

        /// Output datagram path
        #[arg(short = 'o', long)]
        output: PathBuf,
    },
}

#[derive(Args, Debug)]
struct Identity {
    /// Source name (truncated to 63 bytes)
    #[arg(long)]
    name: Option<String>,

    /// Sender CID in UUID form (hyphenated, braced, urn: or 32 hex digits)
    #[arg(long)]
    cid: Option<Cid>,
}

#[derive(Args, Debug)]
struct DiscoverArgs {
    /// UDP port (default 5568)
    #[arg(long)]
    port: Option<u16>,

    /// Local IPv4 interface for the multicast join
    #[arg(long)]
    iface: Option<Ipv4Addr>,

    /// Share the port with other receivers
    #[arg(long)]
    reuse_addr: bool,

    /// Receiver configuration file (JSON); flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    duration: Option<u64>,
}

#[derive(Args, Debug)]
struct AnnounceArgs {
    /// Universe numbers to announce
    #[arg(short = 'u', long = "universe", num_args = 1..)]
    universes: Vec<u16>,

    #[command(flatten)]
    identity: Identity,

    /// Local IPv4 interface for outgoing multicast
    #[arg(long)]
    iface: Option<Ipv4Addr>,

    /// Destination (default: the discovery multicast group on port 5568)
    #[arg(long)]
    dest: Option<SocketAddr>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Decode { input, pretty } => cmd_decode(&input, pretty),
        Commands::Encode { command } => cmd_encode(command),
        Commands::Discover(args) => block_on(cmd_discover(args)),
        Commands::Announce(args) => block_on(cmd_announce(args)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => err.report(),
    }
}

/// User-facing failure: one `error:` line and an optional `hint:` line.
#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            hint: None,
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Print to stderr and return the usage-failure exit code.
    fn report(&self) -> ExitCode {
        eprintln!("error: {}", self.message);
        if let Some(hint) = &self.hint {
            eprintln!("hint: {hint}");
        }
        ExitCode::from(2)
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"))
    }
}

impl From<UsageError> for CliError {
    fn from(err: UsageError) -> Self {
        CliError::new(err.to_string())
            .with_hint("split the list across pages with --page/--last-page")
    }
}

impl From<ReceiverError> for CliError {
    fn from(err: ReceiverError) -> Self {
        let hint = match &err {
            ReceiverError::Bind { addr, .. } => {
                format!("port {} may be in use; try --reuse-addr or --port", addr.port())
            }
            ReceiverError::Send { .. } | ReceiverError::JoinMulticast { .. } => {
                "check --iface and that a multicast route exists".to_string()
            }
            ReceiverError::Socket(_) | ReceiverError::Receive(_) => {
                "run with -v for socket details".to_string()
            }
        };
        CliError::new(err.to_string()).with_hint(hint)
    }
}

/// `RUST_LOG` wins unless `-v` was given; logs always go to stderr.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn block_on(
    command: impl std::future::Future<Output = Result<(), CliError>>,
) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(command)
}

fn parse_channel(value: &str) -> Result<(u32, u16), String> {
    let (channel, level) = value
        .split_once('=')
        .ok_or_else(|| format!("expected CH=LEVEL, got '{value}'"))?;
    let channel: u32 = channel
        .trim()
        .parse()
        .map_err(|_| format!("invalid channel '{channel}'"))?;
    let level: u16 = level
        .trim()
        .parse()
        .map_err(|_| format!("invalid level '{level}'"))?;
    if !(1..=512).contains(&channel) {
        return Err(format!("channel {channel} out of range 1-512"));
    }
    if level > 100 {
        return Err(format!("level {level} out of range 0-100"));
    }
    Ok((channel, level))
}

fn cmd_decode(input: &Path, pretty: bool) -> Result<(), CliError> {
    if !input.is_file() {
        return Err(
            CliError::new(format!("input file not found: {}", input.display()))
                .with_hint("pass a file containing one raw E1.31 datagram"),
        );
    }
    let bytes = fs::read(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    let packet = parse_packet(&bytes, None).map_err(|err| {
        CliError::new(format!("invalid E1.31 packet: {err}"))
            .with_hint("the file must hold the UDP payload only, without IP/UDP headers")
    })?;

    let report = PacketReport::from(&packet);
    let json = if pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("JSON serialization failed")?;
    println!("{json}");
    Ok(())
}

fn cmd_encode(command: EncodeCommands) -> Result<(), CliError> {
    let (bytes, output) = match command {
        EncodeCommands::Discovery {
            universes,
            page,
            last_page,
            identity,
            output,
        } => {
            if page > last_page {
                return Err(
                    CliError::new(format!("page {page} is past last page {last_page}"))
                        .with_hint("pages are numbered from 0 to --last-page"),
                );
            }
            let first_key = u32::from(page) * 512 + 1;
            let packet = DiscoveryPacket::new(DiscoveryOptions {
                universes: universes
                    .iter()
                    .zip(first_key..)
                    .map(|(universe, key)| (key, *universe))
                    .collect(),
                page,
                last_page,
                source_name: identity.name,
                cid: identity.cid,
            })?;
            (packet.to_bytes(), output)
        }
        EncodeCommands::Data {
            universe,
            sequence,
            channels,
            priority,
            identity,
            output,
        } => {
            let packet = DataPacket::new(DataOptions {
                universe,
                sequence,
                payload: channels.into_iter().collect::<Payload>(),
                source_name: identity.name,
                priority,
                cid: identity.cid,
            });
            (packet.to_bytes(), output)
        }
    };

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write datagram: {}", output.display()))?;
    eprintln!("OK: {} bytes written -> {}", bytes.len(), output.display());
    Ok(())
}

fn load_config(args: &DiscoverArgs) -> Result<ReceiverConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&text).map_err(|err| {
                CliError::new(format!("invalid config {}: {err}", path.display()))
                    .with_hint("expected JSON with port, interface and reuse_addr")
            })?
        }
        None => ReceiverConfig::default(),
    };
    if let Some(port) = args.port {
        config.port = port;
    }
    if args.iface.is_some() {
        config.interface = args.iface;
    }
    config.reuse_addr |= args.reuse_addr;
    Ok(config)
}

/// One line of `discover` output.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum EventLine {
    Packet {
        at: String,
        packet: PacketReport,
    },
    SourceDetected {
        at: String,
        last_heard: String,
        source: SourceReport,
    },
    SourceTimeout {
        at: String,
        last_heard: String,
        source: SourceReport,
    },
    PacketCorrupted {
        at: String,
        from: SocketAddr,
        error: String,
    },
    TransportError {
        at: String,
        error: String,
    },
}

fn rfc3339(at: SystemTime) -> Result<String> {
    OffsetDateTime::from(at)
        .format(&Rfc3339)
        .context("Failed to format timestamp")
}

fn event_line(event: &ReceiverEvent) -> Result<EventLine> {
    let at = rfc3339(SystemTime::now())?;
    let line = match event {
        ReceiverEvent::Packet(packet) => EventLine::Packet {
            at,
            packet: packet.into(),
        },
        ReceiverEvent::SourceDetected(source) => EventLine::SourceDetected {
            at,
            last_heard: rfc3339(source.last_heard)?,
            source: source.into(),
        },
        ReceiverEvent::SourceTimeout(source) => EventLine::SourceTimeout {
            at,
            last_heard: rfc3339(source.last_heard)?,
            source: source.into(),
        },
        ReceiverEvent::PacketCorrupted { from, error } => EventLine::PacketCorrupted {
            at,
            from: *from,
            error: error.to_string(),
        },
        ReceiverEvent::TransportError(err) => EventLine::TransportError {
            at,
            error: err.to_string(),
        },
    };
    Ok(line)
}

async fn cmd_discover(args: DiscoverArgs) -> Result<(), CliError> {
    let config = load_config(&args)?;
    let (receiver, mut events) = DiscoveryReceiver::bind(config).await?;
    info!(local_addr = %receiver.local_addr(), "listening for universe discovery");

    let stop = async {
        match args.duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    };
    tokio::pin!(stop);

    let result = loop {
        tokio::select! {
            _ = &mut stop => break Ok(()),
            event = events.recv() => {
                let Some(event) = event else { break Ok(()) };
                match event_line(&event).and_then(|line| {
                    serde_json::to_string(&line).context("JSON serialization failed")
                }) {
                    Ok(json) => println!("{json}"),
                    Err(err) => break Err(CliError::from(err)),
                }
            }
        }
    };

    receiver.close().await;
    debug!("receiver closed");
    result
}

async fn cmd_announce(args: AnnounceArgs) -> Result<(), CliError> {
    let dest = args.dest.unwrap_or_else(|| {
        SocketAddr::from((multicast_group(DISCOVERY_UNIVERSE), DEFAULT_PORT))
    });
    let pages = discovery_pages(
        &args.universes,
        args.identity.name.as_deref(),
        args.identity.cid,
    );
    let socket = bind_sender(args.iface)?;
    for page in &pages {
        send_datagram(&socket, &page.to_bytes(), dest).await?;
        debug!(page = page.page(), last_page = page.last_page(), %dest, "discovery page sent");
    }
    eprintln!("OK: {} discovery page(s) sent -> {}", pages.len(), dest);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_channel_accepts_pairs() {
        assert_eq!(parse_channel("1=100"), Ok((1, 100)));
        assert_eq!(parse_channel(" 512 = 0 "), Ok((512, 0)));
    }

    #[test]
    fn parse_channel_rejects_out_of_range() {
        assert!(parse_channel("0=10").is_err());
        assert!(parse_channel("513=10").is_err());
        assert!(parse_channel("1=101").is_err());
        assert!(parse_channel("1").is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("receiver.json");
        fs::write(&path, r#"{ "port": 6000, "reuse_addr": false }"#).unwrap();

        let args = DiscoverArgs {
            port: None,
            iface: Some(Ipv4Addr::new(10, 0, 0, 1)),
            reuse_addr: true,
            config: Some(path),
            duration: None,
        };
        let config = load_config(&args).unwrap();
        assert_eq!(config.port, 6000);
        assert_eq!(config.interface, Some(Ipv4Addr::new(10, 0, 0, 1)));
        assert!(config.reuse_addr);
    }

    #[test]
    fn bind_failure_hints_at_port() {
        let err = CliError::from(ReceiverError::Bind {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 5568)),
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        });
        assert!(err.message.starts_with("failed to bind 0.0.0.0:5568"));
        assert_eq!(
            err.hint.as_deref(),
            Some("port 5568 may be in use; try --reuse-addr or --port")
        );
    }

    #[test]
    fn oversized_list_hints_at_paging() {
        let err = CliError::from(UsageError::ListTooLarge { count: 513, max: 512 });
        assert!(err.hint.unwrap().contains("--page"));
    }

    #[test]
    fn timestamps_are_rfc3339() {
        assert_eq!(
            rfc3339(SystemTime::UNIX_EPOCH).unwrap(),
            "1970-01-01T00:00:00Z"
        );
    }
}
