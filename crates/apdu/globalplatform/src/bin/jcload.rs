//! Command-line tool for loading and managing Java Card applets
//!
//! Authenticates against the card manager with SCP02, then installs CAP
//! files, lists applets or deletes them.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hex::FromHex;
use jcload_globalplatform::{CapFile, GlobalPlatform, GpConfig, HostChallenge, Keys};
use jcload_transport_pcsc::{
    PcscConfig, PcscDeviceManager, PcscError, PcscReader, PcscTransport,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Filter used with `--verbose`
const VERBOSE_FILTER: &str = "jcload=trace,jcload_globalplatform=trace,jcload_apdu_core=trace,\
                              jcload_transport_pcsc=trace";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Reader to use; defaults to the first reader with a card
    #[arg(short, long, global = true)]
    reader: Option<String>,

    /// Static SCP02 key used for both ENC and MAC (32 hex characters)
    #[arg(
        short,
        long,
        global = true,
        value_parser = parse_hex::<16>,
        default_value = "404142434445464748494A4B4C4D4E4F"
    )]
    key: [u8; 16],

    /// Print every APDU exchanged with the card
    #[arg(short, long, global = true)]
    trace: bool,

    /// Use this host challenge instead of a random one (16 hex characters)
    #[arg(long, global = true, value_parser = parse_hex::<8>)]
    fixed_challenge: Option<[u8; 8]>,

    /// Log everything at trace level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List readers and whether a card is present
    ListReaders,

    /// List applets installed on the card
    List,

    /// Load and install a CAP file
    Install {
        /// Path to the CAP file
        cap: PathBuf,
    },

    /// Delete an applet and its related objects
    Delete {
        /// Applet AID (hex)
        aid: String,
    },

    /// Show what a CAP file would load, without a card
    Info {
        /// Path to the CAP file
        cap: PathBuf,
    },
}

fn parse_hex<const N: usize>(value: &str) -> Result<[u8; N], String>
where
    [u8; N]: FromHex<Error = hex::FromHexError>,
{
    <[u8; N]>::from_hex(value).map_err(|e| format!("expected {} hex characters: {e}", N * 2))
}

/// One line per reader; an empty reader list is not an error here
fn reader_lines(
    readers: Result<Vec<PcscReader>, PcscError>,
) -> Result<Vec<String>, PcscError> {
    let readers = match readers {
        Ok(readers) => readers,
        Err(PcscError::NoReadersAvailable) => return Ok(vec!["No readers found".to_string()]),
        Err(e) => return Err(e),
    };

    Ok(readers
        .iter()
        .map(|reader| match reader.atr() {
            Some(atr) => format!("{}  [card, ATR {}]", reader.name(), hex::encode_upper(atr)),
            None if reader.has_card() => format!("{}  [card]", reader.name()),
            None => format!("{}  [empty]", reader.name()),
        })
        .collect())
}

fn open_transport(cli: &Cli) -> Result<PcscTransport, Box<dyn std::error::Error>> {
    let manager = PcscDeviceManager::new()?;
    let config = PcscConfig::default().with_trace(cli.trace);

    let transport = match &cli.reader {
        Some(name) => manager.open_reader_with_config(name, config)?,
        None => manager.open_first_with_card(config)?,
    };
    info!(reader = transport.reader_name(), "Connected");
    Ok(transport)
}

fn connect(cli: &Cli) -> Result<GlobalPlatform<PcscTransport>, Box<dyn std::error::Error>> {
    let transport = open_transport(cli)?;

    let mut config = GpConfig::default();
    if let Some(challenge) = cli.fixed_challenge {
        config = config.with_host_challenge(HostChallenge::Fixed(challenge));
    }

    let mut gp = GlobalPlatform::with_config(transport, Keys::from_single_key(cli.key), config);
    gp.authenticate()?;
    Ok(gp)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(true)
        .init();

    match &cli.command {
        Commands::ListReaders => {
            let manager = PcscDeviceManager::new()?;
            for line in reader_lines(manager.list_readers())? {
                println!("{line}");
            }
        }

        Commands::List => {
            let mut gp = connect(&cli)?;
            let applets = gp.list()?;
            if applets.is_empty() {
                println!("No applets installed");
            }
            for applet in applets {
                println!("{applet}");
            }
        }

        Commands::Install { cap } => {
            let cap = CapFile::open(cap)?;
            let mut gp = connect(&cli)?;

            gp.install_with_progress(&cap, |progress| {
                print!("\rLOAD {}/{}", progress.block, progress.total);
                let _ = io::stdout().flush();
            })?;
            println!();
            println!("Installed {}", hex::encode_upper(cap.applet_aid()));
        }

        Commands::Delete { aid } => {
            let aid = Vec::from_hex(aid)?;
            let mut gp = connect(&cli)?;
            gp.delete(&aid)?;
            println!("Deleted {}", hex::encode_upper(&aid));
        }

        Commands::Info { cap } => {
            println!("{}", CapFile::open(cap)?.info());
        }
    }

    Ok(())
}
