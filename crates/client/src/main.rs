mod app;
pub mod net;
mod tui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use officeverse::{Character, SessionInfo, SyncConfig, SyncController, ZoneMap};

use app::App;
use net::{ClientConfig, DEFAULT_SERVER_ADDR, LineTransport};

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "Officeverse terminal client")]
struct Args {
    #[arg(short, long, default_value = DEFAULT_SERVER_ADDR)]
    server: String,

    #[arg(short, long, default_value = "Player")]
    name: String,

    #[arg(long, help = "Participant id (random when omitted)")]
    id: Option<u32>,

    #[arg(long, default_value = "0xffffff", value_parser = parse_skin, help = "Tint as 0xRRGGBB or decimal")]
    skin: u32,

    #[arg(short, long, default_value = "owlet", value_parser = parse_character)]
    character: Character,

    #[arg(short, long, help = "Room to join; omit for the shared lobby")]
    room: Option<String>,

    #[arg(long)]
    room_name: Option<String>,

    #[arg(long)]
    room_code: Option<String>,

    #[arg(short, long, help = "Tiled JSON map with a `zone` object layer")]
    map: Option<PathBuf>,

    #[arg(short, long, default_value_t = 60)]
    tick_rate: u32,

    #[arg(long, help = "Run without a terminal UI, heartbeating in place")]
    headless: bool,
}

fn parse_skin(value: &str) -> Result<u32, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix('#')) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| format!("invalid skin '{}': {}", value, e))
}

fn parse_character(value: &str) -> Result<Character, String> {
    Character::from_key(value).ok_or_else(|| {
        let known: Vec<_> = Character::ALL.iter().map(|c| c.key()).collect();
        format!("unknown character '{}' (expected one of {})", value, known.join(", "))
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.headless {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let config = ClientConfig {
        server_addr: args.server,
        tick_rate: args.tick_rate,
        ..Default::default()
    };

    let mut session = SessionInfo {
        name: args.name,
        skin: args.skin,
        character: args.character,
        room_id: args.room,
        room_name: args.room_name,
        room_code: args.room_code,
        ..SessionInfo::default()
    };
    if let Some(id) = args.id {
        session.id = id;
    }

    let map = match &args.map {
        Some(path) => ZoneMap::load(path)
            .with_context(|| format!("failed to load map {}", path.display()))?,
        None => ZoneMap::default_office(),
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let transport = runtime
        .block_on(LineTransport::connect(config.server_addr.as_str(), &config))
        .with_context(|| format!("failed to connect to {}", config.server_addr))?;

    let sync = SyncController::new(session, SyncConfig::default(), map);
    let mut app = App::new(sync, Some(transport), &config);

    if args.headless {
        app::run_headless(&mut app, config.tick_interval());
    } else {
        tui::run(&mut app, config.tick_interval())?;
    }

    log::info!("Client shutting down");
    Ok(())
}
