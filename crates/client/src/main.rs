mod app;
mod audio;
mod debug;
mod game;
mod hud;
mod net;
mod render;
mod tui;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use cellwars::net::DEFAULT_NAME;
use cellwars::{DEFAULT_PORT, SessionConfig};
use clap::Parser;
use winit::event_loop::EventLoop;

use net::{ClientConfig, NetworkClient};

#[derive(Parser)]
#[command(name = "cellwars")]
#[command(about = "Cell Wars game client")]
struct Args {
    #[arg(
        short,
        long,
        help = "Server address to connect to (e.g., 127.0.0.1:27015)"
    )]
    server: Option<String>,

    #[arg(short, long, default_value = DEFAULT_NAME, help = "Display name, up to 10 characters")]
    name: String,

    #[arg(short, long, help = "TOML file overriding session settings")]
    config: Option<PathBuf>,

    #[arg(long, help = "Skip TUI menu and join the server directly")]
    skip_menu: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SessionConfig::default(),
    };

    let client = if args.server.is_some() || args.skip_menu {
        Some(connect_to_server(args.server.as_deref(), &args.name)?)
    } else {
        tui::run_menu(&args.name)?
    };

    match client {
        Some(client) => run_game(client, config),
        None => {
            log::info!("Exiting from menu");
            Ok(())
        }
    }
}

fn connect_to_server(addr: Option<&str>, name: &str) -> anyhow::Result<NetworkClient> {
    let socket_addr: SocketAddr = match addr {
        Some(addr) => addr
            .parse()
            .with_context(|| format!("Invalid server address {addr}"))?,
        None => SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
    };
    let mut client = NetworkClient::new(ClientConfig::default())?;
    client.connect(socket_addr, name)?;
    Ok(client)
}

fn run_game(client: NetworkClient, config: SessionConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    let mut app = app::App::new(client, config);
    event_loop.run_app(&mut app)?;
    Ok(())
}
