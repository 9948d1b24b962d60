use std::sync::Arc;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotlite::{cli, config, error, spotify::SpotifyClient};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Log in with your Spotify account
    Login(LoginOptions),

    /// Use app-only access (client credentials, no user data)
    Connect(ConnectOptions),

    /// Forget all stored credentials
    Logout,

    /// Show the current session
    Status,

    /// Show or change the OAuth callback address
    Callback(CallbackOptions),

    /// Search tracks
    Search(SearchOptions),

    /// Featured playlists
    Featured(LimitOption),

    /// New releases, one track per album
    Releases(LimitOption),

    /// Browse categories
    Categories(LimitOption),

    /// Tracks of a playlist
    Playlist(PlaylistOptions),

    /// Your saved tracks
    Saved(LimitOption),

    /// Your top tracks
    Top(LimitOption),

    /// Your recently played tracks
    Recent(LimitOption),

    /// Your playlists
    Playlists(LimitOption),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct LoginOptions {
    /// Spotify application client id [env: SPOTLITE_CLIENT_ID]
    #[clap(long)]
    client_id: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ConnectOptions {
    /// Spotify application client id [env: SPOTLITE_CLIENT_ID]
    #[clap(long)]
    client_id: Option<String>,

    /// Spotify application client secret [env: SPOTLITE_CLIENT_SECRET]
    #[clap(long)]
    client_secret: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CallbackOptions {
    /// Use this address instead of the one derived from SERVER_ADDRESS
    #[clap(long, conflicts_with = "reset")]
    set: Option<String>,

    /// Go back to the default address
    #[clap(long)]
    reset: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct LimitOption {
    /// Maximum number of items (1-50)
    #[clap(long, default_value_t = 20)]
    limit: u32,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    query: String,

    #[clap(flatten)]
    limit: LimitOption,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistOptions {
    id: String,

    #[clap(flatten)]
    limit: LimitOption,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let client = match SpotifyClient::from_settings(config::Settings::from_env()) {
        Ok(client) => Arc::new(client),
        Err(e) => error!("Cannot set up the Spotify client. Err: {}", e),
    };

    match cli.command {
        Command::Login(opt) => cli::login(Arc::clone(&client), opt.client_id).await,
        Command::Connect(opt) => cli::connect(&client, opt.client_id, opt.client_secret).await,
        Command::Logout => cli::logout(&client),
        Command::Status => cli::status(&client).await,
        Command::Callback(opt) => cli::callback(&client, opt.set, opt.reset),
        Command::Search(opt) => cli::search(&client, &opt.query, opt.limit.limit).await,
        Command::Featured(opt) => cli::featured(&client, opt.limit).await,
        Command::Releases(opt) => cli::releases(&client, opt.limit).await,
        Command::Categories(opt) => cli::categories(&client, opt.limit).await,
        Command::Playlist(opt) => cli::playlist(&client, &opt.id, opt.limit.limit).await,
        Command::Saved(opt) => cli::saved(&client, opt.limit).await,
        Command::Top(opt) => cli::top(&client, opt.limit).await,
        Command::Recent(opt) => cli::recent(&client, opt.limit).await,
        Command::Playlists(opt) => cli::playlists(&client, opt.limit).await,
        Command::Completions(_) => {}
    }
}
