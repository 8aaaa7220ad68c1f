//! VirtuAid admin CLI - sign in to the VirtuAid care-home administration
//! backend and open protected views from the terminal.
//!
//! Every invocation is one application load: the credential lives in memory
//! and is restored from the session marker only when "keep me logged in"
//! is on.

mod app;

use std::io;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;

const USAGE: &str = "\
Usage: virtuaid <command>

Commands:
  login [email] [--keep|--no-keep]   Sign in (optionally toggling keep me logged in)
  open <path>                        Check access to a protected view
  get <path>                         Fetch a backend path as the signed-in user
  whoami                             Show the restored identity
  persist [on|off]                   Show or set keep me logged in
  logout                             Sign out";

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes the non-blocking writer on drop.
fn init_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();
    info!("VirtuAid admin CLI starting");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{}", USAGE);
        return Ok(());
    };
    let rest = &args[1..];

    let mut app = App::new()?;

    match command.as_str() {
        "login" => {
            let keep = rest.iter().find_map(|a| match a.as_str() {
                "--keep" => Some(true),
                "--no-keep" => Some(false),
                _ => None,
            });
            let email = rest.iter().find(|a| !a.starts_with("--")).cloned();
            app.login(email, keep).await
        }
        "open" => app.open(rest.first().map(String::as_str).unwrap_or("/dashboard")).await,
        "get" => match rest.first() {
            Some(path) => app.get(path).await,
            None => Err(anyhow::anyhow!("get needs a path\n\n{}", USAGE)),
        },
        "whoami" => app.open("/dashboard").await,
        "persist" => match rest.first().map(String::as_str) {
            None => {
                app.show_persist();
                Ok(())
            }
            Some("on") => {
                app.set_persist(true);
                Ok(())
            }
            Some("off") => {
                app.set_persist(false);
                Ok(())
            }
            Some(other) => Err(anyhow::anyhow!("persist expects on or off, got {}", other)),
        },
        "logout" => app.logout().await,
        "-h" | "--help" | "help" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => Err(anyhow::anyhow!("Unknown command {}\n\n{}", other, USAGE)),
    }
}
