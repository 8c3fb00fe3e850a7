//! burrow-demo
//!
//! A small server showing groups, prefixes and mounted sub-apps.

use std::future::Future;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use burrow::{handler, App, Config, Handler, Response, Router, ShutdownHandle};

/// Demo server for burrow route composition.
#[derive(Parser)]
#[command(name = "burrow-demo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on. `:3010` binds every interface.
    #[arg(short, long, env = "BURROW_ADDR", default_value = "127.0.0.1:3010")]
    addr: String,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the demo app (default).
    Serve,

    /// Print the route table and exit.
    Routes,
}

/// Tags every response with the API version.
fn api_version() -> Handler {
    handler(|ctx| async move {
        let res = ctx.next().await?;
        Ok(res.header("X-Api-Version", "1.0.0"))
    })
}

fn text(body: &'static str) -> Handler {
    handler(move |_ctx| async move { Ok(Response::text(body)) })
}

fn islands() -> burrow::Result<App> {
    let app = App::new();
    app.get("/", vec![text("Island Index")])?;
    Ok(app)
}

fn micro() -> burrow::Result<App> {
    let app = App::new();
    app.middleware(vec![api_version()])?;
    app.get("/doe", vec![handler(|_ctx| async { Ok(Response::ok()) })])?;
    Ok(app)
}

fn build(config: Config) -> burrow::Result<App> {
    let app = App::with_config(config);

    app.mount("islands", &islands()?)?;

    let john = app.mount("john", &micro()?)?;
    john.get("/x", vec![text("Hola")])?
        .prefix("v1", vec![])?
        .get("y", vec![text("Hola")])?;

    let v1 = App::new();
    v1.get("/hell", vec![text("Why??")])?;
    app.group(vec![api_version()]).mount("v1", &v1)?;

    app.get("/", vec![text("Hola")])?;
    app.all("*", vec![handler(|_ctx| async { Ok(Response::not_found()) })])?;

    Ok(app)
}

/// Shuts the server down on `signal`. A signal that arrives before the
/// server is listening is reported and the watch goes on. Stops once
/// `signal` resolves to false.
async fn shutdown_on<F, Fut>(handle: ShutdownHandle, mut signal: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    while signal().await {
        info!("interrupt received");
        match handle.shutdown().await {
            Ok(()) => return,
            Err(err) => warn!(error = %err, "shutdown failed, still watching"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let app = build(config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Routes => {
            for route in app.routes() {
                println!("{:<8} {}", route.method.as_str(), route.path);
            }
        }
        Commands::Serve => {
            tokio::spawn(shutdown_on(app.shutdown_handle(), || async {
                tokio::signal::ctrl_c().await.is_ok()
            }));

            info!(routes = app.routes().len(), handlers = app.handlers_count(), "app built");
            app.listen(&cli.addr).await?;
        }
    }

    Ok(())
}
