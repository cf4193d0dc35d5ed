use anyhow::Context;
use clap::{Parser, Subcommand};
use cocoon_core::auth;
use cocoon_core::client::HttpRecommendationClient;
use cocoon_core::config::Settings;
use cocoon_core::domain::Location;
use cocoon_core::session::{FileTokenStorage, SessionStore};
use cocoon_core::view::{ViewController, ViewState};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod dashboard;
mod render;

#[derive(Debug, Parser)]
#[command(name = "cocoon", about = "Find the best start date for a cocoon rearing cycle")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and remember the session.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },

    /// Forget the stored session.
    Logout,

    /// Show whether a session is stored.
    Status,

    /// Request a recommended start date.
    Recommend {
        #[arg(long, default_value = "Bengaluru")]
        location: Location,
    },

    /// List past recommendations.
    History,

    /// Interactive dashboard.
    Dashboard,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    match run(args, &settings).await {
        Ok(code) => Ok(code),
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %format!("{err:#}"), "cocoon failed");
            Err(err)
        }
    }
}

async fn run(args: Args, settings: &Settings) -> anyhow::Result<ExitCode> {
    let client = Arc::new(HttpRecommendationClient::from_settings(settings)?);
    let session = open_session(settings);

    match args.command {
        Command::Login { username, password } => {
            match auth::sign_in(client.as_ref(), &session, &username, &password).await {
                Ok(()) if session.session().is_authenticated() => {
                    println!("Signed in as {}.", username.trim());
                    Ok(ExitCode::SUCCESS)
                }
                Ok(()) => {
                    eprintln!("Signed in, but the session could not be stored.");
                    Ok(ExitCode::FAILURE)
                }
                Err(err) => {
                    eprintln!("error: {err}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Register { username, password } => {
            match auth::sign_up(client.as_ref(), &username, &password).await {
                Ok(()) => {
                    println!("Account created. Sign in with `cocoon login`.");
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("error: {err}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Logout => {
            let mut vc = ViewController::new(client, session);
            let _ = vc.sign_out();
            println!("Signed out.");
            Ok(ExitCode::SUCCESS)
        }
        Command::Status => {
            if session.session().is_authenticated() {
                println!("Signed in.");
            } else {
                println!("Signed out.");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Recommend { location } => {
            let mut vc = ViewController::new(client, session);
            vc.search_and_wait(location).await;
            Ok(report(&vc))
        }
        Command::History => {
            let mut vc = ViewController::new(client, session);
            vc.view_history_and_wait().await;
            Ok(report(&vc))
        }
        Command::Dashboard => {
            if !session.session().is_authenticated() {
                eprintln!("Not signed in. Run `cocoon login` first.");
                return Ok(ExitCode::FAILURE);
            }
            let vc = ViewController::new(client, session);
            dashboard::run(vc)
                .await
                .context("dashboard stopped unexpectedly")?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn report(vc: &ViewController) -> ExitCode {
    println!("{}", render::render(vc.state()));
    match vc.state() {
        ViewState::ErrorShown(_) => {
            if vc.needs_reauth() {
                eprintln!("Sign in again with `cocoon login`.");
            }
            ExitCode::FAILURE
        }
        _ => ExitCode::SUCCESS,
    }
}

fn open_session(settings: &Settings) -> SessionStore {
    match settings.require_session_dir() {
        Ok(dir) => SessionStore::new(Arc::new(FileTokenStorage::new(dir))),
        Err(e) => {
            tracing::warn!(error = %e, "no session directory; session will not persist");
            SessionStore::in_memory()
        }
    }
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
