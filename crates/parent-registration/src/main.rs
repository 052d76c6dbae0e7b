//! Parent registration - terminal front end.

use anyhow::{Context, Result};
use parent_registration::{
    config::Config,
    screen::FOOTNOTE,
    Field, MemoryStore, RealtimeDbStore, RegistrationScreen, RegistrationWorkflow, Route,
    UserStore,
};
use realtime_db_client::RealtimeDbClient;
use std::io::IsTerminal;
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.log.level);

    info!("Starting parent registration");

    let store = build_store(&config).await?;

    let workflow = RegistrationWorkflow::new(store)
        .error_policy(config.registration.error_policy)
        .suggestion_count(config.registration.suggestion_count);

    let screen =
        RegistrationScreen::new(workflow).guard_in_flight(config.registration.guard_in_flight);

    let mut input = BufReader::new(io::stdin()).lines();
    let result = run_screen(&screen, &mut input).await;

    screen.blur().await;
    screen.unmount();

    result
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn build_store(config: &Config) -> Result<Arc<dyn UserStore>> {
    if !config.database.is_remote() {
        info!("No database configured, using in-memory storage (records are lost on exit)");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let client = RealtimeDbClient::new(
        &config.database.url,
        config.database.auth_token.clone(),
        config.database.timeout,
    )
    .context("Failed to create database client")?;

    let store = RealtimeDbStore::new(client);

    if store.health_check().await {
        info!(url = %config.database.url, "Database reachable");
    } else {
        warn!(url = %config.database.url, "Database health check failed; registrations may fail");
    }

    Ok(Arc::new(store))
}

async fn run_screen(screen: &RegistrationScreen, input: &mut Lines<BufReader<Stdin>>) -> Result<()> {
    println!("Register a parent account");
    println!("{}", FOOTNOTE);

    loop {
        for field in Field::ALL {
            let Some(value) = prompt(input, field.placeholder(), field.is_secret()).await? else {
                return Ok(());
            };
            screen.edit(field, value).await;
        }

        let Some(action) = prompt(input, "[r]egister or [c]ancel", false).await? else {
            return Ok(());
        };

        match action.trim().to_lowercase().as_str() {
            "c" | "cancel" => {
                screen.cancel().await;
            }
            "r" | "register" | "" => {
                screen.submit().await;
            }
            other => {
                println!("Unknown action '{}'", other);
                continue;
            }
        }

        let state = screen.state().await;
        for line in state.error_lines() {
            println!("  {}", line);
        }

        if state.route() == Some(Route::Login) {
            if let Some(notice) = state.notice() {
                println!("{}", notice);
            }
            println!("Returning to login.");
            return Ok(());
        }
    }
}

async fn prompt(
    input: &mut Lines<BufReader<Stdin>>,
    label: &str,
    secret: bool,
) -> Result<Option<String>> {
    // Piped input has no terminal to hide echo on.
    if secret && std::io::stdin().is_terminal() {
        let label = format!("{}: ", label);
        let value = tokio::task::spawn_blocking(move || rpassword::prompt_password(label))
            .await
            .context("Password prompt task failed")?
            .context("Failed to read password")?;
        return Ok(Some(value));
    }

    let mut stdout = io::stdout();
    stdout.write_all(format!("{}: ", label).as_bytes()).await?;
    stdout.flush().await?;

    input.next_line().await.context("Failed to read input")
}
