mod app;
mod cli;
mod effects;
mod render;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use drishya_engine::{ApiClient, EngineConfig, EngineHandle, InMemorySession, SessionProvider};
use drishya_logging::drishya_info;
use log::LevelFilter;

use crate::app::App;
use crate::cli::{Cli, Plan};
use crate::effects::EffectRunner;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    drishya_logging::initialize(cli.log_destination(), level);

    let mut config = EngineConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config = config.with_api_url(url);
    }
    if let Some(url) = cli.ws_url {
        config = config.with_ws_url(url);
    }
    config.validate()?;

    let session: Arc<dyn SessionProvider> = match cli.token {
        Some(token) => Arc::new(InMemorySession::with_token(token)),
        None => Arc::new(InMemorySession::new()),
    };

    let plan = cli.command.plan()?;
    let page_size = match &plan {
        Plan::List { list, .. } => list.page_size,
        _ => drishya_core::DEFAULT_PAGE_SIZE,
    };
    let settle_timeout = config.request_timeout * 2;

    match plan {
        Plan::Login { email, password } => login(&config, session, &email, &password),
        Plan::List { query, list } => {
            let engine = EngineHandle::new(config, session)?;
            let mut app = App::new(EffectRunner::new(engine), page_size, settle_timeout);
            app.show(query, list, &mut std::io::stdout().lock())
        }
        Plan::Write { request, then_show } => {
            let engine = EngineHandle::new(config, session)?;
            let mut app = App::new(EffectRunner::new(engine), page_size, settle_timeout);
            app.write(request, then_show, &mut std::io::stdout().lock())
        }
    }
}

fn login(
    config: &EngineConfig,
    session: Arc<dyn SessionProvider>,
    email: &str,
    password: &str,
) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    let client = ApiClient::new(config, session.clone())?;
    let user = runtime.block_on(client.login(email, password))?;
    drishya_info!("Signed in as {}", user.email);

    let token = session.token().context("server returned no token")?;
    println!("export DRISHYA_TOKEN={token}");
    Ok(())
}
