use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use prefstore::application::defaults::DefaultsService;
use prefstore::application::identity::IdentityResolver;
use prefstore::application::overrides::OverrideStore;
use prefstore::application::preferences::PreferenceService;
use prefstore::application::repos::{DefaultsRepo, OverridesRepo, SitesRepo};
use prefstore::application::sites::SiteService;
use prefstore::cache::{MemoryCache, PreferenceCache};
use prefstore::config::{CliArgs, Command, MigrateArgs, ServeArgs, ServeOverrides, Settings};
use prefstore::infra::db::{self, PostgresRepositories};
use prefstore::infra::error::InfraError;
use prefstore::infra::http::{ApiState, build_api_router};
use prefstore::infra::identity::HttpIdentityResolver;
use prefstore::infra::telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    let command = args
        .command
        .clone()
        .unwrap_or(Command::Serve(ServeArgs::default()));

    let result = match command {
        Command::Serve(serve) => serve_command(&args, &serve.overrides).await,
        Command::Migrate(migrate) => migrate_command(&args, &migrate).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Telemetry may not be installed yet, so mirror the error to stderr.
            error!(error = %err, "fatal");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn serve_command(
    args: &CliArgs,
    overrides: &ServeOverrides,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load(args.config_file.as_ref(), overrides)?;
    telemetry::init(&settings.logging)?;

    let pool = db::connect(&settings.database).await?;
    db::MIGRATOR
        .run(&pool)
        .await
        .map_err(|err| InfraError::database(format!("migration failed: {err}")))?;

    let repos = Arc::new(PostgresRepositories::new(pool));
    let state = build_state(&settings, repos)?;
    let router = build_api_router(state);

    let addr = settings.server.bind_addr()?;
    let listener = TcpListener::bind(addr).await.map_err(InfraError::from)?;
    info!(%addr, "prefstore listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(InfraError::from)?;
    info!("prefstore stopped");
    Ok(())
}

async fn migrate_command(
    args: &CliArgs,
    migrate: &MigrateArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let overrides = ServeOverrides {
        database_url: migrate.database_url.clone(),
        ..Default::default()
    };
    let settings = Settings::load(args.config_file.as_ref(), &overrides)?;
    telemetry::init(&settings.logging)?;

    let pool = db::connect(&settings.database).await?;
    db::MIGRATOR
        .run(&pool)
        .await
        .map_err(|err| InfraError::database(format!("migration failed: {err}")))?;
    info!("migrations applied");
    Ok(())
}

fn build_state(
    settings: &Settings,
    repos: Arc<PostgresRepositories>,
) -> Result<ApiState, InfraError> {
    let cache: Arc<dyn PreferenceCache> = Arc::new(MemoryCache::new(settings.cache.capacity));

    let sites_repo: Arc<dyn SitesRepo> = repos.clone();
    let defaults_repo: Arc<dyn DefaultsRepo> = repos.clone();
    let overrides_repo: Arc<dyn OverridesRepo> = repos;

    let sites = Arc::new(SiteService::new(sites_repo, cache.clone()));
    let defaults = Arc::new(DefaultsService::new(
        sites.clone(),
        defaults_repo,
        cache.clone(),
    ));
    let overrides = Arc::new(OverrideStore::new(overrides_repo, cache.clone()));
    let identity: Arc<dyn IdentityResolver> =
        Arc::new(HttpIdentityResolver::new(settings.identity.request_timeout)?);
    let preferences = Arc::new(PreferenceService::new(
        sites.clone(),
        defaults.clone(),
        overrides,
        identity,
        cache,
    ));

    Ok(ApiState {
        preferences,
        sites,
        defaults,
        admin_token: settings.admin_token.as_deref().map(Arc::from),
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install shutdown handler");
    }
    info!("shutdown signal received");
}
