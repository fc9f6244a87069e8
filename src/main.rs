use std::{process, sync::Arc};

use larder::{
    application::{
        detail_cache::DetailCacheService,
        error::AppError,
        repos::{DetailCacheRepo, SearchCacheRepo},
        search_cache::SearchCacheService,
        upstream::RecipeApi,
    },
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        spoonacular::SpoonacularClient,
        telemetry,
    },
};
use metrics::counter;
use time::OffsetDateTime;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(config::ServeArgs::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Sweep(_) => run_sweep(settings).await,
    }
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool =
        PostgresRepositories::connect(database_url, settings.database.max_connections.get())
            .await
            .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::migration(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;

    let upstream: Arc<dyn RecipeApi> =
        Arc::new(SpoonacularClient::new(&settings.upstream).map_err(AppError::from)?);
    if settings.upstream.api_key.is_none() {
        warn!(
            target = "larder::server",
            "upstream api key is not configured; lookups will fail once the cache goes stale"
        );
    }

    let search_store: Arc<dyn SearchCacheRepo> = repositories.clone();
    let detail_store: Arc<dyn DetailCacheRepo> = repositories.clone();

    let state = ApiState {
        search: Arc::new(SearchCacheService::new(
            search_store.clone(),
            upstream.clone(),
            settings.cache.ttl,
            settings.upstream.search_page_size.get(),
        )),
        details: Arc::new(DetailCacheService::new(
            detail_store.clone(),
            upstream.clone(),
            settings.cache.ttl,
        )),
        upstream,
        health: repositories.clone(),
    };

    // Optional prune sweep; the serving path itself never deletes rows.
    let sweep_handle = settings.cache.sweep_interval.map(|every| {
        let ttl = settings.cache.ttl;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await; // Skip the first immediate tick
            loop {
                interval.tick().await;
                sweep_once(&search_store, &detail_store, ttl).await;
            }
        })
    });

    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "larder::server",
        addr = %settings.server.addr,
        "listening"
    );

    let result = axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")));

    if let Some(handle) = sweep_handle {
        handle.abort();
        let _ = handle.await;
    }

    result
}

async fn run_sweep(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let search_store: Arc<dyn SearchCacheRepo> = repositories.clone();
    let detail_store: Arc<dyn DetailCacheRepo> = repositories.clone();

    sweep_once(&search_store, &detail_store, settings.cache.ttl).await;
    Ok(())
}

async fn sweep_once(
    search: &Arc<dyn SearchCacheRepo>,
    details: &Arc<dyn DetailCacheRepo>,
    ttl: time::Duration,
) {
    let cutoff = OffsetDateTime::now_utc() - ttl;

    match search.prune_older_than(cutoff).await {
        Ok(removed) => {
            counter!("larder_cache_pruned_rows_total").increment(removed);
            info!(
                target = "larder::sweep",
                removed,
                table = "recipe_search_cache",
                "pruned stale cache rows"
            );
        }
        Err(err) => warn!(
            target = "larder::sweep",
            error = %err,
            table = "recipe_search_cache",
            "prune failed"
        ),
    }

    match details.prune_older_than(cutoff).await {
        Ok(removed) => {
            counter!("larder_cache_pruned_rows_total").increment(removed);
            info!(
                target = "larder::sweep",
                removed,
                table = "recipe_detail_cache",
                "pruned stale cache rows"
            );
        }
        Err(err) => warn!(
            target = "larder::sweep",
            error = %err,
            table = "recipe_detail_cache",
            "prune failed"
        ),
    }
}
