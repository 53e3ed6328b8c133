use std::{future::IntoFuture, process, sync::Arc, time::Duration};

use brusio::{
    application::{
        content::ContentService,
        error::AppError,
        follows::FollowService,
        listing::ListingService,
        repos::{CommentsRepo, FollowsRepo, GroupsRepo, PostsRepo, PostsWriteRepo, UsersRepo},
    },
    cache::{FeedCache, SystemClock},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, AppState},
        telemetry,
        uploads::UploadStorage,
    },
};
use tokio::net::TcpListener;
use tracing::{Dispatch, Level, dispatcher, error, info};
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
    let (_cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    run_serve(settings).await
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let state = build_app_state(repositories, &settings)?;
    let router = http::build_router(state);

    let listener = TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::Io(err)))?;

    info!(
        target = "brusio::server",
        addr = %settings.server.addr,
        page_size = settings.feed.page_size.get(),
        feed_cache_ttl_secs = settings.feed.cache_ttl.as_secs(),
        "listening"
    );

    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .into_future();

    tokio::select! {
        result = server => result.map_err(|err| AppError::from(InfraError::Io(err)))?,
        () = drain_deadline(settings.server.graceful_shutdown) => {
            info!(target = "brusio::server", "graceful shutdown window elapsed");
        }
    }

    info!(target = "brusio::server", "shut down");
    Ok(())
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
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_app_state(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> Result<AppState, AppError> {
    let users_repo: Arc<dyn UsersRepo> = repositories.clone();
    let groups_repo: Arc<dyn GroupsRepo> = repositories.clone();
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let posts_write_repo: Arc<dyn PostsWriteRepo> = repositories.clone();
    let comments_repo: Arc<dyn CommentsRepo> = repositories.clone();
    let follows_repo: Arc<dyn FollowsRepo> = repositories;

    let feed_cache = Arc::new(FeedCache::new(
        settings.feed.cache_ttl,
        Arc::new(SystemClock),
    ));

    let uploads = Arc::new(
        UploadStorage::new(settings.uploads.directory.clone())
            .map_err(|err| AppError::from(InfraError::Io(err)))?,
    );

    let listing = Arc::new(ListingService::new(
        posts_repo.clone(),
        groups_repo.clone(),
        users_repo.clone(),
        follows_repo.clone(),
        feed_cache,
    ));
    let content = Arc::new(ContentService::new(
        posts_repo,
        posts_write_repo,
        comments_repo,
        groups_repo.clone(),
        uploads,
    ));
    let follows = Arc::new(FollowService::new(users_repo.clone(), follows_repo));

    Ok(AppState {
        listing,
        content,
        follows,
        users: users_repo,
        groups: groups_repo,
        page_size: settings.feed.page_size.get(),
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(target = "brusio::server", error = %err, "failed to listen for shutdown signal");
        return;
    }
    info!(target = "brusio::server", "shutdown signal received, draining");
}

/// Completes one drain window after the shutdown signal, bounding how long
/// in-flight requests can hold the process open.
async fn drain_deadline(window: Duration) {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(window).await;
}
