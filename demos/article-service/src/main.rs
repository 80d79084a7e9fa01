use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use axum::Router;
use clap::{Parser, Subcommand};
use route_kit::{rest_router_from_routes, ApiSpec, DocConfig, RestHandler, Route, RouteSchema};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;
use utoipa_swagger_ui::{Config, SwaggerUi};

mod dtos;
mod handlers;
mod store;

use dtos::{ArticleDto, ArticleMutationDto, ArticleParams, CreatedId, ErrorBody};
use store::ArticleStore;

const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

#[derive(Parser)]
#[command(version, about = "Article CRUD service with a generated OpenAPI document")]
struct Cli {
    /// TOML file with a [docs] table.
    #[arg(long, env = "ARTICLE_SERVICE_CONFIG")]
    config: Option<PathBuf>,
    /// Listen address for `serve`.
    #[arg(long, env = "ARTICLE_SERVICE_ADDR", default_value = "127.0.0.1:8080")]
    addr: SocketAddr,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Print the OpenAPI document and exit.
    Openapi,
}

fn article_routes() -> Vec<Route<RestHandler<ArticleStore>>> {
    vec![
        Route::get("", RestHandler::new(handlers::list_articles))
            .schema(RouteSchema::new().summary("Get all articles").response::<Vec<ArticleDto>>(200)),
        Route::post("", RestHandler::new(handlers::create_article)).schema(
            RouteSchema::new()
                .summary("Create an article")
                .body::<ArticleMutationDto>()
                .response::<CreatedId>(200)
                .response::<ErrorBody>(400),
        ),
        Route::get(":id", RestHandler::new(handlers::get_article)).schema(
            RouteSchema::new()
                .params::<ArticleParams>()
                .response::<ArticleDto>(200)
                .response::<ErrorBody>(400)
                .response::<ErrorBody>(404),
        ),
    ]
    .into_iter()
    .map(|route| route.tags(["articles"]))
    .collect()
}

/// Registers every route and returns the stateful router with the published document.
fn build_api(config: &DocConfig) -> route_kit::Result<(Router<ArticleStore>, ApiSpec)> {
    rest_router_from_routes(config, "/api/articles", article_routes())
}

fn app(config: &DocConfig, store: ArticleStore) -> anyhow::Result<(Router, ApiSpec)> {
    let (api, spec) = build_api(config).context("failed to register routes")?;
    let router = Router::new()
        .merge(api.with_state::<()>(store))
        .merge(spec.router::<()>(OPENAPI_JSON_PATH))
        .merge(SwaggerUi::new("/docs").config(Config::from(OPENAPI_JSON_PATH)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    Ok((router, spec))
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<DocConfig> {
    match path {
        Some(path) => DocConfig::load(path).with_context(|| format!("failed to load {}", path.display())),
        None => Ok(DocConfig {
            title: "Article Service API".to_string(),
            ..DocConfig::default()
        }),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    let addr = cli.addr;
    match cli.command.unwrap_or(Command::Serve) {
        Command::Openapi => {
            let (_, spec) = build_api(&config)?;
            println!("{}", spec.document().to_pretty_string()?);
        }
        Command::Serve => {
            let (app, _) = app(&config, ArticleStore::new())?;
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            tracing::info!("Server running at http://{addr}");
            tracing::info!("Swagger UI available at http://{addr}/docs/");
            axum::serve(listener, app).await?;
        }
    }
    Ok(())
}
