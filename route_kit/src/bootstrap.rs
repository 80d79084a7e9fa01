use crate::{
    config::DocConfig,
    error::Result,
    registry::{ApiSpec, RouteRegistry},
    rest_router_builder::{RestHandler, RestRouterBuilder},
    route::Route,
};

/// Registers `routes` under `base_path` into a fresh axum router and publishes the document.
pub fn rest_router_from_routes<S>(
    config: &DocConfig,
    base_path: &str,
    routes: Vec<Route<RestHandler<S>>>,
) -> Result<(axum::Router<S>, ApiSpec)>
where
    S: Clone + Send + Sync + 'static,
{
    let mut registry = RouteRegistry::from_config(config);
    let mut rest = RestRouterBuilder::new();
    registry.register(&mut rest, base_path, routes)?;
    Ok((rest.build(), registry.finish()?))
}
