use std::collections::HashMap;

use axum::{
    body::Bytes,
    handler::Handler,
    http::header,
    routing::{get, on, MethodFilter, MethodRouter},
    Router,
};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::registry::{to_openapi_path, ApiSpec, RouteBinder};
use crate::route::Method;

static WILDCARD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\*([A-Za-z0-9_]+)").expect("valid wildcard regex"));
static CAPTURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{(\*)?([A-Za-z0-9_]+)\}$").expect("valid capture regex"));

/// A type-erased axum handler, turned into a `MethodRouter` once its method is known.
pub struct RestHandler<S = ()> {
    make: Box<dyn FnOnce(MethodFilter) -> MethodRouter<S> + Send>,
}

impl<S> RestHandler<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new<H, T>(handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self {
            make: Box::new(move |filter| on(filter, handler)),
        }
    }
}

impl<S> std::fmt::Debug for RestHandler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestHandler").finish_non_exhaustive()
    }
}

/// Builds an axum `Router` from the bindings a registry hands out.
pub struct RestRouterBuilder<S = ()> {
    router: Router<S>,
    routes: Vec<(Method, String)>,
    /// Capture name bound at each position, keyed by the path up to it with
    /// every capture written as `{}` (or `{*}` for a wildcard).
    captures: HashMap<String, String>,
}

impl<S> Default for RestRouterBuilder<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self {
            router: Router::new(),
            routes: Vec::new(),
            captures: HashMap::new(),
        }
    }
}

impl<S> RestRouterBuilder<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// `(method, axum path)` of every bound route, in binding order.
    pub fn routes(&self) -> &[(Method, String)] {
        &self.routes
    }

    pub fn build(self) -> Router<S> {
        self.router
    }

    /// Rejects what `Router::route` would panic on: relative paths, a method
    /// bound twice on one path, leftover `:`/`*` markers, malformed captures,
    /// a wildcard before the last segment and two capture names at one position.
    fn check(&self, method: Method, path: &str) -> Result<Vec<(String, String)>> {
        let bind_err = |reason: String| -> Result<Vec<(String, String)>> {
            Err(Error::Bind(format!("{method} {path}: {reason}")))
        };
        let Some(rest) = path.strip_prefix('/') else {
            return bind_err("paths must start with `/`".to_string());
        };
        if self.routes.iter().any(|(m, p)| *m == method && p == path) {
            return bind_err("already bound".to_string());
        }
        let segments: Vec<&str> = rest.split('/').collect();
        let mut key = String::new();
        let mut captures = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            key.push('/');
            if segment.starts_with([':', '*']) {
                return bind_err(format!("`{segment}` is not a valid capture"));
            }
            if !segment.contains(['{', '}']) {
                key.push_str(segment);
                continue;
            }
            let Some(caps) = CAPTURE.captures(segment) else {
                return bind_err(format!("malformed capture `{segment}`"));
            };
            let wildcard = caps.get(1).is_some();
            if wildcard && i + 1 != segments.len() {
                return bind_err(format!("wildcard `{segment}` must be the last segment"));
            }
            key.push_str(if wildcard { "{*}" } else { "{}" });
            let name = &caps[2];
            match self.captures.get(&key) {
                Some(existing) if existing != name => {
                    return bind_err(format!("capture `{name}` conflicts with `{existing}` at the same position"));
                }
                _ => captures.push((key.clone(), name.to_string())),
            }
        }
        Ok(captures)
    }
}

impl<S> RouteBinder<RestHandler<S>> for RestRouterBuilder<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn bind(&mut self, method: Method, path: &str, handler: RestHandler<S>) -> Result<()> {
        let axum_path = to_axum_path(path);
        let captures = self.check(method, &axum_path)?;
        self.captures.extend(captures);
        let method_router = (handler.make)(method_filter(method));
        let router = std::mem::take(&mut self.router);
        self.router = router.route(&axum_path, method_router);
        self.routes.push((method, axum_path));
        Ok(())
    }
}

/// `:name` → `{name}` and `*name` → `{*name}`; axum 0.8 rejects the colon syntax.
pub fn to_axum_path(path: &str) -> String {
    let path = if path.is_empty() { "/" } else { path };
    let path = to_openapi_path(path);
    WILDCARD.replace_all(&path, "/{*$1}").into_owned()
}

fn method_filter(method: Method) -> MethodFilter {
    match method {
        Method::Get => MethodFilter::GET,
        Method::Post => MethodFilter::POST,
        Method::Put => MethodFilter::PUT,
        Method::Delete => MethodFilter::DELETE,
        Method::Patch => MethodFilter::PATCH,
        Method::Options => MethodFilter::OPTIONS,
        Method::Head => MethodFilter::HEAD,
    }
}

impl ApiSpec {
    /// A router serving the serialized document at `path`.
    pub fn router<S>(&self, path: &str) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let body = Bytes::copy_from_slice(self.bytes());
        Router::new().route(
            path,
            get(move || {
                let body = body.clone();
                async move { ([(header::CONTENT_TYPE, "application/json")], body) }
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Info;
    use crate::registry::RouteRegistry;
    use crate::route::Route;

    #[test]
    fn converts_to_axum_syntax() {
        assert_eq!(to_axum_path("/api/articles/:id"), "/api/articles/{id}");
        assert_eq!(to_axum_path("/docs/*w"), "/docs/{*w}");
        assert_eq!(to_axum_path(""), "/");
    }

    #[test]
    fn registry_binds_into_router() {
        async fn list() -> &'static str {
            "[]"
        }
        async fn create() -> &'static str {
            "{}"
        }

        let mut builder = RestRouterBuilder::<()>::new();
        let mut registry = RouteRegistry::new(Info::new("t", "1"));
        registry
            .register(
                &mut builder,
                "/api/articles",
                vec![
                    Route::get("", RestHandler::new(list)),
                    Route::post("", RestHandler::new(create)),
                    Route::get(":id", RestHandler::new(list)),
                ],
            )
            .unwrap();

        assert_eq!(
            builder.routes(),
            [
                (Method::Get, "/api/articles".to_string()),
                (Method::Post, "/api/articles".to_string()),
                (Method::Get, "/api/articles/{id}".to_string()),
            ]
        );
        let _router: Router = builder.build();
    }

    async fn noop() -> &'static str {
        ""
    }

    fn bind_all(base_path: &str, paths: &[(Method, &'static str)]) -> Result<Vec<(Method, String)>> {
        let mut builder = RestRouterBuilder::<()>::new();
        let mut registry = RouteRegistry::new(Info::new("t", "1"));
        let routes: Vec<Route<RestHandler>> = paths
            .iter()
            .map(|(method, url)| Route::new(*method, *url, RestHandler::new(noop)))
            .collect();
        registry.register(&mut builder, base_path, routes)?;
        Ok(builder.routes().to_vec())
    }

    #[test]
    fn capture_names_must_agree_per_position() {
        let err = bind_all("/a", &[(Method::Get, ":id"), (Method::Delete, ":name")]).unwrap_err();
        assert!(matches!(err, Error::Bind(ref reason) if reason.contains("conflicts")), "{err}");

        let bound = bind_all(
            "/a",
            &[(Method::Get, ":id"), (Method::Delete, ":id"), (Method::Get, ":id/comments/:cid")],
        )
        .unwrap();
        assert_eq!(bound.len(), 3);
    }

    #[test]
    fn relative_base_path_is_rejected() {
        let err = bind_all("api", &[(Method::Get, "")]).unwrap_err();
        assert!(matches!(err, Error::Bind(ref reason) if reason.contains("must start with")), "{err}");
    }

    #[test]
    fn malformed_captures_are_rejected() {
        for url in ["/:ñame", "/*rest/tail", "/{id", "/x{id}"] {
            let err = bind_all("", &[(Method::Get, url)]).unwrap_err();
            assert!(matches!(err, Error::Bind(_)), "{url}: {err}");
        }
        assert!(bind_all("", &[(Method::Get, "/files/*rest")]).is_ok());
    }

    #[test]
    fn bootstrap_reports_bind_errors() {
        let routes = vec![
            Route::get("/:id", RestHandler::<()>::new(noop)),
            Route::delete("/:name", RestHandler::<()>::new(noop)),
        ];
        let result = crate::rest_router_from_routes(&crate::DocConfig::default(), "/a", routes);
        assert!(matches!(result, Err(Error::Bind(_))));
    }
}
