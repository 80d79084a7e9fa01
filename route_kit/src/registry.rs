//! Route registration and document assembly.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::compiler::{SchemaCompiler, ShapeRef};
use crate::config::DocConfig;
use crate::document::{
    json_content, Document, Info, Operation, ParamIn, Parameter, RequestBody, Response,
    DEFAULT_OPENAPI_VERSION, DEFAULT_RESPONSE_DESCRIPTION,
};
use crate::error::{Error, Result};
use crate::route::{Method, Route, RouteSchema};
use crate::schema::SchemaNode;

static PATH_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"/:([A-Za-z0-9_]+)").expect("valid path param regex"));

/// `""` and `"/"` become `""`; anything else gains a leading `/` if missing.
pub fn normalize_path(url: &str) -> String {
    if url.is_empty() || url == "/" {
        String::new()
    } else if url.starts_with('/') {
        url.to_string()
    } else {
        format!("/{url}")
    }
}

/// Rewrites every `/:name` marker into `/{name}`.
pub fn to_openapi_path(path: &str) -> String {
    PATH_PARAM.replace_all(path, "/{$1}").into_owned()
}

/// The HTTP layer a registry hands handlers to.
pub trait RouteBinder<H> {
    /// `path` is the concatenated registration path, still in `:name` syntax.
    fn bind(&mut self, method: Method, path: &str, handler: H) -> Result<()>;
}

impl<H, F> RouteBinder<H> for F
where
    F: FnMut(Method, &str, H) -> Result<()>,
{
    fn bind(&mut self, method: Method, path: &str, handler: H) -> Result<()> {
        self(method, path, handler)
    }
}

/// Collects route declarations into a [`Document`] while binding their handlers.
///
/// Registration happens once at startup. [`RouteRegistry::finish`] consumes the
/// registry, so nothing can be registered after the document is published.
#[derive(Debug)]
pub struct RouteRegistry {
    document: Document,
    compiler: SchemaCompiler,
}

impl RouteRegistry {
    pub fn new(info: Info) -> Self {
        Self {
            document: Document::new(DEFAULT_OPENAPI_VERSION, info),
            compiler: SchemaCompiler::new(),
        }
    }

    pub fn from_config(config: &DocConfig) -> Self {
        let compiler = match config.max_depth {
            Some(depth) => SchemaCompiler::with_max_depth(depth),
            None => SchemaCompiler::new(),
        };
        Self {
            document: Document::new(config.openapi.clone(), config.info()),
            compiler,
        }
    }

    /// Registers `routes` under `base_path`, in order.
    ///
    /// Stops at the first failing route; routes before it stay registered.
    /// A `(path, method)` pair that is already documented is rejected with
    /// [`Error::DuplicateRoute`] before its handler is bound.
    pub fn register<H, B>(&mut self, binder: &mut B, base_path: &str, routes: Vec<Route<H>>) -> Result<()>
    where
        B: RouteBinder<H> + ?Sized,
    {
        for route in routes {
            let path = format!("{base_path}{}", normalize_path(&route.url));
            let doc_path = to_openapi_path(&path);
            let method_key = route.method.as_lowercase();

            if self.document.operation(&doc_path, method_key).is_some() {
                return Err(Error::DuplicateRoute {
                    method: route.method.to_string(),
                    path: doc_path,
                });
            }

            let operation = self.build_operation(route.tags, route.schema.as_ref())?;
            binder.bind(route.method, &path, route.handler)?;
            tracing::debug!(method = %route.method, path = %path, doc_path = %doc_path, "registered route");

            self.document
                .paths
                .entry(doc_path)
                .or_default()
                .insert(method_key.to_string(), operation);
        }
        Ok(())
    }

    fn build_operation(&mut self, tags: Option<Vec<String>>, schema: Option<&RouteSchema>) -> Result<Operation> {
        let mut operation = Operation::default();
        let Some(schema) = schema else {
            return Ok(operation);
        };

        operation.summary = schema.summary.clone().filter(|s| !s.is_empty());
        operation.description = schema.description.clone().filter(|s| !s.is_empty());
        operation.tags = tags;

        if let Some(params) = &schema.params {
            operation.parameters = self.build_parameters(ParamIn::Path, params)?;
        }
        if let Some(query) = &schema.querystring {
            let query_params = self.build_parameters(ParamIn::Query, query)?;
            operation.parameters.extend(query_params);
        }

        if let Some(body) = &schema.body {
            operation.request_body = Some(RequestBody {
                content: json_content(self.compiler.compile(body)?),
                required: true,
            });
        }

        for (status, shape) in &schema.responses {
            operation.responses.insert(
                *status,
                Response {
                    content: json_content(self.compiler.compile(shape)?),
                    description: DEFAULT_RESPONSE_DESCRIPTION.to_string(),
                },
            );
        }

        Ok(operation)
    }

    /// One parameter per property of the compiled shape. Path parameters are
    /// always required; query parameters follow the shape's `required` list.
    fn build_parameters(&mut self, location: ParamIn, shape: &ShapeRef) -> Result<Vec<Parameter>> {
        let node = self.compiler.compile(shape)?;
        let SchemaNode::Object { properties, required } = node else {
            tracing::debug!(?location, "parameter shape is not an object, no parameters emitted");
            return Ok(Vec::new());
        };
        Ok(properties
            .into_iter()
            .map(|(name, schema)| Parameter {
                location,
                required: location == ParamIn::Path || required.contains(&name),
                name,
                schema,
            })
            .collect())
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Serialized document; identical bytes until the next `register`.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.document.to_bytes()
    }

    /// Freezes the document and serializes it once.
    pub fn finish(self) -> Result<ApiSpec> {
        let bytes = self.document.to_bytes()?;
        tracing::info!(
            paths = self.document.paths.len(),
            bytes = bytes.len(),
            "API document ready"
        );
        Ok(ApiSpec {
            document: Arc::new(self.document),
            bytes: bytes.into(),
        })
    }
}

/// The published, read-only document. Cheap to clone and share across threads.
#[derive(Debug, Clone)]
pub struct ApiSpec {
    document: Arc<Document>,
    bytes: Arc<[u8]>,
}

impl ApiSpec {
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(&*self.document)?)
    }
}
