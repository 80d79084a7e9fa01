use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::compiler::ShapeRef;
use crate::descriptor::Shape;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl Method {
    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Patch,
        Method::Options,
        Method::Head,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
            Method::Head => "HEAD",
        }
    }

    /// Key of the operation under a document path.
    pub fn as_lowercase(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Delete => "delete",
            Method::Patch => "patch",
            Method::Options => "options",
            Method::Head => "head",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownMethod(s.to_string()))
    }
}

/// Documentation side of a route: text and the shapes to compile.
#[derive(Debug, Clone, Default)]
pub struct RouteSchema {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub params: Option<ShapeRef>,
    pub querystring: Option<ShapeRef>,
    pub body: Option<ShapeRef>,
    pub responses: BTreeMap<u16, ShapeRef>,
}

impl RouteSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn params<T: Shape + 'static>(self) -> Self {
        self.params_shape(ShapeRef::of::<T>())
    }

    pub fn params_shape(mut self, shape: ShapeRef) -> Self {
        self.params = Some(shape);
        self
    }

    pub fn querystring<T: Shape + 'static>(self) -> Self {
        self.querystring_shape(ShapeRef::of::<T>())
    }

    pub fn querystring_shape(mut self, shape: ShapeRef) -> Self {
        self.querystring = Some(shape);
        self
    }

    pub fn body<T: Shape + 'static>(self) -> Self {
        self.body_shape(ShapeRef::of::<T>())
    }

    pub fn body_shape(mut self, shape: ShapeRef) -> Self {
        self.body = Some(shape);
        self
    }

    pub fn response<T: Shape + 'static>(self, status: u16) -> Self {
        self.response_shape(status, ShapeRef::of::<T>())
    }

    pub fn response_shape(mut self, status: u16, shape: ShapeRef) -> Self {
        self.responses.insert(status, shape);
        self
    }
}

/// A route declaration. `H` is whatever the HTTP layer binds; the registry
/// only passes it through.
#[derive(Debug, Clone)]
pub struct Route<H> {
    pub method: Method,
    /// URL template relative to the group base path, `:name` marks a path parameter.
    pub url: String,
    pub tags: Option<Vec<String>>,
    pub schema: Option<RouteSchema>,
    pub handler: H,
}

impl<H> Route<H> {
    pub fn new(method: Method, url: impl Into<String>, handler: H) -> Self {
        Self {
            method,
            url: url.into(),
            tags: None,
            schema: None,
            handler,
        }
    }

    pub fn get(url: impl Into<String>, handler: H) -> Self {
        Self::new(Method::Get, url, handler)
    }

    pub fn post(url: impl Into<String>, handler: H) -> Self {
        Self::new(Method::Post, url, handler)
    }

    pub fn put(url: impl Into<String>, handler: H) -> Self {
        Self::new(Method::Put, url, handler)
    }

    pub fn delete(url: impl Into<String>, handler: H) -> Self {
        Self::new(Method::Delete, url, handler)
    }

    pub fn patch(url: impl Into<String>, handler: H) -> Self {
        Self::new(Method::Patch, url, handler)
    }

    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn schema(mut self, schema: RouteSchema) -> Self {
        self.schema = Some(schema);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("patch".parse::<Method>().unwrap(), Method::Patch);
        assert_eq!("OPTIONS".parse::<Method>().unwrap(), Method::Options);
        assert!(matches!("TRACE".parse::<Method>(), Err(Error::UnknownMethod(m)) if m == "TRACE"));
    }

    #[test]
    fn method_names() {
        for method in Method::ALL {
            assert_eq!(method.as_lowercase(), method.as_str().to_lowercase());
        }
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn builder_collects_responses_by_status() {
        let schema = RouteSchema::new()
            .summary("Get all articles")
            .response::<Vec<String>>(200)
            .response::<String>(404);
        assert_eq!(schema.summary.as_deref(), Some("Get all articles"));
        assert_eq!(schema.responses.keys().copied().collect::<Vec<_>>(), [200, 404]);

        let route = Route::get(":id", ()).tags(["articles"]).schema(schema);
        assert_eq!(route.tags, Some(vec!["articles".to_string()]));
        assert_eq!(route.method, Method::Get);
    }
}
