//! Compiles [`TypeDescriptor`]s into [`SchemaNode`]s.

use std::any::TypeId;
use std::collections::HashMap;

use indexmap::IndexMap;

use crate::descriptor::{Shape, TypeDescriptor};
use crate::directive::Directives;
use crate::error::{Error, Result};
use crate::schema::SchemaNode;

/// Compiles a descriptor. Total: unknown kinds become an empty object schema.
///
/// There is no cycle guard here, so a self-referential shape never terminates.
/// Use [`SchemaCompiler::with_max_depth`] when such shapes can show up.
pub fn compile(descriptor: &TypeDescriptor) -> SchemaNode {
    match compile_at(descriptor, 0, None) {
        Ok(node) => node,
        Err(_) => SchemaNode::empty_object(),
    }
}

fn compile_at(descriptor: &TypeDescriptor, depth: usize, limit: Option<usize>) -> Result<SchemaNode> {
    if let Some(limit) = limit {
        if depth > limit {
            return Err(Error::DepthLimit { limit });
        }
    }
    let node = match descriptor {
        TypeDescriptor::String => SchemaNode::string(),
        TypeDescriptor::Integer => SchemaNode::integer(),
        TypeDescriptor::Number => SchemaNode::number(),
        TypeDescriptor::Boolean => SchemaNode::Boolean,
        TypeDescriptor::Array(items) => SchemaNode::array(compile_at(items, depth + 1, limit)?),
        // Optionality is not reflected in the output.
        TypeDescriptor::Optional(inner) => compile_at(inner, depth, limit)?,
        TypeDescriptor::Object(fields) => {
            let mut properties = IndexMap::with_capacity(fields.len());
            let mut required = Vec::new();
            for field in fields {
                let mut node = compile_at(&field.ty.resolve(), depth + 1, limit)?;
                let directives = Directives::parse(&field.binding);
                directives.apply(&mut node);
                if directives.required {
                    required.push(field.name.to_string());
                }
                properties.insert(field.name.to_string(), node);
            }
            SchemaNode::Object {
                properties,
                required,
            }
        }
        TypeDescriptor::Deferred(describe) => compile_at(&describe(), depth + 1, limit)?,
        TypeDescriptor::Unknown(name) => {
            tracing::debug!(kind = %name, "unsupported shape kind, using empty object schema");
            SchemaNode::empty_object()
        }
    };
    Ok(node)
}

/// A reference to the shape of a route's params, query, body or response.
#[derive(Debug, Clone)]
pub enum ShapeRef {
    /// A Rust type; compiled once per [`SchemaCompiler`] and reused.
    Typed {
        id: TypeId,
        name: &'static str,
        describe: fn() -> TypeDescriptor,
    },
    /// A hand-written descriptor; compiled every time.
    Inline(TypeDescriptor),
}

impl ShapeRef {
    pub fn of<T: Shape + ?Sized + 'static>() -> Self {
        ShapeRef::Typed {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            describe: T::descriptor,
        }
    }

    pub fn inline(descriptor: TypeDescriptor) -> Self {
        ShapeRef::Inline(descriptor)
    }
}

/// A compiler that memoises typed shapes and can bound recursion depth.
#[derive(Debug, Default)]
pub struct SchemaCompiler {
    max_depth: Option<usize>,
    cache: HashMap<TypeId, SchemaNode>,
}

impl SchemaCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with [`Error::DepthLimit`] instead of recursing past `max_depth` levels.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
            cache: HashMap::new(),
        }
    }

    pub fn compile(&mut self, shape: &ShapeRef) -> Result<SchemaNode> {
        match shape {
            ShapeRef::Typed { id, name, describe } => {
                if let Some(node) = self.cache.get(id) {
                    return Ok(node.clone());
                }
                tracing::trace!(shape = name, "compiling shape");
                let node = compile_at(&describe(), 0, self.max_depth)?;
                self.cache.insert(*id, node.clone());
                Ok(node)
            }
            ShapeRef::Inline(descriptor) => compile_at(descriptor, 0, self.max_depth),
        }
    }

    /// Number of distinct typed shapes compiled so far.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldDescriptor;
    use serde_json::json;

    fn person() -> TypeDescriptor {
        let child = TypeDescriptor::object([
            FieldDescriptor::new("name", "required", TypeDescriptor::String),
            FieldDescriptor::new("age", "required", TypeDescriptor::Integer),
        ]);
        let address = TypeDescriptor::object([
            FieldDescriptor::new("street", "required", TypeDescriptor::String),
            FieldDescriptor::new("city", "required", TypeDescriptor::String),
        ]);
        TypeDescriptor::object([
            FieldDescriptor::new("name", "required", TypeDescriptor::String),
            FieldDescriptor::new("age", "required,min=18", TypeDescriptor::Integer),
            FieldDescriptor::new("isAdmin", "", TypeDescriptor::Boolean),
            FieldDescriptor::new("salary", "", TypeDescriptor::Number),
            FieldDescriptor::new("childs", "", TypeDescriptor::array(child)),
            FieldDescriptor::new("address", "", TypeDescriptor::optional(address)),
        ])
    }

    #[test]
    fn maps_each_kind_to_its_type() {
        let node = compile(&person());
        let types: Vec<_> = node
            .properties()
            .unwrap()
            .values()
            .map(SchemaNode::type_name)
            .collect();
        assert_eq!(types, ["string", "integer", "boolean", "number", "array", "object"]);
    }

    #[test]
    fn required_follows_declaration_order() {
        let node = compile(&person());
        assert_eq!(node.required(), ["name", "age"]);
        assert_eq!(
            serde_json::to_value(&node.properties().unwrap()["age"]).unwrap(),
            json!({"type": "integer", "minimum": 18})
        );
    }

    #[test]
    fn optional_compiles_as_wrapped_type() {
        let node = compile(&person());
        assert_eq!(
            serde_json::to_value(&node.properties().unwrap()["address"]).unwrap(),
            json!({
                "type": "object",
                "properties": {"street": {"type": "string"}, "city": {"type": "string"}},
                "required": ["street", "city"]
            })
        );
    }

    #[test]
    fn float_field_bounds_stay_integers() {
        let node = compile(&TypeDescriptor::object([FieldDescriptor::new(
            "price",
            "min=5,max=10",
            TypeDescriptor::Number,
        )]));
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"type": "object", "properties": {"price": {"type": "number", "minimum": 5, "maximum": 10}}})
        );
    }

    #[test]
    fn unknown_kind_degrades_to_empty_object() {
        assert_eq!(compile(&TypeDescriptor::unknown("chan int")), SchemaNode::empty_object());
    }

    struct Node;

    impl Shape for Node {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::object([FieldDescriptor::deferred(
                "children",
                "",
                Vec::<Node>::descriptor,
            )])
        }
    }

    #[test]
    fn depth_limit_stops_recursive_shapes() {
        let mut compiler = SchemaCompiler::with_max_depth(8);
        let err = compiler.compile(&ShapeRef::of::<Node>()).unwrap_err();
        assert!(matches!(err, Error::DepthLimit { limit: 8 }));
    }

    #[test]
    fn typed_shapes_are_memoised() {
        let mut compiler = SchemaCompiler::new();
        let first = compiler.compile(&ShapeRef::of::<Vec<String>>()).unwrap();
        let second = compiler.compile(&ShapeRef::of::<Vec<String>>()).unwrap();
        compiler.compile(&ShapeRef::inline(TypeDescriptor::Boolean)).unwrap();
        assert_eq!(first, second);
        assert_eq!(compiler.cached(), 1);
    }
}
