//! Structural descriptions of request/response data shapes.
//!
//! A [`TypeDescriptor`] is what the schema compiler consumes. Descriptors can be
//! written by hand, or produced from Rust types through the [`Shape`] trait
//! (usually via `#[derive(Shape)]`).

use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet, LinkedList, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

/// The kind of a data shape, with its children.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    String,
    Integer,
    Number,
    Boolean,
    Array(Box<TypeDescriptor>),
    /// Optional/nullable wrapper. Compiles as the wrapped type.
    Optional(Box<TypeDescriptor>),
    /// Ordered, named fields.
    Object(Vec<FieldDescriptor>),
    /// A kind the compiler has no mapping for; carries a name for diagnostics.
    Unknown(Cow<'static, str>),
    /// Another shape, described only when compiled. Counts as one level of depth.
    Deferred(fn() -> TypeDescriptor),
}

impl TypeDescriptor {
    pub fn array(items: TypeDescriptor) -> Self {
        TypeDescriptor::Array(Box::new(items))
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Optional(Box::new(inner))
    }

    pub fn object(fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        TypeDescriptor::Object(fields.into_iter().collect())
    }

    pub fn unknown(name: impl Into<Cow<'static, str>>) -> Self {
        TypeDescriptor::Unknown(name.into())
    }

    pub fn deferred(describe: fn() -> TypeDescriptor) -> Self {
        TypeDescriptor::Deferred(describe)
    }
}

/// Where a field's own descriptor comes from.
#[derive(Debug, Clone)]
pub enum FieldType {
    Inline(Box<TypeDescriptor>),
    /// Resolved on demand, so recursive types can describe themselves.
    Deferred(fn() -> TypeDescriptor),
}

impl FieldType {
    pub fn resolve(&self) -> Cow<'_, TypeDescriptor> {
        match self {
            FieldType::Inline(ty) => Cow::Borrowed(ty),
            FieldType::Deferred(describe) => Cow::Owned(describe()),
        }
    }
}

impl PartialEq for FieldType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldType::Inline(a), FieldType::Inline(b)) => a == b,
            (FieldType::Deferred(a), FieldType::Deferred(b)) => *a as usize == *b as usize,
            _ => false,
        }
    }
}

/// A named field of an object shape.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Serialized (wire) name.
    pub name: Cow<'static, str>,
    /// Raw directive string, e.g. `"required,min=4,max=255"`.
    pub binding: Cow<'static, str>,
    pub ty: FieldType,
}

impl FieldDescriptor {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        binding: impl Into<Cow<'static, str>>,
        ty: TypeDescriptor,
    ) -> Self {
        Self {
            name: name.into(),
            binding: binding.into(),
            ty: FieldType::Inline(Box::new(ty)),
        }
    }

    pub fn deferred(
        name: impl Into<Cow<'static, str>>,
        binding: impl Into<Cow<'static, str>>,
        describe: fn() -> TypeDescriptor,
    ) -> Self {
        Self {
            name: name.into(),
            binding: binding.into(),
            ty: FieldType::Deferred(describe),
        }
    }
}

/// Types that can describe their own data shape.
///
/// Implemented for primitives, std containers and smart pointers. Structs get
/// it from `#[derive(Shape)]`:
///
/// ```ignore
/// #[derive(Serialize, Shape)]
/// struct ArticleMutation {
///     #[shape(binding = "required,min=4,max=255")]
///     title: String,
///     #[shape(binding = "required")]
///     content: String,
/// }
/// ```
pub trait Shape {
    fn descriptor() -> TypeDescriptor;
}

macro_rules! impl_shape {
    ($variant:ident => $($ty:ty),* $(,)?) => {
        $(
            impl Shape for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::$variant
                }
            }
        )*
    };
}

impl_shape!(Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_shape!(Number => f32, f64);
impl_shape!(Boolean => bool);
impl_shape!(String => String, str, char);

macro_rules! impl_shape_seq {
    ($($ty:ident),* $(,)?) => {
        $(
            impl<T: Shape> Shape for $ty<T> {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::array(T::descriptor())
                }
            }
        )*
    };
}

impl_shape_seq!(Vec, VecDeque, LinkedList, BTreeSet);

impl<T: Shape, H> Shape for HashSet<T, H> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::array(T::descriptor())
    }
}

impl<T: Shape> Shape for [T] {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::array(T::descriptor())
    }
}

impl<T: Shape, const N: usize> Shape for [T; N] {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::array(T::descriptor())
    }
}

impl<T: Shape> Shape for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::optional(T::descriptor())
    }
}

macro_rules! impl_shape_transparent {
    ($($ty:ident),* $(,)?) => {
        $(
            impl<T: Shape + ?Sized> Shape for $ty<T> {
                fn descriptor() -> TypeDescriptor {
                    T::descriptor()
                }
            }
        )*
    };
}

impl_shape_transparent!(Box, Rc, Arc);

impl<T: Shape + ?Sized> Shape for &T {
    fn descriptor() -> TypeDescriptor {
        T::descriptor()
    }
}

impl<T: Shape + ToOwned + ?Sized> Shape for Cow<'_, T> {
    fn descriptor() -> TypeDescriptor {
        T::descriptor()
    }
}

impl Shape for serde_json::Value {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::unknown("serde_json::Value")
    }
}

impl Shape for () {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::unknown("()")
    }
}
