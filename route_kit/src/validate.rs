//! Checks a value against the binding directives of its [`Shape`].
//!
//! The same `#[shape(binding = "...")]` strings that put `minLength` or
//! `required` into the document are enforced here, so a handler cannot drift
//! from what it publishes.

use serde::Serialize;
use serde_json::Value;

use crate::descriptor::{Shape, TypeDescriptor};
use crate::directive::Directives;
use crate::error::{Error, Result};

/// Serializes `value` and checks every field's directives, depth first.
///
/// Fails with [`Error::Validation`] naming the first offending field as a
/// dotted path (`author.email`, `tags[2]`).
pub fn validate<T: Shape + Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_value(value)?;
    check_value(&T::descriptor(), &json, "")
}

/// Checks an already serialized value against `descriptor`.
pub fn check_value(descriptor: &TypeDescriptor, value: &Value, path: &str) -> Result<()> {
    match (descriptor, value) {
        (TypeDescriptor::Object(fields), Value::Object(map)) => {
            for field in fields {
                let path = join(path, &field.name);
                let field_value = map.get(&*field.name).unwrap_or(&Value::Null);
                Directives::parse(&field.binding)
                    .check(field_value)
                    .map_err(|reason| Error::Validation {
                        field: path.clone(),
                        reason,
                    })?;
                check_value(&field.ty.resolve(), field_value, &path)?;
            }
            Ok(())
        }
        (TypeDescriptor::Array(items), Value::Array(values)) => {
            for (i, item) in values.iter().enumerate() {
                check_value(items, item, &format!("{path}[{i}]"))?;
            }
            Ok(())
        }
        (TypeDescriptor::Optional(_), Value::Null) => Ok(()),
        (TypeDescriptor::Optional(inner), _) => check_value(inner, value, path),
        (TypeDescriptor::Deferred(describe), _) => check_value(&describe(), value, path),
        _ => Ok(()),
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldDescriptor;
    use serde_json::json;

    fn signup() -> TypeDescriptor {
        let contact = TypeDescriptor::object([FieldDescriptor::new("email", "required,email", TypeDescriptor::String)]);
        TypeDescriptor::object([
            FieldDescriptor::new("name", "required,min=2,max=8", TypeDescriptor::String),
            FieldDescriptor::new("age", "min=18", TypeDescriptor::optional(TypeDescriptor::Integer)),
            FieldDescriptor::new("contacts", "max=2", TypeDescriptor::array(contact)),
        ])
    }

    fn field_of(err: Error) -> String {
        match err {
            Error::Validation { field, .. } => field,
            other => panic!("expected a validation error, got {other}"),
        }
    }

    #[test]
    fn accepts_a_conforming_value() {
        let value = json!({"name": "Ada", "age": null, "contacts": [{"email": "ada@example.com"}]});
        assert!(check_value(&signup(), &value, "").is_ok());
    }

    #[test]
    fn reports_the_first_offending_field() {
        let too_long = json!({"name": "Augustine", "contacts": []});
        assert_eq!(field_of(check_value(&signup(), &too_long, "").unwrap_err()), "name");

        let missing = json!({"contacts": []});
        assert_eq!(field_of(check_value(&signup(), &missing, "").unwrap_err()), "name");

        let minor = json!({"name": "Ada", "age": 12, "contacts": []});
        assert_eq!(field_of(check_value(&signup(), &minor, "").unwrap_err()), "age");
    }

    #[test]
    fn nested_fields_get_a_dotted_path() {
        let value = json!({"name": "Ada", "contacts": [{"email": "ada@example.com"}, {"email": "nope"}]});
        assert_eq!(field_of(check_value(&signup(), &value, "").unwrap_err()), "contacts[1].email");

        let crowded = json!({"name": "Ada", "contacts": [{"email": "a@b.io"}, {"email": "c@d.io"}, {"email": "e@f.io"}]});
        assert_eq!(field_of(check_value(&signup(), &crowded, "").unwrap_err()), "contacts");
    }

    #[derive(Serialize)]
    struct Login {
        user: String,
    }

    impl Shape for Login {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::object([FieldDescriptor::new("user", "required,min=3", TypeDescriptor::String)])
        }
    }

    #[test]
    fn validates_typed_values() {
        assert!(validate(&Login { user: "root".into() }).is_ok());
        let err = validate(&Login { user: "x".into() }).unwrap_err();
        assert_eq!(err.to_string(), "Validation Error: user: length must be at least 3, got 1");
    }
}
