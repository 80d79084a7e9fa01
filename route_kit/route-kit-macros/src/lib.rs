extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, parse_quote, punctuated::Punctuated, Attribute, Data, DeriveInput, Expr, Fields, Lit, Meta,
    Result, Token,
};

/// Derives `route_kit::Shape`, describing a struct to the schema compiler.
///
/// - Named-field structs become object shapes. Field names follow serde:
///   `#[serde(rename = "...")]` and the container's `#[serde(rename_all = "...")]`
///   are honoured, `#[serde(skip)]` / `#[serde(skip_serializing)]` drop a field.
/// - `#[shape(binding = "required,min=4,max=255")]` attaches validation directives.
/// - `#[shape(rename = "...")]` and `#[shape(skip)]` override serde for the schema only.
/// - Newtype structs describe as their inner type; enums, unit and tuple structs
///   describe as an unknown kind (an empty object schema).
#[proc_macro_derive(Shape, attributes(shape))]
pub fn derive_shape(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(mut input: DeriveInput) -> Result<TokenStream2> {
    let name = &input.ident;
    let container = parse_serde_attrs(&input.attrs)?;

    let body = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => {
                let mut entries = Vec::new();
                for field in &fields.named {
                    let serde = parse_serde_attrs(&field.attrs)?;
                    let shape = parse_shape_attrs(&field.attrs)?;
                    if shape.skip || serde.skip {
                        continue;
                    }
                    let ident = field.ident.as_ref().map(ToString::to_string).unwrap_or_default();
                    let ident = ident.strip_prefix("r#").unwrap_or(&ident);
                    let wire = shape
                        .rename
                        .or(serde.rename)
                        .unwrap_or_else(|| apply_rename_all(ident, container.rename_all.as_deref()));
                    let binding = shape.binding.unwrap_or_default();
                    let ty = &field.ty;
                    entries.push(quote! {
                        ::route_kit::FieldDescriptor::deferred(
                            #wire,
                            #binding,
                            <#ty as ::route_kit::Shape>::descriptor,
                        )
                    });
                }
                quote! {
                    ::route_kit::TypeDescriptor::object(::std::vec![#(#entries),*])
                }
            }
            Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
                // Lazy: `struct Tree(Vec<Tree>)` must not expand here.
                let ty = &fields.unnamed[0].ty;
                quote! { ::route_kit::TypeDescriptor::deferred(<#ty as ::route_kit::Shape>::descriptor) }
            }
            _ => unknown(name),
        },
        Data::Enum(_) | Data::Union(_) => unknown(name),
    };

    let type_params: Vec<_> = input.generics.type_params().map(|p| p.ident.clone()).collect();
    let where_clause = input.generics.make_where_clause();
    for param in type_params {
        where_clause.predicates.push(parse_quote!(#param: ::route_kit::Shape));
    }
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::route_kit::Shape for #name #ty_generics #where_clause {
            fn descriptor() -> ::route_kit::TypeDescriptor {
                #body
            }
        }
    })
}

fn unknown(name: &syn::Ident) -> TokenStream2 {
    let name = name.to_string();
    quote! { ::route_kit::TypeDescriptor::unknown(#name) }
}

#[derive(Default)]
struct SerdeAttrs {
    rename: Option<String>,
    rename_all: Option<String>,
    skip: bool,
}

/// Reads the serde keys that change wire names; everything else is ignored.
fn parse_serde_attrs(attrs: &[Attribute]) -> Result<SerdeAttrs> {
    let mut out = SerdeAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let metas = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
        for meta in metas {
            match &meta {
                Meta::Path(path) if path.is_ident("skip") || path.is_ident("skip_serializing") => {
                    out.skip = true;
                }
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    if let Some(value) = lit_str(&nv.value) {
                        out.rename = Some(value);
                    }
                }
                Meta::NameValue(nv) if nv.path.is_ident("rename_all") => {
                    if let Some(value) = lit_str(&nv.value) {
                        out.rename_all = Some(value);
                    }
                }
                // rename(serialize = "...", deserialize = "...")
                Meta::List(list) if list.path.is_ident("rename") || list.path.is_ident("rename_all") => {
                    let nested = list.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
                    for inner in nested {
                        if let Meta::NameValue(nv) = inner {
                            if nv.path.is_ident("serialize") {
                                let value = lit_str(&nv.value);
                                if list.path.is_ident("rename") {
                                    out.rename = value;
                                } else {
                                    out.rename_all = value;
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }
    Ok(out)
}

#[derive(Default)]
struct ShapeAttrs {
    binding: Option<String>,
    rename: Option<String>,
    skip: bool,
}

fn parse_shape_attrs(attrs: &[Attribute]) -> Result<ShapeAttrs> {
    let mut out = ShapeAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("shape")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("binding") {
                out.binding = Some(meta.value()?.parse::<syn::LitStr>()?.value());
                Ok(())
            } else if meta.path.is_ident("rename") {
                out.rename = Some(meta.value()?.parse::<syn::LitStr>()?.value());
                Ok(())
            } else if meta.path.is_ident("skip") {
                out.skip = true;
                Ok(())
            } else {
                Err(meta.error("expected `binding`, `rename` or `skip`"))
            }
        })?;
    }
    Ok(out)
}

fn lit_str(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Str(lit) => Some(lit.value()),
            _ => None,
        },
        _ => None,
    }
}

/// Same casing rules serde applies to field names under `rename_all`.
fn apply_rename_all(field: &str, rule: Option<&str>) -> String {
    match rule {
        Some("UPPERCASE") | Some("SCREAMING_SNAKE_CASE") => field.to_ascii_uppercase(),
        Some("PascalCase") => to_pascal_case(field),
        Some("camelCase") => {
            let pascal = to_pascal_case(field);
            let mut chars = pascal.chars();
            match chars.next() {
                Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                None => pascal,
            }
        }
        Some("kebab-case") => field.replace('_', "-"),
        Some("SCREAMING-KEBAB-CASE") => field.to_ascii_uppercase().replace('_', "-"),
        // "lowercase" and "snake_case" leave a Rust field name as it is.
        _ => field.to_string(),
    }
}

fn to_pascal_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut capitalize = true;
    for ch in field.chars() {
        if ch == '_' {
            capitalize = true;
        } else if capitalize {
            out.push(ch.to_ascii_uppercase());
            capitalize = false;
        } else {
            out.push(ch);
        }
    }
    out
}
