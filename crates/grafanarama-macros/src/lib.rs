//! Derive macro generating schema descriptors for `grafanarama` models.
//!
//! `#[derive(Schema)]` inspects the declared type of every named field together with the serde
//! attributes that affect the serialized shape (`rename`, `rename_all`, `skip`, `flatten` and
//! `default`) and emits an implementation of `grafanarama::schema::Schema` describing the wire
//! name and kind of each field.
use proc_macro::TokenStream;

use darling::{ast::Data, util::Ignored, FromDeriveInput, FromField, FromMeta};
use quote::quote;
use syn::{
    ext::IdentExt, meta::ParseNestedMeta, parse_macro_input, GenericArgument, LitStr,
    PathArguments, Token, Type,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromMeta)]
enum Kind {
    Scalar,
    Array,
    Object,
    Any,
}

impl Kind {
    fn variant(self) -> proc_macro2::TokenStream {
        match self {
            Self::Scalar => quote!(Scalar),
            Self::Array => quote!(Array),
            Self::Object => quote!(Object),
            Self::Any => quote!(Any),
        }
    }
}

#[derive(Debug, FromField)]
#[darling(attributes(schema), forward_attrs(serde))]
struct SchemaField {
    ident: Option<syn::Ident>,
    ty: Type,
    attrs: Vec<syn::Attribute>,
    #[darling(default)]
    kind: Option<Kind>,
}

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(schema), forward_attrs(serde), supports(struct_named))]
struct SchemaOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    attrs: Vec<syn::Attribute>,
    data: Data<Ignored, SchemaField>,
    #[darling(default)]
    name: Option<String>,
}

/// Mirrors the field renaming rules applied by `#[serde(rename_all = "...")]`.
///
/// Must stay in step with `serde_derive`'s `RenameRule::apply_to_field`; the `grafanarama`
/// schema tests compare derived names against serialized keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenameRule {
    None,
    LowerCase,
    UpperCase,
    PascalCase,
    CamelCase,
    SnakeCase,
    ScreamingSnakeCase,
    KebabCase,
    ScreamingKebabCase,
}

impl RenameRule {
    fn from_str(rule: &str) -> Option<Self> {
        Some(match rule {
            "lowercase" => Self::LowerCase,
            "UPPERCASE" => Self::UpperCase,
            "PascalCase" => Self::PascalCase,
            "camelCase" => Self::CamelCase,
            "snake_case" => Self::SnakeCase,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnakeCase,
            "kebab-case" => Self::KebabCase,
            "SCREAMING-KEBAB-CASE" => Self::ScreamingKebabCase,
            _ => return None,
        })
    }

    fn apply_to_field(self, field: &str) -> String {
        match self {
            Self::None | Self::LowerCase | Self::SnakeCase => field.to_owned(),
            Self::UpperCase | Self::ScreamingSnakeCase => field.to_ascii_uppercase(),
            Self::PascalCase => {
                let mut pascal = String::with_capacity(field.len());
                let mut capitalize = true;
                for ch in field.chars() {
                    if ch == '_' {
                        capitalize = true;
                    } else if capitalize {
                        pascal.push(ch.to_ascii_uppercase());
                        capitalize = false;
                    } else {
                        pascal.push(ch);
                    }
                }
                pascal
            }
            Self::CamelCase => {
                let pascal = Self::PascalCase.apply_to_field(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => pascal,
                }
            }
            Self::KebabCase => field.replace('_', "-"),
            Self::ScreamingKebabCase => field.to_ascii_uppercase().replace('_', "-"),
        }
    }
}

#[derive(Debug)]
struct SerdeContainer {
    rename_all: RenameRule,
    default: bool,
}

#[derive(Debug, Default)]
struct SerdeField {
    rename: Option<String>,
    skip: bool,
    flatten: bool,
    default: bool,
}

// Consume the value of a serde attribute we don't care about, whatever its shape.
fn skip_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_value(&inner))?;
    }
    Ok(())
}

fn parse_serde_container(attrs: &[syn::Attribute]) -> syn::Result<SerdeContainer> {
    let mut container = SerdeContainer {
        rename_all: RenameRule::None,
        default: false,
    };
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                let rule = if meta.input.peek(Token![=]) {
                    Some(meta.value()?.parse::<LitStr>()?)
                } else {
                    let mut serialize = None;
                    meta.parse_nested_meta(|inner| {
                        let value = inner.value()?.parse::<LitStr>()?;
                        if inner.path.is_ident("serialize") {
                            serialize = Some(value);
                        }
                        Ok(())
                    })?;
                    serialize
                };
                if let Some(rule) = rule {
                    container.rename_all = RenameRule::from_str(&rule.value()).ok_or_else(|| {
                        syn::Error::new(rule.span(), "unknown `rename_all` rule")
                    })?;
                }
            } else if meta.path.is_ident("default") {
                container.default = true;
                skip_value(&meta)?;
            } else {
                skip_value(&meta)?;
            }
            Ok(())
        })?;
    }
    Ok(container)
}

fn parse_serde_field(attrs: &[syn::Attribute]) -> syn::Result<SerdeField> {
    let mut field = SerdeField::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if meta.input.peek(Token![=]) {
                    field.rename = Some(meta.value()?.parse::<LitStr>()?.value());
                } else {
                    meta.parse_nested_meta(|inner| {
                        let value = inner.value()?.parse::<LitStr>()?;
                        if inner.path.is_ident("serialize") {
                            field.rename = Some(value.value());
                        }
                        Ok(())
                    })?;
                }
            } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                field.skip = true;
            } else if meta.path.is_ident("flatten") {
                field.flatten = true;
            } else if meta.path.is_ident("default") {
                field.default = true;
                skip_value(&meta)?;
            } else {
                skip_value(&meta)?;
            }
            Ok(())
        })?;
    }
    Ok(field)
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(p) if p.qself.is_none() => p.path.segments.last(),
        _ => None,
    }
}

fn first_type_arg(segment: &syn::PathSegment) -> Option<&Type> {
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|a| match a {
            GenericArgument::Type(t) => Some(t),
            _ => None,
        }),
        _ => None,
    }
}

/// Strip any number of `Option<...>` layers, reporting whether there was at least one.
fn peel_option(mut ty: &Type) -> (&Type, bool) {
    let mut optional = false;
    while let Some(inner) = last_segment(ty)
        .filter(|s| s.ident == "Option")
        .and_then(first_type_arg)
    {
        optional = true;
        ty = inner;
    }
    (ty, optional)
}

fn infer_kind(ty: &Type) -> Kind {
    match ty {
        Type::Array(_) | Type::Slice(_) => Kind::Array,
        Type::Reference(r) => infer_kind(&r.elem),
        Type::Group(g) => infer_kind(&g.elem),
        Type::Paren(p) => infer_kind(&p.elem),
        Type::Path(_) => {
            let Some(segment) = last_segment(ty) else {
                return Kind::Object;
            };
            match segment.ident.to_string().as_str() {
                "Vec" | "VecDeque" | "LinkedList" | "HashSet" | "BTreeSet" | "IndexSet"
                | "SmallVec" => Kind::Array,
                "Box" | "Arc" | "Rc" | "Cow" => {
                    first_type_arg(segment).map_or(Kind::Object, |inner| {
                        let (inner, _) = peel_option(inner);
                        infer_kind(inner)
                    })
                }
                "String" | "str" | "bool" | "char" | "i8" | "i16" | "i32" | "i64" | "i128"
                | "isize" | "u8" | "u16" | "u32" | "u64" | "u128" | "usize" | "f32" | "f64"
                | "DateTime" | "NaiveDate" | "NaiveDateTime" | "NaiveTime" | "Uuid" => {
                    Kind::Scalar
                }
                "Value" => Kind::Any,
                _ => Kind::Object,
            }
        }
        _ => Kind::Object,
    }
}

#[doc(hidden)]
#[allow(missing_docs)]
#[proc_macro_derive(Schema, attributes(schema))]
pub fn derive_schema(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as syn::DeriveInput);
    let SchemaOpts {
        ident,
        generics,
        attrs,
        data,
        name,
    } = match SchemaOpts::from_derive_input(&ast) {
        Ok(x) => x,
        Err(e) => return e.flatten().write_errors().into(),
    };
    let container = match parse_serde_container(&attrs) {
        Ok(x) => x,
        Err(e) => return e.into_compile_error().into(),
    };
    let fields = match data {
        Data::Struct(fields) => fields.fields,
        Data::Enum(_) => unreachable!("darling rejects enums via `supports`"),
    };

    let mut descriptors = Vec::with_capacity(fields.len());
    for field in fields {
        let serde = match parse_serde_field(&field.attrs) {
            Ok(x) => x,
            Err(e) => return e.into_compile_error().into(),
        };
        if serde.skip || serde.flatten {
            continue;
        }
        let Some(field_ident) = field.ident else {
            continue;
        };
        let wire_name = serde.rename.unwrap_or_else(|| {
            container
                .rename_all
                .apply_to_field(&field_ident.unraw().to_string())
        });
        let (inner, optional) = peel_option(&field.ty);
        let kind = field.kind.unwrap_or_else(|| infer_kind(inner)).variant();
        let required = !optional && !serde.default && !container.default;
        descriptors.push(quote! {
            ::grafanarama::schema::FieldDescriptor::new(
                #wire_name,
                ::grafanarama::schema::FieldKind::#kind,
                #required,
            )
        });
    }

    let schema_name = name.unwrap_or_else(|| ident.to_string());
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    quote! {
        impl #impl_generics ::grafanarama::schema::Schema for #ident #ty_generics #where_clause {
            const SCHEMA: ::grafanarama::schema::SchemaDescriptor =
                ::grafanarama::schema::SchemaDescriptor::new(
                    #schema_name,
                    &[#(#descriptors),*],
                );
        }
    }
    .into()
}
