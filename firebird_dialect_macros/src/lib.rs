//! Procedural macros for firebird_dialect
//!
//! `#[derive(FirebirdModel)]` implements `firebird_dialect::models::Model` for
//! a struct with named fields, reading column options from `#[firebird(...)]`
//! attributes.
//!
//! ```ignore
//! #[derive(FirebirdModel)]
//! #[firebird(table = "bar", index = "a,b")]
//! struct Bar {
//!     #[firebird(foreign_key = "foo", on_delete = "cascade")]
//!     a: i32,
//!     #[firebird(max_length = 200, db_index)]
//!     slug: String,
//!     b: Option<i32>,
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Field, Fields, GenericArgument, LitInt, LitStr,
    PathArguments, Type,
};

/// Derive macro for firebird_dialect models
#[proc_macro_derive(FirebirdModel, attributes(firebird))]
pub fn derive_firebird_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_model(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Struct-level `#[firebird(...)]` options
#[derive(Default)]
struct ModelOptions {
    table: Option<String>,
    indexes: Vec<Vec<String>>,
}

/// Field-level `#[firebird(...)]` options
#[derive(Default)]
struct FieldOptions {
    primary_key: bool,
    unique: bool,
    db_index: Option<bool>,
    null: bool,
    max_length: Option<u32>,
    column: Option<String>,
    db_type: Option<String>,
    foreign_key: Option<String>,
    references: Option<String>,
    on_delete: Option<String>,
    on_update: Option<String>,
    default: Option<String>,
}

fn expand_model(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "FirebirdModel only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "FirebirdModel only supports structs",
            ))
        }
    };

    let options = parse_model_options(&input.attrs)?;
    let model_name = name.to_string();

    let table = options.table.as_ref().map(|table| {
        quote! { definition = definition.with_table(#table); }
    });

    let field_specs = fields
        .iter()
        .map(expand_field)
        .collect::<syn::Result<Vec<_>>>()?;

    let indexes = options.indexes.iter().map(|columns| {
        quote! { definition.add_index(vec![#(#columns.to_string()),*]); }
    });

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::firebird_dialect::models::Model for #name #ty_generics #where_clause {
            fn definition() -> ::firebird_dialect::models::ModelDefinition {
                let mut definition = ::firebird_dialect::models::ModelDefinition::new(#model_name);
                #table
                #(definition.add_field(#field_specs);)*
                #(#indexes)*
                definition.ensure_primary_key();
                definition
            }
        }
    })
}

fn parse_model_options(attrs: &[Attribute]) -> syn::Result<ModelOptions> {
    let mut options = ModelOptions::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("firebird")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let value: LitStr = meta.value()?.parse()?;
                options.table = Some(value.value());
            } else if meta.path.is_ident("index") {
                let value: LitStr = meta.value()?.parse()?;
                let columns: Vec<String> = value
                    .value()
                    .split(',')
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect();
                if columns.is_empty() {
                    return Err(meta.error("index needs at least one field"));
                }
                options.indexes.push(columns);
            } else {
                return Err(meta.error("unsupported firebird model option"));
            }
            Ok(())
        })?;
    }

    Ok(options)
}

fn parse_field_options(attrs: &[Attribute]) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("firebird")) {
        attr.parse_nested_meta(|meta| {
            let path = &meta.path;
            if path.is_ident("primary_key") {
                options.primary_key = true;
            } else if path.is_ident("unique") {
                options.unique = true;
            } else if path.is_ident("db_index") {
                options.db_index = Some(true);
            } else if path.is_ident("no_index") {
                options.db_index = Some(false);
            } else if path.is_ident("null") {
                options.null = true;
            } else if path.is_ident("max_length") {
                let value: LitInt = meta.value()?.parse()?;
                options.max_length = Some(value.base10_parse()?);
            } else if path.is_ident("column") {
                options.column = Some(string_value(&meta)?);
            } else if path.is_ident("db_type") {
                options.db_type = Some(string_value(&meta)?);
            } else if path.is_ident("foreign_key") {
                options.foreign_key = Some(string_value(&meta)?);
            } else if path.is_ident("references") {
                options.references = Some(string_value(&meta)?);
            } else if path.is_ident("on_delete") {
                options.on_delete = Some(string_value(&meta)?);
            } else if path.is_ident("on_update") {
                options.on_update = Some(string_value(&meta)?);
            } else if path.is_ident("default") {
                options.default = Some(string_value(&meta)?);
            } else {
                return Err(meta.error("unsupported firebird field option"));
            }
            Ok(())
        })?;
    }

    Ok(options)
}

fn string_value(meta: &syn::meta::ParseNestedMeta) -> syn::Result<String> {
    let value: LitStr = meta.value()?.parse()?;
    Ok(value.value())
}

/// Build the `FieldSpec` expression for one struct field
fn expand_field(field: &Field) -> syn::Result<TokenStream2> {
    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
    let name = ident.to_string();
    let options = parse_field_options(&field.attrs)?;

    let (inner, optional) = match option_inner(&field.ty) {
        Some(inner) => (inner, true),
        None => (&field.ty, false),
    };
    let field_type = match &options.db_type {
        Some(db_type) => quote! { ::firebird_dialect::models::FieldType::Custom(#db_type.to_string()) },
        None => field_type_tokens(inner, options.max_length)?,
    };

    let mut spec = quote! {
        ::firebird_dialect::models::FieldSpec::new(#name, #field_type)
    };

    if optional || options.null {
        spec.extend(quote! { .nullable(true) });
    }
    if let Some(column) = &options.column {
        spec.extend(quote! { .db_column(#column) });
    }
    if options.primary_key {
        spec.extend(quote! { .primary_key() });
    }
    if options.unique {
        spec.extend(quote! { .unique(true) });
    }
    if let Some(table) = &options.foreign_key {
        let references = options.references.as_deref().unwrap_or("id");
        let mut target = quote! {
            ::firebird_dialect::models::ForeignKeyTarget::new(#table, #references)
        };
        if let Some(action) = &options.on_delete {
            target.extend(quote! { .on_delete(#action) });
        }
        if let Some(action) = &options.on_update {
            target.extend(quote! { .on_update(#action) });
        }
        spec.extend(quote! { .foreign_key(#target) });
    } else if options.references.is_some() || options.on_delete.is_some() || options.on_update.is_some() {
        return Err(syn::Error::new_spanned(
            ident,
            "references, on_delete and on_update need foreign_key",
        ));
    }
    // after foreign_key, which turns indexing on
    if let Some(db_index) = options.db_index {
        spec.extend(quote! { .db_index(#db_index) });
    }
    if let Some(default) = &options.default {
        spec.extend(quote! { .default(#default) });
    }

    Ok(spec)
}

/// `T` for `Option<T>`
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => match args.args.first()? {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

fn field_type_tokens(ty: &Type, max_length: Option<u32>) -> syn::Result<TokenStream2> {
    let ident = match ty {
        Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    };

    let tokens = match ident.as_deref() {
        Some("i16") => quote! { ::firebird_dialect::models::FieldType::SmallInt },
        Some("i32") => quote! { ::firebird_dialect::models::FieldType::Integer },
        Some("i64") => quote! { ::firebird_dialect::models::FieldType::BigInt },
        Some("bool") => quote! { ::firebird_dialect::models::FieldType::Boolean },
        Some("f32") => quote! { ::firebird_dialect::models::FieldType::Float },
        Some("f64") => quote! { ::firebird_dialect::models::FieldType::Double },
        Some("String") => match max_length {
            Some(length) => quote! { ::firebird_dialect::models::FieldType::Varchar(#length) },
            None => quote! { ::firebird_dialect::models::FieldType::Text },
        },
        Some("NaiveDate") => quote! { ::firebird_dialect::models::FieldType::Date },
        Some("NaiveTime") => quote! { ::firebird_dialect::models::FieldType::Time },
        Some("NaiveDateTime") | Some("DateTime") => {
            quote! { ::firebird_dialect::models::FieldType::Timestamp }
        }
        _ => {
            return Err(syn::Error::new_spanned(
                ty,
                "unsupported field type, use #[firebird(db_type = \"...\")]",
            ))
        }
    };

    Ok(tokens)
}
