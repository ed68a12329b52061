use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    Attribute, Data, DeriveInput, Expr, ExprLit, Fields, GenericParam, Lit, Meta, Type, Visibility,
    parse_macro_input, parse_quote,
};

/// Derives `envbind::Bind` for a struct with named fields.
///
/// Field attributes:
/// * `#[env = "NAME"]` or `#[env = "NAME,DEFAULT"]` - variable and default
/// * `#[time_layout = "02/01/2006"]` - reference-date layout for timestamps
///
/// Only fields with a visibility qualifier (`pub`, `pub(crate)`, ...) are
/// reported; private fields are never written.
#[proc_macro_derive(Bind, attributes(env, time_layout))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_bind(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_bind(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unit => return Ok(empty_impl(input)),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Bind can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Bind can only be derived for structs",
            ));
        }
    };

    if let Some(lifetime) = input.generics.lifetimes().next() {
        return Err(syn::Error::new_spanned(
            lifetime,
            "Bind cannot be derived for structs with lifetime parameters",
        ));
    }

    let mut visits = Vec::new();
    for field in fields {
        let config = parse_field_config(&field.attrs)?;

        // private fields stay untouched
        if matches!(field.vis, Visibility::Inherited) {
            continue;
        }
        if matches!(field.ty, Type::Reference(_)) {
            continue;
        }

        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let field_name = field_ident.unraw().to_string();

        let env = config.env.map(|env| quote! { .env(#env) });
        let time_layout = config.time_layout.map(|layout| quote! { .time_layout(#layout) });

        visits.push(quote! {
            visitor.visit(
                ::envbind::FieldTag::new(#field_name) #env #time_layout,
                &mut self.#field_ident,
            );
        });
    }

    let generics = add_static_bounds(input.generics.clone());
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::envbind::Bind for #struct_name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn visit_fields(&mut self, visitor: &mut dyn ::envbind::FieldVisitor) {
                #(#visits)*
            }
        }
    })
}

fn empty_impl(input: &DeriveInput) -> proc_macro2::TokenStream {
    let struct_name = &input.ident;
    let generics = add_static_bounds(input.generics.clone());
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    quote! {
        impl #impl_generics ::envbind::Bind for #struct_name #ty_generics #where_clause {
            fn visit_fields(&mut self, _visitor: &mut dyn ::envbind::FieldVisitor) {}
        }
    }
}

/// Fields are handed out as `&mut dyn Any`, which needs `'static` types
fn add_static_bounds(mut generics: syn::Generics) -> syn::Generics {
    for param in &mut generics.params {
        if let GenericParam::Type(type_param) = param {
            type_param.bounds.push(parse_quote!('static));
        }
    }
    generics
}

#[derive(Debug, Default)]
struct FieldConfig {
    env: Option<String>,
    time_layout: Option<String>,
}

/// Parse `#[env = "..."]` and `#[time_layout = "..."]`
fn parse_field_config(attrs: &[Attribute]) -> syn::Result<FieldConfig> {
    let mut config = FieldConfig::default();

    for attr in attrs {
        let slot = if attr.path().is_ident("env") {
            &mut config.env
        } else if attr.path().is_ident("time_layout") {
            &mut config.time_layout
        } else {
            continue;
        };

        if slot.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate attribute"));
        }
        *slot = Some(string_value(attr)?);
    }

    Ok(config)
}

fn string_value(attr: &Attribute) -> syn::Result<String> {
    match &attr.meta {
        Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(s), ..
            }) => Ok(s.value()),
            other => Err(syn::Error::new_spanned(other, "expected a string literal")),
        },
        _ => Err(syn::Error::new_spanned(
            attr,
            "expected a string value: #[env = \"NAME\"] or #[env = \"NAME,DEFAULT\"]",
        )),
    }
}
