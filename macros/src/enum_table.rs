//! EnumTable derive macro implementation
//!
//! Reads the `#[enum_table(...)]` attributes with darling and emits a
//! `tsframe::enum_table::EnumTable` impl holding the ordered variant list,
//! the variant names and the variant values.

use darling::{ast, FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Receiver for the enum that derives `EnumTable`
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(enum_table), supports(enum_unit))]
struct EnumTableReceiver {
    /// The enum identifier
    ident: syn::Ident,
    /// Generics are rejected, but darling needs them to validate the input
    generics: syn::Generics,
    /// Type of the value every variant maps to
    value_type: syn::Type,
    /// The enum data with parsed variants
    data: ast::Data<EnumTableVariantReceiver, ()>,
}

/// Receiver for a single variant
#[derive(Debug, FromVariant)]
#[darling(attributes(enum_table))]
struct EnumTableVariantReceiver {
    ident: syn::Ident,
    /// Literal value of the variant
    value: syn::Lit,
    /// Name override, defaults to the variant identifier
    #[darling(default)]
    name: Option<String>,
}

/// Process the EnumTable derive macro
pub fn process_derive_enum_table(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let receiver = match EnumTableReceiver::from_derive_input(&input) {
        Ok(receiver) => receiver,
        Err(err) => return err.write_errors().into(),
    };

    if !receiver.generics.params.is_empty() {
        return syn::Error::new_spanned(
            &receiver.generics,
            "EnumTable cannot be derived for generic enums",
        )
        .to_compile_error()
        .into();
    }

    let ast::Data::Enum(variants) = &receiver.data else {
        unreachable!("Darling ensures this is an enum")
    };

    TokenStream::from(generate_enum_table_impl(
        &receiver.ident,
        &receiver.value_type,
        variants,
    ))
}

fn generate_enum_table_impl(
    enum_name: &syn::Ident,
    value_type: &syn::Type,
    variants: &[EnumTableVariantReceiver],
) -> proc_macro2::TokenStream {
    let idents: Vec<_> = variants.iter().map(|v| &v.ident).collect();

    let name_arms = variants.iter().map(|v| {
        let ident = &v.ident;
        let name = v.name.clone().unwrap_or_else(|| ident.to_string());
        quote! { Self::#ident => #name }
    });

    let value_arms = variants.iter().map(|v| {
        let ident = &v.ident;
        let value = &v.value;
        quote! { Self::#ident => #value }
    });

    quote! {
        impl ::tsframe::enum_table::EnumTable for #enum_name {
            type Value = #value_type;

            const VARIANTS: &'static [Self] = &[#(Self::#idents),*];

            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }

            fn value(&self) -> Self::Value {
                match self {
                    #(#value_arms),*
                }
            }
        }
    }
}
