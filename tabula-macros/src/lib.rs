mod decode_column;
mod decode_table;
mod from_row_trait;

use decode_table::{TableMetadata, decode_table};
use from_row_trait::from_row_trait;
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{ItemStruct, parse_macro_input};

/// Implements `tabula::Entity` for a struct with named fields.
///
/// * `#[tabula(id)]` marks the identity field: exactly one, of type `i64`, stored in column `id`.
/// * `#[tabula(column = "name")]` maps a field to a column.
/// * Fields without the attribute are transient: never written, `Default::default()` when read.
///
/// The struct must also implement `Clone`.
#[proc_macro_derive(Entity, attributes(tabula))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as ItemStruct);
    match decode_table(&item) {
        Ok(table) => encode_entity(&table).into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn encode_entity(table: &TableMetadata) -> proc_macro2::TokenStream {
    let name = &table.item.ident;
    let table_name = &table.name;
    let count = table.columns.len();
    let readers = table.columns.iter().map(|c| {
        let reader = format_ident!("__column_{}", c.ident);
        let field = &c.ident;
        quote! {
            fn #reader(entity: &#name) -> ::tabula::Value {
                ::tabula::AsValue::as_value(::std::clone::Clone::clone(&entity.#field))
            }
        }
    });
    let defs = table.columns.iter().map(|c| {
        let reader = format_ident!("__column_{}", c.ident);
        let column = &c.name;
        let field = c.ident.to_string();
        let identity = c.identity;
        quote! {
            ::tabula::ColumnDef {
                name: #column,
                field: #field,
                identity: #identity,
                value: #reader,
            }
        }
    });
    let identity = &table.identity().ident;
    let from_row = from_row_trait(table);
    quote! {
        impl ::tabula::Entity for #name {
            fn columns() -> &'static [::tabula::ColumnDef<Self>] {
                #(#readers)*
                static COLUMNS: [::tabula::ColumnDef<#name>; #count] = [#(#defs),*];
                &COLUMNS
            }

            fn table_name() -> ::std::string::String {
                #table_name.into()
            }

            #from_row

            fn identity(&self) -> i64 {
                self.#identity
            }

            fn with_identity(&self, identity: i64) -> Self {
                let mut result = ::std::clone::Clone::clone(self);
                result.#identity = identity;
                result
            }
        }
    }
}
