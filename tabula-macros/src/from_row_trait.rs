use crate::decode_table::TableMetadata;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

/// Body of `Entity::from_row`: every column is required, unknown labels are skipped.
pub(crate) fn from_row_trait(table: &TableMetadata) -> TokenStream {
    let struct_name = &table.item.ident;
    let holder = |c: &crate::decode_column::ColumnMetadata| format_ident!("__{}", c.ident);
    let holders_declarations = table.columns.iter().map(|c| {
        let holder = holder(c);
        let ty = &c.ty;
        quote!(let mut #holder: ::std::option::Option<#ty> = None;)
    });
    let assignments = table.columns.iter().map(|c| {
        let holder = holder(c);
        let ty = &c.ty;
        let name = &c.name;
        quote! {
            #name => {
                #holder = Some(::tabula::Context::with_context(
                    <#ty as ::tabula::AsValue>::try_from_value(__v__),
                    || format!("While decoding column `{}` of `{}`", #name, stringify!(#struct_name)),
                )?);
            }
        }
    });
    let create_result = table.columns.iter().map(|c| {
        let holder = holder(c);
        let ident = &c.ident;
        let name = &c.name;
        quote!(#ident: #holder.ok_or_else(|| __make_error__(#name))?)
    });
    let transient = table
        .transient
        .iter()
        .map(|ident| quote!(#ident: ::std::default::Default::default()));
    quote! {
        fn from_row(row: ::tabula::RowLabeled) -> ::tabula::Result<Self> {
            #(#holders_declarations)*
            let ::tabula::RowLabeled { labels, values } = row;
            for (__n__, __v__) in ::std::iter::zip(labels.iter(), values.into_vec()) {
                match __n__.as_str() {
                    #(#assignments)*
                    _ => {}
                }
            }
            let __make_error__ = |name: &str| {
                ::tabula::Error::msg(format!(
                    "Column `{}` does not exist in the row provided",
                    name
                ))
            };
            Ok(#struct_name {
                #(#create_result,)*
                #(#transient,)*
            })
        }
    }
}
