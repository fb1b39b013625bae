use crate::decode_column::{ColumnMetadata, decode_column};
use std::collections::HashMap;
use syn::{Error, Fields, Ident, ItemStruct, Result, spanned::Spanned};

pub(crate) struct TableMetadata {
    pub(crate) item: ItemStruct,
    pub(crate) name: String,
    pub(crate) columns: Vec<ColumnMetadata>,
    pub(crate) transient: Vec<Ident>,
    identity: usize,
}

impl TableMetadata {
    pub(crate) fn identity(&self) -> &ColumnMetadata {
        &self.columns[self.identity]
    }
}

pub(crate) fn decode_table(item: &ItemStruct) -> Result<TableMetadata> {
    if !item.generics.params.is_empty() {
        return Err(Error::new(
            item.generics.span(),
            "Entity cannot be derived for generic structs",
        ));
    }
    let Fields::Named(fields) = &item.fields else {
        return Err(Error::new(
            item.ident.span(),
            "Entity can only be derived for structs with named fields",
        ));
    };
    let mut columns = Vec::new();
    let mut transient = Vec::new();
    let mut names: HashMap<String, Ident> = HashMap::new();
    for field in &fields.named {
        let Some(column) = decode_column(field)? else {
            if let Some(ident) = &field.ident {
                transient.push(ident.clone());
            }
            continue;
        };
        if let Some(previous) = names.insert(column.name.clone(), column.ident.clone()) {
            return Err(Error::new(
                field.span(),
                format!(
                    "Column `{}` is already mapped by field `{}`",
                    column.name, previous
                ),
            ));
        }
        columns.push(column);
    }
    let mut identities = columns.iter().enumerate().filter(|(_, c)| c.identity);
    let Some((identity, _)) = identities.next() else {
        return Err(Error::new(
            item.ident.span(),
            "Missing identity, mark the `i64` identity field with `#[tabula(id)]`",
        ));
    };
    if let Some((_, other)) = identities.next() {
        return Err(Error::new(
            other.ident.span(),
            "Only one field can be marked `#[tabula(id)]`",
        ));
    }
    Ok(TableMetadata {
        item: item.clone(),
        name: item.ident.to_string().to_lowercase(),
        columns,
        transient,
        identity,
    })
}
