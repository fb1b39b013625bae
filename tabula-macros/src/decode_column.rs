use syn::{Error, Field, Ident, LitStr, Result, Type, spanned::Spanned};

pub(crate) struct ColumnMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    pub(crate) name: String,
    pub(crate) identity: bool,
}

/// Column backing `field`, `None` when the field carries no `tabula` attribute.
pub(crate) fn decode_column(field: &Field) -> Result<Option<ColumnMetadata>> {
    let Some(ident) = field.ident.clone() else {
        return Err(Error::new(field.span(), "Entity fields must be named"));
    };
    let mut name: Option<LitStr> = None;
    let mut identity = false;
    let mut annotated = false;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("tabula")) {
        annotated = true;
        attr.parse_nested_meta(|arg| {
            if arg.path.is_ident("id") {
                if identity {
                    return Err(arg.error("`id` is repeated"));
                }
                identity = true;
                Ok(())
            } else if arg.path.is_ident("column") {
                if name.is_some() {
                    return Err(arg.error("`column` is repeated"));
                }
                let value: LitStr = arg.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(Error::new(value.span(), "Column name cannot be empty"));
                }
                name = Some(value);
                Ok(())
            } else {
                Err(arg.error(
                    "Unknown attribute, use it like: `#[tabula(id)]` or `#[tabula(column = \"name\")]`",
                ))
            }
        })?;
    }
    if !annotated {
        return Ok(None);
    }
    let name = match (identity, name) {
        (true, Some(name)) if name.value() != tabula_identity() => {
            return Err(Error::new(
                name.span(),
                format!("The identity is always stored in column `{}`", tabula_identity()),
            ));
        }
        (true, _) => tabula_identity().to_string(),
        (false, Some(name)) if name.value() == tabula_identity() => {
            return Err(Error::new(
                name.span(),
                format!(
                    "Column `{}` is reserved for the field marked `#[tabula(id)]`",
                    tabula_identity()
                ),
            ));
        }
        (false, Some(name)) => name.value(),
        (false, None) => {
            return Err(Error::new(
                field.span(),
                "Missing column name, use it like: `#[tabula(column = \"name\")]`",
            ));
        }
    };
    if identity && !is_i64(&field.ty) {
        return Err(Error::new(field.ty.span(), "The identity field must be an `i64`"));
    }
    Ok(Some(ColumnMetadata {
        ident,
        ty: field.ty.clone(),
        name,
        identity,
    }))
}

fn tabula_identity() -> &'static str {
    "id"
}

fn is_i64(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    path.qself.is_none()
        && path
            .path
            .segments
            .last()
            .is_some_and(|v| v.ident == "i64" && v.arguments.is_none())
}
