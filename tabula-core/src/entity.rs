use crate::{ColumnDef, ColumnMapping, Result, RowLabeled, to_mapping};
use std::any;

/// Column name of the identity (primary key) of every entity.
pub const IDENTITY_COLUMN: &str = "id";

/// A record type that can be persisted by a [`Record`](crate::Record).
///
/// Usually implemented with `#[derive(Entity)]`: the identity field is marked
/// `#[tabula(id)]` and each persistent field `#[tabula(column = "...")]`. Fields
/// without an annotation are transient.
pub trait Entity: Send + Sync + Sized + 'static {
    /// Static column table, one entry per persistent field, identity included.
    fn columns() -> &'static [ColumnDef<Self>];

    /// Destination table: the type name, lower-cased.
    fn table_name() -> String {
        table_name_of::<Self>()
    }

    /// Materialize a value from one result row.
    fn from_row(row: RowLabeled) -> Result<Self>;

    fn identity(&self) -> i64;

    /// A copy of `self` with the identity replaced.
    fn with_identity(&self, identity: i64) -> Self;

    fn to_mapping(&self) -> ColumnMapping {
        to_mapping(self)
    }
}

/// Lower-cased unqualified name of `T`: `app::model::UserProfile<X>` gives `userprofile`.
pub fn table_name_of<T: ?Sized>() -> String {
    let name = any::type_name::<T>();
    let name = name.split('<').next().unwrap_or(name);
    let name = name.rsplit("::").next().unwrap_or(name);
    name.to_lowercase()
}
