use crate::Value;
use std::fmt::{self, Debug};

/// One entry of an entity's static column table.
///
/// Generated by `#[derive(Entity)]` for every annotated field. Fields without an
/// annotation have no `ColumnDef` and are never persisted.
pub struct ColumnDef<E: ?Sized> {
    /// Column name in the table.
    pub name: &'static str,
    /// Name of the struct field backing the column.
    pub field: &'static str,
    /// The identity column, always named `id`.
    pub identity: bool,
    /// Reads the current field value.
    pub value: fn(&E) -> Value,
}

impl<E: ?Sized> ColumnDef<E> {
    pub fn name(&self) -> &'static str {
        self.name
    }
    pub fn read(&self, entity: &E) -> Value {
        (self.value)(entity)
    }
}

impl<E: ?Sized> Debug for ColumnDef<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("name", &self.name)
            .field("field", &self.field)
            .field("identity", &self.identity)
            .finish()
    }
}
