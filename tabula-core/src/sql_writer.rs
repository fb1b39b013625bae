use crate::{
    AsValue, ColumnMapping, CrudError, Error, IDENTITY_COLUMN, Result, Statement, Value,
    separated_by,
};

/// Renders the CRUD statements for one SQL dialect.
///
/// Every default method writes ANSI-ish SQL with positional `?` placeholders.
/// Placeholders are only ever emitted by [`SqlWriter::write_placeholder`], which
/// pushes the matching parameter at the same time, and column lists are only ever
/// walked through [`ColumnMapping::sorted_entries`]. Drivers override the small
/// hooks (`write_identifier`, `write_placeholder`) rather than whole statements.
pub trait SqlWriter: Send + Sync {
    fn write_identifier(&self, out: &mut String, value: &str) {
        out.push_str(value);
    }

    fn write_placeholder(&self, out: &mut Statement, value: Value) {
        out.sql.push('?');
        out.params.push(value);
    }

    fn write_select_by_id(&self, out: &mut Statement, table: &str, id: i64) {
        out.sql.push_str("SELECT * FROM ");
        self.write_identifier(&mut out.sql, table);
        out.sql.push_str(" WHERE ");
        self.write_identifier(&mut out.sql, IDENTITY_COLUMN);
        out.sql.push_str(" = ");
        self.write_placeholder(out, id.as_value());
        out.sql.push_str(" LIMIT 1");
    }

    fn write_where(&self, out: &mut Statement, filter: &ColumnMapping) -> Result<()> {
        if filter.is_empty() {
            return Err(Error::new(CrudError::malformed(
                "the WHERE clause needs at least one column",
            )));
        }
        out.sql.push_str(" WHERE ");
        separated_by(
            out,
            filter.sorted_entries(),
            |out, (name, value)| {
                self.write_identifier(&mut out.sql, name);
                out.sql.push_str(" = ");
                self.write_placeholder(out, value.clone());
            },
            " AND ",
        );
        Ok(())
    }

    fn write_select_where(
        &self,
        out: &mut Statement,
        table: &str,
        filter: &ColumnMapping,
    ) -> Result<()> {
        out.sql.push_str("SELECT * FROM ");
        self.write_identifier(&mut out.sql, table);
        self.write_where(out, filter)?;
        out.sql.push_str(" LIMIT 1");
        Ok(())
    }

    fn write_count_where(
        &self,
        out: &mut Statement,
        table: &str,
        filter: &ColumnMapping,
    ) -> Result<()> {
        out.sql.push_str("SELECT COUNT(*) FROM ");
        self.write_identifier(&mut out.sql, table);
        self.write_where(out, filter)
    }

    /// Expects `mapping` to be already stripped of the identity column.
    fn write_insert(&self, out: &mut Statement, table: &str, mapping: &ColumnMapping) -> Result<()> {
        if mapping.is_empty() {
            return Err(Error::new(CrudError::malformed(format!(
                "cannot insert into `{table}` without any column"
            ))));
        }
        let entries = mapping.sorted_entries();
        out.sql.push_str("INSERT INTO ");
        self.write_identifier(&mut out.sql, table);
        out.sql.push_str(" (");
        separated_by(
            out,
            entries.iter(),
            |out, (name, ..)| self.write_identifier(&mut out.sql, name),
            ",",
        );
        out.sql.push_str(") VALUES (");
        separated_by(
            out,
            entries.iter(),
            |out, (.., value)| self.write_placeholder(out, (*value).clone()),
            ",",
        );
        out.sql.push(')');
        Ok(())
    }

    /// Expects `mapping` to be already stripped of the identity column.
    fn write_update_by_id(
        &self,
        out: &mut Statement,
        table: &str,
        mapping: &ColumnMapping,
        id: i64,
    ) -> Result<()> {
        if mapping.is_empty() {
            return Err(Error::new(CrudError::malformed(format!(
                "cannot update `{table}` without any column"
            ))));
        }
        out.sql.push_str("UPDATE ");
        self.write_identifier(&mut out.sql, table);
        out.sql.push_str(" SET ");
        separated_by(
            out,
            mapping.sorted_entries(),
            |out, (name, value)| {
                self.write_identifier(&mut out.sql, name);
                out.sql.push('=');
                self.write_placeholder(out, value.clone());
            },
            ", ",
        );
        out.sql.push_str(" WHERE ");
        self.write_identifier(&mut out.sql, IDENTITY_COLUMN);
        out.sql.push_str(" = ");
        self.write_placeholder(out, id.as_value());
        Ok(())
    }

    fn write_delete_by_id(&self, out: &mut Statement, table: &str, id: i64) {
        out.sql.push_str("DELETE FROM ");
        self.write_identifier(&mut out.sql, table);
        out.sql.push_str(" WHERE ");
        self.write_identifier(&mut out.sql, IDENTITY_COLUMN);
        out.sql.push_str(" = ");
        self.write_placeholder(out, id.as_value());
    }
}

/// Writer producing the plain dialect, with identifiers written verbatim.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;

impl SqlWriter for GenericSqlWriter {}
