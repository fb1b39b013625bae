#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use tabula_core::{RowLabeled, RowNames, RowsAffected, Value};

    fn labels(names: &[&str]) -> RowNames {
        names.iter().map(|v| v.to_string()).collect::<Vec<_>>().into()
    }

    #[test]
    fn row_columns() {
        let row = RowLabeled::new(
            labels(&["id", "name"]),
            [Value::Int64(Some(1)), Value::Varchar(Some("Ann".into()))].into(),
        );
        assert_eq!(row.get_column("name"), Some(&Value::Varchar(Some("Ann".into()))));
        assert_eq!(row.get_column("age"), None);
        assert_eq!(
            row.into_columns().collect::<Vec<_>>(),
            [
                ("id".to_string(), Value::Int64(Some(1))),
                ("name".to_string(), Value::Varchar(Some("Ann".into()))),
            ]
        );
    }

    #[test]
    fn row_with_missing_values() {
        let row = RowLabeled::new(labels(&["id", "name", "age"]), [Value::Int64(Some(1))].into());
        assert_eq!(row.get_column("id"), Some(&Value::Int64(Some(1))));
        assert_eq!(row.get_column("age"), None);
        assert_eq!(row.into_columns().count(), 1);
    }

    #[test]
    fn row_with_missing_labels() {
        let row = RowLabeled::new(
            Arc::from([]),
            [Value::Int64(Some(1)), Value::Boolean(Some(true))].into(),
        );
        assert_eq!(row.get_column("id"), None);
        assert_eq!(row.into_columns().count(), 0);
    }

    #[test]
    fn rows_affected_default() {
        let affected = RowsAffected::default();
        assert_eq!(affected.rows_affected, 0);
        assert_eq!(affected.last_affected_id, None);
    }
}
