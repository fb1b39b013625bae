mod common;

#[cfg(test)]
mod tests {
    use crate::common::{ScriptedConnection, User, affected, count_row, user, user_row};
    use tabula_core::{
        CrudError, Entity, Error, QueryResult, Record, RecordState, RowLabeled, Value, mapping,
    };

    fn crud_error(error: &Error) -> CrudError {
        CrudError::of(error)
            .cloned()
            .unwrap_or_else(|| panic!("Unclassified error: {:#}", error))
    }

    #[tokio::test]
    async fn save_adopts_identity() {
        let mut connection = ScriptedConnection::new();
        connection.respond([affected(1, Some(7))]);
        let mut record = Record::new(user("Ann", 30));
        assert_eq!(record.state(), RecordState::Unbound);
        assert_eq!(record.table(), "user");
        record.save(&mut connection).await.expect("Save succeeds");
        assert_eq!(record.identity(), 7);
        assert_eq!(record.state(), RecordState::Bound);
        assert_eq!(
            connection.sql(),
            ["INSERT INTO user (age,name) VALUES (?,?)"]
        );
        assert_eq!(
            connection.executed[0].params,
            [Value::Int32(Some(30)), Value::Varchar(Some("Ann".into()))]
        );
        assert_eq!(connection.pings, 1);
    }

    #[tokio::test]
    async fn save_without_generated_identity() {
        let mut connection = ScriptedConnection::new();
        connection.respond([affected(1, None)]);
        let mut record = Record::new(user("Ann", 30));
        let error = record.save(&mut connection).await.unwrap_err();
        assert!(matches!(crud_error(&error), CrudError::Execution { .. }));
        assert_eq!(record.identity(), 0);
        assert_eq!(record.state(), RecordState::Unbound);
    }

    #[tokio::test]
    async fn select_by_id() {
        let mut connection = ScriptedConnection::new();
        connection.respond([user_row(7, "Ann", 30)]);
        let mut record = Record::new(User {
            session: Some("kept?".into()),
            ..Default::default()
        });
        record.select(&mut connection, 7).await.expect("Row exists");
        assert_eq!(
            *record.entity(),
            User {
                id: 7,
                name: "Ann".into(),
                age: 30,
                session: None,
            }
        );
        assert_eq!(record.state(), RecordState::Bound);
        assert_eq!(connection.sql(), ["SELECT * FROM user WHERE id = ? LIMIT 1"]);
        assert_eq!(connection.executed[0].params, [Value::Int64(Some(7))]);
    }

    #[tokio::test]
    async fn select_missing() {
        let mut connection = ScriptedConnection::new();
        connection.respond([]);
        let mut record = Record::new(user("Ann", 30));
        let error = record.select(&mut connection, 9).await.unwrap_err();
        assert_eq!(
            crud_error(&error),
            CrudError::NotFound {
                table: "user".into(),
                filter: "{id: 9}".into(),
            }
        );
        assert_eq!(*record.entity(), user("Ann", 30));
        assert_eq!(record.state(), RecordState::Unbound);
    }

    #[tokio::test]
    async fn select_where() {
        let mut connection = ScriptedConnection::new();
        connection.respond([user_row(3, "Ann", 30), user_row(4, "Ann", 30)]);
        let mut record = Record::new(User::default());
        let filter = mapping! { "name" => "Ann", "age" => 30 };
        record
            .select_where(&mut connection, &filter)
            .await
            .expect("Row exists");
        assert_eq!(record.identity(), 3);
        assert_eq!(
            connection.sql(),
            ["SELECT * FROM user WHERE age = ? AND name = ? LIMIT 1"]
        );

        connection.respond([]);
        let error = record
            .select_where(&mut connection, &mapping! { "name" => "Zed" })
            .await
            .unwrap_err();
        assert_eq!(
            crud_error(&error),
            CrudError::NotFound {
                table: "user".into(),
                filter: "{name: 'Zed'}".into(),
            }
        );
        assert_eq!(record.identity(), 3);
    }

    #[tokio::test]
    async fn select_where_empty_filter() {
        let mut connection = ScriptedConnection::new();
        let mut record = Record::new(User::default());
        let error = record
            .select_where(&mut connection, &mapping!())
            .await
            .unwrap_err();
        assert!(matches!(crud_error(&error), CrudError::MalformedQuery(..)));
        assert!(connection.executed.is_empty());
    }

    #[tokio::test]
    async fn select_wrong_row_shape() {
        let mut connection = ScriptedConnection::new();
        connection.respond([QueryResult::Row(RowLabeled::new(
            ["id".to_string(), "name".to_string()].into(),
            [Value::Int64(Some(7)), Value::Int64(Some(1))].into(),
        ))]);
        let mut record = Record::new(user("Bob", 1));
        let error = record.select(&mut connection, 7).await.unwrap_err();
        assert_eq!(
            crud_error(&error),
            CrudError::Mapping {
                table: "user".into()
            }
        );
        assert_eq!(*record.entity(), user("Bob", 1));
    }

    #[tokio::test]
    async fn exists() {
        let mut connection = ScriptedConnection::new();
        let record = Record::new(User::default());
        let filter = mapping! { "name" => "Ann", "age" => 30 };
        connection.respond([count_row(2)]);
        assert!(record.exists(&mut connection, &filter).await);
        connection.respond([count_row(0)]);
        assert!(!record.exists(&mut connection, &filter).await);
        assert_eq!(
            connection.sql(),
            [
                "SELECT COUNT(*) FROM user WHERE age = ? AND name = ?",
                "SELECT COUNT(*) FROM user WHERE age = ? AND name = ?",
            ]
        );
        assert!(!record.exists(&mut connection, &mapping!()).await);
        assert_eq!(connection.executed.len(), 2);
        connection.fail("disk I/O error");
        assert!(!record.exists(&mut connection, &filter).await);
        connection.fail("disk I/O error");
        let error = record.try_exists(&mut connection, &filter).await.unwrap_err();
        assert!(matches!(crud_error(&error), CrudError::Execution { .. }));
    }

    #[tokio::test]
    async fn exists_on_closed_connection() {
        let mut connection = ScriptedConnection::new();
        connection.open = false;
        let record = Record::new(User::default());
        let filter = mapping! { "name" => "Ann" };
        assert!(!record.exists(&mut connection, &filter).await);
        let error = record.try_exists(&mut connection, &filter).await.unwrap_err();
        assert_eq!(crud_error(&error), CrudError::ConnectionUnavailable);
        assert!(connection.executed.is_empty());
        assert_eq!(connection.pings, 0);
    }

    #[tokio::test]
    async fn connection_not_answering() {
        let mut connection = ScriptedConnection::new();
        connection.ping_fails = true;
        let mut record = Record::new(user("Ann", 30));
        let error = record.save(&mut connection).await.unwrap_err();
        assert_eq!(crud_error(&error), CrudError::ConnectionUnavailable);
        assert!(connection.executed.is_empty());
        assert_eq!(record.state(), RecordState::Unbound);
    }

    #[tokio::test]
    async fn update_keeps_identity() {
        let mut connection = ScriptedConnection::new();
        connection.respond([affected(1, None)]);
        let mut record = Record::new(user("Ann", 30));
        record.set_identity(5);
        let mut changed = user("Bob", 41);
        changed.id = 99;
        record
            .update(&mut connection, changed)
            .await
            .expect("Row exists");
        assert_eq!(record.identity(), 5);
        assert_eq!(record.entity().name, "Bob");
        assert_eq!(record.entity().age, 41);
        assert_eq!(connection.sql(), ["UPDATE user SET age=?, name=? WHERE id = ?"]);
        assert_eq!(
            connection.executed[0].params,
            [
                Value::Int32(Some(41)),
                Value::Varchar(Some("Bob".into())),
                Value::Int64(Some(5)),
            ]
        );
    }

    #[tokio::test]
    async fn update_missing_row() {
        let mut connection = ScriptedConnection::new();
        connection.respond([affected(0, None)]);
        let mut record = Record::new(user("Ann", 30));
        record.set_identity(5);
        let error = record
            .update(&mut connection, user("Bob", 41))
            .await
            .unwrap_err();
        assert_eq!(
            crud_error(&error),
            CrudError::NotFound {
                table: "user".into(),
                filter: "{id: 5}".into(),
            }
        );
        assert_eq!(record.entity().name, "Ann");
    }

    #[tokio::test]
    async fn update_failing_statement() {
        let mut connection = ScriptedConnection::new();
        connection.fail("constraint failed");
        let mut record = Record::new(user("Ann", 30));
        record.set_identity(5);
        let error = record
            .update(&mut connection, user("Bob", 41))
            .await
            .unwrap_err();
        assert_eq!(
            crud_error(&error),
            CrudError::Execution {
                table: "user".into()
            }
        );
        assert!(format!("{:#}", error).contains("constraint failed"));
        assert_eq!(*record.entity(), user("Ann", 30).with_identity(5));
    }

    #[tokio::test]
    async fn delete() {
        let mut connection = ScriptedConnection::new();
        connection.respond([affected(1, None)]);
        let mut record = Record::new(user("Ann", 30));
        record.set_identity(5);
        record.delete(&mut connection).await.expect("Row exists");
        assert_eq!(record.state(), RecordState::Deleted);
        assert_eq!(connection.sql(), ["DELETE FROM user WHERE id = ?"]);
        assert_eq!(connection.executed[0].params, [Value::Int64(Some(5))]);

        let error = record.select(&mut connection, 5).await.unwrap_err();
        assert_eq!(
            crud_error(&error),
            CrudError::Deleted {
                table: "user".into()
            }
        );
        let error = record.delete(&mut connection).await.unwrap_err();
        assert!(matches!(crud_error(&error), CrudError::Deleted { .. }));
        assert!(!record.exists(&mut connection, &mapping! { "id" => 5i64 }).await);
        assert_eq!(connection.executed.len(), 1);
    }

    #[tokio::test]
    async fn delete_missing_row() {
        let mut connection = ScriptedConnection::new();
        connection.respond([affected(0, None)]);
        let mut record = Record::new(user("Ann", 30));
        record.set_identity(5);
        let error = record.delete(&mut connection).await.unwrap_err();
        assert!(matches!(crud_error(&error), CrudError::NotFound { .. }));
        assert_eq!(record.state(), RecordState::Unbound);
    }

    #[tokio::test]
    async fn negative_identity() {
        let mut connection = ScriptedConnection::new();
        let mut record = Record::new(user("Ann", 30));
        record.set_identity(-1);
        let error = record.delete(&mut connection).await.unwrap_err();
        assert!(matches!(crud_error(&error), CrudError::MalformedQuery(..)));
        let error = record
            .update(&mut connection, user("Bob", 41))
            .await
            .unwrap_err();
        assert!(matches!(crud_error(&error), CrudError::MalformedQuery(..)));
        assert!(connection.executed.is_empty());
        assert_eq!(record.entity().name, "Ann");
    }
}
