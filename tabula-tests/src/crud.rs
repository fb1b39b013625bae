use crate::{crud_error, run_script};
use indoc::indoc;
use std::sync::LazyLock;
use tabula::{CrudError, Entity, Executor, Record, RecordState, mapping};
use tokio::sync::Mutex;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

#[derive(Entity, Debug, Clone, PartialEq)]
pub struct User {
    #[tabula(id)]
    pub id: i64,
    #[tabula(column = "name")]
    pub name: String,
    #[tabula(column = "age")]
    pub age: i32,
    pub session: Option<String>,
}

/// Table and columns named after SQL keywords.
#[derive(Entity, Debug, Clone, PartialEq)]
pub struct Order {
    #[tabula(id)]
    pub id: i64,
    #[tabula(column = "group")]
    pub group: String,
    #[tabula(column = "select")]
    pub select: i64,
}

pub async fn crud<E: Executor>(executor: &mut E) {
    let _lock = MUTEX.lock().await;

    // Setup
    run_script(
        executor,
        indoc! {"
            DROP TABLE IF EXISTS user;
            CREATE TABLE user (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                age INTEGER NOT NULL
            );
        "},
    )
    .await;

    // Save
    let mut record = Record::new(User {
        id: 0,
        name: "Ann".into(),
        age: 30,
        session: Some("a1b2".into()),
    });
    assert_eq!(record.table(), "user");
    let result = record.save(executor).await;
    assert!(result.is_ok(), "Failed to save: {:?}", result.unwrap_err());
    let id = record.identity();
    assert!(id > 0);
    assert_eq!(record.state(), RecordState::Bound);
    assert_eq!(record.entity().name, "Ann");
    assert_eq!(record.entity().session.as_deref(), Some("a1b2"));

    // Select
    let mut loaded = Record::new(User {
        id: 0,
        name: String::new(),
        age: 0,
        session: None,
    });
    loaded
        .select(executor, id)
        .await
        .expect("Could not select the saved user");
    let expected = User {
        id,
        name: "Ann".into(),
        age: 30,
        session: None,
    };
    assert_eq!(*loaded.entity(), expected);
    assert_eq!(loaded.state(), RecordState::Bound);
    loaded
        .select(executor, id)
        .await
        .expect("Could not select the saved user twice");
    assert_eq!(*loaded.entity(), expected);

    // Update
    let result = record
        .update(
            executor,
            User {
                id: 999_999,
                name: "Ann Marie".into(),
                age: 31,
                session: None,
            },
        )
        .await;
    assert!(result.is_ok(), "Failed to update: {:?}", result.unwrap_err());
    assert_eq!(record.identity(), id);
    loaded
        .select(executor, id)
        .await
        .expect("Could not select the updated user");
    assert_eq!(loaded.entity().name, "Ann Marie");
    assert_eq!(loaded.entity().age, 31);
    assert_eq!(loaded.identity(), id);
    let error = Record::new(expected.clone())
        .select(executor, 999_999)
        .await
        .expect_err("The update must not touch the identity of the new value");
    assert!(matches!(crud_error(&error), CrudError::NotFound { .. }));

    // Delete
    let result = record.delete(executor).await;
    assert!(result.is_ok(), "Failed to delete: {:?}", result.unwrap_err());
    assert_eq!(record.state(), RecordState::Deleted);
    let error = loaded
        .select(executor, id)
        .await
        .expect_err("The user was deleted");
    assert_eq!(
        crud_error(&error),
        CrudError::NotFound {
            table: "user".into(),
            filter: format!("{{id: {}}}", id),
        }
    );
    assert_eq!(loaded.entity().name, "Ann Marie");

    // Delete something missing
    let mut missing = Record::new(expected.with_identity(123_456));
    let error = missing
        .delete(executor)
        .await
        .expect_err("There is no such user");
    assert!(matches!(crud_error(&error), CrudError::NotFound { .. }));
    assert_eq!(missing.state(), RecordState::Unbound);

    // Keyword names
    run_script(
        executor,
        indoc! {r#"
            DROP TABLE IF EXISTS "order";
            CREATE TABLE "order" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                "group" TEXT NOT NULL,
                "select" INTEGER NOT NULL
            );
        "#},
    )
    .await;
    let mut order = Record::new(Order {
        id: 0,
        group: "retail".into(),
        select: 5,
    });
    assert_eq!(order.table(), "order");
    let result = order.save(executor).await;
    assert!(result.is_ok(), "Failed to save: {:?}", result.unwrap_err());
    let id = order.identity();
    assert!(id > 0);
    let mut loaded = Record::new(order.entity().clone());
    loaded
        .select_where(executor, &mapping! { "group" => "retail", "select" => 5 })
        .await
        .expect("Could not select the order");
    assert_eq!(loaded.identity(), id);
    order
        .update(
            executor,
            Order {
                id: 0,
                group: "wholesale".into(),
                select: 6,
            },
        )
        .await
        .expect("Could not update the order");
    assert!(
        order
            .exists(executor, &mapping! { "group" => "wholesale" })
            .await
    );
    order
        .delete(executor)
        .await
        .expect("Could not delete the order");
    assert!(
        !loaded
            .exists(executor, &mapping! { "group" => "wholesale" })
            .await
    );
}
