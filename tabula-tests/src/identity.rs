use crate::{crud_error, run_script};
use indoc::indoc;
use std::sync::LazyLock;
use tabula::{CrudError, Entity, Executor, Record, RecordState, mapping};
use tokio::sync::Mutex;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

#[derive(Entity, Debug, Clone, PartialEq)]
pub struct Ticket {
    #[tabula(column = "title")]
    pub title: String,
    #[tabula(id)]
    pub number: i64,
    #[tabula(column = "open")]
    pub open: bool,
    pub watchers: Vec<String>,
}

fn ticket(title: &str) -> Ticket {
    Ticket {
        title: title.into(),
        number: 0,
        open: true,
        watchers: vec!["ops".into()],
    }
}

pub async fn identity<E: Executor>(executor: &mut E) {
    let _lock = MUTEX.lock().await;

    // Setup
    run_script(
        executor,
        indoc! {"
            DROP TABLE IF EXISTS ticket;
            CREATE TABLE ticket (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                open INTEGER NOT NULL
            );
        "},
    )
    .await;

    // Identities are assigned by the store
    let mut first = Record::new(ticket("Disk full"));
    first.save(executor).await.expect("Could not save");
    let mut second = Record::new(ticket("Fan noise").with_identity(77));
    second.save(executor).await.expect("Could not save");
    assert!(first.identity() > 0);
    assert!(second.identity() > first.identity());
    assert_ne!(second.identity(), 77);
    assert_eq!(second.entity().watchers, ["ops"]);

    // Update targets the held identity only
    let mut replacement = ticket("Disk full (again)");
    replacement.number = second.identity();
    replacement.open = false;
    first
        .update(executor, replacement)
        .await
        .expect("Could not update");
    assert_eq!(first.entity().title, "Disk full (again)");
    let mut check = Record::new(ticket(""));
    check
        .select(executor, second.identity())
        .await
        .expect("Could not select");
    assert_eq!(check.entity().title, "Fan noise");
    assert!(check.entity().open);
    assert!(check.entity().watchers.is_empty());
    check
        .select(executor, first.identity())
        .await
        .expect("Could not select");
    assert_eq!(check.entity().title, "Disk full (again)");
    assert!(!check.entity().open);

    // Identity never stored
    let mut unsaved = Record::new(ticket("Never saved"));
    let error = unsaved
        .update(executor, ticket("Still never saved"))
        .await
        .expect_err("Identity 0 is not in the table");
    assert!(matches!(crud_error(&error), CrudError::NotFound { .. }));
    assert_eq!(unsaved.entity().title, "Never saved");

    // Negative identity
    let mut negative = Record::new(ticket("Negative"));
    negative.set_identity(-3);
    let error = negative
        .delete(executor)
        .await
        .expect_err("Negative identities are rejected");
    assert!(matches!(crud_error(&error), CrudError::MalformedQuery(..)));
    let error = negative
        .update(executor, ticket("Negative"))
        .await
        .expect_err("Negative identities are rejected");
    assert!(matches!(crud_error(&error), CrudError::MalformedQuery(..)));
    assert!(
        first
            .exists(executor, &mapping! { "title" => "Disk full (again)" })
            .await
    );
    assert!(second.exists(executor, &mapping! { "title" => "Fan noise" }).await);

    // A deleted record refuses every operation
    second.delete(executor).await.expect("Could not delete");
    assert_eq!(second.state(), RecordState::Deleted);
    let error = second.save(executor).await.expect_err("Record is deleted");
    assert!(matches!(crud_error(&error), CrudError::Deleted { .. }));
    let error = second
        .update(executor, ticket("Zombie"))
        .await
        .expect_err("Record is deleted");
    assert!(matches!(crud_error(&error), CrudError::Deleted { .. }));
    let error = second
        .select(executor, first.identity())
        .await
        .expect_err("Record is deleted");
    assert!(matches!(crud_error(&error), CrudError::Deleted { .. }));
    assert!(
        !first
            .exists(executor, &mapping! { "title" => "Fan noise" })
            .await
    );
}
