use crate::{crud_error, run_script, silent_logs};
use indoc::indoc;
use std::sync::LazyLock;
use tabula::{CrudError, Entity, Executor, Record, mapping};
use tokio::sync::Mutex;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

#[derive(Entity, Debug, Clone, PartialEq, Default)]
pub struct Customer {
    #[tabula(id)]
    pub id: i64,
    #[tabula(column = "name")]
    pub name: String,
    #[tabula(column = "city")]
    pub city: String,
    #[tabula(column = "age")]
    pub age: u8,
}

pub async fn filters<E: Executor>(executor: &mut E) {
    let _lock = MUTEX.lock().await;

    // Setup
    run_script(
        executor,
        indoc! {"
            DROP TABLE IF EXISTS customer;
            CREATE TABLE customer (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                city TEXT NOT NULL,
                age INTEGER NOT NULL
            );
        "},
    )
    .await;
    let customers = [
        ("Ann", "Turin", 30),
        ("Ann", "Milan", 41),
        ("Bob", "Turin", 30),
        ("O'Hara", "Dublin", 52),
    ];
    let mut ids = Vec::new();
    for (name, city, age) in customers {
        let mut record = Record::new(Customer {
            id: 0,
            name: name.into(),
            city: city.into(),
            age,
        });
        record
            .save(executor)
            .await
            .expect("Could not save the customer");
        ids.push(record.identity());
    }
    assert!(ids.windows(2).all(|v| v[0] < v[1]));

    // Select where
    let mut record = Record::new(Customer::default());
    record
        .select_where(executor, &mapping! { "name" => "Ann", "city" => "Milan" })
        .await
        .expect("Could not select Ann from Milan");
    assert_eq!(
        *record.entity(),
        Customer {
            id: ids[1],
            name: "Ann".into(),
            city: "Milan".into(),
            age: 41,
        }
    );
    record
        .select_where(executor, &mapping! { "age" => 30u8, "city" => "Turin", "name" => "Bob" })
        .await
        .expect("Could not select Bob");
    assert_eq!(record.identity(), ids[2]);
    record
        .select_where(executor, &mapping! { "name" => "O'Hara" })
        .await
        .expect("Quotes in values are bound, not inlined");
    assert_eq!(record.entity().city, "Dublin");
    record
        .select_where(executor, &mapping! { "id" => ids[0] })
        .await
        .expect("Could not select by id");
    assert_eq!(record.entity().city, "Turin");
    assert_eq!(record.entity().name, "Ann");

    // No match
    let error = record
        .select_where(executor, &mapping! { "name" => "Zed" })
        .await
        .expect_err("There is no Zed");
    assert_eq!(
        crud_error(&error),
        CrudError::NotFound {
            table: "customer".into(),
            filter: "{name: 'Zed'}".into(),
        }
    );
    assert_eq!(record.identity(), ids[0]);

    // Empty filter
    let error = record
        .select_where(executor, &mapping!())
        .await
        .expect_err("Filter is empty");
    assert!(matches!(crud_error(&error), CrudError::MalformedQuery(..)));

    // Exists
    assert!(record.exists(executor, &mapping! { "name" => "Bob" }).await);
    assert!(
        record
            .exists(executor, &mapping! { "name" => "Ann", "age" => 41u8 })
            .await
    );
    assert!(!record.exists(executor, &mapping! { "name" => "Zed" }).await);
    assert!(
        !record
            .exists(executor, &mapping! { "name" => "Bob", "city" => "Milan" })
            .await
    );
    assert_eq!(
        record
            .try_exists(executor, &mapping! { "city" => "Turin" })
            .await
            .expect("Could not count the customers"),
        true
    );
    silent_logs! {
        assert!(!record.exists(executor, &mapping!()).await);
        assert!(!record.exists(executor, &mapping! { "missing_column" => 1 }).await);
        let error = record
            .try_exists(executor, &mapping! { "missing_column" => 1 })
            .await
            .expect_err("The column does not exist");
        assert!(matches!(crud_error(&error), CrudError::Execution { .. }));
    }
}
