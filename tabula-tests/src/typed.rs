use crate::run_script;
use indoc::indoc;
use rust_decimal::Decimal;
use std::sync::LazyLock;
use tabula::{Entity, Executor, Record, mapping};
use time::{
    Date, PrimitiveDateTime, Time,
    macros::{date, datetime, time},
};
use tokio::sync::Mutex;
use uuid::Uuid;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

#[derive(Entity, Debug, Clone, PartialEq)]
pub struct Product {
    #[tabula(id)]
    pub id: i64,
    #[tabula(column = "code")]
    pub code: Uuid,
    #[tabula(column = "label")]
    pub label: String,
    #[tabula(column = "price")]
    pub price: Decimal,
    #[tabula(column = "discount")]
    pub discount: Option<f64>,
    #[tabula(column = "stock")]
    pub stock: u32,
    #[tabula(column = "available")]
    pub available: bool,
    #[tabula(column = "added_at")]
    pub added_at: PrimitiveDateTime,
    #[tabula(column = "release_date")]
    pub release_date: Option<Date>,
    #[tabula(column = "opening")]
    pub opening: Time,
    #[tabula(column = "thumbnail")]
    pub thumbnail: Option<Vec<u8>>,
}

pub async fn typed<E: Executor>(executor: &mut E) {
    let _lock = MUTEX.lock().await;

    // Setup
    run_script(
        executor,
        indoc! {"
            DROP TABLE IF EXISTS product;
            CREATE TABLE product (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL,
                label TEXT NOT NULL,
                price TEXT NOT NULL,
                discount REAL,
                stock INTEGER NOT NULL,
                available INTEGER NOT NULL,
                added_at TEXT NOT NULL,
                release_date TEXT,
                opening TEXT NOT NULL,
                thumbnail BLOB
            );
        "},
    )
    .await;

    let products = [
        Product {
            id: 0,
            code: Uuid::new_v4(),
            label: "Espresso machine".into(),
            price: Decimal::new(19925, 2),
            discount: Some(0.15),
            stock: 4,
            available: true,
            added_at: datetime!(2025-07-15 10:00:00),
            release_date: Some(date!(2024 - 11 - 02)),
            opening: time!(9:30),
            thumbnail: Some(vec![0x89, 0x50, 0x4e, 0x47, 0x00, 0xff]),
        },
        Product {
            id: 0,
            code: Uuid::new_v4(),
            label: "Grinder".into(),
            price: Decimal::new(7550, 2),
            discount: None,
            stock: 0,
            available: false,
            added_at: datetime!(2025-01-01 23:59:59.5),
            release_date: None,
            opening: time!(18:45:10),
            thumbnail: None,
        },
    ];
    for product in products {
        let mut record = Record::new(product.clone());
        record.save(executor).await.expect("Could not save");
        let id = record.identity();
        let mut loaded = Record::new(product.clone());
        loaded
            .select(executor, id)
            .await
            .expect("Could not select the product");
        assert_eq!(*loaded.entity(), product.with_identity(id));

        let mut found = Record::new(product.clone());
        found
            .select_where(executor, &mapping! { "code" => product.code })
            .await
            .expect("Could not select the product by code");
        assert_eq!(found.identity(), id);
        assert!(
            found
                .exists(
                    executor,
                    &mapping! {
                        "added_at" => product.added_at,
                        "available" => product.available,
                    }
                )
                .await
        );
    }

    // Decimals beyond double precision
    let precise = Product {
        id: 0,
        code: Uuid::new_v4(),
        label: "Vault".into(),
        price: Decimal::new(1_234_567_890_123_456_789, 2),
        discount: None,
        stock: 1,
        available: true,
        added_at: datetime!(2025-05-05 12:00),
        release_date: None,
        opening: time!(0:00),
        thumbnail: None,
    };
    let mut record = Record::new(precise.clone());
    record.save(executor).await.expect("Could not save");
    let mut loaded = Record::new(precise.clone());
    loaded
        .select(executor, record.identity())
        .await
        .expect("Could not select the product");
    assert_eq!(loaded.entity().price.to_string(), "12345678901234567.89");
    assert_eq!(*loaded.entity(), precise.with_identity(record.identity()));
    let mut found = Record::new(precise.clone());
    found
        .select_where(executor, &mapping! { "price" => precise.price })
        .await
        .expect("Could not select the product by price");
    assert_eq!(found.identity(), record.identity());

    // Nullable columns
    let mut record = Record::new(Product {
        id: 0,
        code: Uuid::nil(),
        label: "Cups".into(),
        price: Decimal::new(3, 0),
        discount: None,
        stock: 120,
        available: true,
        added_at: datetime!(2025-02-02 8:00),
        release_date: None,
        opening: time!(8:00),
        thumbnail: None,
    });
    record.save(executor).await.expect("Could not save");
    let mut changed = record.entity().clone();
    changed.discount = Some(0.5);
    changed.release_date = Some(date!(2025 - 03 - 01));
    changed.thumbnail = Some(vec![1, 2, 3]);
    record
        .update(executor, changed.clone())
        .await
        .expect("Could not update");
    let mut loaded = Record::new(changed.clone());
    loaded
        .select(executor, record.identity())
        .await
        .expect("Could not select");
    assert_eq!(*loaded.entity(), changed);
    assert!(
        loaded
            .exists(executor, &mapping! { "code" => Uuid::nil(), "stock" => 120u32 })
            .await
    );
}
