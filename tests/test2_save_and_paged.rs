#![cfg(feature = "sqlite")]
use dyntable::prelude::*;
use serde_json::json;
use tokio::runtime::Runtime;

fn person(name: &str, age: i64) -> Record {
    let mut record = Record::new();
    record.insert("Name", Value::Text(name.to_string()));
    record.insert("Age", Value::Int(age));
    record
}

#[test]
fn save_dispatches_and_paged_windows() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("test2.db").to_string_lossy().into_owned();

    rt.block_on(async {
        let pool = DbPool::new_sqlite(db_path).await?;
        let users = Table::new(pool, "Users");

        users
            .execute_batch(
                r#"
                CREATE TABLE Users (
                    ID INTEGER PRIMARY KEY AUTOINCREMENT,
                    Name TEXT,
                    Age INT
                );
            "#,
            )
            .await?;

        // 25 records without a key column: all inserts, one transaction.
        let records: Vec<Record> = (1..=25).map(|i| person(&format!("user{i}"), 20 + i)).collect();
        let affected = users.save(records).await?;
        assert_eq!(affected, 25);

        // Page 2 of 10 over 25 rows: totals and the [11, 20] window.
        let page = users
            .paged(PageOptions::default().with_page_size(10).with_page(2))
            .await?;
        assert_eq!(page.total_records, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.items[0].get("ID"), Some(&Value::Int(11)));
        assert_eq!(page.items[9].get("ID"), Some(&Value::Int(20)));

        // The last page is short.
        let page = users
            .paged(PageOptions::default().with_page_size(10).with_page(3))
            .await?;
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].get("ID"), Some(&Value::Int(21)));

        // Filtered paging counts only the filtered set.
        let page = users
            .paged(
                PageOptions::default()
                    .with_where("Age > @0")
                    .with_page_size(10)
                    .with_args(vec![Value::Int(40)]),
            )
            .await?;
        assert_eq!(page.total_records, 5);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.items.len(), 5);

        // Mixed save: a keyed record updates, an unkeyed one inserts.
        let mut keyed = person("renamed", 99);
        keyed.insert("ID", Value::Int(1));
        let affected = users.save(vec![keyed, person("user26", 46)]).await?;
        assert_eq!(affected, 2);

        let row = users.single(Value::Int(1), None).await?.unwrap();
        assert_eq!(row.get("Name"), Some(&Value::Text("renamed".to_string())));
        let count = users.scalar("SELECT COUNT(ID) FROM Users", vec![]).await?;
        assert_eq!(count, Some(Value::Int(26)));

        // Save normalizes the same input shapes as insert/update.
        let affected = users
            .save(vec![
                json!({"ID": 1, "Name": "renamed again", "Age": 100}),
                json!({"Name": "user27", "Age": 47}),
            ])
            .await?;
        assert_eq!(affected, 2);
        let row = users.single(Value::Int(1), None).await?.unwrap();
        assert_eq!(
            row.get("Name"),
            Some(&Value::Text("renamed again".to_string()))
        );
        let count = users.scalar("SELECT COUNT(ID) FROM Users", vec![]).await?;
        assert_eq!(count, Some(Value::Int(27)));

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
