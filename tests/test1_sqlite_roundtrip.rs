#![cfg(feature = "sqlite")]
use dyntable::prelude::*;
use serde_json::json;
use tokio::runtime::Runtime;

#[test]
fn sqlite_insert_single_update_all_delete() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("test1.db").to_string_lossy().into_owned();

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

        // Insert returns the generated identity.
        let id = users.insert(json!({"Name": "Ann", "Age": 30})).await?;
        assert_eq!(id, Some(Value::Int(1)));
        let id = users.insert(json!({"Name": "Bob", "Age": 17})).await?;
        assert_eq!(id, Some(Value::Int(2)));

        // Keyed single-row lookup.
        let row = users
            .single(Value::Int(1), None)
            .await?
            .expect("row 1 should exist");
        assert_eq!(row.get("Name"), Some(&Value::Text("Ann".to_string())));
        assert_eq!(row.get("Age"), Some(&Value::Int(30)));

        // Absence is a normal result, not an error.
        assert!(users.single(Value::Int(99), None).await?.is_none());

        // Column projection.
        let row = users
            .single(Value::Int(2), Some("Name"))
            .await?
            .expect("row 2 should exist");
        assert!(row.contains_key("Name"));
        assert!(!row.contains_key("Age"));

        // Update by key; the record itself carries no key column.
        let affected = users.update(json!({"Age": 31}), Value::Int(1)).await?;
        assert_eq!(affected, 1);
        let row = users.single(Value::Int(1), None).await?.unwrap();
        assert_eq!(row.get("Age"), Some(&Value::Int(31)));

        // Filtered read with a caller-supplied predicate and args.
        let adults = users
            .all(
                SelectOptions::default()
                    .with_where("Age >= @0")
                    .with_order_by("ID")
                    .with_args(vec![Value::Int(18)]),
            )
            .await?;
        assert_eq!(adults.len(), 1);
        assert_eq!(adults[0].get("Name"), Some(&Value::Text("Ann".to_string())));

        // Unfiltered all() is stable across calls on an unchanged table.
        let first = users.all(SelectOptions::default()).await?;
        let second = users.all(SelectOptions::default()).await?;
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);

        // Ad-hoc query and scalar.
        let rows = users
            .query("SELECT Name FROM Users WHERE Age > @0", vec![Value::Int(20)])
            .await?;
        assert_eq!(rows.len(), 1);
        let count = users.scalar("SELECT COUNT(ID) FROM Users", vec![]).await?;
        assert_eq!(count, Some(Value::Int(2)));

        // Delete by key, then by predicate.
        let affected = users.delete(Some(Value::Int(2)), "", vec![]).await?;
        assert_eq!(affected, 1);
        let affected = users
            .delete(None, "Age >= @0", vec![Value::Int(0)])
            .await?;
        assert_eq!(affected, 1);
        let count = users.scalar("SELECT COUNT(ID) FROM Users", vec![]).await?;
        assert_eq!(count, Some(Value::Int(0)));

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
