#![cfg(feature = "sqlite")]
use chrono::NaiveDate;
use dyntable::prelude::*;
use tokio::runtime::Runtime;
use uuid::Uuid;

#[test]
fn coerced_values_survive_a_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("test4.db").to_string_lossy().into_owned();

    rt.block_on(async {
        let pool = DbPool::new_sqlite(db_path).await?;
        let events = Table::new(pool, "Events");

        events
            .execute_batch(
                r#"
                CREATE TABLE Events (
                    ID INTEGER PRIMARY KEY AUTOINCREMENT,
                    Token TEXT,
                    At TEXT,
                    Payload BLOB,
                    Active INT
                );
            "#,
            )
            .await?;

        let token = Uuid::new_v4();
        let at = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();

        let mut record = Record::new();
        record.insert("Token", Value::Uuid(token));
        record.insert("At", Value::Timestamp(at));
        record.insert("Payload", Value::Blob(vec![1, 2, 3]));
        record.insert("Active", Value::Bool(true));
        events.insert(record).await?;

        let row = events.single(Value::Int(1), None).await?.unwrap();
        // Uuids bind as text.
        assert_eq!(row.get("Token").and_then(|v| v.as_uuid()), Some(token));
        // Timestamps bind as formatted text and parse back.
        assert_eq!(row.get("At").and_then(|v| v.as_timestamp()), Some(at));
        assert_eq!(
            row.get("Payload").and_then(|v| v.as_blob()),
            Some(&[1u8, 2, 3][..])
        );
        // Bools bind as 0/1 integers.
        assert_eq!(row.get("Active").and_then(|v| v.as_bool()), Some(&true));

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}

#[test]
fn form_style_input_flattens_to_first_values() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("test4b.db").to_string_lossy().into_owned();

    rt.block_on(async {
        let pool = DbPool::new_sqlite(db_path).await?;
        let users = Table::new(pool, "Users");

        users
            .execute_batch("CREATE TABLE Users (ID INTEGER PRIMARY KEY AUTOINCREMENT, Name TEXT);")
            .await?;

        let form = FormValues(vec![(
            "Name".to_string(),
            vec!["Ann".to_string(), "shadowed".to_string()],
        )]);
        users.insert(form).await?;

        let row = users.single(Value::Int(1), None).await?.unwrap();
        assert_eq!(row.get("Name"), Some(&Value::Text("Ann".to_string())));

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
