// Runs against an embedded Postgres instance:
//   cargo test --features test-utils-postgres --test test5_postgres_stream
#![cfg(feature = "test-utils-postgres")]

use dyntable::prelude::*;
use futures_util::StreamExt;
use postgresql_embedded::PostgreSQL;
use tokio::runtime::Runtime;
use tokio::time::{Duration, timeout};

#[test]
fn postgres_streaming_and_identity() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut postgresql = PostgreSQL::default();
        postgresql.setup().await?;
        postgresql.start().await?;
        postgresql.create_database("streaming").await?;

        let settings = postgresql.settings();
        let mut cfg = PgConfig::new();
        cfg.dbname = Some("streaming".to_string());
        cfg.host = Some(settings.host.clone());
        cfg.port = Some(settings.port);
        cfg.user = Some(settings.username.clone());
        cfg.password = Some(settings.password.clone());
        // One connection total, so a leaked checkout deadlocks the test.
        cfg.pool = Some(PoolConfig::new(1));

        let pool = DbPool::new_postgres(cfg).await?;
        // Unquoted identifiers fold to lowercase on this backend.
        let users = Table::with_primary_key(pool.clone(), "users", "id");
        let plain = Table::with_primary_key(pool, "plain", "id");

        users
            .execute_batch(
                r#"
                CREATE TABLE users (id BIGSERIAL PRIMARY KEY, name TEXT, age BIGINT);
                CREATE TABLE plain (id BIGINT, name TEXT);
            "#,
            )
            .await?;

        // No sequence has been touched in this session: the identity query
        // raises SQLSTATE 55000, which reads back as "no generated identity".
        let mut record = Record::new();
        record.insert("id", Value::Int(7));
        record.insert("name", Value::Text("manual".to_string()));
        let id = plain.insert(record).await?;
        assert_eq!(id, None);

        // A serial column reports its generated key.
        for i in 1..=5i64 {
            let mut record = Record::new();
            record.insert("name", Value::Text(format!("user{i}")));
            record.insert("age", Value::Int(20 + i));
            let id = users.insert(record).await?;
            assert_eq!(id, Some(Value::Int(i)));
        }

        // Fully consumed stream yields every row in order.
        let mut stream = users
            .query_stream("SELECT id, name FROM users ORDER BY id", vec![])
            .await?;
        let mut seen = Vec::new();
        while let Some(row) = stream.next().await {
            seen.push(row?.get("id").cloned());
        }
        drop(stream);
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[0], Some(Value::Int(1)));

        // Early termination: take two rows, drop the stream, and the single
        // pooled connection must come back for the next operation.
        let mut stream = users
            .query_stream("SELECT id FROM users ORDER BY id", vec![])
            .await?;
        let first = stream.next().await.transpose()?;
        let second = stream.next().await.transpose()?;
        assert!(first.is_some() && second.is_some());
        drop(stream);

        let count = timeout(
            Duration::from_secs(5),
            users.scalar("SELECT COUNT(id) FROM users", vec![]),
        )
        .await??;
        assert_eq!(count, Some(Value::Int(5)));

        postgresql.stop().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
