//! Lazy query results for the Postgres backend.
//!
//! [`RecordStream`] owns the pooled connection it reads from: rows are
//! fetched as the consumer polls, and dropping the stream, whether after full
//! consumption, early termination, or an error, returns the connection to
//! its pool exactly once.

use std::pin::Pin;
use std::task::{Context, Poll};

use deadpool_postgres::Object;
use futures_core::Stream;
use tokio_postgres::RowStream;
use tokio_postgres::types::ToSql;

use crate::error::DynTableError;
use crate::params::Param;
use crate::postgres::row_to_record;
use crate::record::Record;
use crate::translation::{PlaceholderStyle, translate_placeholders};

/// A lazy sequence of canonical records streamed off one pooled connection.
#[must_use]
pub struct RecordStream {
    inner: Pin<Box<RowStream>>,
    // Held for the lifetime of the stream so the connection is not returned
    // to the pool while rows are still in flight.
    _conn: Object,
}

impl RecordStream {
    pub(crate) async fn new(
        conn: Object,
        sql: &str,
        params: &[Param],
    ) -> Result<Self, DynTableError> {
        let sql = translate_placeholders(sql, PlaceholderStyle::Postgres);
        let stmt = conn.prepare(sql.as_ref()).await?;
        let rows = conn
            .query_raw(&stmt, params.iter().map(|p| &p.value as &dyn ToSql))
            .await?;
        Ok(Self {
            inner: Box::pin(rows),
            _conn: conn,
        })
    }
}

impl Stream for RecordStream {
    type Item = Result<Record, DynTableError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(row))) => Poll::Ready(Some(row_to_record(&row))),
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e.into()))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
