//! Append-only interaction log.

use super::connection::CacheDb;
use super::entries::to_db_time;
use crate::Error;
use crate::model::InteractionEvent;
use tokio_rusqlite::params;

impl CacheDb {
    /// Append one interaction event.
    pub async fn insert_interaction(&self, event: &InteractionEvent) -> Result<(), Error> {
        let job_id = event.job_id.clone();
        let kind = event.kind.as_str();
        let user_id = event.user.user_id.clone();
        let user_type = event.user.user_type.as_str();
        let metadata_json = serde_json::to_string(&event.metadata)?;
        let created_at = to_db_time(event.timestamp);

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO interactions (job_id, kind, user_id, user_type, metadata_json, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![job_id, kind, user_id, user_type, metadata_json, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Number of recorded interactions for a job.
    pub async fn interaction_count(&self, job_id: &str) -> Result<u64, Error> {
        let job_id = job_id.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM interactions WHERE job_id = ?1", params![job_id], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InteractionKind, UserContext};

    #[tokio::test]
    async fn test_insert_and_count() {
        let db = CacheDb::open_in_memory("test").await.unwrap();
        let event = InteractionEvent {
            job_id: "job-1".into(),
            kind: InteractionKind::Click,
            user: UserContext::new_user(),
            metadata: serde_json::json!({"position": 3}),
            timestamp: chrono::Utc::now(),
        };

        db.insert_interaction(&event).await.unwrap();
        db.insert_interaction(&event).await.unwrap();

        assert_eq!(db.interaction_count("job-1").await.unwrap(), 2);
        assert_eq!(db.interaction_count("job-2").await.unwrap(), 0);
    }
}
