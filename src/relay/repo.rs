use anyhow::Context;
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// One row of `encrypted_texts`.
#[derive(Debug, Clone, FromRow)]
pub struct EncryptedRecord {
    pub id: i64,
    pub encrypted_text: String,
    pub decrypted_text: Option<String>,
    pub created_at: OffsetDateTime,
}

#[async_trait]
pub trait EncryptedTextRepo: Send + Sync {
    /// Stores every text as a new row, preserving order. Returns the new rows.
    async fn insert_batch(&self, texts: &[String]) -> anyhow::Result<Vec<EncryptedRecord>>;

    /// All rows ordered by id.
    async fn list_ordered(&self) -> anyhow::Result<Vec<EncryptedRecord>>;

    /// Sets `decrypted_text` on rows that don't have one yet. Returns how many changed.
    async fn set_decrypted(&self, updates: &[(i64, String)]) -> anyhow::Result<u64>;
}

pub struct PgEncryptedTextRepo {
    db: PgPool,
}

impl PgEncryptedTextRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EncryptedTextRepo for PgEncryptedTextRepo {
    async fn insert_batch(&self, texts: &[String]) -> anyhow::Result<Vec<EncryptedRecord>> {
        let mut tx = self.db.begin().await.context("begin insert batch")?;
        let mut rows = Vec::with_capacity(texts.len());
        for text in texts {
            let row = sqlx::query_as::<_, EncryptedRecord>(
                r#"
                INSERT INTO encrypted_texts (encrypted_text)
                VALUES ($1)
                RETURNING id, encrypted_text, decrypted_text, created_at
                "#,
            )
            .bind(text)
            .fetch_one(&mut *tx)
            .await
            .context("insert encrypted text")?;
            rows.push(row);
        }
        tx.commit().await.context("commit insert batch")?;
        Ok(rows)
    }

    async fn list_ordered(&self) -> anyhow::Result<Vec<EncryptedRecord>> {
        let rows = sqlx::query_as::<_, EncryptedRecord>(
            r#"
            SELECT id, encrypted_text, decrypted_text, created_at
              FROM encrypted_texts
             ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list encrypted texts")?;
        Ok(rows)
    }

    async fn set_decrypted(&self, updates: &[(i64, String)]) -> anyhow::Result<u64> {
        let mut tx = self.db.begin().await.context("begin decrypt update")?;
        let mut changed = 0;
        for (id, text) in updates {
            let done = sqlx::query(
                r#"
                UPDATE encrypted_texts
                   SET decrypted_text = $2
                 WHERE id = $1 AND decrypted_text IS NULL
                "#,
            )
            .bind(id)
            .bind(text)
            .execute(&mut *tx)
            .await
            .context("update decrypted text")?;
            changed += done.rows_affected();
        }
        tx.commit().await.context("commit decrypt update")?;
        Ok(changed)
    }
}


#[cfg(test)]
pub(crate) mod memory {
    use std::sync::Mutex;

    use super::*;

    /// In-process stand-in for the Postgres table.
    #[derive(Default)]
    pub struct MemoryTextRepo {
        rows: Mutex<Vec<EncryptedRecord>>,
    }

    impl MemoryTextRepo {
        pub fn snapshot(&self) -> Vec<EncryptedRecord> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EncryptedTextRepo for MemoryTextRepo {
        async fn insert_batch(&self, texts: &[String]) -> anyhow::Result<Vec<EncryptedRecord>> {
            let mut rows = self.rows.lock().unwrap();
            let mut inserted = Vec::with_capacity(texts.len());
            for text in texts {
                let record = EncryptedRecord {
                    id: rows.last().map_or(1, |r| r.id + 1),
                    encrypted_text: text.clone(),
                    decrypted_text: None,
                    created_at: OffsetDateTime::now_utc(),
                };
                rows.push(record.clone());
                inserted.push(record);
            }
            Ok(inserted)
        }

        async fn list_ordered(&self) -> anyhow::Result<Vec<EncryptedRecord>> {
            let mut rows = self.snapshot();
            rows.sort_by_key(|r| r.id);
            Ok(rows)
        }

        async fn set_decrypted(&self, updates: &[(i64, String)]) -> anyhow::Result<u64> {
            let mut rows = self.rows.lock().unwrap();
            let mut changed = 0;
            for (id, text) in updates {
                if let Some(row) = rows
                    .iter_mut()
                    .find(|r| r.id == *id && r.decrypted_text.is_none())
                {
                    row.decrypted_text = Some(text.clone());
                    changed += 1;
                }
            }
            Ok(changed)
        }
    }
}
