use tracing::{info, warn};

use crate::config::UpstreamConfig;
use crate::errors::AppError;
use crate::relay::client::{RelayClient, UpstreamError};
use crate::relay::dto::ResultSubmission;
use crate::relay::repo::EncryptedTextRepo;

/// Downloads the encrypted batch and stores it in arrival order.
pub async fn fetch_and_store(
    repo: &dyn EncryptedTextRepo,
    client: &dyn RelayClient,
) -> Result<Vec<String>, AppError> {
    let texts = match client.fetch_encrypted().await {
        Ok(texts) => texts,
        Err(UpstreamError::Status(status)) => {
            warn!(status, "encrypted source returned non-200");
            return Err(AppError::SourceUnavailable);
        }
        Err(e) => return Err(e.into()),
    };
    let stored = repo.insert_batch(&texts).await?;
    info!(count = stored.len(), "encrypted texts stored");
    Ok(texts)
}

/// Sends every stored ciphertext to the decryption service and writes the
/// answers back by position.
pub async fn decrypt_and_update(
    repo: &dyn EncryptedTextRepo,
    client: &dyn RelayClient,
) -> Result<Vec<String>, AppError> {
    let records = repo.list_ordered().await?;
    let encrypted: Vec<String> = records.iter().map(|r| r.encrypted_text.clone()).collect();

    let decrypted = client.decrypt(&encrypted).await?;
    if decrypted.len() != records.len() {
        warn!(
            stored = records.len(),
            received = decrypted.len(),
            "decrypted batch length differs from stored rows"
        );
    }

    let updates: Vec<(i64, String)> = records
        .iter()
        .zip(&decrypted)
        .map(|(record, text)| (record.id, text.clone()))
        .collect();
    let changed = repo.set_decrypted(&updates).await?;
    if (changed as usize) < updates.len() {
        warn!(
            skipped = updates.len() - changed as usize,
            "rows already decrypted were left untouched"
        );
    }
    info!(changed, "decrypted texts written");
    Ok(decrypted)
}

/// Bundles every stored `decrypted_text` with the submitter metadata and posts it.
pub async fn submit_result(
    repo: &dyn EncryptedTextRepo,
    client: &dyn RelayClient,
    upstream: &UpstreamConfig,
) -> Result<ResultSubmission, AppError> {
    let result = repo
        .list_ordered()
        .await?
        .into_iter()
        .map(|r| r.decrypted_text)
        .collect();
    let payload = ResultSubmission {
        name: upstream.submitter_name.clone(),
        repo_url: upstream.repo_url.clone(),
        result,
    };
    client.submit_result(&payload).await?;
    info!(count = payload.result.len(), "result submitted");
    Ok(payload)
}
