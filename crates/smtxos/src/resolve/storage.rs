/// 存储策略解析

use common::{Error, Result};
use tracing::debug;

use crate::api::{SmtxApi, StoragePolicy};

/// 按名称精确匹配存储策略
pub async fn resolve_storage_policy(api: &dyn SmtxApi, name: &str) -> Result<StoragePolicy> {
    let policy = api
        .list_storage_policies()
        .await?
        .into_iter()
        .find(|p| p.name == name)
        .ok_or_else(|| Error::not_found("storage policy", name))?;

    debug!("存储策略 {} -> {}", name, policy.uuid);
    Ok(policy)
}
