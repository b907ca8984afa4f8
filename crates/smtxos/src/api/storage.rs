/// 存储策略与 NFS 导出目录

use common::Result;
use serde::{Deserialize, Serialize};

use crate::client::SmtxClient;

/// 根目录 parent_id 取导出 ID 的前缀长度
pub const ROOT_PARENT_ID_LEN: usize = 18;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoragePolicy {
    pub uuid: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NfsExport {
    pub id: String,
    pub name: String,
}

/// NFS 文件或目录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NfsInode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_id: String,
    /// 与其它文件共享（写时复制）的字节数
    #[serde(default)]
    pub shared_size: i64,
    /// 独占字节数
    #[serde(default)]
    pub unique_size: i64,
}

impl NfsInode {
    pub fn total_size(&self) -> i64 {
        self.shared_size + self.unique_size
    }
}

/// 导出根目录的 parent_id
///
/// 后端以导出 ID 的前 18 个字符作为根目录 inode 的父 ID，ID 更短时取整个 ID
pub fn root_parent_id(export_id: &str) -> &str {
    export_id.get(..ROOT_PARENT_ID_LEN).unwrap_or(export_id)
}

#[derive(Deserialize)]
struct InodeList {
    #[serde(default, deserialize_with = "super::null_default")]
    inodes: Vec<NfsInode>,
}

impl SmtxClient {
    pub async fn list_storage_policies(&self) -> Result<Vec<StoragePolicy>> {
        let policies: Option<Vec<StoragePolicy>> = self.get("/v2/storage_policies", &[]).await?;
        Ok(policies.unwrap_or_default())
    }

    pub async fn list_nfs_exports(&self) -> Result<Vec<NfsExport>> {
        let exports: Option<Vec<NfsExport>> = self.get("/v2/nfs/exports", &[]).await?;
        Ok(exports.unwrap_or_default())
    }

    /// 列出目录下的 inode；`parent_id` 为空时列出导出根目录
    pub async fn list_nfs_inodes(
        &self,
        export_id: &str,
        parent_id: Option<&str>,
    ) -> Result<Vec<NfsInode>> {
        let parent_id = parent_id.unwrap_or_else(|| root_parent_id(export_id));
        let list: Option<InodeList> = self
            .get(
                &format!("/v2/nfs/exports/{}/inodes", export_id),
                &[("parent_id", parent_id)],
            )
            .await?;
        Ok(list.map(|l| l.inodes).unwrap_or_default())
    }
}
