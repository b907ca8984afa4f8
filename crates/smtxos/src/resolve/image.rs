/// 镜像路径解析
///
/// 路径格式为 `[导出名]/目录/.../文件`，逐级列出 inode 并按名称匹配

use common::{Error, Result};
use tracing::debug;

use crate::api::{NfsInode, SmtxApi};

/// 解析后的镜像路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePath {
    pub export: String,
    pub segments: Vec<String>,
}

impl ImagePath {
    /// 解析 `[export]/a/b/file`；缺少 `[...]` 前缀时返回 None
    pub fn parse(path: &str) -> Option<Self> {
        let rest = path.trim().strip_prefix('[')?;
        let (export, rest) = rest.split_once(']')?;

        let segments = rest
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Some(Self {
            export: export.to_string(),
            segments,
        })
    }
}

/// 镜像在存储上的位置与大小
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub export_id: String,
    pub inode_id: String,
    /// shared_size + unique_size
    pub size: i64,
}

/// 将镜像路径解析为导出 ID + inode ID
///
/// 任何一级找不到都返回以完整路径命名的 not found 错误
pub async fn resolve_image(api: &dyn SmtxApi, path: &str) -> Result<ResolvedImage> {
    let not_found = || Error::not_found("image", path);

    let image = ImagePath::parse(path).ok_or_else(not_found)?;
    let export = api
        .list_nfs_exports()
        .await?
        .into_iter()
        .find(|e| e.name == image.export)
        .ok_or_else(not_found)?;

    let mut parent_id: Option<String> = None;
    let mut leaf: Option<NfsInode> = None;

    for segment in &image.segments {
        let inode = api
            .list_nfs_inodes(&export.id, parent_id.as_deref())
            .await?
            .into_iter()
            .find(|i| &i.name == segment)
            .ok_or_else(not_found)?;

        parent_id = Some(inode.id.clone());
        leaf = Some(inode);
    }

    let leaf = leaf.ok_or_else(not_found)?;
    debug!(
        "镜像 {} -> export={} inode={} size={}",
        path,
        export.id,
        leaf.id,
        leaf.total_size()
    );

    Ok(ResolvedImage {
        size: leaf.total_size(),
        export_id: export.id,
        inode_id: leaf.id,
    })
}
