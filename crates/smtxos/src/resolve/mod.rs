/// 资源名称解析
///
/// 将人类可读的名称（存储策略名、网络名、镜像路径）解析为创建虚拟机所需的 ID

pub mod image;
pub mod network;
pub mod storage;

pub use image::{resolve_image, ImagePath, ResolvedImage};
pub use network::resolve_network;
pub use storage::resolve_storage_policy;
