/// 机器信息持久化
///
/// 每台机器一个 JSON 文件：`{store}/{machine}.json`

use common::{Error, Result};
use smtxos::MachineRecord;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct MachineStore {
    root: PathBuf,
}

impl MachineStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self, machine_name: &str) -> PathBuf {
        self.root.join(format!("{}.json", machine_name))
    }

    /// 读取机器信息，文件不存在时返回空记录
    pub async fn load(&self, machine_name: &str) -> Result<MachineRecord> {
        let path = self.path(machine_name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let record: MachineRecord = serde_json::from_slice(&bytes)?;
                if record.machine_name != machine_name {
                    return Err(Error::InvalidArgument(format!(
                        "{} belongs to machine '{}'",
                        path.display(),
                        record.machine_name
                    )));
                }
                Ok(record)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("机器信息不存在，使用空记录: {}", path.display());
                Ok(MachineRecord {
                    machine_name: machine_name.to_string(),
                    ..Default::default()
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, record: &MachineRecord) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.path(&record.machine_name);
        let json = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(&path, json).await?;
        debug!("机器信息已保存: {}", path.display());
        Ok(())
    }

    /// 删除机器信息；文件不存在不算错误
    pub async fn remove(&self, machine_name: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path(machine_name)).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// 读取 SSH 公钥文件并去掉首尾空白
pub async fn read_ssh_public_key(path: &Path) -> Result<String> {
    let key = tokio::fs::read_to_string(path).await?;
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "SSH public key file {} is empty",
            path.display()
        )));
    }
    Ok(key.to_string())
}
