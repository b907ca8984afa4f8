/// SMTX OS 远程接口
///
/// `SmtxApi` 抽象出驱动依赖的全部接口，`SmtxClient` 为其 HTTP 实现

pub mod job;
pub mod network;
pub mod storage;
pub mod vm;

use async_trait::async_trait;
use common::Result;
use serde::{Deserialize, Deserializer};

use crate::client::SmtxClient;

pub use job::{Job, JobResource, JobState};
pub use network::{Vds, Vlan, VlanId};
pub use storage::{NfsExport, NfsInode, StoragePolicy};
pub use vm::{
    DiskSource, Vm, VmCpu, VmCpuTopology, VmDisk, VmGuestInfo, VmGuestIpAddress, VmGuestNic,
    VmNic, VmNicVlan, VmSpec, VmStatus,
};

/// SMTX OS 接口 Trait
#[async_trait]
pub trait SmtxApi: Send + Sync {
    async fn get_vm(&self, uuid: &str) -> Result<Vm>;

    async fn create_vm(&self, spec: &VmSpec) -> Result<Job>;

    async fn start_vm(&self, uuid: &str) -> Result<Job>;

    async fn stop_vm(&self, uuid: &str) -> Result<Job>;

    async fn reboot_vm(&self, uuid: &str) -> Result<Job>;

    async fn delete_vm(&self, uuid: &str) -> Result<Job>;

    async fn set_vm_ssh_public_key(&self, vm_uuid: &str, ssh_public_key: &str) -> Result<()>;

    async fn list_vdses(&self) -> Result<Vec<Vds>>;

    async fn list_vlans(&self, vds_uuid: &str) -> Result<Vec<Vlan>>;

    async fn list_storage_policies(&self) -> Result<Vec<StoragePolicy>>;

    async fn list_nfs_exports(&self) -> Result<Vec<NfsExport>>;

    /// `parent_id` 为 None 时列出导出根目录
    async fn list_nfs_inodes(&self, export_id: &str, parent_id: Option<&str>)
        -> Result<Vec<NfsInode>>;

    async fn get_job(&self, id: &str) -> Result<Job>;
}

#[async_trait]
impl SmtxApi for SmtxClient {
    async fn get_vm(&self, uuid: &str) -> Result<Vm> {
        SmtxClient::get_vm(self, uuid).await
    }

    async fn create_vm(&self, spec: &VmSpec) -> Result<Job> {
        SmtxClient::create_vm(self, spec).await
    }

    async fn start_vm(&self, uuid: &str) -> Result<Job> {
        SmtxClient::start_vm(self, uuid).await
    }

    async fn stop_vm(&self, uuid: &str) -> Result<Job> {
        SmtxClient::stop_vm(self, uuid).await
    }

    async fn reboot_vm(&self, uuid: &str) -> Result<Job> {
        SmtxClient::reboot_vm(self, uuid).await
    }

    async fn delete_vm(&self, uuid: &str) -> Result<Job> {
        SmtxClient::delete_vm(self, uuid).await
    }

    async fn set_vm_ssh_public_key(&self, vm_uuid: &str, ssh_public_key: &str) -> Result<()> {
        SmtxClient::set_vm_ssh_public_key(self, vm_uuid, ssh_public_key).await
    }

    async fn list_vdses(&self) -> Result<Vec<Vds>> {
        SmtxClient::list_vdses(self).await
    }

    async fn list_vlans(&self, vds_uuid: &str) -> Result<Vec<Vlan>> {
        SmtxClient::list_vlans(self, vds_uuid).await
    }

    async fn list_storage_policies(&self) -> Result<Vec<StoragePolicy>> {
        SmtxClient::list_storage_policies(self).await
    }

    async fn list_nfs_exports(&self) -> Result<Vec<NfsExport>> {
        SmtxClient::list_nfs_exports(self).await
    }

    async fn list_nfs_inodes(
        &self,
        export_id: &str,
        parent_id: Option<&str>,
    ) -> Result<Vec<NfsInode>> {
        SmtxClient::list_nfs_inodes(self, export_id, parent_id).await
    }

    async fn get_job(&self, id: &str) -> Result<Job> {
        SmtxClient::get_job(self, id).await
    }
}

/// 将 JSON null 视为缺省值
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
