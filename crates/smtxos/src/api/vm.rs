/// 虚拟机相关接口与数据结构

use common::utils::is_usable_ipv4;
use common::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::job::Job;
use super::network::VlanId;
use super::null_default;
use crate::client::SmtxClient;

/// 虚拟机状态
///
/// 未识别、缺失或为 null 的状态都解码为 Unknown
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VmStatus {
    Running,
    Stopped,
    Suspended,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VmCpu {
    pub topology: VmCpuTopology,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VmCpuTopology {
    pub cores: i32,
    pub sockets: i32,
}

/// 创建虚拟机请求
#[derive(Debug, Clone, Serialize)]
pub struct VmSpec {
    pub vm_name: String,
    pub vcpu: i32,
    pub cpu: VmCpu,
    /// 内存字节数
    pub memory: i64,
    pub disks: Vec<VmDisk>,
    pub nics: Vec<VmNic>,
    pub auto_schedule: bool,
    pub ha: bool,
    pub status: VmStatus,
}

/// 虚拟磁盘
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VmDisk {
    #[serde(rename = "type")]
    pub kind: String,
    pub bus: String,
    pub name: String,
    #[serde(flatten)]
    pub source: DiskSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_policy_uuid: Option<String>,
}

/// 磁盘来源：新建空盘或从镜像克隆，两者互斥
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum DiskSource {
    Fresh {
        size_in_byte: i64,
    },
    FromImage {
        src_export_id: String,
        src_inode_id: String,
        clone_before_create: bool,
        new_size_in_byte: i64,
    },
}

impl VmDisk {
    const KIND: &'static str = "disk";
    const BUS: &'static str = "virtio";

    /// 新建空盘
    pub fn fresh(name: impl Into<String>, size_in_byte: i64, storage_policy_uuid: Option<String>) -> Self {
        Self {
            kind: Self::KIND.to_string(),
            bus: Self::BUS.to_string(),
            name: name.into(),
            source: DiskSource::Fresh { size_in_byte },
            storage_policy_uuid,
        }
    }

    /// 从 NFS 镜像克隆
    pub fn from_image(
        name: impl Into<String>,
        export_id: impl Into<String>,
        inode_id: impl Into<String>,
        new_size_in_byte: i64,
    ) -> Self {
        Self {
            kind: Self::KIND.to_string(),
            bus: Self::BUS.to_string(),
            name: name.into(),
            source: DiskSource::FromImage {
                src_export_id: export_id.into(),
                src_inode_id: inode_id.into(),
                clone_before_create: true,
                new_size_in_byte,
            },
            storage_policy_uuid: None,
        }
    }
}

/// 虚拟网卡，仅在创建时挂载
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VmNic {
    pub ovs: String,
    pub vlan_uuid: String,
    pub vlans: Vec<VmNicVlan>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VmNicVlan {
    pub vlan_id: VlanId,
}

/// 查询到的虚拟机
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Vm {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub vm_name: String,
    #[serde(default)]
    pub vcpu: i32,
    #[serde(default)]
    pub memory: i64,
    #[serde(default)]
    pub ha: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub status: VmStatus,
    #[serde(default)]
    pub guest_info: Option<VmGuestInfo>,
}

/// 客户机（guest agent）上报的信息
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VmGuestInfo {
    #[serde(default, deserialize_with = "null_default")]
    pub nics: Vec<VmGuestNic>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VmGuestNic {
    #[serde(default, deserialize_with = "null_default")]
    pub ip_addresses: Vec<VmGuestIpAddress>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VmGuestIpAddress {
    #[serde(default)]
    pub ip_address_type: String,
    pub ip_address: String,
}

impl Vm {
    /// 第一个可对外使用的 IPv4 地址（排除回环和链路本地地址）
    pub fn first_ipv4(&self) -> Option<&str> {
        self.guest_info
            .iter()
            .flat_map(|info| info.nics.iter())
            .flat_map(|nic| nic.ip_addresses.iter())
            .filter(|ip| ip.ip_address_type == "ipv4")
            .map(|ip| ip.ip_address.as_str())
            .find(|ip| is_usable_ipv4(ip))
    }
}

impl SmtxClient {
    pub async fn get_vm(&self, uuid: &str) -> Result<Vm> {
        self.get(&format!("/v2/vms/{}", uuid), &[]).await
    }

    pub async fn create_vm(&self, spec: &VmSpec) -> Result<Job> {
        self.post("/v2/vms", spec).await
    }

    pub async fn start_vm(&self, uuid: &str) -> Result<Job> {
        self.post(&format!("/v2/vms/{}/start", uuid), &json!({"auto_schedule": true}))
            .await
    }

    /// 强制关机
    pub async fn stop_vm(&self, uuid: &str) -> Result<Job> {
        self.post(&format!("/v2/vms/{}/stop", uuid), &json!({"force": true}))
            .await
    }

    /// 强制重启
    pub async fn reboot_vm(&self, uuid: &str) -> Result<Job> {
        self.post(&format!("/v2/vms/{}/reboot", uuid), &json!({"force": true}))
            .await
    }

    /// 删除虚拟机及其挂载的卷
    pub async fn delete_vm(&self, uuid: &str) -> Result<Job> {
        self.delete(&format!("/v2/vms/{}", uuid), &json!({"include_volumes": true}))
            .await
    }

    pub async fn set_vm_ssh_public_key(&self, vm_uuid: &str, ssh_public_key: &str) -> Result<()> {
        let body = json!({
            "vm_uuid": vm_uuid,
            "ssh_public_key": ssh_public_key,
        });
        let _: serde_json::Value = self
            .post("/v2/vm_additional_info/set_ssh_public_key", &body)
            .await?;
        Ok(())
    }
}
