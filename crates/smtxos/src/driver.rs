/// SMTX OS 主机驱动
///
/// 将宿主机生命周期操作（create/start/stop/restart/remove/ip/state）
/// 翻译为 SMTX OS API 调用序列，每个变更操作都会等待任务完成后再继续

use common::models::constants::{DEFAULT_SSH_USER, DOCKER_PORT, DRIVER_NAME};
use common::{Error, MachineState, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::{Job, SmtxApi, VmCpu, VmCpuTopology, VmDisk, VmSpec, VmStatus};
use crate::client::SmtxClient;
use crate::config::DriverConfig;
use crate::poller::JobWaiter;
use crate::resolve::{resolve_image, resolve_network, resolve_storage_policy};

/// 需要在多次调用之间保留的机器信息
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MachineRecord {
    pub machine_name: String,
    /// 创建完成后由 SMTX OS 分配
    #[serde(default)]
    pub vm_uuid: Option<String>,
    /// 已解析的 IP 地址缓存
    #[serde(default)]
    pub ip_address: Option<String>,
}

/// 主机驱动
pub struct Driver {
    record: MachineRecord,
    config: DriverConfig,
    api: Option<Arc<dyn SmtxApi>>,
    waiter: JobWaiter,
}

impl Driver {
    pub fn new(machine_name: impl Into<String>) -> Self {
        Self::from_record(MachineRecord {
            machine_name: machine_name.into(),
            ..Default::default()
        })
    }

    /// 从已保存的机器信息恢复
    pub fn from_record(record: MachineRecord) -> Self {
        let config = DriverConfig::default();
        Self {
            record,
            waiter: config.job_waiter(),
            config,
            api: None,
        }
    }

    /// 替换配置；API 客户端会在下次调用时按新配置重建
    pub fn set_config(&mut self, config: DriverConfig) {
        self.waiter = config.job_waiter();
        self.config = config;
        self.api = None;
    }

    /// 使用外部提供的 API 实现
    pub fn with_api(mut self, api: Arc<dyn SmtxApi>) -> Self {
        self.api = Some(api);
        self
    }

    pub fn with_waiter(mut self, waiter: JobWaiter) -> Self {
        self.waiter = waiter;
        self
    }

    pub fn record(&self) -> &MachineRecord {
        &self.record
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn driver_name(&self) -> &'static str {
        DRIVER_NAME
    }

    pub fn ssh_user(&self) -> &'static str {
        DEFAULT_SSH_USER
    }

    fn api(&mut self) -> Result<Arc<dyn SmtxApi>> {
        if let Some(api) = &self.api {
            return Ok(api.clone());
        }

        let client = SmtxClient::new(
            &self.config.server,
            self.config.port,
            self.config.username.clone(),
            self.config.password.clone(),
            self.config.request_timeout(),
        )?;
        let api: Arc<dyn SmtxApi> = Arc::new(client);
        self.api = Some(api.clone());
        Ok(api)
    }

    fn vm_uuid(&self) -> Result<String> {
        self.record
            .vm_uuid
            .clone()
            .ok_or_else(|| Error::InvalidArgument("VM has not been created".to_string()))
    }

    async fn wait(&self, api: &dyn SmtxApi, job: Job) -> Result<()> {
        self.waiter.wait_until_done(api, &job.job_id).await
    }

    /// 组装创建虚拟机的请求
    ///
    /// 解析镜像路径、存储策略和网络；任何一项找不到都会中止
    pub async fn build_spec(&mut self) -> Result<VmSpec> {
        let api = self.api()?;
        let cfg = &self.config;
        let name = &self.record.machine_name;

        let cpu_count = i32::try_from(cfg.cpu_count)
            .map_err(|_| Error::InvalidArgument(format!("cpu count {} too large", cfg.cpu_count)))?;

        let image = resolve_image(api.as_ref(), &cfg.dockeros_image_path).await?;
        let os_disk = VmDisk::from_image(
            format!("{}-os", name),
            image.export_id,
            image.inode_id,
            image.size,
        );

        let policy = resolve_storage_policy(api.as_ref(), &cfg.storage_policy_name).await?;
        let docker_disk = VmDisk::fresh(
            format!("{}-docker", name),
            cfg.disk_size_bytes(),
            Some(policy.uuid),
        );

        let mut network_names = vec![cfg.network_name.as_str()];
        if let Some(internal) = cfg.internal_network() {
            if !network_names.contains(&internal) {
                network_names.push(internal);
            }
        }

        let mut nics = Vec::with_capacity(network_names.len());
        for network in network_names {
            nics.push(resolve_network(api.as_ref(), network).await?);
        }

        Ok(VmSpec {
            vm_name: name.clone(),
            vcpu: cpu_count,
            cpu: VmCpu {
                topology: VmCpuTopology {
                    cores: cpu_count,
                    sockets: 1,
                },
            },
            memory: cfg.memory_size_bytes(),
            disks: vec![os_disk, docker_disk],
            nics,
            auto_schedule: true,
            ha: cfg.ha,
            status: VmStatus::Stopped,
        })
    }

    /// 创建虚拟机：提交创建任务 -> 取得 UUID -> 下发 SSH 公钥 -> 开机
    ///
    /// 中途失败不会回滚已创建的资源
    pub async fn create(&mut self, ssh_public_key: &str) -> Result<()> {
        info!("🚀 创建虚拟机: {}", self.record.machine_name);

        let spec = self.build_spec().await?;
        debug!(
            "虚拟机规格: vcpu={}, memory={}MB, disks={}, nics={}",
            spec.vcpu,
            self.config.memory_size,
            spec.disks.len(),
            spec.nics.len()
        );

        let api = self.api()?;
        let job = api.create_vm(&spec).await?;
        let job_id = job.job_id.clone();
        self.wait(api.as_ref(), job).await?;

        let job = api.get_job(&job_id).await?;
        let vm_uuid = job
            .vm_uuid()
            .map(str::to_string)
            .ok_or_else(|| Error::JobFailed(format!("job {} finished without a VM resource", job_id)))?;
        info!("✅ 虚拟机已创建: {} ({})", self.record.machine_name, vm_uuid);
        self.record.vm_uuid = Some(vm_uuid.clone());

        api.set_vm_ssh_public_key(&vm_uuid, ssh_public_key).await?;
        debug!("SSH 公钥已下发: {}", vm_uuid);

        self.start().await
    }

    /// 虚拟机 IP，优先返回缓存
    pub async fn ip(&mut self) -> Result<String> {
        if let Some(ip) = &self.record.ip_address {
            return Ok(ip.clone());
        }

        let uuid = self.vm_uuid()?;
        let vm = self.api()?.get_vm(&uuid).await?;
        let ip = vm
            .first_ipv4()
            .map(str::to_string)
            .ok_or_else(|| Error::NotReady("IP address is not set".to_string()))?;

        self.record.ip_address = Some(ip.clone());
        Ok(ip)
    }

    pub async fn ssh_hostname(&mut self) -> Result<String> {
        self.ip().await
    }

    /// Docker 守护进程地址
    pub async fn url(&mut self) -> Result<String> {
        let ip = self.ip().await?;
        Ok(format!("tcp://{}:{}", ip, DOCKER_PORT))
    }

    /// 机器状态；未知的虚拟机状态映射为 Error 而非返回错误
    pub async fn state(&mut self) -> Result<MachineState> {
        let uuid = self.vm_uuid()?;
        let vm = self.api()?.get_vm(&uuid).await?;

        Ok(match vm.status {
            VmStatus::Running => MachineState::Running,
            VmStatus::Stopped => MachineState::Stopped,
            VmStatus::Suspended => MachineState::Paused,
            VmStatus::Unknown => MachineState::Error,
        })
    }

    pub async fn start(&mut self) -> Result<()> {
        let uuid = self.vm_uuid()?;
        let api = self.api()?;
        info!("▶️ 启动虚拟机: {}", uuid);
        let job = api.start_vm(&uuid).await?;
        self.wait(api.as_ref(), job).await
    }

    /// 强制关机
    pub async fn stop(&mut self) -> Result<()> {
        let uuid = self.vm_uuid()?;
        let api = self.api()?;
        info!("🛑 停止虚拟机: {}", uuid);
        let job = api.stop_vm(&uuid).await?;
        self.wait(api.as_ref(), job).await
    }

    pub async fn kill(&mut self) -> Result<()> {
        self.stop().await
    }

    /// 强制重启
    pub async fn restart(&mut self) -> Result<()> {
        let uuid = self.vm_uuid()?;
        let api = self.api()?;
        info!("🔄 重启虚拟机: {}", uuid);
        let job = api.reboot_vm(&uuid).await?;
        self.wait(api.as_ref(), job).await
    }

    /// 删除虚拟机及其卷
    pub async fn remove(&mut self) -> Result<()> {
        let uuid = self.vm_uuid()?;
        let api = self.api()?;
        info!("🗑️ 删除虚拟机: {}", uuid);
        let job = api.delete_vm(&uuid).await?;
        self.wait(api.as_ref(), job).await?;

        self.record.vm_uuid = None;
        self.record.ip_address = None;
        Ok(())
    }
}
