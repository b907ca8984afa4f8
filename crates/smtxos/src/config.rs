/// 驱动配置
///
/// 依次读取：内置默认值 -> 配置文件（可选） -> `SMTXOS_*` 环境变量

use common::models::constants::{
    DEFAULT_JOB_POLL_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SERVER_PORT,
    INTERNAL_NETWORK_NAME,
};
use common::utils::mib_to_bytes;
use common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::poller::JobWaiter;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "SMTXOS";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DriverConfig {
    /// SMTX OS 地址
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// 虚拟机 CPU 核数
    pub cpu_count: u32,
    /// 内存大小（MB）
    pub memory_size: u64,
    /// 数据盘大小（MB）
    pub disk_size: u64,
    /// 数据盘存储策略
    pub storage_policy_name: String,
    /// DockerOS 镜像路径，格式为 `[datastore-name]/image-file-path`
    pub dockeros_image_path: String,
    pub network_name: String,
    /// 额外挂载的内部网络，为空则不挂载
    pub internal_network_name: String,
    /// 是否开启高可用
    pub ha: bool,
    pub job_poll_interval_ms: u64,
    /// 任务等待上限，0 表示不限制
    pub job_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            port: DEFAULT_SERVER_PORT,
            username: "root".to_string(),
            password: String::new(),
            cpu_count: 2,
            memory_size: 4096,
            disk_size: 10240,
            storage_policy_name: "default".to_string(),
            dockeros_image_path: "[kubernetes]/SMTX-DockerOS.raw".to_string(),
            network_name: "default".to_string(),
            internal_network_name: INTERNAL_NETWORK_NAME.to_string(),
            ha: false,
            job_poll_interval_ms: DEFAULT_JOB_POLL_INTERVAL_MS,
            job_timeout_secs: 0,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl DriverConfig {
    /// 加载并校验配置
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(config::File::from(file).required(true));
        }
        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let cfg: DriverConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::Config(e.to_string()))?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() {
            return Err(Error::Config("SMTXOS_SERVER 不能为空".to_string()));
        }
        if self.cpu_count == 0 {
            return Err(Error::Config("cpu_count 必须大于 0".to_string()));
        }
        if self.memory_size == 0 || self.disk_size == 0 {
            return Err(Error::Config("memory_size 和 disk_size 必须大于 0".to_string()));
        }
        if self.job_poll_interval_ms == 0 {
            return Err(Error::Config("job_poll_interval_ms 必须大于 0".to_string()));
        }
        Ok(())
    }

    pub fn memory_size_bytes(&self) -> i64 {
        mib_to_bytes(self.memory_size)
    }

    pub fn disk_size_bytes(&self) -> i64 {
        mib_to_bytes(self.disk_size)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn internal_network(&self) -> Option<&str> {
        let name = self.internal_network_name.trim();
        (!name.is_empty()).then_some(name)
    }

    /// 按配置构造任务等待器
    pub fn job_waiter(&self) -> JobWaiter {
        let timeout = (self.job_timeout_secs > 0).then(|| Duration::from_secs(self.job_timeout_secs));
        JobWaiter::new(Duration::from_millis(self.job_poll_interval_ms)).with_timeout(timeout)
    }
}
