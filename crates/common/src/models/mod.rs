/// 共享数据模型
///
/// 定义宿主机生命周期层看到的状态与常量

use serde::{Deserialize, Serialize};
use std::fmt;

/// 机器状态（面向宿主机管理工具）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MachineState {
    None,
    Running,
    Paused,
    Stopped,
    Error,
}

impl MachineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Running => "Running",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 常量定义
pub mod constants {
    /// 驱动名称
    pub const DRIVER_NAME: &str = "smtxos";

    /// 镜像内置的 SSH 用户
    pub const DEFAULT_SSH_USER: &str = "centos";

    /// Docker 守护进程端口
    pub const DOCKER_PORT: u16 = 2375;

    /// 默认 SMTX OS API 端口
    pub const DEFAULT_SERVER_PORT: u16 = 80;

    /// 默认任务轮询间隔（毫秒）
    pub const DEFAULT_JOB_POLL_INTERVAL_MS: u64 = 1000;

    /// 默认单次请求超时（秒）
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

    /// 每台虚拟机额外挂载的内部网络
    pub const INTERNAL_NETWORK_NAME: &str = "ovsbr-internal-default-network";
}
