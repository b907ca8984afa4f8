/// SMTX OS Machine Driver - 驱动库
///
/// 通过 SMTX OS REST API 创建并管理运行 Docker 的虚拟机

pub mod api;
pub mod client;
pub mod config;
pub mod driver;
pub mod poller;
pub mod resolve;

#[cfg(test)]
mod testing;

// 重新导出常用类型
pub use api::SmtxApi;
pub use client::SmtxClient;
pub use config::DriverConfig;
pub use driver::{Driver, MachineRecord};
pub use poller::JobWaiter;
