/// SMTX OS Machine Driver - 公共库
/// 
/// 提供驱动库和命令行适配层共享的错误类型、状态定义、工具函数

pub mod errors;
pub mod models;
pub mod utils;

// 重新导出常用类型
pub use errors::{Error, Result};
pub use models::MachineState;
