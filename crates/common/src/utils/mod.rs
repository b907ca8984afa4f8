/// 工具函数集合

const MIB: i64 = 1024 * 1024;

/// MB（MiB）转换为字节
pub fn mib_to_bytes(mib: u64) -> i64 {
    (mib as i64).saturating_mul(MIB)
}

/// 判断客户机上报的 IPv4 地址是否可以对外使用
///
/// 只排除 guest agent 常见的两类地址：`127.0.0.1` 和 `169.254.` 开头的链路本地地址
pub fn is_usable_ipv4(ip: &str) -> bool {
    ip != "127.0.0.1" && !ip.starts_with("169.254.")
}
