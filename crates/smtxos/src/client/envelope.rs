/// 响应解码
///
/// SMTX OS 同时存在两种响应格式：
/// - `/v2` 前缀的接口返回带状态码的信封 `{ec, data, error}`
/// - 其它接口直接返回业务 JSON

use common::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// 信封成功状态码
pub const SUCCESS_CODE: &str = "EOK";

/// 使用信封格式的路径前缀
pub const ENVELOPED_PREFIX: &str = "/v2";

/// 响应解码模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Plain,
    Enveloped,
}

impl ResponseMode {
    /// 根据请求路径选择解码模式
    pub fn for_path(path: &str) -> Self {
        if path.starts_with(ENVELOPED_PREFIX) {
            Self::Enveloped
        } else {
            Self::Plain
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    ec: String,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    error: Value,
}

/// 按模式将响应体解码为目标类型
pub fn decode<T: DeserializeOwned>(mode: ResponseMode, body: &[u8]) -> Result<T> {
    let value = parse_body(body)?;

    match mode {
        ResponseMode::Plain => Ok(serde_json::from_value(value)?),
        ResponseMode::Enveloped => {
            let envelope: Envelope = serde_json::from_value(value)?;
            if envelope.ec != SUCCESS_CODE {
                return Err(Error::Remote(describe_error(&envelope.error)));
            }
            Ok(serde_json::from_value(envelope.data)?)
        }
    }
}

/// 空响应体按 null 处理，便于 `()` 类型的调用直接成功
fn parse_body(body: &[u8]) -> Result<Value> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(body)?)
}

/// 信封 error 字段原样呈现：字符串直接返回，其它值使用 JSON 文本
fn describe_error(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
