/// 异步任务
///
/// 所有变更类操作都返回一个任务，任务完成后才能继续下一步

use common::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::client::SmtxClient;

/// 任务状态
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    #[default]
    Pending,
    Processing,
    Done,
    Failed,
    #[serde(other)]
    Unknown,
}

/// 任务产生的资源，按 `type` 字段区分
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum JobResource {
    #[serde(rename = "KVM_VM")]
    Vm { uuid: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Job {
    pub job_id: String,
    #[serde(default)]
    pub description: String,
    /// 缺失或为 null 时视为未完成
    #[serde(default, deserialize_with = "super::null_default")]
    pub state: JobState,
    /// 仅在创建类任务完成后填充
    #[serde(default, deserialize_with = "deserialize_resources")]
    pub resources: Vec<JobResource>,
}

impl Job {
    /// 任务创建出的虚拟机 UUID
    pub fn vm_uuid(&self) -> Option<&str> {
        self.resources.iter().find_map(|r| match r {
            JobResource::Vm { uuid } => Some(uuid.as_str()),
            JobResource::Other => None,
        })
    }
}

/// resources 在线上是 `{任意key: {type, uuid, ...}}`，按 key 排序后转为列表
fn deserialize_resources<'de, D>(deserializer: D) -> std::result::Result<Vec<JobResource>, D::Error>
where
    D: Deserializer<'de>,
{
    let map: Option<BTreeMap<String, JobResource>> = Option::deserialize(deserializer)?;
    Ok(map.map(|m| m.into_values().collect()).unwrap_or_default())
}

#[derive(Deserialize)]
struct JobEnvelope {
    job: Job,
}

impl SmtxClient {
    pub async fn get_job(&self, id: &str) -> Result<Job> {
        let data: JobEnvelope = self.get(&format!("/v2/jobs/{}", id), &[]).await?;
        Ok(data.job)
    }
}
