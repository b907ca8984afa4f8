/// 任务轮询
///
/// 以固定间隔查询任务状态直到终态，支持超时与取消

use common::models::constants::DEFAULT_JOB_POLL_INTERVAL_MS;
use common::{Error, Result};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{JobState, SmtxApi};

/// 任务等待器
#[derive(Debug, Clone)]
pub struct JobWaiter {
    interval: Duration,
    timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl Default for JobWaiter {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_JOB_POLL_INTERVAL_MS))
    }
}

impl JobWaiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            timeout: None,
            cancel: CancellationToken::new(),
        }
    }

    /// 设置最长等待时间，None 表示一直等待
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 取消令牌，可用于中断正在进行的等待
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// 等待任务完成
    ///
    /// - done: 成功返回
    /// - failed: 返回任务描述作为错误
    /// - 其它状态: 间隔后再次查询
    ///
    /// 查询本身出错时立即返回，不做重试
    pub async fn wait_until_done(&self, api: &dyn SmtxApi, job_id: &str) -> Result<()> {
        let deadline = self.timeout.map(|t| Instant::now() + t);
        let mut polls: u64 = 0;

        loop {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let job = api.get_job(job_id).await?;
            polls += 1;

            match job.state {
                JobState::Done => {
                    info!("✅ 任务完成: {} (查询 {} 次)", job_id, polls);
                    return Ok(());
                }
                JobState::Failed => {
                    warn!("❌ 任务失败: {} - {}", job_id, job.description);
                    return Err(Error::JobFailed(job.description));
                }
                state => {
                    debug!("任务 {} 状态 {:?}，{:?} 后重试", job_id, state, self.interval);
                }
            }

            if let Some(deadline) = deadline {
                if Instant::now() + self.interval > deadline {
                    return Err(Error::Timeout(format!("job {}", job_id)));
                }
            }

            tokio::select! {
                _ = self.cancel.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}
