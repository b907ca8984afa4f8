/// SMTX OS REST API 客户端
///
/// 负责会话管理：每次请求携带当前 token，token 过期（401）时自动重新登录并重试一次

pub mod envelope;

use common::{Error, Result};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use envelope::ResponseMode;

/// 登录接口路径
pub const LOGIN_PATH: &str = "/v3/sessions";

/// token 请求头（两个后端版本分别读取不同的头）
const TOKEN_HEADERS: [&str; 2] = ["X-SmartX-Token", "Grpc-Metadata-Token"];

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct Session {
    token: String,
}

/// SMTX OS API 客户端
pub struct SmtxClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    /// 当前会话 token，首次登录前为空
    token: RwLock<Option<String>>,
    /// 串行化重新登录
    login_lock: Mutex<()>,
}

impl SmtxClient {
    /// 创建客户端（不会立即登录）
    pub fn new(
        server: &str,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| Error::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: format!("http://{}:{}/api", server, port),
            username: username.into(),
            password: password.into(),
            token: RwLock::new(None),
            login_lock: Mutex::new(()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 当前 token（未登录时为 None）
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// 执行一次 API 调用并解码结果
    ///
    /// 遇到 401 时登录并重试一次，重试仍失败则直接返回错误
    pub async fn execute<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = body.map(serde_json::to_value).transpose()?;
        let mut auto_login = true;

        loop {
            let token = self.token().await;
            let resp = self
                .send(method.clone(), path, query, body.as_ref(), token.as_deref())
                .await?;

            if auto_login && resp.status() == StatusCode::UNAUTHORIZED {
                warn!("会话已失效，重新登录: {} {}", method, path);
                self.relogin(token).await?;
                auto_login = false;
                continue;
            }

            return Self::read(path, resp).await;
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        self.execute::<Value, T>(Method::GET, path, query, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(Method::POST, path, &[], Some(body)).await
    }

    pub async fn delete<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(Method::DELETE, path, &[], Some(body)).await
    }

    /// 使用用户名密码登录，保存返回的 token
    pub async fn login(&self) -> Result<()> {
        let body = serde_json::to_value(LoginRequest {
            username: &self.username,
            password: &self.password,
        })?;

        let token = self.token().await;
        let resp = self
            .send(Method::POST, LOGIN_PATH, &[], Some(&body), token.as_deref())
            .await?;
        let session: Session = Self::read(LOGIN_PATH, resp).await?;

        *self.token.write().await = Some(session.token);
        info!("✅ 登录 SMTX OS 成功: {}", self.base_url);
        Ok(())
    }

    /// 重新登录；若其它调用方已经刷新过 token 则跳过
    async fn relogin(&self, stale: Option<String>) -> Result<()> {
        let _guard = self.login_lock.lock().await;
        if self.token().await != stale {
            debug!("token 已被刷新，跳过登录");
            return Ok(());
        }
        self.login().await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        let target = format!("{} {}", method, url);
        debug!("{} query={:?}", target, query);

        let mut req = self.http.request(method, &url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = token {
            for header in TOKEN_HEADERS {
                req = req.header(header, token);
            }
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        req.send()
            .await
            .map_err(|e| Error::Transport(format!("{} failed: {}", target, e)))
    }

    async fn read<T: DeserializeOwned>(path: &str, resp: Response) -> Result<T> {
        let status = resp.status();
        // 只认 200，其它 2xx 同样视为失败
        if status != StatusCode::OK {
            return Err(Error::Status(status_text(status)));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read response body: {}", e)))?;
        envelope::decode(ResponseMode::for_path(path), &body)
    }
}

/// 状态码描述，如 "Unauthorized"
fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}
