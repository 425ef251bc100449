//! 会话客户端：登录、登出、身份探测
//!
//! 认证完全依赖后端下发的 Cookie，客户端不保存任何令牌。

use crate::api::BackendClient;
use crate::error::{AdminError, AdminErrorStatus, AdminResult};
use crate::request::HttpClient;
use shopadmin_shared::AuthenticatedUser;
use shopadmin_shared::protocol::{LoginRequest, LogoutRequest, PingAuthRequest};

/// 登录结果
///
/// 凭证错误属于预期内的业务结果，不作为错误返回。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Accepted,
    Rejected { status: u16 },
}

/// 身份探测结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthProbe {
    Authorized(AuthenticatedUser),
    Unauthorized,
}

#[async_trait::async_trait(?Send)]
pub trait SessionApi {
    async fn login(&self, req: &LoginRequest) -> AdminResult<LoginOutcome>;
    async fn logout(&self) -> AdminResult<()>;
    async fn ping_auth(&self) -> AdminResult<AuthProbe>;
}

/// 基于 REST 接口的会话客户端
pub struct HttpSessionClient<C: HttpClient> {
    api: BackendClient<C>,
}

impl<C: HttpClient> HttpSessionClient<C> {
    pub fn new(api: BackendClient<C>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait(?Send)]
impl<C: HttpClient> SessionApi for HttpSessionClient<C> {
    async fn login(&self, req: &LoginRequest) -> AdminResult<LoginOutcome> {
        match self.api.execute(req).await {
            Ok(_) => Ok(LoginOutcome::Accepted),
            Err(e) => match (e.status, e.http_status()) {
                (AdminErrorStatus::Unauthorized | AdminErrorStatus::Rejected, Some(status)) => {
                    Ok(LoginOutcome::Rejected { status })
                }
                _ => Err(e.in_op("session.login")),
            },
        }
    }

    async fn logout(&self) -> AdminResult<()> {
        self.api
            .execute(&LogoutRequest)
            .await
            .map(|_| ())
            .map_err(|e| e.in_op("session.logout"))
    }

    async fn ping_auth(&self) -> AdminResult<AuthProbe> {
        match self.api.send(&PingAuthRequest).await {
            Ok(user) if user.email.trim().is_empty() => {
                Err(AdminError::serialization("identity probe returned an empty email")
                    .in_op("session.ping_auth"))
            }
            Ok(user) => Ok(AuthProbe::Authorized(user)),
            Err(e) if e.is_unauthorized() => Ok(AuthProbe::Unauthorized),
            Err(e) => Err(e.in_op("session.ping_auth")),
        }
    }
}
