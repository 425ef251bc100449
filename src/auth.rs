use crate::error::{AdminError, AdminResult};
use crate::session::{AuthProbe, LoginOutcome, SessionApi};
use shopadmin_shared::AuthenticatedUser;
use shopadmin_shared::protocol::LoginRequest;
use std::cell::RefCell;
use std::rc::Rc;

// =========================================================
// 会话快照
// =========================================================

/// 当前会话状态
///
/// 不变量：已认证时 email 非空（`AuthenticatedUser` 只在探测/登录成功后写入）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<AuthenticatedUser>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn email(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.email.as_str())
    }
}

type Listener = Box<dyn Fn(&Session)>;

// =========================================================
// 认证状态存储
// =========================================================

/// 全局唯一的认证状态，句柄可廉价克隆并注入到各个组件
#[derive(Clone)]
pub struct AuthStore {
    api: Rc<dyn SessionApi>,
    session: Rc<RefCell<Session>>,
    listeners: Rc<RefCell<Vec<Listener>>>,
}

impl AuthStore {
    pub fn new(api: Rc<dyn SessionApi>) -> Self {
        Self {
            api,
            session: Rc::new(RefCell::new(Session::default())),
            listeners: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.borrow().is_authenticated()
    }

    /// 订阅会话变化（UI 层用于同步到响应式状态）
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&Session) + 'static,
    {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    /// 替换会话并在值变化时通知订阅者
    fn set_session(&self, next: Session) {
        let changed = {
            let mut current = self.session.borrow_mut();
            if *current == next {
                false
            } else {
                *current = next.clone();
                true
            }
        };
        if changed {
            for listener in self.listeners.borrow().iter() {
                listener(&next);
            }
        }
    }

    fn clear(&self) {
        self.set_session(Session::default());
    }

    /// 登录
    ///
    /// 成功后立即探测一次身份，拿到服务端确认的 email。
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> AdminResult<LoginOutcome> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AdminError::invalid_input("email and password are required")
                .in_op("auth.login"));
        }

        let req = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
            remember_me,
        };

        let outcome = match self.api.login(&req).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "login request failed");
                self.clear();
                return Err(e.in_op("auth.login"));
            }
        };

        match outcome {
            LoginOutcome::Accepted => {
                tracing::info!(email = %req.email, "login accepted");
                self.check_authorization().await?;
            }
            LoginOutcome::Rejected { status } => {
                tracing::debug!(status, "login rejected");
                self.clear();
            }
        }
        Ok(outcome)
    }

    /// 登出：无论后端是否成功都清空本地状态
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            tracing::warn!(error = %e, "logout request failed, clearing local session anyway");
        } else {
            tracing::info!("logged out");
        }
        self.clear();
    }

    /// 向后端探测当前会话
    ///
    /// - 2xx: 写入用户，返回 `true`
    /// - 401/403: 清空，返回 `false`
    /// - 其他失败: 清空，返回错误
    pub async fn check_authorization(&self) -> AdminResult<bool> {
        match self.api.ping_auth().await {
            Ok(AuthProbe::Authorized(user)) => {
                self.set_session(Session { user: Some(user) });
                Ok(true)
            }
            Ok(AuthProbe::Unauthorized) => {
                tracing::debug!("identity probe: not authenticated");
                self.clear();
                Ok(false)
            }
            Err(e) => {
                tracing::error!(error = %e, "identity probe failed");
                self.clear();
                Err(e.in_op("auth.check_authorization"))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::AdminErrorStatus;
    use std::cell::{Cell, RefCell};

    // =========================================================
    // 假会话客户端
    // =========================================================

    /// 带状态的假会话：登录成功后 ping 返回同一 email
    pub struct FakeSessionApi {
        pub valid_password: String,
        pub logged_in_as: RefCell<Option<String>>,
        pub fail_network: Cell<bool>,
        pub fail_logout: Cell<bool>,
        pub calls: RefCell<Vec<String>>,
    }

    impl FakeSessionApi {
        pub fn new() -> Self {
            Self {
                valid_password: "secret".into(),
                logged_in_as: RefCell::new(None),
                fail_network: Cell::new(false),
                fail_logout: Cell::new(false),
                calls: RefCell::new(Vec::new()),
            }
        }

        pub fn signed_in(email: &str) -> Self {
            let api = Self::new();
            *api.logged_in_as.borrow_mut() = Some(email.to_string());
            api
        }

        pub fn count(&self, op: &str) -> usize {
            self.calls.borrow().iter().filter(|c| c.as_str() == op).count()
        }
    }

    #[async_trait::async_trait(?Send)]
    impl SessionApi for FakeSessionApi {
        async fn login(&self, req: &LoginRequest) -> AdminResult<LoginOutcome> {
            self.calls.borrow_mut().push("login".into());
            if self.fail_network.get() {
                return Err(AdminError::network("connection refused"));
            }
            if req.password == self.valid_password {
                *self.logged_in_as.borrow_mut() = Some(req.email.clone());
                Ok(LoginOutcome::Accepted)
            } else {
                Ok(LoginOutcome::Rejected { status: 401 })
            }
        }

        async fn logout(&self) -> AdminResult<()> {
            self.calls.borrow_mut().push("logout".into());
            if self.fail_logout.get() {
                return Err(AdminError::network("connection reset"));
            }
            *self.logged_in_as.borrow_mut() = None;
            Ok(())
        }

        async fn ping_auth(&self) -> AdminResult<AuthProbe> {
            self.calls.borrow_mut().push("ping".into());
            if self.fail_network.get() {
                return Err(AdminError::timeout("probe timed out"));
            }
            Ok(match self.logged_in_as.borrow().clone() {
                Some(email) => AuthProbe::Authorized(AuthenticatedUser { email }),
                None => AuthProbe::Unauthorized,
            })
        }
    }

    fn store_with(api: &Rc<FakeSessionApi>) -> AuthStore {
        AuthStore::new(api.clone())
    }

    #[tokio::test]
    async fn test_login_then_probe_returns_same_email() {
        let api = Rc::new(FakeSessionApi::new());
        let store = store_with(&api);

        let outcome = store.login("admin@shop.test", "secret", true).await.unwrap();
        assert_eq!(outcome, LoginOutcome::Accepted);
        assert_eq!(store.session().email(), Some("admin@shop.test"));

        assert!(store.check_authorization().await.unwrap());
        assert_eq!(store.session().email(), Some("admin@shop.test"));
    }

    #[tokio::test]
    async fn test_bad_credentials_leave_store_unauthenticated() {
        let api = Rc::new(FakeSessionApi::new());
        let store = store_with(&api);

        let outcome = store.login("admin@shop.test", "wrong", false).await.unwrap();
        assert_eq!(outcome, LoginOutcome::Rejected { status: 401 });
        assert!(!store.is_authenticated());
        assert_eq!(api.count("ping"), 0);
    }

    #[tokio::test]
    async fn test_empty_fields_never_reach_backend() {
        let api = Rc::new(FakeSessionApi::new());
        let store = store_with(&api);

        let err = store.login("  ", "secret", false).await.unwrap_err();
        assert_eq!(err.status, AdminErrorStatus::InvalidInput);
        assert!(api.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_clears_state() {
        let api = Rc::new(FakeSessionApi::signed_in("admin@shop.test"));
        let store = store_with(&api);
        assert!(store.check_authorization().await.unwrap());

        api.fail_network.set(true);
        let err = store.check_authorization().await.unwrap_err();
        assert_eq!(err.status, AdminErrorStatus::Timeout);
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_backend_fails() {
        let api = Rc::new(FakeSessionApi::signed_in("admin@shop.test"));
        let store = store_with(&api);
        store.check_authorization().await.unwrap();

        api.fail_logout.set(true);
        store.logout().await;
        assert!(!store.is_authenticated());
        assert_eq!(api.count("logout"), 1);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes_once() {
        let api = Rc::new(FakeSessionApi::signed_in("admin@shop.test"));
        let store = store_with(&api);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |s| sink.borrow_mut().push(s.is_authenticated()));

        store.check_authorization().await.unwrap();
        // 重复探测，状态不变，不重复通知
        store.check_authorization().await.unwrap();
        store.logout().await;
        store.logout().await;

        assert_eq!(*seen.borrow(), vec![true, false]);
    }
}
