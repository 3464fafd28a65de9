use crate::configuration::Settings;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, HttpMessage,
};
use futures::{
    future::{FutureExt, LocalBoxFuture},
    task::{Context, Poll},
};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Short-TTL token cache. The client polls summaries every few seconds, so
/// validating the session on every request would hammer the auth service.
pub struct AccountCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedAccount>>,
}

struct CachedAccount {
    account: models::Account,
    expires_at: Instant,
}

impl AccountCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, token: &str) -> Option<models::Account> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(token) {
                if entry.expires_at > now {
                    return Some(entry.account.clone());
                }
            }
        }

        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(token) {
            if entry.expires_at <= now {
                entries.remove(token);
            } else {
                return Some(entry.account.clone());
            }
        }

        None
    }

    pub async fn insert(&self, token: String, account: models::Account) {
        let expires_at = Instant::now() + self.ttl;
        let mut entries = self.entries.write().await;
        entries.insert(
            token,
            CachedAccount {
                account,
                expires_at,
            },
        );
    }
}

fn try_extract_token(authentication: &str) -> Result<String, String> {
    let mut authentication_parts = authentication.splitn(2, ' ');
    match authentication_parts.next() {
        Some("Bearer") => {}
        _ => return Err("Authentication required.".to_string()),
    }

    match authentication_parts.next() {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => {
            tracing::error!("Bearer token is missing");
            Err("Authentication required.".to_string())
        }
    }
}

async fn fetch_account(
    client: &reqwest::Client,
    auth_url: &str,
    token: &str,
) -> Result<models::Account, String> {
    let resp = client
        .get(auth_url)
        .bearer_auth(token)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, "application/json")
        .send()
        .await
        .map_err(|_err| "No response from the auth service.".to_string())?;

    if !resp.status().is_success() {
        return Err("Authentication required.".to_string());
    }

    resp.json::<forms::AccountForm>()
        .await
        .map_err(|_err| "Can't parse the auth service response.".to_string())?
        .try_into()
}

/// Resolves the bearer token to an account and attaches it to the request.
/// Every core operation downstream takes this explicit caller identity;
/// there is no ambient session state.
#[tracing::instrument(name = "Authenticate request.", skip_all)]
async fn authenticate(req: &mut ServiceRequest) -> Result<(), String> {
    let authentication = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| "Authentication required.".to_string())?;
    let token = try_extract_token(&authentication)?;

    let settings = req
        .app_data::<web::Data<Settings>>()
        .cloned()
        .ok_or_else(|| "Authentication required.".to_string())?;
    let http_client = req
        .app_data::<web::Data<reqwest::Client>>()
        .cloned()
        .ok_or_else(|| "Authentication required.".to_string())?;
    let cache = req
        .app_data::<web::Data<AccountCache>>()
        .cloned()
        .ok_or_else(|| "Authentication required.".to_string())?;

    let account = match cache.get(&token).await {
        Some(account) => account,
        None => {
            let account =
                fetch_account(http_client.get_ref(), settings.auth_url.as_str(), &token).await?;
            cache.insert(token, account.clone()).await;
            account
        }
    };

    tracing::debug!(
        "Authenticated account {} (branch {})",
        account.id,
        account.branch_id
    );

    if req.extensions_mut().insert(Arc::new(account)).is_some() {
        return Err("Account already attached to this request.".to_string());
    }

    Ok(())
}

pub struct Manager {}

impl Manager {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for Manager
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ManagerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ManagerMiddleware {
            service: Rc::new(RefCell::new(service)),
        }))
    }
}

pub struct ManagerMiddleware<S> {
    service: Rc<RefCell<S>>,
}

impl<S, B> Service<ServiceRequest> for ManagerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = S::Error;
    type Future = LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        if let Ok(mut service) = self.service.try_borrow_mut() {
            service.poll_ready(ctx)
        } else {
            Poll::Pending
        }
    }

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        async move {
            authenticate(&mut req).await?;
            Ok(req)
        }
        .then(|req: Result<ServiceRequest, String>| async move {
            match req {
                Ok(req) => {
                    let fut = service.borrow_mut().call(req);
                    fut.await
                }
                Err(msg) => Err(JsonResponse::<()>::build().unauthorized(&msg)),
            }
        })
        .boxed_local()
    }
}
