//! HTTP implementation of [`ClusterApi`]
//!
//! Thin request/response plumbing: every read decodes an envelope from
//! `protocol`, every mutation decodes a [`MutationOutcome`]. Transport
//! failures map to `Error::Transport`, non-2xx responses to `Error::Api`
//! with the server-provided title/message when present.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

use admiral_core::prelude::*;
use admiral_core::{
    CapabilitySet, ClusterUsage, ImageRow, KeypairRow, RegistryRow, ResourceLimit, ResourcePolicy,
    ResourcePreset, SessionCounts, SlotUsage, UserRow, UserStatus,
};

use crate::api::{
    ClusterApi, ConnectInfo, Credentials, JsonPatch, KeypairCreate, PresetPayload, RegistryPayload,
    UserCreate,
};
use crate::bgtask::BgTaskStream;
use crate::protocol::{self, MutationOutcome};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const ACCESS_KEY_HEADER: &str = "x-admiral-access-key";
const SECRET_KEY_HEADER: &str = "x-admiral-secret-key";

/// Error body shape the server uses for non-2xx responses.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "message")]
    msg: Option<String>,
}

#[derive(Debug)]
pub struct HttpClusterApi {
    base: Url,
    http: reqwest::Client,
    credentials: Credentials,
}

impl HttpClusterApi {
    pub fn new(endpoint: &str, credentials: Credentials) -> Result<Self> {
        let base = Url::parse(endpoint).map_err(|_| Error::EndpointInvalid {
            url: endpoint.to_string(),
        })?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::transport(e.to_string()))?;
        Ok(Self {
            base,
            http,
            credentials,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| Error::protocol(format!("bad request path {path}: {e}")))
    }

    /// Websocket endpoint derived from the HTTP base URL.
    fn ws_url(&self, task_id: &str) -> Result<String> {
        let mut url = self.url("v1/events/background-task")?;
        let scheme = match url.scheme() {
            "https" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme)
            .map_err(|_| Error::protocol("cannot derive websocket scheme"))?;
        url.query_pairs_mut().append_pair("task_id", task_id);
        Ok(url.to_string())
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value> {
        let url = self.url(path)?;
        let mut req = self
            .http
            .request(method, url)
            .header(ACCESS_KEY_HEADER, &self.credentials.access_key)
            .header(SECRET_KEY_HEADER, &self.credentials.secret_key)
            .query(query);
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| Error::transport(e.to_string()))?;
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::transport(e.to_string()))?;

        if !status.is_success() {
            return Err(api_error(status, &bytes));
        }
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::protocol(format!("malformed response body: {e}")))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let body = self.request(Method::GET, path, query, None).await?;
        serde_json::from_value(body)
            .map_err(|e| Error::protocol(format!("unexpected response shape for {path}: {e}")))
    }

    async fn mutate(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        nested_key: &str,
    ) -> Result<MutationOutcome> {
        let body = self.request(method, path, &[], body).await?;
        MutationOutcome::from_body(&body, nested_key)
    }
}

fn api_error(status: StatusCode, bytes: &[u8]) -> Error {
    let parsed: Option<ErrorBody> = serde_json::from_slice(bytes).ok();
    let title = parsed
        .as_ref()
        .and_then(|b| b.title.clone())
        .unwrap_or_else(|| format!("Request failed ({status})"));
    let message = parsed
        .and_then(|b| b.msg)
        .unwrap_or_else(|| String::from_utf8_lossy(bytes).into_owned());
    Error::api(title, message)
}

#[async_trait]
impl ClusterApi for HttpClusterApi {
    async fn connect(&self) -> Result<ConnectInfo> {
        let hello: protocol::HelloEnvelope = self.get("v1/server/hello", &[]).await?;
        let is_superadmin = hello.role == "superadmin";
        let is_admin = is_superadmin || hello.role == "admin";
        let capabilities = CapabilitySet::resolve(
            is_admin,
            is_superadmin,
            hello.features.iter().map(String::as_str),
        );
        info!(version = %hello.version, role = %hello.role, "connected to cluster manager");
        Ok(ConnectInfo {
            version: hello.version,
            capabilities,
        })
    }

    async fn list_resource_policies(&self) -> Result<Vec<ResourcePolicy>> {
        let env: protocol::PoliciesEnvelope = self.get("v1/admin/resource-policies", &[]).await?;
        Ok(env
            .resource_policies
            .into_iter()
            .map(|p| p.into_policy())
            .collect())
    }

    async fn list_keypairs(&self, is_active: bool) -> Result<Vec<KeypairRow>> {
        let query = [("is_active", is_active.to_string())];
        let env: protocol::KeypairsEnvelope = self.get("v1/admin/keypairs", &query).await?;
        Ok(env.keypairs.into_iter().map(|k| k.into_row()).collect())
    }

    async fn list_main_access_keys(&self) -> Result<HashMap<String, String>> {
        let env: protocol::MainAccessKeysEnvelope =
            self.get("v1/admin/users/main-access-keys", &[]).await?;
        Ok(env
            .main_access_keys
            .into_iter()
            .map(|m| (m.email, m.access_key))
            .collect())
    }

    async fn list_users(&self, statuses: &[UserStatus]) -> Result<Vec<UserRow>> {
        let query: Vec<(&str, String)> = statuses
            .iter()
            .map(|s| ("status", s.as_str().to_string()))
            .collect();
        let env: protocol::UsersEnvelope = self.get("v1/admin/users", &query).await?;
        Ok(env.users.into_iter().map(|u| u.into_row()).collect())
    }

    async fn get_allowed_registries(&self) -> Result<HashSet<String>> {
        let env: protocol::DomainEnvelope = self.get("v1/admin/domain", &[]).await?;
        Ok(env.domain.allowed_docker_registries.into_iter().collect())
    }

    async fn list_images(&self) -> Result<Vec<ImageRow>> {
        let env: protocol::ImagesEnvelope = self.get("v1/admin/images", &[]).await?;
        Ok(env.images.into_iter().map(|i| i.into_row()).collect())
    }

    async fn list_presets(&self) -> Result<Vec<ResourcePreset>> {
        let env: protocol::PresetsEnvelope = self.get("v1/admin/resource-presets", &[]).await?;
        Ok(env
            .resource_presets
            .into_iter()
            .map(|p| p.into_preset())
            .collect())
    }

    async fn list_registries(&self) -> Result<Vec<RegistryRow>> {
        let env: protocol::RegistriesEnvelope = self.get("v1/admin/registries", &[]).await?;
        Ok(env.registries.into_iter().map(|r| r.into_row()).collect())
    }

    async fn fetch_session_counts(&self) -> Result<SessionCounts> {
        let env: protocol::SessionCountsEnvelope =
            self.get("v1/admin/summary/sessions", &[]).await?;
        Ok(SessionCounts {
            running: env.sessions.running,
            enqueued: env.sessions.enqueued,
        })
    }

    async fn fetch_cluster_usage(&self) -> Result<ClusterUsage> {
        let env: protocol::UsageEnvelope = self.get("v1/admin/summary/resources", &[]).await?;
        let to_usage = |dto: &protocol::SlotUsageDto| SlotUsage {
            used: dto.used,
            capacity: dto.capacity,
        };
        Ok(ClusterUsage {
            cpu: to_usage(&env.resources.cpu),
            mem: to_usage(&env.resources.mem),
            accelerators: env
                .resources
                .accelerators
                .iter()
                .map(|(k, v)| (k.clone(), to_usage(v)))
                .collect(),
        })
    }

    async fn create_keypair(&self, req: &KeypairCreate) -> Result<MutationOutcome> {
        let body = serde_json::to_value(req)?;
        self.mutate(Method::POST, "v1/admin/keypairs", Some(body), "create_keypair")
            .await
    }

    async fn modify_keypair(&self, access_key: &str, patch: &JsonPatch) -> Result<MutationOutcome> {
        let path = format!("v1/admin/keypairs/{access_key}");
        self.mutate(
            Method::PATCH,
            &path,
            Some(Value::Object(patch.clone())),
            "modify_keypair",
        )
        .await
    }

    async fn delete_keypair(&self, access_key: &str) -> Result<MutationOutcome> {
        let path = format!("v1/admin/keypairs/{access_key}");
        self.mutate(Method::DELETE, &path, None, "delete_keypair")
            .await
    }

    async fn regenerate_keypair(&self, access_key: &str) -> Result<MutationOutcome> {
        let path = format!("v1/admin/keypairs/{access_key}/regenerate");
        self.mutate(Method::POST, &path, None, "regenerate_keypair")
            .await
    }

    async fn create_user(&self, req: &UserCreate) -> Result<MutationOutcome> {
        let body = serde_json::to_value(req)?;
        self.mutate(Method::POST, "v1/admin/users", Some(body), "create_user")
            .await
    }

    async fn modify_user(&self, email: &str, patch: &JsonPatch) -> Result<MutationOutcome> {
        let path = format!("v1/admin/users/{email}");
        self.mutate(
            Method::PATCH,
            &path,
            Some(Value::Object(patch.clone())),
            "modify_user",
        )
        .await
    }

    async fn delete_user(&self, email: &str) -> Result<MutationOutcome> {
        let path = format!("v1/admin/users/{email}");
        self.mutate(Method::DELETE, &path, None, "delete_user").await
    }

    async fn create_preset(&self, req: &PresetPayload) -> Result<MutationOutcome> {
        let body = serde_json::to_value(req)?;
        self.mutate(
            Method::POST,
            "v1/admin/resource-presets",
            Some(body),
            "create_resource_preset",
        )
        .await
    }

    async fn modify_preset(&self, name: &str, patch: &JsonPatch) -> Result<MutationOutcome> {
        let path = format!("v1/admin/resource-presets/{name}");
        self.mutate(
            Method::PATCH,
            &path,
            Some(Value::Object(patch.clone())),
            "modify_resource_preset",
        )
        .await
    }

    async fn delete_preset(&self, name: &str) -> Result<MutationOutcome> {
        let path = format!("v1/admin/resource-presets/{name}");
        self.mutate(Method::DELETE, &path, None, "delete_resource_preset")
            .await
    }

    async fn set_registry(&self, req: &RegistryPayload) -> Result<MutationOutcome> {
        let body = serde_json::to_value(req)?;
        self.mutate(Method::PUT, "v1/admin/registries", Some(body), "set_registry")
            .await
    }

    async fn delete_registry(&self, hostname: &str) -> Result<MutationOutcome> {
        let path = format!("v1/admin/registries/{hostname}");
        self.mutate(Method::DELETE, &path, None, "delete_registry")
            .await
    }

    async fn set_registry_enabled(
        &self,
        hostname: &str,
        enabled: bool,
    ) -> Result<MutationOutcome> {
        let body = json!({"hostname": hostname, "enabled": enabled});
        self.mutate(
            Method::POST,
            "v1/admin/registries/enabled",
            Some(body),
            "set_registry_enabled",
        )
        .await
    }

    async fn modify_image_resource_limits(
        &self,
        reference: &str,
        limits: &[ResourceLimit],
    ) -> Result<MutationOutcome> {
        let body = json!({"reference": reference, "resource_limits": limits});
        self.mutate(
            Method::POST,
            "v1/admin/images/resource-limits",
            Some(body),
            "modify_image",
        )
        .await
    }

    async fn change_password(&self, current: &str, new: &str) -> Result<MutationOutcome> {
        let body = json!({"current_password": current, "new_password": new});
        self.mutate(Method::POST, "v1/user/password", Some(body), "change_password")
            .await
    }

    async fn rescan_images(&self, registry: &str) -> Result<String> {
        let body = json!({"registry": registry});
        let resp = self
            .request(Method::POST, "v1/admin/images/rescan", &[], Some(body))
            .await?;
        let env: protocol::RescanEnvelope = serde_json::from_value(resp)
            .map_err(|e| Error::protocol(format!("malformed rescan response: {e}")))?;
        if !env.rescan_images.ok {
            let msg = env
                .rescan_images
                .msg
                .unwrap_or_else(|| "rescan rejected".to_string());
            return Err(Error::api("Unable to start rescan", msg));
        }
        env.rescan_images
            .task_id
            .ok_or_else(|| Error::protocol("rescan response missing task_id"))
    }

    async fn attach_background_task(&self, task_id: &str) -> Result<BgTaskStream> {
        let ws_url = self.ws_url(task_id)?;
        BgTaskStream::connect(&ws_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpClusterApi {
        HttpClusterApi::new(
            "https://cluster.example.io/",
            Credentials {
                access_key: "AKIAFAKE".to_string(),
                secret_key: "sk".to_string(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_endpoint_is_fatal() {
        let err = HttpClusterApi::new(
            "not a url",
            Credentials {
                access_key: String::new(),
                secret_key: String::new(),
            },
        )
        .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_ws_url_derivation() {
        let ws = client().ws_url("task-42").unwrap();
        assert!(ws.starts_with("wss://cluster.example.io/v1/events/background-task"));
        assert!(ws.contains("task_id=task-42"));
    }

    #[test]
    fn test_api_error_prefers_server_title() {
        let body = br#"{"title": "Unable to delete keypair", "msg": "keypair not found"}"#;
        let err = api_error(StatusCode::CONFLICT, body);
        match err {
            Error::Api { title, message } => {
                assert_eq!(title, "Unable to delete keypair");
                assert_eq!(message, "keypair not found");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_api_error_falls_back_to_status() {
        let err = api_error(StatusCode::BAD_GATEWAY, b"upstream down");
        match err {
            Error::Api { title, message } => {
                assert!(title.contains("502"));
                assert_eq!(message, "upstream down");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
