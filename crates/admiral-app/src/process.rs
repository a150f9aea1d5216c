//! Action execution
//!
//! Turns `UpdateAction`s into spawned tasks against the API client. Every
//! task reports back through the message channel; nothing here touches
//! view state. Chained reads within one action run strictly in order
//! (policies before keypairs, allowed registries before images).

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use admiral_client::{BgTaskEvent, ClusterApi, MutationOutcome};
use admiral_core::prelude::*;

use crate::bus::EventBus;
use crate::config;
use crate::handler::UpdateAction;
use crate::message::{Message, RescanResult};

/// Delay between connect attempts.
const CONNECT_RETRY: Duration = Duration::from_secs(5);

/// Everything a spawned action task needs.
#[derive(Clone)]
pub struct ActionCtx {
    pub client: Arc<dyn ClusterApi>,
    pub msg_tx: mpsc::Sender<Message>,
    pub bus: EventBus,
    pub shutdown_rx: watch::Receiver<bool>,
    /// Config file override; `None` uses the default location.
    pub config_path: Option<PathBuf>,
}

/// Spawn a mutation task and map its result (or error) onto a message.
/// Transport errors surface as failed outcomes so the handlers treat both
/// failure shapes uniformly.
fn spawn_mutation(
    msg_tx: mpsc::Sender<Message>,
    fut: impl Future<Output = Result<MutationOutcome>> + Send + 'static,
    to_msg: impl FnOnce(MutationOutcome) -> Message + Send + 'static,
) {
    tokio::spawn(async move {
        let outcome = match fut.await {
            Ok(outcome) => outcome,
            Err(e) => MutationOutcome::failed(e.to_string()),
        };
        let _ = msg_tx.send(to_msg(outcome)).await;
    });
}

/// Execute an action. Returns immediately; results arrive as messages.
pub fn handle_action(action: UpdateAction, ctx: &ActionCtx) {
    let client = ctx.client.clone();
    let msg_tx = ctx.msg_tx.clone();

    match action {
        UpdateAction::Connect => {
            let mut shutdown_rx = ctx.shutdown_rx.clone();
            tokio::spawn(async move {
                loop {
                    if *shutdown_rx.borrow() {
                        return;
                    }
                    match client.connect().await {
                        Ok(info) => {
                            let _ = msg_tx
                                .send(Message::ClientConnected {
                                    version: info.version,
                                    capabilities: info.capabilities,
                                })
                                .await;
                            return;
                        }
                        Err(e) => {
                            warn!("connect failed: {e}");
                            let _ = msg_tx
                                .send(Message::ClientConnectFailed {
                                    error: e.to_string(),
                                })
                                .await;
                        }
                    }
                    tokio::select! {
                        _ = tokio::time::sleep(CONNECT_RETRY) => {}
                        _ = shutdown_rx.changed() => {}
                    }
                }
            });
        }

        UpdateAction::FetchCredentials {
            is_active,
            include_main_keys,
        } => {
            tokio::spawn(async move {
                // The keypair transform needs the policy mapping, so the
                // policy fetch must complete first.
                let result = async {
                    let policies = client.list_resource_policies().await?;
                    let keypairs = client.list_keypairs(is_active).await?;
                    let main_access_keys = if include_main_keys {
                        Some(client.list_main_access_keys().await?)
                    } else {
                        None
                    };
                    Ok::<_, Error>((policies, keypairs, main_access_keys))
                }
                .await;
                let msg = match result {
                    Ok((policies, keypairs, main_access_keys)) => Message::CredentialsLoaded {
                        is_active,
                        policies,
                        keypairs,
                        main_access_keys,
                    },
                    Err(e) => Message::CredentialsLoadFailed {
                        is_active,
                        error: e.to_string(),
                    },
                };
                let _ = msg_tx.send(msg).await;
            });
        }

        UpdateAction::FetchUsers { statuses } => {
            tokio::spawn(async move {
                let msg = match client.list_users(&statuses).await {
                    Ok(users) => Message::UsersLoaded { users },
                    Err(e) => Message::UsersLoadFailed {
                        error: e.to_string(),
                    },
                };
                let _ = msg_tx.send(msg).await;
            });
        }

        UpdateAction::FetchImages => {
            tokio::spawn(async move {
                let result = async {
                    let allowed = client.get_allowed_registries().await?;
                    let images = client.list_images().await?;
                    Ok::<_, Error>((images, allowed))
                }
                .await;
                let msg = match result {
                    Ok((images, allowed_registries)) => Message::ImagesLoaded {
                        images,
                        allowed_registries,
                    },
                    Err(e) => Message::ImagesLoadFailed {
                        error: e.to_string(),
                    },
                };
                let _ = msg_tx.send(msg).await;
            });
        }

        UpdateAction::FetchPresets => {
            tokio::spawn(async move {
                let msg = match client.list_presets().await {
                    Ok(presets) => Message::PresetsLoaded { presets },
                    Err(e) => Message::PresetsLoadFailed {
                        error: e.to_string(),
                    },
                };
                let _ = msg_tx.send(msg).await;
            });
        }

        UpdateAction::FetchRegistries => {
            tokio::spawn(async move {
                let result = async {
                    let registries = client.list_registries().await?;
                    let allowed = client.get_allowed_registries().await?;
                    Ok::<_, Error>((registries, allowed))
                }
                .await;
                let msg = match result {
                    Ok((registries, allowed_registries)) => Message::RegistriesLoaded {
                        registries,
                        allowed_registries,
                    },
                    Err(e) => Message::RegistriesLoadFailed {
                        error: e.to_string(),
                    },
                };
                let _ = msg_tx.send(msg).await;
            });
        }

        UpdateAction::FetchSummary => {
            tokio::spawn(async move {
                let result = async {
                    let counts = client.fetch_session_counts().await?;
                    let usage = client.fetch_cluster_usage().await?;
                    Ok::<_, Error>((counts, usage))
                }
                .await;
                let msg = match result {
                    Ok((counts, usage)) => Message::SummaryLoaded { counts, usage },
                    Err(e) => Message::SummaryLoadFailed {
                        error: e.to_string(),
                    },
                };
                let _ = msg_tx.send(msg).await;
            });
        }

        // ─────────────────────────────────────────────────────────
        // Mutations
        // ─────────────────────────────────────────────────────────
        UpdateAction::CreateKeypair(req) => {
            spawn_mutation(
                msg_tx,
                async move { client.create_keypair(&req).await },
                |outcome| Message::KeypairCreated { outcome },
            );
        }

        UpdateAction::ModifyKeypair { access_key, patch } => {
            let key = access_key.clone();
            spawn_mutation(
                msg_tx,
                async move { client.modify_keypair(&access_key, &patch).await },
                move |outcome| Message::KeypairModified {
                    access_key: key,
                    outcome,
                },
            );
        }

        UpdateAction::DeleteKeypair { access_key } => {
            let key = access_key.clone();
            spawn_mutation(
                msg_tx,
                async move { client.delete_keypair(&access_key).await },
                move |outcome| Message::KeypairDeleted {
                    access_key: key,
                    outcome,
                },
            );
        }

        UpdateAction::RegenerateKeypair { access_key } => {
            let key = access_key.clone();
            spawn_mutation(
                msg_tx,
                async move { client.regenerate_keypair(&access_key).await },
                move |outcome| Message::KeypairRegenerated {
                    access_key: key,
                    outcome,
                },
            );
        }

        UpdateAction::CreateUser(req) => {
            spawn_mutation(
                msg_tx,
                async move { client.create_user(&req).await },
                |outcome| Message::UserCreated { outcome },
            );
        }

        UpdateAction::ModifyUser { email, patch } => {
            let key = email.clone();
            spawn_mutation(
                msg_tx,
                async move { client.modify_user(&email, &patch).await },
                move |outcome| Message::UserModified {
                    email: key,
                    outcome,
                },
            );
        }

        UpdateAction::DeleteUser { email } => {
            let key = email.clone();
            spawn_mutation(
                msg_tx,
                async move { client.delete_user(&email).await },
                move |outcome| Message::UserDeleted {
                    email: key,
                    outcome,
                },
            );
        }

        UpdateAction::CreatePreset(payload) => {
            spawn_mutation(
                msg_tx,
                async move { client.create_preset(&payload).await },
                |outcome| Message::PresetCreated { outcome },
            );
        }

        UpdateAction::ModifyPreset { name, patch } => {
            let key = name.clone();
            spawn_mutation(
                msg_tx,
                async move { client.modify_preset(&name, &patch).await },
                move |outcome| Message::PresetModified { name: key, outcome },
            );
        }

        UpdateAction::DeletePreset { name } => {
            let key = name.clone();
            spawn_mutation(
                msg_tx,
                async move { client.delete_preset(&name).await },
                move |outcome| Message::PresetDeleted { name: key, outcome },
            );
        }

        UpdateAction::SetRegistry(payload) => {
            let hostname = payload.hostname.clone();
            spawn_mutation(
                msg_tx,
                async move { client.set_registry(&payload).await },
                move |outcome| Message::RegistrySaved { hostname, outcome },
            );
        }

        UpdateAction::DeleteRegistry { hostname } => {
            let key = hostname.clone();
            spawn_mutation(
                msg_tx,
                async move { client.delete_registry(&hostname).await },
                move |outcome| Message::RegistryDeleted {
                    hostname: key,
                    outcome,
                },
            );
        }

        UpdateAction::SetRegistryEnabled { hostname, enabled } => {
            let key = hostname.clone();
            spawn_mutation(
                msg_tx,
                async move { client.set_registry_enabled(&hostname, enabled).await },
                move |outcome| Message::RegistryEnablementChanged {
                    hostname: key,
                    enabled,
                    outcome,
                },
            );
        }

        UpdateAction::ModifyImageLimits { reference, limits } => {
            let key = reference.clone();
            spawn_mutation(
                msg_tx,
                async move { client.modify_image_resource_limits(&reference, &limits).await },
                move |outcome| Message::ImageLimitsModified {
                    reference: key,
                    outcome,
                },
            );
        }

        UpdateAction::ChangePassword { current, new } => {
            spawn_mutation(
                msg_tx,
                async move { client.change_password(&current, &new).await },
                |outcome| Message::PasswordChanged { outcome },
            );
        }

        UpdateAction::RescanImages { registry } => {
            tokio::spawn(async move {
                let task_id = match client.rescan_images(&registry).await {
                    Ok(task_id) => task_id,
                    Err(e) => {
                        let _ = msg_tx
                            .send(Message::RescanStartFailed {
                                error: e.to_string(),
                            })
                            .await;
                        return;
                    }
                };
                let _ = msg_tx
                    .send(Message::RescanStarted {
                        task_id: task_id.clone(),
                    })
                    .await;

                let mut stream = match client.attach_background_task(&task_id).await {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = msg_tx
                            .send(Message::RescanFinished {
                                result: RescanResult::Failed(e.to_string()),
                            })
                            .await;
                        return;
                    }
                };

                let mut finished = false;
                while let Some(event) = stream.recv().await {
                    let msg = match event {
                        BgTaskEvent::Updated { current, total } => {
                            Message::RescanProgress { current, total }
                        }
                        BgTaskEvent::Done => {
                            finished = true;
                            Message::RescanFinished {
                                result: RescanResult::Done,
                            }
                        }
                        BgTaskEvent::Failed { message } => {
                            finished = true;
                            Message::RescanFinished {
                                result: RescanResult::Failed(message),
                            }
                        }
                        BgTaskEvent::Cancelled => {
                            finished = true;
                            Message::RescanFinished {
                                result: RescanResult::Cancelled,
                            }
                        }
                    };
                    if msg_tx.send(msg).await.is_err() || finished {
                        return;
                    }
                }
                // The socket closed without a terminal event.
                let _ = msg_tx
                    .send(Message::RescanFinished {
                        result: RescanResult::Failed("progress stream ended".to_string()),
                    })
                    .await;
            });
        }

        UpdateAction::Publish(topic) => {
            ctx.bus.publish(topic);
        }

        UpdateAction::SavePreferences { settings } => {
            let config_path = ctx.config_path.clone();
            tokio::task::spawn_blocking(move || {
                let error = config::save_settings(&settings, config_path.as_deref())
                    .err()
                    .map(|e| e.to_string());
                let _ = msg_tx.blocking_send(Message::PreferencesSaved { error });
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admiral_client::test_utils::{test_keypair, test_policy, FakeClusterApi};

    fn ctx_with(client: Arc<dyn ClusterApi>) -> (ActionCtx, mpsc::Receiver<Message>) {
        let (msg_tx, msg_rx) = mpsc::channel(64);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        (
            ActionCtx {
                client,
                msg_tx,
                bus: EventBus::new(),
                shutdown_rx,
                config_path: None,
            },
            msg_rx,
        )
    }

    #[tokio::test]
    async fn test_fetch_credentials_chains_policies_then_keypairs() {
        let fake = Arc::new(
            FakeClusterApi::new()
                .with_policies(vec![test_policy("default")])
                .with_keypairs(vec![
                    test_keypair("AK1", "a@example.com", true),
                    test_keypair("AK2", "b@example.com", false),
                ]),
        );
        let (ctx, mut msg_rx) = ctx_with(fake.clone());

        handle_action(
            UpdateAction::FetchCredentials {
                is_active: true,
                include_main_keys: false,
            },
            &ctx,
        );

        let msg = msg_rx.recv().await.unwrap();
        match msg {
            Message::CredentialsLoaded {
                is_active,
                policies,
                keypairs,
                main_access_keys,
            } => {
                assert!(is_active);
                assert_eq!(policies.len(), 1);
                assert_eq!(keypairs.len(), 1);
                assert_eq!(keypairs[0].access_key, "AK1");
                assert!(main_access_keys.is_none());
            }
            other => panic!("unexpected message: {other:?}"),
        }

        // Chain ordering: policies fetched before keypairs
        let ops: Vec<String> = fake.calls().into_iter().map(|c| c.op).collect();
        let policy_idx = ops.iter().position(|o| o == "list_resource_policies");
        let keypair_idx = ops.iter().position(|o| o == "list_keypairs");
        assert!(policy_idx.unwrap() < keypair_idx.unwrap());
    }

    #[tokio::test]
    async fn test_fetch_failure_reports_load_failed() {
        let fake = Arc::new(FakeClusterApi::new());
        fake.fail_reads("connection refused");
        let (ctx, mut msg_rx) = ctx_with(fake);

        handle_action(UpdateAction::FetchUsers { statuses: vec![] }, &ctx);

        match msg_rx.recv().await.unwrap() {
            Message::UsersLoadFailed { error } => {
                assert!(error.contains("connection refused"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_mutation_transport_error_becomes_failed_outcome() {
        struct ExplodingApi;
        #[async_trait::async_trait]
        impl ClusterApi for ExplodingApi {
            async fn connect(&self) -> Result<admiral_client::ConnectInfo> {
                Err(Error::transport("boom"))
            }
            async fn list_resource_policies(
                &self,
            ) -> Result<Vec<admiral_core::ResourcePolicy>> {
                Err(Error::transport("boom"))
            }
            async fn list_keypairs(&self, _: bool) -> Result<Vec<admiral_core::KeypairRow>> {
                Err(Error::transport("boom"))
            }
            async fn list_main_access_keys(
                &self,
            ) -> Result<std::collections::HashMap<String, String>> {
                Err(Error::transport("boom"))
            }
            async fn list_users(
                &self,
                _: &[admiral_core::UserStatus],
            ) -> Result<Vec<admiral_core::UserRow>> {
                Err(Error::transport("boom"))
            }
            async fn get_allowed_registries(
                &self,
            ) -> Result<std::collections::HashSet<String>> {
                Err(Error::transport("boom"))
            }
            async fn list_images(&self) -> Result<Vec<admiral_core::ImageRow>> {
                Err(Error::transport("boom"))
            }
            async fn list_presets(&self) -> Result<Vec<admiral_core::ResourcePreset>> {
                Err(Error::transport("boom"))
            }
            async fn list_registries(&self) -> Result<Vec<admiral_core::RegistryRow>> {
                Err(Error::transport("boom"))
            }
            async fn fetch_session_counts(&self) -> Result<admiral_core::SessionCounts> {
                Err(Error::transport("boom"))
            }
            async fn fetch_cluster_usage(&self) -> Result<admiral_core::ClusterUsage> {
                Err(Error::transport("boom"))
            }
            async fn create_keypair(
                &self,
                _: &admiral_client::KeypairCreate,
            ) -> Result<MutationOutcome> {
                Err(Error::transport("boom"))
            }
            async fn modify_keypair(
                &self,
                _: &str,
                _: &admiral_client::JsonPatch,
            ) -> Result<MutationOutcome> {
                Err(Error::transport("boom"))
            }
            async fn delete_keypair(&self, _: &str) -> Result<MutationOutcome> {
                Err(Error::transport("boom"))
            }
            async fn regenerate_keypair(&self, _: &str) -> Result<MutationOutcome> {
                Err(Error::transport("boom"))
            }
            async fn create_user(
                &self,
                _: &admiral_client::UserCreate,
            ) -> Result<MutationOutcome> {
                Err(Error::transport("boom"))
            }
            async fn modify_user(
                &self,
                _: &str,
                _: &admiral_client::JsonPatch,
            ) -> Result<MutationOutcome> {
                Err(Error::transport("boom"))
            }
            async fn delete_user(&self, _: &str) -> Result<MutationOutcome> {
                Err(Error::transport("boom"))
            }
            async fn create_preset(
                &self,
                _: &admiral_client::PresetPayload,
            ) -> Result<MutationOutcome> {
                Err(Error::transport("boom"))
            }
            async fn modify_preset(
                &self,
                _: &str,
                _: &admiral_client::JsonPatch,
            ) -> Result<MutationOutcome> {
                Err(Error::transport("boom"))
            }
            async fn delete_preset(&self, _: &str) -> Result<MutationOutcome> {
                Err(Error::transport("boom"))
            }
            async fn set_registry(
                &self,
                _: &admiral_client::RegistryPayload,
            ) -> Result<MutationOutcome> {
                Err(Error::transport("boom"))
            }
            async fn delete_registry(&self, _: &str) -> Result<MutationOutcome> {
                Err(Error::transport("boom"))
            }
            async fn set_registry_enabled(&self, _: &str, _: bool) -> Result<MutationOutcome> {
                Err(Error::transport("boom"))
            }
            async fn modify_image_resource_limits(
                &self,
                _: &str,
                _: &[admiral_core::ResourceLimit],
            ) -> Result<MutationOutcome> {
                Err(Error::transport("boom"))
            }
            async fn change_password(&self, _: &str, _: &str) -> Result<MutationOutcome> {
                Err(Error::transport("boom"))
            }
            async fn rescan_images(&self, _: &str) -> Result<String> {
                Err(Error::transport("boom"))
            }
            async fn attach_background_task(
                &self,
            _: &str,
            ) -> Result<admiral_client::BgTaskStream> {
                Err(Error::transport("boom"))
            }
        }

        let (ctx, mut msg_rx) = ctx_with(Arc::new(ExplodingApi));
        handle_action(
            UpdateAction::DeleteKeypair {
                access_key: "AK1".to_string(),
            },
            &ctx,
        );
        match msg_rx.recv().await.unwrap() {
            Message::KeypairDeleted { outcome, .. } => {
                assert!(!outcome.ok);
                assert!(outcome.msg.unwrap().contains("boom"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rescan_forwards_progress_and_completion() {
        let fake = Arc::new(FakeClusterApi::new().with_bgtask_events(vec![
            BgTaskEvent::Updated {
                current: 2,
                total: 5,
            },
            BgTaskEvent::Done,
        ]));
        let (ctx, mut msg_rx) = ctx_with(fake);

        handle_action(
            UpdateAction::RescanImages {
                registry: "cr.example.io".to_string(),
            },
            &ctx,
        );

        assert!(matches!(
            msg_rx.recv().await.unwrap(),
            Message::RescanStarted { .. }
        ));
        assert!(matches!(
            msg_rx.recv().await.unwrap(),
            Message::RescanProgress {
                current: 2,
                total: 5
            }
        ));
        assert!(matches!(
            msg_rx.recv().await.unwrap(),
            Message::RescanFinished {
                result: RescanResult::Done
            }
        ));
    }
}
