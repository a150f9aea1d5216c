//! Engine - shared orchestration state for the TUI runner
//!
//! The Engine owns the TEA state, the unified message channel, the API
//! client handle, the event bus, the shutdown signal, and the summary
//! poller. Frontends drain messages, feed them through
//! [`Engine::process_message`], and render from [`Engine::state`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use admiral_client::ClusterApi;
use admiral_core::prelude::*;

use crate::bus::EventBus;
use crate::config::Settings;
use crate::handler;
use crate::message::Message;
use crate::poll::PeriodicTask;
use crate::process::{self, ActionCtx};
use crate::state::{AppState, View};

/// Capacity of the unified message channel.
const MSG_BUFFER: usize = 256;

/// Orchestration engine for Admiral.
pub struct Engine {
    /// TEA application state (the Model)
    pub state: AppState,

    /// Sender half of the unified message channel.
    /// Clone this to give to input sources.
    pub msg_tx: mpsc::Sender<Message>,

    /// Receiver half of the unified message channel.
    /// The frontend event loop drains messages from here.
    msg_rx: mpsc::Receiver<Message>,

    client: Arc<dyn ClusterApi>,

    bus: EventBus,

    /// Sender for the shutdown signal. Send `true` to initiate shutdown.
    pub shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,

    /// Fixed-cadence poller behind the summary view.
    summary_poll: PeriodicTask,

    config_path: Option<PathBuf>,
}

impl Engine {
    /// Create a new Engine. Must be called within a tokio runtime: it
    /// spawns the bus forwarder and the summary poller.
    pub fn new(
        client: Arc<dyn ClusterApi>,
        settings: Settings,
        config_path: Option<PathBuf>,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel(MSG_BUFFER);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let bus = EventBus::new();

        // Forward bus topics into the message loop so views hear about
        // data changed by their siblings.
        let mut topic_rx = bus.subscribe();
        let forward_tx = msg_tx.clone();
        tokio::spawn(async move {
            while let Ok(topic) = topic_rx.recv().await {
                if forward_tx.send(Message::DataChanged(topic)).await.is_err() {
                    break;
                }
            }
        });

        let summary_poll = PeriodicTask::start(
            Duration::from_secs(settings.polling.summary_interval_secs.max(1)),
            msg_tx.clone(),
            || Message::SummaryPollTick,
            shutdown_rx.clone(),
        );

        Self {
            state: AppState::new(settings),
            msg_tx,
            msg_rx,
            client,
            bus,
            shutdown_tx,
            shutdown_rx,
            summary_poll,
            config_path,
        }
    }

    fn ctx(&self) -> ActionCtx {
        ActionCtx {
            client: self.client.clone(),
            msg_tx: self.msg_tx.clone(),
            bus: self.bus.clone(),
            shutdown_rx: self.shutdown_rx.clone(),
            config_path: self.config_path.clone(),
        }
    }

    /// Kick off the connect task. The readiness notification arrives as
    /// `Message::ClientConnected`; until then views defer their refresh.
    pub fn start(&self) {
        info!("starting connect task");
        process::handle_action(handler::UpdateAction::Connect, &self.ctx());
    }

    /// Await the next message.
    pub async fn recv(&mut self) -> Option<Message> {
        self.msg_rx.recv().await
    }

    /// Non-blocking drain for the render loop.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.msg_rx.try_recv().ok()
    }

    /// Process a message through the TEA update loop, dispatching any
    /// side-effect actions and follow-up messages.
    pub fn process_message(&mut self, message: Message) {
        let ctx = self.ctx();
        let mut msg = Some(message);
        while let Some(m) = msg {
            let result = handler::update(&mut self.state, m);
            if let Some(action) = result.action {
                process::handle_action(action, &ctx);
            }
            msg = result.message;
        }

        // The poller's active predicate tracks the current view; an
        // inactive summary view stops rescheduling itself.
        self.summary_poll
            .set_active(self.state.view == View::Summary && self.state.connected);
    }

    pub fn should_quit(&self) -> bool {
        self.state.should_quit()
    }

    /// Signal background tasks to stop.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admiral_client::test_utils::{test_keypair, test_policy, FakeClusterApi};

    fn engine_with(fake: Arc<FakeClusterApi>) -> Engine {
        Engine::new(fake, Settings::default(), None)
    }

    #[tokio::test]
    async fn test_connect_then_gated_refresh() {
        let fake = Arc::new(
            FakeClusterApi::new()
                .with_policies(vec![test_policy("default")])
                .with_keypairs(vec![test_keypair("AK1", "a@example.com", true)]),
        );
        let mut engine = engine_with(fake.clone());

        // Navigating before readiness defers the refresh
        engine.process_message(Message::Navigate(View::Credentials));
        assert_eq!(fake.call_count("list_keypairs"), 0);

        engine.start();
        let msg = engine.recv().await.unwrap();
        assert!(matches!(msg, Message::ClientConnected { .. }));
        engine.process_message(msg);
        assert!(engine.state.connected);

        // The gate re-ran the refresh for the current view
        let mut saw_loaded = false;
        for _ in 0..4 {
            let Some(msg) = engine.recv().await else { break };
            if matches!(msg, Message::CredentialsLoaded { is_active: true, .. }) {
                saw_loaded = true;
            }
            engine.process_message(msg);
            if saw_loaded {
                break;
            }
        }
        assert!(saw_loaded);
        assert_eq!(engine.state.credentials.active.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_publish_topic_round_trips_through_bus() {
        let fake = Arc::new(FakeClusterApi::new());
        let mut engine = engine_with(fake);
        engine.state.connected = true;
        engine.state.view = View::Users;

        process::handle_action(
            handler::UpdateAction::Publish(admiral_core::DataTopic::Credentials),
            &engine.ctx(),
        );

        let msg = engine.recv().await.unwrap();
        assert!(matches!(
            msg,
            Message::DataChanged(admiral_core::DataTopic::Credentials)
        ));
        engine.process_message(msg);
        // The credentials view was inactive, so it was marked stale
        assert!(engine.state.stale.contains(&View::Credentials));
    }
}
