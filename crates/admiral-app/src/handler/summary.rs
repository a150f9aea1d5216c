//! Summary dashboard: session counts and cluster resource aggregation
//!
//! The only self-polling view. The periodic task fires `SummaryPollTick`
//! while the view is active; an inactive view simply stops receiving
//! ticks (cooperative cancellation). No backoff on failure: the next tick
//! retries on the same fixed cadence.

use chrono::Utc;

use admiral_core::prelude::*;
use admiral_core::{ClusterUsage, ListCondition, SessionCounts};

use crate::state::{AppState, View};

use super::{UpdateAction, UpdateResult};

pub fn refresh(state: &mut AppState) -> UpdateResult {
    if state.summary.counts.is_none() {
        state.summary.condition = ListCondition::Loading;
    }
    UpdateResult::action(UpdateAction::FetchSummary)
}

pub fn handle_loaded(
    state: &mut AppState,
    counts: SessionCounts,
    usage: ClusterUsage,
) -> UpdateResult {
    state.summary.counts = Some(counts);
    state.summary.usage = Some(usage);
    state.summary.condition = ListCondition::Loaded;
    state.summary.last_refreshed = Some(Utc::now());
    UpdateResult::none()
}

pub fn handle_load_failed(state: &mut AppState, error: String) -> UpdateResult {
    error!(%error, "summary refresh failed");
    state.summary.condition = if state.summary.counts.is_some() {
        ListCondition::Loaded
    } else {
        ListCondition::NoData
    };
    state.toasts.error("Unable to fetch cluster summary", error);
    UpdateResult::none()
}

/// A poll tick re-fetches silently (no loading flicker), but only while
/// the summary view is still the active one and the client is connected.
pub fn handle_poll_tick(state: &mut AppState) -> UpdateResult {
    if state.view == View::Summary && state.connected {
        UpdateResult::action(UpdateAction::FetchSummary)
    } else {
        UpdateResult::none()
    }
}
