// Giveaway scheduler - one delayed draw per announcement.
//
// Starting a giveaway posts the announcement, seeds the entry reaction and
// arms a timer task. When the timer fires we read the reactions as they are
// *then*, not as they were when the giveaway started.
//
// Each active giveaway is tracked by its announcement id together with the
// timer's abort handle. Whoever removes the entry first (timer, `end_now` or
// `cancel`) owns the outcome, so a giveaway is drawn at most once.

use super::draw::{eligible_participants, sample_winners};
use crate::core::platform::{mention, Platform, PlatformError};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;

/// Reaction users click to enter.
pub const ENTRY_EMOJI: &str = "🎉";

// ============================================================================
// DOMAIN MODELS
// ============================================================================

/// What the `giveaway` command asks for.
#[derive(Debug, Clone)]
pub struct GiveawayRequest {
    pub channel_id: u64,
    pub duration: Duration,
    /// The duration as the host typed it, for the announcement.
    pub duration_label: String,
    pub winner_count: u32,
    pub prize: String,
}

/// A giveaway waiting for its draw. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiveawayState {
    pub channel_id: u64,
    pub message_id: u64,
    pub prize: String,
    pub winner_count: u32,
    pub fire_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    NoParticipants,
    Winners(Vec<u64>),
}

#[derive(Debug, Error)]
pub enum GiveawayError {
    #[error("Giveaway duration is out of range")]
    InvalidDuration,

    #[error("No active giveaway for message {0}")]
    NotFound(u64),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

struct ActiveGiveaway {
    state: GiveawayState,
    timer: AbortHandle,
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct GiveawayScheduler {
    platform: Arc<dyn Platform>,
    active: Arc<DashMap<u64, ActiveGiveaway>>,
}

impl GiveawayScheduler {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self {
            platform,
            active: Arc::new(DashMap::new()),
        }
    }

    /// Announce a giveaway and arm its draw timer.
    pub async fn start(&self, request: GiveawayRequest) -> Result<GiveawayState, GiveawayError> {
        let fire_at = chrono::Duration::from_std(request.duration)
            .ok()
            .and_then(|delay| Utc::now().checked_add_signed(delay))
            .ok_or(GiveawayError::InvalidDuration)?;

        let announcement = self
            .platform
            .send_message(request.channel_id, &announcement_text(&request))
            .await?;
        self.platform
            .react(request.channel_id, announcement.id, ENTRY_EMOJI)
            .await?;

        let state = GiveawayState {
            channel_id: request.channel_id,
            message_id: announcement.id,
            prize: request.prize,
            winner_count: request.winner_count,
            fire_at,
        };

        // The task waits until it is registered, otherwise a zero delay could
        // fire before the entry exists and leave a stale handle behind.
        let (armed_tx, armed_rx) = oneshot::channel::<()>();
        let platform = Arc::clone(&self.platform);
        let active = Arc::clone(&self.active);
        let message_id = state.message_id;
        let delay = request.duration;
        let task = tokio::spawn(async move {
            if armed_rx.await.is_err() {
                return;
            }
            tokio::time::sleep(delay).await;

            if let Some((_, giveaway)) = active.remove(&message_id) {
                let outcome = run_draw(platform.as_ref(), &giveaway.state).await;
                tracing::info!(message_id, ?outcome, "Giveaway timer fired");
            }
        });

        let entry = ActiveGiveaway {
            state: state.clone(),
            timer: task.abort_handle(),
        };
        self.active.insert(state.message_id, entry);
        let _ = armed_tx.send(());

        tracing::info!(
            message_id = state.message_id,
            channel_id = state.channel_id,
            winners = state.winner_count,
            fire_at = %state.fire_at,
            "Giveaway started"
        );
        Ok(state)
    }

    /// Draw an active giveaway right away instead of waiting for its timer.
    pub async fn end_now(&self, message_id: u64) -> Result<Option<DrawOutcome>, GiveawayError> {
        let (_, giveaway) = self
            .active
            .remove(&message_id)
            .ok_or(GiveawayError::NotFound(message_id))?;
        giveaway.timer.abort();

        Ok(run_draw(self.platform.as_ref(), &giveaway.state).await)
    }

    /// Stop an active giveaway without drawing.
    pub async fn cancel(&self, message_id: u64) -> Result<GiveawayState, GiveawayError> {
        let (_, giveaway) = self
            .active
            .remove(&message_id)
            .ok_or(GiveawayError::NotFound(message_id))?;
        giveaway.timer.abort();

        let notice = format!(
            "The giveaway for **{}** was cancelled.",
            giveaway.state.prize
        );
        self.platform
            .send_message(giveaway.state.channel_id, &notice)
            .await?;
        Ok(giveaway.state)
    }

    /// Snapshot of the giveaways still waiting for a draw.
    #[cfg(test)]
    pub fn active(&self) -> Vec<GiveawayState> {
        self.active
            .iter()
            .map(|entry| entry.value().state.clone())
            .collect()
    }
}

fn announcement_text(request: &GiveawayRequest) -> String {
    format!(
        "🎉 **GIVEAWAY!** 🎉\nPrize: {}\nDuration: {}\nWinners: {}\nReact with {} to enter!",
        request.prize, request.duration_label, request.winner_count, ENTRY_EMOJI
    )
}

/// Read the current entrants and pick winners.
pub async fn draw(
    platform: &dyn Platform,
    state: &GiveawayState,
) -> Result<DrawOutcome, PlatformError> {
    let reactors = platform
        .fetch_reactors(state.channel_id, state.message_id, ENTRY_EMOJI)
        .await?;
    let participants = eligible_participants(&reactors);
    if participants.is_empty() {
        return Ok(DrawOutcome::NoParticipants);
    }

    let winners = sample_winners(
        participants,
        state.winner_count as usize,
        &mut rand::thread_rng(),
    );
    Ok(DrawOutcome::Winners(winners))
}

/// Draw and announce the result. Failures are logged and reported in the
/// giveaway channel; they never escape the timer task.
async fn run_draw(platform: &dyn Platform, state: &GiveawayState) -> Option<DrawOutcome> {
    let outcome = match draw(platform, state).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(
                message_id = state.message_id,
                "Failed to draw giveaway: {}",
                e
            );
            let notice = format!(
                "Couldn't draw the giveaway for **{}**. Was the announcement deleted?",
                state.prize
            );
            if let Err(e) = platform.send_message(state.channel_id, &notice).await {
                tracing::warn!("Failed to report giveaway failure: {}", e);
            }
            return None;
        }
    };

    let content = match &outcome {
        DrawOutcome::NoParticipants => "No one entered the giveaway.".to_string(),
        DrawOutcome::Winners(winners) => format!(
            "Congratulations {}! You won **{}**!",
            winners
                .iter()
                .map(|id| mention(*id))
                .collect::<Vec<_>>()
                .join(", "),
            state.prize
        ),
    };
    if let Err(e) = platform.send_message(state.channel_id, &content).await {
        tracing::error!(
            message_id = state.message_id,
            "Failed to announce giveaway result: {}",
            e
        );
    }
    Some(outcome)
}
