// New member greeting: a line in the welcome channel and a direct message.

use crate::core::config::BotConfig;
use crate::core::platform::{mention, Platform};

pub const WELCOME_DM: &str = "Welcome aboard! If you have any questions, feel free to ask.";

/// Greet a member who just joined. Each step is attempted on its own; a
/// failure is logged and the other step still runs.
pub async fn greet_member(platform: &dyn Platform, config: &BotConfig, user_id: u64) {
    if let Some(channel_id) = config.welcome_channel_id {
        let line = format!("Welcome {} to the server!", mention(user_id));
        if let Err(e) = platform.send_message(channel_id, &line).await {
            tracing::warn!(user_id, channel_id, "Failed to post welcome: {}", e);
        }
    }

    if let Err(e) = platform.send_direct_message(user_id, WELCOME_DM).await {
        tracing::warn!(user_id, "Failed to send welcome DM: {}", e);
    }
}
