use crate::core::leveling::LevelUpEvent;
use crate::core::platform::{mention, Platform, PlatformError};
use rand::seq::SliceRandom;

/// Congratulate a user in the channel where they leveled up.
pub async fn announce_level_up(
    platform: &dyn Platform,
    channel_id: u64,
    level_up: &LevelUpEvent,
) -> Result<(), PlatformError> {
    platform
        .send_message(channel_id, &level_up_text(level_up, random_flavor_line()))
        .await
        .map(|_| ())
}

fn level_up_text(level_up: &LevelUpEvent, flavor: &str) -> String {
    format!(
        "{} congratulations, you reached level {}! {}",
        mention(level_up.user_id),
        level_up.new_level,
        flavor
    )
}

fn random_flavor_line() -> &'static str {
    const FLAVOR_LINES: [&str; 4] = [
        "Keep the streak going!",
        "Your grind is paying off.",
        "Another level, another flex.",
        "That XP bar never stood a chance.",
    ];

    FLAVOR_LINES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FLAVOR_LINES[0])
}
