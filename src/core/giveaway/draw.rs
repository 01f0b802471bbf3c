// Pure helpers for giveaways: duration strings and winner sampling.

use rand::Rng;
use std::collections::HashSet;
use std::time::Duration;

use crate::core::platform::Reactor;

/// Parse a compact duration like `30s`, `5m`, `2h` or `1d`.
///
/// The whole string must be digits followed by one unit. Anything else,
/// including a bare number, is `None`.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    let unit = input.chars().last()?;
    let multiplier_ms: u64 = match unit {
        's' => 1_000,
        'm' => 60 * 1_000,
        'h' => 60 * 60 * 1_000,
        'd' => 24 * 60 * 60 * 1_000,
        _ => return None,
    };

    let digits = &input[..input.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let amount: u64 = digits.parse().ok()?;
    amount.checked_mul(multiplier_ms).map(Duration::from_millis)
}

/// Distinct human participants, in first-seen order.
pub fn eligible_participants(reactors: &[Reactor]) -> Vec<u64> {
    let mut seen = HashSet::new();
    reactors
        .iter()
        .filter(|r| !r.bot)
        .filter(|r| seen.insert(r.user_id))
        .map(|r| r.user_id)
        .collect()
}

/// Draw `min(count, participants.len())` winners without replacement.
///
/// Each pick takes a uniformly random index from the remaining pool and
/// removes it, so nobody can win twice.
pub fn sample_winners<R: Rng + ?Sized>(
    mut participants: Vec<u64>,
    count: usize,
    rng: &mut R,
) -> Vec<u64> {
    let picks = count.min(participants.len());
    let mut winners = Vec::with_capacity(picks);
    for _ in 0..picks {
        let index = rng.gen_range(0..participants.len());
        winners.push(participants.remove(index));
    }
    winners
}
