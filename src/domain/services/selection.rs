//! Selection helpers over the caller-owned emote pool.

use rand::Rng;

use crate::domain::entities::Emote;
use crate::domain::errors::EmoteError;

/// Maximum number of suggestions returned by [`filter_emotes`].
const MAX_SUGGESTIONS: usize = 10;

/// Picks a uniformly random emote from the pool.
///
/// # Errors
/// Returns [`EmoteError::EmptyPool`] when the pool has no elements.
pub fn pick_random(pool: &[Emote]) -> Result<&Emote, EmoteError> {
    if pool.is_empty() {
        return Err(EmoteError::EmptyPool);
    }
    let index = rand::thread_rng().gen_range(0..pool.len());
    Ok(&pool[index])
}

/// Removes `current` from the pool by swapping with the last element.
///
/// O(1) and order-destroying on purpose; downstream random selection
/// assumes no ordering guarantee. Returns whether an element was removed.
pub fn swap_remove_emote(pool: &mut Vec<Emote>, current: &Emote) -> bool {
    match pool.iter().position(|emote| emote == current) {
        Some(index) => {
            pool.swap_remove(index);
            true
        }
        None => false,
    }
}

/// Removes `name` from the name list by swapping with the last element.
///
/// Returns whether an element was removed.
pub fn swap_remove_name(names: &mut Vec<String>, name: &str) -> bool {
    match names.iter().position(|candidate| candidate == name) {
        Some(index) => {
            names.swap_remove(index);
            true
        }
        None => false,
    }
}

/// Filters the pool by case-insensitive substring match on the name.
///
/// Empty input returns the head of the pool rather than everything; both
/// paths cap at ten suggestions.
#[must_use]
pub fn filter_emotes(pool: &[Emote], input: &str) -> Vec<Emote> {
    if input.is_empty() {
        return pool.iter().take(MAX_SUGGESTIONS).cloned().collect();
    }

    let needle = input.to_lowercase();
    pool.iter()
        .filter(|emote| emote.name.to_lowercase().contains(&needle))
        .take(MAX_SUGGESTIONS)
        .cloned()
        .collect()
}
