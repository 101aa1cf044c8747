use std::collections::HashMap;

use rand::Rng;
use strum::IntoEnumIterator;

use crate::core::houses::House;

/// Picks the house a new registrant should join.
///
/// Houses missing from `counts` count as zero, so an empty snapshot (for
/// example after a failed fetch) degrades to a uniform draw over all four
/// houses instead of blocking the registration. Ties at the minimum are
/// broken uniformly at random.
pub fn select_house(counts: &HashMap<House, u64>) -> House {
    select_house_with(counts, &mut rand::rng())
}

/// Same as [`select_house`] with an injected random source, for callers
/// that need deterministic draws.
pub fn select_house_with<R: Rng + ?Sized>(counts: &HashMap<House, u64>, rng: &mut R) -> House {
    let count_of = |house: &House| counts.get(house).copied().unwrap_or(0);

    let min_count = House::iter().map(|h| count_of(&h)).min().unwrap_or(0);
    let eligible: Vec<House> = House::iter().filter(|h| count_of(h) == min_count).collect();

    // The house set is fixed and non-empty, so `eligible` never is.
    eligible[rng.random_range(0..eligible.len())]
}
