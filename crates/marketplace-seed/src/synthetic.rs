//! Synthetic field values drawn from the run RNG.
//!
//! All helpers take the run's `ChaCha8Rng` so that a configured seed
//! reproduces the whole snapshot.

use chrono::{DateTime, TimeDelta, Utc};
use fake::Fake;
use fake::faker::internet::raw::{Password, SafeEmail};
use fake::faker::lorem::raw::Sentences;
use fake::faker::name::raw::FirstName;
use fake::faker::phone_number::raw::PhoneNumber;
use fake::locales::EN;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand_chacha::ChaCha8Rng;

/// Lowest generated price, in cents.
pub(crate) const PRICE_MIN_CENTS: i32 = 1_000;

/// Highest generated price, in cents.
pub(crate) const PRICE_MAX_CENTS: i32 = 100_000;

const SECONDS_PER_DAY: i64 = 86_400;

const TITLE_ADJECTIVES: [&str; 12] = [
    "Handcrafted",
    "Rustic",
    "Sleek",
    "Ergonomic",
    "Refined",
    "Practical",
    "Elegant",
    "Vintage",
    "Compact",
    "Gorgeous",
    "Modern",
    "Sturdy",
];

const TITLE_MATERIALS: [&str; 10] = [
    "Wooden", "Steel", "Cotton", "Leather", "Granite", "Bamboo", "Ceramic", "Plastic", "Wool",
    "Bronze",
];

const TITLE_NOUNS: [&str; 12] = [
    "Chair", "Lamp", "Table", "Bicycle", "Keyboard", "Jacket", "Blender", "Sofa", "Helmet",
    "Backpack", "Watch", "Guitar",
];

/// Draws a commerce-style product title such as `"Rustic Steel Lamp"`.
pub(crate) fn product_title(rng: &mut ChaCha8Rng) -> String {
    let adjective = pick_word(rng, &TITLE_ADJECTIVES);
    let material = pick_word(rng, &TITLE_MATERIALS);
    let noun = pick_word(rng, &TITLE_NOUNS);
    format!("{adjective} {material} {noun}")
}

fn pick_word(rng: &mut ChaCha8Rng, words: &[&'static str]) -> &'static str {
    words.choose(rng).copied().unwrap_or_default()
}

/// Draws a short multi-sentence product description.
pub(crate) fn product_description(rng: &mut ChaCha8Rng) -> String {
    let sentences: Vec<String> = Sentences(EN, 2..4).fake_with_rng(rng);
    sentences.join(" ")
}

/// Draws a price in `[PRICE_MIN_CENTS, PRICE_MAX_CENTS]`.
pub(crate) fn price_in_cents(rng: &mut ChaCha8Rng) -> i32 {
    rng.random_range(PRICE_MIN_CENTS..=PRICE_MAX_CENTS)
}

/// Draws a first name.
pub(crate) fn person_name(rng: &mut ChaCha8Rng) -> String {
    FirstName(EN).fake_with_rng(rng)
}

/// Draws an e-mail address on a reserved example domain.
pub(crate) fn email(rng: &mut ChaCha8Rng) -> String {
    SafeEmail(EN).fake_with_rng(rng)
}

/// Draws a plain-text password.
pub(crate) fn password(rng: &mut ChaCha8Rng) -> String {
    Password(EN, 8..16).fake_with_rng(rng)
}

/// Draws a phone number.
pub(crate) fn phone(rng: &mut ChaCha8Rng) -> String {
    PhoneNumber(EN).fake_with_rng(rng)
}

/// Draws an instant uniformly within the `days` before `now`.
pub(crate) fn recent_timestamp(
    rng: &mut ChaCha8Rng,
    now: DateTime<Utc>,
    days: u32,
) -> DateTime<Utc> {
    let window = i64::from(days) * SECONDS_PER_DAY;
    let offset = rng.random_range(0..=window);
    now - TimeDelta::seconds(offset)
}

/// Selects a random subset of distinct items.
///
/// The subset size is uniform in `[min_count, items.len()]`, with `min_count`
/// clamped to the number of items available. Items never repeat.
pub(crate) fn select_subset<T: Clone>(
    rng: &mut ChaCha8Rng,
    items: &[T],
    min_count: usize,
) -> Vec<T> {
    if items.is_empty() {
        return Vec::new();
    }

    let clamped_min = min_count.min(items.len());
    let count = rng.random_range(clamped_min..=items.len());

    let mut shuffled = items.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(count);
    shuffled
}
