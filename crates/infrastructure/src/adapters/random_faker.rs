//! Random free text for request payloads.

use covenant_application::Faker;
use rand::Rng;

const WORDS: &[&str] = &[
    "a", "bug", "compiler", "developer", "coffee", "keyboard", "semicolon", "walks", "into",
    "bar", "the", "stack", "overflow", "recursion", "null", "pointer", "deploys", "friday",
    "production", "merge", "conflict", "tabs", "spaces", "again", "never", "works", "locally",
    "cache", "invalidation", "naming", "things", "off", "by", "one",
];

/// [`Faker`] backed by the thread-local `rand` generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomFaker;

impl RandomFaker {
    /// Creates a faker.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns `count` random words separated by spaces.
    #[must_use]
    pub fn words(&self, count: usize) -> String {
        let mut rng = rand::rng();
        (0..count)
            .map(|_| WORDS[rng.random_range(0..WORDS.len())])
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Faker for RandomFaker {
    /// Six to twelve words, capitalized, ending with a period.
    fn sentence(&self) -> String {
        let count = rand::rng().random_range(6..=12);
        let words = self.words(count);
        let mut chars = words.chars();
        chars.next().map_or_else(String::new, |first| {
            format!("{}{}.", first.to_uppercase(), chars.as_str())
        })
    }
}
