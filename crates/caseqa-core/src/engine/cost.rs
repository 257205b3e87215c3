//! Query cost estimate
//!
//! This is an approximation, not a billing figure. Token counts are guessed
//! from character counts instead of running the provider's tokenizer.

use crate::config::PricingConfig;

/// Assumed tokens per character, for both prompt and answer
pub const TOKENS_PER_CHAR: f64 = 1.5;

/// Approximate token count of `text`
pub fn approximate_tokens(text: &str) -> f64 {
    text.chars().count() as f64 * TOKENS_PER_CHAR
}

/// Estimated cost in USD of sending `input` and receiving `output`
pub fn estimate_cost(input: &str, output: &str, pricing: &PricingConfig) -> f64 {
    let input_tokens = approximate_tokens(input);
    let output_tokens = approximate_tokens(output);

    input_tokens / 1_000_000.0 * pricing.input_price
        + output_tokens / 1_000_000.0 * pricing.output_price
}
