//! Personalized donor message.

use donorpath_core::rng::DeterministicRng;

use crate::estimator::ImpactEstimate;

const TEMPLATE_COUNT: usize = 3;

/// Phrases an estimate for the donor, choosing one of three templates
/// through `rng`.
pub fn personalized_message(estimate: &ImpactEstimate, rng: &mut dyn DeterministicRng) -> String {
    let name = &estimate.donor_name;
    let amount = format_amount(estimate.amount);
    let location = &estimate.location;

    match rng.pick_index(TEMPLATE_COUNT) {
        0 => format!(
            "{name}, your generous donation of ${amount} will transform lives in {location}. {} \
             You're not just funding education, you're breaking cycles of poverty and opening \
             doors to limitless possibilities.",
            estimate.narrative
        ),
        1 => format!(
            "Dear {name}, with your ${amount} contribution, you're becoming a hero in the story \
             of Kenyan education. Your support will provide {} months of educational \
             opportunities in {location}, creating ripple effects that will benefit entire \
             communities for generations.",
            estimate.months
        ),
        _ => format!(
            "{name}, imagine the moment a student receives their diploma, knowing that your \
             ${amount} donation made it possible. In {location}, your generosity will {} This \
             is the power of education, and the power of your compassion.",
            lowercase_first(&estimate.narrative)
        ),
    }
}

/// Whole-dollar amounts print without decimals.
fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
