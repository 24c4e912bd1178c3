//! Pure functions over loaded collections: filtering, visibility,
//! aggregation, punctuality, spreadsheet layouts and form validation.

pub mod aggregation;
pub mod export;
pub mod filters;
pub mod import;
pub mod punctuality;
pub mod validation;
pub mod visibility;

/// Rounds like a spreadsheet does for positive values: halves go up.
pub(crate) fn round_percent(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}
