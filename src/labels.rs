//! Bidirectional mapping between city names and class codes.
//!
//! The four literals (spelling and capitalization included) are part of the
//! prediction output contract.

/// Destination cities, indexed by class code.
pub const CITIES: [&str; 4] = ["Dubai", "Rio de Janeiro", "New York City", "Paris"];

/// Maps a city name to its class code in `0..=3`.
///
/// Unrecognized names fall back to the last code (Paris). This is defined,
/// permissive behavior rather than an error.
pub fn encode_label(name: &str) -> i64 {
    match name {
        "Dubai" => 0,
        "Rio de Janeiro" => 1,
        "New York City" => 2,
        _ => 3,
    }
}

/// Maps a class code back to its city name.
///
/// Total function: codes outside `0..=2` all decode to Paris, mirroring the
/// [`encode_label`] fallback.
pub fn decode_label(code: i64) -> &'static str {
    match code {
        0 => CITIES[0],
        1 => CITIES[1],
        2 => CITIES[2],
        _ => CITIES[3],
    }
}
