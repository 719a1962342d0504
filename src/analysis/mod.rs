pub mod analyzer;
pub mod categorize;
pub mod features;
pub mod rate;
pub mod traits;
