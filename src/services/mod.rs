pub mod error_classifier;
pub mod images;
pub mod personalization;
pub mod prompt;
pub mod providers;
pub mod recommendations;
pub mod sanitizer;

pub use images::ImageSynthesizer;
pub use recommendations::RecommendationService;
