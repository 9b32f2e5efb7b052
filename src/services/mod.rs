pub mod matrix;
pub mod recommendations;
pub mod sources;

pub use matrix::CoPurchaseMatrix;
pub use recommendations::RecommendationService;
