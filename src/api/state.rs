use crate::services::RecommendationService;

/// Shared application state
///
/// The recommendation service is internally reference-counted, so cloning
/// the state per request hands every handler the same published matrix.
#[derive(Clone)]
pub struct AppState {
    pub recommendations: RecommendationService,
}

impl AppState {
    pub fn new(recommendations: RecommendationService) -> Self {
        Self { recommendations }
    }
}
