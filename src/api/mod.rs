mod handlers;
mod routes;
mod state;
mod trace;

pub use handlers::{IngredientsRequest, RecommendationResponse, NO_RECOMMENDATIONS};
pub use routes::create_router;
pub use state::AppState;
