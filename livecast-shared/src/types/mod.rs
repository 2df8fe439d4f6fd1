pub mod api;
pub mod pagination;

pub use api::{ApiResponse, ApiErrorResponse, HealthResponse};
pub use pagination::{Paginated, PaginationParams};
