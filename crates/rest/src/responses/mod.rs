//! Response bodies for the movie routes.

mod delete;
mod list;

pub use delete::DeleteResponse;
pub use list::{MovieListResponse, PaginationMeta};
