pub mod product_listing;
pub mod product_queries;
pub mod user_queries;

pub use product_listing::{BASE_ORDERING, PageWindow, ProductFilter, ProductListing};
