mod product;
mod product_query;
mod user;

pub use product::*;
pub use product_query::*;
pub use user::*;
