mod categories;
mod classify;
mod explain;
mod util;

pub use categories::Categories;
pub use classify::Classify;
pub use explain::Explain;
