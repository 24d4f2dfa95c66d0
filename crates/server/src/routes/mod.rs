// HTTP routes
pub mod domains;
pub mod health;
pub mod resources;
pub mod search;

pub use domains::*;
pub use health::*;
pub use resources::*;
pub use search::*;
