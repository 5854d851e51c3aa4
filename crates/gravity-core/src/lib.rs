pub mod constants;
pub mod error;
pub mod model;
pub mod validator;

pub use constants::*;
pub use error::GravityError;
pub use model::*;
pub use validator::*;
