pub mod auth;
pub mod create;

pub use create::CreateContext;
