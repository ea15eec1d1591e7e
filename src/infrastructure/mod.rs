pub mod logging;

pub use logging::{init_logging, level_from_verbosity, LOG_DIR_ENV};
