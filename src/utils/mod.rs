/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

/// Module containing custom error types used throughout the library.
///
/// This module provides the error reported by each stream cycle and the error
/// returned when an option is given an unusable value.
pub mod error;
mod util;

mod logger;

pub use error::{ConfigError, StreamError};
pub use logger::{setup_logger, setup_logger_with_level};
pub use util::{mask_secret, setup_signal_hook};
