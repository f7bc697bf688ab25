/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

mod details;
mod options;

pub use self::details::{Connection, DEFAULT_DOMAIN};
pub use self::options::{
    DEFAULT_MAX_LINE_BUFFER_SIZE, DEFAULT_RECONNECT_DELAY, INITIAL_LINE_BUFFER_SIZE,
    StreamOptions,
};
