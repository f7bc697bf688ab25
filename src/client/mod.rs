/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

mod codec;
mod cycle;
mod implementation;
mod model;
mod request;

pub use implementation::StreamClient;
pub use model::{ClientStatus, StreamEvent, StreamEvents};
