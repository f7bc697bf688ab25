/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Command-line client: prints every feed line to stdout and every error to stderr,
//! until interrupted.

use clap::Parser;
use feed_stream_rs::client::{StreamClient, StreamEvent};
use feed_stream_rs::connection::{
    Connection, DEFAULT_DOMAIN, DEFAULT_MAX_LINE_BUFFER_SIZE, DEFAULT_RECONNECT_DELAY,
    StreamOptions,
};
use feed_stream_rs::utils::{setup_logger, setup_signal_hook};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "stream-client")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Consume a line-delimited JSON stream with automatic reconnection")]
struct Cli {
    /// Client username
    #[arg(short = 'U', long)]
    username: String,

    /// Client password
    #[arg(short = 'W', long)]
    password: String,

    /// Data source
    #[arg(long = "ds")]
    data_source: String,

    /// Stream name
    #[arg(long = "sn")]
    stream_name: String,

    /// Subscription name
    #[arg(long = "sb")]
    subscription_name: String,

    /// Customer name
    #[arg(long = "cn")]
    customer_name: String,

    /// Endpoint domain
    #[arg(long, default_value = DEFAULT_DOMAIN)]
    domain: String,

    /// Base URL replacing https://{customer}.{domain}
    #[arg(long)]
    endpoint: Option<String>,

    /// Maximum size of a single line, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_BUFFER_SIZE)]
    max_line_buffer_size: usize,

    /// Seconds to wait before reconnecting
    #[arg(long, default_value_t = DEFAULT_RECONNECT_DELAY.as_secs())]
    reconnect_delay: u64,
}

impl Cli {
    fn options(&self) -> Result<StreamOptions, Box<dyn std::error::Error>> {
        let mut options = StreamOptions::new()
            .with_max_line_buffer_size(self.max_line_buffer_size)?
            .with_reconnect_delay(Duration::from_secs(self.reconnect_delay))?;
        options.set_endpoint(self.endpoint.as_deref())?;
        Ok(options)
    }

    fn connection(&self) -> Connection {
        Connection::new(
            &self.username,
            &self.password,
            &self.data_source,
            &self.stream_name,
            &self.subscription_name,
            &self.customer_name,
        )
        .with_domain(&self.domain)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logger();

    let cli = Cli::parse();
    let (client, mut events) = StreamClient::with_options(cli.connection(), cli.options()?);

    let shutdown_signal = Arc::new(Notify::new());
    setup_signal_hook(Arc::clone(&shutdown_signal))?;

    info!("Streaming {:?}", client.connection());
    client.start();

    loop {
        tokio::select! {
            event = events.next() => match event {
                Some(StreamEvent::Message(line)) => println!("{}", line),
                Some(StreamEvent::Error(err)) => error!("{}", err),
                Some(StreamEvent::Stopped) | None => break,
            },
            _ = shutdown_signal.notified() => {
                client.stop();
            }
        }
    }

    info!("Stream client exited");
    Ok(())
}
