use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{Sink, SinkExt, Stream, StreamExt, future};
use std::pin::Pin;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

pub type SignalSink = Pin<Box<dyn Sink<String, Error = anyhow::Error> + Send>>;
pub type SignalStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Opens the text-frame transport to the relay.
#[async_trait]
pub trait SignalConnector: Send + Sync + 'static {
    async fn connect(&self) -> Result<(SignalSink, SignalStream)>;
}

/// WebSocket transport, e.g. `ws://localhost:3000`.
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SignalConnector for WsConnector {
    async fn connect(&self) -> Result<(SignalSink, SignalStream)> {
        let (socket, _) = connect_async(self.url.as_str())
            .await
            .with_context(|| format!("Failed to connect to relay at {}", self.url))?;
        debug!("WebSocket connected to {}", self.url);

        let (sink, stream) = socket.split();

        let sink = sink
            .sink_map_err(anyhow::Error::from)
            .with(|text: String| future::ready(Ok::<_, anyhow::Error>(Message::Text(text))));

        let stream = stream.filter_map(|frame| async move {
            match frame {
                Ok(Message::Text(text)) => Some(Ok(text)),
                Ok(_) => None,
                Err(e) => Some(Err(anyhow::Error::from(e))),
            }
        });

        Ok((Box::pin(sink), Box::pin(stream)))
    }
}
