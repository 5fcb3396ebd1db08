use async_trait::async_trait;
use futures_util::StreamExt;
use pairdash_core::{DashConfig, DashError, LogStreamConnector, Pair, StreamHandle};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

const NAME: &str = "pairdash-ws";
const LINE_BUFFER: usize = 1024;

/// Log stream connector over a plain WebSocket.
///
/// Connects to `{ws_url}/logs?pair={pair}`. Text frames are split into lines;
/// binary frames are decoded as lossy UTF-8 first. Frames carry no framing of
/// their own, so each non-empty line is forwarded as-is.
#[derive(Debug, Clone)]
pub struct WsLogConnector {
    base: Url,
}

impl WsLogConnector {
    /// Create a connector for `ws_url`.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `ws_url` is not an absolute ws(s) URL.
    pub fn new(ws_url: &str) -> Result<Self, DashError> {
        let mut base = Url::parse(ws_url)
            .map_err(|e| DashError::invalid_arg(format!("ws_url {ws_url:?}: {e}")))?;
        if !matches!(base.scheme(), "ws" | "wss") {
            return Err(DashError::invalid_arg(format!(
                "ws_url {ws_url:?}: expected ws or wss"
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base })
    }

    /// Create a connector from `ws_url` of `cfg`.
    ///
    /// # Errors
    /// Same as [`new`](Self::new).
    pub fn from_config(cfg: &DashConfig) -> Result<Self, DashError> {
        Self::new(&cfg.ws_url)
    }

    /// Endpoint for the log stream of `pair`.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the URL cannot be joined.
    pub fn endpoint(&self, pair: &Pair) -> Result<Url, DashError> {
        let mut url = self
            .base
            .join("logs")
            .map_err(|e| DashError::invalid_arg(e.to_string()))?;
        url.query_pairs_mut().append_pair("pair", pair.as_str());
        Ok(url)
    }
}

#[async_trait]
impl LogStreamConnector for WsLogConnector {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn open(
        &self,
        pair: &Pair,
    ) -> Result<(StreamHandle, mpsc::Receiver<String>), DashError> {
        let url = self.endpoint(pair)?;
        let (mut ws, _resp) = connect_async(url.as_str())
            .await
            .map_err(|e| DashError::Socket(format!("{url}: {e}")))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(pair = %pair, url = %url, "log socket open");

        let (tx, rx) = mpsc::channel::<String>(LINE_BUFFER);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let join = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => {
                        let _ = ws.close(None).await;
                        return;
                    }
                    frame = ws.next() => {
                        let text = match frame {
                            Some(Ok(Message::Text(t))) => t.as_str().to_owned(),
                            Some(Ok(Message::Binary(b))) => String::from_utf8_lossy(&b).into_owned(),
                            Some(Ok(Message::Close(_))) | None => return,
                            Some(Ok(_)) => continue,
                            Some(Err(_e)) => {
                                #[cfg(feature = "tracing")]
                                tracing::warn!(error = %_e, "log socket read failed");
                                return;
                            }
                        };
                        for line in split_lines(&text) {
                            if tx.send(line.to_owned()).await.is_err() {
                                let _ = ws.close(None).await;
                                return;
                            }
                        }
                    }
                }
            }
        });

        Ok((StreamHandle::new(join, stop_tx), rx))
    }
}

/// Non-empty lines of a frame, without trailing carriage returns.
pub(crate) fn split_lines(frame: &str) -> impl Iterator<Item = &str> {
    frame
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .filter(|l| !l.is_empty())
}
