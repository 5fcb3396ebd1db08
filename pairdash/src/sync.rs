use std::sync::Arc;

use pairdash_core::{
    Bar, ConfidenceMarker, ConfidenceValue, DashError, DashTransport, MarkerPosition, MarkerShape,
    Pair, PredictionPoint, Theme, UtcOffsetSource, epoch_seconds, normalize_pair, shift_times,
    sort_dedup_by_time,
};

/// Typed fetches with display-time normalization.
///
/// Every time-bearing response is shifted by the local UTC offset read at call
/// time, exactly once per raw payload. There is no caching and no retry: a
/// failed request is returned to the caller as is.
#[derive(Clone)]
pub struct DataSyncClient {
    transport: Arc<dyn DashTransport>,
    clock: Arc<dyn UtcOffsetSource>,
}

impl DataSyncClient {
    /// Wrap a transport and the offset source used for display-time shifting.
    #[must_use]
    pub fn new(transport: Arc<dyn DashTransport>, clock: Arc<dyn UtcOffsetSource>) -> Self {
        Self { transport, clock }
    }

    /// Name of the underlying transport.
    #[must_use]
    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Fetch the pair catalog.
    ///
    /// Raw entries are normalized; entries that normalize to nothing are
    /// dropped and duplicates collapse to their first occurrence.
    ///
    /// # Errors
    /// Returns the transport error, tagged with the transport name.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "pairdash::sync::get_catalog", skip(self))
    )]
    pub async fn get_catalog(&self) -> Result<Vec<Pair>, DashError> {
        let raw = self.transport.dumps().await.map_err(|e| self.tag(e))?;
        let mut out: Vec<Pair> = Vec::with_capacity(raw.len());
        for entry in raw {
            let normalized = normalize_pair(entry.as_deref());
            if let Some(pair) = Pair::parse(&normalized)
                && !out.contains(&pair)
            {
                out.push(pair);
            }
        }
        Ok(out)
    }

    /// Fetch up to `limit` candles, shifted to display time, ascending and de-duplicated.
    ///
    /// # Errors
    /// Returns the transport error, tagged with the transport name.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "pairdash::sync::get_bars", skip(self), fields(pair = %pair))
    )]
    pub async fn get_bars(&self, pair: &Pair, limit: u32) -> Result<Vec<Bar>, DashError> {
        let mut bars = self
            .transport
            .bars(pair, limit)
            .await
            .map_err(|e| self.tag(e))?
            .into_vec();
        shift_times(&mut bars, self.clock.offset_seconds());
        Ok(sort_dedup_by_time(bars))
    }

    /// Fetch the prediction overlay, shifted to display time.
    ///
    /// # Errors
    /// Returns the transport error, tagged with the transport name.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "pairdash::sync::get_prediction", skip(self), fields(pair = %pair))
    )]
    pub async fn get_prediction(&self, pair: &Pair) -> Result<Vec<PredictionPoint>, DashError> {
        let mut points: Vec<PredictionPoint> = self
            .transport
            .prediction(pair)
            .await
            .map_err(|e| self.tag(e))?
            .into_vec()
            .into_iter()
            .map(PredictionPoint::from)
            .collect();
        shift_times(&mut points, self.clock.offset_seconds());
        Ok(sort_dedup_by_time(points))
    }

    /// Fetch confidence history as chart markers coloured for `theme`.
    ///
    /// Millisecond timestamps are reduced to seconds before the offset is applied.
    ///
    /// # Errors
    /// Returns the transport error, tagged with the transport name.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "pairdash::sync::get_confidence_markers",
            skip(self),
            fields(pair = %pair)
        )
    )]
    pub async fn get_confidence_markers(
        &self,
        pair: &Pair,
        theme: Theme,
    ) -> Result<Vec<ConfidenceMarker>, DashError> {
        let raw = self
            .transport
            .confidences(pair)
            .await
            .map_err(|e| self.tag(e))?;
        let mut markers: Vec<ConfidenceMarker> = raw
            .into_iter()
            .map(|c| ConfidenceMarker {
                time: epoch_seconds(c.t),
                value: c.value,
                position: MarkerPosition::BelowBar,
                shape: MarkerShape::Circle,
                color: theme.marker().to_string(),
            })
            .collect();
        shift_times(&mut markers, self.clock.offset_seconds());
        Ok(sort_dedup_by_time(markers))
    }

    /// Fetch the latest confidence value. It carries no time and is not shifted.
    ///
    /// # Errors
    /// Returns the transport error, tagged with the transport name.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "pairdash::sync::get_confidence", skip(self), fields(pair = %pair))
    )]
    pub async fn get_confidence(&self, pair: &Pair) -> Result<ConfidenceValue, DashError> {
        self.transport
            .confidence(pair)
            .await
            .map_err(|e| self.tag(e))
    }

    /// Ask the backend to start an inference job for `pair`.
    ///
    /// # Errors
    /// Returns the transport error, tagged with the transport name.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "pairdash::sync::trigger_inference", skip(self), fields(pair = %pair))
    )]
    pub async fn trigger_inference(&self, pair: &Pair) -> Result<(), DashError> {
        self.transport
            .trigger_inference(pair)
            .await
            .map_err(|e| self.tag(e))
    }

    fn tag(&self, e: DashError) -> DashError {
        tag_err(self.transport.name(), e)
    }
}

/// Attribute opaque errors to the transport that produced them.
pub(crate) fn tag_err(transport: &str, e: DashError) -> DashError {
    match e {
        DashError::Other(msg) => DashError::transport(transport, msg),
        e => e,
    }
}
