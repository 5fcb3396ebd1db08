use pairdash_core::{Envelope, RawPrediction};

use super::{STEP, base_price, origin};

/// Twelve hourly predictions following the last fixture candle.
pub fn by_pair(pair: &str) -> Option<Envelope<RawPrediction>> {
    let base = base_price(pair)?;
    let start = origin() + 48 * STEP;
    Some(Envelope::Bare(
        (0..12i64)
            .map(|i| RawPrediction {
                time: start + i * STEP,
                #[allow(clippy::cast_precision_loss)]
                close: base * (1.0 + i as f64 * 0.001),
            })
            .collect(),
    ))
}
