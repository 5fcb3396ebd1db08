use pairdash_core::{Bar, Envelope};

use super::{STEP, base_price, origin};

const COUNT: usize = 48;

/// Candles for `pair`, capped at `limit`. ETHUSD is served wrapped in `data`.
///
/// ADAUSD has a catalog entry but no candles.
pub fn by_pair(pair: &str, limit: u32) -> Option<Envelope<Bar>> {
    if pair == "ADAUSD" {
        return None;
    }
    let base = base_price(pair)?;
    let n = COUNT.min(usize::try_from(limit).unwrap_or(usize::MAX));
    let start = origin();
    let mut prev_close = base;
    let bars: Vec<Bar> = (0..n)
        .map(|i| {
            let step = i64::try_from(i).unwrap_or(0);
            #[allow(clippy::cast_precision_loss)]
            let wave = (i as f64 * 0.7).sin() * base * 0.01;
            let open = prev_close;
            let close = base + wave;
            prev_close = close;
            Bar {
                time: start + step * STEP,
                open,
                high: open.max(close) + base * 0.002,
                low: open.min(close) - base * 0.002,
                close,
            }
        })
        .collect();
    Some(if pair == "ETHUSD" {
        Envelope::Wrapped { data: bars }
    } else {
        Envelope::Bare(bars)
    })
}
