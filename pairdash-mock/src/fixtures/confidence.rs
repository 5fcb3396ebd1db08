use pairdash_core::{ConfidenceValue, RawConfidence};

use super::{STEP, origin};

/// Confidence history for `pair`.
///
/// BTCUSD reports millisecond timestamps, the others seconds. ADAUSD has none.
pub fn history(pair: &str) -> Option<Vec<RawConfidence>> {
    #[allow(clippy::cast_precision_loss)]
    let at = |hour: i64| (origin() + hour * STEP) as f64;
    match pair {
        "BTCUSD" => Some(vec![
            RawConfidence {
                t: at(6) * 1000.0,
                value: ConfidenceValue::Number(0.81),
            },
            RawConfidence {
                t: at(30) * 1000.0,
                value: ConfidenceValue::Number(0.64),
            },
        ]),
        "ETHUSD" => Some(vec![RawConfidence {
            t: at(12),
            value: ConfidenceValue::Number(0.72),
        }]),
        "SOLUSD" => Some(vec![
            RawConfidence {
                t: at(40),
                value: ConfidenceValue::Text("low".into()),
            },
            RawConfidence {
                t: at(8),
                value: ConfidenceValue::Text("high".into()),
            },
        ]),
        "ADAUSD" => Some(Vec::new()),
        _ => None,
    }
}

/// Latest confidence value for `pair`.
pub fn latest(pair: &str) -> Option<ConfidenceValue> {
    history(pair)?
        .into_iter()
        .max_by(|a, b| a.t.total_cmp(&b.t))
        .map(|c| c.value)
}
