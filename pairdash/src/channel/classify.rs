use pairdash_core::Pair;

const COMPLETION_MARKER: &str = "Inference completed for pair";

/// Extract the pair from an "Inference completed for pair `<X>`" log line.
///
/// Quotes, backticks and trailing punctuation around the pair are ignored and
/// the result is normalized. Returns `None` for every other line.
#[must_use]
pub fn completed_pair(line: &str) -> Option<Pair> {
    let (_, rest) = line.split_once(COMPLETION_MARKER)?;
    let token = rest.split_whitespace().next()?;
    let token = token.trim_matches(|c: char| matches!(c, '`' | '\'' | '"' | '.' | ',' | ':' | '!'));
    Pair::parse(token)
}
