/// Raw `GET /dumps` payload, including a null and an empty entry.
pub fn dumps() -> Vec<Option<String>> {
    vec![
        Some("BTC/USD".to_string()),
        Some("ETH/USD".to_string()),
        Some("SOL/USD".to_string()),
        Some("ADA/USD".to_string()),
        None,
        Some(String::new()),
    ]
}
