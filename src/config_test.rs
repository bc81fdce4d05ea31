use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_when_nothing_set() {
    let config = GatewayConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(config.token_file, PathBuf::from(DEFAULT_TOKEN_FILE));
    assert_eq!(config.connect_timeout(), Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));
}

#[test]
fn overrides_are_applied_and_trailing_slash_trimmed() {
    let config = GatewayConfig::from_lookup(lookup_from(&[
        ("BURGERMAFIA_API_BASE_URL", "https://api.burgermafia.example/api/"),
        ("BURGERMAFIA_TOKEN_FILE", "/tmp/bm.json"),
        ("BURGERMAFIA_CONNECT_TIMEOUT_SECS", "3"),
    ]))
    .unwrap();
    assert_eq!(config.api_base_url, "https://api.burgermafia.example/api");
    assert_eq!(config.token_file, PathBuf::from("/tmp/bm.json"));
    assert_eq!(config.connect_timeout_secs, 3);
}

#[test]
fn invalid_timeout_falls_back_to_default() {
    let config =
        GatewayConfig::from_lookup(lookup_from(&[("BURGERMAFIA_CONNECT_TIMEOUT_SECS", "soon")])).unwrap();
    assert_eq!(config.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
}

#[test]
fn non_http_base_url_is_rejected() {
    let err = GatewayConfig::from_lookup(lookup_from(&[("BURGERMAFIA_API_BASE_URL", "ftp://files")])).unwrap_err();
    assert_eq!(err, ConfigError::InvalidBaseUrl("ftp://files".into()));
    assert_eq!(err.error_code(), "E_INVALID_BASE_URL");
}

#[test]
fn empty_token_file_is_rejected() {
    let err = GatewayConfig::from_lookup(lookup_from(&[("BURGERMAFIA_TOKEN_FILE", "")])).unwrap_err();
    assert_eq!(err, ConfigError::EmptyTokenFile);
}
