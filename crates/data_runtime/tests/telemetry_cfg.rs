use data_runtime::configs::telemetry::load_default;
use serial_test::serial;

#[test]
#[serial]
fn env_overrides_parse() {
    unsafe {
        std::env::set_var("LOG_LEVEL", "debug");
        std::env::set_var("JSON_LOGS", "true");
        std::env::set_var("METRICS_ADDR", "127.0.0.1:9200");
    }
    let cfg = load_default().expect("load");
    assert_eq!(cfg.log_level.as_deref(), Some("debug"));
    assert_eq!(cfg.json_logs, Some(true));
    assert_eq!(cfg.metrics_addr.as_deref(), Some("127.0.0.1:9200"));
    unsafe {
        std::env::remove_var("LOG_LEVEL");
        std::env::remove_var("JSON_LOGS");
        std::env::remove_var("METRICS_ADDR");
    }
}
