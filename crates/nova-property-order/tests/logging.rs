use nova_property_order::{init_tracing, LoggingConfig};

#[test]
fn init_tracing_installs_once() {
    let config = LoggingConfig {
        level: "nova_property_order=debug".to_owned(),
        json: true,
    };
    assert!(init_tracing(&config));
    // A subscriber is already installed; later calls leave it alone.
    assert!(!init_tracing(&LoggingConfig::default()));
    tracing::debug!(target: "nova_property_order", "logging initialized");
}
