use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder with its scrape endpoint.
pub fn init_metrics(listen_address: &str) {
    let addr: SocketAddr = listen_address.parse().expect("Invalid metrics address");

    let builder = PrometheusBuilder::new().with_http_listener(addr);

    builder
        .install()
        .expect("Failed to install Prometheus recorder");
}

// Helper constants for metric names
pub const METRIC_CONNECTIONS_TOTAL: &str = "netclock_connections_total";
pub const METRIC_ACTIVE_CONNECTIONS: &str = "netclock_active_connections";
pub const METRIC_COMMANDS_TOTAL: &str = "netclock_commands_total";
pub const METRIC_COMMANDS_REJECTED_TOTAL: &str = "netclock_commands_rejected_total";
pub const METRIC_COMMAND_LATENCY: &str = "netclock_command_latency_seconds";
