/// Install the tracing subscriber for binaries. The library itself only
/// emits events; it never installs a subscriber.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("BAIRNLOG_LOG").unwrap_or_else(|_| "bairnlog=info,sqlx=warn".into()),
        )
        .json()
        .with_target(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .try_init();
}
