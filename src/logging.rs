//! tracing購読者の初期化

use tracing_subscriber::EnvFilter;

/// ログ出力を初期化
///
/// `RUST_LOG` があればそれを使い、無ければ `verbose` に応じて既定フィルタを選ぶ。
/// `LOG_FORMAT=json` でJSON出力。
pub fn init(verbose: bool) {
    let default_filter = if verbose {
        "shopper_match=debug,shopper_match_common=debug"
    } else {
        "shopper_match=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // 二重初期化（テストなど）は無視
    if json_logs {
        let _ = builder.with_target(false).json().try_init();
    } else {
        let _ = builder.try_init();
    }
}
