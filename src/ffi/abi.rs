#[unsafe(no_mangle)]
/// ### English
/// Returns the C ABI version.
///
/// ### 中文
/// 返回 C ABI 版本号。
pub extern "C" fn gameview_abi_version() -> u32 {
    super::GAMEVIEW_ABI_VERSION
}

#[unsafe(no_mangle)]
/// ### English
/// Installs the `env_logger` backend (filter from `RUST_LOG`). Safe to call more than once;
/// returns `false` if a logger was already installed.
///
/// ### 中文
/// 安装 `env_logger` 日志后端（过滤规则取自 `RUST_LOG`）。可重复调用；
/// 若已安装过日志器则返回 `false`。
pub extern "C" fn gameview_logging_init() -> bool {
    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}
