use std::sync::LazyLock;

use derive_from_env::FromEnv;

#[derive(FromEnv)]
#[from_env(prefix = "SPLITLOG")]
#[allow(non_snake_case)]
pub struct SplitlogConfig {
    #[from_env(default = "100")]
    pub FLUSH_INTERVAL_MS: u64,
}

pub static SPLITLOG_CONFIG: LazyLock<SplitlogConfig> = LazyLock::new(|| {
    SplitlogConfig::from_env().unwrap_or(SplitlogConfig {
        FLUSH_INTERVAL_MS: 100,
    })
});
