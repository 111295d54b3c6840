//! Layering tests for the binaries' configuration.

use std::ffi::{OsStr, OsString};
use std::sync::{Mutex, MutexGuard};

use liverelay_config::{Config, LogFormat, RELAY_PORT};
use once_cell::sync::Lazy;
use ortho_config::OrthoConfig;
use rstest::rstest;

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct EnvOverride {
    key: &'static str,
    previous: Option<OsString>,
    guard: Option<MutexGuard<'static, ()>>,
}

impl EnvOverride {
    fn set_var(key: &'static str, value: &OsStr) -> Self {
        let guard = ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let previous = std::env::var_os(key);
        // Environment mutation is `unsafe` on the 2024 edition; the mutex keeps
        // the override exclusive to one test at a time.
        unsafe { std::env::set_var(key, value) };
        Self {
            key,
            previous,
            guard: Some(guard),
        }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => unsafe { std::env::set_var(self.key, value) },
            None => unsafe { std::env::remove_var(self.key) },
        }
        drop(self.guard.take());
    }
}

fn args(extra: &[&str]) -> Vec<OsString> {
    std::iter::once("liverelayd")
        .chain(extra.iter().copied())
        .map(OsString::from)
        .collect()
}

#[rstest]
fn bare_invocation_yields_defaults() {
    let _guard = ENV_MUTEX
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let config = Config::load_from_iter(args(&[])).expect("defaults should load");
    assert_eq!(config.port(), RELAY_PORT);
    assert_eq!(config.log_format(), LogFormat::Json);
}

#[rstest]
fn program_name_alone_fills_every_field_from_defaults() {
    let _guard = ENV_MUTEX
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let config = Config::load_from_iter(["liverelayd"]).expect("bare start should load");
    assert_eq!(config, Config::default());
}

#[rstest]
fn environment_port_reaches_every_binary() {
    let _env = EnvOverride::set_var("LIVERELAY_PORT", OsStr::new("9100"));
    for binary in ["liverelayd", "liverelay"] {
        let config = Config::load_from_iter([binary]).expect("env port should load");
        assert_eq!(config.port(), 9100, "{binary} ignored LIVERELAY_PORT");
    }
}

#[rstest]
fn cli_flags_override_defaults() {
    let _guard = ENV_MUTEX
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let config = Config::load_from_iter(args(&[
        "--port",
        "9100",
        "--log-format",
        "compact",
        "--tick-interval-ms",
        "8",
    ]))
    .expect("flags should load");
    assert_eq!(config.port(), 9100);
    assert_eq!(config.log_format(), LogFormat::Compact);
    assert_eq!(config.tick_interval_ms, 8);
}

#[rstest]
fn environment_overrides_defaults_and_cli_wins() {
    let _env = EnvOverride::set_var("LIVERELAY_LOG_FILTER", OsStr::new("debug"));

    let from_env = Config::load_from_iter(args(&[])).expect("env layer should load");
    assert_eq!(from_env.log_filter(), "debug");

    let from_cli = Config::load_from_iter(args(&["--log-filter", "warn"]))
        .expect("cli layer should load");
    assert_eq!(from_cli.log_filter(), "warn");
}
