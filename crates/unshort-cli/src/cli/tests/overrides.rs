//! Tests for applying command-line overrides to the loaded config.

use crate::cli::{MethodArg, ProbeArgs};
use unshort_core::config::UnshortConfig;
use unshort_core::probe::ProbeMethod;

#[test]
fn empty_overrides_keep_config() {
    let mut cfg = UnshortConfig {
        concurrency: 7,
        ..UnshortConfig::default()
    };
    ProbeArgs::default().apply(&mut cfg).unwrap();
    assert_eq!(cfg.concurrency, 7);
    assert_eq!(cfg.method, ProbeMethod::Get);
}

#[test]
fn overrides_replace_config_values() {
    let mut cfg = UnshortConfig::default();
    let args = ProbeArgs {
        concurrency: Some(3),
        timeout: Some(1.5),
        method: Some(MethodArg::Head),
    };
    args.apply(&mut cfg).unwrap();
    assert_eq!(cfg.concurrency, 3);
    assert!((cfg.timeout_secs - 1.5).abs() < 1e-9);
    assert_eq!(cfg.method, ProbeMethod::Head);
}

#[test]
fn invalid_overrides_are_rejected() {
    let mut cfg = UnshortConfig::default();
    let zero = ProbeArgs {
        concurrency: Some(0),
        ..ProbeArgs::default()
    };
    assert!(zero.apply(&mut cfg).is_err());

    let mut cfg = UnshortConfig::default();
    let negative = ProbeArgs {
        timeout: Some(-1.0),
        ..ProbeArgs::default()
    };
    assert!(negative.apply(&mut cfg).is_err());
}
