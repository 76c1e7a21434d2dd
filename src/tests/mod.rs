#[cfg(test)]
use crate::prelude::*;
#[cfg(test)]
use crate::routines::settings::write_settings_to_file;

#[test]
fn read_mandatory_settings() {
    let settings = read_settings("src/tests/config.toml").unwrap();
    assert_eq!(settings.paths.data, "tests/data");
    assert_eq!(settings.paths.output, "target/test-results");
    assert_eq!(settings.paths.log, None);
    assert_eq!(settings.simulation.group, "food");
}

#[test]
fn read_default_settings() {
    let settings = read_settings("src/tests/config.toml").unwrap();
    assert_eq!(settings.config.log_level, "debug");
    assert_eq!(settings.config.rtol, 1e-6);
    assert_eq!(settings.config.atol, 1e-10);
    assert_eq!(settings.fit.parameters, "pharmacokinetics");
}

#[test]
fn read_fit_settings() {
    let settings = read_settings("src/tests/config.toml").unwrap();
    assert_eq!(settings.fit.filter, "pharmacokinetics");
    assert_eq!(settings.fit.optimizer.starts, 4);
    assert_eq!(settings.fit.optimizer.seed, Optimizer::default().seed);
    assert_eq!(settings.fit.problem.residual, ResidualKind::Absolute);
    assert_eq!(settings.fit.problem.weighting_points, WeightingPoints::Sd);
    assert_eq!(settings.fit.problem.weighting_curves, WeightingCurves::Count);
}

#[test]
fn read_shipped_settings() {
    let settings = read_settings("config/edoxaban.toml").unwrap();
    assert_eq!(settings.simulation.group, "all");
    assert_eq!(settings.fit.filter, "control");
    assert_eq!(settings.fit.optimizer, Optimizer::default());
    assert_eq!(settings.fit.problem, ProblemOptions::default());
}

#[test]
fn missing_settings_file() {
    assert!(matches!(
        read_settings("src/tests/missing.toml"),
        Err(EdoxabanError::Config(_))
    ));
}

#[test]
fn settings_written_as_json() {
    let settings = read_settings("src/tests/config.toml").unwrap();
    let dir = std::env::temp_dir().join("edoxaban_settings_json");
    write_settings_to_file(&settings, &dir).unwrap();
    let text = std::fs::read_to_string(dir.join("settings.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["simulation"]["group"], "food");
    assert_eq!(value["fit"]["problem"]["residual"], "absolute");
}

#[test]
fn environment_overrides_nested_keys() {
    use crate::routines::settings::{environment, read_settings_from};
    use std::collections::HashMap;

    let variables: HashMap<String, String> = [
        ("EDOXABAN_FIT__OPTIMIZER__MAX_ITERS", "100"),
        ("EDOXABAN_SIMULATION__GROUP", "renal_impairment"),
        ("EDOXABAN_CONFIG__LOG_LEVEL", "warn"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    let settings =
        read_settings_from("src/tests/config.toml", environment().source(Some(variables))).unwrap();
    assert_eq!(settings.fit.optimizer.max_iters, 100);
    assert_eq!(settings.fit.optimizer.starts, 4);
    assert_eq!(settings.simulation.group, "renal_impairment");
    assert_eq!(settings.config.log_level, "warn");
}
