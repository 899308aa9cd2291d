//! Configuration file to running plugin.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use swaddle_config::Config;
use swaddle_core::{Compilation, Phase, WrapError};
use swaddle_plugin::WrapperPlugin;
use swaddle_telemetry::{LogConfig, LogFormat, LogTarget};
use swaddle_test::{HostProfile, MockCompiler, fixtures};

const CONFIG: &str = r#"
[wrapper]
header = { template = "/*! [base] [chunkhash] */\n" }
footer = "\n/* eof */"
test = [{ regex = "\\.js$" }, { glob = "*.mjs" }]
exclude = "vendor"

[logging]
level = "debug"
format = "json"
directives = ["swaddle_plugin=trace"]
"#;

#[test]
fn toml_config_drives_wrapping() {
    let config = Config::from_toml_str(CONFIG).unwrap();
    let plugin = WrapperPlugin::from_config(&config.wrapper).unwrap();
    assert_eq!(plugin.phase(), Phase::BeforeOptimization);

    let mut compiler = MockCompiler::new(HostProfile::Legacy);
    plugin.apply(&mut compiler).unwrap();

    let vendor = fixtures::raw("lib()");
    let mut compilation = compiler
        .compilation()
        .with_chunk(fixtures::chunk(
            "main",
            "ab12",
            &["app.js", "app.mjs", "app.css", "vendor.js"],
        ))
        .with_asset("app.js", fixtures::raw("a()"))
        .with_asset("app.mjs", fixtures::raw("m()"))
        .with_asset("app.css", fixtures::raw("a{}"))
        .with_asset("vendor.js", Arc::clone(&vendor));
    compiler.compile(&mut compilation).unwrap();

    assert_eq!(
        compilation.asset_text("app.js").unwrap(),
        "/*! app.js ab12 */\na()\n/* eof */"
    );
    assert_eq!(
        compilation.asset_text("app.mjs").unwrap(),
        "/*! app.mjs ab12 */\nm()\n/* eof */"
    );
    assert_eq!(compilation.asset_text("app.css").unwrap(), "a{}");
    assert!(Arc::ptr_eq(&compilation.asset("vendor.js").unwrap(), &vendor));
}

#[test]
fn logging_section_converts_to_log_config() {
    let config = Config::from_toml_str(CONFIG).unwrap();
    let log = LogConfig::try_from(&config.logging).unwrap();

    assert_eq!(log.level, "debug");
    assert_eq!(log.format, LogFormat::Json);
    assert_eq!(log.directives, vec!["swaddle_plugin=trace"]);
    assert_eq!(log.target, LogTarget::Stderr);
}

#[test]
fn config_file_with_after_optimizations() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(b"[wrapper]\nheader = \"/* keep */\"\nafter_optimizations = true\n")
        .unwrap();

    let plugin = WrapperPlugin::from_config_file_with_env(file.path(), &HashMap::new()).unwrap();
    assert_eq!(plugin.phase(), Phase::AfterOptimization);

    let mut compiler = MockCompiler::new(HostProfile::Staged);
    plugin.apply(&mut compiler).unwrap();
    assert_eq!(
        plugin.binding().unwrap().hook,
        swaddle_core::HookKind::AfterOptimizeChunkAssets
    );
}

#[test]
fn environment_override_switches_phase() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(b"[wrapper]\nheader = \"/* keep */\"\n").unwrap();
    let env: HashMap<String, String> =
        [("SWADDLE_AFTER_OPTIMIZATIONS".to_owned(), "on".to_owned())]
            .into_iter()
            .collect();

    let plugin = WrapperPlugin::from_config_file_with_env(file.path(), &env).unwrap();
    assert_eq!(plugin.phase(), Phase::AfterOptimization);

    let config = Config::load_file(file.path()).unwrap();
    assert!(!config.wrapper.after_optimizations);
}

#[test]
fn invalid_config_fails_before_host_interaction() {
    let err = Config::from_toml_str("[wrapper]\ninclude = { glob = \"[\" }\n").unwrap_err();
    assert!(err.to_string().contains("wrapper.include"));

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(b"[wrapper]\nafter_optimizations = \"sometimes\"\n")
        .unwrap();
    let err = WrapperPlugin::from_config_file_with_env(file.path(), &HashMap::new()).unwrap_err();
    assert!(matches!(err, WrapError::InvalidConfiguration { .. }));
}

#[test]
fn options_object_from_host() {
    let plugin = WrapperPlugin::from_value(&serde_json::json!({
        "header": "/* h */",
        "footer": 0,
        "afterOptimizations": null
    }))
    .unwrap();
    assert_eq!(plugin.phase(), Phase::BeforeOptimization);

    for value in [serde_json::json!([]), serde_json::json!("header")] {
        let err = WrapperPlugin::from_value(&value).unwrap_err();
        assert!(matches!(err, WrapError::InvalidConfiguration { .. }));
    }
}
