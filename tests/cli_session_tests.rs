//! CLI session files and scenario wiring

use std::io::Write;

use carbonr_cli::config::CliError;
use carbonr_cli::fixture::{DEMO_PATH, DEMO_ROWS};
use carbonr_cli::{open_runtime, scenarios, BackendKind, Overrides, SessionConfig};

fn session_file(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_session_file() {
    let file = session_file(
        r#"
backend_kind: memory
runtime:
  classpath: ["/opt/carbon/carbondata-sdk.jar"]
  verbose_jni: true
  jvm_options: ["-Xmx2g"]
backend:
  fs.s3a.endpoint: http://127.0.0.1:9000
  fs.s3a.access.key: AK
"#,
    );
    let cfg = SessionConfig::load(file.path()).unwrap();
    assert_eq!(cfg.backend_kind, BackendKind::Memory);
    assert_eq!(cfg.runtime.classpath, vec!["/opt/carbon/carbondata-sdk.jar"]);
    assert_eq!(
        cfg.runtime.to_jvm_options(),
        vec![
            "-Djava.class.path=/opt/carbon/carbondata-sdk.jar".to_string(),
            "-verbose:jni".to_string(),
            "-Xmx2g".to_string(),
        ]
    );
    assert_eq!(cfg.backend.len(), 2);
    assert_eq!(cfg.backend.get("fs.s3a.access.key"), Some("AK"));
}

#[test]
fn test_empty_session_file_uses_defaults() {
    let file = session_file("{}\n");
    let cfg = SessionConfig::load(file.path()).unwrap();
    assert_eq!(cfg, SessionConfig::default());
}

#[test]
fn test_missing_session_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = SessionConfig::load(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, CliError::Io { .. }));
    assert!(!err.suggestions().is_empty());
}

#[test]
fn test_malformed_session_file() {
    let file = session_file("runtime: [not, a, map]\n");
    assert!(matches!(SessionConfig::load(file.path()), Err(CliError::Yaml { .. })));
}

#[test]
fn test_flag_options_reach_the_reader() {
    let file = session_file("backend:\n  fs.s3a.endpoint: from-file\n");
    let mut cfg = SessionConfig::load(file.path()).unwrap();
    cfg.apply(&Overrides {
        options: vec!["fs.s3a.endpoint=from-flag".into(), "fs.custom.access.key=k".into()],
        ..Overrides::default()
    })
    .unwrap();

    let rt = open_runtime(&cfg, 0).unwrap();
    let n = scenarios::read_local(&rt, DEMO_PATH, &cfg.backend, &mut Vec::new()).unwrap();
    assert_eq!(n, DEMO_ROWS);
    rt.shutdown().unwrap();
}

#[cfg(not(feature = "jvm"))]
#[test]
fn test_jvm_backend_needs_the_feature() {
    let cfg = SessionConfig {
        backend_kind: BackendKind::Jvm,
        ..SessionConfig::default()
    };
    assert!(matches!(open_runtime(&cfg, 0), Err(CliError::BackendUnavailable("jvm"))));
}
