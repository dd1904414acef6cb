use assert_cmd::Command;

fn libris() -> Command {
    let mut cmd = Command::cargo_bin("libris").unwrap();
    cmd.env("LIBRIS_CONFIG_DIR", std::env::temp_dir().join("libris-cli-no-config"))
        .env("LIBRIS_ENV", "local")
        .env("RUST_LOG", "error");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let output = libris().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    for subcommand in ["serve", "migrate", "config"] {
        assert!(stdout.contains(subcommand), "missing {subcommand} in help");
    }
}

#[test]
fn config_prints_environment_overrides() {
    let output = libris()
        .arg("config")
        .env("LIBRIS_DATABASE__AUTHOR_DELETE_POLICY", "cascade")
        .env("LIBRIS_SERVER__PORT", "9191")
        .output()
        .unwrap();
    assert!(output.status.success());

    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["database"]["author_delete_policy"], "cascade");
    assert_eq!(settings["server"]["port"], 9191);
    assert_eq!(settings["environment"], "local");
}

#[test]
fn migrate_is_idempotent() {
    let path = std::env::temp_dir().join(format!("libris-cli-{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let url = format!("sqlite://{}", path.display());

    let first = libris()
        .arg("migrate")
        .env("LIBRIS_DATABASE__URL", &url)
        .output()
        .unwrap();
    assert!(first.status.success());
    assert!(String::from_utf8_lossy(&first.stdout).contains("applied 2 migration(s)"));

    let second = libris()
        .arg("migrate")
        .env("LIBRIS_DATABASE__URL", &url)
        .output()
        .unwrap();
    assert!(second.status.success());
    assert!(String::from_utf8_lossy(&second.stdout).contains("applied 0 migration(s)"));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn unknown_environment_fails() {
    let output = libris().arg("config").env("LIBRIS_ENV", "qa").output().unwrap();
    assert!(!output.status.success());
}
