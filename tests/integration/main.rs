//! Integration tests for Strata

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    // sha256("jre")
    const JRE_SHA256: &str = "a6942178b20a1fc99da8c30f93f56a9854c35031292f8e69e7d6382eb28ec8a3";

    /// Command isolated to roots and config under `dir`
    fn strata(dir: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("strata");
        cmd.env_remove("STRATA_CACHE_ROOT")
            .env_remove("STRATA_LAUNCH_ROOT")
            .args(["--color", "never"])
            .arg("--config")
            .arg(dir.join("config.toml"))
            .arg("--cache-root")
            .arg(dir.join("cache"))
            .arg("--launch-root")
            .arg(dir.join("launch"));
        cmd
    }

    fn contribute(dir: &Path, artifact: &Path, sha256: &str) -> Command {
        let mut cmd = strata(dir);
        cmd.args(["contribute", "--id", "jre", "--version", "11.0.2", "--sha256", sha256])
            .arg("--uri")
            .arg(artifact);
        cmd
    }

    fn artifact(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("jre-11.tar.gz");
        std::fs::write(&path, b"jre").unwrap();
        path
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("strata")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("buildpack layer contribution cache"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("strata")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("strata"));
    }

    #[test]
    fn launch_writes_manifest() {
        let temp = TempDir::new().unwrap();

        strata(temp.path())
            .args(["launch", "short=test-command-1", "a-very-long-type=test-command-2"])
            .assert()
            .success()
            .stdout(predicate::str::contains("-----> Process types:"))
            .stdout(predicate::str::contains("       short:            test-command-1"))
            .stdout(predicate::str::contains("       a-very-long-type: test-command-2"));

        let manifest = std::fs::read_to_string(temp.path().join("launch").join("launch.toml")).unwrap();
        assert!(manifest.contains("[[processes]]"));
        assert!(manifest.contains("type = \"a-very-long-type\""));
    }

    #[test]
    fn launch_rejects_malformed_process() {
        let temp = TempDir::new().unwrap();

        strata(temp.path())
            .args(["launch", "web"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("expected TYPE=COMMAND"));
    }

    #[test]
    fn contribute_then_reuse() {
        let temp = TempDir::new().unwrap();
        let artifact = artifact(temp.path());

        contribute(temp.path(), &artifact, JRE_SHA256)
            .assert()
            .success()
            .stdout(predicate::str::contains("jre 11.0.2: Contributing to identity layer"))
            .stdout(predicate::str::contains("jre 11.0.2: Contributing to content-hash layer"));

        let copied = temp.path().join("launch").join("jre").join("jre-11.tar.gz");
        assert_eq!(std::fs::read(copied).unwrap(), b"jre");
        assert!(temp.path().join("launch").join("jre.toml").exists());
        assert!(temp
            .path()
            .join("cache")
            .join(JRE_SHA256)
            .join("dependency.toml")
            .exists());

        contribute(temp.path(), &artifact, JRE_SHA256)
            .assert()
            .success()
            .stdout(predicate::str::contains("jre 11.0.2: Reusing cached identity layer"))
            .stdout(predicate::str::contains("Contributing").not());
    }

    #[test]
    fn contribute_digest_mismatch_fails() {
        let temp = TempDir::new().unwrap();
        let artifact = artifact(temp.path());
        let wrong = "0".repeat(64);

        contribute(temp.path(), &artifact, &wrong)
            .assert()
            .failure()
            .stderr(predicate::str::contains("SHA-256 mismatch"));

        assert!(!temp.path().join("launch").join("jre.toml").exists());
    }

    #[test]
    fn contribute_rejects_remote_uri() {
        let temp = TempDir::new().unwrap();

        strata(temp.path())
            .args(["contribute", "--id", "jre", "--version", "11", "--sha256", JRE_SHA256])
            .args(["--uri", "https://example.com/jre.tar.gz"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unsupported scheme"));
    }

    #[test]
    fn layers_empty() {
        let temp = TempDir::new().unwrap();

        strata(temp.path())
            .arg("layers")
            .assert()
            .success()
            .stdout(predicate::str::contains("No layers found."));
    }

    #[test]
    fn layers_json_after_contribute() {
        let temp = TempDir::new().unwrap();
        let artifact = artifact(temp.path());
        contribute(temp.path(), &artifact, JRE_SHA256).assert().success();

        let output = strata(temp.path())
            .args(["layers", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let layers: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let kinds: Vec<&str> = layers
            .as_array()
            .unwrap()
            .iter()
            .map(|layer| layer["kind"].as_str().unwrap())
            .collect();
        assert_eq!(kinds, vec!["cache", "launch"]);
        assert_eq!(layers[0]["sha256"], JRE_SHA256);
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();

        strata(temp.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();

        strata(temp.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[layers]"))
            .stdout(predicate::str::contains("tolerate_corrupt_metadata = false"));
    }

    #[test]
    fn config_init_then_warns() {
        let temp = TempDir::new().unwrap();

        strata(temp.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));
        assert!(temp.path().join("config.toml").exists());

        strata(temp.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }
}
