//! Integration tests for flowforge

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;

    /// Command with its state and config isolated under `state`
    fn forge(state: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("flowforge");
        cmd.env("FLOWFORGE_STATE_DIR", state);
        cmd.env("FLOWFORGE_CONFIG", state.join("config.toml"));
        cmd
    }

    #[test]
    fn help_displays() {
        let dir = tempfile::tempdir().unwrap();
        forge(dir.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("pipeline configuration builder"));
    }

    #[test]
    fn version_displays() {
        let dir = tempfile::tempdir().unwrap();
        forge(dir.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("flowforge"));
    }

    #[test]
    fn show_prints_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        forge(dir.path())
            .arg("show")
            .assert()
            .success()
            .stdout(predicate::str::contains("process-dynamo.json"))
            .stdout(predicate::str::contains("process-output.json"))
            .stdout(predicate::str::contains("preprocess.py"))
            .stdout(predicate::str::contains("unique-workflow-id"));
    }

    #[test]
    fn show_prints_one_artifact() {
        let dir = tempfile::tempdir().unwrap();
        forge(dir.path())
            .args(["show", "process-dynamo.json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"executor\": \"NEXTFLOW\""));
    }

    #[test]
    fn show_unknown_artifact_fails() {
        let dir = tempfile::tempdir().unwrap();
        forge(dir.path())
            .args(["show", "bogus.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown artifact"));
    }

    #[test]
    fn validate_fresh_session_passes() {
        let dir = tempfile::tempdir().unwrap();
        forge(dir.path())
            .arg("validate")
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration is valid"));
    }

    #[test]
    fn edit_needs_a_terminal() {
        let dir = tempfile::tempdir().unwrap();
        forge(dir.path())
            .arg("edit")
            .assert()
            .failure()
            .stderr(predicate::str::contains("interactive terminal"));
    }

    #[test]
    fn completions_generate() {
        let dir = tempfile::tempdir().unwrap();
        forge(dir.path())
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("flowforge"));
    }
}

mod export_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;

    fn forge(state: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("flowforge");
        cmd.env("FLOWFORGE_STATE_DIR", state);
        cmd.env("FLOWFORGE_CONFIG", state.join("config.toml"));
        cmd
    }

    const ARTIFACTS: [&str; 6] = [
        "process-dynamo.json",
        "process-form.json",
        "process-input.json",
        "process-output.json",
        "process-compute.config",
        "preprocess.py",
    ];

    #[test]
    fn export_writes_the_named_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        forge(dir.path())
            .args(["export", "--out"])
            .arg(&out)
            .assert()
            .success();

        for name in ARTIFACTS {
            assert!(out.join(name).exists(), "missing {}", name);
        }
    }

    #[test]
    fn repeated_exports_are_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");

        for out in [&first, &second] {
            forge(dir.path())
                .args(["export", "--out"])
                .arg(out)
                .assert()
                .success();
        }

        for name in ARTIFACTS {
            let a = fs::read(first.join(name)).unwrap();
            let b = fs::read(second.join(name)).unwrap();
            assert_eq!(a, b, "{} differs between exports", name);
        }
    }

    #[test]
    fn export_archive_writes_one_zip() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        forge(dir.path())
            .args(["export", "--archive", "--out"])
            .arg(&out)
            .assert()
            .success();

        assert!(out.join("pipeline-configuration.zip").exists());
        for name in ARTIFACTS {
            assert!(!out.join(name).exists(), "{} written alongside archive", name);
        }
    }

    #[test]
    fn import_then_undo_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        forge(dir.path())
            .args(["export", "--out"])
            .arg(&out)
            .assert()
            .success();

        // Hand-edit the workflow name, as a curator committing the bundle would
        let dynamo = out.join("process-dynamo.json");
        let contents = fs::read_to_string(&dynamo).unwrap();
        fs::write(&dynamo, contents.replace("My Workflow Name", "Renamed Workflow")).unwrap();

        forge(dir.path())
            .arg("import")
            .arg(&dynamo)
            .assert()
            .success()
            .stdout(predicate::str::contains("Loaded process-dynamo.json"));

        forge(dir.path())
            .args(["show", "process-dynamo.json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Renamed Workflow"));

        forge(dir.path())
            .arg("undo")
            .assert()
            .success();

        forge(dir.path())
            .args(["show", "process-dynamo.json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("My Workflow Name"));
    }

    #[test]
    fn import_rejects_unexpected_files() {
        let dir = tempfile::tempdir().unwrap();
        let stray = dir.path().join("notes.txt");
        fs::write(&stray, "hello").unwrap();

        forge(dir.path())
            .arg("import")
            .arg(&stray)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Did not expect input file"));
    }

    #[test]
    fn undo_with_no_history_fails() {
        let dir = tempfile::tempdir().unwrap();

        // Create the session first
        forge(dir.path()).arg("show").assert().success();

        forge(dir.path())
            .arg("undo")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Nothing to undo"));
    }
}

mod session_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;

    fn forge(state: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("flowforge");
        cmd.env("FLOWFORGE_STATE_DIR", state);
        cmd.env("FLOWFORGE_CONFIG", state.join("config.toml"));
        cmd
    }

    #[test]
    fn sessions_do_not_observe_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        forge(dir.path())
            .args(["--session", "alpha", "export", "--out"])
            .arg(&out)
            .assert()
            .success();

        let dynamo = out.join("process-dynamo.json");
        let contents = fs::read_to_string(&dynamo).unwrap();
        fs::write(&dynamo, contents.replace("My Workflow Name", "Alpha Workflow")).unwrap();

        forge(dir.path())
            .args(["--session", "alpha", "import"])
            .arg(&dynamo)
            .assert()
            .success();

        // alpha sees its edit, beta still sees the defaults
        forge(dir.path())
            .args(["--session", "alpha", "show", "process-dynamo.json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Alpha Workflow"));

        forge(dir.path())
            .args(["--session", "beta", "show", "process-dynamo.json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("My Workflow Name"));
    }

    #[test]
    fn session_list_shows_names() {
        let dir = tempfile::tempdir().unwrap();

        forge(dir.path())
            .args(["--session", "alpha", "show"])
            .assert()
            .success();
        forge(dir.path())
            .args(["--session", "beta", "show"])
            .assert()
            .success();

        forge(dir.path())
            .args(["session", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("alpha"))
            .stdout(predicate::str::contains("beta"));
    }

    #[test]
    fn refresh_reports_dropped_entries() {
        let dir = tempfile::tempdir().unwrap();

        // validate populates the catalog cache
        forge(dir.path()).arg("validate").assert().success();

        forge(dir.path())
            .args(["session", "refresh"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cached lookup"));
    }

    #[test]
    fn refresh_missing_session_fails() {
        let dir = tempfile::tempdir().unwrap();
        forge(dir.path())
            .args(["--session", "ghost", "session", "refresh"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Session not found"));
    }

    #[test]
    fn delete_with_yes_removes_the_session() {
        let dir = tempfile::tempdir().unwrap();

        forge(dir.path())
            .args(["--session", "alpha", "show"])
            .assert()
            .success();

        forge(dir.path())
            .args(["--session", "alpha", "--yes", "session", "delete"])
            .assert()
            .success();

        forge(dir.path())
            .args(["session", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("alpha").not());
    }
}

mod scan_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;

    fn forge(state: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("flowforge");
        cmd.env("FLOWFORGE_STATE_DIR", state);
        cmd.env("FLOWFORGE_CONFIG", state.join("config.toml"));
        cmd
    }

    #[test]
    fn scan_populates_the_output_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("results");
        fs::create_dir_all(data.join("counts")).unwrap();
        fs::write(
            data.join("counts/genes.tsv"),
            "gene_id\tcounts\ng1\t10\ng2\t3\n",
        )
        .unwrap();
        fs::write(data.join("summary.csv"), "sample,p_value\na,0.01\n").unwrap();

        forge(dir.path())
            .arg("scan")
            .arg(&data)
            .assert()
            .success()
            .stdout(predicate::str::contains("Populated 2 output file(s)"));

        forge(dir.path())
            .args(["show", "process-output.json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("hot.Parquet"))
            .stdout(predicate::str::contains("hot.Manifest"))
            .stdout(predicate::str::contains("$data_directory/counts/genes.tsv"))
            .stdout(predicate::str::contains("Gene ID"));
    }

    #[test]
    fn scan_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        forge(dir.path())
            .arg("scan")
            .arg(dir.path().join("nope"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Path not found"));
    }
}
