use std::{fs, path::PathBuf};

use tempfile::tempdir;

use infragram::InfragramError;
use infragram_cli::{Args, run};

/// Demo inputs live at the workspace root, relative to workspace not the crate
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

/// Collects all .tf and .bicep files from a directory
fn collect_declaration_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && matches!(
                        path.extension().and_then(|s| s.to_str()),
                        Some("tf" | "bicep")
                    )
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn args(input: Vec<String>, output: String) -> Args {
    Args {
        input,
        output,
        config: None,
        title: None,
        direction: None,
        format: Vec::new(),
        no_convert: false,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_demos() {
    // Create a temporary directory for test outputs
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let demos = collect_declaration_files(demos_path());
    assert!(!demos.is_empty(), "No demo inputs found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &demos {
        let stem = demo_path.file_stem().unwrap().to_string_lossy().to_string();
        let output_path = temp_dir.path().join(&stem);

        let result = run(&args(
            vec![demo_path.to_string_lossy().to_string()],
            output_path.to_string_lossy().to_string(),
        ));

        match result {
            Ok(report) => {
                assert!(report.layout().exists(), "{} has no layout", stem);
                for image in report.images() {
                    assert!(image.exists(), "{} is missing", image.display());
                }
            }
            // Graphviz is not installed; nothing may be written.
            Err(InfragramError::EnvironmentNotReady { .. }) => {
                let written = fs::read_dir(temp_dir.path())
                    .unwrap()
                    .flatten()
                    .filter(|entry| entry.file_name().to_string_lossy().starts_with(&stem))
                    .count();
                assert_eq!(written, 0, "{} wrote files without Graphviz", stem);
            }
            Err(e) => failed_demos.push((demo_path.clone(), e)),
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nDemos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo(s) failed unexpectedly", failed_demos.len());
    }

    println!("✅ All {} demos processed", demos.len());
}

#[test]
fn e2e_smoke_test_all_demos_in_one_diagram() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let inputs = collect_declaration_files(demos_path())
        .iter()
        .map(|path| path.to_string_lossy().to_string())
        .collect();
    let mut args = args(
        inputs,
        temp_dir.path().join("all.svg").to_string_lossy().to_string(),
    );
    args.config = Some(demos_path().join("config.toml").to_string_lossy().to_string());
    args.no_convert = true;

    match run(&args) {
        Ok(report) => {
            assert!(report.editable().is_none());
            assert_eq!(
                report.images(),
                [temp_dir.path().join("all.png"), temp_dir.path().join("all.svg")]
            );
        }
        Err(InfragramError::EnvironmentNotReady { capability, .. }) => {
            assert_eq!(capability, "dot");
            assert!(!temp_dir.path().join("all.dot").exists());
        }
        Err(e) => panic!("combined demos failed: {e}"),
    }
}

#[test]
fn e2e_smoke_test_missing_input() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let result = run(&args(
        vec!["demos/does-not-exist.tf".to_string()],
        temp_dir.path().join("missing").to_string_lossy().to_string(),
    ));

    assert!(matches!(result, Err(InfragramError::Io(_))));
}

#[test]
fn e2e_smoke_test_strict_duplicates() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let input = temp_dir.path().join("dup.tf");
    fs::write(
        &input,
        "resource \"aws_vpc\" \"main\" {}\nresource \"aws_vpc\" \"main\" {}\n",
    )
    .unwrap();
    let config = temp_dir.path().join("config.toml");
    fs::write(&config, "[extract]\nduplicates = \"error\"\n").unwrap();

    let mut args = args(
        vec![input.to_string_lossy().to_string()],
        temp_dir.path().join("dup").to_string_lossy().to_string(),
    );
    args.config = Some(config.to_string_lossy().to_string());

    let result = run(&args);
    assert!(matches!(result, Err(InfragramError::Parse { .. })));
    assert!(!temp_dir.path().join("dup.dot").exists());
}
