use std::fs;
use std::process::Command;

const ART: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 40 20">
  <rect width="40" height="20" fill="#4a7"/>
</svg>"##;

fn cli() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_pazuru-cli"));
    command.env("RUST_LOG", "warn");
    command
}

#[test]
fn generate_then_inspect_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("art.svg");
    fs::write(&input, ART).expect("write art");
    let out = dir.path().join("puzzle");

    let output = cli()
        .arg("generate")
        .arg(&input)
        .args(["2", "2"])
        .arg(&out)
        .output()
        .expect("run generate");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pieces: 4"));
    assert!(out.join("puzzle.json").exists());

    let scene = dir.path().join("scene.svg");
    let output = cli()
        .arg("inspect")
        .arg(&out)
        .args(["--seed", "0x2a", "--reveal", "exact", "--scene"])
        .arg(&scene)
        .output()
        .expect("run inspect");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Puzzle loaded! 4 pieces"));
    assert!(stdout.contains("Puzzle Solved!"));
    let svg = fs::read_to_string(&scene).expect("scene");
    assert_eq!(svg.matches("data-piece=").count(), 4);
}

#[test]
fn env_tab_size_is_validated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("art.svg");
    fs::write(&input, ART).expect("write art");
    let out = dir.path().join("puzzle");

    let output = cli()
        .env("PAZURU_TAB_SIZE", "80")
        .arg("generate")
        .arg(&input)
        .args(["2", "2"])
        .arg(&out)
        .output()
        .expect("run generate");
    assert!(!output.status.success());
    assert!(!out.exists());
}

#[test]
fn inspect_reports_missing_manifest() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = cli()
        .arg("inspect")
        .arg(dir.path())
        .output()
        .expect("run inspect");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load puzzle.json: 404"), "{stderr}");
}
