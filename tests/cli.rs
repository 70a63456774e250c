//! CLI tests for the bedprep binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

fn bedprep() -> Command {
    let mut cmd = Command::cargo_bin("bedprep").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn fai(dir: &Path) -> PathBuf {
    write(dir, "genome.fa.fai", "chr1\t1000\t0\t60\t61\nchr2\t500\t0\t60\t61\n")
}

#[test]
fn test_clean_command() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "raw.bed", "1\t1\t2\nchrUn_x\t1\t2\n2\t3\t4\n");
    let output = dir.path().join("clean.bed");

    bedprep()
        .args(["clean", "--species", "human", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "chr1\t1\t2\nchr2\t3\t4\n"
    );
}

#[test]
fn test_clean_keep_nonstandard() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "raw.bed", "chrUn_x\t1\t2\n");
    let output = dir.path().join("clean.bed");

    bedprep()
        .args(["clean", "--species", "mouse", "--keep-nonstandard", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&output).unwrap(), "Un_x\t1\t2\n");
}

#[test]
fn test_unknown_species_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "raw.bed", "1\t1\t2\n");

    bedprep()
        .args(["clean", "--species", "rat", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("out.bed"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized species 'rat'"));
}

#[test]
fn test_species_config_extends_table() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "raw.bed", "20\t1\t2\n21\t1\t2\n");
    let config = write(
        dir.path(),
        "species.toml",
        "[species.rat]\nautosomes = 20\nextra = [\"X\", \"Y\", \"M\"]\n",
    );
    let output = dir.path().join("out.bed");

    bedprep()
        .args(["clean", "--species", "rat", "--species-config"])
        .arg(&config)
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&output).unwrap(), "chr20\t1\t2\n");
}

#[test]
fn test_sort_command() {
    let dir = tempfile::tempdir().unwrap();
    let fai = fai(dir.path());
    let input = write(dir.path(), "in.bed", "chr2\t10\t20\nchr1\t5\t15\nchr1\t5\t15\n");

    bedprep()
        .args(["sort", "-i"])
        .arg(&input)
        .arg("-g")
        .arg(&fai)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&input).unwrap(),
        "chr1\t5\t15\nchr2\t10\t20\n"
    );
}

#[test]
fn test_sort_missing_index() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "in.bed", "chr1\t5\t15\n");

    bedprep()
        .args(["sort", "-i"])
        .arg(&input)
        .arg("-g")
        .arg(dir.path().join("missing.fai"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot find contig index file"));
}

#[test]
fn test_validate_reports_line() {
    let dir = tempfile::tempdir().unwrap();
    let fai = fai(dir.path());
    let input = write(dir.path(), "in.bed", "#h\nchr2\t1\t2\nchr1\t1\t2\n");

    bedprep()
        .args(["validate", "-i"])
        .arg(&input)
        .arg("-g")
        .arg(&fai)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 3").and(predicate::str::contains("not sorted")));
}

#[test]
fn test_validate_overflow_and_blacklist() {
    let dir = tempfile::tempdir().unwrap();
    let fai = fai(dir.path());
    let input = write(dir.path(), "in.bed", "chr2\t1\t501\n");

    bedprep()
        .args(["validate", "-i"])
        .arg(&input)
        .arg("-g")
        .arg(&fai)
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds the length"));

    bedprep()
        .args(["validate", "--blacklist", "-i"])
        .arg(&input)
        .arg("-g")
        .arg(&fai)
        .assert()
        .success();
}

#[test]
fn test_regulatory_command() {
    let dir = tempfile::tempdir().unwrap();
    let fai = fai(dir.path());
    let gff = write(
        dir.path(),
        "reg.gff",
        "1\tRB\tpromoter\t10\t20\t.\t+\t.\tPromoter\n\
         2\tRB\tenhancer\t30\t40\t.\t-\t.\tEnhancer\n",
    );
    let outdir = dir.path().join("out");
    fs::create_dir(&outdir).unwrap();

    bedprep()
        .args(["regulatory", "--species", "human", "--gff"])
        .arg(&gff)
        .arg("--outputfile")
        .arg(dir.path().join("reg.clean.gff"))
        .arg("--faidx")
        .arg(&fai)
        .arg("--outpath")
        .arg(&outdir)
        .assert()
        .success()
        .stderr(predicate::str::contains("Parsed 1 promoter regions"));

    assert_eq!(
        fs::read_to_string(outdir.join("promoter.bed")).unwrap(),
        "chr1\t10\t20\t.\t.\t+\n"
    );
    assert_eq!(
        fs::read_to_string(outdir.join("enhancer.bed")).unwrap(),
        "chr2\t30\t40\t.\t.\t-\n"
    );
}

#[test]
fn test_missing_input_is_named() {
    let dir = tempfile::tempdir().unwrap();
    let fai = fai(dir.path());

    bedprep()
        .args(["validate", "-i"])
        .arg(dir.path().join("absent.bed"))
        .arg("-g")
        .arg(&fai)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot access").and(predicate::str::contains("absent.bed")));
}
