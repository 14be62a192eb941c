use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("lvfont").unwrap()
}

#[test]
fn help_flag_prints_usage_with_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("info"))
        .stdout(predicate::str::contains("glyphs"))
        .stdout(predicate::str::contains("glyph"))
        .stdout(predicate::str::contains("ranges"))
        .stdout(predicate::str::contains("FILE"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lvfont"));
}

#[test]
fn info_subcommand_help() {
    cmd()
        .args(["info", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FILE"))
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--strict"))
        .stdout(predicate::str::contains("--loca-from-head"));
}

#[test]
fn glyph_subcommand_help() {
    cmd()
        .args(["glyph", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--char"))
        .stdout(predicate::str::contains("U+0041"));
}

#[test]
fn glyph_without_char_fails() {
    cmd()
        .args(["glyph", "font.c"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--char"));
}

#[test]
fn unknown_subcommand_flag_fails() {
    cmd()
        .args(["ranges", "font.c", "--pages", "1"])
        .assert()
        .failure();
}

#[test]
fn invalid_format_fails() {
    cmd()
        .args(["glyphs", "font.c", "--format", "csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("csv"));
}

#[test]
fn missing_file_reports_error() {
    cmd()
        .args(["info", "/nonexistent/font.c"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: failed to open font"))
        .stderr(predicate::str::contains("I/O error"));
}

#[test]
fn missing_file_with_unsupported_extension_reports_format() {
    cmd()
        .args(["info", "/nonexistent/font.ttf"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unsupported font format"))
        .stderr(predicate::str::contains("I/O error").not());
}
