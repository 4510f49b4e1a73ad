//! End-to-end tests for the remark binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const EXPORT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<disqus xmlns="http://disqus.com" xmlns:dsq="http://disqus.com/disqus-internals">
    <thread dsq:id="1">
        <id>https://blog.example.com/first/</id>
        <link>http://old.example.com/first.html</link>
        <title>First</title>
    </thread>
    <thread dsq:id="2">
        <id/>
        <link>https://blog.example.com/second/</link>
        <title>Second</title>
    </thread>
    <post dsq:id="10">
        <message><![CDATA[<p>first comment</p>]]></message>
        <createdAt>2020-01-02T10:00:00Z</createdAt>
        <isDeleted>false</isDeleted>
        <isSpam>false</isSpam>
        <author>
            <name>Alice</name>
            <username>alice</username>
        </author>
        <ipAddress>127.0.0.1</ipAddress>
        <thread dsq:id="1"/>
    </post>
    <post dsq:id="11">
        <message><![CDATA[<p>reply</p>]]></message>
        <createdAt>2020-01-02T11:00:00Z</createdAt>
        <isDeleted>false</isDeleted>
        <isSpam>false</isSpam>
        <author>
            <name>Bob</name>
            <username>bob</username>
        </author>
        <ipAddress>127.0.0.2</ipAddress>
        <thread dsq:id="1"/>
        <parent dsq:id="10"/>
    </post>
    <post dsq:id="12">
        <message><![CDATA[<p>buy now</p>]]></message>
        <createdAt>2020-01-03T10:00:00Z</createdAt>
        <isDeleted>false</isDeleted>
        <isSpam>true</isSpam>
        <author>
            <name>Spammer</name>
        </author>
        <thread dsq:id="2"/>
    </post>
    <post dsq:id="13">
        <message><![CDATA[<p>second post comment</p>]]></message>
        <createdAt>2020-01-04T10:00:00Z</createdAt>
        <isDeleted>false</isDeleted>
        <isSpam>false</isSpam>
        <author>
            <name>Carol</name>
            <username>carol</username>
        </author>
        <ipAddress>127.0.0.3</ipAddress>
        <thread dsq:id="2"/>
    </post>
</disqus>
"#;

fn remark(temp: &Path) -> Command {
    let mut cmd = Command::cargo_bin("remark").unwrap();
    cmd.env_remove("REMARK_SECRET")
        .arg("--no-color")
        .arg("--config")
        .arg(temp.join("remark.toml"))
        .arg("--storage-dir")
        .arg(temp.join("data"));
    cmd
}

fn write_export(temp: &Path) -> std::path::PathBuf {
    let path = temp.join("export.xml");
    fs::write(&path, EXPORT).unwrap();
    path
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("remark")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("last"))
        .stdout(predicate::str::contains("counts"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_import_and_query() {
    let temp = TempDir::new().unwrap();
    let export = write_export(temp.path());

    remark(temp.path())
        .args(["import", "--site", "blog", "--secret", "12345", "--file"])
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 3 comments into site blog"));

    assert!(temp.path().join("data").join("blog.json").exists());

    remark(temp.path())
        .args(["last", "--site", "blog", "--max", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Carol"))
        .stdout(predicate::str::contains("https://blog.example.com/second/"))
        .stdout(predicate::str::contains("Alice").not());

    remark(temp.path())
        .args(["last", "--site", "blog", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""parent_id": "10""#))
        .stdout(predicate::str::contains("127.0.0.1").not());

    remark(temp.path())
        .args([
            "counts",
            "--site",
            "blog",
            "https://blog.example.com/first/",
            "https://blog.example.com/second/",
            "https://blog.example.com/missing/",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2  https://blog.example.com/first/"))
        .stdout(predicate::str::contains("1  https://blog.example.com/second/"))
        .stderr(predicate::str::contains("1 posts not found"));
}

#[test]
fn test_import_from_stdin_with_env_secret() {
    let temp = TempDir::new().unwrap();

    remark(temp.path())
        .env("REMARK_SECRET", "12345")
        .args(["import", "--site", "blog", "--file", "-"])
        .write_stdin(EXPORT)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 3 comments"));
}

#[test]
fn test_reimport_stores_nothing_new() {
    let temp = TempDir::new().unwrap();
    let export = write_export(temp.path());

    for expected in ["Imported 3 comments", "Imported 0 comments"] {
        remark(temp.path())
            .args(["import", "--site", "blog", "--secret", "12345", "--file"])
            .arg(&export)
            .assert()
            .success()
            .stdout(predicate::str::contains(expected));
    }
}

#[test]
fn test_import_without_secret_fails() {
    let temp = TempDir::new().unwrap();
    let export = write_export(temp.path());

    remark(temp.path())
        .args(["import", "--site", "blog", "--file"])
        .arg(&export)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No secret configured"));
}

#[test]
fn test_import_malformed_export_fails() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.xml");
    fs::write(&path, "<disqus><thread dsq:id=\"1\"><link>x</link>").unwrap();

    remark(temp.path())
        .args(["import", "--site", "blog", "--secret", "12345", "--file"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Import into site 'blog' failed"));
}

#[test]
fn test_last_unknown_site_fails() {
    let temp = TempDir::new().unwrap();

    remark(temp.path())
        .args(["last", "--site", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read site 'nope'"));
}

#[test]
fn test_site_id_cannot_leave_storage_dir() {
    let temp = TempDir::new().unwrap();
    let export = write_export(temp.path());

    remark(temp.path())
        .args(["import", "--site", "../escaped", "--secret", "12345", "--file"])
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 0 comments"));
    assert!(!temp.path().join("escaped.json").exists());

    remark(temp.path())
        .args(["last", "--site", "../escaped"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid site id"));
}

#[test]
fn test_config_init_and_show() {
    let temp = TempDir::new().unwrap();

    remark(temp.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration written"));

    remark(temp.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    fs::write(
        temp.path().join("remark.toml"),
        "[admin]\nsecret = \"top-secret\"\nadmins = [\"dev\"]\n",
    )
    .unwrap();

    remark(temp.path())
        .args(["config", "show", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"edit_duration_secs\": 300"))
        .stdout(predicate::str::contains("top-secret").not());
}
