use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_classdoc")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn stdout_json(assert: assert_cmd::assert::Assert) -> serde_json::Value {
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    serde_json::from_str(&output).unwrap()
}

// -- stdin mode --

#[test]
fn stdin_mode_emits_every_class() {
    let input = std::fs::read_to_string(fixture_path("animals.php")).unwrap();

    let assert = cmd().write_stdin(input).assert().success();
    let json = stdout_json(assert);

    let classes = json.as_object().unwrap();
    assert!(classes.contains_key("Animal"));
    assert!(classes.contains_key("Dog"));
}

#[test]
fn stdin_mode_override_and_inheritance() {
    let input = std::fs::read_to_string(fixture_path("animals.php")).unwrap();

    let assert = cmd()
        .args(["--class", "Dog"])
        .write_stdin(input)
        .assert()
        .success();
    let dog = stdout_json(assert);

    assert_eq!(dog["name"], "Dog");
    assert_eq!(dog["parent"], "Animal");
    assert_eq!(dog["interfaces"][0], "Stringable");
    assert_eq!(dog["description"]["short"], "A loyal companion.");

    // Redeclared method keeps the subclass documentation; the parent's
    // version stays visible through the inherited mapping.
    assert_eq!(dog["methods"]["speak"]["shortDescription"], "Barks loudly.");
    assert_eq!(
        dog["inheritedMethods"]["speak"]["shortDescription"],
        "Makes a sound."
    );
    assert!(dog["methods"].get("sleep").is_none());
    assert!(dog["inheritedMethods"].get("sleep").is_some());

    // Inherited keys are sorted.
    let inherited: Vec<&String> = dog["inheritedMethods"].as_object().unwrap().keys().collect();
    assert_eq!(inherited, ["sleep", "speak"]);

    // Protected members never surface.
    assert!(dog["inheritedMethods"].get("digest").is_none());

    // Constants reconcile the same way.
    assert_eq!(dog["constants"]["SPECIES"]["value"], "\"Canis familiaris\"");
    assert!(dog["constants"].get("LEGS").is_none());
    assert_eq!(dog["inheritedConstants"]["LEGS"]["value"], "4");
    assert_eq!(
        dog["inheritedConstants"]["LEGS"]["short"],
        "Default leg count."
    );
}

#[test]
fn stdin_mode_documented_method_shape() {
    let input = std::fs::read_to_string(fixture_path("logger.php")).unwrap();

    let assert = cmd()
        .args(["--class", "Acme\\Log\\Logger"])
        .write_stdin(input)
        .assert()
        .success();
    let logger = stdout_json(assert);

    let add_record = &logger["methods"]["addRecord"];
    assert_eq!(add_record["shortDescription"], "Adds a record to the log.");
    assert_eq!(
        add_record["longDescription"],
        "The record is dispatched to every handler\nthat accepts its level."
    );
    assert_eq!(add_record["argumentsList"][0], "int $level");
    assert_eq!(add_record["argumentsList"][1], "string $message");
    assert_eq!(add_record["argumentsDescription"][0]["name"], "$level");
    assert_eq!(add_record["returnValue"][0]["type"], "bool");
    assert_eq!(
        add_record["throwsExceptions"][0]["type"],
        "\\InvalidArgumentException"
    );
    assert_eq!(add_record["visibility"], "public");
    assert_eq!(add_record["type"], "->");

    let level_name = &logger["methods"]["levelName"];
    assert_eq!(level_name["visibility"], "final public static");
    assert_eq!(level_name["type"], "::");

    // Own methods keep declaration order.
    let own: Vec<&String> = logger["methods"].as_object().unwrap().keys().collect();
    assert_eq!(own, ["addRecord", "levelName", "count"]);

    // Array-valued constant reports its type name, scalars their literal.
    assert_eq!(logger["constants"]["LEVELS"]["value"], "array");
    assert_eq!(logger["constants"]["DEBUG"]["value"], "100");
    assert_eq!(logger["constants"]["DEFAULT_NAME"]["value"], "\"app\"");
    assert_eq!(logger["constants"]["DEFAULT_NAME"]["short"], "");

    // The parent is imported but never scanned, so nothing is inherited.
    assert_eq!(logger["parent"], "Psr\\Log\\AbstractLogger");
    assert!(logger["inheritedMethods"].as_object().unwrap().is_empty());
}

#[test]
fn stdin_mode_fallback_shape_with_atlas() {
    let input = std::fs::read_to_string(fixture_path("logger.php")).unwrap();

    let assert = cmd()
        .args(["--class", "Acme\\Log\\Logger"])
        .args(["--atlas", &fixture_path("atlas.json")])
        .write_stdin(input)
        .assert()
        .success();
    let logger = stdout_json(assert);

    // `count()` has no docblock, so it takes the fallback shape: only
    // shortDescription, doclink, and type.
    let count = logger["methods"]["count"].as_object().unwrap();
    assert_eq!(count.len(), 3);
    assert_eq!(count["shortDescription"], "Counts the buffered records.");
    assert_eq!(
        count["doclink"],
        "https://secure.php.net/manual/en/countable.count.php"
    );
    assert_eq!(count["type"], "->");
    assert!(count.get("visibility").is_none());
    assert!(count.get("argumentsList").is_none());
}

#[test]
fn stdin_mode_fallback_without_atlas_is_empty() {
    let input = std::fs::read_to_string(fixture_path("logger.php")).unwrap();

    let assert = cmd()
        .args(["--class", "Acme\\Log\\Logger"])
        .write_stdin(input)
        .assert()
        .success();
    let logger = stdout_json(assert);

    let count = logger["methods"]["count"].as_object().unwrap();
    assert_eq!(count["shortDescription"], "");
    assert_eq!(count["doclink"], "");
}

#[test]
fn stdin_mode_unknown_class_fails() {
    cmd()
        .args(["--class", "Missing"])
        .write_stdin("<?php\nclass Present {}\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown class: Missing"));
}

// -- file mode --

#[test]
fn file_mode_creates_per_class_documents() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("animals.php"))
        .arg(fixture_path("logger.php"))
        .assert()
        .success();

    assert!(dir.path().join("Animal.json").exists());
    assert!(dir.path().join("Dog.json").exists());
    assert!(dir.path().join("Acme.Log.Logger.json").exists());

    let dog: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("Dog.json")).unwrap())
            .unwrap();
    assert_eq!(dog["methods"]["speak"]["shortDescription"], "Barks loudly.");
}

#[test]
fn file_mode_requires_output() {
    cmd()
        .arg(fixture_path("animals.php"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output is required"));
}

#[test]
fn file_mode_class_to_stdout() {
    let assert = cmd()
        .args(["--class", "Animal"])
        .arg(fixture_path("animals.php"))
        .assert()
        .success();
    let animal = stdout_json(assert);

    assert_eq!(
        animal["description"]["short"],
        "Base class for every animal."
    );
    assert_eq!(
        animal["description"]["long"],
        "Provides the shared behavior all species\nbuild on."
    );
    assert_eq!(animal["parent"], serde_json::Value::Null);
}

#[test]
fn file_mode_warns_on_unreadable_input() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("animals.php"))
        .arg("does-not-exist.php")
        .assert()
        .success()
        .stderr(predicate::str::contains("warning"));

    assert!(dir.path().join("Dog.json").exists());
}
