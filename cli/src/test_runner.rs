use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use ctl::edit::apply_edit;
use ctl::parser::Parser;

const TEST_SUFFIX: &str = ".test.ctl";
const FENCE: &str = "---";

#[derive(Debug, Deserialize)]
pub struct TestEdit {
    /// Block to replace.
    pub block: String,

    /// Replacement text, as an editor would hand it over.
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Expected rendered model after all edits (trimmed comparison).
    #[serde(default)]
    pub expect_output: Option<String>,

    /// Expected error — the error's Display string must contain this substring.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// Expected block names of the parsed source, in order.
    #[serde(default)]
    pub expect_blocks: Option<Vec<String>>,

    /// Edits applied in order to the parsed source.
    #[serde(default)]
    pub edits: Vec<TestEdit>,
}

/// Split a `.test.ctl` file into its TOML config and the control file after it.
///
/// The config sits between two lines consisting of `---`.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let is_fence = |line: &str| line.trim_end() == FENCE;

    let mut lines = content.split_inclusive('\n');
    let toml_start = match lines.next() {
        Some(first) if is_fence(first) => first.len(),
        _ => return Err(format!("test file must open with a {} line", FENCE)),
    };

    let mut pos = toml_start;
    for line in lines {
        if is_fence(line) {
            let config: TestConfig = toml::from_str(&content[toml_start..pos])
                .map_err(|e| format!("TOML parse error: {}", e))?;
            return Ok((config, &content[pos + line.len()..]));
        }
        pos += line.len();
    }
    Err(format!("config is not closed by a {} line", FENCE))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

fn run_single_test(path: &Path, marker: char) -> TestResult {
    let fail = |description: Option<String>, reason: String| TestResult {
        path: path.to_path_buf(),
        description,
        outcome: TestOutcome::Fail(reason),
    };

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return fail(None, format!("cannot read file: {}", e)),
    };

    let (config, source) = match parse_test_file(&content) {
        Ok(pair) => pair,
        Err(e) => return fail(None, format!("frontmatter error: {}", e)),
    };
    let description = config.description.clone();

    match check(&config, source, marker) {
        Ok(()) => TestResult {
            path: path.to_path_buf(),
            description,
            outcome: TestOutcome::Pass,
        },
        Err(reason) => fail(description, reason),
    }
}

/// Run one test case. Returns the failure reason on mismatch.
fn check(config: &TestConfig, source: &str, marker: char) -> Result<(), String> {
    let parsed = Parser::new(source.to_string(), 0).with_marker(marker).parse();

    if let Some(expected) = &config.expect_blocks {
        let actual: Vec<&str> = parsed.names().collect();
        if actual != *expected {
            return Err(format!(
                "block mismatch\n  expected: {}\n  actual:   {}",
                expected.join(" "),
                actual.join(" ")
            ));
        }
    }

    let mut edited = parsed.copy();
    let edit_result = config
        .edits
        .iter()
        .try_for_each(|edit| apply_edit(&mut edited, &edit.block, &edit.content));

    match (&config.expect_error, edit_result) {
        (Some(expected), Err(err)) => {
            let err_str = err.to_string();
            return if err_str.contains(expected.as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "expected error containing \"{}\", got: {}",
                    expected, err_str
                ))
            };
        }
        (Some(expected), Ok(())) => {
            return Err(format!(
                "expected error containing \"{}\", but all edits succeeded",
                expected
            ));
        }
        (None, Err(err)) => return Err(format!("unexpected error: {}", err)),
        (None, Ok(())) => {}
    }

    let actual = edited.render();
    if let Some(expected) = &config.expect_output {
        let expected = expected.trim();
        if actual != expected {
            return Err(format!(
                "output mismatch\n  expected: {}\n  actual:   {}",
                expected, actual
            ));
        }
    }

    // The recorded edits must reproduce the same model from a fresh parse.
    let log = edited
        .change_log()
        .to_json(ctl::changelog::DEFAULT_INDENT)
        .map_err(|e| format!("cannot serialize change log: {}", e))?;
    let replayed = replay::replay(&parsed, &log, 0)
        .map_err(|e| format!("replay failed: {}", e))?
        .store
        .render();
    if replayed != actual {
        return Err(format!(
            "replay mismatch\n  edited:   {}\n  replayed: {}",
            actual, replayed
        ));
    }

    Ok(())
}

/// Discover `.test.ctl` files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.ends_with(TEST_SUFFIX) {
                let category = path
                    .parent()
                    .and_then(|p| p.strip_prefix(root).ok())
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_default();
                out.entry(category).or_default().push(path);
            }
        }
    }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        let label = if cat.is_empty() { "(root)" } else { cat.as_str() };
        eprintln!("  {} ({} tests)", label, files.len());
    }
}

fn paint(text: &str, code: &str, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    }
}

fn label_of<'a>(result: &'a TestResult) -> &'a str {
    result.description.as_deref().unwrap_or_else(|| {
        result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .and_then(|s| s.strip_suffix(TEST_SUFFIX))
            .unwrap_or("?")
    })
}

/// Run all `.test.ctl` files under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String], marker: char) -> i32 {
    let selected: Vec<(String, Vec<PathBuf>)> = if path.is_file() {
        vec![(String::new(), vec![path.to_path_buf()])]
    } else {
        let all_categories = discover_categorized(path);
        if all_categories.is_empty() {
            eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
            return 1;
        }
        select_categories(all_categories, categories)
    };

    if selected.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &selected {
        if !path.is_file() {
            let header = if cat.is_empty() { "(root)" } else { cat.as_str() };
            eprintln!();
            eprintln!("{}", paint(header, "1", no_color));
        }

        for file in files {
            let result = run_single_test(file, marker);
            match &result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", paint("PASS", "32", no_color), label_of(&result));
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", paint("FAIL", "31", no_color), label_of(&result));
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            if let TestOutcome::Fail(reason) = &f.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    let failed = failures.len();
    if failed == 0 {
        eprintln!("test result: {}. {} passed, 0 failed", paint("ok", "32", no_color), passed);
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            paint("FAILED", "31", no_color),
            passed,
            failed,
            passed + failed
        );
        1
    }
}

fn select_categories(
    all_categories: BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> Vec<(String, Vec<PathBuf>)> {
    if requested.is_empty() {
        return all_categories.into_iter().collect();
    }

    let mut selected = BTreeMap::new();
    for req in requested {
        let req = req.trim_matches('/');
        let matching: Vec<&String> = all_categories
            .keys()
            .filter(|cat| *cat == req || cat.starts_with(&format!("{}/", req)))
            .collect();
        if matching.is_empty() {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                all_categories
                    .keys()
                    .map(|k| if k.is_empty() { "(root)" } else { k.as_str() })
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        for cat in matching {
            selected.insert(cat.clone(), all_categories[cat].clone());
        }
    }
    selected.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CASE: &str = "---\n\
description = \"swap dataset\"\n\
expect_blocks = [\"$PROBLEM\", \"$DATA\"]\n\
expect_output = \"$PROBLEM x\\n\\n$DATA b.csv\"\n\
\n\
[[edits]]\n\
block = \"$DATA\"\n\
content = \"$DATA b.csv\\n\"\n\
---\n\
$PROBLEM x\n\
$DATA a.csv\n";

    #[test]
    fn frontmatter_and_source() {
        let (config, source) = parse_test_file(CASE).unwrap();
        assert_eq!(config.description.as_deref(), Some("swap dataset"));
        assert_eq!(config.edits.len(), 1);
        assert_eq!(source, "$PROBLEM x\n$DATA a.csv\n");
    }

    #[test]
    fn passing_case() {
        let (config, source) = parse_test_file(CASE).unwrap();
        assert_eq!(check(&config, source, '$'), Ok(()));
    }

    #[test]
    fn expected_error() {
        let case = "---\nexpect_error = \"not found\"\n[[edits]]\nblock = \"$TABLE\"\ncontent = \"\"\n---\n$PROBLEM x\n";
        let (config, source) = parse_test_file(case).unwrap();
        assert_eq!(check(&config, source, '$'), Ok(()));
    }

    #[test]
    fn output_mismatch_fails() {
        let case = "---\nexpect_output = \"$PROBLEM y\"\n---\n$PROBLEM x\n";
        let (config, source) = parse_test_file(case).unwrap();
        assert!(check(&config, source, '$').unwrap_err().starts_with("output mismatch"));
    }

    #[test]
    fn missing_delimiter() {
        assert!(parse_test_file("$PROBLEM x\n").is_err());
        assert!(parse_test_file("---\ndescription = \"x\"\n").is_err());
    }

    #[test]
    fn runs_directory_of_cases() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("edits");
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(sub.join("swap.test.ctl"), CASE).unwrap();

        assert_eq!(run_tests(dir.path(), true, &[], '$'), 0);
        assert_eq!(run_tests(dir.path(), true, &["edits".to_string()], '$'), 0);
        assert_eq!(run_tests(dir.path(), true, &["other".to_string()], '$'), 1);
    }

    #[test]
    fn bundled_cases_pass() {
        let cases = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/cases"));
        assert_eq!(run_tests(cases, true, &[], '$'), 0);
    }

    #[test]
    fn crlf_frontmatter() {
        let case = "---\r\ndescription = \"crlf\"\r\n---\r\n$PROBLEM x\r\n";
        let (config, source) = parse_test_file(case).unwrap();
        assert_eq!(config.description.as_deref(), Some("crlf"));
        assert_eq!(source, "$PROBLEM x\r\n");
    }
}
