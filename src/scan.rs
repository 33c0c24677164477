//! PHP source scanner: a line-by-line state machine.
//!
//! Builds the class metadata table the reflective queries run against.
//! One pass per file collects namespaces, `use` imports, class declarations
//! with their `extends`/`implements` clauses, public/protected/private
//! methods with their modifiers, `const` declarations with literal values,
//! and the docblock attached to each declaration.
//!
//! The scanner is deliberately tolerant: constructs it does not understand
//! (traits, properties, closures, attributes) are skipped, never fatal.

use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use crate::registry::{ClassMeta, ClassRegistry, ConstantMeta, MethodMeta, Visibility};
use crate::Error;

// -- Regex patterns -----------------------------------------------------------

static RE_NAMESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[[:space:]]*namespace[[:space:]]+([\w\\]+)[[:space:]]*;").unwrap());

static RE_USE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[[:space:]]*use[[:space:]]+\\?([\w\\]+)(?:[[:space:]]+as[[:space:]]+(\w+))?[[:space:]]*;").unwrap()
});

static RE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[[:space:]]*(?:(?:final|abstract)[[:space:]]+)*class[[:space:]]+(\w+)(?:[[:space:]]+extends[[:space:]]+([\w\\]+))?(?:[[:space:]]+implements[[:space:]]+([\w\\,[:space:]]+?))?[[:space:]]*(?:\{[[:space:]]*\}?)?[[:space:]]*$",
    )
    .unwrap()
});

static RE_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[[:space:]]*((?:(?:public|protected|private|static|final|abstract)[[:space:]]+)*)function[[:space:]]+&?(\w+)[[:space:]]*\(",
    )
    .unwrap()
});

static RE_CONST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[[:space:]]*((?:(?:public|protected|private|final)[[:space:]]+)*)const[[:space:]]+(\w+)[[:space:]]*=[[:space:]]*(.*?);?[[:space:]]*$",
    )
    .unwrap()
});

static RE_BLANK_OR_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[[:space:]]*(//.*|#.*|\*.*)?$").unwrap());

// -- Scanner state ------------------------------------------------------------

#[derive(Default)]
struct ScanState {
    namespace: String,
    use_map: HashMap<String, String>,

    in_docblock: bool,
    docblock_buf: String,
    pending_doc: Option<String>,

    current_class: Option<ClassMeta>,
    class_entry_depth: i32,
    depth: i32,
}

// -- Public API ---------------------------------------------------------------

/// Scan one PHP source buffer into the registry.
pub fn scan_source(source: &str, registry: &mut ClassRegistry) {
    let mut state = ScanState::default();

    for line in source.lines() {
        let was_docblock = state.in_docblock || line.trim_start().starts_with("/**");
        process_line(&mut state, line);

        // Braces inside docblocks (inline tags like `{@see ...}`) are text,
        // not structure.
        if was_docblock {
            continue;
        }
        let code = strip_strings_and_comments(line);
        state.depth += code.matches('{').count() as i32;
        state.depth -= code.matches('}').count() as i32;

        if state.current_class.is_some() && state.depth <= state.class_entry_depth {
            if let Some(meta) = state.current_class.take() {
                registry.insert(meta);
            }
        }
    }

    // Unterminated class body at end of input: keep what was collected.
    if let Some(meta) = state.current_class.take() {
        registry.insert(meta);
    }
}

/// Read and scan one file.
pub fn scan_path(path: &Path, registry: &mut ClassRegistry) -> Result<(), Error> {
    let content = fs::read_to_string(path)?;
    scan_source(&content, registry);
    Ok(())
}

// -- Line processing ----------------------------------------------------------

fn process_line(s: &mut ScanState, line: &str) {
    // 1. Docblock continuation.
    if s.in_docblock {
        s.docblock_buf.push('\n');
        s.docblock_buf.push_str(line);
        if line.contains("*/") {
            s.in_docblock = false;
            s.pending_doc = Some(std::mem::take(&mut s.docblock_buf));
        }
        return;
    }

    // 2. Docblock start, possibly single-line.
    let trimmed = line.trim_start();
    if trimmed.starts_with("/**") {
        if trimmed.contains("*/") {
            s.pending_doc = Some(trimmed.to_string());
        } else {
            s.in_docblock = true;
            s.docblock_buf = line.to_string();
        }
        return;
    }

    // 3. Namespace declaration resets the import context.
    if let Some(caps) = RE_NAMESPACE.captures(line) {
        s.namespace = caps[1].to_string();
        s.use_map.clear();
        s.pending_doc = None;
        return;
    }

    // 4. Top-level `use` imports. Inside a class body `use` pulls in a
    //    trait, which this scanner does not model.
    if s.current_class.is_none() {
        if let Some(caps) = RE_USE.captures(line) {
            let target = caps[1].to_string();
            let alias = caps
                .get(2)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| last_segment(&target).to_string());
            s.use_map.insert(alias, target);
            return;
        }
    }

    // 5. Class declaration.
    if s.current_class.is_none() {
        if let Some(caps) = RE_CLASS.captures(line) {
            let name = qualify(&caps[1], &s.namespace);
            let parent = caps
                .get(2)
                .map(|m| resolve_name(m.as_str(), &s.namespace, &s.use_map));
            let interfaces = caps
                .get(3)
                .map(|m| {
                    m.as_str()
                        .split(',')
                        .map(|i| resolve_name(i.trim(), &s.namespace, &s.use_map))
                        .filter(|i| !i.is_empty())
                        .collect()
                })
                .unwrap_or_default();

            s.current_class = Some(ClassMeta {
                name,
                parent,
                interfaces,
                doc: s.pending_doc.take(),
                methods: Vec::new(),
                constants: Vec::new(),
            });
            s.class_entry_depth = s.depth;
            return;
        }
    }

    // 6. Members, only at class-body depth so closures and nested
    //    declarations inside method bodies are never picked up.
    if let Some(class) = s.current_class.as_mut() {
        if s.depth == s.class_entry_depth + 1 {
            if let Some(caps) = RE_METHOD.captures(line) {
                let modifiers = &caps[1];
                class.methods.push(MethodMeta {
                    name: caps[2].to_string(),
                    visibility: parse_visibility(modifiers),
                    is_static: modifiers.contains("static"),
                    is_final: modifiers.contains("final"),
                    is_abstract: modifiers.contains("abstract"),
                    doc: s.pending_doc.take(),
                });
                return;
            }

            if let Some(caps) = RE_CONST.captures(line) {
                class.constants.push(ConstantMeta {
                    name: caps[2].to_string(),
                    visibility: parse_visibility(&caps[1]),
                    value: parse_literal(&caps[3]),
                    doc: s.pending_doc.take(),
                });
                return;
            }
        }
    }

    // A docblock only documents the declaration that immediately follows
    // it; any other code line in between consumes it.
    if !RE_BLANK_OR_COMMENT.is_match(line) {
        s.pending_doc = None;
    }
}

// -- Helper functions ---------------------------------------------------------

fn parse_visibility(modifiers: &str) -> Visibility {
    if modifiers.contains("private") {
        Visibility::Private
    } else if modifiers.contains("protected") {
        Visibility::Protected
    } else {
        Visibility::Public
    }
}

/// Resolve a referenced class name against the import map and the current
/// namespace, the way PHP resolves unqualified names.
fn resolve_name(name: &str, namespace: &str, use_map: &HashMap<String, String>) -> String {
    if let Some(absolute) = name.strip_prefix('\\') {
        return absolute.to_string();
    }

    let (first, rest) = match name.split_once('\\') {
        Some((first, rest)) => (first, Some(rest)),
        None => (name, None),
    };

    if let Some(target) = use_map.get(first) {
        return match rest {
            Some(rest) => format!("{}\\{}", target, rest),
            None => target.clone(),
        };
    }

    qualify(name, namespace)
}

fn qualify(name: &str, namespace: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}\\{}", namespace, name)
    }
}

fn last_segment(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

/// Parse a constant initializer into a JSON value. Expressions that are not
/// literals (`self::FOO`, `PHP_EOL`, arithmetic) are kept as raw strings.
fn parse_literal(text: &str) -> Value {
    let text = text.trim().trim_end_matches(',').trim();

    if let Some(unquoted) = strip_quotes(text, '\'').or_else(|| strip_quotes(text, '"')) {
        return Value::String(unquoted);
    }
    match text.to_ascii_lowercase().as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }
    if let Ok(int) = text.parse::<i64>() {
        return json!(int);
    }
    if let Ok(float) = text.parse::<f64>() {
        if let Some(number) = serde_json::Number::from_f64(float) {
            return Value::Number(number);
        }
    }
    if text.starts_with('[') || text.to_ascii_lowercase().starts_with("array(") {
        return json!([]);
    }

    Value::String(text.to_string())
}

fn strip_quotes(text: &str, quote: char) -> Option<String> {
    let inner = text.strip_prefix(quote)?.strip_suffix(quote)?;
    Some(
        inner
            .replace("\\\\", "\\")
            .replace(&format!("\\{}", quote), &quote.to_string()),
    )
}

/// Drop string contents and trailing line comments so brace counting only
/// sees structural braces.
fn strip_strings_and_comments(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    let mut in_string: Option<char> = None;

    while let Some(c) = chars.next() {
        match in_string {
            Some(quote) => {
                if c == '\\' {
                    chars.next();
                } else if c == quote {
                    in_string = None;
                }
            }
            None => match c {
                '\'' | '"' => in_string = Some(c),
                '/' if chars.peek() == Some(&'/') => break,
                '#' => break,
                _ => out.push(c),
            },
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> ClassRegistry {
        let mut registry = ClassRegistry::new();
        scan_source(source, &mut registry);
        registry
    }

    #[test]
    fn scan_simple_class() {
        let registry = scan(
            r#"<?php
/**
 * A dog.
 */
class Dog extends Animal implements Stringable
{
    /** Barks loudly. */
    public function speak(): string
    {
        return "woof";
    }
}
"#,
        );
        let dog = registry.handle("Dog").unwrap();
        assert_eq!(dog.parent_class_name(), Some("Animal"));
        assert_eq!(dog.interface_names(), vec!["Stringable"]);
        assert!(dog.raw_doc().contains("A dog."));
        let methods = dog.public_methods();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name(), "speak");
        assert!(methods[0].raw_doc().contains("Barks loudly."));
    }

    #[test]
    fn namespace_and_use_resolution() {
        let registry = scan(
            r#"<?php
namespace App\Models;

use Psr\Log\AbstractLogger;
use App\Contracts\Named as HasName;

class Logger extends AbstractLogger implements HasName, \JsonSerializable
{
}
"#,
        );
        let logger = registry.handle("App\\Models\\Logger").unwrap();
        assert_eq!(
            logger.parent_class_name(),
            Some("Psr\\Log\\AbstractLogger")
        );
        assert_eq!(
            logger.interface_names(),
            vec!["App\\Contracts\\Named", "JsonSerializable"]
        );
    }

    #[test]
    fn unqualified_parent_takes_current_namespace() {
        let registry = scan(
            "<?php\nnamespace Zoo;\nclass Animal {}\nclass Dog extends Animal {}\n",
        );
        let dog = registry.handle("Zoo\\Dog").unwrap();
        assert_eq!(dog.parent_class_name(), Some("Zoo\\Animal"));
        assert!(dog.parent().is_some());
    }

    #[test]
    fn method_modifiers() {
        let registry = scan(
            r#"<?php
class Util
{
    /** Formats a value. */
    final public static function format($value) {}

    /** Internal helper. */
    protected function helper() {}

    private function secret() {}

    /** Plain method. */
    function plain() {}
}
"#,
        );
        let util = registry.handle("Util").unwrap();
        let methods = util.public_methods();
        let names: Vec<&str> = methods.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["format", "plain"]);
        assert!(methods[0].is_static());
        assert!(methods[0].is_final());
        assert!(!methods[1].is_static());
    }

    #[test]
    fn constants_with_literal_values() {
        let registry = scan(
            r#"<?php
class Level
{
    /** Informational events. */
    const INFO = 200;
    public const NAME = 'level';
    const THRESHOLD = 1.5;
    const ENABLED = true;
    const EMPTY_DEFAULT = null;
    const ALL = [100, 200, 300];
    private const SECRET = 'hidden';
}
"#,
        );
        let level = registry.handle("Level").unwrap();
        let constants = level.public_constants();
        let names: Vec<&str> = constants.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec!["INFO", "NAME", "THRESHOLD", "ENABLED", "EMPTY_DEFAULT", "ALL"]
        );
        assert_eq!(constants[0].value(), &json!(200));
        assert!(constants[0].raw_doc().contains("Informational"));
        assert_eq!(constants[1].value(), &json!("level"));
        assert_eq!(constants[3].value(), &json!(true));
        assert_eq!(constants[4].value(), &Value::Null);
        assert!(constants[5].value().is_array());
    }

    #[test]
    fn docblock_does_not_leak_across_declarations() {
        let registry = scan(
            r#"<?php
class Store
{
    /** The backing array. */
    private $items = [];

    public function count(): int
    {
        return count($this->items);
    }
}
"#,
        );
        let store = registry.handle("Store").unwrap();
        let methods = store.public_methods();
        assert_eq!(methods[0].name(), "count");
        assert_eq!(methods[0].raw_doc(), "");
    }

    #[test]
    fn closures_inside_methods_are_not_members() {
        let registry = scan(
            r#"<?php
class Mapper
{
    public function map(array $input): array
    {
        $f = function ($x) {
            return $x + 1;
        };
        return array_map($f, $input);
    }
}
"#,
        );
        let mapper = registry.handle("Mapper").unwrap();
        assert_eq!(mapper.public_methods().len(), 1);
    }

    #[test]
    fn braces_in_strings_do_not_break_tracking() {
        let registry = scan(
            r#"<?php
class Tpl
{
    public function open(): string
    {
        return "{"; // a lone brace "{{"
    }

    public function close(): string
    {
        return '}';
    }
}
"#,
        );
        let tpl = registry.handle("Tpl").unwrap();
        assert_eq!(tpl.public_methods().len(), 2);
    }

    #[test]
    fn multiple_classes_per_file() {
        let registry = scan(
            r#"<?php
class A
{
    public function one() {}
}

class B extends A
{
    public function two() {}
}
"#,
        );
        assert_eq!(registry.class_names(), vec!["A", "B"]);
        let b = registry.handle("B").unwrap();
        let names: Vec<&str> = b.public_methods().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["two", "one"]);
    }

    #[test]
    fn literal_kinds() {
        assert_eq!(parse_literal("'abc'"), json!("abc"));
        assert_eq!(parse_literal("\"a\\\"b\""), json!("a\"b"));
        assert_eq!(parse_literal("42"), json!(42));
        assert_eq!(parse_literal("-7"), json!(-7));
        assert_eq!(parse_literal("3.25"), json!(3.25));
        assert_eq!(parse_literal("TRUE"), json!(true));
        assert_eq!(parse_literal("null"), Value::Null);
        assert!(parse_literal("[1, 2]").is_array());
        assert!(parse_literal("array('a')").is_array());
        assert_eq!(parse_literal("self::OTHER"), json!("self::OTHER"));
    }
}
