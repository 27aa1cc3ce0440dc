//! BitBake-style recipe parsing
//!
//! Text is first split into logical lines (backslash continuations joined),
//! then each line becomes at most one [`Statement`]. Comments and anything
//! unrecognized are dropped. [`RecipeDict::from_statements`] evaluates the
//! statements into a key/value view.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static TASK_HEADER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:python|fakeroot)\s+)*(do_[A-Za-z0-9_:\-]+)\s*\(\s*\)\s*\{\s*$").ok()
});

static VARIABLE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"^(?:export\s+)?([A-Za-z0-9_\-${}:\[\]]+?)\s*(\?\?=|\?=|:=|\+=|\.=|=\+|=\.|=)\s*(.*?)\s*$"#,
    )
    .ok()
});

/// Assignment flavors that set a value outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Set,
    /// `:=`
    Immediate,
    /// `?=`
    Default,
    /// `??=`
    WeakDefault,
}

/// One recipe statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Assign {
        key: String,
        op: AssignOp,
        value: String,
    },
    /// `+=` (with space) or `.=` (without)
    Append {
        key: String,
        value: String,
        spaced: bool,
    },
    /// `=+` (with space) or `=.` (without)
    Prepend {
        key: String,
        value: String,
        spaced: bool,
    },
    /// `do_X() { ... }`
    TaskBody { name: String, lines: Vec<String> },
    /// `inherit a b c`
    Inherit { classes: Vec<String> },
}

/// Which part of a task or variable an override suffix addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Prepend,
    Base,
    Append,
}

/// Split `KEY_append`, `KEY:append`, `KEY_prepend`, `KEY:prepend`
fn split_override(key: &str) -> (&str, Part) {
    for (suffix, part) in [
        ("_append", Part::Append),
        (":append", Part::Append),
        ("_prepend", Part::Prepend),
        (":prepend", Part::Prepend),
    ] {
        if let Some(base) = key.strip_suffix(suffix) {
            if !base.is_empty() {
                return (base, part);
            }
        }
    }
    (key, Part::Base)
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Join backslash-continued lines
fn logical_lines(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut pending: Option<String> = None;

    for raw in text.lines() {
        let line = raw.trim_end();
        let (content, continues) = match line.strip_suffix('\\') {
            Some(head) => (head, true),
            None => (line, false),
        };

        let joined = match pending.take() {
            Some(mut acc) => {
                let piece = content.trim_start();
                if !acc.ends_with(' ') && !piece.is_empty() {
                    acc.push(' ');
                }
                acc.push_str(piece);
                acc
            }
            None => content.to_string(),
        };

        if continues {
            pending = Some(joined);
        } else {
            out.push(joined);
        }
    }
    out.extend(pending);
    out
}

/// Parse recipe text into statements
#[must_use]
pub fn parse(text: &str) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut lines = logical_lines(text).into_iter();

    while let Some(line) = lines.next() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(name) = TASK_HEADER
            .as_ref()
            .and_then(|re| re.captures(trimmed))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
        {
            let body = lines
                .by_ref()
                .take_while(|l| l.trim() != "}")
                .collect();
            statements.push(Statement::TaskBody { name, lines: body });
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("inherit ") {
            let classes = rest.split_whitespace().map(ToString::to_string).collect();
            statements.push(Statement::Inherit { classes });
            continue;
        }

        let Some(caps) = VARIABLE.as_ref().and_then(|re| re.captures(trimmed)) else {
            tracing::trace!(line = trimmed, "skipping unrecognized recipe line");
            continue;
        };
        let key = caps[1].to_string();
        let value = unquote(&caps[3]).to_string();
        let statement = match &caps[2] {
            "=" => Statement::Assign {
                key,
                op: AssignOp::Set,
                value,
            },
            ":=" => Statement::Assign {
                key,
                op: AssignOp::Immediate,
                value,
            },
            "?=" => Statement::Assign {
                key,
                op: AssignOp::Default,
                value,
            },
            "??=" => Statement::Assign {
                key,
                op: AssignOp::WeakDefault,
                value,
            },
            "+=" | ".=" => Statement::Append {
                spaced: &caps[2] == "+=",
                key,
                value,
            },
            _ => Statement::Prepend {
                spaced: &caps[2] == "=+",
                key,
                value,
            },
        };
        statements.push(statement);
    }

    statements
}

/// Lines of one task, kept apart by override part
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskBlock {
    pub prepend: Vec<String>,
    pub base: Vec<String>,
    pub append: Vec<String>,
}

impl TaskBlock {
    /// Prepend lines, then base lines, then append lines
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.prepend
            .iter()
            .chain(&self.base)
            .chain(&self.append)
            .cloned()
            .collect()
    }
}

/// Evaluated recipe: variables, task blocks and inherited classes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeDict {
    vars: BTreeMap<String, String>,
    tasks: BTreeMap<String, TaskBlock>,
    inherits: Vec<String>,
}

impl RecipeDict {
    /// Parse and evaluate recipe text
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::from_statements(&parse(text))
    }

    /// Evaluate statements in order
    #[must_use]
    pub fn from_statements(statements: &[Statement]) -> Self {
        let mut dict = Self::default();
        let mut weak: BTreeMap<String, String> = BTreeMap::new();
        let mut pending: Vec<(String, Part, String)> = Vec::new();

        for statement in statements {
            match statement {
                Statement::Assign { key, op, value } => {
                    let (base, part) = split_override(key);
                    if part != Part::Base {
                        pending.push((base.to_string(), part, value.clone()));
                        continue;
                    }
                    match op {
                        AssignOp::Set | AssignOp::Immediate => {
                            dict.vars.insert(key.clone(), value.clone());
                        }
                        AssignOp::Default => {
                            dict.vars
                                .entry(key.clone())
                                .or_insert_with(|| value.clone());
                        }
                        AssignOp::WeakDefault => {
                            weak.insert(key.clone(), value.clone());
                        }
                    }
                }
                Statement::Append { key, value, spaced } => {
                    let (base, part) = split_override(key);
                    if part != Part::Base {
                        pending.push((base.to_string(), part, value.clone()));
                        continue;
                    }
                    let entry = dict.var_for_update(key, &mut weak);
                    if *spaced && !entry.is_empty() {
                        entry.push(' ');
                    }
                    entry.push_str(value);
                }
                Statement::Prepend { key, value, spaced } => {
                    let (base, part) = split_override(key);
                    if part != Part::Base {
                        pending.push((base.to_string(), part, value.clone()));
                        continue;
                    }
                    let entry = dict.var_for_update(key, &mut weak);
                    let mut joined = value.clone();
                    if *spaced && !entry.is_empty() {
                        joined.push(' ');
                    }
                    joined.push_str(entry);
                    *entry = joined;
                }
                Statement::TaskBody { name, lines } => {
                    let (base, part) = split_override(name);
                    let block = dict.tasks.entry(base.to_string()).or_default();
                    match part {
                        Part::Prepend => block.prepend.extend(lines.iter().cloned()),
                        Part::Base => block.base.clone_from(lines),
                        Part::Append => block.append.extend(lines.iter().cloned()),
                    }
                }
                Statement::Inherit { classes } => {
                    dict.inherits.extend(classes.iter().cloned());
                }
            }
        }

        for (key, value) in weak {
            dict.vars.entry(key).or_insert(value);
        }

        // Override-style suffixes apply after the rest of the recipe
        for (key, part, value) in pending {
            let entry = dict.vars.entry(key).or_default();
            let value = value.trim();
            match part {
                Part::Append => {
                    if !entry.is_empty() && !value.is_empty() {
                        entry.push(' ');
                    }
                    entry.push_str(value);
                }
                Part::Prepend => {
                    let mut joined = value.to_string();
                    if !entry.is_empty() && !value.is_empty() {
                        joined.push(' ');
                    }
                    joined.push_str(entry);
                    *entry = joined;
                }
                Part::Base => {}
            }
        }

        dict
    }

    /// Current value of `key` for in-place edits, seeded from a weak default
    fn var_for_update(&mut self, key: &str, weak: &mut BTreeMap<String, String>) -> &mut String {
        let seed = weak.remove(key);
        self.vars
            .entry(key.to_string())
            .or_insert_with(|| seed.unwrap_or_default())
    }

    /// Variable value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Task block by base name, e.g. `do_install`
    #[must_use]
    pub fn task(&self, name: &str) -> Option<&TaskBlock> {
        self.tasks.get(name)
    }

    /// All task blocks in name order
    pub fn tasks(&self) -> impl Iterator<Item = (&str, &TaskBlock)> {
        self.tasks.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn inherits(&self) -> &[String] {
        &self.inherits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statements_are_tagged() {
        let statements = parse(
            "# comment\nSUMMARY = \"Fast XYZ\"\nPV ?= '1.0'\nDEPENDS += \"zlib\"\nFOO =. \"pre\"\ninherit cmake pkgconfig\nnonsense line\n",
        );
        assert_eq!(
            statements,
            [
                Statement::Assign {
                    key: "SUMMARY".into(),
                    op: AssignOp::Set,
                    value: "Fast XYZ".into(),
                },
                Statement::Assign {
                    key: "PV".into(),
                    op: AssignOp::Default,
                    value: "1.0".into(),
                },
                Statement::Append {
                    key: "DEPENDS".into(),
                    value: "zlib".into(),
                    spaced: true,
                },
                Statement::Prepend {
                    key: "FOO".into(),
                    value: "pre".into(),
                    spaced: false,
                },
                Statement::Inherit {
                    classes: vec!["cmake".into(), "pkgconfig".into()],
                },
            ]
        );
    }

    #[test]
    fn continuation_lines_join() {
        let dict = RecipeDict::parse("DEPENDS = \"zlib \\\n    openssl \\\n    bzip2\"\n");
        assert_eq!(dict.get("DEPENDS"), Some("zlib openssl bzip2"));
    }

    #[test]
    fn assignment_flavors() {
        let dict = RecipeDict::parse(
            "A ?= \"first\"\nA ?= \"second\"\nB ??= \"weak\"\nB = \"strong\"\nC ??= \"only\"\nD := \"x\"\nD += \"y\"\nD .= \"z\"\nD =+ \"w\"\n",
        );
        assert_eq!(dict.get("A"), Some("first"));
        assert_eq!(dict.get("B"), Some("strong"));
        assert_eq!(dict.get("C"), Some("only"));
        assert_eq!(dict.get("D"), Some("w x yz"));
    }

    #[test]
    fn variable_overrides_fold_into_base_key() {
        let dict = RecipeDict::parse(
            "DEPENDS_append = \" libfoo\"\nDEPENDS = \"zlib\"\nDEPENDS:prepend = \"first \"\n",
        );
        assert_eq!(dict.get("DEPENDS"), Some("first zlib libfoo"));
    }

    #[test]
    fn task_blocks_order_prepend_base_append() {
        let dict = RecipeDict::parse(
            "do_install_append() {\n    echo after\n}\ndo_install() {\n    oe_runmake install\n}\ndo_install:prepend() {\n    echo before\n}\n",
        );
        let block = dict.task("do_install").unwrap();
        assert_eq!(
            block.lines(),
            ["    echo before", "    oe_runmake install", "    echo after"]
        );
        assert!(dict.task("do_install_append").is_none());
    }

    #[test]
    fn unterminated_task_takes_the_rest() {
        let dict = RecipeDict::parse("python do_configure() {\n  bb.note('x')\n");
        assert_eq!(dict.task("do_configure").unwrap().base, ["  bb.note('x')"]);
    }
}
