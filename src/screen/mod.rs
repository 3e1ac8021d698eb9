//! AST-based security screening of generated Python source.
//!
//! Generated code is parsed with tree-sitter and walked for a fixed set of
//! dangerous constructs before it is allowed anywhere near the sandbox:
//!
//! - imports of modules on the deny list (`import os`, `from sys import ...`)
//! - calls to denied builtins (`eval`, `exec`, `open`, ...)
//! - dunder attribute access (`obj.__class__`)
//!
//! Screening is pure: it never executes or imports anything. An empty
//! violation list means the code may proceed to execution.

mod validator;

pub use validator::screen_source;

use std::fmt;

/// Module and builtin names that generated code is never allowed to touch.
pub const DANGEROUS_NAMES: &[&str] = &[
    "os",
    "subprocess",
    "sys",
    "importlib",
    "eval",
    "exec",
    "open",
    "__import__",
    "compile",
    "globals",
    "locals",
];

/// A single security violation found in generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// `import X` where the root module is on the deny list.
    Import { module: String },
    /// `from X import ...` where the root of X is on the deny list.
    ImportFrom { module: String },
    /// A call to a denied name, e.g. `eval(...)`.
    Call { name: String },
    /// Attribute access starting with `__`, e.g. `x.__class__`.
    DunderAttribute { name: String },
    /// The source failed to parse at all.
    Syntax { message: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Import { module } => write!(f, "Dangerous import: {}", module),
            Violation::ImportFrom { module } => write!(f, "Dangerous import from: {}", module),
            Violation::Call { name } => write!(f, "Dangerous function call: {}", name),
            Violation::DunderAttribute { name } => {
                write!(f, "Dangerous attribute access: {}", name)
            }
            Violation::Syntax { message } => write!(f, "Syntax error: {}", message),
        }
    }
}

/// Join violations into the single error string fed back to the generator.
pub fn describe_violations(violations: &[Violation]) -> String {
    let joined = violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    format!("Security violations: {}", joined)
}

/// Whether a name is on the deny list.
pub(crate) fn is_dangerous(name: &str) -> bool {
    DANGEROUS_NAMES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deny_list_membership() {
        assert!(is_dangerous("os"));
        assert!(is_dangerous("eval"));
        assert!(is_dangerous("__import__"));
        assert!(!is_dangerous("math"));
        assert!(!is_dangerous("json"));
    }

    #[test]
    fn test_violation_display_matches_feedback_format() {
        let v = Violation::Import {
            module: "os".to_string(),
        };
        assert_eq!(v.to_string(), "Dangerous import: os");

        let v = Violation::Call {
            name: "eval".to_string(),
        };
        assert_eq!(v.to_string(), "Dangerous function call: eval");
    }

    #[test]
    fn test_describe_violations_joins_with_semicolons() {
        let violations = vec![
            Violation::Import {
                module: "os".to_string(),
            },
            Violation::Call {
                name: "exec".to_string(),
            },
        ];
        let desc = describe_violations(&violations);
        assert_eq!(
            desc,
            "Security violations: Dangerous import: os; Dangerous function call: exec"
        );
    }
}
