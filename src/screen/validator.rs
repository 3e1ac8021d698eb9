//! Tree-sitter walk that flags dangerous constructs in Python source.

use tree_sitter::{Node, Parser};

use super::{Violation, is_dangerous};

/// Parse the source and collect all security violations.
///
/// A source that fails to parse yields a single `Violation::Syntax`, which
/// mirrors how a syntax error short-circuits screening: broken code never
/// reaches the sandbox either way.
pub fn screen_source(source: &str) -> Vec<Violation> {
    let mut parser = Parser::new();
    if parser.set_language(&tree_sitter_python::language()).is_err() {
        return vec![Violation::Syntax {
            message: "failed to load Python grammar".to_string(),
        }];
    }

    let Some(tree) = parser.parse(source, None) else {
        return vec![Violation::Syntax {
            message: "failed to parse source".to_string(),
        }];
    };

    let root = tree.root_node();
    if root.has_error() {
        if let Some(node) = first_error_node(&root) {
            let pos = node.start_position();
            return vec![Violation::Syntax {
                message: format!("invalid syntax at line {}, column {}", pos.row + 1, pos.column),
            }];
        }
        return vec![Violation::Syntax {
            message: "invalid syntax".to_string(),
        }];
    }

    let mut violations = Vec::new();
    walk(&root, source, &mut violations);
    violations
}

/// Find the first ERROR or missing node in the tree.
fn first_error_node<'a>(node: &Node<'a>) -> Option<Node<'a>> {
    if node.is_error() || node.is_missing() {
        return Some(*node);
    }
    for i in 0..node.child_count() {
        if let Some(found) = node.child(i).as_ref().and_then(first_error_node) {
            return Some(found);
        }
    }
    None
}

/// Recursive descent over the syntax tree.
fn walk(node: &Node, source: &str, violations: &mut Vec<Violation>) {
    match node.kind() {
        "import_statement" => check_import(node, source, violations),
        "import_from_statement" => check_import_from(node, source, violations),
        "call" => check_call(node, source, violations),
        "attribute" => check_attribute(node, source, violations),
        _ => {}
    }

    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            walk(&child, source, violations);
        }
    }
}

/// Text of a node, empty on out-of-range (cannot happen for a tree built
/// from the same source).
fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    source.get(node.byte_range()).unwrap_or("")
}

/// Root segment of a dotted module path: `os.path` -> `os`.
fn root_module(dotted: &str) -> &str {
    dotted.split('.').next().unwrap_or(dotted)
}

/// `import X` / `import X.Y` / `import X as y` — flag denied root modules.
fn check_import(node: &Node, source: &str, violations: &mut Vec<Violation>) {
    for i in 0..node.child_count() {
        let Some(child) = node.child(i) else { continue };
        let module = match child.kind() {
            "dotted_name" => node_text(&child, source),
            "aliased_import" => child
                .child_by_field_name("name")
                .map(|n| node_text(&n, source))
                .unwrap_or(""),
            _ => continue,
        };
        if is_dangerous(root_module(module)) {
            violations.push(Violation::Import {
                module: module.to_string(),
            });
        }
    }
}

/// `from X import ...` — flag denied root modules. Relative imports
/// (`from . import x`) have no module name and are left to the import
/// check on whatever they resolve to at runtime; the sandbox has no
/// package context for them to resolve against.
fn check_import_from(node: &Node, source: &str, violations: &mut Vec<Violation>) {
    if let Some(module_node) = node.child_by_field_name("module_name") {
        let module = node_text(&module_node, source);
        if is_dangerous(root_module(module)) {
            violations.push(Violation::ImportFrom {
                module: module.to_string(),
            });
        }
    }
}

/// Calls whose callee is a bare denied identifier, e.g. `eval(...)`.
fn check_call(node: &Node, source: &str, violations: &mut Vec<Violation>) {
    if let Some(func) = node.child_by_field_name("function")
        && func.kind() == "identifier"
    {
        let name = node_text(&func, source);
        if is_dangerous(name) {
            violations.push(Violation::Call {
                name: name.to_string(),
            });
        }
    }
}

/// Attribute access where the attribute name starts with `__`.
fn check_attribute(node: &Node, source: &str, violations: &mut Vec<Violation>) {
    if let Some(attr) = node.child_by_field_name("attribute") {
        let name = node_text(&attr, source);
        if name.starts_with("__") {
            violations.push(Violation::DunderAttribute {
                name: name.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_code_passes() {
        let source = "def add(a, b):\n    return a + b\n\nprint(add(1, 2))\n";
        assert!(screen_source(source).is_empty());
    }

    #[test]
    fn test_import_os_flagged() {
        let violations = screen_source("import os\nprint('hi')\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0],
            Violation::Import {
                module: "os".to_string()
            }
        );
    }

    #[test]
    fn test_import_submodule_flagged_via_root() {
        let violations = screen_source("import os.path\n");
        assert_eq!(violations.len(), 1);
        assert!(matches!(&violations[0], Violation::Import { module } if module == "os.path"));
    }

    #[test]
    fn test_import_alias_flagged() {
        let violations = screen_source("import subprocess as sp\n");
        assert_eq!(violations.len(), 1);
        assert!(
            matches!(&violations[0], Violation::Import { module } if module == "subprocess")
        );
    }

    #[test]
    fn test_import_from_flagged() {
        let violations = screen_source("from sys import argv\n");
        assert_eq!(violations.len(), 1);
        assert!(matches!(&violations[0], Violation::ImportFrom { module } if module == "sys"));
    }

    #[test]
    fn test_safe_imports_allowed() {
        assert!(screen_source("import math\nimport json\n").is_empty());
        assert!(screen_source("from collections import Counter\n").is_empty());
    }

    #[test]
    fn test_eval_call_flagged() {
        let violations = screen_source("x = eval('1 + 1')\n");
        assert_eq!(violations.len(), 1);
        assert!(matches!(&violations[0], Violation::Call { name } if name == "eval"));
    }

    #[test]
    fn test_open_call_flagged() {
        let violations = screen_source("f = open('data.txt')\n");
        assert!(
            violations
                .iter()
                .any(|v| matches!(v, Violation::Call { name } if name == "open"))
        );
    }

    #[test]
    fn test_method_named_eval_not_flagged() {
        // obj.eval(...) is not a bare call to the builtin
        assert!(screen_source("result = model.eval()\n").is_empty());
    }

    #[test]
    fn test_dunder_attribute_flagged() {
        let violations = screen_source("t = ().__class__\n");
        assert!(
            violations
                .iter()
                .any(|v| matches!(v, Violation::DunderAttribute { name } if name == "__class__"))
        );
    }

    #[test]
    fn test_plain_attribute_allowed() {
        assert!(screen_source("x = 'abc'.upper()\n").is_empty());
    }

    #[test]
    fn test_syntax_error_yields_single_violation() {
        let violations = screen_source("def broken(:\n");
        assert_eq!(violations.len(), 1);
        assert!(matches!(&violations[0], Violation::Syntax { .. }));
    }

    #[test]
    fn test_multiple_violations_collected() {
        let source = "import os\nfrom subprocess import run\neval('x')\n";
        let violations = screen_source(source);
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn test_nested_violations_found() {
        let source = "def sneaky():\n    import sys\n    return eval('2')\n";
        let violations = screen_source(source);
        assert_eq!(violations.len(), 2);
    }
}
