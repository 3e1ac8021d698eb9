//! Prompt templates for code generation and extraction of code from
//! model replies.

/// System prompt establishing the generation contract.
pub fn build_system_prompt() -> String {
    "You are an expert Python programmer. Generate clean, working Python code \
     based on the user's request.\n\n\
     Rules:\n\
     1. Write complete, executable Python code\n\
     2. Include proper error handling where appropriate\n\
     3. Add comments for complex logic\n\
     4. Use only safe, standard library functions\n\
     5. Avoid dangerous operations (file I/O, subprocess, imports of os/sys)\n\
     6. Include test/demo code to show the function working\n\n\
     If there was a previous error, fix it in the new code."
        .to_string()
}

/// User prompt: the task, plus the previous attempt's error when retrying.
pub fn build_user_prompt(prompt: &str, previous_error: Option<&str>) -> String {
    match previous_error {
        Some(err) => format!("{}\n\nPrevious error to fix: {}", prompt, err),
        None => prompt.to_string(),
    }
}

/// Extract runnable code from a model reply.
///
/// Chat completions usually wrap code in a Markdown fence. Strip one outer
/// ```python (or bare ```) fence when present; otherwise return the trimmed
/// reply verbatim.
pub fn extract_code(reply: &str) -> String {
    let trimmed = reply.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    // Drop the info string (e.g. "python") up to the first newline.
    let body = match rest.split_once('\n') {
        Some((_info, body)) => body,
        None => return trimmed.to_string(),
    };

    match body.rfind("```") {
        Some(end) => body[..end].trim_end().to_string(),
        None => body.trim_end().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_mentions_safety_rules() {
        let prompt = build_system_prompt();
        assert!(prompt.contains("executable Python code"));
        assert!(prompt.contains("Avoid dangerous operations"));
        assert!(prompt.contains("previous error"));
    }

    #[test]
    fn test_user_prompt_without_error() {
        let prompt = build_user_prompt("Compute factorial of 5", None);
        assert_eq!(prompt, "Compute factorial of 5");
    }

    #[test]
    fn test_user_prompt_appends_previous_error() {
        let prompt = build_user_prompt("Compute factorial", Some("NameError: n is not defined"));
        assert!(prompt.starts_with("Compute factorial"));
        assert!(prompt.contains("Previous error to fix: NameError: n is not defined"));
    }

    #[test]
    fn test_extract_code_plain_reply() {
        assert_eq!(extract_code("print('hi')\n"), "print('hi')");
    }

    #[test]
    fn test_extract_code_python_fence() {
        let reply = "```python\nprint('hi')\n```";
        assert_eq!(extract_code(reply), "print('hi')");
    }

    #[test]
    fn test_extract_code_bare_fence() {
        let reply = "```\nx = 1\nprint(x)\n```\n";
        assert_eq!(extract_code(reply), "x = 1\nprint(x)");
    }

    #[test]
    fn test_extract_code_fence_with_surrounding_whitespace() {
        let reply = "\n\n```python\ndef f():\n    return 1\n```\n\n";
        assert_eq!(extract_code(reply), "def f():\n    return 1");
    }

    #[test]
    fn test_extract_code_inner_backticks_preserved() {
        // Only the outermost fence is stripped; a docstring containing
        // backticks stays intact.
        let reply = "```python\ns = \"use `repr`\"\nprint(s)\n```";
        assert_eq!(extract_code(reply), "s = \"use `repr`\"\nprint(s)");
    }

    #[test]
    fn test_extract_code_unterminated_fence() {
        let reply = "```python\nprint('no closing fence')\n";
        assert_eq!(extract_code(reply), "print('no closing fence')");
    }
}
