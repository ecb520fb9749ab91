//! Namespace prefix renaming for scripts
//!
//! Renames `pm.` call sites to `insomnia.`. A match counts only when the
//! character before it is not part of an identifier, so `mypm.x` is left
//! alone. Strings and comments are not special-cased: `'pm.x'` inside a
//! literal is renamed too.

/// Boundary-aware prefix renamer
#[derive(Debug, Clone)]
pub struct PrefixRewriter {
    from: String,
    to: String,
}

impl Default for PrefixRewriter {
    fn default() -> Self {
        Self::new("pm", "insomnia", '.')
    }
}

impl PrefixRewriter {
    /// Rename `prefix` + `separator` to `target` + `separator`
    pub fn new(prefix: &str, target: &str, separator: char) -> Self {
        Self {
            from: format!("{}{}", prefix, separator),
            to: format!("{}{}", target, separator),
        }
    }

    pub fn rewrite(&self, script: &str) -> String {
        let mut output = String::with_capacity(script.len());
        // end of the last copied span of `script`
        let mut copied = 0;

        for (index, _) in script.match_indices(self.from.as_str()) {
            if script[..index].chars().next_back().is_some_and(is_identifier_char) {
                continue;
            }

            output.push_str(&script[copied..index]);
            output.push_str(&self.to);
            copied = index + self.from.len();
        }

        output.push_str(&script[copied..]);
        output
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(s: &str) -> String {
        PrefixRewriter::default().rewrite(s)
    }

    #[test]
    fn test_simple_call() {
        assert_eq!(rewrite("pm.test()"), "insomnia.test()");
    }

    #[test]
    fn test_identifier_suffix_untouched() {
        assert_eq!(rewrite("mypm.test()"), "mypm.test()");
        assert_eq!(rewrite("_pm.x + $pm.y + 1pm.z"), "_pm.x + $pm.y + 1pm.z");
    }

    #[test]
    fn test_positions_stay_consistent_under_length_drift() {
        let input = "pm.a(); x.pm.b(); mypm.c(); (pm.d)\npm.e";
        assert_eq!(
            rewrite(input),
            "insomnia.a(); x.insomnia.b(); mypm.c(); (insomnia.d)\ninsomnia.e"
        );
    }

    #[test]
    fn test_adjacent_occurrences() {
        assert_eq!(rewrite("pm.pm.pm."), "insomnia.insomnia.insomnia.");
    }

    #[test]
    fn test_rewrites_inside_string_literals_and_comments() {
        assert_eq!(
            rewrite("// see pm.test\nconsole.log('pm.x');"),
            "// see insomnia.test\nconsole.log('insomnia.x');"
        );
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(rewrite("é pm.x «pm.y»"), "é insomnia.x «insomnia.y»");
        // only ASCII identifier characters block a match
        assert_eq!(rewrite("épm.x"), "éinsomnia.x");
    }

    #[test]
    fn test_shorter_target() {
        let rewriter = PrefixRewriter::new("insomnia", "pm", '.');
        assert_eq!(
            rewriter.rewrite("insomnia.a insomnia.b myinsomnia.c"),
            "pm.a pm.b myinsomnia.c"
        );
    }

    #[test]
    fn test_no_separator_no_match() {
        assert_eq!(rewrite("pm ipm pm_x"), "pm ipm pm_x");
    }
}
