//! `{{variable}}` template normalization
//!
//! Dynamic values such as `{{$randomEmail}}` become template tags, then
//! hyphenated names are rewritten to bracket access (`{{_['api-key']}}`),
//! since the template engine cannot resolve them as bare identifiers.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static TEMPLATE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").expect("template token regex is valid")
});

/// Run both normalization stages on `text`
pub fn normalize(text: &str) -> String {
    if !text.contains("{{") {
        return text.to_string();
    }
    let with_tags = translate_dynamic_values(text);
    bracket_hyphenated_names(&with_tags)
}

/// `{{$name}}` -> template tag
pub fn translate_dynamic_values(text: &str) -> String {
    TEMPLATE_TOKEN
        .replace_all(text, |caps: &Captures| match caps[1].strip_prefix('$') {
            Some(name) => dynamic_value_tag(name),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// `{{a-b}}` -> `{{_['a-b']}}`
pub fn bracket_hyphenated_names(text: &str) -> String {
    TEMPLATE_TOKEN
        .replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            if name.contains('-') && !name.starts_with("_[") {
                format!("{{{{_['{}']}}}}", name.replace('\'', "\\'"))
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn dynamic_value_tag(name: &str) -> String {
    match name {
        "guid" | "randomUUID" => "{% uuid 'v4' %}".to_string(),
        "timestamp" => "{% now 'unix' %}".to_string(),
        "isoTimestamp" => "{% now 'iso-8601' %}".to_string(),
        other => format!("{{% faker '{}' %}}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_tokens_unchanged() {
        assert_eq!(normalize("{{baseUrl}}/users"), "{{baseUrl}}/users");
        assert_eq!(normalize("no tokens"), "no tokens");
    }

    #[test]
    fn test_dynamic_values() {
        assert_eq!(normalize("{{$randomFirstName}}"), "{% faker 'randomFirstName' %}");
        assert_eq!(normalize("id={{$guid}}"), "id={% uuid 'v4' %}");
        assert_eq!(normalize("{{ $timestamp }}"), "{% now 'unix' %}");
        assert_eq!(normalize("{{$isoTimestamp}}"), "{% now 'iso-8601' %}");
    }

    #[test]
    fn test_hyphenated_names() {
        assert_eq!(normalize("{{api-key}}"), "{{_['api-key']}}");
        assert_eq!(
            normalize("Bearer {{auth-token}} for {{user}}"),
            "Bearer {{_['auth-token']}} for {{user}}"
        );
    }

    #[test]
    fn test_already_bracketed_is_stable() {
        let once = normalize("{{my-var}}");
        assert_eq!(normalize(&once), once);
    }
}
