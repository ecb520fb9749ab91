//! Built-in rule sets
//!
//! Pre-process rules run on the raw export text before it is parsed, so their
//! output must stay valid inside a JSON string. Post-process rules run on each
//! script after the `pm.` namespace has been renamed.

use super::rule::{RuleSet, TransformConfig, TransformRule};

/// Identifier boundary used by rules that rewrite bare legacy globals
const BOUNDARY: &str = r"(^|[^.\w$])";

pub fn default_config() -> TransformConfig {
    TransformConfig {
        preprocess: default_preprocess(),
        postprocess: default_postprocess(),
        experimental: Some(experimental_rules()),
    }
}

pub fn default_preprocess() -> Vec<TransformRule> {
    vec![
        TransformRule::new(
            "legacy-set-environment-variable",
            "postman.setEnvironmentVariable() -> pm.environment.set()",
            r"postman\.setEnvironmentVariable\(",
            "pm.environment.set(",
        ),
        TransformRule::new(
            "legacy-get-environment-variable",
            "postman.getEnvironmentVariable() -> pm.environment.get()",
            r"postman\.getEnvironmentVariable\(",
            "pm.environment.get(",
        ),
        TransformRule::new(
            "legacy-clear-environment-variable",
            "postman.clearEnvironmentVariable() -> pm.environment.unset()",
            r"postman\.clearEnvironmentVariable\(",
            "pm.environment.unset(",
        ),
        TransformRule::new(
            "legacy-set-global-variable",
            "postman.setGlobalVariable() -> pm.globals.set()",
            r"postman\.setGlobalVariable\(",
            "pm.globals.set(",
        ),
        TransformRule::new(
            "legacy-get-global-variable",
            "postman.getGlobalVariable() -> pm.globals.get()",
            r"postman\.getGlobalVariable\(",
            "pm.globals.get(",
        ),
        TransformRule::new(
            "legacy-clear-global-variable",
            "postman.clearGlobalVariable() -> pm.globals.unset()",
            r"postman\.clearGlobalVariable\(",
            "pm.globals.unset(",
        ),
        TransformRule::new(
            "legacy-set-next-request",
            "postman.setNextRequest() -> pm.execution.setNextRequest()",
            r"postman\.setNextRequest\(",
            "pm.execution.setNextRequest(",
        ),
        TransformRule::new(
            "legacy-get-response-header",
            "postman.getResponseHeader() -> pm.response.headers.get()",
            r"postman\.getResponseHeader\(",
            "pm.response.headers.get(",
        ),
        TransformRule::new(
            "legacy-get-response-cookie",
            "postman.getResponseCookie() -> pm.cookies.get()",
            r"postman\.getResponseCookie\(",
            "pm.cookies.get(",
        ),
        TransformRule::new(
            "legacy-json-parse-response-body",
            "JSON.parse(responseBody) -> pm.response.json()",
            r"JSON\.parse\(\s*responseBody\s*\)",
            "pm.response.json()",
        ),
        TransformRule::new(
            "legacy-response-body",
            "responseBody -> pm.response.text()",
            format!(r"{}responseBody\b", BOUNDARY),
            "$1pm.response.text()",
        ),
        TransformRule::new(
            "legacy-response-code",
            "responseCode.code -> pm.response.code",
            format!(r"{}responseCode\.code\b", BOUNDARY),
            "$1pm.response.code",
        ),
        TransformRule::new(
            "legacy-response-time",
            "responseTime -> pm.response.responseTime",
            format!(r"{}responseTime\b", BOUNDARY),
            "$1pm.response.responseTime",
        ),
    ]
}

pub fn default_postprocess() -> Vec<TransformRule> {
    vec![
        TransformRule::new(
            "unsupported-set-next-request",
            "Comment out setNextRequest(), which has no equivalent",
            r"^([ \t]*)(insomnia\.(?:execution\.)?setNextRequest\()",
            "$1// [unsupported] $2",
        )
        .with_flags("gm"),
        TransformRule::new(
            "unsupported-visualizer",
            "Comment out visualizer calls, which have no equivalent",
            r"^([ \t]*)(insomnia\.visualizer\.)",
            "$1// [unsupported] $2",
        )
        .with_flags("gm"),
        TransformRule::new(
            "response-to-have-status",
            "insomnia.response.to.have.status(n) -> expect(code).to.eql(n)",
            r"insomnia\.response\.to\.have\.status\((\d+)\)",
            "insomnia.expect(insomnia.response.code).to.eql($1)",
        ),
        TransformRule::new(
            "response-to-be-ok",
            "insomnia.response.to.be.ok -> expect(code) within 200..299",
            r"insomnia\.response\.to\.be\.ok\b",
            "insomnia.expect(insomnia.response.code).to.be.within(200, 299)",
        ),
        TransformRule::new(
            "info-request-name",
            "insomnia.info.requestName -> insomnia.request.name",
            r"insomnia\.info\.requestName\b",
            "insomnia.request.name",
        ),
        TransformRule::new(
            "collection-variables",
            "insomnia.collectionVariables -> insomnia.baseEnvironment",
            r"insomnia\.collectionVariables\b",
            "insomnia.baseEnvironment",
        ),
    ]
}

pub fn experimental_rules() -> RuleSet {
    RuleSet {
        preprocess: vec![TransformRule::new(
            "legacy-tests-assignment",
            "tests[\"name\"] = expr; -> pm.test(\"name\", ...)",
            r#"\btests\[(\\"|')([^"'\\]*)(\\"|')\]\s*=\s*([^;"]+);"#,
            "pm.test($1$2$3, function () { pm.expect($4).to.be.true; });",
        )],
        postprocess: vec![
            TransformRule::new(
                "bracket-to-dot",
                "obj['key'] -> obj.key for identifier keys",
                r#"([A-Za-z_$][\w$]*)\[['"]([A-Za-z_$][\w$]*)['"]\]"#,
                "$1.$2",
            )
            .iterated(),
            TransformRule::new(
                "response-to-have-header",
                "insomnia.response.to.have.header(h) -> expect(headers.has(h))",
                r#"insomnia\.response\.to\.have\.header\((['"][^'"]+['"])\)"#,
                "insomnia.expect(insomnia.response.headers.has($1)).to.be.true",
            ),
        ],
    }
}
