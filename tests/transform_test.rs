use pm2insomnia::transform::{Phase, PrefixRewriter, TransformEngine, TransformRule, default_config};
use std::fs;
use tempfile::TempDir;

#[test]
fn saved_configuration_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rules.json");

    let mut engine = TransformEngine::new();
    engine.add_rule(
        Phase::Postprocess,
        TransformRule::new("strip-debugger", "drop debugger statements", r"debugger;\n?", ""),
    );
    engine.toggle_rule("info-request-name", false);
    engine.save(&path).unwrap();

    let reloaded = TransformEngine::from_file(&path);
    assert_eq!(reloaded.export_config(), engine.export_config());
    assert_eq!(
        reloaded.postprocess("debugger;\ninsomnia.info.requestName", false),
        "insomnia.info.requestName"
    );
}

#[test]
fn invalid_configuration_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rules.json");
    fs::write(&path, "{ \"preprocess\": 42 }").unwrap();

    let engine = TransformEngine::from_file(&path);
    assert_eq!(engine.export_config(), TransformEngine::new().export_config());
}

#[test]
fn configuration_with_broken_rule_still_runs() {
    let config = r#"{
        "preprocess": [],
        "postprocess": [
            { "name": "broken", "pattern": "(unclosed", "replacement": "x" },
            { "name": "bad-flag", "pattern": "a", "replacement": "b", "flags": "gy" },
            { "name": "works", "pattern": "foo", "replacement": "bar" }
        ]
    }"#;

    let engine = TransformEngine::from_json(config);
    assert_eq!(engine.rules(Phase::Postprocess).len(), 3);
    assert_eq!(engine.postprocess("foo (unclosed a", false), "bar (unclosed a");
}

#[test]
fn default_pipeline_is_idempotent() {
    let engine = TransformEngine::new();
    let rewriter = PrefixRewriter::default();
    let script = [
        "postman.setEnvironmentVariable('token', jsonData.token);",
        "var data = JSON.parse(responseBody);",
        "tests['status ok'] = responseCode.code === 200;",
        "pm.test('fast', function () { pm.expect(responseTime).to.be.below(500); });",
        "pm.response.to.have.status(201);",
        "pm.response.to.be.ok;",
        "postman.setNextRequest('next');",
        "pm.visualizer.set(template, data);",
        "console.log(pm.info.requestName, data['items']['first']);",
    ]
    .join("\n");

    for experimental in [false, true] {
        let once = engine.postprocess(
            &rewriter.rewrite(&engine.preprocess(&script, experimental)),
            experimental,
        );
        let twice = engine.postprocess(
            &rewriter.rewrite(&engine.preprocess(&once, experimental)),
            experimental,
        );
        assert_eq!(once, twice, "experimental = {experimental}");
    }
}

#[test]
fn default_config_matches_engine() {
    assert_eq!(default_config(), TransformEngine::new().export_config());
}
