//! End-to-end runs against a local fixture server using the static backend

mod support;

use layoutspec_runner::static_html::StaticHtmlOpener;
use layoutspec_runner::{Declaration, RunnerError, SpecRunner, SuiteFile, SuiteReport};
use support::{fixtures_dir, init_tracing, FixtureServer};

fn runner() -> SpecRunner {
    SpecRunner::new(StaticHtmlOpener::new().expect("http client")).with_spec_root(fixtures_dir())
}

fn suite(server: &FixtureServer, name: &str, spec: &str) -> Declaration {
    Declaration::new(name)
        .size(640, 480)
        .spec(spec)
        .url(server.url("/"))
}

fn failure_messages(report: &SuiteReport) -> Vec<String> {
    report
        .failures()
        .iter()
        .filter_map(|t| t.failure().map(|c| c.message()))
        .collect()
}

#[tokio::test]
async fn valid_spec_passes_with_a_test_per_section() {
    init_tracing();
    let server = FixtureServer::start().await;

    let report = runner()
        .run(&suite(&server, "ValidSpec", "homepage_small.yaml"))
        .await;

    assert!(report.was_successful(), "failures: {:?}", failure_messages(&report));
    assert!(report.failures().is_empty());
    assert_eq!(report.run_count(), 4);
}

#[tokio::test]
async fn inapplicable_spec_fails_with_assertion_failures() {
    init_tracing();
    let server = FixtureServer::start().await;

    let report = runner()
        .run(&suite(&server, "InapplicableSpec", "inapplicable.yaml"))
        .await;

    assert!(!report.was_successful());
    assert_eq!(report.run_count(), 3);

    let failures = report.failures();
    assert_eq!(failures.len(), 2);
    assert!(failures
        .iter()
        .all(|t| t.failure().map(|c| c.is_assertion()).unwrap_or(false)));

    let messages = failure_messages(&report);
    assert!(messages.contains(
        &"\"first_paragraph\" width is 400px but it should be less than 10px".to_string()
    ));
    assert!(messages.contains(
        &"\"first_paragraph\" height is 0px but it should be greater than 100px".to_string()
    ));
}

#[tokio::test]
async fn include_tag_selects_tagged_sections() {
    init_tracing();
    let server = FixtureServer::start().await;

    let report = runner()
        .run(&suite(&server, "IncludeTag", "tag.yaml").include("variantA"))
        .await;

    assert_eq!(report.run_count(), 3);
    assert!(report.was_successful());
}

#[tokio::test]
async fn exclude_tag_wins_over_include_tag() {
    init_tracing();
    let server = FixtureServer::start().await;

    let report = runner()
        .run(
            &suite(&server, "ExcludeTag", "tag.yaml")
                .include("variantA")
                .exclude("variantB"),
        )
        .await;

    let names: Vec<&str> = report.tests.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Variant A header", "Variant A body"]);
}

#[tokio::test]
async fn exclude_only_keeps_untagged_sections() {
    init_tracing();
    let server = FixtureServer::start().await;

    let report = runner()
        .run(&suite(&server, "ExcludeOnly", "tag.yaml").exclude("variantA"))
        .await;

    let names: Vec<&str> = report.tests.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Variant B body", "Untagged"]);
}

#[tokio::test]
async fn missing_size_is_reported_as_single_failure() {
    let server = FixtureServer::start().await;
    let declaration = Declaration {
        size: None,
        ..suite(&server, "NoSizeAnnotation", "homepage_small.yaml")
    };

    let report = runner().run(&declaration).await;

    assert!(!report.was_successful());
    assert_eq!(report.run_count(), 1);
    assert_eq!(failure_messages(&report), vec!["The annotation @Size is missing."]);
}

#[tokio::test]
async fn missing_spec_is_reported_as_single_failure() {
    let server = FixtureServer::start().await;
    let declaration = Declaration {
        spec: None,
        ..suite(&server, "NoSpecAnnotation", "homepage_small.yaml")
    };

    let report = runner().run(&declaration).await;

    assert_eq!(report.run_count(), 1);
    assert_eq!(failure_messages(&report), vec!["The annotation @Spec is missing."]);
    assert!(report.tests[0].failure().unwrap().is_assertion());
}

#[tokio::test]
async fn missing_url_is_reported_as_single_failure() {
    let server = FixtureServer::start().await;
    let declaration = Declaration {
        url: None,
        ..suite(&server, "NoUrlAnnotation", "homepage_small.yaml")
    };

    let report = runner().run(&declaration).await;

    assert_eq!(report.run_count(), 1);
    assert_eq!(failure_messages(&report), vec!["The annotation @Url is missing."]);
}

#[tokio::test]
async fn malformed_spec_is_reported_as_single_failure() {
    let server = FixtureServer::start().await;

    let report = runner()
        .run(&suite(&server, "Malformed", "malformed.yaml"))
        .await;

    assert_eq!(report.run_count(), 1);
    let failure = report.tests[0].failure().unwrap();
    assert!(failure.is_assertion());
    assert!(failure.message().contains("malformed.yaml"));
}

#[tokio::test]
async fn unusable_checks_error_without_blocking_other_sections() {
    init_tracing();
    let server = FixtureServer::start().await;

    let report = runner()
        .run(&suite(&server, "Faulty", "faulty.yaml"))
        .await;

    assert_eq!(report.run_count(), 3);

    let first = report.tests[0].failure().unwrap();
    assert!(matches!(first.fault(), Some(RunnerError::UnknownObject(name)) if name == "footer"));

    let second = report.tests[1].failure().unwrap();
    assert!(matches!(second.fault(), Some(RunnerError::NotMeasured(_))));

    assert!(report.tests[2].passed());
}

#[tokio::test]
async fn page_load_failure_errors_every_section() {
    let server = FixtureServer::start().await;
    let declaration = suite(&server, "Broken", "homepage_small.yaml").url(server.url("/broken"));

    let report = runner().run(&declaration).await;

    assert_eq!(report.run_count(), 4);
    for test in &report.tests {
        let failure = test.failure().expect("section should fail");
        assert!(!failure.is_assertion());
        assert!(matches!(failure.fault(), Some(RunnerError::PageLoad { .. })));
    }
}

#[tokio::test]
async fn repeated_runs_agree() {
    let server = FixtureServer::start().await;
    let runner = runner();
    let declaration = suite(&server, "Repeat", "inapplicable.yaml");

    let outcomes = |r: &SuiteReport| -> Vec<(String, bool)> {
        r.tests.iter().map(|t| (t.name.clone(), t.passed())).collect()
    };
    let first = runner.run(&declaration).await;
    let second = runner.run(&declaration).await;
    assert_eq!(outcomes(&first), outcomes(&second));
}

#[tokio::test]
async fn suite_file_runs_every_declaration() {
    let server = FixtureServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let spec = fixtures_dir().join("homepage_small.yaml");
    let toml = format!(
        r#"
[[suite]]
name = "home"
spec = "{spec}"
url = "{url}"
size = {{ width = 640, height = 480 }}

[[suite]]
name = "tags"
spec = "{tags}"
url = "{url}"
size = {{ width = 640, height = 480 }}
include = ["variantB"]

[[suite]]
name = "incomplete"
url = "{url}"
size = {{ width = 640, height = 480 }}
"#,
        spec = spec.display(),
        tags = fixtures_dir().join("tag.yaml").display(),
        url = server.url("/"),
    );
    std::fs::write(dir.path().join("suites.toml"), toml).unwrap();

    let declarations = SuiteFile::discover(dir.path()).unwrap();
    let reports = SpecRunner::new(StaticHtmlOpener::new().unwrap())
        .run_all(&declarations)
        .await;

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].run_count(), 4);
    assert!(reports[0].was_successful());
    assert_eq!(reports[1].run_count(), 2);
    assert_eq!(failure_messages(&reports[2]), vec!["The annotation @Spec is missing."]);
}
