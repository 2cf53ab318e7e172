//! Command execution against a mock TM1 server
//!
//! Parses real command lines, runs them through `CommandExecutor` and checks
//! both the requests sent and the `Output` produced.

use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::json;
use tm1_cli::{Cli, CliError, CommandExecutor, ErrorCategory, Output, OutputFormat, connect};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn run(server: &MockServer, args: &[&str]) -> Result<Output, CliError> {
    let uri = server.uri();
    let cli = Cli::try_parse_from(
        ["tm1-elements"]
            .into_iter()
            .chain(args.iter().copied())
            .chain(["--url", uri.as_str()]),
    )
    .unwrap();
    let service = connect(&cli.conn)?;
    CommandExecutor::new(OutputFormat::Json, false)
        .execute(&service, cli.command)
        .await
}

const REGION: &str = "/api/v1/Dimensions('Region')/Hierarchies('Region')";

#[tokio::test]
async fn test_leaf_element_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REGION}/Elements")))
        .and(query_param("$select", "Name"))
        .and(query_param("$filter", "Type ne 3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": [
            {"Name": "Germany"}, {"Name": "Japan"}
        ]})))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(&server, &["elements", "Region", "--leaves"]).await.unwrap();
    assert_eq!(
        output,
        Output::Names {
            title: "Leaf elements".to_string(),
            names: vec!["Germany".to_string(), "Japan".to_string()],
        }
    );
}

#[tokio::test]
async fn test_count_uses_alternate_hierarchy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/api/v1/Dimensions('Region')/Hierarchies('Sales%20Regions')/Elements",
        ))
        .and(query_param("$filter", "Type eq 3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@odata.count": 4,
            "value": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(
        &server,
        &["count", "Region", "-H", "Sales Regions", "--kind", "consolidated"],
    )
    .await
    .unwrap();
    assert_eq!(
        output,
        Output::Count {
            label: "Consolidated elements".to_string(),
            count: 4,
        }
    );
}

#[tokio::test]
async fn test_levels_descending_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REGION}/Levels")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": [
            {"Name": "Total"}, {"Name": "Country"}
        ]})))
        .expect(2)
        .mount(&server)
        .await;

    let Output::Names { names, .. } = run(&server, &["levels", "Region"]).await.unwrap() else {
        panic!("expected names");
    };
    assert_eq!(names, vec!["Country", "Total"]);

    let Output::Names { names, .. } = run(&server, &["levels", "Region", "--ascending"])
        .await
        .unwrap()
    else {
        panic!("expected names");
    };
    assert_eq!(names, vec!["Total", "Country"]);
}

#[tokio::test]
async fn test_exists_reports_missing_element() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REGION}/Elements('Atlantis')")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let output = run(&server, &["exists", "Region", "Atlantis"]).await.unwrap();
    assert_eq!(
        output,
        Output::Flag {
            label: "Atlantis exists".to_string(),
            value: false,
        }
    );
}

#[tokio::test]
async fn test_filter_rejects_non_numeric_value() {
    let server = MockServer::start().await;

    let err = run(&server, &["filter", "Region", "Population", "many", "--numeric"])
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::User);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_filter_rejects_non_finite_numbers() {
    let server = MockServer::start().await;

    for value in ["NaN", "inf", "infinity"] {
        let err = run(&server, &["filter", "Region", "Population", value, "--numeric"])
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::User);
        assert!(err.to_string().contains("not a finite number"));
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_dimension_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "278", "message": "'Nope' can not be found in collection of type 'Dimension'."}
        })))
        .mount(&server)
        .await;

    let err = run(&server, &["attributes", "Nope"]).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
}

#[tokio::test]
async fn test_set_mdx_tuples() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/ExecuteMDXSetExpression"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Tuples": [
            {"Members": [{"Name": "Germany", "Weight": 1}]},
            {"Members": [{"Name": "Japan", "Weight": 1}]}
        ]})))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(&server, &["set-mdx", "{[Region].[Germany],[Region].[Japan]}", "--top", "2"])
        .await
        .unwrap();
    assert_eq!(
        output,
        Output::Tuples(vec![
            vec![json!({"Name": "Germany", "Weight": 1})],
            vec![json!({"Name": "Japan", "Weight": 1})],
        ])
    );
}
