#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::report::{self, ReportFormat, ReportOptions};
    use crate::{Client, FlagError};

    async fn create_test_client(server: &MockServer) -> Client {
        Client::builder()
            .with_base_url(&server.uri())
            .with_api_key("test-token")
            .build()
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_any_request() {
        let client = Client::builder()
            .with_base_url("http://127.0.0.1:1")
            .build();

        let err = client.get_flags("default", "production").await.unwrap_err();
        assert!(matches!(err, FlagError::AuthError(_)));
    }

    #[tokio::test]
    async fn test_server_error_aborts_retrieval() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500)
                .set_body_json(serde_json::json!({"error": "Internal Server Error"}))
            )
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let err = client.get_flags("default", "production").await.unwrap_err();
        assert!(matches!(err, FlagError::ApiError(_)));
    }

    #[tokio::test]
    async fn test_pagination_accumulates_pages_in_order() {
        let mock_server = MockServer::start().await;
        let now = Utc::now();
        let old_ms = (now - Duration::days(400)).timestamp_millis();

        let next_href = "/api/v2/flags/test-project?limit=50&env=test-env&sort=creationDate&filter=state%3Alive&offset=50";

        // First page: two flags and a next link.
        Mock::given(method("GET"))
            .and(path("/api/v2/flags/test-project"))
            .and(query_param("limit", "50"))
            .and(query_param("env", "test-env"))
            .and(query_param("sort", "creationDate"))
            .and(query_param("filter", "state:live"))
            .and(query_param_is_missing("offset"))
            .respond_with(ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "_links": {"next": {"href": next_href, "type": "application/json"}},
                    "items": [
                        {
                            "key": "flag-a",
                            "_maintainer": {"email": "a@example.com"},
                            "temporary": true,
                            "creationDate": old_ms,
                            "environments": {"test-env": {"lastModified": old_ms}}
                        },
                        {
                            "key": "flag-b",
                            "_maintainer": {"email": "b@example.com"},
                            "temporary": false,
                            "creationDate": old_ms,
                            "environments": {"test-env": {"lastModified": old_ms}}
                        }
                    ]
                }))
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        // Second page: one flag, no next link.
        Mock::given(method("GET"))
            .and(path("/api/v2/flags/test-project"))
            .and(query_param("offset", "50"))
            .respond_with(ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "_links": {},
                    "items": [
                        {
                            "key": "flag-c",
                            "_maintainer": {"email": "c@example.com"},
                            "temporary": true,
                            "creationDate": old_ms,
                            "environments": {"test-env": {"lastModified": old_ms}}
                        }
                    ]
                }))
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        // Exactly one status query per page, scoped to that page's keys.
        Mock::given(method("POST"))
            .and(path("/api/v2/projects/test-project/flag-statuses/queries"))
            .and(body_json(serde_json::json!({
                "environmentKeys": ["test-env"],
                "flagKeys": ["flag-a", "flag-b"]
            })))
            .respond_with(ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"items": []}))
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/v2/projects/test-project/flag-statuses/queries"))
            .and(body_json(serde_json::json!({
                "environmentKeys": ["test-env"],
                "flagKeys": ["flag-c"]
            })))
            .respond_with(ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"items": []}))
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let flags = client.get_flags("test-project", "test-env").await.unwrap();

        let keys: Vec<_> = flags.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["flag-a", "flag-b", "flag-c"]);

        // Never requested in any page's status response.
        assert!(flags.iter().all(|f| f.last_requested.is_none()));
    }

    #[tokio::test]
    async fn test_end_to_end_csv_report() {
        let mock_server = MockServer::start().await;
        let now = Utc::now();
        let old_ms = (now - Duration::days(400)).timestamp_millis();
        let fresh_ms = (now - Duration::days(10)).timestamp_millis();
        let recent_request = (now - Duration::days(2)).to_rfc3339();

        Mock::given(method("GET"))
            .and(path("/api/v2/flags/test-project"))
            .respond_with(ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "_links": {},
                    "items": [
                        {
                            "key": "no-maintainer",
                            "temporary": true,
                            "creationDate": old_ms,
                            "environments": {"test-env": {"lastModified": old_ms}}
                        },
                        {
                            "key": "old-requested",
                            "_maintainer": {"email": "dev@example.com"},
                            "temporary": true,
                            "creationDate": old_ms,
                            "environments": {"test-env": {"lastModified": old_ms}}
                        },
                        {
                            "key": "fresh-flag",
                            "_maintainer": {"email": "dev@example.com"},
                            "temporary": true,
                            "creationDate": fresh_ms,
                            "environments": {"test-env": {"lastModified": fresh_ms}}
                        }
                    ]
                }))
            )
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/v2/projects/test-project/flag-statuses/queries"))
            .respond_with(ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "items": [
                        {
                            "key": "old-requested",
                            "environments": {
                                "test-env": {
                                    "name": "Test",
                                    "lastRequested": recent_request
                                }
                            }
                        }
                    ]
                }))
            )
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let flags = client.get_flags("test-project", "test-env").await.unwrap();
        assert_eq!(flags.len(), 3);

        let opts = ReportOptions {
            host: client.base_url().to_string(),
            project: "test-project".to_string(),
            env: "test-env".to_string(),
            threshold: Duration::days(180),
            now: Utc::now(),
            with_permanent: false,
            format: ReportFormat::Csv,
        };

        let mut flags = report::filter_flags(flags, &opts);
        report::sort_flags(&mut flags, &opts);
        let out = report::render(&flags, &opts);

        let lines: Vec<_> = out.lines().collect();
        assert_eq!(
            lines[0],
            "KEY,MAINTAINER,CREATION DATE,LAST MODIFIED,LAST REQUESTED,STATUS,TEMPORARY,LINK"
        );

        // The fresh flag fails the age filter; the two stale ones remain,
        // sorted by maintainer with the missing email rendered as unknown.
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("old-requested,dev@example.com,"));
        assert!(lines[1].contains(",inuse,temporary,"));
        assert!(lines[2].starts_with("no-maintainer,unknown,"));
        assert!(lines[2].contains(",inactive,temporary,"));
        assert!(lines[2].ends_with("/test-project/test-env/features/no-maintainer"));
    }
}
