use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{CustomFieldFilter, NewTask, TaskApi};
use crate::error::ApiError;
use crate::model::field::RemoteField;
use crate::model::task::Task;

pub struct ClickUpClient {
    api_base: String,
    token: String,
    client: reqwest::Client,
}

impl ClickUpClient {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    /// Send with auth headers and return the body of a 2xx response.
    async fn send(&self, label: &str, request: RequestBuilder) -> Result<String, ApiError> {
        let resp = request
            .header("Authorization", &self.token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(call = label, error = %e, "ClickUp request failed");
                ApiError::Transport(e)
            })?;

        let status = resp.status();
        let body = resp.text().await?;
        debug!(call = label, status = status.as_u16(), "ClickUp response");

        if !status.is_success() {
            warn!(call = label, status = status.as_u16(), body = %body, "ClickUp returned an error");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        label: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send(label, request).await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(call = label, error = %e, "ClickUp response did not parse");
            ApiError::Decode(e)
        })
    }
}

#[derive(Deserialize)]
struct TaskPage {
    #[serde(default)]
    tasks: Vec<Task>,
}

#[derive(Deserialize)]
struct FieldList {
    #[serde(default)]
    fields: Vec<RemoteField>,
}

#[async_trait]
impl TaskApi for ClickUpClient {
    async fn create_task(&self, list_id: &str, task: &NewTask) -> Result<Task, ApiError> {
        debug!(list_id, name = %task.name, "creating task");
        let request = self
            .client
            .post(self.url(&format!("/list/{list_id}/task")))
            .json(task);
        self.send_json("create_task", request).await
    }

    async fn list_tasks(
        &self,
        list_id: &str,
        filter: Option<&CustomFieldFilter>,
    ) -> Result<Vec<Task>, ApiError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(filter) = filter {
            query.push(("custom_field", serde_json::to_string(&[filter])?));
        }
        query.push(("page", "0".into()));
        query.push(("include_closed", "true".into()));

        let request = self
            .client
            .get(self.url(&format!("/list/{list_id}/task")))
            .query(&query);
        let page: TaskPage = self.send_json("list_tasks", request).await?;
        debug!(list_id, count = page.tasks.len(), filtered = filter.is_some(), "tasks listed");
        Ok(page.tasks)
    }

    async fn get_list_fields(&self, list_id: &str) -> Result<Vec<RemoteField>, ApiError> {
        let request = self.client.get(self.url(&format!("/list/{list_id}/field")));
        let list: FieldList = self.send_json("get_list_fields", request).await?;
        for field in &list.fields {
            debug!(list_id, name = %field.name, field_type = %field.field_type, "list field");
        }
        Ok(list.fields)
    }

    async fn set_task_field(
        &self,
        task_id: &str,
        field_id: &str,
        value: &str,
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.url(&format!("/task/{task_id}/field/{field_id}")))
            .json(&serde_json::json!({ "value": value }));
        self.send("set_task_field", request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clickup::FieldAssignment;
    use crate::model::priority::Priority;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ClickUpClient {
        ClickUpClient::new(server.uri(), "pk_test")
    }

    #[tokio::test]
    async fn create_task_posts_exact_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/list/901/task"))
            .and(header("Authorization", "pk_test"))
            .and(body_json(json!({
                "name": "Fix fillet",
                "priority": 2,
                "custom_fields": [{"id": "cf-url", "value": "https://tinyurl.com/x"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "t-1",
                "name": "Fix fillet",
                "url": "https://app.clickup.com/t/t-1",
                "status": {"status": "to do"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut task = NewTask::new("Fix fillet", Priority::High);
        task.custom_fields.push(FieldAssignment {
            id: "cf-url".into(),
            value: "https://tinyurl.com/x".into(),
        });

        let created = client(&server).create_task("901", &task).await.unwrap();
        assert_eq!(created.id, "t-1");
        assert_eq!(created.status_text(), Some("to do"));
    }

    #[tokio::test]
    async fn non_success_status_keeps_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/list/901/task"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_string(r#"{"err":"Token invalid","ECODE":"OAUTH_025"}"#),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .create_task("901", &NewTask::new("x", Priority::Normal))
            .await
            .unwrap_err();
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, r#"{"err":"Token invalid","ECODE":"OAUTH_025"}"#);
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn success_with_garbage_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/list/901/task"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let err = client(&server)
            .create_task("901", &NewTask::new("x", Priority::Normal))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn list_tasks_sends_filter_and_closed_flag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list/901/task"))
            .and(query_param(
                "custom_field",
                r#"[{"field_id":"cf-urn","operator":"=","value":"urn:doc:1"}]"#,
            ))
            .and(query_param("page", "0"))
            .and(query_param("include_closed", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tasks": [{"id": "t-1", "name": "A"}, {"id": "t-2", "name": "B"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let filter = CustomFieldFilter::equals("cf-urn", "urn:doc:1");
        let tasks = client(&server)
            .list_tasks("901", Some(&filter))
            .await
            .unwrap();
        assert_eq!(tasks.len(), 2);
    }

    #[tokio::test]
    async fn unfiltered_list_has_no_custom_field_param() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list/901/task"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tasks": []})))
            .mount(&server)
            .await;

        let tasks = client(&server).list_tasks("901", None).await.unwrap();
        assert!(tasks.is_empty());

        let requests = server.received_requests().await.unwrap();
        let query = requests[0].url.query().unwrap_or_default().to_string();
        assert!(!query.contains("custom_field"));
        assert!(query.contains("include_closed=true"));
    }

    #[tokio::test]
    async fn get_list_fields_parses_definitions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list/901/field"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "fields": [
                    {"id": "cf-url", "name": "Fusion Design", "type": "url", "type_config": {}},
                    {"id": "cf-urn", "name": "Fusion Document URN", "type": "short_text"}
                ]
            })))
            .mount(&server)
            .await;

        let fields = client(&server).get_list_fields("901").await.unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field_type, "url");
        assert_eq!(fields[1].name, "Fusion Document URN");
    }

    #[tokio::test]
    async fn set_task_field_posts_value() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/task/t-1/field/cf-urn"))
            .and(body_json(json!({"value": "urn:doc:1"})))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .set_task_field("t-1", "cf-urn", "urn:doc:1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let client = ClickUpClient::new("http://127.0.0.1:9", "pk_test");
        let err = client.get_list_fields("901").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
