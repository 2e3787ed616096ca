use tracing::{debug, info, warn};

use crate::clickup::{CustomFieldFilter, TaskApi};
use crate::error::ApiError;
use crate::model::field::RemoteField;
use crate::model::task::Task;

/// URL field that receives the shortened Open-on-Desktop link.
pub const FIELD_FUSION_DESIGN: &str = "Fusion Design";
pub const FIELD_FUSION_DESIGN_TYPE: &str = "url";
/// Text field holding the document URN; any field type is accepted.
pub const FIELD_DOCUMENT_URN: &str = "Fusion Document URN";

/// First field in API order matching `name` (and `field_type`, when given) exactly.
pub fn find_field<'a>(
    fields: &'a [RemoteField],
    name: &str,
    field_type: Option<&str>,
) -> Option<&'a RemoteField> {
    fields
        .iter()
        .find(|f| f.name == name && field_type.map_or(true, |t| f.field_type == t))
}

/// Looks up custom field ids on a list. Nothing is cached between calls.
pub struct FieldResolver<'a> {
    api: &'a dyn TaskApi,
}

impl<'a> FieldResolver<'a> {
    pub fn new(api: &'a dyn TaskApi) -> Self {
        Self { api }
    }

    /// `Ok(None)` means the list has no such field; a failed fetch is an error.
    pub async fn try_find_field_by_name(
        &self,
        list_id: &str,
        name: &str,
        field_type: Option<&str>,
    ) -> Result<Option<String>, ApiError> {
        let fields = self.api.get_list_fields(list_id).await?;
        match find_field(&fields, name, field_type) {
            Some(field) => {
                debug!(list_id, field = name, id = %field.id, "field resolved");
                Ok(Some(field.id.clone()))
            }
            None => {
                info!(list_id, field = name, ?field_type, "field not found on list");
                Ok(None)
            }
        }
    }

    /// Like [`Self::try_find_field_by_name`], but a failed fetch is logged and
    /// reported as "not configured".
    pub async fn find_field_by_name(
        &self,
        list_id: &str,
        name: &str,
        field_type: Option<&str>,
    ) -> Option<String> {
        self.try_find_field_by_name(list_id, name, field_type)
            .await
            .unwrap_or_else(|e| {
                warn!(list_id, field = name, error = %e, "could not fetch list fields");
                None
            })
    }

    pub async fn design_link_field(&self, list_id: &str) -> Option<String> {
        self.find_field_by_name(list_id, FIELD_FUSION_DESIGN, Some(FIELD_FUSION_DESIGN_TYPE))
            .await
    }

    pub async fn document_urn_field(&self, list_id: &str) -> Option<String> {
        self.find_field_by_name(list_id, FIELD_DOCUMENT_URN, None)
            .await
    }
}

/// Keep only tasks whose `field_id` value equals `document_urn` exactly.
pub fn linked_to_document(tasks: Vec<Task>, field_id: &str, document_urn: &str) -> Vec<Task> {
    tasks
        .into_iter()
        .filter(|t| t.field_text(field_id) == Some(document_urn))
        .collect()
}

/// Tasks linked to a document: server-side filter first, then the exact check.
pub async fn fetch_document_tasks(
    api: &dyn TaskApi,
    list_id: &str,
    field_id: &str,
    document_urn: &str,
) -> Result<Vec<Task>, ApiError> {
    let filter = CustomFieldFilter::equals(field_id, document_urn);
    let candidates = api.list_tasks(list_id, Some(&filter)).await?;
    let fetched = candidates.len();
    let linked = linked_to_document(candidates, field_id, document_urn);
    debug!(list_id, fetched, linked = linked.len(), "document tasks matched");
    Ok(linked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clickup::NewTask;
    use crate::model::task::CustomFieldValue;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn field(id: &str, name: &str, field_type: &str) -> RemoteField {
        RemoteField {
            id: id.into(),
            name: name.into(),
            field_type: field_type.into(),
        }
    }

    fn task_with_urn(id: &str, field_id: &str, urn: Option<&str>) -> Task {
        Task {
            id: id.into(),
            name: format!("Task {id}"),
            url: None,
            status: None,
            priority: None,
            custom_fields: vec![CustomFieldValue {
                id: field_id.into(),
                value: urn.map(|u| serde_json::Value::String(u.into())),
            }],
        }
    }

    /// Serves a fixed field list and a fixed (loosely filtered) task set.
    struct FixedApi {
        fields: Result<Vec<RemoteField>, u16>,
        tasks: Vec<Task>,
        field_fetches: Mutex<usize>,
    }

    impl FixedApi {
        fn with_fields(fields: Vec<RemoteField>) -> Self {
            Self {
                fields: Ok(fields),
                tasks: vec![],
                field_fetches: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl TaskApi for FixedApi {
        async fn create_task(&self, _list_id: &str, _task: &NewTask) -> Result<Task, ApiError> {
            unreachable!("not used")
        }
        async fn list_tasks(
            &self,
            _list_id: &str,
            _filter: Option<&CustomFieldFilter>,
        ) -> Result<Vec<Task>, ApiError> {
            Ok(self.tasks.clone())
        }
        async fn get_list_fields(&self, _list_id: &str) -> Result<Vec<RemoteField>, ApiError> {
            *self.field_fetches.lock().unwrap() += 1;
            self.fields.clone().map_err(|status| ApiError::Status {
                status,
                body: "nope".into(),
            })
        }
        async fn set_task_field(&self, _: &str, _: &str, _: &str) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[test]
    fn type_constraint_picks_matching_duplicate() {
        let fields = vec![
            field("cf-text", "Fusion Design", "short_text"),
            field("cf-url", "Fusion Design", "url"),
        ];
        assert_eq!(
            find_field(&fields, "Fusion Design", Some("url")).map(|f| f.id.as_str()),
            Some("cf-url")
        );
        assert_eq!(
            find_field(&fields, "Fusion Design", None).map(|f| f.id.as_str()),
            Some("cf-text")
        );
    }

    #[test]
    fn name_match_is_exact_and_case_sensitive() {
        let fields = vec![
            field("a", "fusion document urn", "text"),
            field("b", "Fusion Document URN ", "text"),
        ];
        assert!(find_field(&fields, FIELD_DOCUMENT_URN, None).is_none());
        assert!(find_field(&[], FIELD_DOCUMENT_URN, None).is_none());
    }

    #[tokio::test]
    async fn resolver_refetches_every_call() {
        let api = FixedApi::with_fields(vec![
            field("cf-url", FIELD_FUSION_DESIGN, "url"),
            field("cf-urn", FIELD_DOCUMENT_URN, "short_text"),
        ]);
        let resolver = FieldResolver::new(&api);

        assert_eq!(resolver.design_link_field("901").await.as_deref(), Some("cf-url"));
        assert_eq!(resolver.document_urn_field("901").await.as_deref(), Some("cf-urn"));
        assert_eq!(*api.field_fetches.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn design_field_requires_url_type() {
        let api = FixedApi::with_fields(vec![field("cf-1", FIELD_FUSION_DESIGN, "text")]);
        assert_eq!(FieldResolver::new(&api).design_link_field("901").await, None);
    }

    #[tokio::test]
    async fn strict_lookup_surfaces_fetch_failure() {
        let api = FixedApi {
            fields: Err(401),
            tasks: vec![],
            field_fetches: Mutex::new(0),
        };
        let err = FieldResolver::new(&api)
            .try_find_field_by_name("901", FIELD_DOCUMENT_URN, None)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn fetch_failure_reads_as_not_found() {
        let api = FixedApi {
            fields: Err(403),
            tasks: vec![],
            field_fetches: Mutex::new(0),
        };
        assert_eq!(FieldResolver::new(&api).document_urn_field("901").await, None);
    }

    #[test]
    fn exact_match_rejects_substrings_and_superstrings() {
        let urn = "urn:adsk.wipprod:dm.lineage:AbC123";
        let tasks = vec![
            task_with_urn("exact", "cf-urn", Some(urn)),
            task_with_urn("prefix", "cf-urn", Some("urn:adsk.wipprod:dm.lineage:AbC")),
            task_with_urn("longer", "cf-urn", Some("urn:adsk.wipprod:dm.lineage:AbC1234")),
            task_with_urn("case", "cf-urn", Some("urn:adsk.wipprod:dm.lineage:abc123")),
            task_with_urn("other-field", "cf-other", Some(urn)),
            task_with_urn("unset", "cf-urn", None),
        ];

        let linked = linked_to_document(tasks, "cf-urn", urn);
        let ids: Vec<&str> = linked.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["exact"]);
    }

    #[tokio::test]
    async fn server_filter_is_not_trusted() {
        let urn = "urn:doc:1";
        let mut api = FixedApi::with_fields(vec![]);
        api.tasks = vec![
            task_with_urn("t-1", "cf-urn", Some("urn:doc:10")),
            task_with_urn("t-2", "cf-urn", Some(urn)),
            task_with_urn("t-3", "cf-urn", Some("urn:doc:")),
        ];

        let linked = fetch_document_tasks(&api, "901", "cf-urn", urn).await.unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].id, "t-2");
    }
}
