/// The document currently open in the host, as the host reports it.
#[derive(Debug, Clone)]
pub struct ActiveDocument {
    pub name: String,
    pub is_saved: bool,
    /// Data-file id; absent until the document has been saved to a hub.
    pub document_urn: Option<String>,
    pub project: Option<ProjectInfo>,
}

#[derive(Debug, Clone)]
pub struct ProjectInfo {
    pub urn: String,
    pub name: String,
    /// Web URL of the hub that owns the project, e.g. `https://acme.autodesk360.com/g/en`.
    pub hub_web_url: String,
}

/// Join keys between the local cache and remote task data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentIdentity {
    pub document_urn: String,
    pub project_urn: String,
}

impl ActiveDocument {
    pub fn project_urn(&self) -> Option<&str> {
        self.project
            .as_ref()
            .map(|p| p.urn.as_str())
            .filter(|urn| !urn.is_empty())
    }

    pub fn identity(&self) -> Option<DocumentIdentity> {
        let document_urn = self.document_urn.clone().filter(|u| !u.is_empty())?;
        let project_urn = self.project_urn()?.to_string();
        Some(DocumentIdentity {
            document_urn,
            project_urn,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(urn: Option<&str>, project: Option<&str>) -> ActiveDocument {
        ActiveDocument {
            name: "Bracket".into(),
            is_saved: true,
            document_urn: urn.map(String::from),
            project: project.map(|p| ProjectInfo {
                urn: p.into(),
                name: "Widgets".into(),
                hub_web_url: "https://acme.autodesk360.com/g/en".into(),
            }),
        }
    }

    #[test]
    fn identity_requires_both_urns() {
        assert_eq!(
            doc(Some("urn:doc"), Some("urn:proj")).identity(),
            Some(DocumentIdentity {
                document_urn: "urn:doc".into(),
                project_urn: "urn:proj".into(),
            })
        );
        assert!(doc(None, Some("urn:proj")).identity().is_none());
        assert!(doc(Some("urn:doc"), None).identity().is_none());
        assert!(doc(Some("urn:doc"), Some("")).identity().is_none());
    }
}
