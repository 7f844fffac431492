use serde::Deserialize;

/// Path templates for one resource collection. `:id` and `:kind` are
/// substituted per request; a missing template means the verb is unsupported.
#[derive(Debug, Clone, PartialEq)]
pub struct Routes {
    pub list: String,
    pub create: Option<String>,
    pub update: Option<String>,
    pub delete: Option<String>,
}

impl Routes {
    pub fn projects() -> Self {
        Self {
            list: "/api/project".into(),
            create: Some("/api/project/create-project".into()),
            update: Some("/api/project/update-project/:id".into()),
            delete: None,
        }
    }

    pub fn documents() -> Self {
        Self {
            list: "/api/documents".into(),
            create: Some("/api/documents/add".into()),
            update: None,
            delete: Some("/api/documents/:id".into()),
        }
    }

    pub fn finance() -> Self {
        Self {
            list: "/api/finance".into(),
            create: Some("/api/finance/:kind/add".into()),
            update: Some("/api/finance/update/:id".into()),
            delete: Some("/api/finance/delete/:id".into()),
        }
    }
}

/// Replaces each `:name` segment with its value.
pub fn expand(template: &str, params: &[(&str, String)]) -> String {
    template
        .split('/')
        .map(|segment| {
            segment
                .strip_prefix(':')
                .and_then(|name| params.iter().find(|(key, _)| *key == name))
                .map(|(_, value)| value.as_str())
                .unwrap_or(segment)
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Every endpoint the client talks to.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTable {
    pub projects: Routes,
    pub documents: Routes,
    pub finance: Routes,
    pub dashboard: String,
    pub upcoming_events: String,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            projects: Routes::projects(),
            documents: Routes::documents(),
            finance: Routes::finance(),
            dashboard: "/api/dashboard".into(),
            upcoming_events: "/api/upcomingevents".into(),
        }
    }
}

/// Per-route overrides read from `BIZDESK_*` variables. An empty value
/// disables an optional route.
#[derive(Debug, Default, Deserialize)]
pub struct RouteOverrides {
    pub projects_list: Option<String>,
    pub projects_create: Option<String>,
    pub projects_update: Option<String>,
    pub documents_list: Option<String>,
    pub documents_create: Option<String>,
    pub documents_delete: Option<String>,
    pub finance_list: Option<String>,
    pub finance_create: Option<String>,
    pub finance_update: Option<String>,
    pub finance_delete: Option<String>,
    pub dashboard: Option<String>,
    pub upcoming_events: Option<String>,
}

fn override_optional(slot: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        *slot = if value.trim().is_empty() { None } else { Some(value) };
    }
}

fn override_required(slot: &mut String, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        *slot = value;
    }
}

impl RouteTable {
    pub fn with_overrides(mut self, overrides: RouteOverrides) -> Self {
        override_required(&mut self.projects.list, overrides.projects_list);
        override_optional(&mut self.projects.create, overrides.projects_create);
        override_optional(&mut self.projects.update, overrides.projects_update);
        override_required(&mut self.documents.list, overrides.documents_list);
        override_optional(&mut self.documents.create, overrides.documents_create);
        override_optional(&mut self.documents.delete, overrides.documents_delete);
        override_required(&mut self.finance.list, overrides.finance_list);
        override_optional(&mut self.finance.create, overrides.finance_create);
        override_optional(&mut self.finance.update, overrides.finance_update);
        override_optional(&mut self.finance.delete, overrides.finance_delete);
        override_required(&mut self.dashboard, overrides.dashboard);
        override_required(&mut self.upcoming_events, overrides.upcoming_events);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_named_segments() {
        let params = [("id", "7".to_string()), ("kind", "expense".to_string())];
        assert_eq!(expand("/api/finance/delete/:id", &params), "/api/finance/delete/7");
        assert_eq!(expand("/api/finance/:kind/add", &params), "/api/finance/expense/add");
        assert_eq!(expand("/api/documents", &params), "/api/documents");
    }

    #[test]
    fn unknown_placeholders_are_left_alone() {
        assert_eq!(expand("/api/x/:other", &[]), "/api/x/:other");
    }

    #[test]
    fn overrides_replace_and_disable_routes() {
        let table = RouteTable::default().with_overrides(RouteOverrides {
            documents_list: Some("/v2/documents".into()),
            finance_delete: Some(String::new()),
            projects_list: Some("   ".into()),
            ..RouteOverrides::default()
        });
        assert_eq!(table.documents.list, "/v2/documents");
        assert_eq!(table.finance.delete, None);
        assert_eq!(table.projects.list, "/api/project");
        assert_eq!(table.projects.delete, None);
    }
}
