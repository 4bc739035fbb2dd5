//! Database rows for customers and modules

use sqlx::FromRow;

use crate::model::{CustomerRecord, ModuleRecord};

/// Database representation of a customer
#[derive(Debug, Clone, FromRow)]
pub struct CustomerRow {
    pub id: i64,
    pub name: String,
    pub industry: Option<String>,
    pub deployment_type: Option<String>,
    pub release_version: Option<String>,
    pub base_version: Option<String>,
    pub current_use_cases: Vec<String>,
}

impl CustomerRow {
    pub fn into_domain(self) -> CustomerRecord {
        CustomerRecord {
            name: self.name,
            industry: self.industry,
            deployment_type: self.deployment_type,
            release_version: self.release_version,
            base_version: self.base_version,
            current_use_case_titles: self.current_use_cases,
        }
    }
}

/// Database representation of a module
#[derive(Debug, Clone, FromRow)]
pub struct ModuleRow {
    pub code: String,
    pub name: String,
    pub description: String,
    pub min_version: String,
    pub capabilities: Vec<String>,
    pub industry: Option<String>,
    pub release_version: Option<String>,
    pub base_version: Option<String>,
}

impl ModuleRow {
    pub fn into_domain(self) -> ModuleRecord {
        ModuleRecord {
            code: self.code,
            name: self.name,
            description: self.description,
            min_version: self.min_version,
            capabilities: self
                .capabilities
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            industry: self.industry,
            release_version: self.release_version,
            base_version: self.base_version,
        }
    }
}

/// Escape `%`, `_` and `\` so a name fragment is matched literally by ILIKE
pub fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("Acme"), "Acme");
        assert_eq!(escape_like("100%_Co\\"), "100\\%\\_Co\\\\");
    }

    #[test]
    fn test_module_row_trims_capabilities() {
        let row = ModuleRow {
            code: "PM-01".to_string(),
            name: "Asset Health".to_string(),
            description: String::new(),
            min_version: "22.1".to_string(),
            capabilities: vec![" predictive-maintenance ".to_string(), "".to_string()],
            industry: None,
            release_version: None,
            base_version: None,
        };
        let module = row.into_domain();
        assert!(module.has_capability("predictive-maintenance"));
        assert_eq!(module.capabilities.len(), 1);
    }
}
