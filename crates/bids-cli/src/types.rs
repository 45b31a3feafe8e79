use crate::pipeline::{EnrichResult, OrganizeResult};

/// Everything a command produced, for the terminal summary.
#[derive(Debug, Default)]
pub struct CurateSummary {
    pub organize: Option<OrganizeResult>,
    pub enrich: Option<EnrichResult>,
}

impl CurateSummary {
    /// All per-item failures across the stages that ran.
    #[must_use]
    pub fn errors(&self) -> Vec<&str> {
        let mut errors = Vec::new();
        if let Some(organize) = &self.organize {
            errors.extend(organize.errors.iter().map(String::as_str));
        }
        if let Some(enrich) = &self.enrich {
            errors.extend(enrich.errors.iter().map(String::as_str));
        }
        errors
    }
}
