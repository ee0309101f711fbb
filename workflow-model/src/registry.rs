//! `spec.md` §3.1 `WorkflowTemplateAssignment`: the static mapping from a
//! security group (and optional transaction-code prefix) to the ordered
//! workflows a transfer routes through.

use serde_derive::{Deserialize, Serialize};

use crate::ids::{SecurityGroupId, TemplateId};

/// One entry of the workflow assignment registry. `(security_group,
/// workflow_template)` must be unique; `execution_order` is admin-entered
/// and may contain gaps — the engine renumbers the *selected* subset densely
/// at chain-build time rather than mutating this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowTemplateAssignment {
    pub security_group: SecurityGroupId,
    pub workflow_template: TemplateId,
    pub execution_order: u32,
    /// `None` / empty string applies to all transaction codes under the group.
    pub transaction_code_filter: Option<String>,
}

impl WorkflowTemplateAssignment {
    /// Whether this assignment applies to a transfer whose code starts with
    /// `transaction_code_prefix`.
    pub fn matches(&self, transaction_code_prefix: &str) -> bool {
        match &self.transaction_code_filter {
            None => true,
            Some(filter) if filter.is_empty() => true,
            Some(filter) => filter == transaction_code_prefix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(filter: Option<&str>) -> WorkflowTemplateAssignment {
        WorkflowTemplateAssignment {
            security_group: SecurityGroupId(1),
            workflow_template: TemplateId(1),
            execution_order: 1,
            transaction_code_filter: filter.map(str::to_string),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(assignment(None).matches("FAR"));
        assert!(assignment(Some("")).matches("ANY"));
    }

    #[test]
    fn exact_filter_matches_only_itself() {
        let a = assignment(Some("FAR"));
        assert!(a.matches("FAR"));
        assert!(!a.matches("AFR"));
    }
}
