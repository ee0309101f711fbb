//! Newtype identifiers for every entity in the data model.
//!
//! A single macro generates the boilerplate (`Copy`, `Hash`, `Display`,
//! `From<u64>`) so each id stays a distinct type instead of everything
//! collapsing to a bare `u64`.

macro_rules! id_type {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        pub struct $name(pub u64);

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(TransferId);
id_type!(UserId);
id_type!(TemplateId);
id_type!(StageTemplateId);
id_type!(WorkflowInstanceId);
id_type!(StageInstanceId);
id_type!(AssignmentId);
id_type!(ActionId);
id_type!(DelegationId);
id_type!(SecurityGroupId);
id_type!(SecurityGroupRoleId);
id_type!(SegmentTypeId);
