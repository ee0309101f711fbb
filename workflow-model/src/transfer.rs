//! Read-only view of the budget transfer this engine routes approvals for.
//!
//! (expansion) `spec.md` treats the transfer as an external entity the
//! engine only references by id; `TransferStore` is the seam a host
//! application implements to supply transfer metadata without this crate
//! depending on the budget-management system itself.

use async_trait::async_trait;
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::ids::{SecurityGroupId, TransferId};
use crate::template::TransferType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Draft,
    PendingApproval,
    Approved,
    Rejected,
}

/// The subset of transfer data the engine needs to select a workflow,
/// evaluate segment-based eligibility, and compute hold-release accounting:
/// its owning security group (absent for a transfer that was never assigned
/// one), transaction-code prefix, transfer type, segment values, a
/// `status_level` ordinal and `linked_transfer_id` used only by hold-release
/// accounting, and the from-side `amount` of the transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRef {
    pub id: TransferId,
    pub security_group_id: Option<SecurityGroupId>,
    pub transaction_code: String,
    pub transfer_type: TransferType,
    pub segments: BTreeMap<String, String>,
    pub status: TransferStatus,
    pub status_level: i32,
    pub linked_transfer_id: Option<TransferId>,
    pub amount: i64,
}

#[async_trait]
pub trait TransferStore: Send + Sync {
    async fn get(&self, id: TransferId) -> Option<TransferRef>;
    async fn set_status(&self, id: TransferId, status: TransferStatus);
    /// Every transfer whose `linked_transfer_id` is `parent` — the children
    /// of a hold-release transfer, for `workflow_engine::hold_release`.
    async fn children_of(&self, parent: TransferId) -> Vec<TransferRef>;
}

#[derive(Debug, Default)]
pub struct InMemoryTransferStore {
    transfers: RwLock<HashMap<TransferId, TransferRef>>,
}

impl InMemoryTransferStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, transfer: TransferRef) {
        self.transfers.write().await.insert(transfer.id, transfer);
    }
}

#[async_trait]
impl TransferStore for InMemoryTransferStore {
    async fn get(&self, id: TransferId) -> Option<TransferRef> {
        self.transfers.read().await.get(&id).cloned()
    }

    async fn set_status(&self, id: TransferId, status: TransferStatus) {
        if let Some(t) = self.transfers.write().await.get_mut(&id) {
            t.status = status;
        }
    }

    async fn children_of(&self, parent: TransferId) -> Vec<TransferRef> {
        self.transfers
            .read()
            .await
            .values()
            .filter(|t| t.linked_transfer_id == Some(parent))
            .cloned()
            .collect()
    }
}
