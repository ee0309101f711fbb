//! Hold-release accounting (`spec.md` §4.4.7): a derived view over a
//! hold-release transfer's children, never mutated directly. `remaining`
//! closes to zero as child transfers consume the parent's held amount.

use serde_derive::{Deserialize, Serialize};

use workflow_model::{TransferRef, TransferStatus, TransferStore};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HoldReleaseAccounting {
    pub original_hold: i64,
    pub used_by_children: i64,
    pub remaining: i64,
}

/// Whether a child transfer's from-side amount counts toward
/// `used_by_children`: its status is `Approved`, or its `status_level`
/// indicates "submitted or deeper" (≥ 2); either way a `status_level` below
/// 1 is always excluded.
pub fn counts_toward_usage(child: &TransferRef) -> bool {
    child.status_level >= 1 && (child.status == TransferStatus::Approved || child.status_level >= 2)
}

/// Compute the current accounting view for a hold whose child transfers
/// have so far consumed `used_by_children` of the `original_hold` amount.
/// Performs no lookups of its own so it can be unit tested without a store.
pub fn accounting_for(original_hold: i64, used_by_children: i64) -> HoldReleaseAccounting {
    HoldReleaseAccounting {
        original_hold,
        used_by_children,
        remaining: (original_hold - used_by_children).max(0),
    }
}

/// Compute the accounting view for `hold` by summing the from-side amounts
/// of its qualifying children from `transfers`.
pub async fn accounting_for_hold(
    transfers: &dyn TransferStore,
    hold: &TransferRef,
) -> HoldReleaseAccounting {
    let used_by_children: i64 = transfers
        .children_of(hold.id)
        .await
        .iter()
        .filter(|child| counts_toward_usage(child))
        .map(|child| child.amount)
        .sum();
    accounting_for(hold.amount, used_by_children)
}
