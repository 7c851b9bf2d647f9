//! Purchase attempts
//!
//! A record of one checkout attempt. The gateway that creates the order and
//! confirms payment lives outside this crate; only the record and its status
//! transitions are modelled here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{CourseId, PurchaseId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePurchase {
    pub id: PurchaseId,
    pub user: UserId,
    pub course: CourseId,
    /// Amount charged, in the smallest currency unit
    pub amount: i64,
    /// Order id issued by the payment gateway
    pub gateway_order_id: String,
    pub status: PurchaseStatus,
    pub purchased_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("Purchase amount cannot be negative")]
    NegativeAmount,

    #[error("Purchase is already {0:?}")]
    AlreadySettled(PurchaseStatus),
}

impl CoursePurchase {
    /// Open a pending purchase for a gateway order
    pub fn new(
        user: UserId,
        course: CourseId,
        amount: i64,
        gateway_order_id: impl Into<String>,
    ) -> Result<Self, PurchaseError> {
        if amount < 0 {
            return Err(PurchaseError::NegativeAmount);
        }
        Ok(Self {
            id: PurchaseId::new(),
            user,
            course,
            amount,
            gateway_order_id: gateway_order_id.into(),
            status: PurchaseStatus::Pending,
            purchased_at: Utc::now(),
        })
    }

    /// Settle a pending purchase; settled purchases never change again
    pub fn settle(&mut self, paid: bool) -> Result<PurchaseStatus, PurchaseError> {
        if self.status != PurchaseStatus::Pending {
            return Err(PurchaseError::AlreadySettled(self.status));
        }
        self.status = if paid {
            PurchaseStatus::Completed
        } else {
            PurchaseStatus::Failed
        };
        Ok(self.status)
    }

    /// Whether this purchase grants access to the course
    pub fn grants_access(&self) -> bool {
        self.status == PurchaseStatus::Completed
    }
}
