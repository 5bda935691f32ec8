use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::{NfeData, QuoteOption, ShipmentRow};

pub type SelectionId = u64;
pub type PickupId = u64;

/// A quote the user picked for a shipment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedQuote {
    pub id: SelectionId,
    pub shipment: ShipmentRow,
    pub option: QuoteOption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PickupStatus {
    Pending,
    Scheduled,
    Collected,
    Cancelled,
}

impl PickupStatus {
    pub fn can_transition_to(self, next: PickupStatus) -> bool {
        use PickupStatus::*;
        matches!(
            (self, next),
            (Pending, Scheduled) | (Scheduled, Collected) | (Pending | Scheduled, Cancelled)
        )
    }
}

impl fmt::Display for PickupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PickupStatus::Pending => "pending",
            PickupStatus::Scheduled => "scheduled",
            PickupStatus::Collected => "collected",
            PickupStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickupRequest {
    pub id: PickupId,
    pub selection: SelectionId,
    pub carrier: String,
    pub freight_total: f64,
    pub invoice: NfeData,
    pub status: PickupStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickupError {
    #[error("unknown selection {0}")]
    UnknownSelection(SelectionId),
    #[error("unknown pickup request {0}")]
    UnknownPickup(PickupId),
    #[error("cannot move pickup request from {from} to {to}")]
    IllegalTransition { from: PickupStatus, to: PickupStatus },
}

/// In-memory register of selected quotes and the pickup requests made from them.
#[derive(Debug, Clone, Default)]
pub struct PickupBook {
    next_id: u64,
    selections: BTreeMap<SelectionId, SelectedQuote>,
    pickups: BTreeMap<PickupId, PickupRequest>,
}

impl PickupBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, shipment: ShipmentRow, option: QuoteOption) -> SelectionId {
        let id = self.allocate_id();
        self.selections.insert(
            id,
            SelectedQuote {
                id,
                shipment,
                option,
            },
        );
        id
    }

    pub fn selection(&self, id: SelectionId) -> Option<&SelectedQuote> {
        self.selections.get(&id)
    }

    pub fn selections(&self) -> impl Iterator<Item = &SelectedQuote> {
        self.selections.values()
    }

    /// Opens a pending pickup request for a selected quote, prefilled from its invoice.
    pub fn register_pickup(
        &mut self,
        selection: SelectionId,
        invoice: NfeData,
    ) -> Result<PickupId, PickupError> {
        let selected = self
            .selections
            .get(&selection)
            .ok_or(PickupError::UnknownSelection(selection))?;
        let carrier = selected.option.carrier.clone();
        let freight_total = selected.option.total;

        let id = self.allocate_id();
        self.pickups.insert(
            id,
            PickupRequest {
                id,
                selection,
                carrier,
                freight_total,
                invoice,
                status: PickupStatus::Pending,
            },
        );
        Ok(id)
    }

    pub fn pickup(&self, id: PickupId) -> Option<&PickupRequest> {
        self.pickups.get(&id)
    }

    pub fn pickups(&self) -> impl Iterator<Item = &PickupRequest> {
        self.pickups.values()
    }

    pub fn advance(&mut self, id: PickupId, next: PickupStatus) -> Result<(), PickupError> {
        let request = self
            .pickups
            .get_mut(&id)
            .ok_or(PickupError::UnknownPickup(id))?;
        if !request.status.can_transition_to(next) {
            return Err(PickupError::IllegalTransition {
                from: request.status,
                to: next,
            });
        }
        request.status = next;
        Ok(())
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}
