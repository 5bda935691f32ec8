//! Freight core: pure domain types, output assembly and the batch progress state machine.
mod invoice;
mod msg;
mod output;
mod pickup;
mod quote;
mod rate_limit;
mod shipment;
mod state;
mod update;

pub use invoice::{NfeData, Party};
pub use msg::Msg;
pub use output::{assemble_rows, columns, error_row, Cell, OutputRow, OutputShape};
pub use pickup::{
    PickupBook, PickupError, PickupId, PickupRequest, PickupStatus, SelectedQuote, SelectionId,
};
pub use quote::{
    cheapest_index, sorted_by_price, DeliverySummary, QuoteOption, QuoteOutcome,
    DEFAULT_CARRIER, DEFAULT_LEAD_TIME, DEFAULT_SERVICE,
};
pub use rate_limit::{RateLimiter, DEFAULT_MAX_CALLS, DEFAULT_WINDOW};
pub use shipment::{
    digits_only, format_decimal, parse_decimal, parse_quantity, Package, Record,
    ShipmentDefaults, ShipmentRow, ValidationError,
};
pub use state::{percent, Artifact, JobPhase, ProgressSnapshot, ProgressState};
pub use update::update;
