//! Freight engine: upstream quoting, table IO and the background batch job.
mod batch;
mod decode;
mod filename;
mod interactive;
mod nfe;
mod normalize;
mod persist;
mod quote;
mod table;
mod throttle;
mod types;

pub use batch::{BatchOrchestrator, BatchSettings, JobRequest, SharedProgress};
pub use decode::{decode_xml, DecodeError};
pub use filename::result_filename;
pub use interactive::{quote_many, quote_shipment, InteractiveQuote, ItemQuote, QuoteItem};
pub use nfe::extract_nfe;
pub use normalize::{interpret_response, normalize_option, parse_total};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use quote::{request_body, QuoteSettings, Quoter, ReqwestQuoter};
pub use table::{read_table, template_workbook, write_workbook, InputTable, TEMPLATE_FILENAME};
pub use throttle::Throttle;
pub use types::{BatchError, FailureKind, QuoteFailure, TableError};
