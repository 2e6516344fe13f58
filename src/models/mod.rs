pub mod row;
pub mod schema;
pub mod stage;

pub use row::{company_and_position, LedgerRow, DATE_FORMAT, MANUAL_ENTRY, TIME_FORMAT};
pub use schema::{LedgerSchema, SchemaVersion, CANONICAL_HEADER};
pub use stage::Stage;
