pub mod record;
pub mod store;

pub use record::ShareRecord;
pub use store::{ShareLedger, ShareTally};
