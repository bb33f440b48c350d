pub mod card;
pub mod envelope;
pub mod payment;

pub use card::{CardDetails, Token};
pub use envelope::{BilingualMessage, CardErrorDetails, Envelope, ErrorPayload, RawError};
pub use payment::{Charge, ChargeRequest, Identified, List, ListParams, Refund};
