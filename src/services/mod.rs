pub mod error_class;
pub mod payment_gateway;
pub mod payment_processor_client;

pub use error_class::ErrorClass;
pub use payment_gateway::PaymentGateway;
pub use payment_processor_client::{PaymentProcessor, StripeClient};
