pub mod app;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use app::config::{Config, ConfigError, GatewayDefaults};
pub use error::{ApiErrorBody, ProcessorError};
pub use models::{CardDetails, Charge, Envelope, List, Refund};
pub use services::{ErrorClass, PaymentGateway, PaymentProcessor, StripeClient};
