use std::future::Future;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::app::config::{Config, GatewayDefaults};
use crate::error::ProcessorError;
use crate::models::card::CardDetails;
use crate::models::envelope::{BilingualMessage, Envelope};
use crate::models::payment::{Charge, ChargeRequest, List, ListParams, Refund};
use crate::services::error_class::ErrorClass;
use crate::services::payment_processor_client::{PaymentProcessor, StripeClient};
use crate::utils::money::{format_minor_units, to_minor_units};

/// Facade over a [`PaymentProcessor`]. Every operation resolves to an
/// [`Envelope`]; processor failures never surface as `Err` or panics.
pub struct PaymentGateway {
    processor: Arc<dyn PaymentProcessor>,
    defaults: GatewayDefaults,
}

impl PaymentGateway {
    pub fn new(processor: Arc<dyn PaymentProcessor>) -> Self {
        Self::with_defaults(processor, GatewayDefaults::default())
    }

    pub fn with_defaults(processor: Arc<dyn PaymentProcessor>, defaults: GatewayDefaults) -> Self {
        Self {
            processor,
            defaults,
        }
    }

    /// Gateway backed by the Stripe client described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, ProcessorError> {
        let client = StripeClient::new(config)?;
        Ok(Self::with_defaults(Arc::new(client), config.defaults.clone()))
    }

    pub fn defaults(&self) -> &GatewayDefaults {
        &self.defaults
    }

    /// Tokenizes `card` and charges it `amount` (major units).
    ///
    /// Not idempotent: every successful call is a new charge on the card.
    pub async fn charge(
        &self,
        card: &CardDetails,
        amount: Decimal,
        currency: Option<&str>,
        description: Option<&str>,
    ) -> Envelope<Charge> {
        let currency = currency.unwrap_or(&self.defaults.currency);
        let description = description.unwrap_or(&self.defaults.description);

        self.run(
            "charge",
            BilingualMessage::new("pay operation Succeeded", "نجحت عملية الدفع"),
            self.tokenize_and_charge(card, amount, currency, description),
        )
        .await
    }

    pub async fn list_charges(&self, limit: Option<u32>, cursor: Option<&str>) -> Envelope<List<Charge>> {
        let params = ListParams::new(limit.unwrap_or(self.defaults.list_limit), cursor);

        self.run(
            "list_charges",
            BilingualMessage::new(
                "retrieve All Charges operation Succeeded",
                "استرجاع جميع عمليات التحويل بنجاح",
            ),
            async {
                check_list_params(&params)?;
                self.processor.list_charges(&params).await
            },
        )
        .await
    }

    pub async fn retrieve_charge(&self, charge_id: &str) -> Envelope<Charge> {
        self.run(
            "retrieve_charge",
            BilingualMessage::new(
                "retrieve Pay By Charge ID operation Succeeded",
                "استرجاع الدفع بواسطة معرّف المصاريف بنجاح",
            ),
            async {
                let charge_id = require_id(charge_id)?;
                self.processor.retrieve_charge(charge_id).await
            },
        )
        .await
    }

    /// Full refund of `charge_id`. Refunding twice is rejected by the processor.
    pub async fn refund(&self, charge_id: &str) -> Envelope<Refund> {
        self.run(
            "refund",
            BilingualMessage::new("refund operation Succeeded", "نجحت عملية الاسترداد"),
            async {
                let charge_id = require_id(charge_id)?;
                self.processor.create_refund(charge_id).await
            },
        )
        .await
    }

    pub async fn list_refunds(&self, limit: Option<u32>, cursor: Option<&str>) -> Envelope<List<Refund>> {
        let params = ListParams::new(limit.unwrap_or(self.defaults.list_limit), cursor);

        self.run(
            "list_refunds",
            BilingualMessage::new(
                "Getting all Refund List Succeeded",
                "نجحت عملية الحصول على قائمة الاسترداد بالكامل",
            ),
            async {
                check_list_params(&params)?;
                self.processor.list_refunds(&params).await
            },
        )
        .await
    }

    async fn tokenize_and_charge(
        &self,
        card: &CardDetails,
        amount: Decimal,
        currency: &str,
        description: &str,
    ) -> Result<Charge, ProcessorError> {
        if amount <= Decimal::ZERO {
            return Err(ProcessorError::Validation(format!(
                "amount must be positive, got {}",
                amount
            )));
        }
        let minor_units = to_minor_units(amount).ok_or_else(|| {
            ProcessorError::Validation(format!("amount {} is out of range", amount))
        })?;
        if minor_units == 0 {
            return Err(ProcessorError::Validation(format!(
                "amount {} rounds to zero minor units",
                amount
            )));
        }
        if currency.trim().is_empty() {
            return Err(ProcessorError::Validation("currency is required".into()));
        }
        card.validate()?;

        let token = self.processor.create_token(card).await?;

        let request = ChargeRequest {
            amount: minor_units,
            currency: currency.to_lowercase(),
            source: token.id,
            description: description.to_string(),
        };
        info!(amount = %format_minor_units(minor_units, currency), "charging tokenized card");

        self.processor.create_charge(&request).await
    }

    async fn run<T, F>(&self, operation: &'static str, success: BilingualMessage, call: F) -> Envelope<T>
    where
        F: Future<Output = Result<T, ProcessorError>>,
    {
        let span = info_span!("payment_gateway", operation, operation_id = %Uuid::new_v4());

        async move {
            match call.await {
                Ok(data) => {
                    info!("{} succeeded", operation);
                    Envelope::success(data, success)
                }
                Err(e) => {
                    let class = ErrorClass::classify(&e);
                    warn!(class = ?class, error = %e, "{} failed", operation);
                    Envelope::failure(&e)
                }
            }
        }
        .instrument(span)
        .await
    }
}

fn check_list_params(params: &ListParams) -> Result<(), ProcessorError> {
    if params.is_valid() {
        Ok(())
    } else {
        Err(ProcessorError::Validation(format!(
            "limit must be between 1 and 100, got {}",
            params.limit
        )))
    }
}

fn require_id(id: &str) -> Result<&str, ProcessorError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ProcessorError::Validation("charge id is required".into()));
    }
    Ok(id)
}
