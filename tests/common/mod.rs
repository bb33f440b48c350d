#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use payment_gateway::models::card::Token;
use payment_gateway::models::payment::{ChargeRequest, ListParams};
use payment_gateway::{
    CardDetails, Charge, Config, List, PaymentGateway, PaymentProcessor, ProcessorError, Refund,
};

pub const SECRET: &str = "sk_test_4eC39HqLyjWDarjtT1zdp7dc";

pub fn test_card() -> CardDetails {
    CardDetails::new("4242424242424242", 5, 2030, "314")
}

pub fn config_for(base_url: &str) -> Config {
    let base_url = base_url.to_string();
    Config::from_lookup(move |key| match key {
        "STRIPE_SECRET" => Some(SECRET.to_string()),
        "STRIPE_API_BASE" => Some(base_url.clone()),
        "PROCESSOR_TIMEOUT_MS" => Some("2000".to_string()),
        _ => None,
    })
    .unwrap()
}

pub fn stripe_gateway(base_url: &str) -> PaymentGateway {
    PaymentGateway::from_config(&config_for(base_url)).unwrap()
}

pub fn charge_json(id: &str, amount: i64) -> Value {
    json!({
        "id": id,
        "object": "charge",
        "amount": amount,
        "amount_refunded": 0,
        "currency": "aed",
        "description": "First Test Charge",
        "status": "succeeded",
        "paid": true,
        "refunded": false,
        "created": 1_700_000_000
    })
}

pub fn refund_json(id: &str, charge_id: &str, amount: i64) -> Value {
    json!({
        "id": id,
        "object": "refund",
        "amount": amount,
        "charge": charge_id,
        "currency": "aed",
        "status": "succeeded",
        "created": 1_700_000_100
    })
}

pub fn list_json(url: &str, data: Vec<Value>, has_more: bool) -> Value {
    json!({
        "object": "list",
        "url": url,
        "has_more": has_more,
        "data": data
    })
}

/// In-process processor that records calls and replays queued failures.
#[derive(Default)]
pub struct FakeProcessor {
    pub charges: Mutex<Vec<ChargeRequest>>,
    pub list_calls: Mutex<Vec<ListParams>>,
    pub refunded: Mutex<Vec<String>>,
    pub failures: Mutex<VecDeque<ProcessorError>>,
    next_id: Mutex<u32>,
}

impl FakeProcessor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next(&self, error: ProcessorError) {
        self.failures.lock().unwrap().push_back(error);
    }

    fn take_failure(&self) -> Result<(), ProcessorError> {
        match self.failures.lock().unwrap().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("{}_{}", prefix, *next)
    }

    fn find_charge(&self, charge_id: &str) -> Result<Charge, ProcessorError> {
        self.stored_charges()
            .into_iter()
            .find(|c| c.id == charge_id)
            .ok_or(ProcessorError::Api {
                status: 404,
                request_id: None,
                body: None,
            })
    }

    fn stored_charges(&self) -> Vec<Charge> {
        self.charges
            .lock()
            .unwrap()
            .iter()
            .enumerate()
            .rev()
            .map(|(i, req)| {
                serde_json::from_value(charge_json(&format!("ch_{}", i + 1), req.amount)).unwrap()
            })
            .collect()
    }
}

fn page<T: Clone>(records: Vec<T>, ids: Vec<String>, params: &ListParams) -> List<T> {
    let start = match &params.starting_after {
        Some(cursor) => ids.iter().position(|id| id == cursor).map(|p| p + 1).unwrap_or(ids.len()),
        None => 0,
    };
    let rest = &records[start.min(records.len())..];
    let take = rest.len().min(params.limit as usize);

    List {
        data: rest[..take].to_vec(),
        has_more: rest.len() > take,
        url: None,
    }
}

#[async_trait]
impl PaymentProcessor for FakeProcessor {
    async fn create_token(&self, _card: &CardDetails) -> Result<Token, ProcessorError> {
        self.take_failure()?;
        Ok(Token {
            id: self.next_id("tok"),
            used: false,
            livemode: false,
        })
    }

    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, ProcessorError> {
        self.take_failure()?;
        let id = {
            let mut charges = self.charges.lock().unwrap();
            charges.push(request.clone());
            format!("ch_{}", charges.len())
        };
        let mut charge: Charge = serde_json::from_value(charge_json(&id, request.amount)).unwrap();
        charge.currency = request.currency.clone();
        charge.description = Some(request.description.clone());
        Ok(charge)
    }

    async fn list_charges(&self, params: &ListParams) -> Result<List<Charge>, ProcessorError> {
        self.take_failure()?;
        self.list_calls.lock().unwrap().push(params.clone());
        let charges = self.stored_charges();
        let ids = charges.iter().map(|c| c.id.clone()).collect();
        Ok(page(charges, ids, params))
    }

    async fn retrieve_charge(&self, charge_id: &str) -> Result<Charge, ProcessorError> {
        self.take_failure()?;
        self.find_charge(charge_id)
    }

    async fn create_refund(&self, charge_id: &str) -> Result<Refund, ProcessorError> {
        self.take_failure()?;
        let charge = self.find_charge(charge_id)?;
        let mut refunded = self.refunded.lock().unwrap();
        if refunded.iter().any(|id| id == charge_id) {
            return Err(ProcessorError::Api {
                status: 400,
                request_id: None,
                body: Some(payment_gateway::ApiErrorBody {
                    error_type: Some("invalid_request_error".to_string()),
                    code: Some("charge_already_refunded".to_string()),
                    ..Default::default()
                }),
            });
        }
        refunded.push(charge_id.to_string());
        let id = format!("re_{}", refunded.len());
        Ok(serde_json::from_value(refund_json(&id, charge_id, charge.amount)).unwrap())
    }

    async fn list_refunds(&self, params: &ListParams) -> Result<List<Refund>, ProcessorError> {
        self.take_failure()?;
        self.list_calls.lock().unwrap().push(params.clone());
        let refunds: Vec<Refund> = self
            .refunded
            .lock()
            .unwrap()
            .iter()
            .enumerate()
            .rev()
            .map(|(i, charge_id)| {
                serde_json::from_value(refund_json(&format!("re_{}", i + 1), charge_id, 1000)).unwrap()
            })
            .collect();
        let ids = refunds.iter().map(|r| r.id.clone()).collect();
        Ok(page(refunds, ids, params))
    }
}
