//! Submitting a quote request.
//!
//! A [`QuoteRequestService`] validates the contact form, then hands the
//! request to a [`QuoteSink`] under a deadline. The caller can abandon a
//! submission through a [`watch`] channel; whichever of completion,
//! timeout or cancellation comes first decides the outcome.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use print_core::models::{QuoteNumber, SavedQuote};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::forms::{ContactForm, ValidationErrors};

/// Artificial latency of [`SimulatedQuoteSink`].
pub const DEFAULT_SIMULATED_DELAY: Duration = Duration::from_millis(1_000);

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

pub const CONFIRMATION_MESSAGE: &str = "Thank you! We'll contact you soon.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub contact: ContactForm,
    /// The priced quote the customer is asking about, if any.
    pub quote: Option<SavedQuote>,
}

impl QuoteRequest {
    pub fn new(contact: ContactForm) -> Self {
        Self {
            contact,
            quote: None,
        }
    }

    pub fn with_quote(
        mut self,
        quote: SavedQuote,
    ) -> Self {
        self.quote = Some(quote);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteReceipt {
    pub reference: QuoteNumber,
    pub message: String,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuoteRequestError {
    #[error("invalid form: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("no response after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("request cancelled")]
    Cancelled,

    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Destination of quote requests.
#[async_trait]
pub trait QuoteSink: Send + Sync {
    async fn submit(
        &self,
        request: &QuoteRequest,
    ) -> Result<QuoteReceipt, QuoteRequestError>;
}

/// Acknowledges every request after a fixed delay. Stands in for the
/// sales inbox, which has no API.
#[derive(Debug, Clone)]
pub struct SimulatedQuoteSink {
    delay: Duration,
}

impl SimulatedQuoteSink {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedQuoteSink {
    fn default() -> Self {
        Self::new(DEFAULT_SIMULATED_DELAY)
    }
}

#[async_trait]
impl QuoteSink for SimulatedQuoteSink {
    async fn submit(
        &self,
        request: &QuoteRequest,
    ) -> Result<QuoteReceipt, QuoteRequestError> {
        tokio::time::sleep(self.delay).await;

        let reference = request
            .quote
            .as_ref()
            .map(|q| q.quote_number.clone())
            .unwrap_or_else(QuoteNumber::generate_now);
        Ok(QuoteReceipt {
            reference,
            message: CONFIRMATION_MESSAGE.to_string(),
            received_at: Utc::now(),
        })
    }
}

/// A cancellation pair: send `true` on the sender to abandon the
/// submission holding the receiver.
pub fn cancellation() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Resolves once cancellation is signalled. A dropped sender means it
/// never will be.
async fn cancelled(mut cancel: watch::Receiver<bool>) {
    if cancel.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}

pub struct QuoteRequestService {
    sink: Arc<dyn QuoteSink>,
    timeout: Duration,
}

impl QuoteRequestService {
    pub fn new(
        sink: Arc<dyn QuoteSink>,
        timeout: Duration,
    ) -> Self {
        Self { sink, timeout }
    }

    pub fn simulated(
        delay: Duration,
        timeout: Duration,
    ) -> Self {
        Self::new(Arc::new(SimulatedQuoteSink::new(delay)), timeout)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Validates and submits `request`.
    ///
    /// # Errors
    /// * [`QuoteRequestError::Validation`] before anything is sent.
    /// * [`QuoteRequestError::Timeout`] when the sink is slower than the
    ///   configured timeout.
    /// * [`QuoteRequestError::Cancelled`] when `cancel` fires first.
    /// * Whatever the sink itself returns.
    pub async fn submit(
        &self,
        request: &QuoteRequest,
        cancel: watch::Receiver<bool>,
    ) -> Result<QuoteReceipt, QuoteRequestError> {
        request.contact.validate()?;

        let outcome = tokio::select! {
            result = tokio::time::timeout(self.timeout, self.sink.submit(request)) => {
                result.unwrap_or(Err(QuoteRequestError::Timeout(self.timeout)))
            }
            _ = cancelled(cancel) => Err(QuoteRequestError::Cancelled),
        };

        match &outcome {
            Ok(receipt) => info!(reference = %receipt.reference, "Quote request acknowledged"),
            Err(e) => warn!(error = %e, "Quote request failed"),
        }
        outcome
    }
}
