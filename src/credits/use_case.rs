use serde::{Deserialize, Serialize};

use super::calculator::{CreditCalculation, TaxCreditCalculator};
use super::repository::TaxCreditRepository;
use crate::core::{CurrencyCode, Money, TaxError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessTaxCreditsRequest {
    pub organization_id: String,
    pub user_id: String,
}

impl ProcessTaxCreditsRequest {
    pub fn new(organization_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            user_id: user_id.into(),
        }
    }
}

/// A document that could not be processed.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentError {
    pub document_id: String,
    pub error: TaxError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessTaxCreditsSummary {
    /// Documents whose credit was registered.
    pub processed: usize,
    /// Documents without credit.
    pub skipped: usize,
    pub total_credit: Money,
    pub errors: Vec<DocumentError>,
}

impl ProcessTaxCreditsSummary {
    fn empty(currency: CurrencyCode) -> Self {
        Self {
            processed: 0,
            skipped: 0,
            total_credit: Money::zero(currency),
            errors: Vec::new(),
        }
    }

    fn fail(&mut self, document_id: &str, error: TaxError) {
        tracing::warn!(document_id, error = %error, "document not processed");
        self.errors.push(DocumentError {
            document_id: document_id.to_string(),
            error,
        });
    }
}

/// Runs the credit calculator over an organization's pending documents.
///
/// Documents are processed one at a time in the order the repository lists
/// them. A failing document is recorded in the summary and never stops the
/// run; only failing to list the pending documents fails the call.
#[derive(Debug)]
pub struct ProcessTaxCreditsUseCase<R, C = TaxCreditCalculator> {
    repository: R,
    calculator: C,
    currency: CurrencyCode,
}

impl<R: TaxCreditRepository> ProcessTaxCreditsUseCase<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            calculator: TaxCreditCalculator::default(),
            currency: CurrencyCode::BRL,
        }
    }
}

impl<R: TaxCreditRepository, C: CreditCalculation> ProcessTaxCreditsUseCase<R, C> {
    pub fn with_calculator<D: CreditCalculation>(
        self,
        calculator: D,
    ) -> ProcessTaxCreditsUseCase<R, D> {
        ProcessTaxCreditsUseCase {
            repository: self.repository,
            calculator,
            currency: self.currency,
        }
    }

    /// Currency of the summary total; credits in other currencies are
    /// rejected per document.
    pub fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = currency;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub async fn execute(
        &self,
        request: &ProcessTaxCreditsRequest,
    ) -> Result<ProcessTaxCreditsSummary, TaxError> {
        let org = request.organization_id.as_str();
        let pending = self.repository.get_pending_documents(org).await?;
        tracing::debug!(organization_id = org, pending = pending.len(), "processing credits");

        let mut summary = ProcessTaxCreditsSummary::empty(self.currency);
        for document_id in &pending {
            let document = match self.repository.get_fiscal_document_data(document_id, org).await {
                Ok(Some(document)) => document,
                Ok(None) => {
                    summary.fail(
                        document_id,
                        TaxError::Repository(format!("document {document_id} not found")),
                    );
                    continue;
                }
                Err(e) => {
                    summary.fail(document_id, e);
                    continue;
                }
            };

            let credit = match self.calculator.calculate(&document) {
                Ok(credit) => credit,
                Err(e) => {
                    summary.fail(document_id, e);
                    continue;
                }
            };

            let total = match credit.has_credit().and_then(|has| {
                has.then(|| credit.get_total_credit()).transpose()
            }) {
                Ok(Some(total)) => total,
                Ok(None) => {
                    tracing::debug!(document_id = %document_id, "no credit");
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(
                        document_id = %document_id,
                        error = %e,
                        "credit failed revalidation"
                    );
                    summary.skipped += 1;
                    continue;
                }
            };

            let accumulated = match summary.total_credit.add(&total) {
                Ok(sum) => sum,
                Err(e) => {
                    summary.fail(document_id, e);
                    continue;
                }
            };

            if let Err(e) = self
                .repository
                .register_credit(&credit, &request.user_id, org)
                .await
            {
                summary.fail(document_id, e);
                continue;
            }

            tracing::info!(document_id = %document_id, credit = %total, "credit registered");
            summary.total_credit = accumulated;
            summary.processed += 1;
        }

        tracing::info!(
            organization_id = org,
            processed = summary.processed,
            skipped = summary.skipped,
            errors = summary.errors.len(),
            total_credit = %summary.total_credit,
            "credit processing finished"
        );
        Ok(summary)
    }
}
