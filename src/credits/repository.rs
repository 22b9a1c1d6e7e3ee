//! Storage port consumed by [`ProcessTaxCreditsUseCase`](super::ProcessTaxCreditsUseCase).
//!
//! Production deployments implement [`TaxCreditRepository`] against their
//! document store; [`InMemoryTaxCreditRepository`] backs tests and demos
//! and can be told to fail specific calls.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use super::document::FiscalDocumentData;
use super::result::TaxCreditResult;
use crate::core::TaxError;

/// Access to pending documents and registered credits.
///
/// Failures are reported as [`TaxError::Repository`].
pub trait TaxCreditRepository: Send + Sync {
    /// Ids of documents awaiting credit processing, in processing order.
    fn get_pending_documents(
        &self,
        organization_id: &str,
    ) -> impl Future<Output = Result<Vec<String>, TaxError>> + Send;

    /// Document data, or `None` if the document does not exist.
    fn get_fiscal_document_data(
        &self,
        document_id: &str,
        organization_id: &str,
    ) -> impl Future<Output = Result<Option<FiscalDocumentData>, TaxError>> + Send;

    fn register_credit(
        &self,
        credit: &TaxCreditResult,
        user_id: &str,
        organization_id: &str,
    ) -> impl Future<Output = Result<(), TaxError>> + Send;
}

/// A credit as stored by [`InMemoryTaxCreditRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredCredit {
    pub credit: TaxCreditResult,
    pub user_id: String,
    pub organization_id: String,
}

#[derive(Debug, Default)]
struct State {
    documents: BTreeMap<String, Vec<FiscalDocumentData>>,
    registered: Vec<RegisteredCredit>,
    failing_fetch: BTreeSet<String>,
    failing_register: BTreeSet<String>,
    failing_listing: bool,
}

/// Mutex-backed repository keeping documents per organization.
#[derive(Debug, Default)]
pub struct InMemoryTaxCreditRepository {
    state: Mutex<State>,
}

impl InMemoryTaxCreditRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pending document under its organization.
    pub fn insert_document(&self, document: FiscalDocumentData) -> Result<(), TaxError> {
        self.lock()?
            .documents
            .entry(document.organization_id.clone())
            .or_default()
            .push(document);
        Ok(())
    }

    /// Make fetching `document_id` fail.
    pub fn fail_fetch(&self, document_id: &str) -> Result<(), TaxError> {
        self.lock()?.failing_fetch.insert(document_id.to_string());
        Ok(())
    }

    /// Make registering a credit for `document_id` fail.
    pub fn fail_register(&self, document_id: &str) -> Result<(), TaxError> {
        self.lock()?.failing_register.insert(document_id.to_string());
        Ok(())
    }

    /// Make listing pending documents fail.
    pub fn fail_listing(&self) -> Result<(), TaxError> {
        self.lock()?.failing_listing = true;
        Ok(())
    }

    /// Credits registered so far, in registration order.
    pub fn registered(&self) -> Result<Vec<RegisteredCredit>, TaxError> {
        Ok(self.lock()?.registered.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, TaxError> {
        self.state
            .lock()
            .map_err(|_| TaxError::Repository("in-memory store poisoned".into()))
    }
}

impl TaxCreditRepository for InMemoryTaxCreditRepository {
    async fn get_pending_documents(&self, organization_id: &str) -> Result<Vec<String>, TaxError> {
        let state = self.lock()?;
        if state.failing_listing {
            return Err(TaxError::Repository(format!(
                "cannot list pending documents of {organization_id}"
            )));
        }
        let ids = state
            .documents
            .get(organization_id)
            .map(|docs| docs.iter().map(|d| d.document_id.clone()).collect())
            .unwrap_or_default();
        Ok(ids)
    }

    async fn get_fiscal_document_data(
        &self,
        document_id: &str,
        organization_id: &str,
    ) -> Result<Option<FiscalDocumentData>, TaxError> {
        let state = self.lock()?;
        if state.failing_fetch.contains(document_id) {
            return Err(TaxError::Repository(format!(
                "cannot read document {document_id}"
            )));
        }
        Ok(state
            .documents
            .get(organization_id)
            .and_then(|docs| docs.iter().find(|d| d.document_id == document_id))
            .cloned())
    }

    async fn register_credit(
        &self,
        credit: &TaxCreditResult,
        user_id: &str,
        organization_id: &str,
    ) -> Result<(), TaxError> {
        let mut state = self.lock()?;
        if state.failing_register.contains(credit.document_id()) {
            return Err(TaxError::Repository(format!(
                "cannot register credit of {}",
                credit.document_id()
            )));
        }
        state.registered.push(RegisteredCredit {
            credit: credit.clone(),
            user_id: user_id.to_string(),
            organization_id: organization_id.to_string(),
        });
        Ok(())
    }
}
