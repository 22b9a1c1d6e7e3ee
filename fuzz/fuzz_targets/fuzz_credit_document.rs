#![no_main]

use libfuzzer_sys::fuzz_target;
use tributo::credits::{FiscalDocumentData, TaxCreditCalculator, TaxCreditResult};

fuzz_target!(|data: &[u8]| {
    if let Ok(doc) = serde_json::from_slice::<FiscalDocumentData>(data) {
        // Structural errors are fine; a produced result must reconcile.
        if let Ok(result) = TaxCreditCalculator::default().calculate(&doc) {
            assert!(result.validate().is_ok());
        }
    }
    // Arbitrary aggregates must fail validation, not panic.
    if let Ok(result) = serde_json::from_slice::<TaxCreditResult>(data) {
        let _ = result.has_credit();
        let _ = result.get_total_credit();
    }
});
