use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tributo::core::Money;
use tributo::credits::*;

#[tokio::main]
async fn main() {
    let repository = InMemoryTaxCreditRepository::new();
    let date = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();

    let purchase = FiscalDocumentData::new("NF-1001", "acme", date, OperationType::Entry)
        .with_item(
            DocumentItem::new("1", "1102", "39269090", Money::brl(dec!(5000)))
                .with_icms(Money::brl(dec!(900))),
        )
        .with_item(DocumentItem::new("2", "1556", "48201000", Money::brl(dec!(300))));
    let cattle = FiscalDocumentData::new("NF-1002", "acme", date, OperationType::Entry)
        .with_item(
            DocumentItem::new("1", "1101", "01022990", Money::brl(dec!(20000)))
                .with_description("Bovinos vivos"),
        );
    let mut broken = FiscalDocumentData::new("NF-1003", "acme", date, OperationType::Entry)
        .with_item(DocumentItem::new("1", "1102", "39269090", Money::brl(dec!(10))));
    broken.items[0].ncm = None;

    for doc in [purchase, cattle, broken] {
        repository.insert_document(doc).unwrap();
    }

    let use_case = ProcessTaxCreditsUseCase::new(repository);
    let summary = use_case
        .execute(&ProcessTaxCreditsRequest::new("acme", "accountant-1"))
        .await
        .unwrap();

    println!("processed: {}", summary.processed);
    println!("skipped:   {}", summary.skipped);
    println!("credit:    {}", summary.total_credit);
    for e in &summary.errors {
        println!("error in {}: {}", e.document_id, e.error);
    }
    for registered in use_case.repository().registered().unwrap() {
        for line in registered.credit.lines() {
            println!(
                "{} item {}: {:?} PIS {} COFINS {}",
                registered.credit.document_id(),
                line.item_id,
                line.kind,
                line.pis,
                line.cofins
            );
        }
    }
}
