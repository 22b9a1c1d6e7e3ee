#![no_main]

use libfuzzer_sys::fuzz_target;
use rust_decimal::Decimal;
use tributo::core::{Aliquota, BaseCalculo, Money, TaxAmount};

// Input: "<amount> <currency> <rate>", e.g. "1000.00 BRL 18".
fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let mut parts = s.splitn(3, ' ');
    let amount = parts.next().unwrap_or_default();
    let currency = parts.next().unwrap_or("BRL");
    let rate = parts.next().unwrap_or("18");

    // Must not panic. Errors are fine, panics are bugs.
    let Ok(amount) = amount.parse::<Decimal>() else {
        return;
    };
    let Ok(money) = Money::create(amount, currency) else {
        return;
    };
    let again = Money::create(money.amount(), money.currency().as_str()).unwrap();
    assert_eq!(again, money);

    let Ok(rate) = rate.parse::<Decimal>() else {
        return;
    };
    if let (Ok(base), Ok(rate)) = (BaseCalculo::create(money), Aliquota::from_percentage(rate)) {
        assert!(TaxAmount::calculate(base, rate).is_valid());
    }
});
