//! A weekend trip between three friends.
//!
//! Shows the raw pairwise view, an overpaying settlement, and the same
//! ledger after the netting pass.

use balance_engine::prelude::*;
use rust_decimal_macros::dec;

fn main() {
    let members = vec![
        Member::new("ana", "Ana").with_role(MemberRole::Admin),
        Member::new("ben", "Ben"),
        Member::new("cy", "Cy"),
    ];
    let ids: Vec<MemberId> = members.iter().map(|m| m.id.clone()).collect();
    let (ana, ben, cy) = (ids[0].clone(), ids[1].clone(), ids[2].clone());

    let expenses = vec![
        Expense::split_equally(ana.clone(), dec!(90), &ids).with_description("Cabin"),
        Expense::split_equally(ben.clone(), dec!(45), &ids).with_description("Groceries"),
        Expense::new(
            cy.clone(),
            vec![Split::new(ana.clone(), dec!(12)), Split::settled(ben.clone(), dec!(12))],
        )
        .with_description("Boat tickets"),
    ];
    let settlements = vec![
        Settlement::new(cy.clone(), ana.clone(), dec!(30)).with_note("cabin share"),
        Settlement::new(ben.clone(), ana.clone(), dec!(25)).with_note("rounded up"),
    ];

    println!("━━━ Raw view ━━━\n");
    match compute_balances(&members, &expenses, &settlements, &LedgerPolicy::default()) {
        Ok(result) => println!("{}", result),
        Err(e) => eprintln!("error: {}", e),
    }

    println!("━━━ Netted view ━━━\n");
    let policy = LedgerPolicy::default()
        .with_overpayment(OverpaymentPolicy::NetAgainstReverse)
        .with_netting(true);
    match compute_balances(&members, &expenses, &settlements, &policy) {
        Ok(result) => println!("{}", result),
        Err(e) => eprintln!("error: {}", e),
    }
}
