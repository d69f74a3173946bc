//! Ledger invariants checked against the in-memory store.
//!
//! Run with: `cargo test -p loyalty-integration-tests --test ledger_properties`

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;

use loyalty_core::{
    CouponStatus, CouponToken, ExternalId, MAX_SPENDING_AMOUNT, Points, PointsError,
    TransactionKind,
};
use loyalty_integration_tests::{
    memory_ledger, promotion, redemption, registration, spending,
};
use loyalty_server::ledger::LedgerError;

#[derive(Debug, Clone)]
enum Op {
    Spend(u32),
    Redeem(usize),
    UseLastCoupon,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1u32..500).prop_map(Op::Spend),
        2 => (0usize..3).prop_map(Op::Redeem),
        1 => Just(Op::UseLastCoupon),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// After any sequence of operations the balance is the sum of the
    /// member's ledger deltas, never negative, and stock only moves on a
    /// committed redemption.
    #[test]
    fn balance_tracks_ledger_deltas(
        costs in prop::collection::vec((0i64..20, 0i32..3), 3),
        ops in prop::collection::vec(op(), 1..40),
    ) {
        runtime().block_on(async {
            let ledger = memory_ledger();
            ledger.register_user(registration("prop")).await.unwrap();
            let user = ExternalId::parse("prop").unwrap();

            let promos: Vec<_> = costs
                .iter()
                .map(|&(cost, qty)| ledger.store().add_promotion(promotion(cost, qty)))
                .collect();

            let mut expected_balance = 0i64;
            let mut stock: Vec<i32> = costs.iter().map(|&(_, qty)| qty).collect();
            let mut last_coupon: Option<CouponToken> = None;

            for op in ops {
                match op {
                    Op::Spend(amount) => {
                        let amount = Decimal::from(amount);
                        let receipt = ledger
                            .record_spending(spending("prop", amount))
                            .await
                            .unwrap();
                        let expected = Points::from_spending(amount).unwrap().value();
                        prop_assert_eq!(receipt.points, expected);
                        expected_balance += expected;
                    }
                    Op::Redeem(index) => {
                        let (cost, _) = costs[index];
                        let before = ledger.store().transaction_count();
                        let result = ledger.redeem(redemption("prop", promos[index])).await;

                        if stock[index] > 0 && expected_balance >= cost {
                            let redeemed = result.unwrap();
                            prop_assert_eq!(redeemed.points_spent, cost);
                            expected_balance -= cost;
                            stock[index] -= 1;
                            prop_assert_eq!(redeemed.balance, expected_balance);
                            last_coupon = Some(redeemed.coupon_id);
                        } else {
                            let rejected = matches!(
                                result,
                                Err(LedgerError::PromotionUnavailable
                                    | LedgerError::InsufficientPoints { .. })
                            );
                            prop_assert!(rejected);
                            prop_assert_eq!(ledger.store().transaction_count(), before);
                        }
                    }
                    Op::UseLastCoupon => {
                        if let Some(coupon) = last_coupon.take() {
                            ledger.use_coupon(coupon, "Front desk").await.unwrap();
                            let again = ledger.use_coupon(coupon, "Front desk").await;
                            let is_used = matches!(
                                again,
                                Err(LedgerError::CouponNotValid { status: CouponStatus::Used })
                            );
                            prop_assert!(is_used);
                        }
                    }
                }

                let balance = ledger.balance("prop").await.unwrap();
                let ledger_sum: i64 = ledger
                    .store()
                    .transactions_for(&user)
                    .iter()
                    .map(|t| t.points)
                    .sum();
                prop_assert_eq!(balance, expected_balance);
                prop_assert_eq!(balance, ledger_sum);
                prop_assert!(balance >= 0);
                for (id, qty) in promos.iter().zip(&stock) {
                    prop_assert_eq!(ledger.store().promotion(*id).unwrap().quantity, *qty);
                }
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}

#[tokio::test]
async fn sold_out_promotion_rejects_without_writing() {
    let ledger = memory_ledger();
    ledger.register_user(registration("m1")).await.unwrap();
    ledger
        .record_spending(spending("m1", Decimal::from(1000)))
        .await
        .unwrap();
    let promo = ledger.store().add_promotion(promotion(1, 0));

    let err = ledger.redeem(redemption("m1", promo)).await.unwrap_err();

    assert!(matches!(err, LedgerError::PromotionUnavailable));
    assert_eq!(ledger.store().transaction_count(), 1);
    assert_eq!(ledger.balance("m1").await.unwrap(), 40);
}

#[tokio::test]
async fn oversized_spending_is_rejected_and_balance_stays_readable() {
    let ledger = memory_ledger();
    ledger.register_user(registration("big")).await.unwrap();
    let huge: Decimal = "230584300921369395175".parse().unwrap();

    for _ in 0..2 {
        let err = ledger.record_spending(spending("big", huge)).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidAmount(PointsError::AmountTooLarge)
        ));
    }
    assert_eq!(ledger.store().transaction_count(), 0);

    let max = Decimal::from(MAX_SPENDING_AMOUNT);
    for _ in 0..3 {
        ledger.record_spending(spending("big", max)).await.unwrap();
    }
    assert_eq!(ledger.balance("big").await.unwrap(), 120_000_000);
}

#[tokio::test]
async fn redemption_entry_carries_valid_coupon() {
    let ledger = memory_ledger();
    ledger.register_user(registration("m1")).await.unwrap();
    ledger
        .record_spending(spending("m1", Decimal::new(12_550, 2)))
        .await
        .unwrap();
    let promo = ledger.store().add_promotion(promotion(5, 1));

    let redeemed = ledger.redeem(redemption("m1", promo)).await.unwrap();

    let user = ExternalId::parse("m1").unwrap();
    let entries = ledger.store().transactions_for(&user);
    assert_eq!(entries.len(), 2);
    let entry = &entries[1];
    assert_eq!(entry.kind, TransactionKind::Redeem);
    assert_eq!(entry.points, -5);
    assert_eq!(entry.promotion_id, Some(promo));
    assert_eq!(entry.coupon_id, Some(redeemed.coupon_id));
    assert_eq!(entry.status, Some(CouponStatus::Valid));
    assert_eq!(redeemed.balance, 0);
    assert_eq!(ledger.store().promotion(promo).unwrap().quantity, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registration_creates_one_member() {
    let ledger = Arc::new(memory_ledger());

    let handles: Vec<_> = (0..12)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move { ledger.register_user(registration("same-member")).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(err) => assert!(matches!(err, LedgerError::DuplicateUser)),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(ledger.store().user_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_redemptions_respect_stock() {
    let ledger = Arc::new(memory_ledger());
    for i in 0..20 {
        let user = format!("member-{i}");
        ledger.register_user(registration(&user)).await.unwrap();
        ledger
            .record_spending(spending(&user, Decimal::from(100)))
            .await
            .unwrap();
    }
    let promo = ledger.store().add_promotion(promotion(3, 5));

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move {
                ledger
                    .redeem(redemption(&format!("member-{i}"), promo))
                    .await
            })
        })
        .collect();

    let mut coupons = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(redeemed) => coupons.push(redeemed.coupon_id),
            Err(err) => assert!(matches!(err, LedgerError::PromotionUnavailable)),
        }
    }

    assert_eq!(coupons.len(), 5);
    let distinct: HashSet<_> = coupons.iter().collect();
    assert_eq!(distinct.len(), 5);
    assert_eq!(ledger.store().promotion(promo).unwrap().quantity, 0);
    assert_eq!(ledger.store().transaction_count(), 25);
}
