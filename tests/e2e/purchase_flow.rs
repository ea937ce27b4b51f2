//! Purchase, verification, and plan-read flows over the HTTP surface.

use super::harness::TestHarness;
use serde_json::json;

#[tokio::test]
async fn first_purchase_credits_and_activates_plan() {
    let harness = TestHarness::setup().await;
    harness.provision("acct_a");
    let token = harness.token("acct_a");

    // Fresh account: no plan, no credits, gated features locked but the
    // free job quota still open.
    let (status, body) = harness.get("/payments/current-plan", &token).await;
    assert_eq!(status, 200);
    assert_eq!(body["planCategory"], "NONE");
    assert_eq!(body["creditBalance"], 0);
    assert_eq!(body["hasAccess"], false);
    assert_eq!(body["canApply"], true);

    // Create the order: price is converted to paise, nothing is credited yet.
    let order_id = harness.purchase(&token, "gold").await;
    let (_, plan) = harness.get("/payments/current-plan", &token).await;
    assert_eq!(plan["creditBalance"], 0);

    // Confirm the payment.
    let (status, body) = harness.verify(&token, &order_id, "pay_a_1").await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["creditBalance"], 25);
    assert_eq!(body["planCategory"], "GOLD");

    let (status, history) = harness.get("/payments/history", &token).await;
    assert_eq!(status, 200);
    let records = history["paymentHistory"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["status"], "success");
    assert_eq!(records[0]["paymentId"], "pay_a_1");
    assert_eq!(records[0]["planPurchased"], "GOLD");
    assert_eq!(records[0]["amountPaise"], 29_900);

    // The paid plan now unlocks gated features.
    let (_, plan) = harness.get("/payments/current-plan", &token).await;
    assert_eq!(plan["hasAccess"], true);
    assert_eq!(plan["canApply"], true);
}

#[tokio::test]
async fn purchase_order_amount_is_in_paise() {
    let harness = TestHarness::setup().await;
    harness.provision("acct_paise");
    let token = harness.token("acct_paise");

    let (status, body) = harness
        .post(
            "/payments/purchase",
            &token,
            &json!({
                "planId": "gold",
                "planCategory": "GOLD",
                "amount": 299,
                "credits": 25,
            }),
        )
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["amount"], 29_900);
    assert_eq!(body["currency"], "INR");
    assert_eq!(body["key"], "key_stub");
}

#[tokio::test]
async fn tampered_signature_is_rejected_without_ledger_effect() {
    let harness = TestHarness::setup().await;
    harness.provision("acct_b");
    let token = harness.token("acct_b");

    let order_id = harness.purchase(&token, "gold").await;

    // Flip one character of a valid signature.
    let mut signature = harness.sign(&order_id, "pay_b_1");
    let flipped = if signature.ends_with('0') { '1' } else { '0' };
    signature.pop();
    signature.push(flipped);

    let (status, body) = harness
        .post(
            "/payments/verify",
            &token,
            &json!({
                "orderId": order_id,
                "paymentId": "pay_b_1",
                "signature": signature,
            }),
        )
        .await;

    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["kind"], "invalid_signature");

    let (_, plan) = harness.get("/payments/current-plan", &token).await;
    assert_eq!(plan["creditBalance"], 0);
    assert_eq!(plan["planCategory"], "NONE");
    let (_, history) = harness.get("/payments/history", &token).await;
    assert!(history["paymentHistory"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn repurchase_overwrites_tier_and_accumulates_credits() {
    let harness = TestHarness::setup().await;
    harness.provision("acct_c");
    let token = harness.token("acct_c");

    let silver_order = harness.purchase(&token, "silver").await;
    let (status, body) = harness.verify(&token, &silver_order, "pay_c_1").await;
    assert_eq!(status, 200);
    assert_eq!(body["creditBalance"], 10);
    assert_eq!(body["planCategory"], "SILVER");

    let platinum_order = harness.purchase(&token, "platinum").await;
    let (status, body) = harness.verify(&token, &platinum_order, "pay_c_2").await;
    assert_eq!(status, 200);
    // Credits accumulate; the tier is overwritten, not upgraded-only.
    assert_eq!(body["creditBalance"], 60);
    assert_eq!(body["planCategory"], "PLATINUM");

    let (_, history) = harness.get("/payments/history", &token).await;
    let records = history["paymentHistory"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["planPurchased"], "SILVER");
    assert_eq!(records[1]["planPurchased"], "PLATINUM");
}

#[tokio::test]
async fn replayed_confirmation_credits_only_once() {
    let harness = TestHarness::setup().await;
    harness.provision("acct_d");
    let token = harness.token("acct_d");

    let order_id = harness.purchase(&token, "gold").await;

    let (status, first) = harness.verify(&token, &order_id, "pay_d_1").await;
    assert_eq!(status, 200);
    assert_eq!(first["creditBalance"], 25);

    // An ambiguous network failure makes the client retry verbatim.
    let (status, second) = harness.verify(&token, &order_id, "pay_d_1").await;
    assert_eq!(status, 200);
    assert_eq!(second["creditBalance"], 25);

    let account = harness.ledger().account("acct_d").unwrap();
    assert_eq!(account.credit_balance, 25);
    assert_eq!(account.payment_history.len(), 1);
}

#[tokio::test]
async fn unknown_order_is_rejected() {
    let harness = TestHarness::setup().await;
    harness.provision("acct_e");
    let token = harness.token("acct_e");

    // Correctly signed, but the order was never issued by this service.
    let (status, body) = harness.verify(&token, "order_forged", "pay_e_1").await;
    assert_eq!(status, 400);
    assert_eq!(body["kind"], "unknown_order");

    let (_, plan) = harness.get("/payments/current-plan", &token).await;
    assert_eq!(plan["creditBalance"], 0);
}

#[tokio::test]
async fn catalog_mismatch_is_rejected() {
    let harness = TestHarness::setup().await;
    harness.provision("acct_f");
    let token = harness.token("acct_f");

    // Gold grants 25 credits; claiming 50 must fail validation.
    let (status, body) = harness
        .post(
            "/payments/purchase",
            &token,
            &json!({
                "planId": "gold",
                "planCategory": "GOLD",
                "amount": 299,
                "credits": 50,
            }),
        )
        .await;

    assert_eq!(status, 400);
    assert_eq!(body["kind"], "validation_error");
}

#[tokio::test]
async fn missing_or_forged_token_is_rejected() {
    let harness = TestHarness::setup().await;
    harness.provision("acct_g");

    let status = harness.get_unauthenticated("/payments/current-plan").await;
    assert_eq!(status, 401);

    // A token signed with the wrong secret names a real account but fails
    // verification.
    let forged = planpay::api::TokenVerifier::new("wrong_secret".to_string())
        .issue("acct_g")
        .unwrap();
    let (status, body) = harness.get("/payments/current-plan", &forged).await;
    assert_eq!(status, 401);
    assert_eq!(body["kind"], "auth_error");
}

#[tokio::test]
async fn unprovisioned_account_reads_fail() {
    let harness = TestHarness::setup().await;
    let token = harness.token("acct_ghost");

    let (status, body) = harness.get("/payments/current-plan", &token).await;
    assert_eq!(status, 404);
    assert_eq!(body["kind"], "account_not_found");
}

#[tokio::test]
async fn unprovisioned_account_verification_fails_without_commit() {
    let harness = TestHarness::setup().await;
    let token = harness.token("acct_ghost");

    // Order creation does not touch the ledger, so it succeeds even for an
    // account the store has never seen.
    let order_id = harness.purchase(&token, "gold").await;

    let (status, body) = harness.verify(&token, &order_id, "pay_ghost_1").await;
    assert_eq!(status, 404);
    assert_eq!(body["kind"], "account_not_found");
}
