//! Request handlers for the payment endpoints.

use crate::api::auth::AuthAccount;
use crate::api::error::ApiError;
use crate::api::types::{
    CurrentPlanResponse, HistoryResponse, PaymentRecordDto, PurchaseRequest, PurchaseResponse,
    VerifyRequest, VerifyResponse,
};
use crate::payment::{PaymentProvider, PurchaseParams};
use crate::plan::can_apply;
use crate::service::AppState;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;

/// `POST /payments/purchase` - create a provider order for a plan purchase.
pub async fn purchase_plan<P: PaymentProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    AuthAccount(account_id): AuthAccount,
    Json(request): Json<PurchaseRequest>,
) -> Result<Json<PurchaseResponse>, ApiError> {
    let params = PurchaseParams {
        plan_id: request.plan_id,
        plan_category: request.plan_category,
        amount_rupees: request.amount,
        credits: request.credits,
    };
    let order = state.issuer.create_order(&account_id, &params).await?;

    Ok(Json(PurchaseResponse {
        success: true,
        order_id: order.order_id,
        amount: order.amount_paise,
        currency: order.currency,
        key: order.key_id,
    }))
}

/// `POST /payments/verify` - authenticate a payment confirmation and commit
/// the credit/plan mutation.
pub async fn verify_payment<P: PaymentProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    AuthAccount(account_id): AuthAccount,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let verified = state.verifier.verify_and_commit(
        &account_id,
        &request.order_id,
        &request.payment_id,
        &request.signature,
    )?;

    Ok(Json(VerifyResponse {
        success: true,
        credit_balance: verified.credit_balance,
        plan_category: verified.plan_category,
    }))
}

/// `GET /payments/current-plan` - the tier/balance pair every gated feature
/// consults, plus the gate verdicts derived from it.
pub async fn current_plan<P: PaymentProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    AuthAccount(account_id): AuthAccount,
) -> Result<Json<CurrentPlanResponse>, ApiError> {
    let account = state.ledger.account(&account_id)?;

    Ok(Json(CurrentPlanResponse {
        success: true,
        plan_category: account.plan_category,
        credit_balance: account.credit_balance,
        has_access: account.has_access(),
        can_apply: can_apply(
            account.plan_category,
            account.jobs_applied,
            state.free_job_limit,
        ),
    }))
}

/// `GET /payments/history` - chronologically ordered purchase records.
pub async fn payment_history<P: PaymentProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    AuthAccount(account_id): AuthAccount,
) -> Result<Json<HistoryResponse>, ApiError> {
    let records = state.ledger.payment_history(&account_id)?;

    Ok(Json(HistoryResponse {
        success: true,
        payment_history: records.into_iter().map(PaymentRecordDto::from).collect(),
    }))
}
