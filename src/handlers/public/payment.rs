// Payment gateway glue. `/verify` answers with plain text, matching what the
// gateway's checkout flow expects.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config;
use crate::error::ApiError;
use crate::services::razorpay::RazorpayClient;

#[derive(Debug, Deserialize)]
pub struct OrderNowRequest {
    pub amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub razorpay_payment_id: Option<String>,
    pub razorpay_order_id: Option<String>,
    pub razorpay_signature: Option<String>,
}

/// POST /order-now - create a payment order at the gateway
pub async fn order_now(Json(payload): Json<OrderNowRequest>) -> Result<Json<Value>, ApiError> {
    let amount = payload
        .amount
        .ok_or_else(|| ApiError::bad_request("Amount is required"))?;

    let gateway = RazorpayClient::from_config(&config::config().razorpay)?;
    let order = gateway.create_order(amount).await?;

    Ok(Json(json!({ "data": order })))
}

/// POST /verify - check the gateway's payment signature
pub async fn verify(Json(payload): Json<VerifyRequest>) -> Result<Response, ApiError> {
    let (Some(payment_id), Some(order_id), Some(signature)) = (
        payload.razorpay_payment_id,
        payload.razorpay_order_id,
        payload.razorpay_signature,
    ) else {
        return Ok((StatusCode::BAD_REQUEST, "Failure").into_response());
    };

    let gateway = RazorpayClient::from_config(&config::config().razorpay)?;
    if gateway.verify_signature(&order_id, &payment_id, &signature) {
        Ok((StatusCode::OK, "Success").into_response())
    } else {
        Ok((StatusCode::BAD_REQUEST, "Failure").into_response())
    }
}
