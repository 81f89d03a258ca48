use crate::{models::PaymentIntentResponse, utils::error::AppError};

const PAYMENT_INTENTS_URL: &str = "https://api.stripe.com/v1/payment_intents";

/// Convert a dollar price to integer cents the way the gateway expects.
pub fn to_minor_units(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

/// Thin pass-through to the gateway's create-payment-intent call. The
/// amount is taken as sent; it is not validated against a contest's
/// listed price, and no idempotency key is attached.
pub async fn create_payment_intent(price: f64) -> Result<PaymentIntentResponse, AppError> {
    let secret_key = std::env::var("STRIPE_SECRET_KEY")
        .map_err(|_| AppError::Gateway("STRIPE_SECRET_KEY not configured".to_string()))?;

    let amount = to_minor_units(price);
    if amount <= 0 {
        return Err(AppError::InvalidRequest(format!(
            "Price must be positive, got {}",
            price
        )));
    }

    let client = reqwest::Client::new();
    let response = client
        .post(PAYMENT_INTENTS_URL)
        .basic_auth(&secret_key, None::<&str>)
        .form(&[
            ("amount", amount.to_string()),
            ("currency", "usd".to_string()),
            ("payment_method_types[]", "card".to_string()),
        ])
        .send()
        .await
        .map_err(|e| AppError::Gateway(format!("Stripe request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        log::error!("Stripe rejected payment intent ({}): {}", status, body);
        return Err(AppError::Gateway(format!(
            "Stripe returned status {}",
            status
        )));
    }

    let intent: serde_json::Value = response
        .json()
        .await
        .map_err(|e| AppError::Gateway(format!("Failed to parse Stripe response: {}", e)))?;

    let client_secret = intent["client_secret"]
        .as_str()
        .ok_or_else(|| AppError::Gateway("No client_secret in Stripe response".to_string()))?;

    Ok(PaymentIntentResponse {
        client_secret: client_secret.to_string(),
    })
}
