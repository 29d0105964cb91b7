use actix_web::{HttpResponse, Responder, get, post, web};
use log::{debug, warn};

use super::models::{AppState, NewTxRequest, NewTxResponse, PendingResponse};
use crate::blockchain::BLOCK_REWARD_SENDER;

/// Queue a transfer for the next block.
#[post("/tx/")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTxRequest>,
) -> impl Responder {
    if let Err(msg) = validate_request(&body) {
        warn!("POST /tx/ - rejected: {msg}");
        return HttpResponse::BadRequest().body(msg);
    }

    let block_index = {
        let mut ledger = state.engine.ledger().lock().expect("mutex poisoned");
        ledger.new_transaction(body.sender.trim(), body.recipient.trim(), body.amount)
    };
    debug!(
        "POST /tx/ - {} -> {} ({}) queued for block #{}",
        body.sender, body.recipient, body.amount, block_index
    );

    HttpResponse::Ok().json(NewTxResponse { block_index })
}

/// Transactions waiting for the next block.
#[get("/pending/")]
pub async fn get_pending(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.engine.ledger().lock().expect("mutex poisoned");
    HttpResponse::Ok().json(PendingResponse {
        size: ledger.pending().len(),
        transactions: ledger.pending(),
    })
}

fn validate_request(req: &NewTxRequest) -> Result<(), &'static str> {
    if req.sender.trim().is_empty() || req.recipient.trim().is_empty() {
        return Err("sender and recipient are required");
    }
    if req.sender.trim() == BLOCK_REWARD_SENDER {
        return Err("sender is reserved for block rewards");
    }
    if !req.amount.is_finite() || req.amount <= 0.0 {
        return Err("amount must be > 0");
    }
    Ok(())
}
