use actix_web::{HttpResponse, Responder, get, post, web};
use log::{error, info};

use super::models::{
    AppState, ChainResponse, DifficultyResponse, SetDifficultyRequest, ValidateResponse,
};

/// Get the full blockchain.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.engine.ledger().lock().expect("mutex poisoned");
    let resp = ChainResponse {
        length: ledger.len(),
        difficulty: ledger.difficulty(),
        chain: ledger.chain(),
    };
    HttpResponse::Ok().json(resp)
}

/// Get the most recent block.
#[get("/chain/last/")]
pub async fn get_last_block(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.engine.ledger().lock().expect("mutex poisoned");
    match ledger.last_block() {
        Ok(block) => HttpResponse::Ok().json(block),
        Err(e) => {
            error!("GET /chain/last/ - {e}");
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

/// Validate the whole chain.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.engine.ledger().lock().expect("mutex poisoned");
    let resp = ValidateResponse {
        valid: ledger.is_valid_chain(),
        length: ledger.len(),
        difficulty: ledger.difficulty(),
    };
    HttpResponse::Ok().json(resp)
}

/// Get current PoT difficulty.
#[get("/difficulty/")]
pub async fn get_difficulty(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.engine.ledger().lock().expect("mutex poisoned");
    HttpResponse::Ok().json(DifficultyResponse {
        difficulty: ledger.difficulty(),
    })
}

/// Update PoT difficulty (applies from the next round).
#[post("/difficulty/")]
pub async fn set_difficulty(
    state: web::Data<AppState>,
    body: web::Json<SetDifficultyRequest>,
) -> impl Responder {
    let mut ledger = state.engine.ledger().lock().expect("mutex poisoned");
    if let Err(e) = ledger.set_difficulty(body.difficulty) {
        return HttpResponse::BadRequest().body(e.to_string());
    }
    info!("difficulty set to {}", ledger.difficulty());
    HttpResponse::Ok().json(DifficultyResponse {
        difficulty: ledger.difficulty(),
    })
}
