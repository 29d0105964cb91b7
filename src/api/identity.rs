use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, IdentityResponse};
use crate::blockchain::TOKEN_SYMBOL;
use crate::wallet::address_uri;

/// This node's reward address, as used for registry and reward entries.
#[get("/identity/")]
pub async fn get_identity(state: web::Data<AppState>) -> impl Responder {
    let address = state.engine.node_address();
    HttpResponse::Ok().json(IdentityResponse {
        address: address.to_string(),
        uri: address_uri(address),
        balance: state.engine.get_balance(address),
        symbol: TOKEN_SYMBOL,
    })
}
