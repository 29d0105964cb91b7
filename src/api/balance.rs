use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, BalanceResponse};
use crate::blockchain::TOKEN_SYMBOL;

#[get("/balance/{address}/")]
pub async fn get_balance(state: web::Data<AppState>, path: web::Path<(String,)>) -> impl Responder {
    let address = path.into_inner().0;
    let balance = state.engine.get_balance(&address);

    HttpResponse::Ok().json(BalanceResponse {
        address,
        balance,
        symbol: TOKEN_SYMBOL,
    })
}
