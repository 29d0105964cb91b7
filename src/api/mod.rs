mod balance;
mod chain;
mod consensus;
mod health;
mod identity;
pub mod models;
mod tx;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(chain::get_chain)
            .service(chain::get_last_block)
            .service(chain::validate_chain)
            .service(chain::get_difficulty)
            .service(chain::set_difficulty)
            .service(tx::post_transaction)
            .service(tx::get_pending)
            .service(balance::get_balance)
            .service(consensus::get_status)
            .service(consensus::register_peer_traffic)
            .service(consensus::record_local_traffic)
            .service(consensus::control_meter)
            .service(identity::get_identity),
    );
}
