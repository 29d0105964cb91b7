use actix_web::{HttpResponse, Responder, get, post, web};
use chrono::Utc;
use log::debug;

use super::models::{
    AppState, ConsensusStatusResponse, LocalTrafficRequest, PeerTrafficRequest, TrafficAck,
};
use crate::traffic::TrafficSample;

/// Node identity, mint countdown and the current traffic registry.
#[get("/consensus/")]
pub async fn get_status(state: web::Data<AppState>) -> impl Responder {
    let engine = &state.engine;
    let config = engine.config();
    HttpResponse::Ok().json(ConsensusStatusResponse {
        node_address: engine.node_address().to_string(),
        scoring: config.scoring,
        reward_amount: config.reward_amount,
        mint_interval_secs: config.mint_interval.num_seconds(),
        last_mint_time: engine.last_mint_time(),
        next_mint_at: engine.next_mint_at(),
        seconds_until_mint: engine.seconds_until_mint(Utc::now()),
        meter_running: state.meter.is_running(),
        local_traffic: state.meter.peek(),
        recent_samples: state.meter.history(),
        registry: engine.registry_snapshot(),
    })
}

/// Record the latest sample reported by a peer node.
#[post("/traffic/peer/")]
pub async fn register_peer_traffic(
    state: web::Data<AppState>,
    body: web::Json<PeerTrafficRequest>,
) -> impl Responder {
    let node_address = body.node_address.trim().to_string();
    if node_address.is_empty() {
        return HttpResponse::BadRequest().body("node_address required");
    }
    if node_address == state.engine.node_address() {
        return HttpResponse::BadRequest().body("local node traffic is reported via /traffic/local/");
    }

    let sample = TrafficSample::new(body.packets_in, body.packets_out);
    state.engine.register_traffic(node_address.clone(), sample);
    HttpResponse::Ok().json(TrafficAck {
        node_address,
        sample,
    })
}

/// Feed packet counts from an external capture process into the local meter.
#[post("/traffic/local/")]
pub async fn record_local_traffic(
    state: web::Data<AppState>,
    body: web::Json<LocalTrafficRequest>,
) -> impl Responder {
    if !state.meter.is_running() {
        return HttpResponse::Conflict().body("traffic meter is stopped");
    }
    state.meter.record_inbound(body.packets_in);
    state.meter.record_outbound(body.packets_out);
    let sample = state.meter.peek();
    debug!(
        "local traffic now in={} out={}",
        sample.packets_in, sample.packets_out
    );
    HttpResponse::Ok().json(TrafficAck {
        node_address: state.engine.node_address().to_string(),
        sample,
    })
}

/// Start or stop the local meter.
#[post("/traffic/local/{action}/")]
pub async fn control_meter(
    state: web::Data<AppState>,
    path: web::Path<(String,)>,
) -> impl Responder {
    match path.into_inner().0.as_str() {
        "start" => state.meter.start(),
        "stop" => state.meter.stop(),
        _ => return HttpResponse::NotFound().body("unknown action (use start or stop)"),
    }
    HttpResponse::Ok().json(serde_json::json!({ "running": state.meter.is_running() }))
}
