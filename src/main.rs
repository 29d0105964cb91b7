use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::{error, info};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pot_chain::api::{self, AppState};
use pot_chain::blockchain::{Ledger, TOKEN_NAME, TOKEN_SYMBOL};
use pot_chain::config::NodeConfig;
use pot_chain::consensus::{self, ConsensusEngine};
use pot_chain::traffic::{self, TrafficMeter};
use pot_chain::wallet;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let cfg = NodeConfig::from_env().map_err(|e| {
        error!("configuration error: {e}");
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let node_address = cfg.node_address.clone().unwrap_or_else(|| {
        let address = wallet::generate_node_address();
        info!("NODE_ADDRESS not set, generated {address}");
        address
    });

    let ledger = Ledger::new(cfg.difficulty, cfg.link_policy)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    let engine = Arc::new(ConsensusEngine::new(
        Arc::new(Mutex::new(ledger)),
        node_address.as_str(),
        cfg.consensus(),
    ));
    let meter = Arc::new(TrafficMeter::new());

    if cfg.simulate_traffic {
        traffic::spawn_simulated_capture(meter.clone(), Duration::from_millis(100));
    }
    actix_web::rt::spawn(consensus::driver::run(
        engine.clone(),
        meter.clone(),
        cfg.tick_interval(),
    ));

    println!(
        "⛓️ {TOKEN_NAME} ({TOKEN_SYMBOL}) node {node_address} at http://{}:{}",
        cfg.host, cfg.port
    );

    let state = web::Data::new(AppState::new(engine, meter.clone()));

    let result = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((cfg.host.as_str(), cfg.port))?
    .run()
    .await;

    meter.stop();
    result
}
