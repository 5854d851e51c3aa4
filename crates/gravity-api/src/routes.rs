use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

use gravity_core::model::{
    CommonStats, Extractor, Nebula, Node, NodeAction, NodeIPMapRecord, NodeReward,
};

use crate::server::ApiState;
use crate::types::{AddressQuery, NodeFilterQuery, PublicKeyQuery, Reply};

pub const HELLO: &str = "/hello";
pub const ALL_NEBULAS: &str = "/nebulas/all";
pub const EXACT_NEBULA: &str = "/nebulas/exact";
pub const ALL_NODES: &str = "/nodes/all";
pub const EXACT_NODE: &str = "/nodes/exact";
pub const NODE_BY_KEY: &str = "/nodes/key";
pub const NODE_IPS: &str = "/nodes/ips";
pub const NODE_REWARDS: &str = "/nodes/rewards";
pub const NODE_ACTIONS_HISTORY: &str = "/nodes/history";
pub const ALL_DATAFEEDS: &str = "/datafeeds/all";
pub const COMMON_STATS: &str = "/stats/common";

type AppState = State<Arc<ApiState>>;

/// Build the API router over `state`.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route(HELLO, get(hello))
        .route(ALL_NEBULAS, get(all_nebulas))
        .route(EXACT_NEBULA, get(exact_nebula))
        .route(ALL_NODES, get(all_nodes))
        .route(EXACT_NODE, get(exact_node))
        .route(NODE_BY_KEY, get(node_by_key))
        .route(NODE_IPS, get(node_ips))
        .route(NODE_REWARDS, get(node_rewards))
        .route(NODE_ACTIONS_HISTORY, get(node_actions_history))
        .route(ALL_DATAFEEDS, get(all_datafeeds))
        .route(COMMON_STATS, get(common_stats))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// One `name: value` line per request header.
async fn hello(headers: HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| {
            format!("{}: {}\n", name, String::from_utf8_lossy(value.as_bytes()))
        })
        .collect()
}

async fn all_nebulas(State(state): AppState) -> Reply<Vec<Nebula>> {
    Reply::from_store(ALL_NEBULAS, state.db.try_list_nebulas().await)
}

async fn exact_nebula(
    State(state): AppState,
    Query(q): Query<AddressQuery>,
) -> Reply<Option<Nebula>> {
    Reply::from_store(EXACT_NEBULA, state.db.find_nebula_by_address(&q.address).await)
}

async fn all_nodes(State(state): AppState) -> Reply<Vec<Node>> {
    Reply::from_store(ALL_NODES, state.db.try_list_nodes().await)
}

async fn exact_node(State(state): AppState, Query(q): Query<AddressQuery>) -> Reply<Option<Node>> {
    Reply::from_store(EXACT_NODE, state.db.find_node_by_address(&q.address).await)
}

async fn node_by_key(
    State(state): AppState,
    Query(q): Query<PublicKeyQuery>,
) -> Reply<Option<Node>> {
    Reply::from_store(NODE_BY_KEY, state.db.find_node_by_public_key(&q.public_key).await)
}

async fn node_ips(State(state): AppState) -> Reply<Vec<NodeIPMapRecord>> {
    Reply::from_store(NODE_IPS, state.db.try_list_node_ips().await)
}

async fn node_rewards(
    State(state): AppState,
    Query(q): Query<NodeFilterQuery>,
) -> Reply<Vec<NodeReward>> {
    let result = state.db.try_list_node_rewards(q.public_key.as_deref()).await;
    Reply::from_store(NODE_REWARDS, result)
}

async fn node_actions_history(
    State(state): AppState,
    Query(q): Query<NodeFilterQuery>,
) -> Reply<Vec<NodeAction>> {
    let result = state.db.try_list_node_actions(q.public_key.as_deref()).await;
    Reply::from_store(NODE_ACTIONS_HISTORY, result)
}

async fn all_datafeeds(State(state): AppState) -> Reply<Vec<Extractor>> {
    Reply::from_store(ALL_DATAFEEDS, state.db.try_list_datafeeds().await)
}

async fn common_stats(State(state): AppState) -> Reply<CommonStats> {
    Reply::from_store(COMMON_STATS, state.db.try_common_stats().await)
}
