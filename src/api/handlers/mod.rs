//! REST API handlers organized by mode.

pub mod basic;
pub mod pages;
pub mod verify;

use std::net::SocketAddr;

use axum::extract::ConnectInfo;

/// Observed peer IP, when the listener provides connect info.
pub(crate) fn client_ip(connect_info: Option<&ConnectInfo<SocketAddr>>) -> String {
    connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
