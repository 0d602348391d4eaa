//! Shopper Match
//!
//! 画像を上流の商品照合サービスへ送り、結果を正規化して表示するクライアント

pub mod batch;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod render;
pub mod scanner;
pub mod workflow;
