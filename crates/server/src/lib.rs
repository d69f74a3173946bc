//! Loyalty points ledger server library.
//!
//! Members earn points for purchases and redeem them for promotions, receiving
//! single-use coupons. The ledger rules live in [`ledger`]; [`routes`] exposes
//! them as a JSON API.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod ledger;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
