// src/lib.rs
//
// Catálogo de coquetéis multi-bar: disponibilidade pela prateleira do membro
// e listagens filtradas por tabelas declarativas de filtros.

pub mod common;
pub mod config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
