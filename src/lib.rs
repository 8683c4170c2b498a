//! # Pulgarpedia
//!
//! A server-rendered tourism encyclopedia of El Salvador.
//!
//! The whole catalog (categories and places) lives behind one remote JSON
//! endpoint. Pulgarpedia fetches it once, validates it, caches it in a
//! [`ContentStore`](pulgarpedia_core::ContentStore), and serves a filterable,
//! searchable catalog with place detail pages and a sitemap.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │   Content    │──▶│   Content    │──▶│ Filter/Search│
//! │   endpoint   │   │    Store     │   │    Engine    │
//! └──────┬───────┘   └──────────────┘   └──────┬───────┘
//!        │ (fresh fetch)                       ▼
//!        ▼                              ┌──────────────┐
//!   ┌──────────┐                        │  Pagination  │
//!   │ Sitemap  │                        └──────┬───────┘
//!   └──────────┘               ┌───────────────┤
//!                              ▼               ▼
//!                         ┌──────────┐   ┌──────────┐
//!                         │   CLI    │   │   HTTP   │
//!                         └──────────┘   └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`client`] | HTTP content source |
//! | [`scroll`] | Delayed infinite-scroll reveal |
//! | [`search`] | Filtered, paginated listings |
//! | [`get`] | Place detail lookup |
//! | [`sitemap`] | XML sitemap |
//! | [`render`] | HTML templates |
//! | [`server`] | HTTP server |

pub mod check;
pub mod client;
pub mod config;
pub mod get;
pub mod links;
pub mod logging;
pub mod render;
pub mod scroll;
pub mod search;
pub mod server;
pub mod sitemap;
pub mod stats;
