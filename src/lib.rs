//! # bankside
//!
//! The web front of the bank product analysis demo: a small HTTP server that
//! serves the static site, accepts the contact form and publishes the
//! analyzer's results as JSON.
//!
//! ## Routes
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | `GET`  | `/api/bank-analysis` | [`routes::bank_analysis`] |
//! | `POST` | `/api/contact`       | [`routes::contact`] |
//! | `GET`  | `/healthz`, `/readyz` | [`health`] |
//! | `GET`  | anything else        | [`assets::serve`] (static pages) |
//!
//! ## Analysis results
//!
//! The analyzer runs separately and writes `output/result.csv` relative to the
//! working directory. The path is fixed on purpose: it is never derived from
//! the request. Until the file exists, `/api/bank-analysis` answers `404`.
//!
//! ```text
//! $ curl localhost:3000/api/bank-analysis
//! {"success":true,"data":[{"client_id":"1","best_product":"deposits",…}],
//!  "statistics":{"total_clients":70,"products":{"deposits":14,…}}}
//! ```
//!
//! ## Running
//!
//! ```rust,no_run
//! use bankside::{AppState, Config, Server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let addr = config.addr;
//!     Server::bind(addr).serve(bankside::app(), AppState::new(config)).await?;
//!     Ok(())
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;

pub mod analysis;
pub mod assets;
pub mod config;
pub mod contact;
pub mod health;
pub mod mail;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::Error;
pub use handler::Handler;
pub use http::StatusCode;
pub use method::Method;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use state::AppState;

/// The site's router.
pub fn app() -> Router<AppState> {
    Router::new()
        .get("/api/bank-analysis", routes::bank_analysis)
        .post("/api/contact", routes::contact)
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness)
        .fallback(assets::serve)
}
