//! OAuth 2.0 token-endpoint grants and declarative cache policies for HTTP API clients.
//!
//! - [`client::TokenClient`] requests tokens via the `client_credentials`, `password`, and
//!   `refresh_token` grants over a pluggable [`http::TokenHttpClient`] transport.
//! - [`cache`] defines the [`cache::CachePolicy`] contract a call pipeline consults to decide
//!   whether a call reads from or writes to a cache, and under which key.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod cache;
pub mod client;
pub mod error;
pub mod form;
pub mod grant;
pub mod http;
pub mod obs;
pub mod token;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
