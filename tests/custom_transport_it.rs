// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};
// crates.io
use parking_lot::Mutex;
use time::Duration;
// self
use oauth2_tokenkit::{
	client::TokenClient,
	error::{Error, TransportError},
	grant::{GrantCredentials, GrantType},
	http::{
		FormPost, FormReply, TokenHttpClient, TokenHttpHandle, TransportErrorMapper,
		TransportFuture,
	},
};

#[derive(Debug)]
enum FakeTransportError {
	Refused,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Refused => write!(f, "Connection refused."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Default)]
struct Ledger {
	requests: Mutex<Vec<FormPost>>,
	acquired: AtomicUsize,
	released: AtomicUsize,
}

struct FakeHttpClient {
	ledger: Arc<Ledger>,
	reply: Option<FormReply>,
}
impl FakeHttpClient {
	fn replying(ledger: Arc<Ledger>, status: u16, body: &str) -> Self {
		Self { ledger, reply: Some(FormReply { status, body: body.into() }) }
	}

	fn refusing(ledger: Arc<Ledger>) -> Self {
		Self { ledger, reply: None }
	}
}
impl TokenHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn acquire(&self) -> Self::Handle {
		self.ledger.acquired.fetch_add(1, Ordering::SeqCst);

		FakeHttpHandle { ledger: self.ledger.clone(), reply: self.reply.clone() }
	}
}

struct FakeHttpHandle {
	ledger: Arc<Ledger>,
	reply: Option<FormReply>,
}
impl TokenHttpHandle for FakeHttpHandle {
	type TransportError = FakeTransportError;

	fn post_form(&self, request: FormPost) -> TransportFuture<'_, Self::TransportError> {
		Box::pin(async move {
			self.ledger.requests.lock().push(request);

			self.reply.clone().ok_or(FakeTransportError::Refused)
		})
	}
}
impl Drop for FakeHttpHandle {
	fn drop(&mut self) {
		self.ledger.released.fetch_add(1, Ordering::SeqCst);
	}
}

#[derive(Default)]
struct RecordingMapper {
	seen: Mutex<Vec<(GrantType, Duration)>>,
}
impl TransportErrorMapper<FakeTransportError> for RecordingMapper {
	fn map_transport_error(
		&self,
		grant: GrantType,
		timeout: Duration,
		error: FakeTransportError,
	) -> Error {
		self.seen.lock().push((grant, timeout));

		TransportError::network(error).into()
	}
}

type FakeTokenClient = TokenClient<FakeHttpClient, RecordingMapper>;

const ENDPOINT: &str = "https://auth.example.com/oauth/token";

#[tokio::test]
async fn handle_is_released_after_success() {
	let ledger = Arc::new(Ledger::default());
	let client = FakeTokenClient::with_http_client(
		ENDPOINT,
		FakeHttpClient::replying(ledger.clone(), 200, "{\"access_token\":\"T1\"}"),
		RecordingMapper::default(),
	)
	.expect("Client should build with a fake transport.")
	.with_timeout(Duration::seconds(3))
	.expect("Positive timeout should be accepted.");
	let response = client
		.request_client_credentials("abc", "xyz", Some("read"), None)
		.await
		.expect("Fake transport request should succeed.");

	assert_eq!(response.access_token.expose(), "T1");
	assert_eq!(ledger.acquired.load(Ordering::SeqCst), 1);
	assert_eq!(ledger.released.load(Ordering::SeqCst), 1);

	let requests = ledger.requests.lock();

	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].endpoint.as_str(), ENDPOINT);
	assert_eq!(
		requests[0].body,
		"grant_type=client_credentials&client_id=abc&client_secret=xyz&scope=read"
	);
	assert_eq!(requests[0].timeout, std::time::Duration::from_secs(3));
}

#[tokio::test]
async fn handle_is_released_after_transport_failure() {
	let ledger = Arc::new(Ledger::default());
	let mapper = Arc::new(RecordingMapper::default());
	let client = FakeTokenClient::with_http_client(
		ENDPOINT,
		FakeHttpClient::refusing(ledger.clone()),
		mapper.clone(),
	)
	.expect("Client should build with a fake transport.");
	let err = client
		.request_refresh_token("abc", "xyz", "R1", None)
		.await
		.expect_err("Refused connection should fail.");

	assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
	assert!(!err.is_timeout());
	assert_eq!(ledger.acquired.load(Ordering::SeqCst), 1);
	assert_eq!(ledger.released.load(Ordering::SeqCst), 1);
	assert_eq!(*mapper.seen.lock(), [(GrantType::RefreshToken, Duration::seconds(30))]);
}

#[tokio::test]
async fn each_request_acquires_its_own_handle() {
	let ledger = Arc::new(Ledger::default());
	let client = FakeTokenClient::with_http_client(
		ENDPOINT,
		FakeHttpClient::replying(ledger.clone(), 401, "{\"error\":\"invalid_client\"}"),
		RecordingMapper::default(),
	)
	.expect("Client should build with a fake transport.");
	let clone = client.clone();
	let (a, b) = tokio::join!(
		client.request_password_credentials("abc", "xyz", "alice", "secret", None, None),
		clone.request_client_credentials("abc", "xyz", None, None),
	);

	assert!(a.expect("Error body should parse.").is_error());
	assert!(b.expect("Error body should parse.").is_error());
	assert_eq!(ledger.acquired.load(Ordering::SeqCst), 2);
	assert_eq!(ledger.released.load(Ordering::SeqCst), 2);
}

#[test]
fn encode_matches_posted_body() {
	let client = FakeTokenClient::with_http_client(
		ENDPOINT,
		FakeHttpClient::refusing(Arc::new(Ledger::default())),
		RecordingMapper::default(),
	)
	.expect("Client should build with a fake transport.");
	let credentials = GrantCredentials::password("abc", "xyz", "alice", "s3cret")
		.expect("Credentials should build.")
		.with_scope("read");

	assert_eq!(
		client.encode(&credentials),
		"grant_type=password&client_id=abc&client_secret=xyz&username=alice&password=s3cret&scope=read"
	);
}
