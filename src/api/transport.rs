//! Purpose: Thin HTTP fetch collaborator that feeds raw bytes to the decoder.
//! Exports: `Transport`, `TransportOptions`, `Request`, `FetchHandle`.
//! Role: Issue a request, then hand bytes (or failure) to a caller-designated context.
//! Invariants: Each fetch delivers its result at most once, and never after cancellation.
//! Invariants: No retries, caching, or connection management beyond the `ureq` agent.
//! Invariants: Status errors map onto `ErrorKind` the same way for every caller.
#![allow(clippy::result_large_err)]

use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use url::Url;

use super::dispatch::CallbackContext;
use crate::core::error::{Error, ErrorKind};
use crate::core::value::DynamicValue;
use crate::json::parse;

type ApiResult<T> = Result<T, Error>;

const DEFAULT_MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct TransportOptions {
    pub timeout: Option<Duration>,
    pub user_agent: String,
    pub max_body_bytes: u64,
}

impl TransportOptions {
    pub fn new() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            user_agent: format!("jsonlens/{}", env!("CARGO_PKG_VERSION")),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: u64) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Request {
    method: String,
    url: Url,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: impl Into<String>, url: Url) -> Self {
        Self {
            method: method.into(),
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: &str) -> ApiResult<Self> {
        Ok(Self::new("GET", parse_url(url)?))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

#[derive(Clone)]
pub struct Transport {
    inner: Arc<TransportInner>,
}

struct TransportInner {
    agent: ureq::Agent,
    options: TransportOptions,
}

impl Transport {
    pub fn new() -> Self {
        Self::with_options(TransportOptions::new())
    }

    pub fn with_options(options: TransportOptions) -> Self {
        let mut builder = ureq::AgentBuilder::new().user_agent(&options.user_agent);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            inner: Arc::new(TransportInner {
                agent: builder.build(),
                options,
            }),
        }
    }

    pub fn options(&self) -> &TransportOptions {
        &self.inner.options
    }

    pub fn fetch_blocking(&self, request: &Request) -> ApiResult<Vec<u8>> {
        let url = request.url.as_str();
        tracing::debug!(method = %request.method, url, "fetch start");
        let mut call = self.inner.agent.request(&request.method, url);
        for (name, value) in &request.headers {
            call = call.set(name, value);
        }
        let response = match &request.body {
            Some(body) => call.send_bytes(body),
            None => call.call(),
        };

        match response {
            Ok(resp) => {
                let body = read_body(resp, self.inner.options.max_body_bytes)
                    .map_err(|err| err.with_url(url))?;
                tracing::debug!(url, bytes = body.len(), "fetch complete");
                Ok(body)
            }
            Err(ureq::Error::Status(code, _resp)) => Err(status_error(code).with_url(url)),
            Err(ureq::Error::Transport(err)) => Err(Error::new(ErrorKind::Io)
                .with_message("request failed")
                .with_url(url)
                .with_source(err)),
        }
    }

    pub fn fetch_json_blocking(&self, request: &Request) -> ApiResult<DynamicValue> {
        let body = self.fetch_blocking(request)?;
        parse::decode(&body, request.url.as_str())
    }

    /// Runs `request` on a worker thread and delivers the outcome through `context`.
    pub fn fetch<C, F>(&self, request: Request, context: C, callback: F) -> ApiResult<FetchHandle>
    where
        C: CallbackContext,
        F: FnOnce(ApiResult<Vec<u8>>) + Send + 'static,
    {
        let transport = self.clone();
        self.spawn(context, move || transport.fetch_blocking(&request), callback)
    }

    pub fn fetch_json<C, F>(
        &self,
        request: Request,
        context: C,
        callback: F,
    ) -> ApiResult<FetchHandle>
    where
        C: CallbackContext,
        F: FnOnce(ApiResult<DynamicValue>) + Send + 'static,
    {
        let transport = self.clone();
        self.spawn(
            context,
            move || transport.fetch_json_blocking(&request),
            callback,
        )
    }

    fn spawn<C, T, W, F>(&self, context: C, work: W, callback: F) -> ApiResult<FetchHandle>
    where
        C: CallbackContext,
        T: Send + 'static,
        W: FnOnce() -> ApiResult<T> + Send + 'static,
        F: FnOnce(ApiResult<T>) + Send + 'static,
    {
        let abandoned = Arc::new(AtomicBool::new(false));
        let worker_flag = abandoned.clone();
        let worker = std::thread::Builder::new()
            .name("jsonlens-fetch".to_string())
            .spawn(move || {
                let outcome = work();
                if worker_flag.load(Ordering::SeqCst) {
                    tracing::debug!("fetch abandoned before delivery");
                    return;
                }
                context.dispatch(Box::new(move || {
                    if !worker_flag.load(Ordering::SeqCst) {
                        callback(outcome);
                    }
                }));
            })
            .map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message("failed to spawn fetch worker")
                    .with_source(err)
            })?;
        Ok(FetchHandle {
            abandoned,
            worker: Some(worker),
            armed: true,
        })
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

/// Pending fetch. Dropping it abandons delivery unless `join` or `detach` ran first.
pub struct FetchHandle {
    abandoned: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    armed: bool,
}

impl FetchHandle {
    pub fn cancel(&mut self) {
        self.abandoned.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.abandoned.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.worker
            .as_ref()
            .is_none_or(|worker| worker.is_finished())
    }

    /// Waits until the worker has handed its result to the callback context.
    pub fn join(mut self) -> ApiResult<()> {
        self.armed = false;
        match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| {
                Error::new(ErrorKind::Internal).with_message("fetch worker panicked")
            }),
            None => Ok(()),
        }
    }

    /// Lets the fetch complete and deliver without keeping the handle.
    pub fn detach(mut self) {
        self.armed = false;
    }
}

impl Drop for FetchHandle {
    fn drop(&mut self) {
        if self.armed {
            self.abandoned.store(true, Ordering::SeqCst);
        }
    }
}

fn parse_url(raw: &str) -> ApiResult<Url> {
    let url = Url::parse(raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid url")
            .with_url(raw)
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("url must use http or https scheme")
            .with_url(raw));
    }
    Ok(url)
}

fn read_body(response: ureq::Response, max_body_bytes: u64) -> ApiResult<Vec<u8>> {
    let mut body = Vec::new();
    response
        .into_reader()
        .take(max_body_bytes.saturating_add(1))
        .read_to_end(&mut body)
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read response body")
                .with_source(err)
        })?;
    if body.len() as u64 > max_body_bytes {
        return Err(Error::new(ErrorKind::Usage)
            .with_message(format!("response body exceeds {max_body_bytes} bytes")));
    }
    Ok(body)
}

fn status_error(status: u16) -> Error {
    Error::new(error_kind_from_status(status))
        .with_message(format!("remote error status {status}"))
        .with_status(status)
}

fn error_kind_from_status(status: u16) -> ErrorKind {
    match status {
        400 | 413 => ErrorKind::Usage,
        401 | 403 => ErrorKind::Permission,
        404 | 410 => ErrorKind::NotFound,
        500..=599 => ErrorKind::Internal,
        _ => ErrorKind::Io,
    }
}
