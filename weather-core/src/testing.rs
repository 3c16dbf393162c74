//! In-memory fakes for the transport, resolver and observer seams.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    io,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use tokio::time::Instant;

use async_trait::async_trait;

use crate::{
    error::{ConnectionKind, WeatherError},
    http::{HttpResponse, HttpTransport, Query},
    observer::{Event, Observer},
    probe::HostResolver,
};

/// Replays queued responses per URL. Unscripted URLs are refused.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Result<HttpResponse, WeatherError>>>>,
    calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
    call_times: Mutex<Vec<Instant>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, url: &str, status: u16, body: &str) {
        self.push(url, Ok(HttpResponse { status, body: body.to_string() }));
    }

    pub fn push_err(&self, url: &str, err: WeatherError) {
        self.push(url, Err(err));
    }

    fn push(&self, url: &str, response: Result<HttpResponse, WeatherError>) {
        self.routes
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|(u, _)| u == url).count()
    }

    /// Gaps between consecutive calls, measured on the tokio clock.
    pub fn gaps(&self) -> Vec<Duration> {
        let times = self.call_times.lock().unwrap();
        times.windows(2).map(|pair| pair[1] - pair[0]).collect()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Query of the most recent call to `url`.
    pub fn last_query(&self, url: &str) -> Option<Vec<(String, String)>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(u, _)| u == url)
            .map(|(_, q)| q.clone())
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str, query: Query<'_>) -> Result<HttpResponse, WeatherError> {
        let owned = query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        self.calls.lock().unwrap().push((url.to_string(), owned));
        self.call_times.lock().unwrap().push(Instant::now());

        self.routes
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(WeatherError::connection(ConnectionKind::Refused, "no scripted response"))
            })
    }
}

/// Never answers before `delay`.
#[derive(Debug)]
pub struct SlowTransport {
    delay: Duration,
    calls: AtomicUsize,
}

impl SlowTransport {
    pub fn new(delay: Duration) -> Self {
        Self { delay, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for SlowTransport {
    async fn get(&self, _url: &str, _query: Query<'_>) -> Result<HttpResponse, WeatherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(HttpResponse { status: 200, body: "{}".to_string() })
    }
}

/// Resolves every host except the ones marked unreachable.
#[derive(Debug, Default)]
pub struct StaticResolver {
    unreachable: HashSet<String>,
    lookups: Mutex<Vec<String>>,
}

impl StaticResolver {
    pub fn online() -> Self {
        Self::default()
    }

    pub fn failing(hosts: &[&str]) -> Self {
        Self {
            unreachable: hosts.iter().map(|h| h.to_string()).collect(),
            lookups: Mutex::default(),
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostResolver for StaticResolver {
    async fn resolve(&self, host: &str) -> io::Result<usize> {
        self.lookups.lock().unwrap().push(host.to_string());
        if self.unreachable.contains(host) {
            Err(io::Error::new(io::ErrorKind::NotFound, "failed to lookup address information"))
        } else {
            Ok(1)
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn saw(&self, predicate: impl Fn(&Event) -> bool) -> bool {
        self.events.lock().unwrap().iter().any(predicate)
    }
}

impl Observer for RecordingObserver {
    fn notify(&self, event: &Event) {
        self.events.lock().unwrap().push(event.clone());
    }
}
