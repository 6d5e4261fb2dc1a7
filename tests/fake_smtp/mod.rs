//! In-process fake SMTP server plus stub DNS and connector.
//!
//! Each accepted connection plays one script: the first entry is the
//! greeting, every further entry answers the next line the client sends.
//! Connection `n` uses script `n`, or the last script once they run out.
//! After its script the server drains client lines (QUIT) until EOF.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use mailprobe_lib::{Connector, LookupMx, MxError, MxRecord};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadBuf};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub type Script = Vec<&'static str>;

pub struct FakeSmtpServer {
    addr: SocketAddr,
    connections: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl FakeSmtpServer {
    pub async fn start(scripts: Vec<Script>) -> Self {
        Self::spawn(Some(scripts)).await
    }

    /// Accepts connections and never says a word.
    pub async fn stalling() -> Self {
        Self::spawn(None).await
    }

    async fn spawn(scripts: Option<Vec<Script>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake smtp");
        let addr = listener.local_addr().expect("local addr");
        let connections = Arc::new(AtomicUsize::new(0));
        let received = Arc::new(Mutex::new(Vec::new()));

        let counter = Arc::clone(&connections);
        let log = Arc::clone(&received);
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let index = counter.fetch_add(1, Ordering::SeqCst);
                let log = Arc::clone(&log);
                match &scripts {
                    Some(scripts) => {
                        let script = scripts
                            .get(index)
                            .or_else(|| scripts.last())
                            .cloned()
                            .unwrap_or_default();
                        tokio::spawn(async move {
                            let _ = play(stream, script, log).await;
                        });
                    }
                    None => {
                        tokio::spawn(async move {
                            tokio::time::sleep(Duration::from_secs(30)).await;
                            drop(stream);
                        });
                    }
                }
            }
        });

        Self {
            addr,
            connections,
            received,
            handle,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Every line received from clients, across connections.
    pub fn received(&self) -> Vec<String> {
        self.received.lock().expect("received lock").clone()
    }
}

impl Drop for FakeSmtpServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn play(stream: TcpStream, script: Script, log: Arc<Mutex<Vec<String>>>) -> io::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut replies = script.into_iter();

    if let Some(greeting) = replies.next() {
        write_half.write_all(format!("{greeting}\r\n").as_bytes()).await?;
    }
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        log.lock()
            .expect("received lock")
            .push(line.trim_end().to_string());
        if let Some(reply) = replies.next() {
            write_half.write_all(format!("{reply}\r\n").as_bytes()).await?;
        }
    }
}

/// Address of a loopback port with nothing listening on it.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    addr
}

/// Stub DNS: fixed answers, counts lookups.
pub struct StubResolver {
    records: HashMap<String, Vec<MxRecord>>,
    lookups: Arc<AtomicUsize>,
}

impl StubResolver {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with(mut self, domain: &str, hosts: &[(u16, &str)]) -> Self {
        let records = hosts
            .iter()
            .map(|(priority, host)| MxRecord::new(*priority, *host))
            .collect();
        self.records.insert(domain.to_string(), records);
        self
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.lookups)
    }
}

impl LookupMx for StubResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, MxError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.records
            .get(domain)
            .cloned()
            .ok_or_else(|| MxError::no_records(domain))
    }
}

/// Maps MX host names to loopback addresses; counts connects.
#[derive(Clone, Default)]
pub struct MapConnector {
    hosts: HashMap<String, SocketAddr>,
    connects: Arc<AtomicUsize>,
}

impl MapConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, host: &str, addr: SocketAddr) -> Self {
        self.hosts.insert(host.to_string(), addr);
        self
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.connects)
    }
}

impl Connector for MapConnector {
    type Stream = TcpStream;

    async fn connect(&self, host: &str, _port: u16) -> io::Result<TcpStream> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        match self.hosts.get(host) {
            Some(addr) => TcpStream::connect(addr).await,
            None => Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("no route to {host}"),
            )),
        }
    }
}

/// Resolver that panics for one domain and knows no other.
pub struct PanickingResolver {
    domain: &'static str,
}

impl PanickingResolver {
    pub fn on(domain: &'static str) -> Self {
        Self { domain }
    }
}

impl LookupMx for PanickingResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, MxError> {
        if domain == self.domain {
            panic!("resolver exploded on {domain}");
        }
        Err(MxError::no_records(domain))
    }
}

/// Wraps a [`MapConnector`] and tracks how many streams are open at once.
#[derive(Clone, Default)]
pub struct GaugeConnector {
    routes: MapConnector,
    live: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl GaugeConnector {
    pub fn new(routes: MapConnector) -> Self {
        Self {
            routes,
            ..Self::default()
        }
    }

    /// Highest number of simultaneously open streams seen so far.
    pub fn peak(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.peak)
    }

    pub fn live(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.live)
    }
}

impl Connector for GaugeConnector {
    type Stream = GaugeStream;

    async fn connect(&self, host: &str, port: u16) -> io::Result<GaugeStream> {
        let inner = self.routes.connect(host, port).await?;
        let now = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        Ok(GaugeStream {
            inner,
            live: Arc::clone(&self.live),
        })
    }
}

/// TCP stream that leaves the gauge when dropped.
pub struct GaugeStream {
    inner: TcpStream,
    live: Arc<AtomicUsize>,
}

impl Drop for GaugeStream {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AsyncRead for GaugeStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for GaugeStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}
