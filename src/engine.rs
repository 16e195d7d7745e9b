// src/engine.rs
//! Background parse worker.
//!
//! Uploads are parsed off the UI thread. Every request carries an id from [`ParseGate`];
//! when the user loads a second file before the first finishes, the first result is
//! dropped on arrival instead of overwriting the newer one.
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use log::{debug, info, warn};
use crate::config::InferenceConfig;
use crate::signal::{parse_bytes, parse_path, synthetic_csv, ParsedResult, SignalError};
use crate::types::*;

pub fn spawn_thread(
    tx: Sender<LoaderMessage>,
    rx_cmd: Receiver<LoaderCommand>,
    config: InferenceConfig,
) -> JoinHandle<()> {
    thread::spawn(move || {
        tx.send(LoaderMessage::Log("⚙️ Loader ready.".to_owned())).ok();
        // 阻塞等待命令；GUI 端断开后自动退出
        while let Ok(cmd) = rx_cmd.recv() {
            match cmd {
                LoaderCommand::Parse { request_id, source } => {
                    let label = source.label();
                    debug!("parse request #{request_id}: {label}");
                    let result = run_parse(&source, &config);
                    match &result {
                        Ok(parsed) => info!(
                            "request #{request_id} parsed {} samples from {label}",
                            parsed.store.len()
                        ),
                        Err(err) => warn!("request #{request_id} failed for {label}: {err}"),
                    }
                    if tx.send(LoaderMessage::Parsed { request_id, result }).is_err() {
                        break;
                    }
                }
                LoaderCommand::Shutdown => break,
            }
        }
        debug!("loader thread exiting");
    })
}

fn run_parse(source: &ParseSource, config: &InferenceConfig) -> Result<ParsedResult, SignalError> {
    match source {
        ParseSource::Path(path) => parse_path(path, config),
        ParseSource::Bytes { bytes, .. } => parse_bytes(bytes, config),
        ParseSource::Synthetic(plan) => parse_bytes(synthetic_csv(plan).as_bytes(), config),
    }
}

/// Hands out request ids and lets only the most recent one through.
#[derive(Debug, Default)]
pub struct ParseGate {
    issued: u64,
    pending: Option<u64>,
}

impl ParseGate {
    pub fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.pending = Some(self.issued);
        self.issued
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// `Some(result)` only for the outstanding request; anything older is discarded.
    pub fn accept<T>(&mut self, request_id: u64, result: T) -> Option<T> {
        if self.pending == Some(request_id) {
            self.pending = None;
            Some(result)
        } else {
            debug!(
                "discarding stale parse #{request_id} (latest #{})",
                self.issued
            );
            None
        }
    }
}

/// What the UI should act on after draining the loader.
#[derive(Debug)]
pub enum LoaderEvent {
    Log(String),
    Ready(ParsedResult),
    Failed(SignalError),
}

/// UI-side handle: owns the channels and the gate.
pub struct ParseLoader {
    tx_cmd: Sender<LoaderCommand>,
    rx: Receiver<LoaderMessage>,
    gate: ParseGate,
    worker: Option<JoinHandle<()>>,
}

impl ParseLoader {
    pub fn spawn(config: InferenceConfig) -> Self {
        let (tx, rx) = channel();
        let (tx_cmd, rx_cmd) = channel();
        let worker = spawn_thread(tx, rx_cmd, config);
        Self {
            tx_cmd,
            rx,
            gate: ParseGate::default(),
            worker: Some(worker),
        }
    }

    pub fn request(&mut self, source: ParseSource) -> u64 {
        let request_id = self.gate.begin();
        if self
            .tx_cmd
            .send(LoaderCommand::Parse { request_id, source })
            .is_err()
        {
            warn!("loader thread is gone; request #{request_id} dropped");
        }
        request_id
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_pending()
    }

    /// Drains everything the worker has sent so far without blocking.
    pub fn poll(&mut self) -> Vec<LoaderEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(msg) => {
                    if let Some(event) = self.filter(msg) {
                        events.push(event);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.gate.is_pending() {
                        events.push(LoaderEvent::Log("❌ Loader stopped unexpectedly".to_owned()));
                    }
                    break;
                }
            }
        }
        events
    }

    fn filter(&mut self, msg: LoaderMessage) -> Option<LoaderEvent> {
        match msg {
            LoaderMessage::Log(s) => Some(LoaderEvent::Log(s)),
            LoaderMessage::Parsed { request_id, result } => {
                self.gate.accept(request_id, result).map(|r| match r {
                    Ok(parsed) => LoaderEvent::Ready(parsed),
                    Err(err) => LoaderEvent::Failed(err),
                })
            }
        }
    }
}

impl Drop for ParseLoader {
    fn drop(&mut self) {
        self.tx_cmd.send(LoaderCommand::Shutdown).ok();
        if let Some(worker) = self.worker.take() {
            worker.join().ok();
        }
    }
}
