// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single-writer event loop and its producer handle.

use std::time::Duration;

use smsq_core::SmsqError;
use smsq_core::types::{ChatUpdate, DeliveryOutcome, SmsEnvelope};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::Relay;

/// Work submitted to the relay.
#[derive(Debug)]
pub enum Event {
    /// A translated chat update. The producer does not wait for it.
    Chat(ChatUpdate),
    /// An envelope to deliver. The outcome is sent back on `reply`.
    Deliver {
        envelope: SmsEnvelope,
        reply: oneshot::Sender<DeliveryOutcome>,
    },
    /// Periodic rollover check.
    Tick,
}

/// Cloneable producer handle for the event loop.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<Event>,
}

fn loop_closed() -> SmsqError {
    SmsqError::Internal("relay loop is not running".to_string())
}

impl EventSender {
    /// Submits an envelope and waits until the loop has classified it.
    pub async fn deliver(&self, envelope: SmsEnvelope) -> Result<DeliveryOutcome, SmsqError> {
        let (reply, outcome) = oneshot::channel();
        self.tx
            .send(Event::Deliver { envelope, reply })
            .await
            .map_err(|_| loop_closed())?;
        outcome
            .await
            .map_err(|_| SmsqError::Internal("relay dropped the delivery".to_string()))
    }

    /// Enqueues a chat update without waiting for it to be processed.
    pub async fn chat_update(&self, update: ChatUpdate) -> Result<(), SmsqError> {
        self.tx
            .send(Event::Chat(update))
            .await
            .map_err(|_| loop_closed())
    }

    pub async fn tick(&self) -> Result<(), SmsqError> {
        self.tx.send(Event::Tick).await.map_err(|_| loop_closed())
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side: owns the [`Relay`] and applies events one at a time.
pub struct EventLoop {
    relay: Relay,
    rx: mpsc::Receiver<Event>,
}

/// Creates a bounded event queue feeding `relay`.
pub fn event_channel(relay: Relay, capacity: usize) -> (EventSender, EventLoop) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSender { tx }, EventLoop { relay, rx })
}

impl EventLoop {
    /// Runs until `cancel` fires or every sender is dropped.
    ///
    /// A record store failure stops the loop and is returned. The webhook
    /// registration is removed on every exit path.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<(), SmsqError> {
        info!("relay loop started");
        let result = self.process(&cancel).await;
        self.rx.close();

        if let Err(e) = self.relay.transport().unregister_webhook().await {
            warn!(error = %e, "failed to remove webhook");
        }
        match &result {
            Ok(()) => info!("relay loop stopped"),
            Err(e) => error!(error = %e, "relay loop aborted"),
        }
        result
    }

    async fn process(&mut self, cancel: &CancellationToken) -> Result<(), SmsqError> {
        self.relay.rollover().await?;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping relay loop");
                    return Ok(());
                }
                event = self.rx.recv() => {
                    let Some(event) = event else {
                        debug!("all producers gone");
                        return Ok(());
                    };
                    self.dispatch(event).await?;
                }
            }
        }
    }

    async fn dispatch(&self, event: Event) -> Result<(), SmsqError> {
        match event {
            Event::Chat(update) => self.relay.handle_chat_update(&update).await,
            Event::Deliver { envelope, reply } => {
                let outcome = self.relay.deliver(&envelope).await?;
                if reply.send(outcome).is_err() {
                    debug!(outcome = %outcome, "delivery requester went away");
                }
                Ok(())
            }
            Event::Tick => self.relay.rollover().await.map(|_| ()),
        }
    }
}

/// Submits [`Event::Tick`] every `period` until `cancel` fires or the loop
/// closes. The first tick fires one period after the call.
pub fn spawn_ticker(
    sender: EventSender,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    if sender.tick().await.is_err() {
                        break;
                    }
                }
            }
        }
        debug!("ticker stopped");
    })
}
