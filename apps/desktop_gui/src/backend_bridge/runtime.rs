//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use qr_core::{EncodeError, EncodedImage, QrEncoder};
use shared::GenerationId;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Starts the encoder worker thread. Each encode runs as its own task, so
/// requests may finish out of order; the form controller sorts that out.
pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    encoder: Arc<dyn QrEncoder>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("encoder worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build encoder runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            tracing::info!("encoder worker ready");
            let _ = ui_tx.try_send(UiEvent::Info("Encoder ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Encode { id, text, options } => {
                        let encoder = Arc::clone(&encoder);
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            let outcome = encoder.encode(&text, &options).await;
                            deliver(&ui_tx, id, outcome);
                        });
                    }
                    BackendCommand::Shutdown => break,
                }
            }
            tracing::info!("encoder worker stopped");
        });
    })
}

/// Hands a finished encode to the UI without blocking a runtime worker. A full
/// queue drops the result.
fn deliver(
    ui_tx: &Sender<UiEvent>,
    id: GenerationId,
    outcome: Result<EncodedImage, EncodeError>,
) {
    match ui_tx.try_send(UiEvent::Encoded { id, outcome }) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            tracing::debug!(generation = id.0, "ui queue full, dropping encode result");
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::debug!(generation = id.0, "ui gone before encode finished");
        }
    }
}
