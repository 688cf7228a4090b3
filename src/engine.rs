use arc_swap::ArcSwap;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam::channel::{Receiver, Sender};
use ringbuf::{
    HeapProd, HeapRb,
    traits::{Consumer, Producer, Split},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::NoteDuration;
use crate::patch::ChimePatch;
use crate::pitch;
use crate::recorder::NoteSink;
use crate::synth::{ChimeBank, Strike};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no audio output device available")]
    NoOutputDevice,
    #[error(transparent)]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),
    #[error(transparent)]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error(transparent)]
    PlayStream(#[from] cpal::PlayStreamError),
}

#[derive(Debug, Clone)]
pub enum EngineCommand {
    TriggerNote { note: String, duration: NoteDuration },
    SetPatch(ChimePatch),
    Shutdown,
}

#[derive(Debug, Clone)]
pub enum EngineUpdate {
    StreamStarted,
    Error { message: String },
}

#[derive(Clone)]
pub struct EngineHandle {
    pub command_tx: Sender<EngineCommand>,
    pub update_rx: Receiver<EngineUpdate>,
}

impl NoteSink for EngineHandle {
    fn trigger_note(&self, note: &str, duration: NoteDuration) {
        let _ = self.command_tx.send(EngineCommand::TriggerNote {
            note: note.to_string(),
            duration,
        });
    }
}

pub fn spawn_engine(patch: ChimePatch) -> EngineHandle {
    let (command_tx, command_rx) = crossbeam::channel::unbounded();
    let (update_tx, update_rx) = crossbeam::channel::unbounded();

    std::thread::spawn(move || {
        engine_thread(patch, command_rx, update_tx);
    });

    EngineHandle {
        command_tx,
        update_rx,
    }
}

struct EngineState {
    patch: Arc<ArcSwap<ChimePatch>>,
    // The stream lives as long as it is held here; dropping the state on
    // any exit path tears it down exactly once.
    audio_stream: Option<cpal::Stream>,
    producer: Option<HeapProd<Strike>>,
}

fn engine_thread(
    patch: ChimePatch,
    command_rx: Receiver<EngineCommand>,
    update_tx: Sender<EngineUpdate>,
) {
    let mut state = EngineState {
        patch: Arc::new(ArcSwap::from_pointee(patch)),
        audio_stream: None,
        producer: None,
    };

    loop {
        match command_rx.recv() {
            Ok(EngineCommand::TriggerNote { note, duration }) => {
                if state.audio_stream.is_none() {
                    match setup_audio(&state.patch) {
                        Ok((stream, producer)) => {
                            state.audio_stream = Some(stream);
                            state.producer = Some(producer);
                            let _ = update_tx.send(EngineUpdate::StreamStarted);
                        }
                        Err(e) => {
                            warn!("failed to start audio: {}", e);
                            let _ = update_tx.send(EngineUpdate::Error {
                                message: format!("Failed to start audio: {}", e),
                            });
                        }
                    }
                }

                // Triggers while the stream is unavailable are dropped,
                // not surfaced.
                let Some(ref mut producer) = state.producer else {
                    debug!(note = %note, "dropping trigger, no audio stream");
                    continue;
                };

                match pitch::note_name_to_frequency(&note) {
                    Some(frequency) => {
                        let strike = Strike {
                            frequency,
                            duration_secs: duration.seconds(),
                        };
                        if producer.try_push(strike).is_err() {
                            debug!(note = %note, "chime queue full, dropping trigger");
                        }
                    }
                    None => debug!(note = %note, "unrecognized note name"),
                }
            }

            Ok(EngineCommand::SetPatch(new_patch)) => {
                state.patch.store(Arc::new(new_patch));
                info!("patch hot-swapped");
            }

            Ok(EngineCommand::Shutdown) => break,

            Err(crossbeam::channel::RecvError) => break,
        }
    }

    info!("audio engine stopped");
}

fn setup_audio(
    patch: &Arc<ArcSwap<ChimePatch>>,
) -> Result<(cpal::Stream, HeapProd<Strike>), EngineError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(EngineError::NoOutputDevice)?;
    let config = device.default_output_config()?;
    let stream_config: cpal::StreamConfig = config.into();

    let sample_rate = stream_config.sample_rate as f32;
    let num_channels = stream_config.channels as usize;
    info!("audio output: {} channels, {} Hz", num_channels, sample_rate);

    let ring_buffer = HeapRb::<Strike>::new(256);
    let (producer, mut consumer) = ring_buffer.split();

    let mut bank = ChimeBank::new(sample_rate, patch.clone());

    let stream = device.build_output_stream(
        &stream_config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            while let Some(strike) = consumer.try_pop() {
                bank.strike(strike);
            }
            bank.render(data, num_channels);
        },
        |err| warn!("audio stream error: {}", err),
        None,
    )?;

    stream.play()?;

    Ok((stream, producer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback_handle() -> (EngineHandle, Receiver<EngineCommand>) {
        let (command_tx, command_rx) = crossbeam::channel::unbounded();
        let (_update_tx, update_rx) = crossbeam::channel::unbounded::<EngineUpdate>();
        (
            EngineHandle {
                command_tx,
                update_rx,
            },
            command_rx,
        )
    }

    #[test]
    fn handle_forwards_triggers_as_commands() {
        let (handle, command_rx) = loopback_handle();

        handle.trigger_note("C#5", NoteDuration::Whole);

        match command_rx.try_recv() {
            Ok(EngineCommand::TriggerNote { note, duration }) => {
                assert_eq!(note, "C#5");
                assert_eq!(duration, NoteDuration::Whole);
            }
            other => panic!("expected a trigger command, got {:?}", other),
        }
    }

    #[test]
    fn shutdown_command_is_accepted() {
        let handle = spawn_engine(ChimePatch::default());
        handle
            .command_tx
            .send(EngineCommand::Shutdown)
            .expect("engine should still be running");
    }
}
