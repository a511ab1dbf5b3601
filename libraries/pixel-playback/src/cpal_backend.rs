/// CPAL-based output backend
use crate::backend::OutputBackend;
use crate::error::{PlaybackError, Result};
use crate::mixer::Mixer;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Running audio thread
struct Worker {
    shutdown_tx: Sender<()>,
    thread: JoinHandle<()>,
}

/// CPAL audio output
///
/// **Architecture**: the CPAL `Stream` is created, played and dropped on a
/// dedicated audio thread and never leaves it. The backend only holds a
/// shutdown channel, so it stays `Send` on every platform.
pub struct CpalBackend {
    device: Device,
    config: StreamConfig,
    sample_rate: u32,
    channels: u16,
    worker: Option<Worker>,
}

impl CpalBackend {
    /// Create a backend for the default output device
    ///
    /// # Errors
    /// Returns an error if no audio device is found or it has no usable
    /// default configuration
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| PlaybackError::device("Audio device not found"))?;

        let supported = device.default_output_config()?;
        let sample_rate = supported.sample_rate();
        let channels = supported.channels();
        let config = supported.config();

        info!(sample_rate, channels, "Opened default output device");

        Ok(Self {
            device,
            config,
            sample_rate,
            channels,
            worker: None,
        })
    }

    /// Audio thread main loop
    ///
    /// Builds the stream, reports the outcome on `ready`, then parks until
    /// a shutdown message arrives or the sender is dropped.
    fn audio_thread_run(
        device: &Device,
        config: &StreamConfig,
        mixer: Arc<Mutex<Mixer>>,
        ready: &Sender<Result<()>>,
        shutdown: &Receiver<()>,
    ) {
        let stream = match Self::build_stream(device, config, mixer) {
            Ok(stream) => stream,
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };
        let _ = ready.send(Ok(()));

        let _ = shutdown.recv();
        drop(stream);
        debug!("Audio thread exiting");
    }

    fn build_stream(device: &Device, config: &StreamConfig, mixer: Arc<Mutex<Mixer>>) -> Result<Stream> {
        let stream = device.build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| match mixer.lock() {
                Ok(mut mixer) => mixer.render(data),
                Err(_) => data.fill(0.0),
            },
            |err| warn!(error = %err, "Audio stream error"),
            None,
        )?;
        stream.play()?;
        Ok(stream)
    }
}

impl OutputBackend for CpalBackend {
    fn name(&self) -> &'static str {
        "cpal"
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn start(&mut self, mixer: Arc<Mutex<Mixer>>) -> Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }

        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);
        let device = self.device.clone();
        let config = self.config.clone();

        let thread = thread::Builder::new()
            .name("pixel-audio-output".to_string())
            .spawn(move || {
                Self::audio_thread_run(&device, &config, mixer, &ready_tx, &shutdown_rx);
            })
            .map_err(|e| PlaybackError::device(format!("Failed to spawn audio thread: {}", e)))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                debug!("Output stream playing");
                self.worker = Some(Worker {
                    shutdown_tx,
                    thread,
                });
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(PlaybackError::device("Audio thread exited during startup"))
            }
        }
    }

    fn stop(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        let _ = worker.shutdown_tx.send(());
        worker
            .thread
            .join()
            .map_err(|_| PlaybackError::device("Audio thread panicked"))?;
        debug!("Output stream stopped");
        Ok(())
    }
}

impl Drop for CpalBackend {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
