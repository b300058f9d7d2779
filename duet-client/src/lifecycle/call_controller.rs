use crate::engine::{NegotiationEngine, NegotiationState};
use crate::lifecycle::{
    CallClock, CallLimit, ClockSignal, Recorder, format_clock, warning_message,
};
use crate::signaling::SignalingOutput;
use crate::transport::{PeerBackend, PeerEvent};
use duet_core::SignalMessage;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, error, info, warn};

const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Idle,
    Active,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallCommand {
    StartCall,
    EndCall,
    StartRecording,
    StopRecording,
}

/// What the user of a call gets to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEvent {
    Elapsed { seconds: u64, display: String },
    TimeWarning { remaining: u64, message: String },
    TimeUp,
    SetupFailed { reason: String },
    /// Offer/answer exchange completed.
    Connected,
    RemoteTrack { kind: String },
    Ended { total: u64, display: String },
}

/// User-facing side of a running call. Dropping every handle ends the call.
#[derive(Clone)]
pub struct CallHandle {
    commands: mpsc::UnboundedSender<CallCommand>,
}

impl CallHandle {
    pub fn start_call(&self) {
        self.send(CallCommand::StartCall);
    }

    pub fn end_call(&self) {
        self.send(CallCommand::EndCall);
    }

    pub fn start_recording(&self) {
        self.send(CallCommand::StartRecording);
    }

    pub fn stop_recording(&self) {
        self.send(CallCommand::StopRecording);
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    fn send(&self, command: CallCommand) {
        if self.commands.send(command).is_err() {
            debug!("Call is over, dropping {:?}", command);
        }
    }
}

/// Owns one call: negotiation, clock, ticker and recorder.
///
/// Runs as a single task; every input (commands, relayed signals, peer
/// events, ticks) is handled to completion before the next one.
pub struct CallController<P, S, R> {
    engine: NegotiationEngine<P, S>,
    recorder: R,
    clock: CallClock,
    phase: CallPhase,
    ticker: Option<JoinHandle<()>>,
    tick_tx: mpsc::UnboundedSender<()>,
    tick_rx: mpsc::UnboundedReceiver<()>,
    commands: mpsc::UnboundedReceiver<CallCommand>,
    signals: mpsc::UnboundedReceiver<SignalMessage>,
    peer_events: mpsc::Receiver<PeerEvent>,
    events: mpsc::UnboundedSender<CallEvent>,
}

impl<P, S, R> CallController<P, S, R>
where
    P: PeerBackend,
    S: SignalingOutput,
    R: Recorder,
{
    pub fn new(
        engine: NegotiationEngine<P, S>,
        recorder: R,
        limit: Option<CallLimit>,
        signals: mpsc::UnboundedReceiver<SignalMessage>,
        peer_events: mpsc::Receiver<PeerEvent>,
    ) -> (Self, CallHandle, mpsc::UnboundedReceiver<CallEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();

        let controller = Self {
            engine,
            recorder,
            clock: CallClock::new(limit),
            phase: CallPhase::Idle,
            ticker: None,
            tick_tx,
            tick_rx,
            commands: command_rx,
            signals,
            peer_events,
            events: event_tx,
        };

        (
            controller,
            CallHandle {
                commands: command_tx,
            },
            event_rx,
        )
    }

    pub fn phase(&self) -> CallPhase {
        self.phase
    }

    pub async fn run(mut self) {
        info!("Call controller started");

        while self.phase != CallPhase::Ended {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        info!("All call handles dropped, ending call");
                        self.end_call(true).await;
                    }
                },
                Some(message) = self.signals.recv() => self.handle_signal(message).await,
                Some(event) = self.peer_events.recv() => self.handle_peer_event(event).await,
                Some(()) = self.tick_rx.recv() => self.handle_tick().await,
            }
        }

        info!("Call controller stopped");
    }

    async fn handle_command(&mut self, command: CallCommand) {
        debug!("Command: {:?}", command);
        match command {
            CallCommand::StartCall => self.start_call().await,
            CallCommand::EndCall => self.end_call(true).await,
            CallCommand::StartRecording => self.start_recording(),
            CallCommand::StopRecording => self.stop_recording(),
        }
    }

    async fn start_call(&mut self) {
        if self.phase != CallPhase::Idle {
            debug!("Call is {:?}, ignoring start", self.phase);
            return;
        }

        match self.engine.start_call().await {
            Ok(()) => self.activate(),
            Err(e) => {
                error!("Call setup failed: {}", e);
                self.emit(CallEvent::SetupFailed {
                    reason: e.to_string(),
                });
            }
        }
    }

    async fn handle_signal(&mut self, message: SignalMessage) {
        debug!("Signal: {}", message.kind());

        if message == SignalMessage::EndCall {
            info!("Remote side ended the call");
            self.end_call(false).await;
            return;
        }

        let was_connected = self.engine.state() == NegotiationState::Connected;
        if let Err(e) = self.engine.handle_signal(message).await {
            error!("Call setup failed: {}", e);
            self.emit(CallEvent::SetupFailed {
                reason: e.to_string(),
            });
            if self.engine.state() == NegotiationState::Idle && self.phase == CallPhase::Active {
                self.deactivate();
            }
            return;
        }

        if !was_connected && self.engine.state() == NegotiationState::Connected {
            self.emit(CallEvent::Connected);
            if self.phase == CallPhase::Idle {
                self.activate();
            }
        }
    }

    async fn handle_peer_event(&mut self, event: PeerEvent) {
        match event {
            PeerEvent::LocalCandidate(candidate) => self.engine.on_local_candidate(candidate),
            PeerEvent::RemoteTrack { kind } => self.emit(CallEvent::RemoteTrack { kind }),
            PeerEvent::Connected => info!("Media connection established"),
            PeerEvent::Closed => {
                info!("Peer connection closed");
                self.end_call(false).await;
            }
        }
    }

    async fn handle_tick(&mut self) {
        if self.phase != CallPhase::Active {
            return;
        }

        let signal = self.clock.tick();
        self.emit(CallEvent::Elapsed {
            seconds: self.clock.elapsed(),
            display: self.clock.display(),
        });

        match signal {
            Some(ClockSignal::Warning { remaining }) => {
                let message = warning_message(remaining);
                warn!("{}", message);
                self.emit(CallEvent::TimeWarning { remaining, message });
            }
            Some(ClockSignal::Expired) => {
                info!("Call time is over, ending call");
                self.emit(CallEvent::TimeUp);
                self.end_call(true).await;
            }
            None => {}
        }
    }

    fn activate(&mut self) {
        self.phase = CallPhase::Active;
        self.clock.reset();

        let tx = self.tick_tx.clone();
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            loop {
                interval.tick().await;
                if tx.send(()).is_err() {
                    break;
                }
            }
        }));
        info!("Call active");
    }

    /// Back to idle after a failed setup; the next `start_call` starts over.
    fn deactivate(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        self.stop_recording();
        self.clock.reset();
        self.phase = CallPhase::Idle;
        info!("Call setup abandoned, back to idle");
    }

    fn start_recording(&mut self) {
        if self.phase != CallPhase::Active {
            warn!("Recording needs an active call");
            return;
        }
        if self.recorder.is_recording() {
            return;
        }
        if let Err(e) = self.recorder.start() {
            error!("Failed to start recording: {:#}", e);
        }
    }

    fn stop_recording(&mut self) {
        if !self.recorder.is_recording() {
            return;
        }
        if let Err(e) = self.recorder.stop() {
            error!("Failed to stop recording: {:#}", e);
        }
    }

    /// Tears the call down once; later calls do nothing.
    async fn end_call(&mut self, send_signal: bool) {
        if self.phase == CallPhase::Ended {
            return;
        }
        self.phase = CallPhase::Ended;

        self.stop_recording();
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        if send_signal {
            self.engine.signaling().send(SignalMessage::EndCall);
        }
        self.engine.end().await;
        self.engine.signaling().close();

        let total = self.clock.elapsed();
        let clock_text = format_clock(total);
        info!("Call ended, total call time {}", clock_text);
        self.emit(CallEvent::Ended {
            total,
            display: clock_text,
        });
        self.clock.reset();
    }

    fn emit(&self, event: CallEvent) {
        let _ = self.events.send(event);
    }
}

impl<P, S, R> Drop for CallController<P, S, R> {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}
