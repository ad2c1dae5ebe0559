use super::{EngineState, LyricUpdate, SnapshotSource, active_line_index};
use crate::config::SyncConfig;
use crate::error::PlaybackError;
use crate::lyrics::{LyricSet, LyricsService};
use crate::spotify::PlaybackSnapshot;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub poll_interval: Duration,
    pub channel_capacity: usize,
}

impl From<&SyncConfig> for EngineConfig {
    fn from(cfg: &SyncConfig) -> Self {
        Self {
            poll_interval: cfg.poll_interval(),
            channel_capacity: cfg.channel_capacity,
        }
    }
}

pub struct SyncEngine {
    source: Arc<dyn SnapshotSource>,
    lyrics: Arc<LyricsService>,
    config: EngineConfig,
}

impl SyncEngine {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        lyrics: Arc<LyricsService>,
        config: EngineConfig,
    ) -> Self {
        Self {
            source,
            lyrics,
            config,
        }
    }

    /// Spawn the engine task. It runs until `cancel` fires or the returned
    /// stream is dropped; the channel closes when the task ends.
    ///
    /// The first poll goes out immediately and seeds the playback position.
    pub fn start(&self, cancel: CancellationToken) -> LyricStream {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let (state_tx, state_rx) = watch::channel(EngineState::Idle);

        let run = Run {
            source: Arc::clone(&self.source),
            lyrics: Arc::clone(&self.lyrics),
            poll_interval: self.config.poll_interval,
            tx,
            state: state_tx,
            cancel: cancel.clone(),
            title: None,
            lyric_set: LyricsState::Pending,
            waiting: false,
            anchor_at: Instant::now(),
            anchor_progress_ms: 0,
            playing: true,
            last_emitted: Emitted::Nothing,
            deadline: None,
            dirty: false,
        };

        LyricStream {
            rx,
            state: state_rx,
            cancel,
            task: tokio::spawn(run.drive()),
        }
    }
}

/// Consumer side of a running engine.
pub struct LyricStream {
    rx: mpsc::Receiver<LyricUpdate>,
    state: watch::Receiver<EngineState>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl LyricStream {
    /// Next update, or `None` once the engine has stopped.
    pub async fn next(&mut self) -> Option<LyricUpdate> {
        self.rx.recv().await
    }

    pub fn state(&self) -> EngineState {
        *self.state.borrow()
    }

    /// Ask the engine to stop. Safe to call more than once.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancel, drain what is still buffered and wait for the task to exit.
    /// Returns how many updates were drained.
    pub async fn shutdown(mut self) -> usize {
        self.cancel();
        let mut drained = 0;
        while self.rx.recv().await.is_some() {
            drained += 1;
        }
        if let Err(e) = (&mut self.task).await {
            tracing::warn!(error = %e, "lyric sync task ended abnormally");
        }
        drained
    }
}

/// One finished poll, stamped with when the reply arrived.
struct Polled {
    at: Instant,
    result: Result<Option<PlaybackSnapshot>, PlaybackError>,
}

/// Polls the source on its own task so a slow request never holds up the
/// line timer. Replies are handed over one at a time.
async fn poll_loop(
    source: Arc<dyn SnapshotSource>,
    poll_interval: Duration,
    tx: mpsc::Sender<Polled>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            r = source.current_playback() => r,
        };
        let polled = Polled {
            at: Instant::now(),
            result,
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            sent = tx.send(polled) => if sent.is_err() {
                break;
            },
        }
    }
}

enum LyricsState {
    /// No fetch result for the current track yet.
    Pending,
    Ready(Arc<LyricSet>),
    /// Fetch failed; the error was already reported.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emitted {
    Nothing,
    NoLyrics,
    Line(usize),
}

/// State owned by the engine task. All mutation happens on this one task.
struct Run {
    source: Arc<dyn SnapshotSource>,
    lyrics: Arc<LyricsService>,
    poll_interval: Duration,
    tx: mpsc::Sender<LyricUpdate>,
    state: watch::Sender<EngineState>,
    cancel: CancellationToken,

    title: Option<String>,
    lyric_set: LyricsState,
    waiting: bool,
    /// When the last snapshot was taken and the progress it reported.
    anchor_at: Instant,
    anchor_progress_ms: u64,
    playing: bool,

    last_emitted: Emitted,
    /// Start of the next line, if one is coming while playing.
    deadline: Option<Instant>,
    dirty: bool,
}

impl Run {
    async fn drive(mut self) {
        let cancel = self.cancel.clone();
        let tx = self.tx.clone();
        let (poll_tx, mut polls) = mpsc::channel(1);
        let poller = tokio::spawn(poll_loop(
            Arc::clone(&self.source),
            self.poll_interval,
            poll_tx,
            cancel.clone(),
        ));
        let line_timer = tokio::time::sleep(Duration::ZERO);
        tokio::pin!(line_timer);

        tracing::info!(poll_ms = self.poll_interval.as_millis() as u64, "lyric sync started");
        self.set_state(EngineState::Polling);

        loop {
            if self.dirty {
                self.dirty = false;
                if self.render().await.is_break() {
                    break;
                }
                if let Some(deadline) = self.deadline {
                    line_timer.as_mut().reset(deadline);
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tx.closed() => {
                    tracing::debug!("lyric stream receiver dropped");
                    break;
                }
                _ = &mut line_timer, if self.deadline.is_some() => {
                    self.deadline = None;
                    self.dirty = true;
                }
                polled = polls.recv() => match polled {
                    Some(polled) => {
                        if self.on_polled(polled).await.is_break() {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }

        poller.abort();
        self.set_state(EngineState::Terminated);
        drop(tx);
        tracing::info!("lyric sync stopped");
    }

    async fn on_polled(&mut self, polled: Polled) -> ControlFlow<()> {
        let snapshot = match polled.result {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return self.enter_waiting().await,
            Err(e) => {
                tracing::warn!(error = %e, "playback poll failed");
                self.set_state(EngineState::Error);
                return self
                    .emit(LyricUpdate::error(format!("Error getting track: {e}")))
                    .await;
            }
        };
        self.waiting = false;

        if self.title.as_deref() != Some(snapshot.title.as_str()) {
            tracing::info!(title = %snapshot.title, artist = %snapshot.artist, "track changed");
            self.title = Some(snapshot.title.clone());
            self.lyric_set = LyricsState::Pending;
            self.last_emitted = Emitted::Nothing;
            self.deadline = None;

            let fetched = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return ControlFlow::Break(()),
                r = self.lyrics.get_lyrics(&snapshot.artist, &snapshot.title, &snapshot.album) => r,
            };

            match fetched {
                Ok(set) => self.lyric_set = LyricsState::Ready(set),
                Err(e) => {
                    tracing::warn!(error = %e, title = %snapshot.title, "lyrics unavailable");
                    self.lyric_set = LyricsState::Failed;
                    self.set_state(EngineState::Error);
                    self.emit(LyricUpdate::error(format!("Error getting lyrics: {e}")))
                        .await?;
                }
            }
        }

        self.anchor_at = polled.at;
        self.anchor_progress_ms = snapshot.progress_ms;
        self.playing = snapshot.is_playing;
        self.dirty = true;
        ControlFlow::Continue(())
    }

    async fn enter_waiting(&mut self) -> ControlFlow<()> {
        if self.waiting {
            return ControlFlow::Continue(());
        }
        tracing::info!("no track playing");
        self.waiting = true;
        self.title = None;
        self.lyric_set = LyricsState::Pending;
        self.last_emitted = Emitted::Nothing;
        self.deadline = None;
        self.set_state(EngineState::Polling);
        self.emit(LyricUpdate::waiting()).await
    }

    async fn render(&mut self) -> ControlFlow<()> {
        if self.title.is_none() {
            return ControlFlow::Continue(());
        }
        let set = match &self.lyric_set {
            LyricsState::Ready(set) => Arc::clone(set),
            LyricsState::Pending | LyricsState::Failed => return ControlFlow::Continue(()),
        };

        self.set_state(EngineState::Streaming);

        let progress_ms = self.progress_now_ms();
        let Some(index) = active_line_index(&set.lines, progress_ms) else {
            if self.last_emitted != Emitted::NoLyrics {
                self.last_emitted = Emitted::NoLyrics;
                let text = if set.instrumental {
                    "Instrumental track."
                } else {
                    "No lyrics to display."
                };
                return self.emit(LyricUpdate::notice(Some(set), text)).await;
            }
            return ControlFlow::Continue(());
        };

        if self.last_emitted != Emitted::Line(index) {
            tracing::debug!(index, progress_ms, "active line changed");
            self.last_emitted = Emitted::Line(index);
            self.emit(LyricUpdate::line(Arc::clone(&set), index)).await?;
        }

        self.deadline = match set.lines.get(index + 1) {
            Some(next) if self.playing => Some(self.instant_at(next.start_ms)),
            _ => None,
        };
        ControlFlow::Continue(())
    }

    /// Playback position now, projected from the last snapshot while playing.
    fn progress_now_ms(&self) -> u64 {
        if !self.playing {
            return self.anchor_progress_ms;
        }
        self.anchor_progress_ms + self.anchor_at.elapsed().as_millis() as u64
    }

    /// Wall-clock instant at which playback reaches `position_ms`.
    fn instant_at(&self, position_ms: u64) -> Instant {
        match position_ms.checked_sub(self.anchor_progress_ms) {
            Some(ahead) => self.anchor_at + Duration::from_millis(ahead),
            None => Instant::now(),
        }
    }

    async fn emit(&self, update: LyricUpdate) -> ControlFlow<()> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => ControlFlow::Break(()),
            sent = self.tx.send(update) => match sent {
                Ok(()) => ControlFlow::Continue(()),
                Err(_) => {
                    tracing::debug!("lyric stream receiver dropped");
                    ControlFlow::Break(())
                }
            },
        }
    }

    fn set_state(&self, next: EngineState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                tracing::debug!(from = ?*current, to = ?next, "engine state");
                *current = next;
                true
            }
        });
    }
}
