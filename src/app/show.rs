use super::actions::Action;
use super::events::InputEvent;
use super::state::ViewState;
use super::{AppContext, mirror_text};
use crate::input;
use crate::tui::{self, TerminalGuard};
use anyhow::Context;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Interactive lyric view. Quitting cancels the engine and drains the stream.
pub async fn run(ctx: &AppContext, cancel: CancellationToken) -> anyhow::Result<()> {
    let mut stream = ctx.engine().start(cancel.clone());

    let mut guard = TerminalGuard::enter().context("init terminal")?;
    let (tx, mut rx) = mpsc::channel::<InputEvent>(64);
    input::spawn_input_task(tx, cancel.clone());

    let mut state = ViewState::default();
    tui::draw(guard.terminal_mut(), &state)?;

    loop {
        tokio::select! {
            update = stream.next() => match update {
                Some(update) => {
                    if let Some(text) = mirror_text(&update)
                        && let Some(warning) = ctx.mirror.publish(text).await
                    {
                        state.mirror_warning = Some(warning);
                    }
                    state.apply(update);
                }
                None => break,
            },
            Some(ev) = rx.recv() => {
                if input::map_input_to_action(ev) == Some(Action::Quit) {
                    state.should_quit = true;
                }
            }
        }

        if state.should_quit {
            break;
        }
        tui::draw(guard.terminal_mut(), &state)?;
    }

    let drained = stream.shutdown().await;
    // Also stops the input thread.
    cancel.cancel();
    tracing::debug!(drained, "lyric view closed");
    Ok(())
}
