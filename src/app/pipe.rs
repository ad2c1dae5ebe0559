use super::{AppContext, mirror_text};
use crate::sync::LyricUpdate;
use anyhow::Context;
use std::io::{self, Write};
use tokio_util::sync::CancellationToken;

/// Stream lyrics to stdout, rewriting a single terminal line in place.
pub async fn run(ctx: &AppContext, cancel: CancellationToken) -> anyhow::Result<()> {
    let mut stream = ctx.engine().start(cancel);
    let mut out = io::stdout();

    while let Some(update) = stream.next().await {
        write_update(&mut out, &update).context("write to stdout")?;
        if let Some(text) = mirror_text(&update)
            && let Some(warning) = ctx.mirror.publish(text).await
        {
            eprintln!("\n{warning}");
        }
    }

    writeln!(out).context("write to stdout")?;
    Ok(())
}

fn write_update(out: &mut impl Write, update: &LyricUpdate) -> io::Result<()> {
    let text = if update.is_error {
        &update.error_message
    } else {
        &update.text
    };
    write!(out, "\r\x1b[K{text}")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_rewrites_line() {
        let mut buf = Vec::new();
        write_update(&mut buf, &LyricUpdate::notice(None, "hello")).unwrap();
        assert_eq!(buf, b"\r\x1b[Khello");
    }

    #[test]
    fn test_error_prints_message() {
        let mut buf = Vec::new();
        write_update(&mut buf, &LyricUpdate::error("Error getting track: 401")).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "\r\x1b[KError getting track: 401");
    }

    #[test]
    fn test_mirror_skips_errors_and_blank() {
        assert_eq!(mirror_text(&LyricUpdate::error("x")), None);
        assert_eq!(mirror_text(&LyricUpdate::notice(None, "   ")), None);
        assert_eq!(mirror_text(&LyricUpdate::waiting()), Some("Waiting for a track to play..."));
    }
}
