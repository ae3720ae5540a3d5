//! Terminal rendering of QR authentication challenges.
//!
//! Headless deployments have no UI to show a QR image, so the challenge is
//! rendered as Unicode half-block art straight into the service log, where
//! an operator can scan it from the terminal.

use qrcode::{Color, EcLevel, QrCode};

use wb_core::{SessionManager, SessionStatus};

/// Render a QR payload as compact terminal art.
///
/// Packs two rows of modules into one line of text using `▀`, `▄`, `█`, and
/// space, which halves the height of a naive one-module-per-line renderer.
pub fn render_terminal(payload: &str) -> anyhow::Result<String> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::L)?;

    let width = code.width();
    let colors: Vec<Color> = code.into_colors();
    let is_dark = |row: usize, col: usize| -> bool {
        if row < width && col < width {
            colors[row * width + col] == Color::Dark
        } else {
            false
        }
    };

    let mut out = String::new();
    let mut row = 0;
    while row < width {
        for col in 0..width {
            let top = is_dark(row, col);
            let bottom = if row + 1 < width {
                is_dark(row + 1, col)
            } else {
                false
            };
            out.push(match (top, bottom) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            });
        }
        out.push('\n');
        row += 2;
    }

    Ok(out)
}

/// Watch session transitions and print each fresh QR challenge to stderr.
///
/// The task lives for the whole process; it survives manager restarts
/// because it subscribes to the broadcast channel, not to one connection.
pub fn spawn_qr_logger(manager: SessionManager) {
    tokio::spawn(async move {
        let mut rx = manager.subscribe();
        let mut last: Option<String> = None;

        loop {
            let snapshot = match rx.recv().await {
                Ok(s) => s,
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(_) => break,
            };

            if snapshot.status != SessionStatus::QrReady {
                continue;
            }
            let Some(payload) = snapshot.qr_code else {
                continue;
            };
            if last.as_deref() == Some(payload.as_str()) {
                continue;
            }

            match render_terminal(&payload) {
                Ok(art) => {
                    tracing::info!("qr challenge ready, scan from the terminal below");
                    eprintln!("\n{art}");
                }
                Err(e) => tracing::warn!(error = %e, "qr render failed"),
            }
            last = Some(payload);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_half_height_art() {
        let art = render_terminal("wa-sim://pair/render-check").unwrap();
        let lines: Vec<&str> = art.lines().collect();
        assert!(!lines.is_empty());

        // Every line spans the full module width; height is packed 2:1.
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
        assert_eq!(lines.len(), (width + 1) / 2);

        let allowed = ['█', '▀', '▄', ' '];
        assert!(art
            .chars()
            .filter(|c| *c != '\n')
            .all(|c| allowed.contains(&c)));
    }

    #[test]
    fn distinct_payloads_render_distinct_art() {
        let a = render_terminal("wa-sim://pair/aaaa").unwrap();
        let b = render_terminal("wa-sim://pair/bbbb").unwrap();
        assert_ne!(a, b);
    }
}
