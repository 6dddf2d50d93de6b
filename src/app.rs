//! Application setup and window creation.

use std::time::Duration;

use gpui::{App, AsyncApp, Bounds, WeakEntity, WindowBounds, WindowOptions, prelude::*, px, size};
use gpui_component::Root;
use tracing::{error, info};

use crate::models::Session;
use crate::settings::Settings;
use crate::ui::views::ChessBoardView;

const POLL_INTERVAL: Duration = Duration::from_millis(16); // ~60fps

/// Initialize and run the chess application
pub fn run(cx: &mut App, settings: Settings) {
    gpui_component::init(cx);

    let session = cx.new(|_| Session::new(&settings));
    info!(mode = ?settings.mode, tier = ?settings.tier, "session started");

    let weak = session.downgrade();
    cx.spawn(async move |cx: &mut AsyncApp| drive_session(weak, cx).await)
        .detach();

    let theme = settings.theme;
    let bounds = Bounds::centered(None, size(px(1000.0), px(680.0)), cx);
    let opened = cx.open_window(
        WindowOptions {
            window_bounds: Some(WindowBounds::Windowed(bounds)),
            ..Default::default()
        },
        |window, cx| {
            let view = cx.new(|cx| ChessBoardView::new(session, theme, cx));
            cx.new(|cx| Root::new(view, window, cx))
        },
    );
    if let Err(e) = opened {
        error!(error = %e, "failed to open window");
        cx.quit();
    }
}

/// Feed engine events into the session and expire notifications until the
/// session is dropped
async fn drive_session(session: WeakEntity<Session>, cx: &mut AsyncApp) {
    loop {
        cx.background_executor().timer(POLL_INTERVAL).await;

        let updated = session.update(cx, |session, cx| {
            let played = session.pump_engine_events();
            let expired = session.expire_notifications();
            if played || expired {
                cx.notify();
            }
        });
        if updated.is_err() {
            break;
        }
    }
}
