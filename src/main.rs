use anyhow::Result;

mod app;
mod backend;
mod config;
mod handler;
mod timestamp;
mod tui;
mod ui;
mod ws;

use app::App;
use tui::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    tui::install_panic_hook();

    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(events.sender());
    let socket = ws::StatusSocket::connect(app.backend.base_url());

    let result = run(&mut terminal, &mut events, &mut app).await;

    socket.shutdown();
    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, events: &mut EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }

        // Reap the chat query once its task settles; ticks arrive often
        // enough that the answer shows up promptly.
        if app.query_task.as_ref().is_some_and(|task| task.is_finished()) {
            if let Some(task) = app.query_task.take() {
                let result = match task.await {
                    Ok(result) => result,
                    Err(err) => Err(err.into()),
                };
                app.finish_query(result);
            }
        }
    }

    Ok(())
}
