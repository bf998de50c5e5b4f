pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::app::Result;
use crate::config::Config;
use crate::view::{Dispatch, FavoriteOutcome, FormField, NodeId, Region, ViewSync};

use self::app::{PendingDelete, TuiApp};
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub async fn run(sync: ViewSync, config: Arc<Config>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, sync, config).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(terminal: &mut Tui, mut sync: ViewSync, config: Arc<Config>) -> Result<()> {
    let mut tui_app = TuiApp::new();
    let event_handler = EventHandler::new(Duration::from_millis(100));
    let (tx, mut rx) = mpsc::unbounded_channel::<FavoriteOutcome>();

    sync.navigate(Region::AllStories)?;

    loop {
        while let Ok(outcome) = rx.try_recv() {
            apply_outcome(&mut tui_app, &mut sync, outcome);
        }

        terminal.draw(|frame| layout::render(frame, &mut tui_app, &sync))?;

        let key = match event_handler.next()? {
            AppEvent::Key(key) => key,
            AppEvent::Tick => continue,
        };

        if let Some(pending) = tui_app.pending_delete.take() {
            confirm_delete(&mut tui_app, &mut sync, pending, key).await;
            continue;
        }

        if tui_app.form.is_some() {
            handle_form_key(&mut tui_app, &mut sync, key).await;
            continue;
        }

        tui_app.clear_status();
        match config.keybindings.get_action(&key) {
            Action::Quit => {
                tui_app.should_quit = true;
            }
            Action::MoveUp => {
                tui_app.move_up();
            }
            Action::MoveDown => {
                let len = sync.document().entries(tui_app.tab).len();
                tui_app.move_down(len);
            }
            Action::NextTab => {
                let tab = tui_app.next_tab();
                switch_tab(&mut tui_app, &mut sync, tab);
            }
            Action::PrevTab => {
                let tab = tui_app.prev_tab();
                switch_tab(&mut tui_app, &mut sync, tab);
            }
            Action::ToggleFavorite => {
                let Some(star) = selected_control(&tui_app, &sync, "fa-star") else {
                    let hint = if sync.user().is_none() {
                        "Log in to favorite stories"
                    } else {
                        "No story selected"
                    };
                    tui_app.set_status(hint.to_string());
                    continue;
                };
                match sync.dispatch_click(star) {
                    Ok(Dispatch::Favorite(request)) => {
                        tui_app.in_flight += 1;
                        let api = sync.api();
                        let tx = tx.clone();
                        tokio::spawn(async move {
                            let outcome = request.send(api).await;
                            // The loop only stops listening when quitting.
                            let _ = tx.send(outcome);
                        });
                    }
                    Ok(Dispatch::Ignored) => {
                        tui_app.set_status("Still saving the last change".to_string());
                    }
                    Ok(_) => {}
                    Err(e) => tui_app.set_status(format!("Error: {}", e)),
                }
            }
            Action::DeleteStory => {
                let Some(trash) = selected_control(&tui_app, &sync, "fa-trash-alt") else {
                    tui_app.set_status("Only your own stories can be deleted".to_string());
                    continue;
                };
                match sync.dispatch_click(trash) {
                    Ok(Dispatch::Delete { story_id }) => {
                        let title = sync
                            .state()
                            .find_story(&story_id)
                            .map(|s| s.title.clone())
                            .unwrap_or_else(|| story_id.clone());
                        tui_app.pending_delete = Some(PendingDelete { story_id, title });
                    }
                    Ok(_) => {}
                    Err(e) => tui_app.set_status(format!("Error: {}", e)),
                }
            }
            Action::NewStory => match sync.open_submit_form() {
                Ok(()) => tui_app.open_form(),
                Err(e) => tui_app.set_status(format!("Error: {}", e)),
            },
            Action::OpenInBrowser => {
                let url = selected_node(&tui_app, &sync)
                    .and_then(|node| sync.story_for(node))
                    .map(|story| story.url.clone());
                if let Some(url) = url {
                    if let Err(e) = open::that(&url) {
                        tui_app.set_status(format!("Failed to open browser: {}", e));
                    }
                }
            }
            Action::Refresh => {
                tui_app.is_refreshing = true;
                terminal.draw(|frame| layout::render(frame, &mut tui_app, &sync))?;

                let result = sync.refresh().await;
                tui_app.is_refreshing = false;
                match result {
                    Ok(()) => {
                        let len = sync.document().entries(tui_app.tab).len();
                        tui_app.clamp_cursor(len);
                        tui_app.set_status(format!(
                            "Refreshed: {} stories",
                            sync.state().stories.len()
                        ));
                    }
                    Err(e) => tui_app.set_status(format!("Refresh failed: {}", e)),
                }
            }
            Action::None => {}
        }

        if tui_app.should_quit {
            break;
        }
    }

    Ok(())
}

fn selected_node(tui_app: &TuiApp, sync: &ViewSync) -> Option<NodeId> {
    sync.document()
        .entries(tui_app.tab)
        .get(tui_app.cursor())
        .copied()
}

/// The control with `class` inside the selected list item.
fn selected_control(tui_app: &TuiApp, sync: &ViewSync, class: &str) -> Option<NodeId> {
    let node = selected_node(tui_app, sync)?;
    sync.document().find_class(node, class)
}

fn switch_tab(tui_app: &mut TuiApp, sync: &mut ViewSync, tab: Region) {
    match sync.navigate(tab) {
        Ok(()) => {
            tui_app.select_tab(tab);
            let len = sync.document().entries(tab).len();
            tui_app.clamp_cursor(len);
        }
        Err(e) => tui_app.set_status(format!("{}", e)),
    }
}

fn apply_outcome(tui_app: &mut TuiApp, sync: &mut ViewSync, outcome: FavoriteOutcome) {
    tui_app.in_flight = tui_app.in_flight.saturating_sub(1);
    let title = outcome.story.title.clone();
    let favorite = outcome.favorite;

    match sync.finish_favorite(outcome) {
        Ok(()) => {
            let verb = if favorite { "Favorited" } else { "Unfavorited" };
            tui_app.set_status(format!("{}: {}", verb, title));
        }
        Err(e) => tui_app.set_status(format!("Could not update \"{}\": {}", title, e)),
    }

    if tui_app.tab == Region::Favorites {
        sync.put_favorites_on_page();
        let len = sync.document().entries(Region::Favorites).len();
        tui_app.clamp_cursor(len);
    }
}

async fn confirm_delete(
    tui_app: &mut TuiApp,
    sync: &mut ViewSync,
    pending: PendingDelete,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            match sync.delete_story(&pending.story_id).await {
                Ok(()) => {
                    let len = sync.document().entries(tui_app.tab).len();
                    tui_app.clamp_cursor(len);
                    tui_app.set_status(format!("Deleted story: {}", pending.title));
                }
                Err(e) => tui_app.set_status(format!("Delete failed: {}", e)),
            }
        }
        _ => {
            tui_app.set_status("Delete cancelled".to_string());
        }
    }
}

async fn handle_form_key(tui_app: &mut TuiApp, sync: &mut ViewSync, key: KeyEvent) {
    let Some(field) = tui_app.form else {
        return;
    };

    match key.code {
        KeyCode::Esc => {
            sync.close_submit_form();
            tui_app.close_form();
            tui_app.set_status("Submission cancelled".to_string());
        }
        KeyCode::Tab | KeyCode::Down => tui_app.focus_next_field(),
        KeyCode::Enter if field != FormField::Url => {
            tui_app.focus_next_field();
        }
        KeyCode::Enter => match sync.submit_story().await {
            Ok(story) => {
                tui_app.close_form();
                switch_tab(tui_app, sync, Region::AllStories);
                tui_app.select_first();
                tui_app.set_status(format!("Submitted: {}", story.title));
            }
            Err(e) => tui_app.set_status(format!("Error: {}", e)),
        },
        KeyCode::Backspace => {
            let mut value = sync.document().value(field).to_string();
            value.pop();
            sync.document_mut().set_value(field, &value);
        }
        KeyCode::Char(c) => {
            let mut value = sync.document().value(field).to_string();
            value.push(c);
            sync.document_mut().set_value(field, &value);
        }
        _ => {}
    }
}
