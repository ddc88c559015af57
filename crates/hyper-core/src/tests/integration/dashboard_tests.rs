#![cfg(test)]

use std::path::Path;

use tempfile::tempdir;

use crate::capability::{ComponentSet, Page, PageAction};
use crate::container::ServiceContainer;
use crate::dashboard::{ExitReason, ScriptedEvents, SourceEvent};
use crate::kernel::Application;
use crate::plugin_system::{CatalogEntry, Plugin, PluginError};
use crate::render::{ColorRole, DrawContext, InputEvent, KeyCode, MemoryBackend, Rect, RenderError};
use crate::tests::integration::common::{catalog, install, journal, options, Fixture};

struct Help;

impl Page for Help {
    fn title(&self) -> &str {
        "Help"
    }

    fn draw(&self, ctx: &mut DrawContext<'_>, area: Rect) -> Result<(), RenderError> {
        let style = ctx.style(ColorRole::Info);
        ctx.print(area.x, area.y, "press x to leave", style);
        Ok(())
    }

    fn handle_input(&mut self, event: &InputEvent) -> Option<PageAction> {
        (event.code() == Some(KeyCode::Char('x'))).then_some(PageAction::Exit)
    }
}

struct HelpPlugin;

impl Plugin for HelpPlugin {
    fn name(&self) -> &str {
        "help"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn initialize(&mut self, _container: &ServiceContainer) -> Result<(), PluginError> {
        Ok(())
    }

    fn register(&self) -> ComponentSet {
        ComponentSet::new().page("help", || Help)
    }
}

async fn started(root: &Path) -> Application {
    install(root, "help", "help", None);
    install(root, "panels", "panels", None);
    let journal = journal();
    let panels = Fixture::new("panels", &journal).widget("cpu").widget("memory");
    let entries = vec![CatalogEntry::new("help", || HelpPlugin), panels.entry()];
    let mut app = Application::new(options(&[root]), catalog(entries)).unwrap();
    app.start().await.unwrap();
    app
}

#[tokio::test]
async fn test_plugin_widgets_render_and_react() {
    let root = tempdir().unwrap();
    let app = started(root.path()).await;
    let mut grid = MemoryBackend::new(32, 9);
    let mut events = ScriptedEvents::new(vec![
        SourceEvent::Tick,
        SourceEvent::Input(InputEvent::key(KeyCode::Tab)),
        SourceEvent::Input(InputEvent::key(KeyCode::Up)),
        SourceEvent::Input(InputEvent::char('q')),
        SourceEvent::Tick,
    ]);

    let summary = app.run_dashboard(&mut events, &mut grid, None).unwrap();

    assert_eq!(summary.reason, ExitReason::Quit);
    assert_eq!(summary.events, 4);
    assert_eq!(events.remaining(), 1);
    let screen: Vec<String> = (0..9).map(|y| grid.row_text(y)).collect();
    assert!(screen[0].starts_with("┌─ Hyper "));
    assert!(screen.iter().any(|row| row.contains("cpu 1")));
    assert!(screen.iter().any(|row| row.contains("memory 2")));
    assert!(screen[7].contains("q quit"));
    assert!(screen[8].starts_with('└'));
}

#[tokio::test]
async fn test_dashboard_is_incremental_after_first_frame() {
    let root = tempdir().unwrap();
    let app = started(root.path()).await;
    let mut grid = MemoryBackend::new(32, 9);
    let mut events = ScriptedEvents::new(vec![SourceEvent::Input(InputEvent::key(KeyCode::Up))]);

    let summary = app.run_dashboard(&mut events, &mut grid, None).unwrap();

    assert_eq!(summary.reason, ExitReason::Closed);
    assert_eq!(summary.frames, 2);
    // full first frame, then the single digit that changed
    assert_eq!(summary.cells_written, 32 * 9 + 1);
    assert_eq!(grid.writes() as u64, summary.cells_written);
}

#[tokio::test]
async fn test_start_on_page_and_exit_from_it() {
    let root = tempdir().unwrap();
    let app = started(root.path()).await;
    let mut grid = MemoryBackend::new(32, 9);

    let summary = app
        .run_dashboard(&mut ScriptedEvents::keys("ax"), &mut grid, Some("help"))
        .unwrap();

    assert_eq!(summary.reason, ExitReason::PageExit);
    assert!(grid.row_text(0).contains("Hyper - Help"));
    assert!(grid.row_text(1).contains("press x to leave"));
    assert!(grid.row_text(7).contains("Esc back"));
}

#[tokio::test]
async fn test_unknown_start_page_is_an_error() {
    let root = tempdir().unwrap();
    let app = started(root.path()).await;

    let result = app.run_dashboard(&mut ScriptedEvents::default(), &mut MemoryBackend::new(20, 5), Some("nope"));

    assert!(result.is_err());
}

#[tokio::test]
async fn test_resize_event_relays_out() {
    let root = tempdir().unwrap();
    let app = started(root.path()).await;
    let mut grid = MemoryBackend::new(32, 9);
    let mut events = ScriptedEvents::new(vec![SourceEvent::Resize(32, 9), SourceEvent::Tick]);

    let summary = app.run_dashboard(&mut events, &mut grid, None).unwrap();

    assert_eq!(summary.reason, ExitReason::Closed);
    assert_eq!(summary.frames, 3);
    assert!((0..9).any(|y| grid.row_text(y).contains("cpu 1")));
}
