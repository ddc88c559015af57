use std::sync::Arc;

use crate::capability::{CapabilityRegistry, ComponentSet, Page, PageAction, Widget};
use crate::dashboard::{Dashboard, ExitReason, MAX_FRAME_FAILURES, MESSAGE_TICKS, ScriptedEvents, SourceEvent};
use crate::render::{
    CellGrid, ColorRole, Direction, DrawContext, InputEvent, KeyCode, MemoryBackend, Rect, RenderError, Theme,
};

struct Counter {
    name: &'static str,
    count: u32,
}

impl Widget for Counter {
    fn draw(&self, ctx: &mut DrawContext<'_>, area: Rect) -> Result<(), RenderError> {
        let style = ctx.style(crate::render::ColorRole::Text);
        ctx.print(area.x, area.y, &format!("{}: {}", self.name, self.count), style);
        Ok(())
    }

    fn handle_input(&mut self, event: &InputEvent) -> bool {
        if event.code() == Some(KeyCode::Up) {
            self.count += 1;
            return true;
        }
        false
    }

    fn tick(&mut self) -> bool {
        self.count += 10;
        true
    }
}

struct Exploding;

impl Widget for Exploding {
    fn draw(&self, _ctx: &mut DrawContext<'_>, _area: Rect) -> Result<(), RenderError> {
        panic!("kaboom")
    }
}

struct About;

impl Page for About {
    fn title(&self) -> &str {
        "About"
    }

    fn draw(&self, ctx: &mut DrawContext<'_>, area: Rect) -> Result<(), RenderError> {
        let style = ctx.style(crate::render::ColorRole::Text);
        ctx.print(area.x, area.y, "about page", style);
        Ok(())
    }

    fn handle_input(&mut self, event: &InputEvent) -> Option<PageAction> {
        match event.code() {
            Some(KeyCode::Char('b')) => Some(PageAction::Back),
            Some(KeyCode::Char('x')) => Some(PageAction::Exit),
            _ => None,
        }
    }
}

/// Every key asks for a page nobody registered.
struct Lost;

impl Page for Lost {
    fn title(&self) -> &str {
        "Lost"
    }

    fn draw(&self, _ctx: &mut DrawContext<'_>, _area: Rect) -> Result<(), RenderError> {
        Ok(())
    }

    fn handle_input(&mut self, _event: &InputEvent) -> Option<PageAction> {
        Some(PageAction::Open("missing".to_string()))
    }
}

fn capabilities(set: ComponentSet) -> Arc<CapabilityRegistry> {
    let registry = Arc::new(CapabilityRegistry::new());
    for component in set {
        registry.insert("test", component).unwrap();
    }
    registry
}

fn counters() -> Arc<CapabilityRegistry> {
    capabilities(
        ComponentSet::new()
            .widget("alpha", || Counter { name: "alpha", count: 0 })
            .widget("beta", || Counter { name: "beta", count: 0 })
            .page("about", || About),
    )
}

fn key(code: KeyCode) -> SourceEvent {
    SourceEvent::Input(InputEvent::key(code))
}

#[test]
fn test_build_stacks_widgets_and_focuses_first() {
    let dashboard = Dashboard::build(counters(), Theme::default_theme(), (30, 8));
    let nodes = dashboard.widget_nodes().to_vec();

    assert_eq!(nodes.len(), 2);
    assert_eq!(dashboard.tree().label(nodes[0]), Some("alpha"));
    assert_eq!(dashboard.tree().area(nodes[0]), Some(Rect::new(1, 1, 28, 3)));
    assert_eq!(dashboard.tree().area(nodes[1]), Some(Rect::new(1, 4, 28, 2)));
    assert_eq!(dashboard.tree().focused(), Some(nodes[0]));
}

#[test]
fn test_input_goes_to_focused_widget() {
    let mut dashboard = Dashboard::build(counters(), Theme::default_theme(), (30, 8));
    let mut grid = MemoryBackend::new(30, 8);
    let mut events = ScriptedEvents::new(vec![key(KeyCode::Up), key(KeyCode::Tab), key(KeyCode::Up), key(KeyCode::Up)]);

    let summary = dashboard.run(&mut events, &mut grid).unwrap();

    assert_eq!(summary.reason, ExitReason::Closed);
    assert_eq!(summary.events, 5);
    assert!(grid.row_text(1).contains("alpha: 1"));
    assert!(grid.row_text(4).contains("beta: 2"));
    assert!(grid.row_text(6).contains("q quit"));
}

#[test]
fn test_quit_keys() {
    for events in [
        ScriptedEvents::keys("q"),
        ScriptedEvents::new(vec![key(KeyCode::Esc)]),
        ScriptedEvents::new(vec![SourceEvent::Input(InputEvent::ctrl('c'))]),
    ] {
        let mut events = events;
        let mut dashboard = Dashboard::build(counters(), Theme::default_theme(), (30, 8));
        let summary = dashboard.run(&mut events, &mut MemoryBackend::new(30, 8)).unwrap();
        assert_eq!(summary.reason, ExitReason::Quit);
        assert_eq!(summary.events, 1);
        assert_eq!(summary.frames, 1);
    }
}

#[test]
fn test_consumed_input_redraws_only_that_widget() {
    let mut dashboard = Dashboard::build(counters(), Theme::default_theme(), (30, 8));
    let mut grid = MemoryBackend::new(30, 8);
    let first = dashboard.render(&mut grid).unwrap();
    assert!(first.full_redraw);
    assert_eq!(first.nodes_rendered, 3);

    let idle = dashboard.render(&mut grid).unwrap();
    assert_eq!(idle.nodes_rendered, 0);
    assert_eq!(idle.cells_written, 0);

    dashboard.handle_input(&InputEvent::key(KeyCode::Up)).unwrap();
    let report = dashboard.render(&mut grid).unwrap();

    assert_eq!(report.nodes_rendered, 1);
    // "alpha: 0" -> "alpha: 1"
    assert_eq!(report.cells_written, 1);
}

#[test]
fn test_tick_redraws_widgets_that_changed() {
    let mut dashboard = Dashboard::build(counters(), Theme::default_theme(), (30, 8));
    let mut grid = MemoryBackend::new(30, 8);
    let mut events = ScriptedEvents::new(vec![SourceEvent::Tick]);

    dashboard.run(&mut events, &mut grid).unwrap();

    assert!(grid.row_text(1).contains("alpha: 10"));
    assert!(grid.row_text(4).contains("beta: 10"));
}

#[test]
fn test_resize_relays_out_and_redraws() {
    let mut dashboard = Dashboard::build(counters(), Theme::default_theme(), (30, 8));
    let mut grid = MemoryBackend::new(30, 8);
    dashboard.render(&mut grid).unwrap();

    grid.resize(40, 12);
    dashboard.resize(40, 12).unwrap();
    let report = dashboard.render(&mut grid).unwrap();

    assert!(report.full_redraw);
    assert_eq!(dashboard.engine().size(), (40, 12));
    let nodes = dashboard.widget_nodes().to_vec();
    assert_eq!(dashboard.tree().area(nodes[0]).map(|a| a.width), Some(38));
    assert!(grid.row_text(0).ends_with('┐'));
    assert_eq!(grid.row_text(0).chars().count(), 40);
}

#[test]
fn test_failing_widget_gets_placeholder() {
    let registry = capabilities(
        ComponentSet::new()
            .widget("alpha", || Counter { name: "alpha", count: 0 })
            .widget("broken", || Exploding),
    );
    let mut dashboard = Dashboard::build(registry, Theme::default_theme(), (40, 8));
    let mut grid = MemoryBackend::new(40, 8);

    let report = dashboard.render(&mut grid).unwrap();

    assert_eq!(report.failed_nodes.len(), 1);
    assert!(grid.row_text(1).contains("alpha: 0"));
    assert!(grid.row_text(4).contains("! broken: panicked: kaboom"));
}

#[test]
fn test_empty_registry_shows_message() {
    let mut dashboard = Dashboard::build(capabilities(ComponentSet::new()), Theme::default_theme(), (30, 6));
    let mut grid = MemoryBackend::new(30, 6);

    dashboard.render(&mut grid).unwrap();

    assert!(dashboard.widget_nodes().is_empty());
    assert!(grid.row_text(1).contains("No widgets registered"));
}

#[test]
fn test_page_navigation() {
    let mut dashboard = Dashboard::build(counters(), Theme::default_theme(), (30, 8));
    let mut grid = MemoryBackend::new(30, 8);

    dashboard.open_page("about").unwrap();
    dashboard.render(&mut grid).unwrap();
    assert_eq!(dashboard.current_page(), Some("about"));
    assert!(grid.row_text(0).contains("Hyper - About"));
    assert!(grid.row_text(1).contains("about page"));

    // q inside a page goes back instead of quitting
    assert_eq!(dashboard.handle_input(&InputEvent::char('q')).unwrap(), None);
    assert_eq!(dashboard.current_page(), None);

    dashboard.open_page("about").unwrap();
    assert_eq!(dashboard.handle_input(&InputEvent::char('b')).unwrap(), None);
    assert_eq!(dashboard.current_page(), None);
    assert_eq!(dashboard.widget_nodes().len(), 2);

    dashboard.open_page("about").unwrap();
    assert_eq!(dashboard.handle_input(&InputEvent::char('x')).unwrap(), Some(ExitReason::PageExit));
}

#[test]
fn test_unknown_page() {
    let mut dashboard = Dashboard::build(counters(), Theme::default_theme(), (30, 8));
    assert!(dashboard.open_page("nowhere").is_err());
    assert_eq!(dashboard.current_page(), None);
}

#[test]
fn test_frame_failures_are_tolerated_then_fatal() {
    let mut dashboard = Dashboard::build(counters(), Theme::default_theme(), (30, 8));
    let mut grid = MemoryBackend::new(30, 8);
    grid.fail_after(0);

    for _ in 0..MAX_FRAME_FAILURES {
        assert!(dashboard.render(&mut grid).is_ok());
    }
    assert!(dashboard.render(&mut grid).is_err());

    grid.clear_failure();
    let report = dashboard.render(&mut grid).unwrap();
    assert!(report.full_redraw);
    assert!(grid.row_text(1).contains("alpha: 0"));
}

#[test]
fn test_opening_a_missing_page_keeps_the_loop_running() {
    let registry = capabilities(ComponentSet::new().page("lost", || Lost));
    let mut dashboard = Dashboard::build(registry, Theme::default_theme(), (40, 8));
    let mut grid = MemoryBackend::new(40, 8);
    dashboard.open_page("lost").unwrap();

    let summary = dashboard.run(&mut ScriptedEvents::keys("a"), &mut grid).unwrap();

    assert_eq!(summary.reason, ExitReason::Closed);
    assert_eq!(summary.frames, 2);
    assert_eq!(dashboard.current_page(), Some("lost"));
    assert!(dashboard.status_message().is_some_and(|m| m.contains("Unknown page: missing")));
    assert!(grid.row_text(6).contains("Unknown page: missing"));
    assert!(grid.row_text(0).contains("Hyper - Lost"));
}

#[test]
fn test_status_message_expires_after_ticks() {
    let mut dashboard = Dashboard::build(counters(), Theme::default_theme(), (30, 8));
    let mut grid = MemoryBackend::new(30, 8);

    dashboard.notify("saved", ColorRole::Info);
    dashboard.render(&mut grid).unwrap();
    assert!(grid.row_text(6).contains("saved"));

    for _ in 1..MESSAGE_TICKS {
        dashboard.tick();
    }
    assert_eq!(dashboard.status_message().as_deref(), Some("saved"));
    dashboard.tick();
    assert_eq!(dashboard.status_message(), None);

    dashboard.render(&mut grid).unwrap();
    assert!(grid.row_text(6).contains("q quit"));
}

#[test]
fn test_menu_keys_open_pages() {
    let mut dashboard = Dashboard::build(counters(), Theme::default_theme(), (30, 8));
    let mut grid = MemoryBackend::new(30, 8);
    dashboard.render(&mut grid).unwrap();
    assert!(grid.row_text(0).contains(" 1 about "));
    assert!(grid.row_text(0).ends_with('┐'));

    // nothing on key 2
    assert_eq!(dashboard.handle_input(&InputEvent::char('2')).unwrap(), None);
    assert_eq!(dashboard.current_page(), None);

    assert_eq!(dashboard.handle_input(&InputEvent::char('1')).unwrap(), None);
    assert_eq!(dashboard.current_page(), Some("about"));
}

#[test]
fn test_horizontal_layout_places_widgets_side_by_side() {
    let mut dashboard =
        Dashboard::build(counters(), Theme::default_theme(), (30, 8)).with_layout(Direction::Horizontal);
    let mut grid = MemoryBackend::new(30, 8);
    let nodes = dashboard.widget_nodes().to_vec();

    assert_eq!(dashboard.tree().area(nodes[0]), Some(Rect::new(1, 1, 14, 5)));
    assert_eq!(dashboard.tree().area(nodes[1]), Some(Rect::new(15, 1, 14, 5)));
    assert_eq!(dashboard.tree().focused(), Some(nodes[0]));

    dashboard.render(&mut grid).unwrap();
    assert!(grid.row_text(1).contains("alpha: 0"));
    assert!(grid.row_text(1).contains("beta: 0"));

    grid.resize(40, 8);
    dashboard.resize(40, 8).unwrap();
    assert_eq!(dashboard.tree().area(nodes[1]), Some(Rect::new(20, 1, 19, 5)));
}
