//! # Hyper Core Dashboard
//!
//! The interactive mode: every registered widget stacked in one framed
//! screen, or a single full-screen page. One loop reads an event, updates the
//! [`RenderTree`] and renders a single frame; nothing else touches the tree
//! while it runs.
//!
//! The frame's top border lists the registered pages; keys `1`-`9` open
//! them. Navigation failures are shown on the status line and never end the
//! loop.
pub mod events;
pub mod status;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crate::capability::{CapabilityRegistry, ComponentKind, Page, PageAction, Widget};
use crate::kernel::constants::APP_NAME;
use crate::kernel::error::{Error, Result};
use crate::render::layout::{split_footer, stack};
use crate::render::{
    CellGrid, ColorRole, Direction, DrawContext, FrameReport, InputDispatcher, InputEvent, KeyCode, NodeId,
    Rect, RenderEngine, RenderError, RenderTree, Theme,
};
use crate::utils::truncate;

pub use events::{EventSource, ScriptedEvents, SourceEvent, TerminalEvents};
pub use status::{StatusLine, MESSAGE_TICKS};

/// Consecutive failed frames tolerated before the loop gives up
pub const MAX_FRAME_FAILURES: u32 = 3;

/// How long the loop waits for input before ticking widgets
pub const DEFAULT_TICK_RATE: Duration = Duration::from_millis(250);

const ROOT_LABEL: &str = "dashboard";
const FOOTER_HELP: &str = "q quit | Tab next | Shift+Tab previous";
const PAGE_FOOTER_HELP: &str = "Esc back | Ctrl+C quit";

/// Pages reachable from the menu keys `1`-`9`
const MENU_KEYS: usize = 9;

/// Why the dashboard loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// A quit key was pressed
    Quit,
    /// A page asked to leave the dashboard
    PageExit,
    /// The event source ran dry
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub reason: ExitReason,
    pub events: u64,
    pub frames: u64,
    pub cells_written: u64,
}

type SharedStatus = Rc<RefCell<StatusLine>>;

/// Border, title, page menu and status line around the widgets.
struct DashboardFrame {
    title: String,
    menu: Vec<String>,
    status: SharedStatus,
    empty_message: Option<String>,
}

impl Widget for DashboardFrame {
    fn draw(&self, ctx: &mut DrawContext<'_>, area: Rect) -> std::result::Result<(), RenderError> {
        let border = ctx.style(ColorRole::Border);
        ctx.draw_box(area, border);
        if area.width > 4 {
            // keep the corner and one border cell free on the right
            let limit = area.right() - 2;
            let title = truncate(&format!(" {} ", self.title), usize::from(area.width - 4));
            let style = ctx.style(ColorRole::Accent);
            let x = area.x + 2 + ctx.print(area.x + 2, area.y, &title, style) + 1;
            if !self.menu.is_empty() && x < limit {
                let items: Vec<String> =
                    self.menu.iter().enumerate().map(|(i, name)| format!(" {} {} ", i + 1, name)).collect();
                let style = ctx.style(ColorRole::Secondary);
                ctx.print(x, area.y, &truncate(&items.join("─"), usize::from(limit - x)), style);
            }
        }
        let inner = area.inset(1);
        if inner.is_empty() {
            return Ok(());
        }
        let (body, footer) = split_footer(inner, 1);
        self.status.borrow().draw(ctx, footer);
        if let Some(message) = &self.empty_message {
            let text = ctx.style(ColorRole::Text);
            ctx.print(body.x, body.y, &truncate(message, usize::from(body.width)), text);
        }
        Ok(())
    }

    fn minimum_size(&self) -> (u16, u16) {
        (4, 3)
    }

    fn focusable(&self) -> bool {
        false
    }
}

type ActionSlot = Rc<RefCell<Option<PageAction>>>;

/// Hosts a page inside the render tree and parks its navigation requests
/// for the loop to pick up.
struct PageView {
    page: Box<dyn Page>,
    actions: ActionSlot,
}

impl Widget for PageView {
    fn draw(&self, ctx: &mut DrawContext<'_>, area: Rect) -> std::result::Result<(), RenderError> {
        self.page.draw(ctx, area)
    }

    fn handle_input(&mut self, event: &InputEvent) -> bool {
        match self.page.handle_input(event) {
            Some(action) => {
                *self.actions.borrow_mut() = Some(action);
                true
            }
            None => false,
        }
    }

    fn tick(&mut self) -> bool {
        self.page.refresh();
        true
    }
}

impl Drop for PageView {
    fn drop(&mut self) {
        self.page.on_exit();
    }
}

enum Mode {
    Widgets,
    Page { name: String, actions: ActionSlot },
}

/// Render loop over the widgets and pages in a [`CapabilityRegistry`].
pub struct Dashboard {
    capabilities: Arc<CapabilityRegistry>,
    engine: RenderEngine,
    tree: RenderTree,
    dispatcher: InputDispatcher,
    widgets: Vec<NodeId>,
    mode: Mode,
    layout: Direction,
    status: SharedStatus,
    tick_rate: Duration,
    consecutive_failures: u32,
}

impl Dashboard {
    /// One framed screen with every registered widget, in name order.
    pub fn build(capabilities: Arc<CapabilityRegistry>, theme: Theme, size: (u16, u16)) -> Self {
        let (width, height) = size;
        let area = Rect::new(0, 0, width, height);
        let status: SharedStatus = Rc::new(RefCell::new(StatusLine::new(FOOTER_HELP)));
        let tree = RenderTree::new(ROOT_LABEL, Box::new(Self::frame(&capabilities, &status, false)), area);
        let mut dashboard = Self {
            capabilities,
            engine: RenderEngine::new(width, height, theme),
            tree,
            dispatcher: InputDispatcher::new(),
            widgets: Vec::new(),
            mode: Mode::Widgets,
            layout: Direction::Vertical,
            status,
            tick_rate: DEFAULT_TICK_RATE,
            consecutive_failures: 0,
        };
        dashboard.show_widgets();
        dashboard
    }

    pub fn with_tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    /// Place widgets in rows (`Vertical`) or side by side (`Horizontal`).
    pub fn with_layout(mut self, layout: Direction) -> Self {
        self.layout = layout;
        if matches!(self.mode, Mode::Widgets) {
            self.show_widgets();
        }
        self
    }

    /// Message currently on the status line
    pub fn status_message(&self) -> Option<String> {
        self.status.borrow().message().map(str::to_string)
    }

    /// Put `text` on the status line for a few ticks.
    pub fn notify(&mut self, text: impl Into<String>, role: ColorRole) {
        self.status.borrow_mut().show(text, role);
        self.tree.mark_dirty(self.tree.root());
    }

    pub fn tree(&self) -> &RenderTree {
        &self.tree
    }

    pub fn engine(&self) -> &RenderEngine {
        &self.engine
    }

    /// Widget nodes in layout order
    pub fn widget_nodes(&self) -> &[NodeId] {
        &self.widgets
    }

    /// Name of the open page, if any
    pub fn current_page(&self) -> Option<&str> {
        match &self.mode {
            Mode::Page { name, .. } => Some(name.as_str()),
            Mode::Widgets => None,
        }
    }

    fn frame(capabilities: &CapabilityRegistry, status: &SharedStatus, page: bool) -> DashboardFrame {
        let empty_message = (!page && capabilities.names(ComponentKind::Widget).is_empty())
            .then(|| "No widgets registered".to_string());
        let menu = if page { Vec::new() } else { Self::menu(capabilities) };
        status.borrow_mut().set_help(if page { PAGE_FOOTER_HELP } else { FOOTER_HELP });
        DashboardFrame { title: APP_NAME.to_string(), menu, status: status.clone(), empty_message }
    }

    /// Pages bound to the menu keys, in name order
    fn menu(capabilities: &CapabilityRegistry) -> Vec<String> {
        let mut pages = capabilities.names(ComponentKind::Page);
        pages.truncate(MENU_KEYS);
        pages
    }

    /// Minimum extent of a widget along the layout direction
    fn minimum(&self, widget: &dyn Widget) -> u16 {
        let (width, height) = widget.minimum_size();
        match self.layout {
            Direction::Vertical => height,
            Direction::Horizontal => width,
        }
    }

    fn body_area(&self) -> Rect {
        let area = self.tree.area(self.tree.root()).unwrap_or_default();
        split_footer(area.inset(1), 1).0
    }

    /// Replace the root and its children with a fresh widget screen.
    fn show_widgets(&mut self) {
        let area = self.tree.area(self.tree.root()).unwrap_or_default();
        let frame = Self::frame(&self.capabilities, &self.status, false);
        self.tree = RenderTree::new(ROOT_LABEL, Box::new(frame), area);
        self.widgets.clear();
        self.mode = Mode::Widgets;

        let mut built: Vec<(String, Box<dyn Widget>)> = Vec::new();
        for name in self.capabilities.names(ComponentKind::Widget) {
            match self.capabilities.create_widget(&name) {
                Some(widget) => built.push((name, widget)),
                None => log::warn!("Widget '{}' disappeared before it could be built", name),
            }
        }
        let minimums: Vec<u16> = built.iter().map(|(_, w)| self.minimum(w.as_ref())).collect();
        let areas = stack(self.body_area(), self.layout, &minimums);
        let root = self.tree.root();
        for ((name, widget), rect) in built.into_iter().zip(areas) {
            match self.tree.add_child(root, name.clone(), widget, rect) {
                Ok(id) => self.widgets.push(id),
                Err(e) => log::warn!("Could not add widget '{}': {}", name, e),
            }
        }
        self.dispatcher.focus_next(&mut self.tree);
        self.engine.force_redraw();
        log::debug!("Dashboard showing {} widget(s)", self.widgets.len());
    }

    /// Switch to the named page.
    pub fn open_page(&mut self, name: &str) -> Result<()> {
        let mut page = self
            .capabilities
            .create_page(name)
            .ok_or_else(|| Error::Other(format!("Unknown page: {}", name)))?;
        page.on_enter();
        let area = self.tree.area(self.tree.root()).unwrap_or_default();
        let mut frame = Self::frame(&self.capabilities, &self.status, true);
        frame.title = format!("{} - {}", APP_NAME, page.title());
        self.tree = RenderTree::new(ROOT_LABEL, Box::new(frame), area);
        self.widgets.clear();

        let actions: ActionSlot = Rc::new(RefCell::new(None));
        let view = PageView { page, actions: actions.clone() };
        let body = self.body_area();
        let root = self.tree.root();
        let id = self.tree.add_child(root, name, Box::new(view), body)?;
        self.dispatcher.set_focus(&mut self.tree, Some(id))?;
        self.mode = Mode::Page { name: name.to_string(), actions };
        self.engine.force_redraw();
        log::info!("Opened page '{}'", name);
        Ok(())
    }

    /// Open a page from inside the loop. A failure stays on the current
    /// screen and shows up on the status line.
    fn navigate(&mut self, name: &str) {
        if let Err(e) = self.open_page(name) {
            log::warn!("Cannot open page '{}': {}", name, e);
            self.notify(e.to_string(), ColorRole::Error);
        }
    }

    /// Lay the tree out again for a new surface size.
    pub fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        self.engine.resize(width, height);
        let root = self.tree.root();
        self.tree.set_area(root, Rect::new(0, 0, width, height))?;
        let body = self.body_area();
        let children = self.tree.children(root).to_vec();
        let minimums: Vec<u16> = children
            .iter()
            .map(|id| self.tree.widget(*id).map(|w| self.minimum(w)).unwrap_or(1))
            .collect();
        let areas = match self.mode {
            Mode::Widgets => stack(body, self.layout, &minimums),
            Mode::Page { .. } => vec![body; children.len()],
        };
        for (id, rect) in children.into_iter().zip(areas) {
            self.tree.set_area(id, rect)?;
        }
        Ok(())
    }

    /// Let every widget update itself; the ones that changed are redrawn.
    pub fn tick(&mut self) {
        if self.status.borrow_mut().tick() {
            self.tree.mark_dirty(self.tree.root());
        }
        let nodes: Vec<NodeId> = self.tree.children(self.tree.root()).to_vec();
        for id in nodes {
            let changed = self.tree.widget_mut(id).map(|w| w.tick()).unwrap_or(false);
            if changed {
                self.tree.mark_dirty(id);
            }
        }
    }

    /// Handle one input event. `Some` when the dashboard should stop.
    pub fn handle_input(&mut self, event: &InputEvent) -> Result<Option<ExitReason>> {
        if event.is_ctrl('c') {
            return Ok(Some(ExitReason::Quit));
        }
        let in_page = matches!(self.mode, Mode::Page { .. });
        if !in_page && is_quit_key(event) {
            return Ok(Some(ExitReason::Quit));
        }

        let consumed = self.dispatcher.dispatch(&mut self.tree, event).is_some();
        if let Some(action) = self.take_page_action() {
            return self.apply_page_action(action);
        }
        if consumed {
            return Ok(None);
        }
        match event.code() {
            Some(KeyCode::Tab) => {
                self.dispatcher.focus_next(&mut self.tree);
            }
            Some(KeyCode::BackTab) => {
                self.dispatcher.focus_prev(&mut self.tree);
            }
            Some(KeyCode::Char(key)) if !in_page && key.is_ascii_digit() => {
                let pages = Self::menu(&self.capabilities);
                let slot = key.to_digit(10).and_then(|d| (d as usize).checked_sub(1));
                match slot.and_then(|i| pages.get(i)) {
                    Some(name) => self.navigate(name),
                    None => log::debug!("No page on menu key '{}'", key),
                }
            }
            _ if in_page && is_quit_key(event) => self.show_widgets(),
            _ => {}
        }
        Ok(None)
    }

    fn take_page_action(&mut self) -> Option<PageAction> {
        match &self.mode {
            Mode::Page { actions, .. } => actions.borrow_mut().take(),
            Mode::Widgets => None,
        }
    }

    fn apply_page_action(&mut self, action: PageAction) -> Result<Option<ExitReason>> {
        match action {
            PageAction::Back => {
                self.show_widgets();
                Ok(None)
            }
            PageAction::Exit => Ok(Some(ExitReason::PageExit)),
            PageAction::Open(name) => {
                self.navigate(&name);
                Ok(None)
            }
        }
    }

    /// Render one frame. Failures are tolerated up to [`MAX_FRAME_FAILURES`]
    /// in a row; the engine redraws everything after a failed present.
    pub fn render<G: CellGrid + ?Sized>(&mut self, grid: &mut G) -> Result<FrameReport> {
        match self.engine.render_frame(&mut self.tree, grid) {
            Ok(report) => {
                self.consecutive_failures = 0;
                Ok(report)
            }
            Err(e) => {
                self.consecutive_failures += 1;
                if self.consecutive_failures > MAX_FRAME_FAILURES {
                    log::error!("Giving up after {} failed frames: {}", self.consecutive_failures, e);
                    return Err(e.into());
                }
                log::warn!("Frame failed ({} in a row): {}", self.consecutive_failures, e);
                Ok(FrameReport::default())
            }
        }
    }

    /// Run until a quit key, a page exit or the end of `source`.
    pub fn run<S, G>(&mut self, source: &mut S, grid: &mut G) -> Result<DashboardSummary>
    where
        S: EventSource + ?Sized,
        G: CellGrid + ?Sized,
    {
        let mut events = 0u64;
        self.render(grid)?;
        let reason = loop {
            let event = source.next_event(self.tick_rate)?;
            events += 1;
            let exit = match event {
                SourceEvent::Closed => Some(ExitReason::Closed),
                SourceEvent::Resize(width, height) => {
                    grid.resize(width, height);
                    self.resize(width, height)?;
                    None
                }
                SourceEvent::Tick => {
                    self.tick();
                    None
                }
                SourceEvent::Input(input) => self.handle_input(&input)?,
            };
            if let Some(reason) = exit {
                break reason;
            }
            self.render(grid)?;
        };
        let stats = self.engine.stats();
        let summary = DashboardSummary {
            reason,
            events,
            frames: stats.frame_count(),
            cells_written: stats.cells_written(),
        };
        log::info!("Dashboard closed ({:?}) after {} frame(s)", summary.reason, summary.frames);
        Ok(summary)
    }
}

fn is_quit_key(event: &InputEvent) -> bool {
    matches!(event.code(), Some(KeyCode::Char('q')) | Some(KeyCode::Esc))
}

#[cfg(test)]
mod tests;
