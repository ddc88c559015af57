use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::render::backend::CellGrid;
use crate::render::buffer::{Cell, CellChange, FrameBuffer};
use crate::render::context::DrawContext;
use crate::render::error::{RenderError, SurfaceError};
use crate::render::geometry::Rect;
use crate::render::theme::{ColorRole, Theme};
use crate::render::tree::{NodeId, RenderTree};
use crate::utils::{catch_panic, truncate};

/// Frame timings kept for the min/avg/max figures
const TIMING_SAMPLES: usize = 100;

/// Where the engine is within a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    Idle,
    Collecting,
    Rendering,
    Diffing,
    Presenting,
}

/// What a single frame did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub nodes_rendered: usize,
    pub cells_written: usize,
    pub full_redraw: bool,
    /// Nodes whose widget failed and got a placeholder instead
    pub failed_nodes: Vec<NodeId>,
}

/// Running totals over all frames
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    frames: u64,
    cells_written: u64,
    nodes_rendered: u64,
    failed_presents: u64,
    timings: VecDeque<Duration>,
}

impl FrameStats {
    fn record(&mut self, report: &FrameReport, elapsed: Duration) {
        self.frames += 1;
        self.cells_written += report.cells_written as u64;
        self.nodes_rendered += report.nodes_rendered as u64;
        if self.timings.len() == TIMING_SAMPLES {
            self.timings.pop_front();
        }
        self.timings.push_back(elapsed);
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn cells_written(&self) -> u64 {
        self.cells_written
    }

    pub fn nodes_rendered(&self) -> u64 {
        self.nodes_rendered
    }

    pub fn failed_presents(&self) -> u64 {
        self.failed_presents
    }

    pub fn average_frame_time(&self) -> Option<Duration> {
        if self.timings.is_empty() {
            return None;
        }
        let total: Duration = self.timings.iter().sum();
        Some(total / self.timings.len() as u32)
    }

    pub fn min_frame_time(&self) -> Option<Duration> {
        self.timings.iter().min().copied()
    }

    pub fn max_frame_time(&self) -> Option<Duration> {
        self.timings.iter().max().copied()
    }
}

/// Double-buffered, dirty-checked renderer.
///
/// The front buffer mirrors what the surface shows. Each frame draws the dirty
/// nodes into the back buffer, diffs it against the front buffer and writes
/// only the cells that changed. After a successful present the buffers are
/// swapped and the new back buffer is brought level with the front using the
/// same change list.
///
/// When presenting fails, or the surface size changes, the next frame starts
/// from a full invalidation: every node is redrawn and every cell written.
pub struct RenderEngine {
    front: FrameBuffer,
    back: FrameBuffer,
    theme: Theme,
    phase: FramePhase,
    pending_invalidation: bool,
    stats: FrameStats,
}

impl RenderEngine {
    /// The first frame is always a full redraw; the surface contents are unknown.
    pub fn new(width: u16, height: u16, theme: Theme) -> Self {
        Self {
            front: FrameBuffer::new(width, height),
            back: FrameBuffer::new(width, height),
            theme,
            phase: FramePhase::Idle,
            pending_invalidation: true,
            stats: FrameStats::default(),
        }
    }

    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    pub fn size(&self) -> (u16, u16) {
        self.front.size()
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.force_redraw();
    }

    /// What the surface is believed to show.
    pub fn front(&self) -> &FrameBuffer {
        &self.front
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Redraw and rewrite everything on the next frame.
    pub fn force_redraw(&mut self) {
        self.pending_invalidation = true;
    }

    pub fn is_invalidation_pending(&self) -> bool {
        self.pending_invalidation
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        if self.size() != (width, height) {
            log::debug!("Render engine resized to {}x{}", width, height);
            self.front.resize(width, height);
            self.back.resize(width, height);
        }
        self.pending_invalidation = true;
    }

    /// Run one frame against `grid`.
    pub fn render_frame<G: CellGrid + ?Sized>(
        &mut self,
        tree: &mut RenderTree,
        grid: &mut G,
    ) -> Result<FrameReport, RenderError> {
        let started = Instant::now();
        let (width, height) = grid.size();
        if self.size() != (width, height) {
            self.resize(width, height);
        }

        let full_redraw = self.pending_invalidation;
        if full_redraw {
            self.front.reset(Cell::SENTINEL);
            self.back.reset(Cell::default());
            tree.invalidate_all();
            self.pending_invalidation = false;
        }

        self.phase = FramePhase::Collecting;
        let collection = tree.collect_dirty();
        if collection.render.is_empty() {
            tree.mark_clean(&collection.visited);
            self.phase = FramePhase::Idle;
            let report = FrameReport::default();
            self.stats.record(&report, started.elapsed());
            return Ok(report);
        }

        self.phase = FramePhase::Rendering;
        let mut report = FrameReport { full_redraw, ..FrameReport::default() };
        for id in &collection.render {
            if !self.render_node(tree, *id) {
                report.failed_nodes.push(*id);
            }
            report.nodes_rendered += 1;
        }

        self.phase = FramePhase::Diffing;
        let changes = self.back.diff(&self.front);

        self.phase = FramePhase::Presenting;
        let written = match present(grid, &changes) {
            Ok(written) => written,
            Err(e) => {
                log::warn!("Present failed after {} changes, scheduling full redraw: {}", changes.len(), e);
                self.stats.failed_presents += 1;
                self.pending_invalidation = true;
                self.phase = FramePhase::Idle;
                return Err(RenderError::Present(e));
            }
        };

        std::mem::swap(&mut self.front, &mut self.back);
        self.back.apply(&changes);
        tree.mark_clean(&collection.visited);
        self.phase = FramePhase::Idle;

        report.cells_written = written;
        self.stats.record(&report, started.elapsed());
        Ok(report)
    }

    /// Draw one node into the back buffer. `false` when a placeholder was drawn.
    fn render_node(&mut self, tree: &RenderTree, id: NodeId) -> bool {
        let Some(area) = tree.area(id) else { return true };
        let area = area.intersection(self.back.area());
        if area.is_empty() {
            return true;
        }
        let Some(widget) = tree.widget(id) else { return true };
        let label = tree.label(id).unwrap_or("widget");

        self.back.fill(area, Cell::new(' ', self.theme.style(ColorRole::Background)));

        let (min_width, min_height) = widget.minimum_size();
        let outcome = if area.width < min_width || area.height < min_height {
            Ok(Err(RenderError::TooSmall {
                width: area.width,
                height: area.height,
                min_width,
                min_height,
            }))
        } else {
            let mut ctx = DrawContext::new(&mut self.back, &self.theme, area, tree.focused() == Some(id));
            catch_panic(|| widget.draw(&mut ctx, area))
        };

        let message = match outcome {
            Ok(Ok(())) => return true,
            Ok(Err(e)) => e.to_string(),
            Err(panic) => format!("panicked: {}", panic),
        };
        log::warn!("Widget '{}' failed to render: {}", label, message);
        self.draw_placeholder(area, label, &message);
        false
    }

    fn draw_placeholder(&mut self, area: Rect, label: &str, message: &str) {
        let style = self.theme.style(ColorRole::Error);
        let mut ctx = DrawContext::new(&mut self.back, &self.theme, area, false);
        ctx.fill(area, ' ', style);
        let text = truncate(&format!("! {}: {}", label, message), usize::from(area.width));
        ctx.print(area.x, area.y, &text, style);
    }
}

/// Write `changes` to the grid; the right halves of wide glyphs are drawn by
/// their left half. Returns the number of cells written.
fn present<G: CellGrid + ?Sized>(grid: &mut G, changes: &[CellChange]) -> Result<usize, SurfaceError> {
    let mut written = 0;
    for change in changes.iter().filter(|c| !c.cell.is_continuation()) {
        grid.set_cell(change.x, change.y, change.cell.ch, change.cell.style)?;
        written += 1;
    }
    grid.flush()?;
    Ok(written)
}
