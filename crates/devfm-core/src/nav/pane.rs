//! Cursor-driven panes over sorted models.
//!
//! A [`Pane`] pairs an [`OrderedViewProxy`] with a cursor. [`DualPane`]
//! holds the local and the device pane side by side and tracks which one
//! has focus. Both are driven through the object-safe [`PaneView`] trait so
//! a frontend can act on "the focused pane" without knowing its model.

use crate::error::CoreResult;
use crate::fs::entry::Entry;
use crate::model::sorted::OrderedViewProxy;
use crate::model::HierarchicalDataSource;

/// Operations a frontend performs on a pane.
pub trait PaneView {
    /// Entries in display order.
    fn rows(&self) -> CoreResult<Vec<Entry>>;
    /// Cursor position, clamped to the current listing.
    fn selected_index(&self) -> usize;
    fn selected_entry(&self) -> Option<Entry>;
    /// Moves the cursor to `index` (clamped to bounds).
    fn select(&mut self, index: usize);
    fn move_up(&mut self);
    fn move_down(&mut self);
    fn go_to_first(&mut self);
    fn go_to_last(&mut self);
    /// Enters the selected directory. Files are left alone.
    fn activate(&mut self) -> CoreResult<()>;
    fn rename_selected(&mut self, new_name: &str) -> CoreResult<()>;
    fn delete_selected(&mut self) -> CoreResult<()>;
}

/// One side of the browser: a sorted model plus a cursor.
pub struct Pane<S> {
    view: OrderedViewProxy<S>,
    selected: usize,
}

impl<S: HierarchicalDataSource> Pane<S> {
    /// Creates a pane over `source`. The cursor starts at row `0`.
    pub fn new(source: S) -> Self {
        Self {
            view: OrderedViewProxy::new(source),
            selected: 0,
        }
    }

    pub fn view(&self) -> &OrderedViewProxy<S> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut OrderedViewProxy<S> {
        &mut self.view
    }

    /// The unsorted model behind the view.
    pub fn source(&self) -> &S {
        self.view.source()
    }

    pub fn source_mut(&mut self) -> &mut S {
        self.view.source_mut()
    }

    fn clamp(&self, index: usize) -> usize {
        index.min(self.view.row_count().saturating_sub(1))
    }
}

impl<S: HierarchicalDataSource> PaneView for Pane<S> {
    fn rows(&self) -> CoreResult<Vec<Entry>> {
        Ok(self.view.sorted_entries()?.into_iter().cloned().collect())
    }

    fn selected_index(&self) -> usize {
        self.clamp(self.selected)
    }

    fn selected_entry(&self) -> Option<Entry> {
        let index = self.view.index(self.selected_index()).ok()?;
        self.view.entry(index).ok().cloned()
    }

    fn select(&mut self, index: usize) {
        self.selected = self.clamp(index);
    }

    fn move_up(&mut self) {
        let current = self.selected_index();
        self.select(current.saturating_sub(1));
    }

    fn move_down(&mut self) {
        let current = self.selected_index();
        self.select(current + 1);
    }

    fn go_to_first(&mut self) {
        self.select(0);
    }

    fn go_to_last(&mut self) {
        self.select(usize::MAX);
    }

    fn activate(&mut self) -> CoreResult<()> {
        let index = self.view.index(self.selected_index())?;
        if !self.view.is_directory(index)? {
            return Ok(());
        }
        self.view.enter_directory(index)?;
        self.selected = 0;
        Ok(())
    }

    fn rename_selected(&mut self, new_name: &str) -> CoreResult<()> {
        let index = self.view.index(self.selected_index())?;
        self.view.set_name(index, new_name)
    }

    fn delete_selected(&mut self) -> CoreResult<()> {
        let index = self.view.index(self.selected_index())?;
        let name = self.view.entry(index)?.name().to_string();
        self.view.request_delete(&name)
    }
}

/// Which pane has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Local,
    Device,
}

/// Local pane and device pane, one of them focused.
pub struct DualPane<L, D> {
    local: Pane<L>,
    device: Pane<D>,
    focus: Side,
}

impl<L: HierarchicalDataSource, D: HierarchicalDataSource> DualPane<L, D> {
    /// Creates the pair with the local pane focused.
    pub fn new(local: L, device: D) -> Self {
        Self {
            local: Pane::new(local),
            device: Pane::new(device),
            focus: Side::Local,
        }
    }

    pub fn focus(&self) -> Side {
        self.focus
    }

    pub fn set_focus(&mut self, side: Side) {
        self.focus = side;
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Side::Local => Side::Device,
            Side::Device => Side::Local,
        };
    }

    pub fn local(&self) -> &Pane<L> {
        &self.local
    }

    pub fn local_mut(&mut self) -> &mut Pane<L> {
        &mut self.local
    }

    pub fn device(&self) -> &Pane<D> {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut Pane<D> {
        &mut self.device
    }

    /// The pane that currently has focus.
    pub fn focused(&self) -> &dyn PaneView {
        match self.focus {
            Side::Local => &self.local,
            Side::Device => &self.device,
        }
    }

    pub fn focused_mut(&mut self) -> &mut dyn PaneView {
        match self.focus {
            Side::Local => &mut self.local,
            Side::Device => &mut self.device,
        }
    }
}
