//! Sorted view over another model.
//!
//! [`OrderedViewProxy`] presents the rows of any [`HierarchicalDataSource`]
//! in commander order: `..` first, then directories, then files, each group
//! by case-insensitive name. The source keeps its own order; the proxy only
//! holds a row mapping, rebuilt after every change the source publishes.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::rc::Rc;

use crate::error::CoreResult;
use crate::fs::entry::Entry;
use crate::model::signal::{Signal, SubscriptionId};
use crate::model::{checked_row, DataChanged, HierarchicalDataSource, ModelIndex};

/// Commander ordering: `..` first, directories before files, then
/// case-insensitive name.
pub fn compare_entries(a: &Entry, b: &Entry) -> Ordering {
    compare_rows((a, a.is_dir()), (b, b.is_dir()))
}

/// [`compare_entries`] with the directory flag supplied by the source model.
fn compare_rows((a, a_dir): (&Entry, bool), (b, b_dir): (&Entry, bool)) -> Ordering {
    match (a.is_parent_marker(), b.is_parent_marker()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }
    b_dir
        .cmp(&a_dir)
        .then_with(|| a.name().to_lowercase().cmp(&b.name().to_lowercase()))
}

#[derive(Debug, Default)]
struct RowMapping {
    /// Source generation the mapping was built for.
    generation: Option<u64>,
    proxy_to_source: Vec<usize>,
    source_to_proxy: Vec<usize>,
}

/// [`HierarchicalDataSource`] decorator applying [`compare_entries`].
///
/// Proxy indices share the source's generation, so an index taken before
/// the source changed is rejected exactly as the source would reject it.
pub struct OrderedViewProxy<S> {
    source: S,
    mapping: RefCell<RowMapping>,
    stale: Rc<Cell<bool>>,
    data_changed: Signal<DataChanged>,
    subscription: SubscriptionId,
}

impl<S: HierarchicalDataSource> OrderedViewProxy<S> {
    /// Wraps `source` and subscribes to its change notifications.
    pub fn new(source: S) -> Self {
        let stale = Rc::new(Cell::new(true));
        let data_changed = Signal::new();

        let source_stale = Rc::clone(&stale);
        let republish = data_changed.clone();
        let subscription = source.data_changed().subscribe(move |change: &DataChanged| {
            source_stale.set(true);
            republish.emit(change);
        });

        Self {
            source,
            mapping: RefCell::new(RowMapping::default()),
            stale,
            data_changed,
            subscription,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the wrapped model, e.g. to deliver device events.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Unwraps the source, detaching from its notifications.
    pub fn into_source(self) -> S {
        self.source.data_changed().unsubscribe(self.subscription);
        self.source
    }

    /// Translates a proxy index into the source index of the same row.
    pub fn map_to_source(&self, index: ModelIndex) -> CoreResult<ModelIndex> {
        if index.is_root() {
            return Ok(self.source.root_index());
        }
        let generation = self.source.generation();
        let row = checked_row(index, generation, self.source.row_count())?;
        self.ensure_sorted()?;
        let source_row = self.mapping.borrow().proxy_to_source[row];
        Ok(ModelIndex::new(source_row, generation))
    }

    /// Translates a source index into the proxy index of the same row.
    pub fn map_from_source(&self, index: ModelIndex) -> CoreResult<ModelIndex> {
        if index.is_root() {
            return Ok(ModelIndex::root(index.generation()));
        }
        let generation = self.source.generation();
        let row = checked_row(index, generation, self.source.row_count())?;
        self.ensure_sorted()?;
        let proxy_row = self.mapping.borrow().source_to_proxy[row];
        Ok(ModelIndex::new(proxy_row, generation))
    }

    /// Entries in display order.
    pub fn sorted_entries(&self) -> CoreResult<Vec<&Entry>> {
        (0..self.row_count())
            .map(|row| self.index(row).and_then(|index| self.entry(index)))
            .collect()
    }

    /// Entry at source `row` with the source's own directory test, which
    /// may differ from `Entry::is_dir` (a local symlink, for one).
    fn keyed_row(&self, row: usize) -> CoreResult<(&Entry, bool)> {
        let index = self.source.index(row)?;
        Ok((self.source.entry(index)?, self.source.is_directory(index)?))
    }

    fn ensure_sorted(&self) -> CoreResult<()> {
        let generation = self.source.generation();
        let current = self.mapping.borrow().generation == Some(generation);
        if current && !self.stale.get() {
            return Ok(());
        }

        let rows: Vec<(&Entry, bool)> = (0..self.source.row_count())
            .map(|row| self.keyed_row(row))
            .collect::<CoreResult<_>>()?;

        let mut proxy_to_source: Vec<usize> = (0..rows.len()).collect();
        proxy_to_source.sort_by(|&a, &b| compare_rows(rows[a], rows[b]));

        let mut source_to_proxy = vec![0; rows.len()];
        for (proxy_row, &source_row) in proxy_to_source.iter().enumerate() {
            source_to_proxy[source_row] = proxy_row;
        }

        *self.mapping.borrow_mut() = RowMapping {
            generation: Some(generation),
            proxy_to_source,
            source_to_proxy,
        };
        self.stale.set(false);
        Ok(())
    }
}

impl<S: HierarchicalDataSource> HierarchicalDataSource for OrderedViewProxy<S> {
    fn row_count(&self) -> usize {
        self.source.row_count()
    }

    fn generation(&self) -> u64 {
        self.source.generation()
    }

    fn entry(&self, index: ModelIndex) -> CoreResult<&Entry> {
        let source_index = self.map_to_source(index)?;
        self.source.entry(source_index)
    }

    fn is_directory(&self, index: ModelIndex) -> CoreResult<bool> {
        let source_index = self.map_to_source(index)?;
        self.source.is_directory(source_index)
    }

    fn root_index(&self) -> ModelIndex {
        ModelIndex::root(self.source.root_index().generation())
    }

    fn enter_directory(&mut self, index: ModelIndex) -> CoreResult<ModelIndex> {
        let source_index = self.map_to_source(index)?;
        let source_root = self.source.enter_directory(source_index)?;
        self.map_from_source(source_root)
    }

    fn set_name(&mut self, index: ModelIndex, new_name: &str) -> CoreResult<()> {
        let source_index = self.map_to_source(index)?;
        self.source.set_name(source_index, new_name)
    }

    /// Deletion is addressed by name, so it is forwarded unchanged.
    fn request_delete(&mut self, name: &str) -> CoreResult<()> {
        self.source.request_delete(name)
    }

    fn data_changed(&self) -> &Signal<DataChanged> {
        &self.data_changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::model::remote::{ListingState, RemoteDirectoryModel};
    use crate::remote::messenger::testing::RecordingMessenger;
    use crate::remote::protocol::{DeviceEvent, DeviceRequest};

    type DeviceProxy = OrderedViewProxy<RemoteDirectoryModel<RecordingMessenger>>;

    fn proxy() -> (DeviceProxy, RecordingMessenger) {
        let messenger = RecordingMessenger::default();
        let model = RemoteDirectoryModel::new(messenger.clone());
        (OrderedViewProxy::new(model), messenger)
    }

    fn respond(proxy: &mut DeviceProxy, entries: Vec<Entry>) {
        let token = match proxy.source().state() {
            ListingState::Listing(token) => token,
            ListingState::Idle => panic!("no list request outstanding"),
        };
        proxy
            .source_mut()
            .handle_event(DeviceEvent::Listed { token, entries });
    }

    fn displayed(proxy: &DeviceProxy) -> Vec<String> {
        proxy
            .sorted_entries()
            .unwrap()
            .iter()
            .map(|e| e.name().to_string())
            .collect()
    }

    fn sort_names(entries: &[Entry]) -> Vec<&str> {
        let mut sorted: Vec<&Entry> = entries.iter().collect();
        sorted.sort_by(|a, b| compare_entries(a, b));
        sorted.iter().map(|e| e.name()).collect()
    }

    #[test]
    fn parent_marker_sorts_first() {
        let entries = vec![
            Entry::dir("Apps"),
            Entry::file("!readme", 1),
            Entry::parent_marker(),
            Entry::dir("_build"),
        ];
        assert_eq!(sort_names(&entries)[0], "..");
    }

    #[test]
    fn directories_before_files_regardless_of_name() {
        let entries = vec![
            Entry::file("aaa.txt", 1),
            Entry::dir("zzz"),
            Entry::file("AAB.txt", 1),
            Entry::dir("mmm"),
        ];
        assert_eq!(sort_names(&entries), vec!["mmm", "zzz", "aaa.txt", "AAB.txt"]);
    }

    #[test]
    fn names_compare_case_insensitively() {
        let entries = vec![
            Entry::file("beta.py", 1),
            Entry::file("Alpha.py", 1),
            Entry::file("alphabet.py", 1),
            Entry::file("BETA2.py", 1),
        ];
        assert_eq!(
            sort_names(&entries),
            vec!["Alpha.py", "alphabet.py", "beta.py", "BETA2.py"]
        );
    }

    #[test]
    fn ordering_is_antisymmetric() {
        let entries = vec![
            Entry::parent_marker(),
            Entry::dir("lib"),
            Entry::dir("Lib2"),
            Entry::file("main.py", 3),
            Entry::file("Main2.py", 3),
        ];
        for a in &entries {
            assert_eq!(compare_entries(a, a), Ordering::Equal);
            for b in &entries {
                assert_eq!(compare_entries(a, b), compare_entries(b, a).reverse());
            }
        }
    }

    #[test]
    fn root_scenario_shows_directory_then_file() {
        let (mut proxy, _) = proxy();
        respond(
            &mut proxy,
            vec![Entry::file("b.txt", 120), Entry::dir("alpha")],
        );
        assert_eq!(displayed(&proxy), vec!["alpha", "b.txt"]);
    }

    #[test]
    fn subdirectory_scenario_shows_parent_marker_first() {
        let (mut proxy, messenger) = proxy();
        respond(
            &mut proxy,
            vec![Entry::dir("alpha"), Entry::file("b.txt", 120)],
        );

        let alpha = proxy.index(0).unwrap();
        assert!(proxy.is_directory(alpha).unwrap());
        let root = proxy.enter_directory(alpha).unwrap();
        assert!(root.is_root());
        assert_eq!(messenger.list_paths().last().unwrap(), "alpha");

        respond(&mut proxy, vec![Entry::file("x.txt", 5)]);
        assert_eq!(displayed(&proxy), vec!["..", "x.txt"]);
    }

    #[test]
    fn source_change_is_republished() {
        let (mut proxy, _) = proxy();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        proxy
            .data_changed()
            .subscribe(move |c| s.borrow_mut().push(c.clone()));

        respond(&mut proxy, vec![Entry::dir("a"), Entry::dir("b")]);
        assert_eq!(*seen.borrow(), vec![DataChanged { rows: 0..2 }]);
    }

    #[test]
    fn mapping_is_rebuilt_after_source_change() {
        let (mut proxy, _) = proxy();
        respond(&mut proxy, vec![Entry::file("z.txt", 1), Entry::dir("a")]);
        assert_eq!(displayed(&proxy), vec!["a", "z.txt"]);

        proxy.source_mut().invalidate();
        respond(
            &mut proxy,
            vec![Entry::file("c.txt", 1), Entry::file("B.txt", 1), Entry::dir("d")],
        );
        assert_eq!(displayed(&proxy), vec!["d", "B.txt", "c.txt"]);
    }

    #[test]
    fn index_translation_round_trips() {
        let (mut proxy, _) = proxy();
        respond(
            &mut proxy,
            vec![Entry::file("b.txt", 1), Entry::file("a.txt", 1), Entry::dir("c")],
        );

        for row in 0..proxy.row_count() {
            let index = proxy.index(row).unwrap();
            let source = proxy.map_to_source(index).unwrap();
            assert_eq!(proxy.map_from_source(source).unwrap(), index);
        }
        let first = proxy.index(0).unwrap();
        assert_eq!(proxy.map_to_source(first).unwrap().row(), Some(2));
    }

    #[test]
    fn rename_targets_the_translated_row() {
        let (mut proxy, messenger) = proxy();
        respond(
            &mut proxy,
            vec![Entry::file("b.txt", 1), Entry::dir("alpha")],
        );
        messenger.clear();

        let b = proxy.index(1).unwrap();
        assert_eq!(proxy.display_name(b).unwrap(), "b.txt");
        proxy.set_name(b, "c.txt").unwrap();

        assert_eq!(
            messenger.sent(),
            vec![DeviceRequest::Move {
                from: "/b.txt".to_string(),
                to: "/c.txt".to_string()
            }]
        );
    }

    #[test]
    fn delete_is_forwarded_by_name() {
        let (mut proxy, messenger) = proxy();
        respond(&mut proxy, vec![Entry::file("b.txt", 1)]);
        messenger.clear();

        proxy.request_delete("b.txt").unwrap();
        assert_eq!(
            messenger.sent(),
            vec![DeviceRequest::Delete {
                path: "/b.txt".to_string()
            }]
        );
    }

    #[test]
    fn proxy_index_goes_stale_with_source() {
        let (mut proxy, _) = proxy();
        respond(&mut proxy, vec![Entry::file("b.txt", 1)]);
        let old = proxy.index(0).unwrap();

        proxy.source_mut().invalidate();
        respond(&mut proxy, vec![Entry::file("b.txt", 1)]);

        assert!(matches!(
            proxy.is_directory(old),
            Err(CoreError::StaleIndex { .. })
        ));
    }

    #[test]
    fn out_of_range_proxy_index_fails() {
        let (mut proxy, _) = proxy();
        respond(&mut proxy, vec![Entry::file("b.txt", 1)]);

        let past_end = ModelIndex::new(3, proxy.generation());
        assert!(matches!(
            proxy.is_directory(past_end),
            Err(CoreError::IndexOutOfRange { row: 3, len: 1 })
        ));
    }

    #[test]
    fn into_source_detaches_subscription() {
        let (proxy, _) = proxy();
        let model = proxy.into_source();
        assert_eq!(model.data_changed().subscriber_count(), 0);
    }
}
