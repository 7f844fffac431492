//! Derives the visible subset of a collection from independent filter
//! dimensions. Nothing here mutates the collection it reads.

/// One dimension's choice: no filtering, or exact match on a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<V> {
    All,
    Only(V),
}

impl<V> Default for Selection<V> {
    fn default() -> Self {
        Selection::All
    }
}

impl<V: PartialEq + Clone> Selection<V> {
    pub fn accepts(&self, value: Option<&V>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => value == Some(wanted),
        }
    }

    /// Steps `All -> first -> ... -> last -> All`. A value that is no longer
    /// among `options` moves to the first option.
    pub fn cycle(&self, options: &[V]) -> Self {
        let next = match self {
            Selection::All => options.first(),
            Selection::Only(current) => match options.iter().position(|o| o == current) {
                Some(i) => options.get(i + 1),
                None => options.first(),
            },
        };
        next.cloned().map(Selection::Only).unwrap_or(Selection::All)
    }

    pub fn label<'a>(&'a self, all: &'a str, show: impl Fn(&'a V) -> &'a str) -> &'a str {
        match self {
            Selection::All => all,
            Selection::Only(value) => show(value),
        }
    }
}

/// Object-safe view of a dimension so differently typed fields combine.
pub trait Dimension<T> {
    fn name(&self) -> &'static str;
    fn matches(&self, item: &T) -> bool;
}

/// Exact-equality filter on the field picked by `selector`.
pub struct FieldFilter<T, V> {
    name: &'static str,
    selector: fn(&T) -> Option<&V>,
    pub selection: Selection<V>,
}

impl<T, V: PartialEq + Clone> FieldFilter<T, V> {
    pub fn new(name: &'static str, selector: fn(&T) -> Option<&V>) -> Self {
        Self {
            name,
            selector,
            selection: Selection::All,
        }
    }

    pub fn with(mut self, selection: Selection<V>) -> Self {
        self.selection = selection;
        self
    }

    pub fn select(&mut self, selection: Selection<V>) {
        self.selection = selection;
    }

    /// Option set for this dimension, derived from `items`.
    pub fn options(&self, items: &[T]) -> Vec<V> {
        distinct(items, self.selector)
    }

    pub fn cycle(&mut self, items: &[T]) {
        self.selection = self.selection.cycle(&self.options(items));
    }
}

impl<T, V: PartialEq + Clone> Dimension<T> for FieldFilter<T, V> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn matches(&self, item: &T) -> bool {
        self.selection.accepts((self.selector)(item))
    }
}

/// Items that every dimension accepts, in their original order.
pub fn filter<'a, T>(items: &'a [T], dimensions: &[&dyn Dimension<T>]) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| dimensions.iter().all(|d| d.matches(item)))
        .collect()
}

/// Distinct present values of a field, in first-seen order.
pub fn distinct<T, V: PartialEq + Clone>(items: &[T], selector: fn(&T) -> Option<&V>) -> Vec<V> {
    let mut values: Vec<V> = Vec::new();
    for value in items.iter().filter_map(selector) {
        if !values.contains(value) {
            values.push(value.clone());
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Doc {
        id: i64,
        doc_type: String,
        project: Option<String>,
    }

    fn doc(id: i64, doc_type: &str, project: Option<&str>) -> Doc {
        Doc {
            id,
            doc_type: doc_type.to_string(),
            project: project.map(str::to_string),
        }
    }

    fn doc_type(d: &Doc) -> Option<&String> {
        Some(&d.doc_type)
    }

    fn doc_project(d: &Doc) -> Option<&String> {
        d.project.as_ref()
    }

    fn by_type() -> FieldFilter<Doc, String> {
        FieldFilter::new("type", doc_type)
    }

    fn by_project() -> FieldFilter<Doc, String> {
        FieldFilter::new("project", doc_project)
    }

    fn visible<'a>(items: &'a [Doc], dimensions: &[&dyn Dimension<Doc>]) -> Vec<&'a Doc> {
        filter(items, dimensions)
    }

    fn sample() -> Vec<Doc> {
        vec![
            doc(1, "Invoice", Some("Website")),
            doc(2, "Receipt", Some("Website")),
            doc(3, "Invoice", Some("Mobile")),
            doc(4, "Contract", None),
        ]
    }

    #[test]
    fn sentinel_selection_keeps_everything() {
        let items = sample();
        let project = by_project();
        let kind = by_type();
        let shown = visible(&items, &[&project, &kind]);
        assert_eq!(shown, items.iter().collect::<Vec<_>>());
    }

    #[test]
    fn concrete_selection_matches_exactly() {
        let items = vec![doc(1, "Invoice", None), doc(2, "Receipt", None)];
        let kind = by_type().with(Selection::Only("Invoice".into()));
        let shown = visible(&items, &[&kind]);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, 1);
    }

    #[test]
    fn dimensions_combine_with_and() {
        let items = sample();
        let kind = by_type().with(Selection::Only("Invoice".into()));
        let project = by_project().with(Selection::Only("Website".into()));
        let ids: Vec<i64> = visible(&items, &[&kind, &project]).iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1]);

        for item in visible(&items, &[&kind]) {
            assert_eq!(item.doc_type, "Invoice");
        }
    }

    #[test]
    fn concrete_selection_skips_absent_fields() {
        let items = sample();
        let project = by_project().with(Selection::Only("Website".into()));
        assert!(visible(&items, &[&project]).iter().all(|d| d.project.is_some()));
    }

    #[test]
    fn stale_selection_yields_empty_result() {
        let items = sample();
        let kind = by_type().with(Selection::Only("Memo".into()));
        assert!(visible(&items, &[&kind]).is_empty());
        assert_eq!(items.len(), 4);
    }

    #[test]
    fn sentinel_never_collides_with_a_real_value() {
        let items = vec![doc(1, "All Types", None), doc(2, "Invoice", None)];
        let kind = by_type().with(Selection::Only("All Types".into()));
        let ids: Vec<i64> = visible(&items, &[&kind]).iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn options_are_distinct_in_first_seen_order() {
        let items = sample();
        assert_eq!(by_type().options(&items), vec!["Invoice", "Receipt", "Contract"]);
        assert_eq!(by_project().options(&items), vec!["Website", "Mobile"]);
    }

    #[test]
    fn cycle_wraps_back_to_all() {
        let options = vec!["a".to_string(), "b".to_string()];
        let mut selection: Selection<String> = Selection::All;
        selection = selection.cycle(&options);
        assert_eq!(selection, Selection::Only("a".to_string()));
        selection = selection.cycle(&options);
        assert_eq!(selection, Selection::Only("b".to_string()));
        selection = selection.cycle(&options);
        assert_eq!(selection, Selection::All);

        let stale = Selection::Only("gone".to_string());
        assert_eq!(stale.cycle(&options), Selection::Only("a".to_string()));
        assert_eq!(Selection::<String>::All.cycle(&[]), Selection::All);
    }

    #[test]
    fn field_filter_cycles_over_current_items() {
        let mut items = sample();
        let mut kind = by_type();
        kind.cycle(&items);
        assert_eq!(kind.selection, Selection::Only("Invoice".to_string()));

        items.retain(|d| d.doc_type != "Invoice");
        assert!(visible(&items, &[&kind]).is_empty());
        kind.cycle(&items);
        assert_eq!(kind.selection, Selection::Only("Receipt".to_string()));
        assert_eq!(kind.name(), "type");
    }
}
