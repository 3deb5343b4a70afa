//! Hierarchy Controller
//!
//! Ordered chain of selections across dependent levels
//! (Board → Grade → Subject → Chapter, City → Area). Selecting at one
//! level forgets everything below it; each level's scope is derived from
//! the selection right above it.

use log::debug;
use thiserror::Error;

use crate::domain::{OptionId, OptionItem, OptionType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("level {index} does not exist (hierarchy has {len} levels)")]
    LevelOutOfRange { index: usize, len: usize },
}

/// Where a level's option type comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelSource {
    /// Same type whatever the parent
    Fixed(OptionType),
    /// `AREA_<CITY_CODE>` of the selected city
    AreasOfCity,
}

/// One depth of a hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSpec {
    pub name: String,
    pub source: LevelSource,
}

impl LevelSpec {
    pub fn fixed(option_type: OptionType) -> Self {
        Self {
            name: option_type.display_name(),
            source: LevelSource::Fixed(option_type),
        }
    }

    pub fn areas_of_city() -> Self {
        Self {
            name: "Area".to_string(),
            source: LevelSource::AreasOfCity,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Option type of this level given the selection above it
    pub fn resolve(&self, parent: Option<&Selection>) -> Option<OptionType> {
        match (&self.source, parent) {
            (LevelSource::Fixed(option_type), _) => Some(option_type.clone()),
            (LevelSource::AreasOfCity, Some(city)) => Some(OptionType::scope_key(&city.code)),
            (LevelSource::AreasOfCity, None) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyKind {
    Curriculum,
    Locations,
    /// A single level editing one type reported by the backend
    Flat(OptionType),
    Custom(String),
}

/// Named, ordered list of levels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    kind: HierarchyKind,
    title: String,
    levels: Vec<LevelSpec>,
}

impl Hierarchy {
    pub fn new(kind: HierarchyKind, title: impl Into<String>, levels: Vec<LevelSpec>) -> Self {
        Self {
            kind,
            title: title.into(),
            levels,
        }
    }

    /// Board → Grade → Subject → Chapter
    pub fn curriculum() -> Self {
        Self::new(
            HierarchyKind::Curriculum,
            "Curriculum",
            vec![
                LevelSpec::fixed(OptionType::Board),
                LevelSpec::fixed(OptionType::Grade),
                LevelSpec::fixed(OptionType::Subject),
                LevelSpec::fixed(OptionType::Chapter),
            ],
        )
    }

    /// City → Area
    pub fn locations() -> Self {
        Self::new(
            HierarchyKind::Locations,
            "Locations",
            vec![LevelSpec::fixed(OptionType::City), LevelSpec::areas_of_city()],
        )
    }

    pub fn flat(option_type: OptionType, title: impl Into<String>) -> Self {
        let title = title.into();
        Self::new(
            HierarchyKind::Flat(option_type.clone()),
            title.clone(),
            vec![LevelSpec::fixed(option_type).named(title)],
        )
    }

    pub fn kind(&self) -> &HierarchyKind {
        &self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn levels(&self) -> &[LevelSpec] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, index: usize) -> Option<&LevelSpec> {
        self.levels.get(index)
    }
}

/// Selected item at one level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub id: OptionId,
    /// The item's value; child types such as areas are derived from it
    pub code: String,
    pub label: String,
}

impl Selection {
    pub fn new(id: impl Into<OptionId>, code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            id: id.into(),
            label: code.clone(),
            code,
        }
    }
}

impl From<&OptionItem> for Selection {
    fn from(item: &OptionItem) -> Self {
        Self {
            id: item.id.clone(),
            code: item.value.clone(),
            label: item.label.clone(),
        }
    }
}

/// What a level column has to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelScope {
    /// Top level: every item of the type
    Root { option_type: OptionType },
    /// Children of the selected parent
    Child {
        option_type: OptionType,
        parent: Selection,
    },
    /// Parent not selected: nothing to show, nothing to fetch
    Unset,
}

impl LevelScope {
    pub fn option_type(&self) -> Option<&OptionType> {
        match self {
            LevelScope::Root { option_type } | LevelScope::Child { option_type, .. } => {
                Some(option_type)
            }
            LevelScope::Unset => None,
        }
    }

    pub fn parent(&self) -> Option<&Selection> {
        match self {
            LevelScope::Child { parent, .. } => Some(parent),
            _ => None,
        }
    }

    pub fn parent_id(&self) -> Option<&OptionId> {
        self.parent().map(|p| &p.id)
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, LevelScope::Unset)
    }

    /// Whether both scopes list the same rows: same type under the same
    /// parent id. Parent labels are display only.
    pub fn same_target(&self, other: &LevelScope) -> bool {
        self.option_type() == other.option_type() && self.parent_id() == other.parent_id()
    }
}

/// Selection chain for the active hierarchy.
///
/// Pure state; it never talks to the repository. Columns observe
/// [`HierarchyController::scope_for`] and blank themselves when their
/// parent becomes unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyController {
    hierarchy: Hierarchy,
    selections: Vec<Option<Selection>>,
}

impl HierarchyController {
    pub fn new(hierarchy: Hierarchy) -> Self {
        let selections = vec![None; hierarchy.len()];
        Self {
            hierarchy,
            selections,
        }
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    fn check(&self, index: usize) -> Result<(), HierarchyError> {
        if index >= self.selections.len() {
            return Err(HierarchyError::LevelOutOfRange {
                index,
                len: self.selections.len(),
            });
        }
        Ok(())
    }

    /// Select at `index`; every deeper level becomes unset
    pub fn select_at(
        &mut self,
        index: usize,
        selection: impl Into<Selection>,
    ) -> Result<(), HierarchyError> {
        self.check(index)?;
        let selection = selection.into();
        debug!(
            "[HIERARCHY] {} select {} at level {}",
            self.hierarchy.title(),
            selection.id,
            index
        );
        self.selections[index] = Some(selection);
        self.clear_after(index);
        Ok(())
    }

    /// Unset `index` and everything below it
    pub fn clear_from(&mut self, index: usize) {
        for slot in self.selections.iter_mut().skip(index) {
            *slot = None;
        }
    }

    fn clear_after(&mut self, index: usize) {
        self.clear_from(index + 1);
    }

    /// Forget the whole chain
    pub fn reset(&mut self) {
        self.clear_from(0);
    }

    /// Replace the active hierarchy; starts with nothing selected
    pub fn switch_to(&mut self, hierarchy: Hierarchy) {
        debug!("[HIERARCHY] switch to {}", hierarchy.title());
        self.selections = vec![None; hierarchy.len()];
        self.hierarchy = hierarchy;
    }

    pub fn selection_at(&self, index: usize) -> Option<&Selection> {
        self.selections.get(index).and_then(Option::as_ref)
    }

    pub fn is_selected(&self, index: usize, id: &OptionId) -> bool {
        self.selection_at(index).map(|s| &s.id == id).unwrap_or(false)
    }

    /// `(level name, selection)` for every level, top first
    pub fn chain(&self) -> Vec<(&str, Option<&Selection>)> {
        self.hierarchy
            .levels()
            .iter()
            .zip(self.selections.iter())
            .map(|(level, selection)| (level.name.as_str(), selection.as_ref()))
            .collect()
    }

    /// Selected items from the top down to the first gap
    pub fn selected_path(&self) -> Vec<&Selection> {
        self.selections.iter().map_while(Option::as_ref).collect()
    }

    /// Scope the column at `index` has to load
    pub fn scope_for(&self, index: usize) -> LevelScope {
        let Some(level) = self.hierarchy.level(index) else {
            return LevelScope::Unset;
        };
        if index == 0 {
            return match level.resolve(None) {
                Some(option_type) => LevelScope::Root { option_type },
                None => LevelScope::Unset,
            };
        }
        let Some(parent) = self.selection_at(index - 1) else {
            return LevelScope::Unset;
        };
        match level.resolve(Some(parent)) {
            Some(option_type) => LevelScope::Child {
                option_type,
                parent: parent.clone(),
            },
            None => LevelScope::Unset,
        }
    }

    /// An item was deleted at `index`. Returns true when it was on the
    /// selection path and the chain was cut there.
    pub fn on_item_deleted(&mut self, index: usize, id: &OptionId) -> bool {
        if !self.is_selected(index, id) {
            return false;
        }
        self.clear_from(index);
        true
    }

    /// An item was edited at `index`. A selected item keeps its place;
    /// when its code changed, deeper levels are unset because their scope
    /// (e.g. the area tag of a city) no longer holds. Returns true when
    /// deeper levels were cleared.
    pub fn on_item_updated(&mut self, index: usize, item: &OptionItem) -> bool {
        if !self.is_selected(index, &item.id) {
            return false;
        }
        let refreshed = Selection::from(item);
        let code_changed = self
            .selection_at(index)
            .map(|current| current.code != refreshed.code)
            .unwrap_or(false);
        self.selections[index] = Some(refreshed);
        if code_changed {
            self.clear_after(index);
        }
        code_changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deep(levels: usize) -> Hierarchy {
        Hierarchy::new(
            HierarchyKind::Custom("deep".to_string()),
            "Deep",
            (0..levels)
                .map(|i| LevelSpec::fixed(OptionType::Custom(format!("L{}", i))))
                .collect(),
        )
    }

    fn fill(controller: &mut HierarchyController) {
        for i in 0..controller.len() {
            controller
                .select_at(i, Selection::new(format!("id-{}", i), format!("C{}", i)))
                .unwrap();
        }
    }

    #[test]
    fn test_select_clears_every_deeper_level() {
        for depth in 1..=6 {
            for i in 0..depth {
                let mut controller = HierarchyController::new(deep(depth));
                fill(&mut controller);
                controller
                    .select_at(i, Selection::new("other", "OTHER"))
                    .unwrap();

                for j in 0..depth {
                    if j < i {
                        assert!(controller.selection_at(j).is_some(), "depth {depth} i {i} j {j}");
                    } else if j == i {
                        assert_eq!(controller.selection_at(j).unwrap().id, OptionId::new("other"));
                    } else {
                        assert!(controller.selection_at(j).is_none(), "depth {depth} i {i} j {j}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_select_out_of_range() {
        let mut controller = HierarchyController::new(Hierarchy::locations());
        assert_eq!(
            controller.select_at(2, Selection::new("x", "X")),
            Err(HierarchyError::LevelOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_scopes_follow_selection() {
        let mut controller = HierarchyController::new(Hierarchy::curriculum());
        assert_eq!(
            controller.scope_for(0),
            LevelScope::Root {
                option_type: OptionType::Board
            }
        );
        assert!(controller.scope_for(1).is_unset());

        controller.select_at(0, Selection::new("b1", "CBSE")).unwrap();
        let grade = controller.scope_for(1);
        assert_eq!(grade.option_type(), Some(&OptionType::Grade));
        assert_eq!(grade.parent_id(), Some(&OptionId::new("b1")));
        assert!(controller.scope_for(2).is_unset());
        assert!(controller.scope_for(9).is_unset());
    }

    #[test]
    fn test_area_scope_uses_city_code() {
        let mut controller = HierarchyController::new(Hierarchy::locations());
        controller.select_at(0, Selection::new("c1", "BHOPAL")).unwrap();
        assert_eq!(
            controller.scope_for(1).option_type(),
            Some(&OptionType::scope_key("BHOPAL"))
        );
    }

    #[test]
    fn test_reset_and_switch() {
        let mut controller = HierarchyController::new(Hierarchy::curriculum());
        fill(&mut controller);
        controller.reset();
        assert!(controller.selected_path().is_empty());

        fill(&mut controller);
        controller.switch_to(Hierarchy::locations());
        assert_eq!(controller.len(), 2);
        assert_eq!(controller.hierarchy().kind(), &HierarchyKind::Locations);
        assert!(controller.selected_path().is_empty());
    }

    #[test]
    fn test_chain_and_path() {
        let mut controller = HierarchyController::new(Hierarchy::curriculum());
        controller.select_at(0, Selection::new("b1", "CBSE")).unwrap();
        controller.select_at(1, Selection::new("g1", "CLASS_9")).unwrap();

        let chain = controller.chain();
        assert_eq!(chain.len(), 4);
        assert_eq!(chain[0].0, "Board");
        assert_eq!(chain[1].1.map(|s| s.id.as_str()), Some("g1"));
        assert!(chain[2].1.is_none());
        assert_eq!(controller.selected_path().len(), 2);
    }

    #[test]
    fn test_delete_on_path_cuts_chain() {
        let mut controller = HierarchyController::new(Hierarchy::curriculum());
        fill(&mut controller);

        assert!(!controller.on_item_deleted(1, &OptionId::new("unrelated")));
        assert_eq!(controller.selected_path().len(), 4);

        assert!(controller.on_item_deleted(1, &OptionId::new("id-1")));
        assert_eq!(controller.selected_path().len(), 1);
        assert!(controller.scope_for(1).parent_id().is_some());
        assert!(controller.scope_for(2).is_unset());
    }

    #[test]
    fn test_update_on_path() {
        let mut controller = HierarchyController::new(Hierarchy::locations());
        let city = OptionItem::from_payload(
            OptionId::new("c1"),
            crate::domain::OptionPayload::new(OptionType::City, "Bhopal").unwrap(),
        );
        controller.select_at(0, &city).unwrap();
        controller.select_at(1, Selection::new("a1", "MP_NAGAR")).unwrap();

        // Label-only edit keeps the area selection
        let mut relabelled = city.clone();
        relabelled.label = "Bhopal City".to_string();
        assert!(!controller.on_item_updated(0, &relabelled));
        assert_eq!(controller.selection_at(0).unwrap().label, "Bhopal City");
        assert!(controller.selection_at(1).is_some());

        // Code change moves the area tag, so the area selection goes
        let mut recoded = relabelled.clone();
        recoded.value = "BHOPAL_MP".to_string();
        assert!(controller.on_item_updated(0, &recoded));
        assert!(controller.selection_at(1).is_none());
        assert_eq!(
            controller.scope_for(1).option_type(),
            Some(&OptionType::scope_key("BHOPAL_MP"))
        );
    }

    #[test]
    fn test_scope_target_ignores_parent_label() {
        let scope = |id: &str, label: &str| LevelScope::Child {
            option_type: OptionType::Grade,
            parent: Selection {
                label: label.to_string(),
                ..Selection::new(id, "CBSE")
            },
        };
        assert!(scope("b1", "CBSE").same_target(&scope("b1", "Central Board")));
        assert!(!scope("b1", "CBSE").same_target(&scope("b2", "CBSE")));
        assert!(!scope("b1", "CBSE").same_target(&LevelScope::Unset));
        assert!(LevelScope::Unset.same_target(&LevelScope::Unset));
    }
}
