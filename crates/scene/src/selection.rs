//! Selection state for the flow globe.
//!
//! `SelectionSet` is a deterministic bitset over destination element ids;
//! `SelectionMachine` layers the three-state click protocol on top:
//! no-selection → origin-selected → origin-and-destinations-selected.

use std::collections::BTreeSet;

use foundation::ids::ElementId;
use foundation::math::sphere::LonLat;

use crate::countries::CountryCollection;
use crate::flow::{FlowRecord, PointEntity};

/// Deterministic element-id set backed by a bitset.
///
/// Ordering contract:
/// - Iteration yields element ids in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    words: Vec<u64>,
    len: usize,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.words.clear();
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, element: ElementId) -> bool {
        let (word, bit) = word_bit(element.index());
        self.words
            .get(word)
            .is_some_and(|w| (w & (1u64 << bit)) != 0)
    }

    /// Inserts `element`; returns `true` if the set changed.
    pub fn insert(&mut self, element: ElementId) -> bool {
        let (word, bit) = word_bit(element.index());
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        let mask = 1u64 << bit;
        let w = &mut self.words[word];
        if (*w & mask) != 0 {
            return false;
        }
        *w |= mask;
        self.len += 1;
        true
    }

    /// Removes `element`; returns `true` if the set changed.
    pub fn remove(&mut self, element: ElementId) -> bool {
        let (word, bit) = word_bit(element.index());
        let Some(w) = self.words.get_mut(word) else {
            return false;
        };
        let mask = 1u64 << bit;
        if (*w & mask) == 0 {
            return false;
        }
        *w &= !mask;
        self.len -= 1;
        // Keep the representation canonical so equality stays structural.
        while self.words.last() == Some(&0) {
            self.words.pop();
        }
        true
    }

    /// Idempotent membership toggle; returns whether the element is now in
    /// the set.
    pub fn toggle(&mut self, element: ElementId) -> bool {
        if self.remove(element) {
            false
        } else {
            self.insert(element);
            true
        }
    }

    /// Iterates element ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| {
            let base = (wi as u32) * 64;
            (0..64u32).filter_map(move |bit| {
                ((word >> bit) & 1 == 1).then_some(ElementId(base + bit))
            })
        })
    }
}

fn word_bit(index: u32) -> (usize, u32) {
    ((index / 64) as usize, index % 64)
}

/// What a click handler did to the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    /// State unchanged (e.g. clicking empty background twice).
    Unchanged,
    /// Everything cleared.
    Cleared,
    /// A new anchor origin was chosen; destinations were reset.
    OriginSelected { origin: ElementId },
    /// A destination toggled; `selected` is its new membership.
    DestinationToggled {
        destination: ElementId,
        selected: bool,
    },
    /// An arc selected its origin and destination in one transition.
    ArcSelected {
        origin: ElementId,
        destination: ElementId,
        destination_selected: bool,
    },
    /// A country surface was clicked; highlight follows the click point.
    CountryTouched { country: Option<String> },
}

/// Relationship of one arc to the current selection, for symbology.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ArcEmphasis {
    /// No selection at all: configured default opacity.
    Default,
    /// From the selected origin to a selected destination.
    SelectedPath,
    /// From the selected origin to an unselected destination.
    FromSelectedOrigin,
    /// Unrelated to the selected origin.
    Unrelated,
}

/// The click-driven selection protocol.
///
/// All state lives here; the machine never renders. Country highlight is
/// recomputed from scratch on every change: a country is highlighted iff it
/// contains the last-interacted point (and the interaction was not a
/// deselection).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionMachine {
    selected_origin: Option<ElementId>,
    selected_destinations: SelectionSet,
    affected_countries: BTreeSet<String>,
    last_point: Option<PointEntity>,
}

impl SelectionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_origin(&self) -> Option<ElementId> {
        self.selected_origin
    }

    pub fn destinations(&self) -> &SelectionSet {
        &self.selected_destinations
    }

    pub fn affected_countries(&self) -> &BTreeSet<String> {
        &self.affected_countries
    }

    pub fn last_point(&self) -> Option<&PointEntity> {
        self.last_point.as_ref()
    }

    pub fn has_selection(&self) -> bool {
        self.selected_origin.is_some()
    }

    pub fn is_country_highlighted(&self, name: &str) -> bool {
        self.affected_countries.contains(name)
    }

    /// Point click.
    ///
    /// - Origin point, nothing selected: becomes the anchor origin.
    /// - Origin point, already the anchor: full deselection (documented
    ///   policy for the re-click case).
    /// - Origin point, different anchor: restarts the selection from it.
    /// - Destination point, no anchor yet: becomes the anchor, like the
    ///   source behavior for a first click on any point.
    /// - Destination point, anchor present: toggles membership.
    pub fn click_point(&mut self, point: &PointEntity, countries: &CountryCollection) -> SelectionChange {
        if point.is_origin || self.selected_origin.is_none() {
            if self.selected_origin == Some(point.point.element) {
                self.clear();
                return SelectionChange::Cleared;
            }
            self.selected_origin = Some(point.point.element);
            self.selected_destinations.clear();
            self.update_countries(countries, point.point.position, false);
            self.last_point = Some(point.clone());
            return SelectionChange::OriginSelected {
                origin: point.point.element,
            };
        }

        let selected = self.selected_destinations.toggle(point.point.element);
        self.update_countries(countries, point.point.position, !selected);
        self.last_point = Some(point.clone());
        SelectionChange::DestinationToggled {
            destination: point.point.element,
            selected,
        }
    }

    /// Arc click: origin and destination select atomically.
    ///
    /// If the arc's origin is already the anchor, the destination toggles;
    /// otherwise the selection restarts as {origin, destination}. Country
    /// highlight follows the last-interacted point and is untouched here.
    pub fn click_arc(&mut self, flow: &FlowRecord) -> SelectionChange {
        let origin = flow.origin.element;
        let destination = flow.destination.element;

        let destination_selected = if self.selected_origin == Some(origin) {
            self.selected_destinations.toggle(destination)
        } else {
            self.selected_origin = Some(origin);
            self.selected_destinations.clear();
            self.selected_destinations.insert(destination);
            true
        };

        SelectionChange::ArcSelected {
            origin,
            destination,
            destination_selected,
        }
    }

    /// Country-surface click: re-anchors the highlight at the click point
    /// without touching the origin/destination selection.
    pub fn click_country(
        &mut self,
        at: LonLat,
        countries: &CountryCollection,
    ) -> SelectionChange {
        self.update_countries(countries, at, false);
        SelectionChange::CountryTouched {
            country: self.affected_countries.iter().next().cloned(),
        }
    }

    /// Background click: everything clears.
    pub fn click_background(&mut self) -> SelectionChange {
        if self.selected_origin.is_none()
            && self.selected_destinations.is_empty()
            && self.affected_countries.is_empty()
            && self.last_point.is_none()
        {
            return SelectionChange::Unchanged;
        }
        self.clear();
        SelectionChange::Cleared
    }

    /// Reset to the empty state (home action).
    pub fn clear(&mut self) {
        self.selected_origin = None;
        self.selected_destinations.clear();
        self.affected_countries.clear();
        self.last_point = None;
    }

    /// Arc emphasis under the current selection, as a pure function.
    pub fn classify_arc(&self, flow: &FlowRecord) -> ArcEmphasis {
        let Some(origin) = self.selected_origin else {
            return ArcEmphasis::Default;
        };
        if flow.origin.element != origin {
            return ArcEmphasis::Unrelated;
        }
        if self.selected_destinations.contains(flow.destination.element) {
            ArcEmphasis::SelectedPath
        } else {
            ArcEmphasis::FromSelectedOrigin
        }
    }

    /// Full recompute of the highlighted-country set.
    ///
    /// Not incremental: the set is rebuilt from the click point on every
    /// state change, so it can never drift from the polygon data.
    fn update_countries(&mut self, countries: &CountryCollection, at: LonLat, deselecting: bool) {
        self.affected_countries.clear();
        if deselecting {
            return;
        }
        if let Some(country) = countries.containing(at) {
            self.affected_countries.insert(country.name.clone());
        }
    }

    pub(crate) fn restore_parts(
        &mut self,
        origin: Option<ElementId>,
        destinations: SelectionSet,
        countries: BTreeSet<String>,
        last_point: Option<PointEntity>,
    ) {
        self.selected_origin = origin;
        self.selected_destinations = destinations;
        self.affected_countries = countries;
        self.last_point = last_point;
    }
}
