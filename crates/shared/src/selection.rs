//! Which venue is selected, as a pure `(state, event) -> (state, effects)`
//! machine. The caller executes the effects against its map layers.

/// Marker icon derived from the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerIcon {
    /// Nothing selected.
    Default,
    /// The selected venue.
    Selected,
    /// Any other venue while something is selected.
    Dot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapEvent {
    /// A venue marker was clicked; carries its city key.
    MarkerClicked(String),
    /// The map background was clicked.
    MapClicked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenPopup(String),
    ClosePopup(String),
    ClearHighlights,
    /// Compute origin highlights for `city`. The result must be dropped
    /// unless `generation` is still current when it arrives.
    RequestHighlights { city: String, generation: u64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: Option<String>,
    generation: u64,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The popup follows the selection one-to-one.
    pub fn open_popup(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_idle(&self) -> bool {
        self.selected.is_none()
    }

    /// Whether a highlight computation started at `generation` may still be
    /// applied.
    pub fn is_current(&self, generation: u64) -> bool {
        self.selected.is_some() && self.generation == generation
    }

    pub fn marker_icon(&self, key: &str) -> MarkerIcon {
        match &self.selected {
            None => MarkerIcon::Default,
            Some(sel) if sel == key => MarkerIcon::Selected,
            Some(_) => MarkerIcon::Dot,
        }
    }

    /// Stacking offset: the selected marker is drawn on top.
    pub fn z_offset(&self, key: &str) -> i32 {
        if self.marker_icon(key) == MarkerIcon::Selected {
            1000
        } else {
            0
        }
    }
}

/// Apply one event.
pub fn transition(state: &SelectionState, event: MapEvent) -> (SelectionState, Vec<Effect>) {
    match (state.selected.as_deref(), event) {
        (Some(current), MapEvent::MarkerClicked(key)) if current == key => {
            let next = SelectionState {
                selected: None,
                generation: state.generation + 1,
            };
            (next, vec![Effect::ClosePopup(key), Effect::ClearHighlights])
        }
        (current, MapEvent::MarkerClicked(key)) => {
            let generation = state.generation + 1;
            let mut effects = Vec::with_capacity(4);
            if let Some(prev) = current {
                effects.push(Effect::ClosePopup(prev.to_string()));
            }
            effects.push(Effect::OpenPopup(key.clone()));
            effects.push(Effect::ClearHighlights);
            effects.push(Effect::RequestHighlights {
                city: key.clone(),
                generation,
            });
            let next = SelectionState {
                selected: Some(key),
                generation,
            };
            (next, effects)
        }
        (None, MapEvent::MapClicked) => (state.clone(), vec![Effect::ClearHighlights]),
        (Some(current), MapEvent::MapClicked) => {
            let effects = vec![Effect::ClosePopup(current.to_string()), Effect::ClearHighlights];
            let next = SelectionState {
                selected: None,
                generation: state.generation + 1,
            };
            (next, effects)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 3] = ["madrid", "barcelona", "sevilla"];

    fn click(state: &SelectionState, key: &str) -> (SelectionState, Vec<Effect>) {
        transition(state, MapEvent::MarkerClicked(key.to_string()))
    }

    fn selected_icons(state: &SelectionState) -> usize {
        KEYS.iter()
            .filter(|k| state.marker_icon(k) == MarkerIcon::Selected)
            .count()
    }

    #[test]
    fn test_initial_state_all_default_icons() {
        let state = SelectionState::new();
        assert!(state.is_idle());
        assert!(KEYS.iter().all(|k| state.marker_icon(k) == MarkerIcon::Default));
    }

    #[test]
    fn test_select_from_idle() {
        let (state, effects) = click(&SelectionState::new(), "madrid");
        assert_eq!(state.selected(), Some("madrid"));
        assert_eq!(state.open_popup(), Some("madrid"));
        assert_eq!(
            effects,
            vec![
                Effect::OpenPopup("madrid".to_string()),
                Effect::ClearHighlights,
                Effect::RequestHighlights {
                    city: "madrid".to_string(),
                    generation: state.generation()
                },
            ]
        );
        assert_eq!(state.marker_icon("madrid"), MarkerIcon::Selected);
        assert_eq!(state.marker_icon("barcelona"), MarkerIcon::Dot);
        assert_eq!(state.z_offset("madrid"), 1000);
        assert_eq!(state.z_offset("barcelona"), 0);
    }

    #[test]
    fn test_clicking_open_marker_returns_to_idle() {
        let (state, _) = click(&SelectionState::new(), "madrid");
        let (state, effects) = click(&state, "madrid");
        assert!(state.is_idle());
        assert_eq!(
            effects,
            vec![Effect::ClosePopup("madrid".to_string()), Effect::ClearHighlights]
        );
        assert!(KEYS.iter().all(|k| state.marker_icon(k) == MarkerIcon::Default));
    }

    #[test]
    fn test_switching_selection_goes_direct() {
        let (a, _) = click(&SelectionState::new(), "madrid");
        let (b, effects) = click(&a, "barcelona");
        assert_eq!(b.selected(), Some("barcelona"));
        assert_eq!(effects[0], Effect::ClosePopup("madrid".to_string()));
        assert_eq!(effects[1], Effect::OpenPopup("barcelona".to_string()));
        assert!(effects.contains(&Effect::ClearHighlights));
        assert_eq!(selected_icons(&b), 1);
        assert_eq!(b.marker_icon("madrid"), MarkerIcon::Dot);
    }

    #[test]
    fn test_never_two_selected_markers() {
        let mut state = SelectionState::new();
        for key in ["madrid", "barcelona", "sevilla", "sevilla", "madrid", "barcelona"] {
            let (next, _) = click(&state, key);
            state = next;
            assert!(selected_icons(&state) <= 1);
        }
    }

    #[test]
    fn test_map_click_clears_selection() {
        let (state, _) = click(&SelectionState::new(), "sevilla");
        let (state, effects) = transition(&state, MapEvent::MapClicked);
        assert!(state.is_idle());
        assert_eq!(
            effects,
            vec![Effect::ClosePopup("sevilla".to_string()), Effect::ClearHighlights]
        );
    }

    #[test]
    fn test_map_click_when_idle_is_noop_clear() {
        let idle = SelectionState::new();
        let (state, effects) = transition(&idle, MapEvent::MapClicked);
        assert_eq!(state, idle);
        assert_eq!(effects, vec![Effect::ClearHighlights]);
    }

    #[test]
    fn test_superseded_generation_is_stale() {
        let (a, _) = click(&SelectionState::new(), "madrid");
        let gen_a = a.generation();
        assert!(a.is_current(gen_a));
        let (b, _) = click(&a, "barcelona");
        assert!(!b.is_current(gen_a));
        assert!(b.is_current(b.generation()));
    }

    #[test]
    fn test_deselect_invalidates_pending_highlights() {
        let (a, _) = click(&SelectionState::new(), "madrid");
        let gen_a = a.generation();
        let (idle, _) = transition(&a, MapEvent::MapClicked);
        assert!(!idle.is_current(gen_a));
    }

    #[test]
    fn test_reselecting_same_city_gets_new_generation() {
        let (a, _) = click(&SelectionState::new(), "madrid");
        let (idle, _) = click(&a, "madrid");
        let (again, _) = click(&idle, "madrid");
        assert!(!again.is_current(a.generation()));
    }
}
