// Parameter selection state
use crate::domain::parameter::ParameterCatalog;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
    #[error("selection must contain at least one parameter")]
    Empty,
}

/// Active parameters in insertion order (drives legend and color assignment).
///
/// Never empty. Turning multi mode off keeps whatever is selected; the next
/// toggle in single mode collapses the set to the toggled id.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    active: Vec<String>,
    multi_mode: bool,
}

impl SelectionState {
    pub fn new(initial: &str) -> Self {
        Self {
            active: vec![initial.to_string()],
            multi_mode: false,
        }
    }

    /// Build from a configured list, validating every id against the catalog
    pub fn from_ids(
        ids: &[String],
        multi_mode: bool,
        catalog: &ParameterCatalog,
    ) -> Result<Self, SelectionError> {
        let mut active: Vec<String> = Vec::new();
        for id in ids {
            if !catalog.contains(id) {
                return Err(SelectionError::UnknownParameter(id.clone()));
            }
            if !active.contains(id) {
                active.push(id.clone());
            }
        }

        if active.is_empty() {
            return Err(SelectionError::Empty);
        }
        if !multi_mode {
            active.truncate(1);
        }

        Ok(Self { active, multi_mode })
    }

    /// Returns whether the active set changed
    pub fn toggle(&mut self, parameter_id: &str) -> bool {
        if !self.multi_mode {
            if self.active.len() == 1 && self.active[0] == parameter_id {
                return false;
            }
            self.active = vec![parameter_id.to_string()];
            return true;
        }

        match self.active.iter().position(|id| id == parameter_id) {
            Some(_) if self.active.len() == 1 => false,
            Some(idx) => {
                self.active.remove(idx);
                true
            }
            None => {
                self.active.push(parameter_id.to_string());
                true
            }
        }
    }

    /// Catalog-checked toggle
    pub fn toggle_checked(
        &mut self,
        parameter_id: &str,
        catalog: &ParameterCatalog,
    ) -> Result<bool, SelectionError> {
        if !catalog.contains(parameter_id) {
            return Err(SelectionError::UnknownParameter(parameter_id.to_string()));
        }
        Ok(self.toggle(parameter_id))
    }

    pub fn set_multi_mode(&mut self, enabled: bool) {
        self.multi_mode = enabled;
    }

    pub fn multi_mode(&self) -> bool {
        self.multi_mode
    }

    pub fn active(&self) -> &[String] {
        &self.active
    }

    pub fn primary(&self) -> &str {
        &self.active[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_mode_replaces_selection() {
        let mut selection = SelectionState::new("hardness");
        assert!(selection.toggle("weight"));
        assert_eq!(selection.active(), ["weight"]);
        assert!(!selection.toggle("weight"));
        assert_eq!(selection.active(), ["weight"]);
    }

    #[test]
    fn test_multi_mode_appends_and_removes() {
        let mut selection = SelectionState::new("hardness");
        selection.set_multi_mode(true);
        assert!(selection.toggle("yield_percent"));
        assert!(selection.toggle("weight"));
        assert_eq!(selection.active(), ["hardness", "yield_percent", "weight"]);

        assert!(selection.toggle("yield_percent"));
        assert_eq!(selection.active(), ["hardness", "weight"]);

        // Re-adding goes to the end, keeping earlier colors stable
        assert!(selection.toggle("yield_percent"));
        assert_eq!(selection.active(), ["hardness", "weight", "yield_percent"]);
    }

    #[test]
    fn test_toggle_never_empties_selection() {
        let mut selection = SelectionState::new("hardness");
        selection.set_multi_mode(true);
        assert!(!selection.toggle("hardness"));
        assert_eq!(selection.active(), ["hardness"]);

        selection.set_multi_mode(false);
        assert!(!selection.toggle("hardness"));
        assert_eq!(selection.active(), ["hardness"]);
    }

    #[test]
    fn test_disabling_multi_mode_keeps_selection() {
        let mut selection = SelectionState::new("hardness");
        selection.set_multi_mode(true);
        selection.toggle("yield_percent");
        selection.set_multi_mode(false);
        assert_eq!(selection.active(), ["hardness", "yield_percent"]);

        // Next single-mode toggle collapses
        assert!(selection.toggle("yield_percent"));
        assert_eq!(selection.active(), ["yield_percent"]);
    }

    #[test]
    fn test_from_ids_validates_against_catalog() {
        let catalog = ParameterCatalog::builtin();
        let ids = vec!["hardness".to_string(), "weight".to_string(), "hardness".to_string()];

        let multi = SelectionState::from_ids(&ids, true, &catalog).unwrap();
        assert_eq!(multi.active(), ["hardness", "weight"]);

        let single = SelectionState::from_ids(&ids, false, &catalog).unwrap();
        assert_eq!(single.active(), ["hardness"]);

        assert_eq!(
            SelectionState::from_ids(&["ph".to_string()], true, &catalog),
            Err(SelectionError::UnknownParameter("ph".into()))
        );
        assert_eq!(
            SelectionState::from_ids(&[], true, &catalog),
            Err(SelectionError::Empty)
        );
    }

    #[test]
    fn test_toggle_checked_rejects_unknown() {
        let catalog = ParameterCatalog::builtin();
        let mut selection = SelectionState::new("hardness");
        assert_eq!(
            selection.toggle_checked("ph", &catalog),
            Err(SelectionError::UnknownParameter("ph".into()))
        );
        assert_eq!(selection.active(), ["hardness"]);
    }
}
