//! Staged menu scripts.
//!
//! Each service request is a fixed sequence of menu actions. Scripts are
//! built once per request from the service kind; nothing is computed from
//! live menu contents.

use super::state::ServiceKind;

/// A single scripted menu action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuStep {
    OpenMenu,
    CloseMenu,
    /// Select a 1-based menu entry.
    SelectOption(u8),
    /// Select the first handling operator, at most once per addon session.
    SelectHandlingOperator,
}

impl MenuStep {
    /// Value written to the menu choice variable for a 1-based option.
    pub fn choice_value(option: u8) -> f64 {
        f64::from(option.saturating_sub(1))
    }
}

/// Ordered menu actions requesting one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuScript {
    kind: ServiceKind,
    steps: Vec<MenuStep>,
}

impl MenuScript {
    /// Build the script for a service kind.
    pub fn for_service(kind: ServiceKind) -> Self {
        let mut steps = vec![MenuStep::CloseMenu, MenuStep::OpenMenu];
        match kind.menu_index() {
            Some(option) => {
                steps.push(MenuStep::SelectOption(option));
                steps.push(MenuStep::SelectHandlingOperator);
            }
            None => {
                steps.push(MenuStep::SelectOption(1));
                steps.push(MenuStep::SelectOption(2));
            }
        }
        steps.push(MenuStep::CloseMenu);
        Self { kind, steps }
    }

    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    pub fn steps(&self) -> &[MenuStep] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boarding_script() {
        let script = MenuScript::for_service(ServiceKind::Boarding);
        assert_eq!(
            script.steps(),
            &[
                MenuStep::CloseMenu,
                MenuStep::OpenMenu,
                MenuStep::SelectOption(4),
                MenuStep::SelectHandlingOperator,
                MenuStep::CloseMenu,
            ]
        );
    }

    #[test]
    fn test_deboarding_script_has_no_operator_step() {
        let script = MenuScript::for_service(ServiceKind::Deboarding);
        assert_eq!(
            script.steps(),
            &[
                MenuStep::CloseMenu,
                MenuStep::OpenMenu,
                MenuStep::SelectOption(1),
                MenuStep::SelectOption(2),
                MenuStep::CloseMenu,
            ]
        );
    }

    #[test]
    fn test_choice_value_is_zero_based() {
        assert_eq!(MenuStep::choice_value(1), 0.0);
        assert_eq!(MenuStep::choice_value(5), 4.0);
    }
}
