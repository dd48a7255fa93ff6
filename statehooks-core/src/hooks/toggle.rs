//! Boolean toggle.

use crate::error::Result;
use crate::scope::Scope;
use crate::state::{ReadState, StateCell};

#[derive(Debug, Clone)]
pub struct Toggle {
    cell: StateCell<bool>,
}

impl Toggle {
    pub fn new(cell: StateCell<bool>) -> Self {
        Self { cell }
    }

    pub fn get(&self) -> bool {
        self.cell.get()
    }

    /// Flip the value.
    pub fn toggle(&self) {
        self.cell.update(|on| !on);
    }

    pub fn set(&self, on: bool) {
        self.cell.set(on);
    }

    pub fn read_only(&self) -> ReadState<bool> {
        self.cell.read_only()
    }
}

impl Scope {
    /// Declare a boolean toggle.
    pub fn use_toggle(&self, initial: bool) -> Result<Toggle> {
        self.use_state(initial).map(Toggle::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_and_sets() {
        let scope = Scope::detached();
        let toggle = scope.render(|scope| scope.use_toggle(false)).unwrap();

        toggle.toggle();
        assert!(toggle.get());

        toggle.toggle();
        assert!(!toggle.get());

        toggle.set(true);
        let again = scope.render(|scope| scope.use_toggle(false)).unwrap();
        assert!(again.get());
    }
}
