//! Navigation Subsystem

use crate::telemetry::Position;

/// Origin and destination tracking
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation {
    /// Home point, fixed at (0, 0)
    origin: Position,
    /// Last requested target
    destination: Position,
}

impl Default for Navigation {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigation {
    /// Navigation anchored at (0, 0) with the destination on the origin
    pub fn new() -> Self {
        Self {
            origin: Position::ORIGIN,
            destination: Position::ORIGIN,
        }
    }

    pub fn origin(&self) -> Position {
        self.origin
    }

    pub fn set_destination(&mut self, x: f64, y: f64) {
        self.destination = Position::new(x, y);
    }

    /// Point the destination back at the origin and return it
    pub fn return_to_home(&mut self) -> Position {
        self.destination = self.origin;
        self.destination
    }

    pub fn current_destination(&self) -> Position {
        self.destination
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_defaults_to_origin() {
        let nav = Navigation::new();
        assert_eq!(nav.current_destination(), nav.origin());
        assert_eq!(nav.origin(), Position::ORIGIN);
    }

    #[test]
    fn test_return_to_home() {
        let mut nav = Navigation::new();
        nav.set_destination(120.0, -45.5);
        assert_eq!(nav.current_destination(), Position::new(120.0, -45.5));

        assert_eq!(nav.return_to_home(), Position::ORIGIN);
        assert_eq!(nav.current_destination(), Position::ORIGIN);
    }
}
