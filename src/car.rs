//! The car record driven by the shell.

use std::fmt;

/// A car carrying passengers.
///
/// Capacities are stored but never enforced; `enter`, `leave`, `fuel` and `drive`
/// are placeholders that leave the record untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Car {
    /// Passengers currently inside.
    pub pass: i32,
    pub pass_max: i32,
    /// Fuel in the tank.
    pub gas: i32,
    pub gas_max: i32,
    /// Distance driven so far.
    pub km: i32,
}

impl Car {
    /// Empty car with the given capacities.
    pub fn new(pass_max: i32, gas_max: i32) -> Self {
        Car {
            pass_max,
            gas_max,
            ..Default::default()
        }
    }

    pub fn enter(&mut self) {}

    pub fn leave(&mut self) {}

    pub fn fuel(&mut self, _gas: i32) {}

    pub fn drive(&mut self, _km: i32) {}
}

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pass: {}, gas: {}, km: {}", self.pass, self.gas, self.km)
    }
}
