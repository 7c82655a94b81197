use std::ops::Deref;

use super::Allocation;
use super::Instance;
use super::InstanceError;
use super::ValueFunction;

/// An [`Instance`] in which every fire-up of a server costs `gamma` on top of the server itself.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceFu {
    instance: Instance,
    gamma: f64,
}

impl InstanceFu {
    /// Attaches the fire-up weight `gamma` to `instance`.
    pub fn extend(instance: Instance, gamma: f64) -> Result<InstanceFu, InstanceError> {
        if !gamma.is_finite() || gamma < 0.0 {
            return Err(InstanceError::InvalidGamma(gamma));
        }

        Ok(InstanceFu { instance, gamma })
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn into_instance(self) -> Instance {
        self.instance
    }

    pub fn sorted(&self) -> InstanceFu {
        InstanceFu {
            instance: self.instance.sorted(),
            gamma: self.gamma,
        }
    }

    pub fn sub(&self, subset: &[usize]) -> InstanceFu {
        InstanceFu {
            instance: self.instance.sub(subset),
            gamma: self.gamma,
        }
    }
}

impl Deref for InstanceFu {
    type Target = Instance;

    fn deref(&self) -> &Self::Target {
        &self.instance
    }
}

impl ValueFunction for InstanceFu {
    /// The number of used servers plus `gamma` times the number of fire-ups.
    fn compute_value(&self, allocation: &Allocation) -> f64 {
        self.instance.compute_value(allocation)
            + self.gamma * self.instance.count_fire_ups(allocation) as f64
    }
}
