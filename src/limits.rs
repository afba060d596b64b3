//! Host-aware bounds for the numeric properties
//!
//! The cpu and memory sliders run from a fixed minimum up to what the host
//! has; the disk stepper covers a fixed window above its minimum.

use std::fmt;
use sysinfo::{System, SystemExt};
use thiserror::Error;

use crate::constants::{DISK_SIZE_RANGE_GIB, MINIMUM_CPUS, MINIMUM_DISK_SIZE_GIB, MINIMUM_MEMORY_MIB};
use crate::models::{ConfigProperty, ConfigValue};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{property} must be between {min} and {max}, got {value}")]
pub struct LimitError {
    pub property: ConfigProperty,
    pub value: i64,
    pub min: i64,
    pub max: i64,
}

/// Inclusive range for one numeric property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: i64,
    pub max: i64,
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditLimits {
    pub cpus: Bounds,
    pub memory_mib: Bounds,
    pub disk_size_gib: Bounds,
}

impl EditLimits {
    /// Limits for a host with `cpu_count` logical cpus and `memory_mib` of RAM.
    ///
    /// A host smaller than the minimums gets a one-value range at the minimum.
    pub fn for_host(cpu_count: i64, memory_mib: i64) -> Self {
        Self {
            cpus: Bounds {
                min: MINIMUM_CPUS,
                max: cpu_count.max(MINIMUM_CPUS),
            },
            memory_mib: Bounds {
                min: MINIMUM_MEMORY_MIB,
                max: memory_mib.max(MINIMUM_MEMORY_MIB),
            },
            disk_size_gib: Bounds {
                min: MINIMUM_DISK_SIZE_GIB,
                max: MINIMUM_DISK_SIZE_GIB + DISK_SIZE_RANGE_GIB,
            },
        }
    }

    /// Probe the running host
    pub fn detect() -> Self {
        let mut system = System::new();
        system.refresh_memory();
        system.refresh_cpu();

        let cpu_count = system.cpus().len() as i64;
        let memory_mib = (system.total_memory() / 1_048_576) as i64;
        Self::for_host(cpu_count, memory_mib)
    }

    pub fn bounds(&self, property: ConfigProperty) -> Option<Bounds> {
        match property {
            ConfigProperty::Cpus => Some(self.cpus),
            ConfigProperty::Memory => Some(self.memory_mib),
            ConfigProperty::DiskSize => Some(self.disk_size_gib),
            _ => None,
        }
    }

    /// Reject numeric values outside the slider/stepper range
    pub fn check(&self, property: ConfigProperty, value: &ConfigValue) -> Result<(), LimitError> {
        let (Some(bounds), ConfigValue::Integer(value)) = (self.bounds(property), value) else {
            return Ok(());
        };

        if *value < bounds.min || *value > bounds.max {
            return Err(LimitError {
                property,
                value: *value,
                min: bounds.min,
                max: bounds.max,
            });
        }
        Ok(())
    }
}
