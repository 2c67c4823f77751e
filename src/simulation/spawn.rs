//! Group spawn configuration
//!
//! A group is declared once; its device identifiers, speed and offset
//! radius are derived from the record.

use serde::{Deserialize, Serialize};

use crate::core::error::{GroupWalkError, Result};
use crate::core::types::{DeviceId, Time};
use crate::movement::DeviceParams;

/// Convert km/h to m/s
#[inline]
pub fn kmh_to_ms(kmh: f64) -> f64 {
    kmh * 1000.0 / 3600.0
}

/// A group of devices moving together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnGroup {
    /// Group number; devices get identifiers from `capacity * group_id`
    pub group_id: i64,
    /// Number of devices, leader included
    pub group_size: u32,
    /// Followers keep within this offset of the leader (m)
    #[serde(default)]
    pub group_radius: f64,
    /// Walking speed of every member (km/h)
    #[serde(default)]
    pub group_speed_kmh: f64,
    /// Simulation time at which the whole group appears
    #[serde(default)]
    pub start_time: Time,
}

impl SpawnGroup {
    pub fn new(
        group_id: i64,
        group_size: u32,
        group_radius: f64,
        group_speed_kmh: f64,
        start_time: Time,
    ) -> Self {
        Self {
            group_id,
            group_size,
            group_radius,
            group_speed_kmh,
            start_time,
        }
    }

    /// Setup-time check; a malformed group is fatal
    pub fn validate(&self, group_capacity: u64) -> Result<()> {
        let invalid = |reason: String| GroupWalkError::InvalidGroup {
            group_id: self.group_id,
            reason,
        };

        if self.group_id < 0 {
            return Err(invalid("group id must not be negative".into()));
        }
        if self.base_id(group_capacity).is_none() {
            return Err(invalid(format!(
                "identifiers of group {} overflow the id space",
                self.group_id
            )));
        }
        if self.group_size == 0 || u64::from(self.group_size) >= group_capacity {
            return Err(invalid(format!(
                "group size {} outside 1..{}",
                self.group_size,
                group_capacity - 1
            )));
        }
        if !(self.group_radius >= 0.0 && self.group_radius.is_finite()) {
            return Err(invalid(format!("group radius {} must be >= 0", self.group_radius)));
        }
        if !(self.group_speed_kmh >= 0.0 && self.group_speed_kmh.is_finite()) {
            return Err(invalid(format!("group speed {} must be >= 0", self.group_speed_kmh)));
        }
        if !(self.start_time >= 0.0) {
            return Err(invalid(format!("start time {} must be >= 0", self.start_time)));
        }
        Ok(())
    }

    /// Identifiers of the group: leader first, then consecutive followers.
    /// Empty for a group whose identifiers do not fit; `validate` rejects it.
    pub fn device_ids(&self, group_capacity: u64) -> impl Iterator<Item = DeviceId> {
        let (base, size) = match self.base_id(group_capacity) {
            Some(base) => (base, u64::from(self.group_size)),
            None => (0, 0),
        };
        (0..size).map(move |i| DeviceId(base + i))
    }

    /// Leader identifier, `None` when the group's last identifier overflows
    fn base_id(&self, group_capacity: u64) -> Option<u64> {
        let group_id = u64::try_from(self.group_id).ok()?;
        let base = group_capacity.checked_mul(group_id)?;
        base.checked_add(group_capacity.saturating_sub(1))?;
        Some(base)
    }

    /// Parameters shared by every member
    pub fn params(&self) -> DeviceParams {
        DeviceParams {
            max_speed: kmh_to_ms(self.group_speed_kmh),
            offset_radius: self.group_radius,
        }
    }
}
