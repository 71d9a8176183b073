//! Stationary food items.

use serde::{Deserialize, Serialize};

/// Unique plant identifier
pub type PlantId = u64;

/// Default plant radius
pub const PLANT_SIZE: f64 = 3.0;

/// A plant in the simulation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub id: PlantId,
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

/// Serializable view of a plant for observers and renderers
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlantSnapshot {
    pub id: PlantId,
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

impl Plant {
    pub fn new(id: PlantId, x: f64, y: f64) -> Self {
        Self::with_size(id, x, y, PLANT_SIZE)
    }

    pub fn with_size(id: PlantId, x: f64, y: f64, size: f64) -> Self {
        Self { id, x, y, size }
    }

    #[inline]
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        (self.x - x).hypot(self.y - y)
    }

    pub fn snapshot(&self) -> PlantSnapshot {
        PlantSnapshot {
            id: self.id,
            x: self.x,
            y: self.y,
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plant_creation() {
        let plant = Plant::new(7, 12.0, 30.0);
        assert_eq!(plant.id, 7);
        assert_eq!(plant.size, PLANT_SIZE);
        assert_eq!(plant.snapshot().x, 12.0);
    }

    #[test]
    fn test_distance() {
        let plant = Plant::new(1, 3.0, 4.0);
        assert_eq!(plant.distance_to(0.0, 0.0), 5.0);
    }
}
