//! Fleet registry
//!
//! Append-only in-memory vehicle list, seeded with sample rows. Ids are
//! sequential and never reused since nothing is ever removed.

use parking_lot::RwLock;
use tracing::info;

use crate::types::{CreateVehicleRequest, Vehicle};

const DEFAULT_STATUS: &str = "Active";

pub struct FleetRegistry {
    vehicles: RwLock<Vec<Vehicle>>,
}

impl FleetRegistry {
    #[cfg(test)]
    pub fn new() -> Self {
        Self {
            vehicles: RwLock::new(Vec::new()),
        }
    }

    /// Registry holding the three sample trucks
    pub fn seeded() -> Self {
        let seed = [
            ("Truck 001", "Delivery Van", "Active", "2023-05-15"),
            ("Truck 002", "Box Truck", "In Maintenance", "2023-06-20"),
            ("Truck 003", "Refrigerated Truck", "Active", "2023-04-30"),
        ];

        let vehicles = seed
            .iter()
            .enumerate()
            .map(|(i, (name, vehicle_type, status, last_maintenance))| Vehicle {
                id: i as u32 + 1,
                name: name.to_string(),
                vehicle_type: vehicle_type.to_string(),
                status: status.to_string(),
                last_maintenance: last_maintenance.to_string(),
            })
            .collect();

        Self {
            vehicles: RwLock::new(vehicles),
        }
    }

    pub fn list(&self) -> Vec<Vehicle> {
        self.vehicles.read().clone()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.vehicles.read().len()
    }

    pub fn add(&self, request: CreateVehicleRequest) -> anyhow::Result<Vehicle> {
        let name = request.name.trim();
        if name.is_empty() {
            anyhow::bail!("Vehicle name is required");
        }

        let status = request
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_STATUS);

        let mut vehicles = self.vehicles.write();
        let vehicle = Vehicle {
            id: vehicles.len() as u32 + 1,
            name: name.to_string(),
            vehicle_type: request.vehicle_type.trim().to_string(),
            status: status.to_string(),
            last_maintenance: request.last_maintenance.trim().to_string(),
        };
        vehicles.push(vehicle.clone());

        info!("Added vehicle {} '{}'", vehicle.id, vehicle.name);
        Ok(vehicle)
    }
}

impl Default for FleetRegistry {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str) -> CreateVehicleRequest {
        CreateVehicleRequest {
            name: name.to_string(),
            vehicle_type: "Flatbed".to_string(),
            status: None,
            last_maintenance: "2024-02-01".to_string(),
        }
    }

    #[test]
    fn test_seeded_fleet() {
        let fleet = FleetRegistry::seeded();
        let vehicles = fleet.list();

        assert_eq!(vehicles.len(), 3);
        assert_eq!(vehicles[1].name, "Truck 002");
        assert_eq!(vehicles[1].status, "In Maintenance");
        assert_eq!(vehicles.iter().map(|v| v.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_add_assigns_next_id_and_default_status() {
        let fleet = FleetRegistry::seeded();

        let added = fleet.add(create("Truck 004")).unwrap();

        assert_eq!(added.id, 4);
        assert_eq!(added.status, "Active");
        assert_eq!(fleet.list().last(), Some(&added));
    }

    #[test]
    fn test_add_keeps_explicit_status() {
        let fleet = FleetRegistry::new();
        let mut request = create("Van 1");
        request.status = Some("Out of Service".to_string());

        let added = fleet.add(request).unwrap();
        assert_eq!(added.id, 1);
        assert_eq!(added.status, "Out of Service");
    }

    #[test]
    fn test_add_rejects_blank_name() {
        let fleet = FleetRegistry::seeded();
        assert!(fleet.add(create("  ")).is_err());
        assert_eq!(fleet.len(), 3);
    }

    #[test]
    fn test_ids_are_sequential() {
        let fleet = FleetRegistry::seeded();
        let a = fleet.add(create("A")).unwrap();
        let b = fleet.add(create("B")).unwrap();
        assert_eq!((a.id, b.id), (4, 5));
    }
}
