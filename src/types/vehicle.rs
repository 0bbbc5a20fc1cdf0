use serde::{Deserialize, Serialize};

/// Vehicle entity - one row of the fleet table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub status: String,
    pub last_maintenance: String,
}

/// Request to add a vehicle to the fleet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleRequest {
    pub name: String,
    #[serde(rename = "type", default)]
    pub vehicle_type: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub last_maintenance: String,
}

/// Response for list of vehicles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleListResponse {
    pub items: Vec<Vehicle>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_vehicle_request_deserialize() {
        let json = r#"{
            "name": "Truck 004",
            "type": "Flatbed",
            "status": "Active",
            "lastMaintenance": "2024-01-10"
        }"#;

        let request: CreateVehicleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.name, "Truck 004");
        assert_eq!(request.vehicle_type, "Flatbed");
        assert_eq!(request.last_maintenance, "2024-01-10");
    }

    #[test]
    fn test_create_vehicle_request_minimal() {
        let json = r#"{"name": "Truck 005"}"#;

        let request: CreateVehicleRequest = serde_json::from_str(json).unwrap();
        assert!(request.status.is_none());
        assert!(request.vehicle_type.is_empty());
    }

    #[test]
    fn test_vehicle_serialize() {
        let vehicle = Vehicle {
            id: 1,
            name: "Truck 001".to_string(),
            vehicle_type: "Delivery Van".to_string(),
            status: "Active".to_string(),
            last_maintenance: "2023-05-15".to_string(),
        };

        let json = serde_json::to_string(&vehicle).unwrap();
        assert!(json.contains("\"type\":\"Delivery Van\""));
        assert!(json.contains("\"lastMaintenance\":\"2023-05-15\""));
    }
}
