//! Blood banks, hospitals and NGOs shown on the home page map.

use serde::Serialize;

use crate::directory::BloodGroup;
use crate::directory::BloodGroup::*;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    BloodBank,
    Hospital,
    Ngo,
}

impl LocationKind {
    pub fn label(self) -> &'static str {
        match self {
            LocationKind::BloodBank => "Blood Bank",
            LocationKind::Hospital => "Hospital",
            LocationKind::Ngo => "NGO",
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Location {
    pub id: u32,
    pub name: &'static str,
    pub address: &'static str,
    pub contact: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "type")]
    pub kind: LocationKind,
    pub operating_hours: &'static str,
    pub website: &'static str,
    pub blood_groups: &'static [BloodGroup],
    pub services: &'static [&'static str],
}

impl Location {
    pub fn directions_url(&self) -> String {
        format!(
            "https://www.google.com/maps/dir/?api=1&destination={},{}",
            self.latitude, self.longitude
        )
    }

    pub fn website_url(&self) -> String {
        format!("https://{}", self.website)
    }
}

/// Map marker payload: the location plus its derived links.
#[derive(Serialize, Debug, Clone)]
pub struct Marker<'a> {
    #[serde(flatten)]
    pub location: &'a Location,
    pub label: &'static str,
    pub directions_url: String,
    pub website_url: String,
}

impl<'a> From<&'a Location> for Marker<'a> {
    fn from(location: &'a Location) -> Self {
        Self {
            location,
            label: location.kind.label(),
            directions_url: location.directions_url(),
            website_url: location.website_url(),
        }
    }
}

/// Initial map center and zoom.
pub const MAP_CENTER: (f64, f64) = (20.2961, 85.8245);
pub const MAP_ZOOM: u8 = 11;

const LOCATIONS: [Location; 6] = [
    Location {
        id: 1,
        name: "Central Red Cross Blood Bank",
        address: "Red Cross Bhawan, Unit-IX, Bhubaneswar",
        contact: "0674-2375007",
        latitude: 20.2961,
        longitude: 85.8245,
        kind: LocationKind::BloodBank,
        operating_hours: "24x7",
        website: "www.odisharedcross.org",
        blood_groups: &[APositive, ANegative, BPositive, BNegative, OPositive, ONegative, AbPositive, AbNegative],
        services: &["Blood Donation", "Component Separation", "Blood Testing"],
    },
    Location {
        id: 2,
        name: "Capital Hospital",
        address: "Unit-6, Bhubaneswar",
        contact: "0674-2391983",
        latitude: 20.2696,
        longitude: 85.8443,
        kind: LocationKind::Hospital,
        operating_hours: "24x7",
        website: "health.odisha.gov.in",
        blood_groups: &[APositive, BPositive, OPositive, AbPositive],
        services: &["Emergency Care", "Blood Bank", "ICU"],
    },
    Location {
        id: 3,
        name: "SCB Medical College",
        address: "SCB Medical College, Cuttack",
        contact: "0671-2414080",
        latitude: 20.4686,
        longitude: 85.8921,
        kind: LocationKind::Hospital,
        operating_hours: "24x7",
        website: "scbmch.nic.in",
        blood_groups: &[APositive, ANegative, BPositive, BNegative, OPositive, ONegative, AbPositive, AbNegative],
        services: &["Blood Bank", "Emergency Services", "Specialized Care"],
    },
    Location {
        id: 4,
        name: "Kalinga Hospital Blood Bank",
        address: "KIIT Road, Patia, Bhubaneswar",
        contact: "0674-2725555",
        latitude: 20.3506,
        longitude: 85.8144,
        kind: LocationKind::BloodBank,
        operating_hours: "24x7",
        website: "kalingahospital.com",
        blood_groups: &[APositive, BPositive, OPositive, AbPositive, ONegative],
        services: &["Blood Donation", "Platelet Separation", "Emergency Supply"],
    },
    Location {
        id: 5,
        name: "Life Line Blood Bank",
        address: "Saheed Nagar, Bhubaneswar",
        contact: "0674-2544444",
        latitude: 20.2890,
        longitude: 85.8442,
        kind: LocationKind::BloodBank,
        operating_hours: "24x7",
        website: "lifelinebloodbank.org",
        blood_groups: &[APositive, BPositive, OPositive, AbPositive, ONegative],
        services: &["Blood Donation", "Component Separation"],
    },
    Location {
        id: 6,
        name: "Red Cross NGO Center",
        address: "Master Canteen, Bhubaneswar",
        contact: "0674-2533333",
        latitude: 20.2720,
        longitude: 85.8410,
        kind: LocationKind::Ngo,
        operating_hours: "9 AM - 6 PM",
        website: "redcrossngo.org",
        blood_groups: &[],
        services: &["Blood Donation Camps", "Awareness Programs"],
    },
];

pub fn catalog() -> &'static [Location] {
    &LOCATIONS
}

pub fn markers() -> Vec<Marker<'static>> {
    catalog().iter().map(Marker::from).collect()
}
