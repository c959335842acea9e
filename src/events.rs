//! Donation drives and awareness events listed on the events page.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    BloodDonation,
    Awareness,
    Mixed,
}

impl EventType {
    pub const ALL: [EventType; 3] = [
        EventType::BloodDonation,
        EventType::Awareness,
        EventType::Mixed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventType::BloodDonation => "blood_donation",
            EventType::Awareness => "awareness",
            EventType::Mixed => "mixed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EventType::BloodDonation => "Blood Donation Camps",
            EventType::Awareness => "Awareness Programs",
            EventType::Mixed => "Mixed Events",
        }
    }

    /// `all`, empty or unknown selections mean every type.
    pub fn from_selection(raw: Option<&str>) -> Option<EventType> {
        let raw = raw?.trim();
        EventType::ALL.into_iter().find(|t| t.as_str() == raw)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Event {
    pub id: u32,
    pub title: &'static str,
    pub organizer: &'static str,
    pub date: &'static str,
    pub time: &'static str,
    pub location: &'static str,
    pub description: &'static str,
    pub image: &'static str,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub expected_donors: u32,
}

impl Event {
    pub fn share_text(&self) -> String {
        format!(
            "Join us for {} at {} on {}",
            self.title, self.location, self.date
        )
    }
}

const EVENTS: [Event; 5] = [
    Event {
        id: 1,
        title: "Mega Blood Donation Drive",
        organizer: "Red Cross Society",
        date: "2025-02-12",
        time: "9:00 AM - 4:00 PM",
        location: "NMIET, Bhubaneswar",
        description: "Annual mega blood donation camp with free health checkups.",
        image: "https://images.unsplash.com/photo-1615461066841-6116e61058f4?auto=format&fit=crop&w=800&q=80",
        kind: EventType::BloodDonation,
        expected_donors: 200,
    },
    Event {
        id: 2,
        title: "Blood Donation Awareness Workshop",
        organizer: "Kalinga Hospital",
        date: "2024-03-28",
        time: "11:00 AM - 2:00 PM",
        location: "Esplanade One Mall, Rasulgarh, Bhubaneswar",
        description: "Learn about the importance of blood donation and its impact on saving lives.",
        image: "https://images.unsplash.com/photo-1631815589968-fdb09a223b1e?auto=format&fit=crop&w=800&q=80",
        kind: EventType::Awareness,
        expected_donors: 100,
    },
    Event {
        id: 3,
        title: "Emergency Blood Drive",
        organizer: "SCB Medical College",
        date: "2024-03-30",
        time: "8:00 AM - 6:00 PM",
        location: "SCB Medical College, Cuttack",
        description: "Emergency blood donation drive to replenish critical blood types.",
        image: "https://images.unsplash.com/photo-1579154204601-01588f351e67?auto=format&fit=crop&w=800&q=80",
        kind: EventType::BloodDonation,
        expected_donors: 150,
    },
    Event {
        id: 4,
        title: "Healthcare & Blood Donation Mela",
        organizer: "District Health Society",
        date: "2024-04-05",
        time: "10:00 AM - 5:00 PM",
        location: "Town Hall, Puri",
        description: "Combined healthcare camp and blood donation drive with free medical consultations.",
        image: "https://images.unsplash.com/photo-1584362917165-526a968579e8?auto=format&fit=crop&w=800&q=80",
        kind: EventType::Mixed,
        expected_donors: 300,
    },
    Event {
        id: 5,
        title: "Youth Blood Donation Initiative",
        organizer: "Utkal University",
        date: "2024-04-10",
        time: "9:00 AM - 3:00 PM",
        location: "Utkal University Campus, Bhubaneswar",
        description: "Special blood donation drive focusing on youth participation.",
        image: "https://images.unsplash.com/photo-1612277795421-9bc7706a4a34?auto=format&fit=crop&w=800&q=80",
        kind: EventType::BloodDonation,
        expected_donors: 250,
    },
];

pub fn catalog() -> &'static [Event] {
    &EVENTS
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct EventParams {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventFilter {
    pub search: String,
    pub kind: Option<EventType>,
}

impl EventFilter {
    pub fn from_params(params: &EventParams) -> Self {
        Self {
            search: params.q.clone().unwrap_or_default(),
            kind: EventType::from_selection(params.kind.as_deref()),
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = needle.is_empty()
            || event.title.to_lowercase().contains(&needle)
            || event.location.to_lowercase().contains(&needle)
            || event.description.to_lowercase().contains(&needle);
        let matches_kind = self.kind.map_or(true, |kind| event.kind == kind);
        matches_search && matches_kind
    }
}

pub fn filter_events<'a>(events: &'a [Event], filter: &EventFilter) -> Vec<&'a Event> {
    events.iter().filter(|e| filter.matches(e)).collect()
}
