use crate::models::{city_key, LatLng, VenueRow};

/// Shown when a row has no occupancy figure.
const OCCUPANCY_UNKNOWN: &str = "N/D";

#[derive(Debug, Clone, PartialEq)]
pub enum TicketAction {
    Buy(String),
    SoldOut,
}

/// One event inside a venue popup.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEntry {
    pub date: String,
    pub sold_out: bool,
    pub occupancy_label: String,
    pub ticket: TicketAction,
}

impl From<&VenueRow> for EventEntry {
    fn from(row: &VenueRow) -> Self {
        let occupancy = row.occupancy_percent.trim();
        let occupancy_label = if occupancy.is_empty() {
            OCCUPANCY_UNKNOWN.to_string()
        } else {
            occupancy.to_string()
        };
        EventEntry {
            date: row.date.clone(),
            sold_out: row.sold_out,
            occupancy_label: format!("Ocupación aprox: {}%", occupancy_label),
            ticket: if row.sold_out {
                TicketAction::SoldOut
            } else {
                TicketAction::Buy(row.ticket_link.clone())
            },
        }
    }
}

/// One map marker: every event row of a city.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueMarker {
    /// Normalized city, the selection key.
    pub key: String,
    /// City as spelled in the first row.
    pub city: String,
    pub title: String,
    pub position: LatLng,
    pub entries: Vec<EventEntry>,
}

/// Group rows by normalized city in order of first appearance. The first row
/// of a group places the marker and titles the popup; groups whose first row
/// has unusable coordinates are dropped.
pub fn group_venues(rows: &[VenueRow]) -> Vec<VenueMarker> {
    let mut groups: Vec<(String, Vec<&VenueRow>)> = Vec::new();
    for row in rows {
        let key = row.city_key();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(row),
            None => groups.push((key, vec![row])),
        }
    }

    groups
        .into_iter()
        .filter_map(|(key, members)| {
            let first = members[0];
            let Some(position) = first.position() else {
                tracing::debug!(city = %first.city, "Skipping venue with invalid coordinates");
                return None;
            };
            Some(VenueMarker {
                key,
                city: first.city.trim().to_string(),
                title: first.venue_name.clone(),
                position,
                entries: members.into_iter().map(EventEntry::from).collect(),
            })
        })
        .collect()
}

/// Unique city names for the destination picker, first spelling wins.
pub fn destination_cities(rows: &[VenueRow]) -> Vec<String> {
    let mut seen = Vec::new();
    let mut cities = Vec::new();
    for row in rows {
        let key = row.city_key();
        if key.is_empty() || seen.contains(&key) {
            continue;
        }
        seen.push(key);
        cities.push(row.city.trim().to_string());
    }
    cities
}

/// Coordinate of the first venue in `city`.
pub fn find_destination(rows: &[VenueRow], city: &str) -> Option<LatLng> {
    let key = city_key(city);
    rows.iter()
        .find(|r| r.city_key() == key)
        .and_then(|r| r.position())
}
