//! Arrivals index for destination-first journey search.
//!
//! The key insight of arrivals-first search is: any valid journey must end on
//! a train that arrives at the destination. By fetching the arrivals board first,
//! we get all candidate "final trains" and their previous calling points in one
//! API call. This dramatically reduces API calls compared to forward BFS.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{CallIndex, Crs, RailTime, Service};

/// Information about a train that can be boarded to reach the destination.
#[derive(Debug, Clone)]
pub struct FeederInfo {
    /// The service arriving at destination.
    pub service: Arc<Service>,
    /// Index of the call where we'd board this service.
    pub board_index: CallIndex,
    /// Expected departure time from the boarding station.
    pub board_time: RailTime,
    /// Expected arrival time at destination.
    pub dest_arrival: RailTime,
}

/// Index of services arriving at destination, keyed by their calling points.
///
/// This allows O(1) lookup of "which services can I board at station X to reach
/// the destination?"
#[derive(Debug)]
pub struct ArrivalsIndex {
    /// Destination station.
    destination: Crs,

    /// All services arriving at destination in the search window.
    arriving_services: Vec<Arc<Service>>,

    /// Map from station -> services arriving at destination that call at this station.
    /// Value includes the boarding time at that station.
    feeders: HashMap<Crs, Vec<FeederInfo>>,
}

impl ArrivalsIndex {
    /// Build index from arrivals board response.
    ///
    /// # Arguments
    ///
    /// * `destination` - The destination station CRS
    /// * `arrivals` - Services arriving at the destination, with their previous calling points
    pub fn from_arrivals(destination: Crs, arrivals: Vec<Arc<Service>>) -> Self {
        let mut feeders: HashMap<Crs, Vec<FeederInfo>> = HashMap::new();

        for service in &arrivals {
            // Find the destination call in this service
            // Note: services may continue past the destination, so we can't assume last call
            let dest_call_idx = match service.calls.iter().position(|c| c.station == destination) {
                Some(idx) => idx,
                None => continue, // Service doesn't call at destination (shouldn't happen)
            };

            let dest_call = &service.calls[dest_call_idx];

            // Get arrival time at destination
            let dest_arrival = match dest_call.expected_arrival() {
                Some(t) => t,
                None => continue, // Can't determine arrival time
            };

            // Skip if destination call is cancelled
            if dest_call.is_cancelled {
                continue;
            }

            // Index all calling points BEFORE the destination
            for (idx, call) in service.calls.iter().enumerate().take(dest_call_idx) {
                // Skip cancelled calls
                if call.is_cancelled {
                    continue;
                }

                // Need departure time to board here
                let board_time = match call.expected_departure() {
                    Some(t) => t,
                    None => continue, // Can't board here (no departure time)
                };

                feeders.entry(call.station).or_default().push(FeederInfo {
                    service: service.clone(),
                    board_index: CallIndex(idx),
                    board_time,
                    dest_arrival,
                });
            }
        }

        Self {
            destination,
            arriving_services: arrivals,
            feeders,
        }
    }

    /// Get services that can be boarded at a station to reach destination.
    pub fn feeders_at(&self, station: &Crs) -> &[FeederInfo] {
        self.feeders
            .get(station)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Check if a station is a feeder station (has services going to destination).
    pub fn is_feeder(&self, station: &Crs) -> bool {
        self.feeders.contains_key(station)
    }

    /// Get all feeder stations.
    pub fn feeder_stations(&self) -> impl Iterator<Item = &Crs> {
        self.feeders.keys()
    }

    /// Get the destination station.
    pub fn destination(&self) -> &Crs {
        &self.destination
    }

    /// Get all arriving services.
    pub fn arriving_services(&self) -> &[Arc<Service>] {
        &self.arriving_services
    }

    /// Get the number of feeder stations.
    pub fn feeder_station_count(&self) -> usize {
        self.feeders.len()
    }

    /// Get the total number of feeder entries (services Ã— stations).
    pub fn total_feeder_count(&self) -> usize {
        self.feeders.values().map(|v| v.len()).sum()
    }
}
