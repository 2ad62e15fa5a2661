//! Train identification logic.
//!
//! This module contains the core logic for identifying a user's current train
//! based on observable information (next station, terminus).

use std::sync::Arc;

use crate::darwin::ConvertedService;
use crate::domain::{Crs, MatchConfidence};

/// A matched train with its confidence level.
#[derive(Debug, Clone)]
pub struct TrainMatch {
    /// The matched service.
    pub service: Arc<ConvertedService>,
    /// How confidently we matched the train.
    pub confidence: MatchConfidence,
}

/// Filter and rank services based on identification criteria.
///
/// Given a list of services from a departure board and optional terminus filter,
/// returns matching services ranked by confidence and departure time.
///
/// # Arguments
///
/// * `services` - Services from the next station's departure board
/// * `terminus` - Optional terminus to filter by (if provided, only services
///   terminating at this station are included)
///
/// # Returns
///
/// Services that match the criteria, sorted by confidence (exact matches first),
/// then by departure time.
pub fn filter_and_rank_matches(
    services: &[Arc<ConvertedService>],
    terminus: Option<&Crs>,
) -> Vec<TrainMatch> {
    let mut matches: Vec<TrainMatch> = services
        .iter()
        .filter_map(|svc| {
            // If terminus specified, check it matches final calling point
            if let Some(term) = terminus {
                let dest = svc.service.destination_call()?;
                if &dest.1.station != term {
                    return None;
                }
            }

            let confidence = if terminus.is_some() {
                MatchConfidence::Exact
            } else {
                MatchConfidence::NextStationOnly
            };

            Some(TrainMatch {
                service: Arc::clone(svc),
                confidence,
            })
        })
        .collect();

    // Sort: exact matches first, then by departure time
    matches.sort_by(|a, b| {
        a.confidence.cmp(&b.confidence).then_with(|| {
            let a_dep = a
                .service
                .candidate
                .expected_departure
                .or(Some(a.service.candidate.scheduled_departure));
            let b_dep = b
                .service
                .candidate
                .expected_departure
                .or(Some(b.service.candidate.scheduled_departure));
            a_dep.cmp(&b_dep)
        })
    });

    matches
}
